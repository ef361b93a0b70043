use crate::args::OutputFormat;
use anyhow::{Context, Result};
use wfes_solver::SummaryRecord;

/// Significant digits in general-format numbers.
const PRECISION: usize = 6;

/// Format a number the way C's `%g` does: six significant digits, trailing
/// zeros removed, scientific notation for very small or large magnitudes.
pub fn format_general(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", PRECISION - 1, x);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `N,s,u,v,h,pe,pf,te,tf,cbe`
pub fn summary_line(record: &SummaryRecord) -> String {
    let mut fields = vec![record.population_size.to_string()];
    fields.extend(record.values().iter().map(|&v| format_general(v)));
    fields.join(",")
}

pub fn print_summary(record: &SummaryRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => println!("{}", summary_line(record)),
        OutputFormat::Json => {
            let json = serde_json::to_string(record).context("Failed to serialize summary")?;
            println!("{json}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_general_fixed() {
        assert_eq!(format_general(0.95), "0.95");
        assert_eq!(format_general(10.0), "10");
        assert_eq!(format_general(-2.5), "-2.5");
        assert_eq!(format_general(100000.0), "100000");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(1.0 / 3.0), "0.333333");
        assert_eq!(format_general(0.0), "0");
    }

    #[test]
    fn test_format_general_scientific() {
        assert_eq!(format_general(1e-30), "1e-30");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(999999.5), "1e+06");
        assert_eq!(format_general(-3.5e-7), "-3.5e-07");
    }

    #[test]
    fn test_format_general_special() {
        assert_eq!(format_general(f64::NAN), "nan");
        assert_eq!(format_general(f64::INFINITY), "inf");
        assert_eq!(format_general(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_summary_line() {
        let record = SummaryRecord {
            population_size: 10,
            selection: 0.0,
            forward_mutation: 1e-7,
            backward_mutation: 0.0,
            dominance: 0.5,
            probability_extinction: 0.95,
            probability_fixation: 0.05,
            time_extinction: 4.5,
            time_fixation: f64::NAN,
            count_before_extinction: 12.0,
        };
        assert_eq!(summary_line(&record), "10,0,1e-07,0,0.5,0.95,0.05,4.5,nan,12");
    }
}
