mod args;
mod defaults;
mod export;
mod logging;
mod printing;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use tracing::info;
use wfes_solver::{solve_absorption, WfesError};

use args::{ModelArgs, OutputArgs, SolverArgs};

/// WFES: Wright-Fisher Exact Solver
///
/// Computes the probabilities of extinction and fixation of a new allele,
/// and the expected times until either happens, for a single-locus
/// Wright-Fisher population with selection, dominance, and mutation.
/// Prints one summary line: N,s,u,v,h,pe,pf,te,tf,cbe
#[derive(Parser, Debug)]
#[command(name = "wfes")]
#[command(author, version, about = "Wright-Fisher exact solver", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    solver: SolverArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Number of threads used to build the matrix
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Only log errors
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Log more (repeat for more detail)
    #[arg(long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let params = match cli.model.to_parameters() {
        Ok(params) => params,
        Err(err) if err.is_overridable() => {
            return Err(anyhow::Error::new(err)
                .context("Parameters outside the safe range (use --force to run anyway)"));
        }
        Err(err) => return Err(err).context("Invalid model parameters"),
    };
    let config = cli.solver.to_config();
    info!(
        population_size = params.population_size(),
        states = params.transient_states(),
        solver = %config.strategy,
        "solving"
    );

    let stats = solve_absorption(&params, &config).context("Absorption solve failed")?;
    printing::print_summary(&stats.summary(&params), cli.output.format)?;
    export::write_exports(&stats, &cli.output)?;
    Ok(())
}

/// Process exit status: 2 for rejected input, the solver phase code for a
/// solver failure, 1 for anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.chain().find_map(|e| e.downcast_ref::<WfesError>()) {
        Some(WfesError::ParameterValidation { .. } | WfesError::Configuration { .. }) => 2,
        Some(e) => match e.phase().map(|p| p.code()) {
            Some(code @ 1..=255) => code as u8,
            _ => 1,
        },
        None => 1,
    }
}
