use crate::defaults;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use wfes_solver::{ModelParameters, SolverConfig};
use wfes_sparse::SolverStrategy;

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Population size (diploid individuals)
    #[arg(short = 'N', long)]
    pub population_size: usize,

    /// Selection coefficient (fitness of AA is 1 + s)
    #[arg(short = 's', long)]
    pub selection_coefficient: f64,

    /// Mutation rate from A to a
    #[arg(short = 'u', long)]
    pub forward_mutation_rate: f64,

    /// Mutation rate from a to A
    #[arg(short = 'v', long)]
    pub backward_mutation_rate: f64,

    /// Dominance coefficient (fitness of Aa is 1 + h·s)
    #[arg(short = 'd', long)]
    pub dominance_coefficient: f64,

    /// Run even if the population size or mutation rates are outside the
    /// safe range
    #[arg(long)]
    pub force: bool,
}

impl ModelArgs {
    pub fn to_parameters(&self) -> wfes_solver::Result<ModelParameters> {
        ModelParameters::builder()
            .population_size(self.population_size)
            .selection(self.selection_coefficient)
            .mutation_rates(self.forward_mutation_rate, self.backward_mutation_rate)
            .dominance(self.dominance_coefficient)
            .force(self.force)
            .build()
    }
}

#[derive(Args, Debug)]
pub struct SolverArgs {
    /// Transition probabilities at or below this value are treated as zero
    #[arg(short = 'z', long, default_value = defaults::ZERO_THRESHOLD)]
    pub zero_threshold: f64,

    /// Factorization backend (sparse-lu, dense-lu)
    #[arg(long, default_value = defaults::SOLVER)]
    pub solver: SolverStrategy,

    /// Override the factorization block size
    #[arg(long)]
    pub block_size: Option<usize>,
}

impl SolverArgs {
    pub fn to_config(&self) -> SolverConfig {
        let config = SolverConfig::default()
            .with_zero_threshold(self.zero_threshold)
            .with_strategy(self.solver);
        match self.block_size {
            Some(size) => config.with_block_size(size),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write expected sojourn times per state to this file
    #[arg(short = 'g', long)]
    pub sojourn_time_file: Option<PathBuf>,

    /// Write extinction probabilities per state to this file
    #[arg(short = 'e', long)]
    pub extinction_file: Option<PathBuf>,

    /// Write fixation probabilities per state to this file
    #[arg(short = 'f', long)]
    pub fixation_file: Option<PathBuf>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}
