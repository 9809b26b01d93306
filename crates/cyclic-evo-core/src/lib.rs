pub mod analysis;
pub mod config;
pub mod error;
pub mod genotype;
pub mod init;
pub mod payoff;
pub mod registry;
pub mod rng;
pub mod simulation;

pub use config::{GlobalCostMode, InitialPopulation, SimConfig};
pub use error::{SimConfigError, SimError};
pub use genotype::{Allele, Genotype};
pub use registry::{EntityId, EntityRegistry};
pub use simulation::{
    run, run_replicates, DayMetrics, DayStats, RunRecord, RunSummary, Simulation,
};
