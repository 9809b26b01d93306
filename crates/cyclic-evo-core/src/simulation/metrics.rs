use crate::analysis::CompositionHistogram;
use crate::init::ConfigWarning;
use crate::registry::{EntityId, EntityRegistry};
use serde::{Deserialize, Serialize};

pub const RUN_SUMMARY_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    RUN_SUMMARY_SCHEMA_VERSION
}

/// Reproduction bookkeeping for one day transition (`day - 1` to `day`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayStats {
    pub day: usize,
    pub parents: usize,
    pub pairings: usize,
    pub paired_births: usize,
    pub overflow_births: usize,
    /// Unpaired individuals that died without offspring (population over capacity).
    pub overflow_deaths: usize,
    /// Alleles changed by mutation across all births.
    pub mutations: usize,
    pub population_size: usize,
}

impl DayStats {
    pub fn births(&self) -> usize {
        self.paired_births + self.overflow_births
    }

    /// Ratio of new to previous population; 0 for an empty parent day.
    pub fn growth_factor(&self) -> f64 {
        if self.parents == 0 {
            return 0.0;
        }
        self.population_size as f64 / self.parents as f64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayMetrics {
    pub day: usize,
    pub population_size: usize,
    /// Share of each option by first allele. Only meaningful when
    /// `alleles_per_entity == 1`; use `allele_frequencies` otherwise.
    pub strategy_fractions: Vec<f64>,
    pub allele_frequencies: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<CompositionHistogram>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub days_simulated: usize,
    pub num_options: usize,
    pub alleles_per_entity: usize,
    /// Entities born after generation 0.
    pub total_births: usize,
    pub total_entities: usize,
    pub final_population: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigWarning>,
    pub days: Vec<DayMetrics>,
    #[serde(default)]
    pub day_stats: Vec<DayStats>,
}

impl RunSummary {
    pub fn population_sizes(&self) -> Vec<usize> {
        self.days.iter().map(|d| d.population_size).collect()
    }
}

/// Summary plus the raw registry and day lists, for replay or animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub summary: RunSummary,
    pub registry: EntityRegistry,
    pub populations: Vec<Vec<EntityId>>,
}
