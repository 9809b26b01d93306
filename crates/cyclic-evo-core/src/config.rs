use crate::error::SimConfigError;
use crate::genotype::Genotype;
use serde::{Deserialize, Serialize};

/// Which side(s) of a contest pay the global cost.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlobalCostMode {
    #[default]
    Both,
    FirstOnly,
    SecondOnly,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenotypeWeight {
    pub genotype: Genotype,
    pub weight: f64,
}

/// How generation 0 is built.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InitialPopulation {
    /// Target share of each strategy option; rounded to exact counts.
    Frequencies { frequencies: Vec<f64> },
    /// Relative weight of each full genotype; sampled per entity.
    GenotypeDistribution { weights: Vec<GenotypeWeight> },
}

impl Default for InitialPopulation {
    fn default() -> Self {
        // Rock, paper, scissors, rock.
        InitialPopulation::Frequencies {
            frequencies: vec![0.5, 0.25, 0.25],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the run's RNG. `None` draws a fresh seed (not reproducible).
    pub seed: Option<u64>,
    /// Number of generations to simulate after generation 0.
    pub num_days: usize,
    /// Size of generation 0.
    pub initial_population: usize,
    /// Exclusive contest slots ("trees") available per day.
    pub resource_sites: usize,
    /// Number of strategy options on the cyclic ring.
    pub num_options: usize,
    /// Alleles carried by every genotype. 1 = pure strategies.
    pub alleles_per_entity: usize,
    /// Total per-allele mutation probability, split evenly between the two rotations.
    pub mutation_rate: f64,
    /// Reward delta for a win (added) or loss (subtracted).
    pub win_magnitude: f64,
    /// Penalty subtracted from the baseline reward on a tie.
    pub tie_cost: f64,
    /// Cost subtracted from contest rewards, per `global_cost_mode`.
    pub global_cost: f64,
    pub global_cost_mode: GlobalCostMode,
    pub initial_population_mode: InitialPopulation,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: Some(42),
            num_days: 20,
            initial_population: 32,
            resource_sites: 50,
            num_options: 3,
            alleles_per_entity: 1,
            mutation_rate: 0.0,
            win_magnitude: 0.2,
            tie_cost: 0.0,
            global_cost: 0.0,
            global_cost_mode: GlobalCostMode::Both,
            initial_population_mode: InitialPopulation::default(),
        }
    }
}

impl SimConfig {
    pub const MIN_NUM_OPTIONS: usize = 3;
    pub const MAX_NUM_OPTIONS: usize = 64;
    pub const MAX_ALLELES_PER_ENTITY: usize = 64;
    pub const MAX_INITIAL_POPULATION: usize = 10_000_000;
    pub const MAX_NUM_DAYS: usize = 100_000;

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_population()?;
        self.validate_payoff()?;
        self.validate_initial_mode()?;
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        if !(Self::MIN_NUM_OPTIONS..=Self::MAX_NUM_OPTIONS).contains(&self.num_options) {
            return Err(SimConfigError::InvalidNumOptions {
                min: Self::MIN_NUM_OPTIONS,
                max: Self::MAX_NUM_OPTIONS,
                actual: self.num_options,
            });
        }
        if self.initial_population == 0 {
            return Err(SimConfigError::EmptyInitialPopulation);
        }
        if self.initial_population > Self::MAX_INITIAL_POPULATION {
            return Err(SimConfigError::InitialPopulationTooLarge {
                max: Self::MAX_INITIAL_POPULATION,
                actual: self.initial_population,
            });
        }
        if !(1..=Self::MAX_ALLELES_PER_ENTITY).contains(&self.alleles_per_entity) {
            return Err(SimConfigError::InvalidAllelesPerEntity {
                max: Self::MAX_ALLELES_PER_ENTITY,
                actual: self.alleles_per_entity,
            });
        }
        if self.num_days > Self::MAX_NUM_DAYS {
            return Err(SimConfigError::TooManyDays {
                max: Self::MAX_NUM_DAYS,
                actual: self.num_days,
            });
        }
        if !(self.mutation_rate.is_finite() && (0.0..=1.0).contains(&self.mutation_rate)) {
            return Err(SimConfigError::InvalidMutationRate);
        }
        Ok(())
    }

    fn validate_payoff(&self) -> Result<(), SimConfigError> {
        for (name, value) in [
            ("win_magnitude", self.win_magnitude),
            ("tie_cost", self.tie_cost),
            ("global_cost", self.global_cost),
        ] {
            if !value.is_finite() {
                return Err(SimConfigError::NonFinitePayoff { name });
            }
        }
        Ok(())
    }

    /// Frequency vectors are corrected at initialization, not rejected here.
    fn validate_initial_mode(&self) -> Result<(), SimConfigError> {
        let InitialPopulation::GenotypeDistribution { weights } = &self.initial_population_mode
        else {
            return Ok(());
        };
        if weights.is_empty() {
            return Err(SimConfigError::EmptyGenotypeDistribution);
        }
        for (index, entry) in weights.iter().enumerate() {
            if entry.genotype.len() != self.alleles_per_entity {
                return Err(SimConfigError::GenotypeLengthMismatch {
                    index,
                    expected: self.alleles_per_entity,
                    actual: entry.genotype.len(),
                });
            }
            if let Some(&allele) = entry
                .genotype
                .alleles()
                .iter()
                .find(|&&a| a as usize >= self.num_options)
            {
                return Err(SimConfigError::AlleleOutOfRange {
                    index,
                    allele: allele as usize,
                    num_options: self.num_options,
                });
            }
        }
        let weights_ok = weights.iter().all(|w| w.weight.is_finite() && w.weight >= 0.0)
            && weights.iter().any(|w| w.weight > 0.0);
        if !weights_ok {
            return Err(SimConfigError::InvalidGenotypeWeights);
        }
        Ok(())
    }
}
