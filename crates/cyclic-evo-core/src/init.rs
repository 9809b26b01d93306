//! Generation 0: exact-count partition from target frequencies, or per-entity
//! sampling from a distribution over full genotypes.

use crate::config::{GenotypeWeight, InitialPopulation, SimConfig};
use crate::error::SimResult;
use crate::genotype::{Allele, Genotype};
use crate::registry::{EntityId, EntityRegistry};
use crate::rng::SimRng;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// A configuration problem that was corrected rather than rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// Wrong number of frequencies; a uniform distribution was used instead.
    FrequencyLengthMismatch { expected: usize, actual: usize },
    /// Negative, non-finite or all-zero frequencies; uniform used instead.
    InvalidFrequencies,
    /// Frequencies did not sum to 1 and were rescaled.
    FrequenciesNormalized { sum: f64 },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::FrequencyLengthMismatch { expected, actual } => write!(
                f,
                "expected {expected} initial frequencies, got {actual}; using uniform"
            ),
            ConfigWarning::InvalidFrequencies => write!(
                f,
                "initial frequencies must be finite, non-negative and not all zero; using uniform"
            ),
            ConfigWarning::FrequenciesNormalized { sum } => {
                write!(f, "initial frequencies summed to {sum}; normalized")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct InitialCohort {
    pub ids: Vec<EntityId>,
    pub warnings: Vec<ConfigWarning>,
}

/// Normalize a frequency vector, substituting uniform when it is unusable.
pub fn normalize_frequencies(raw: &[f64], num_options: usize) -> (Vec<f64>, Vec<ConfigWarning>) {
    let uniform = vec![1.0 / num_options as f64; num_options];
    if raw.len() != num_options {
        return (
            uniform,
            vec![ConfigWarning::FrequencyLengthMismatch {
                expected: num_options,
                actual: raw.len(),
            }],
        );
    }
    let sum: f64 = raw.iter().sum();
    if raw.iter().any(|f| !f.is_finite() || *f < 0.0) || !(sum.is_finite() && sum > 0.0) {
        return (uniform, vec![ConfigWarning::InvalidFrequencies]);
    }
    if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
        let scaled = raw.iter().map(|f| f / sum).collect();
        return (scaled, vec![ConfigWarning::FrequenciesNormalized { sum }]);
    }
    (raw.to_vec(), Vec::new())
}

/// Split `total` into integer counts matching normalized `frequencies`.
///
/// Each option gets `round(f * total)`; any slack is settled one unit at a time
/// by largest rounding error (lowest index on ties). Options with zero
/// frequency never receive a count.
pub fn exact_counts(frequencies: &[f64], total: usize) -> Vec<usize> {
    let targets: Vec<f64> = frequencies.iter().map(|f| f * total as f64).collect();
    let mut counts: Vec<usize> = targets.iter().map(|t| t.round() as usize).collect();
    let assigned: usize = counts.iter().sum();

    if assigned < total {
        let mut order: Vec<usize> = (0..counts.len()).filter(|&i| frequencies[i] > 0.0).collect();
        order.sort_by(|&a, &b| {
            let ea = targets[a] - counts[a] as f64;
            let eb = targets[b] - counts[b] as f64;
            eb.total_cmp(&ea).then(a.cmp(&b))
        });
        for &i in order.iter().cycle().take(total - assigned) {
            counts[i] += 1;
        }
    } else if assigned > total {
        let mut excess = assigned - total;
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| {
            let ea = counts[a] as f64 - targets[a];
            let eb = counts[b] as f64 - targets[b];
            eb.total_cmp(&ea).then(a.cmp(&b))
        });
        while excess > 0 {
            for &i in &order {
                if excess == 0 {
                    break;
                }
                if counts[i] > 0 {
                    counts[i] -= 1;
                    excess -= 1;
                }
            }
        }
    }
    counts
}

/// Build generation 0 into `registry`.
pub fn initialize(
    config: &SimConfig,
    rng: &mut SimRng,
    registry: &mut EntityRegistry,
) -> SimResult<InitialCohort> {
    let cohort = match &config.initial_population_mode {
        InitialPopulation::Frequencies { frequencies } => {
            from_frequencies(config, frequencies, rng, registry)?
        }
        InitialPopulation::GenotypeDistribution { weights } => InitialCohort {
            ids: from_distribution(config, weights, rng, registry)?,
            warnings: Vec::new(),
        },
    };
    for warning in &cohort.warnings {
        log::warn!("initial population: {warning}");
    }
    Ok(cohort)
}

/// The allele pool is partitioned exactly, shuffled once and cut into
/// genotypes, so day 0 is stored in random order like every later day.
fn from_frequencies(
    config: &SimConfig,
    raw: &[f64],
    rng: &mut SimRng,
    registry: &mut EntityRegistry,
) -> SimResult<InitialCohort> {
    let (frequencies, warnings) = normalize_frequencies(raw, config.num_options);
    let k = config.alleles_per_entity;
    let counts = exact_counts(&frequencies, config.initial_population * k);

    let mut pool: Vec<Allele> = Vec::with_capacity(config.initial_population * k);
    for (option, &count) in counts.iter().enumerate() {
        pool.extend(std::iter::repeat_n(option as Allele, count));
    }
    rng.shuffle(&mut pool);

    let ids = pool
        .chunks_exact(k)
        .map(|alleles| registry.create(Genotype::new(alleles.to_vec()), None))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(InitialCohort { ids, warnings })
}

fn from_distribution(
    config: &SimConfig,
    weights: &[GenotypeWeight],
    rng: &mut SimRng,
    registry: &mut EntityRegistry,
) -> SimResult<Vec<EntityId>> {
    let dist = WeightedIndex::new(weights.iter().map(|w| w.weight))?;
    let mut ids = Vec::with_capacity(config.initial_population);
    for _ in 0..config.initial_population {
        let pick = rng.sample(&dist);
        ids.push(registry.create(weights[pick].genotype.clone(), None)?);
    }
    Ok(ids)
}
