pub mod lifecycle;
pub mod metrics;

pub use metrics::*;

use crate::analysis;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::genotype::MutationPolicy;
use crate::init::{self, ConfigWarning};
use crate::payoff::PayoffModel;
use crate::registry::{EntityId, EntityRegistry};
use crate::rng::SimRng;

/// One simulation run: owns the RNG, the registry and the per-day history.
///
/// `days[0]` is generation 0; `days[i]` holds exactly the entities born
/// during the transition from day `i - 1`.
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) payoff: PayoffModel,
    pub(crate) mutation: MutationPolicy,
    pub(crate) rng: SimRng,
    pub(crate) registry: EntityRegistry,
    pub(crate) days: Vec<Vec<EntityId>>,
    pub(crate) day_stats: Vec<DayStats>,
    pub(crate) warnings: Vec<ConfigWarning>,
}

impl Simulation {
    /// Validate `config` and build generation 0.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut rng = SimRng::from_optional_seed(config.seed);
        let mut registry = EntityRegistry::with_capacity(config.initial_population);
        let cohort = init::initialize(&config, &mut rng, &mut registry)?;
        log::info!(
            "seed={} initial_population={} resource_sites={} alleles_per_entity={}",
            rng.seed(),
            cohort.ids.len(),
            config.resource_sites,
            config.alleles_per_entity
        );

        let mut days = Vec::with_capacity(config.num_days + 1);
        days.push(cohort.ids);
        Ok(Self {
            payoff: PayoffModel::from_config(&config),
            mutation: MutationPolicy::new(config.mutation_rate, config.num_options),
            rng,
            registry,
            days,
            day_stats: Vec::with_capacity(config.num_days),
            warnings: cohort.warnings,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn payoff(&self) -> &PayoffModel {
        &self.payoff
    }

    /// The seed actually used, including a drawn one when none was configured.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn days(&self) -> &[Vec<EntityId>] {
        &self.days
    }

    pub fn population(&self, day: usize) -> Option<&[EntityId]> {
        self.days.get(day).map(Vec::as_slice)
    }

    /// Index of the latest simulated day (0 before any step).
    pub fn current_day(&self) -> usize {
        self.days.len() - 1
    }

    pub fn day_stats(&self) -> &[DayStats] {
        &self.day_stats
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Population size per day; growth is not throttled, so callers watch this.
    pub fn population_sizes(&self) -> Vec<usize> {
        self.days.iter().map(Vec::len).collect()
    }

    /// Simulate the remaining configured days.
    pub fn run(&mut self) -> SimResult<()> {
        let remaining = self.config.num_days.saturating_sub(self.current_day());
        self.run_days(remaining)?;
        log::info!(
            "run complete: seed={} days={} final_population={} total_entities={}",
            self.seed(),
            self.current_day(),
            self.days.last().map_or(0, Vec::len),
            self.registry.len()
        );
        Ok(())
    }

    pub fn run_days(&mut self, days: usize) -> SimResult<()> {
        for _ in 0..days {
            self.step()?;
        }
        Ok(())
    }

    pub fn strategy_fractions_by_day(&self) -> Vec<Vec<f64>> {
        analysis::strategy_fractions_by_day(&self.registry, &self.days, self.config.num_options)
    }

    pub fn day_metrics(&self, day: usize) -> Option<DayMetrics> {
        let population = self.days.get(day)?;
        let n = self.config.num_options;
        let k = self.config.alleles_per_entity;
        Some(DayMetrics {
            day,
            population_size: population.len(),
            strategy_fractions: analysis::strategy_fractions(&self.registry, population, n),
            allele_frequencies: analysis::allele_frequencies(&self.registry, population, n, k),
            composition: (k > 1)
                .then(|| analysis::composition_histogram(&self.registry, population, n, k)),
        })
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION,
            seed: self.seed(),
            days_simulated: self.current_day(),
            num_options: self.config.num_options,
            alleles_per_entity: self.config.alleles_per_entity,
            total_births: self.day_stats.iter().map(DayStats::births).sum(),
            total_entities: self.registry.len(),
            final_population: self.days.last().map_or(0, Vec::len),
            warnings: self.warnings.clone(),
            days: (0..self.days.len())
                .filter_map(|d| self.day_metrics(d))
                .collect(),
            day_stats: self.day_stats.clone(),
        }
    }

    /// Everything a downstream consumer needs to replay or animate the run.
    pub fn into_record(self) -> RunRecord {
        let summary = self.summary();
        RunRecord {
            summary,
            registry: self.registry,
            populations: self.days,
        }
    }
}

/// Build, run to `config.num_days`, and return the full record.
pub fn run(config: SimConfig) -> SimResult<RunRecord> {
    let mut sim = Simulation::new(config)?;
    sim.run()?;
    Ok(sim.into_record())
}

/// Run `count` independent simulations with seeds `base, base + 1, ...`.
///
/// `base` is the configured seed, or a drawn one when none is configured.
pub fn run_replicates(config: &SimConfig, count: usize) -> SimResult<Vec<RunSummary>> {
    let base = config.seed.unwrap_or_else(rand::random::<u64>);
    (0..count)
        .map(|i| {
            let replicate = SimConfig {
                seed: Some(base.wrapping_add(i as u64)),
                ..config.clone()
            };
            let mut sim = Simulation::new(replicate)?;
            sim.run()?;
            Ok(sim.summary())
        })
        .collect()
}
