use super::metrics::DayStats;
use super::Simulation;
use crate::error::{RegistryError, SimResult};
use crate::genotype::{Allele, Genotype, MutationPolicy};
use crate::registry::{EntityId, EntityRegistry};
use crate::rng::SimRng;

/// Number of contests for a day of `n` individuals and `capacity` sites.
///
/// Always satisfies `2 * pairings <= n`.
pub fn pairings(n: usize, capacity: usize) -> usize {
    n.saturating_sub(capacity).min(capacity)
}

/// Unpaired individuals double unless every site is taken.
pub fn overflow_reproduces(pairings: usize, capacity: usize) -> bool {
    !(capacity > 0 && pairings == capacity)
}

/// Guaranteed offspring plus the probability of one more.
///
/// Negative rewards clamp to zero offspring.
pub fn offspring_split(reward: f64) -> (usize, f64) {
    let r = reward.max(0.0);
    let whole = r.floor();
    (whole as usize, r - whole)
}

/// Appends children to the next day while borrowing only what births touch.
struct Nursery<'a> {
    registry: &'a mut EntityRegistry,
    rng: &'a mut SimRng,
    mutation: &'a MutationPolicy,
    next: Vec<EntityId>,
    mutations: usize,
}

impl Nursery<'_> {
    fn genotype_of(&self, id: EntityId) -> Result<&Genotype, RegistryError> {
        self.registry
            .genotype(id)
            .ok_or(RegistryError::UnknownEntity(id))
    }

    /// Strategy `id` plays in one contest.
    fn play(&mut self, id: EntityId) -> Result<Allele, RegistryError> {
        let genotype = self
            .registry
            .genotype(id)
            .ok_or(RegistryError::UnknownEntity(id))?;
        Ok(genotype.effective_strategy(self.rng))
    }

    fn spawn(&mut self, parent: EntityId, count: usize) -> SimResult<()> {
        if count == 0 {
            return Ok(());
        }
        let genotype = self.genotype_of(parent)?.clone();
        for _ in 0..count {
            let (child, changed) = genotype.inherit(self.mutation, self.rng);
            self.mutations += changed;
            self.next.push(self.registry.create(child, Some(parent))?);
        }
        Ok(())
    }

    /// Bernoulli draw for the fractional part, then the births.
    fn reproduce(&mut self, parent: EntityId, reward: f64) -> SimResult<usize> {
        let (whole, fraction) = offspring_split(reward);
        let count = whole + usize::from(self.rng.chance(fraction));
        self.spawn(parent, count)?;
        Ok(count)
    }
}

impl Simulation {
    /// Advance one day and return its bookkeeping.
    ///
    /// On error the registry is rolled back to the start of the day, so every
    /// stored entity still belongs to exactly one day list. The RNG is not
    /// rolled back.
    pub fn step(&mut self) -> SimResult<DayStats> {
        let mark = self.registry.len();
        match self.advance_day() {
            Err(e) => {
                log::warn!("day {} failed, discarding its births: {e}", self.days.len());
                self.registry.truncate(mark);
                Err(e)
            }
            ok => ok,
        }
    }

    fn advance_day(&mut self) -> SimResult<DayStats> {
        let day = self.days.len();
        let population = self.days.last().map_or(&[][..], Vec::as_slice);
        let capacity = self.config.resource_sites;
        let n = population.len();
        let pairings = pairings(n, capacity);

        let mut nursery = Nursery {
            registry: &mut self.registry,
            rng: &mut self.rng,
            mutation: &self.mutation,
            next: Vec::with_capacity(n * 2),
            mutations: 0,
        };

        let mut paired_births = 0;
        for pair in population[..2 * pairings].chunks_exact(2) {
            let (first, second) = (pair[0], pair[1]);
            let own = nursery.play(first)?;
            let other = nursery.play(second)?;
            let (reward_first, reward_second) = self.payoff.rewards(own, other);
            paired_births += nursery.reproduce(first, reward_first)?;
            paired_births += nursery.reproduce(second, reward_second)?;
        }

        let unpaired = &population[2 * pairings..];
        let (overflow_births, overflow_deaths) = if overflow_reproduces(pairings, capacity) {
            for &id in unpaired {
                nursery.spawn(id, 2)?;
            }
            (unpaired.len() * 2, 0)
        } else {
            (0, unpaired.len())
        };

        let Nursery {
            mut next,
            mutations,
            ..
        } = nursery;
        self.rng.shuffle(&mut next);

        let stats = DayStats {
            day,
            parents: n,
            pairings,
            paired_births,
            overflow_births,
            overflow_deaths,
            mutations,
            population_size: next.len(),
        };
        log::debug!(
            "day={} parents={} pairings={} births={} deaths={} population={}",
            day,
            n,
            pairings,
            stats.births(),
            overflow_deaths,
            stats.population_size
        );
        self.days.push(next);
        self.day_stats.push(stats.clone());
        Ok(stats)
    }
}
