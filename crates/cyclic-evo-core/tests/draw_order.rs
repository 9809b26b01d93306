//! Replays a run by hand, drawing from a bare `SimRng` in the documented
//! order, and requires the simulator to match it entity for entity.
//!
//! Per day: for each pair, strategy draws for both contestants, then the
//! first side's Bernoulli draw and births (one float per allele each), then
//! the second side's; then unpaired births in order; then one shuffle.

use cyclic_evo_core::init::exact_counts;
use cyclic_evo_core::payoff::PayoffModel;
use cyclic_evo_core::rng::SimRng;
use cyclic_evo_core::{Allele, EntityId, Genotype, InitialPopulation, SimConfig, Simulation};

const SEED: u64 = 2024;
const FREQUENCIES: [f64; 3] = [0.5, 0.25, 0.25];

fn config(alleles_per_entity: usize, num_days: usize) -> SimConfig {
    SimConfig {
        seed: Some(SEED),
        num_days,
        initial_population: 6,
        resource_sites: 4,
        num_options: 3,
        alleles_per_entity,
        mutation_rate: 0.3,
        win_magnitude: 0.35,
        tie_cost: 0.1,
        global_cost: 0.05,
        initial_population_mode: InitialPopulation::Frequencies {
            frequencies: FREQUENCIES.to_vec(),
        },
        ..SimConfig::default()
    }
}

struct Replay {
    rng: SimRng,
    payoff: PayoffModel,
    config: SimConfig,
    genotypes: Vec<Genotype>,
    parents: Vec<Option<EntityId>>,
    days: Vec<Vec<EntityId>>,
}

impl Replay {
    fn new(config: SimConfig) -> Self {
        let mut rng = SimRng::new(SEED);
        let k = config.alleles_per_entity;
        let counts = exact_counts(&FREQUENCIES, config.initial_population * k);
        let mut pool: Vec<Allele> = Vec::new();
        for (option, &count) in counts.iter().enumerate() {
            pool.extend(std::iter::repeat_n(option as Allele, count));
        }
        rng.shuffle(&mut pool);
        let genotypes: Vec<Genotype> = pool.chunks(k).map(|c| Genotype::new(c.to_vec())).collect();
        let n = genotypes.len();
        Self {
            rng,
            payoff: PayoffModel::from_config(&config),
            config,
            parents: vec![None; n],
            days: vec![(0..n as EntityId).collect()],
            genotypes,
        }
    }

    fn play(&mut self, id: EntityId) -> Allele {
        let alleles = self.genotypes[id as usize].alleles();
        if alleles.len() == 1 {
            return alleles[0];
        }
        alleles[self.rng.uniform_int(alleles.len())]
    }

    fn birth(&mut self, parent: EntityId, next: &mut Vec<EntityId>) {
        let rate = self.config.mutation_rate;
        let mut alleles = self.genotypes[parent as usize].alleles().to_vec();
        for a in alleles.iter_mut() {
            let r = self.rng.uniform_float(1.0);
            if r < rate / 2.0 {
                *a = (*a + 1) % 3;
            } else if r < rate {
                *a = (*a + 2) % 3;
            }
        }
        let id = self.genotypes.len() as EntityId;
        self.genotypes.push(Genotype::new(alleles));
        self.parents.push(Some(parent));
        next.push(id);
    }

    fn reproduce(&mut self, parent: EntityId, reward: f64, next: &mut Vec<EntityId>) {
        let reward = reward.max(0.0);
        let extra = self.rng.uniform_float(1.0) < reward - reward.floor();
        for _ in 0..reward.floor() as usize + usize::from(extra) {
            self.birth(parent, next);
        }
    }

    fn day(&mut self) {
        let population = self.days.last().cloned().unwrap_or_default();
        let cap = self.config.resource_sites;
        let pairings = population.len().saturating_sub(cap).min(cap);
        let mut next = Vec::new();
        for pair in population[..2 * pairings].chunks(2) {
            let own = self.play(pair[0]);
            let other = self.play(pair[1]);
            let (r1, r2) = self.payoff.rewards(own, other);
            self.reproduce(pair[0], r1, &mut next);
            self.reproduce(pair[1], r2, &mut next);
        }
        if !(cap > 0 && pairings == cap) {
            for &id in &population[2 * pairings..] {
                self.birth(id, &mut next);
                self.birth(id, &mut next);
            }
        }
        self.rng.shuffle(&mut next);
        self.days.push(next);
    }
}

fn assert_matches_replay(config: SimConfig) {
    let days = config.num_days;
    let mut replay = Replay::new(config.clone());
    for _ in 0..days {
        replay.day();
    }
    let mut sim = Simulation::new(config).expect("valid config");
    sim.run().expect("run succeeds");

    assert_eq!(sim.days().len(), replay.days.len());
    for (day, (got, want)) in sim.days().iter().zip(&replay.days).enumerate() {
        assert_eq!(got, want, "population diverged on day {day}");
    }
    assert_eq!(sim.registry().genotypes(), replay.genotypes.as_slice());
    assert_eq!(sim.registry().parents(), replay.parents.as_slice());
}

#[test]
fn multi_allele_run_follows_documented_draw_order() {
    assert_matches_replay(config(2, 3));
}

#[test]
fn single_allele_run_follows_documented_draw_order() {
    assert_matches_replay(config(1, 3));
}

#[test]
fn first_day_has_contests_and_unpaired_births() {
    let mut sim = Simulation::new(config(2, 1)).expect("valid config");
    let stats = sim.step().expect("step");
    assert_eq!(stats.pairings, 2);
    assert_eq!(stats.overflow_births, 4);
}
