//! Per-day aggregate statistics over a population of registry ids.
//!
//! Empty populations (extinction) produce all-zero vectors rather than NaN.

use crate::registry::{EntityId, EntityRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fraction of `population` playing each option, by its first allele.
///
/// This is the single-allele summary; for mixed genotypes use
/// [`allele_frequencies`] or [`composition_histogram`].
pub fn strategy_fractions(
    registry: &EntityRegistry,
    population: &[EntityId],
    num_options: usize,
) -> Vec<f64> {
    let mut counts = vec![0usize; num_options];
    for g in population.iter().filter_map(|&id| registry.genotype(id)) {
        if let Some(&a) = g.alleles().first() {
            counts[a as usize] += 1;
        }
    }
    to_fractions(&counts, population.len())
}

/// Share of each option across every allele of every genotype in `population`.
pub fn allele_frequencies(
    registry: &EntityRegistry,
    population: &[EntityId],
    num_options: usize,
    alleles_per_entity: usize,
) -> Vec<f64> {
    let mut counts = vec![0usize; num_options];
    for g in population.iter().filter_map(|&id| registry.genotype(id)) {
        for &a in g.alleles() {
            counts[a as usize] += 1;
        }
    }
    to_fractions(&counts, population.len() * alleles_per_entity)
}

fn to_fractions(counts: &[usize], denom: usize) -> Vec<f64> {
    if denom == 0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().map(|&c| c as f64 / denom as f64).collect()
}

/// Fraction of the population with each exact genotype composition.
///
/// Bins are count vectors (allele count per option) in lexicographic order.
/// Only compositions present in the population are stored unless the whole
/// discretized simplex has at most [`DENSE_SIMPLEX_LIMIT`] points, in which
/// case every point gets a bin (zeros included).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionHistogram {
    pub num_options: usize,
    pub alleles_per_entity: usize,
    pub bins: Vec<CompositionBin>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionBin {
    /// Allele count per option; sums to `alleles_per_entity`.
    pub counts: Vec<usize>,
    pub fraction: f64,
}

/// Largest simplex emitted in full by [`composition_histogram`].
pub const DENSE_SIMPLEX_LIMIT: usize = 4096;

impl CompositionHistogram {
    /// `None` if `counts` is not a point of this histogram's simplex.
    pub fn fraction_of(&self, counts: &[usize]) -> Option<f64> {
        if counts.len() != self.num_options
            || counts.iter().sum::<usize>() != self.alleles_per_entity
        {
            return None;
        }
        let fraction = self
            .bins
            .iter()
            .find(|b| b.counts == counts)
            .map_or(0.0, |b| b.fraction);
        Some(fraction)
    }

    pub fn total(&self) -> f64 {
        self.bins.iter().map(|b| b.fraction).sum()
    }
}

/// Number of count vectors of length `parts` summing to `total`,
/// `C(total + parts - 1, parts - 1)`, or `None` on overflow.
pub fn simplex_size(total: usize, parts: usize) -> Option<usize> {
    if parts == 0 {
        return Some(0);
    }
    let k = parts - 1;
    let mut acc: usize = 1;
    for i in 1..=k {
        // acc * (total + i) / i stays integral at every step.
        acc = acc.checked_mul(total.checked_add(i)?)? / i;
    }
    Some(acc)
}

/// All count vectors of length `parts` summing to `total`, lexicographic.
///
/// Allocates [`simplex_size`] vectors; callers bound the inputs.
pub fn compositions(total: usize, parts: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, remaining: usize, parts: usize, out: &mut Vec<Vec<usize>>) {
        if prefix.len() + 1 == parts {
            prefix.push(remaining);
            out.push(prefix.clone());
            prefix.pop();
            return;
        }
        for c in 0..=remaining {
            prefix.push(c);
            extend(prefix, remaining - c, parts, out);
            prefix.pop();
        }
    }

    let mut out = Vec::new();
    if parts == 0 {
        return out;
    }
    extend(&mut Vec::with_capacity(parts), total, parts, &mut out);
    out
}

pub fn composition_histogram(
    registry: &EntityRegistry,
    population: &[EntityId],
    num_options: usize,
    alleles_per_entity: usize,
) -> CompositionHistogram {
    let mut observed: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
    for g in population.iter().filter_map(|&id| registry.genotype(id)) {
        let composition = g.composition(num_options);
        debug_assert_eq!(composition.iter().sum::<usize>(), alleles_per_entity);
        *observed.entry(composition).or_insert(0) += 1;
    }

    let dense = simplex_size(alleles_per_entity, num_options)
        .is_some_and(|size| size <= DENSE_SIMPLEX_LIMIT);
    if dense {
        for point in compositions(alleles_per_entity, num_options) {
            observed.entry(point).or_insert(0);
        }
    }

    let denom = population.len();
    CompositionHistogram {
        num_options,
        alleles_per_entity,
        bins: observed
            .into_iter()
            .map(|(counts, n)| CompositionBin {
                counts,
                fraction: if denom == 0 { 0.0 } else { n as f64 / denom as f64 },
            })
            .collect(),
    }
}

/// Strategy fractions for every day of a run.
pub fn strategy_fractions_by_day(
    registry: &EntityRegistry,
    days: &[Vec<EntityId>],
    num_options: usize,
) -> Vec<Vec<f64>> {
    days.iter()
        .map(|pop| strategy_fractions(registry, pop, num_options))
        .collect()
}
