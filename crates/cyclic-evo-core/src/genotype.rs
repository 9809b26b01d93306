use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

/// One strategy option index within a genotype.
pub type Allele = u8;

/// An entity's full set of strategy alleles.
///
/// Length 1 is the plain single-strategy case; longer genotypes are
/// "mixed strategies" whose holder plays one allele per contest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genotype(Vec<Allele>);

impl Genotype {
    pub fn new(alleles: Vec<Allele>) -> Self {
        Self(alleles)
    }

    pub fn single(allele: Allele) -> Self {
        Self(vec![allele])
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The strategy played in one contest.
    ///
    /// Single-allele genotypes consume no randomness.
    pub fn effective_strategy(&self, rng: &mut SimRng) -> Allele {
        match self.0.as_slice() {
            [only] => *only,
            alleles => alleles[rng.uniform_int(alleles.len())],
        }
    }

    /// Count of each option across the alleles, indexed by option.
    pub fn composition(&self, num_options: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_options];
        for &a in &self.0 {
            counts[a as usize] += 1;
        }
        counts
    }

    /// Copy of this genotype for a newborn, with mutation applied.
    /// Returns the child genotype and how many alleles changed.
    pub fn inherit(&self, policy: &MutationPolicy, rng: &mut SimRng) -> (Genotype, usize) {
        let mut child = self.clone();
        let changed = policy.mutate(&mut child.0, rng);
        (child, changed)
    }
}

impl From<Vec<Allele>> for Genotype {
    fn from(alleles: Vec<Allele>) -> Self {
        Self(alleles)
    }
}

/// Per-allele rotation mutation around the cyclic strategy ring.
///
/// Each allele draws once: below `rate / 2` it advances by one option, below
/// `rate` it advances by two, otherwise it is copied unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationPolicy {
    pub rate: f64,
    pub num_options: usize,
}

impl MutationPolicy {
    pub fn new(rate: f64, num_options: usize) -> Self {
        Self { rate, num_options }
    }

    pub fn is_active(&self) -> bool {
        self.rate > 0.0
    }

    /// Mutate `alleles` in place. A zero rate draws nothing.
    pub fn mutate(&self, alleles: &mut [Allele], rng: &mut SimRng) -> usize {
        if !self.is_active() {
            return 0;
        }
        let half = self.rate / 2.0;
        let mut changed = 0;
        for a in alleles.iter_mut() {
            let r = rng.uniform_float(1.0);
            let step = if r < half {
                1
            } else if r < self.rate {
                2
            } else {
                continue;
            };
            *a = ((*a as usize + step) % self.num_options) as Allele;
            changed += 1;
        }
        changed
    }
}
