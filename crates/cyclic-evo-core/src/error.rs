use crate::registry::EntityId;
use thiserror::Error;

/// Configuration rejected by [`crate::SimConfig::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimConfigError {
    #[error("num_options ({actual}) must be between {min} and {max}")]
    InvalidNumOptions { min: usize, max: usize, actual: usize },
    #[error("initial_population must be positive")]
    EmptyInitialPopulation,
    #[error("initial_population ({actual}) exceeds supported maximum ({max})")]
    InitialPopulationTooLarge { max: usize, actual: usize },
    #[error("alleles_per_entity ({actual}) must be between 1 and {max}")]
    InvalidAllelesPerEntity { max: usize, actual: usize },
    #[error("num_days ({actual}) exceeds supported maximum ({max})")]
    TooManyDays { max: usize, actual: usize },
    #[error("mutation_rate must be finite and within [0, 1]")]
    InvalidMutationRate,
    #[error("{name} must be finite")]
    NonFinitePayoff { name: &'static str },
    #[error("genotype distribution is empty")]
    EmptyGenotypeDistribution,
    #[error("genotype {index} has {actual} alleles, expected {expected}")]
    GenotypeLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("genotype {index} contains allele {allele}, outside [0, {num_options})")]
    AlleleOutOfRange {
        index: usize,
        allele: usize,
        num_options: usize,
    },
    #[error("genotype weights must be finite, non-negative and not all zero")]
    InvalidGenotypeWeights,
}

/// Violations of the entity registry's invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("entity id space exhausted")]
    IdSpaceExhausted,
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("entity {child} names parent {parent}, which is not an earlier entity")]
    ParentNotEarlier { child: EntityId, parent: EntityId },
    #[error("entity {id} has {actual} alleles, expected {expected}")]
    GenotypeLength {
        id: EntityId,
        expected: usize,
        actual: usize,
    },
    #[error("genotype-by-id and parent-by-id differ in length ({genotypes} vs {parents})")]
    ColumnLengthMismatch { genotypes: usize, parents: usize },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] SimConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("genotype distribution: {0}")]
    Distribution(#[from] rand::distr::weighted::Error),
}

pub type SimResult<T> = Result<T, SimError>;
