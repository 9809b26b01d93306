//! Append-only entity store: genotype-by-id and parent-by-id.
//!
//! Ids are dense and increasing from 0. A parent is always an earlier id, or
//! `None` for generation 0. Entries are never mutated once created.

use crate::error::RegistryError;
use crate::genotype::Genotype;
use serde::{Deserialize, Serialize};

pub type EntityId = u32;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistry {
    genotypes: Vec<Genotype>,
    parents: Vec<Option<EntityId>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            genotypes: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    fn next_id_checked(&self) -> Result<EntityId, RegistryError> {
        EntityId::try_from(self.genotypes.len()).map_err(|_| RegistryError::IdSpaceExhausted)
    }

    /// Append a new entity and return its id.
    pub fn create(
        &mut self,
        genotype: Genotype,
        parent: Option<EntityId>,
    ) -> Result<EntityId, RegistryError> {
        let id = self.next_id_checked()?;
        debug_assert!(
            parent.is_none_or(|p| p < id),
            "parent {parent:?} must precede child {id}"
        );
        self.genotypes.push(genotype);
        self.parents.push(parent);
        Ok(id)
    }

    /// Drop every entity with id `>= len`. Undoes a day that failed midway.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.genotypes.truncate(len);
        self.parents.truncate(len);
    }

    pub fn genotype(&self, id: EntityId) -> Option<&Genotype> {
        self.genotypes.get(id as usize)
    }

    /// `None` for unknown ids; `Some(None)` for generation-0 entities.
    pub fn parent(&self, id: EntityId) -> Option<Option<EntityId>> {
        self.parents.get(id as usize).copied()
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    pub fn parents(&self) -> &[Option<EntityId>] {
        &self.parents
    }

    /// Parent links from `id` back to its generation-0 founder, nearest first.
    pub fn ancestors(&self, id: EntityId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: self.parent(id).flatten(),
        }
    }

    /// The generation-0 entity `id` descends from (itself if it is a founder).
    pub fn founder(&self, id: EntityId) -> Option<EntityId> {
        self.parent(id)?;
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// Check every structural invariant; used by tests and tooling.
    pub fn check_invariants(&self, alleles_per_entity: usize) -> Result<(), RegistryError> {
        if self.genotypes.len() != self.parents.len() {
            return Err(RegistryError::ColumnLengthMismatch {
                genotypes: self.genotypes.len(),
                parents: self.parents.len(),
            });
        }
        for (idx, (genotype, parent)) in self.genotypes.iter().zip(&self.parents).enumerate() {
            let id = idx as EntityId;
            if genotype.len() != alleles_per_entity {
                return Err(RegistryError::GenotypeLength {
                    id,
                    expected: alleles_per_entity,
                    actual: genotype.len(),
                });
            }
            if let Some(p) = *parent {
                if p >= id {
                    return Err(RegistryError::ParentNotEarlier { child: id, parent: p });
                }
            }
        }
        Ok(())
    }
}

pub struct Ancestors<'a> {
    registry: &'a EntityRegistry,
    next: Option<EntityId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let current = self.next?;
        self.next = self.registry.parent(current).flatten();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineage_registry() -> EntityRegistry {
        let mut reg = EntityRegistry::new();
        let a = reg.create(Genotype::single(0), None).unwrap();
        let b = reg.create(Genotype::single(1), None).unwrap();
        let a1 = reg.create(Genotype::single(0), Some(a)).unwrap();
        let a2 = reg.create(Genotype::single(0), Some(a1)).unwrap();
        let _b1 = reg.create(Genotype::single(2), Some(b)).unwrap();
        assert_eq!(a2, 3);
        reg
    }

    #[test]
    fn ids_are_dense_from_zero() {
        let reg = lineage_registry();
        assert_eq!(reg.len(), 5);
        assert_eq!(reg.genotype(4), Some(&Genotype::single(2)));
        assert_eq!(reg.parent(0), Some(None));
        assert_eq!(reg.parent(4), Some(Some(1)));
        assert_eq!(reg.parent(5), None);
    }

    #[test]
    fn truncate_drops_later_entities_only() {
        let mut reg = lineage_registry();
        let before = reg.len();
        reg.truncate(2);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.parents().len(), 2);
        assert_eq!(reg.genotype(2), None);
        assert_eq!(reg.create(Genotype::single(1), Some(0)).unwrap(), 2);
        reg.truncate(before + 10);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn ancestors_walk_back_to_founder() {
        let reg = lineage_registry();
        assert_eq!(reg.ancestors(3).collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(reg.ancestors(0).count(), 0);
        assert_eq!(reg.founder(3), Some(0));
        assert_eq!(reg.founder(4), Some(1));
        assert_eq!(reg.founder(1), Some(1));
        assert_eq!(reg.founder(42), None);
    }

    #[test]
    fn invariants_hold_for_well_formed_registry() {
        lineage_registry()
            .check_invariants(1)
            .expect("registry should be well formed");
    }

    #[test]
    fn invariant_check_reports_genotype_length() {
        let reg = lineage_registry();
        assert_eq!(
            reg.check_invariants(2),
            Err(RegistryError::GenotypeLength {
                id: 0,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn invariant_check_reports_future_parent() {
        let reg = EntityRegistry {
            genotypes: vec![Genotype::single(0), Genotype::single(0)],
            parents: vec![Some(1), None],
        };
        assert_eq!(
            reg.check_invariants(1),
            Err(RegistryError::ParentNotEarlier { child: 0, parent: 1 })
        );
    }
}
