//! Append-only store of provenance records and lineage traversal.

use crate::error::Error;
use crate::model::ids::{ObjectId, ProvenanceId};
use crate::model::provenance::{Parent, Provenance};
use parking_lot::RwLockReadGuard;
use std::collections::{HashMap, HashSet};

/// Every provenance record ever created in a network, in append order.
///
/// The first record appended for an object is its primary record; later
/// records for the same object are alternate derivations. Records are
/// never edited or removed, not even when their object is pruned.
#[derive(Debug, Default, Clone)]
pub struct ProvenanceLedger {
    records: Vec<Provenance>,
    by_id: HashMap<ProvenanceId, usize>,
    by_object: HashMap<ObjectId, Vec<usize>>,
}

impl ProvenanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: ProvenanceId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Appends `record`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateObject`] if a record with the same id exists.
    pub fn append(&mut self, record: Provenance) -> Result<(), Error> {
        if self.contains(record.id()) {
            return Err(Error::duplicate("provenance record", record.id().as_uuid()));
        }
        let position = self.records.len();
        self.by_id.insert(record.id(), position);
        self.by_object
            .entry(record.object_id())
            .or_default()
            .push(position);
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, id: ProvenanceId) -> Option<&Provenance> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    /// The first record appended for `object`.
    pub fn primary_for(&self, object: impl Into<ObjectId>) -> Option<&Provenance> {
        self.records_for(object).next()
    }

    /// Primary record of `object` followed by its alternate derivations.
    pub fn records_for(&self, object: impl Into<ObjectId>) -> impl Iterator<Item = &Provenance> {
        self.by_object
            .get(&object.into())
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Provenance> {
        self.records.iter()
    }

    /// Walks from `record` up to its INPUT root.
    ///
    /// Each parent is resolved to its primary record. The walk yields an
    /// error and stops if a parent has no record or a record repeats.
    pub fn ancestors<'a>(&'a self, record: &'a Provenance) -> Ancestors<'a> {
        Ancestors {
            ledger: self,
            start: Some(record),
            walk: Walk::default(),
        }
    }
}

impl<'a> IntoIterator for &'a ProvenanceLedger {
    type Item = &'a Provenance;
    type IntoIter = std::slice::Iter<'a, Provenance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Traversal state shared by [`Ancestors`] and [`Lineage`].
#[derive(Debug, Default)]
struct Walk {
    next: Option<Parent>,
    seen: HashSet<ProvenanceId>,
}

impl Walk {
    fn starting_at(object: Parent) -> Self {
        Self {
            next: Some(object),
            seen: HashSet::new(),
        }
    }

    fn visit<'l>(&mut self, record: &'l Provenance) -> Result<&'l Provenance, Error> {
        if !self.seen.insert(record.id()) {
            self.next = None;
            return Err(Error::CycleDetected(record.id()));
        }
        self.next = record.parent().copied();
        Ok(record)
    }

    fn advance<'l>(&mut self, ledger: &'l ProvenanceLedger) -> Option<Result<&'l Provenance, Error>> {
        let parent = self.next.take()?;
        match ledger.primary_for(parent.object_id) {
            Some(record) => Some(self.visit(record)),
            None => Some(Err(Error::dangling(parent.object_type, parent.object_id))),
        }
    }
}

/// Lazy ancestor walk over a borrowed ledger.
#[derive(Debug)]
pub struct Ancestors<'a> {
    ledger: &'a ProvenanceLedger,
    start: Option<&'a Provenance>,
    walk: Walk,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a Provenance, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.start.take() {
            Some(record) => Some(self.walk.visit(record)),
            None => self.walk.advance(self.ledger),
        }
    }
}

/// Lazy lineage of a network object, from its primary record to the root.
///
/// Holds a read lock on the network's ledger while alive, so drop it before
/// inserting into the same network from this thread.
pub struct Lineage<'n> {
    ledger: RwLockReadGuard<'n, ProvenanceLedger>,
    walk: Walk,
}

impl<'n> Lineage<'n> {
    pub(crate) fn new(ledger: RwLockReadGuard<'n, ProvenanceLedger>, object: Parent) -> Self {
        Self {
            ledger,
            walk: Walk::starting_at(object),
        }
    }
}

impl Iterator for Lineage<'_> {
    type Item = Result<Provenance, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk
            .advance(&self.ledger)
            .map(|step| step.map(Provenance::clone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::StateId;
    use crate::model::provenance::{ObjectType, Origin};

    fn derived(id: StateId, parent: StateId, origin: Origin) -> Provenance {
        Provenance::create(
            ObjectType::State,
            id,
            origin,
            Some(Parent::new(ObjectType::State, parent)),
        )
        .unwrap()
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let mut ledger = ProvenanceLedger::new();
        let record = Provenance::input(ObjectType::State, StateId::random());
        ledger.append(record.clone()).unwrap();
        assert!(matches!(
            ledger.append(record),
            Err(Error::DuplicateObject { .. })
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn primary_record_is_the_first_appended() {
        let mut ledger = ProvenanceLedger::new();
        let (root, child) = (StateId::random(), StateId::random());
        let first = derived(child, root, Origin::Fragmentation);
        let second = derived(child, root, Origin::ConformerSearch);
        ledger.append(first.clone()).unwrap();
        ledger.append(second.clone()).unwrap();

        assert_eq!(ledger.primary_for(child), Some(&first));
        let all: Vec<_> = ledger.records_for(child).collect();
        assert_eq!(all, vec![&first, &second]);
        assert_eq!(ledger.records_for(root).count(), 0);
    }

    #[test]
    fn ancestors_end_at_input_root() {
        let mut ledger = ProvenanceLedger::new();
        let (a, b, c) = (StateId::random(), StateId::random(), StateId::random());
        ledger.append(Provenance::input(ObjectType::State, a)).unwrap();
        ledger.append(derived(b, a, Origin::Fragmentation)).unwrap();
        let tip = derived(c, b, Origin::Recombination);
        ledger.append(tip.clone()).unwrap();

        let chain: Vec<_> = ledger
            .ancestors(&tip)
            .map(|r| r.unwrap().object_id())
            .collect();
        assert_eq!(
            chain,
            vec![ObjectId::from(c), ObjectId::from(b), ObjectId::from(a)]
        );
    }

    #[test]
    fn missing_parent_is_reported() {
        let ledger = ProvenanceLedger::new();
        let orphan = derived(StateId::random(), StateId::random(), Origin::Fragmentation);
        let steps: Vec<_> = ledger.ancestors(&orphan).collect();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].is_ok());
        assert!(matches!(steps[1], Err(Error::DanglingReference { .. })));
    }

    #[test]
    fn cycles_are_detected() {
        let mut ledger = ProvenanceLedger::new();
        let (a, b) = (StateId::random(), StateId::random());
        ledger.append(derived(a, b, Origin::Fragmentation)).unwrap();
        let tip = derived(b, a, Origin::Recombination);
        ledger.append(tip.clone()).unwrap();

        let steps: Vec<_> = ledger.ancestors(&tip).collect();
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[2], Err(Error::CycleDetected(id)) if id == tip.id()));
    }
}
