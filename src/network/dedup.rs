//! Fingerprint buckets used to detect rediscovered states.

use crate::model::ids::StateId;
use crate::model::state::State;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Bucket key: states can only be equivalent if these fields agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub graph_hash: String,
    pub charge: i32,
    pub spin_multiplicity: u32,
}

impl DedupKey {
    pub fn of(state: &State) -> Self {
        Self {
            graph_hash: state.graph_hash().to_string(),
            charge: state.charge(),
            spin_multiplicity: state.spin_multiplicity(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.graph_hash.chars().take(12).collect();
        write!(
            f,
            "{short} (charge {:+}, multiplicity {})",
            self.charge,
            self.spin_multiplicity
        )
    }
}

/// Where a state id stands in deduplication.
///
/// Every id starts as `Proposed`; the first admission makes it either
/// `Canonical` or `Merged` into an existing canonical state, and a merged id
/// is never promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupStatus {
    Proposed,
    Canonical,
    Merged(StateId),
}

pub(crate) type Bucket = Arc<Mutex<Vec<StateId>>>;

/// Per-key candidate lists plus the aliases of merged states.
///
/// Each bucket has its own mutex, held by the admitting thread across the
/// whole check-then-insert. The outer maps are only locked briefly.
#[derive(Debug, Default)]
pub(crate) struct DedupIndex {
    buckets: RwLock<HashMap<DedupKey, Bucket>>,
    merged: RwLock<HashMap<StateId, StateId>>,
}

impl DedupIndex {
    /// Returns the bucket for `key`, creating it if needed.
    pub fn bucket(&self, key: &DedupKey) -> Bucket {
        if let Some(bucket) = self.buckets.read().get(key) {
            return Arc::clone(bucket);
        }
        Arc::clone(self.buckets.write().entry(key.clone()).or_default())
    }

    /// Snapshot of the candidates for `key` without creating a bucket.
    pub fn candidates(&self, key: &DedupKey) -> Vec<StateId> {
        self.buckets
            .read()
            .get(key)
            .map(|bucket| bucket.lock().clone())
            .unwrap_or_default()
    }

    pub fn record_merge(&self, alias: StateId, canonical: StateId) {
        self.merged.write().insert(alias, canonical);
    }

    pub fn canonical_of(&self, alias: StateId) -> Option<StateId> {
        self.merged.read().get(&alias).copied()
    }

    pub fn aliases(&self) -> Vec<(StateId, StateId)> {
        let mut aliases: Vec<_> = self.merged.read().iter().map(|(a, c)| (*a, *c)).collect();
        aliases.sort();
        aliases
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Drops `removed` states from their buckets and forgets aliases of them.
    ///
    /// Takes `&mut self`, so no bucket lock can be held elsewhere.
    pub fn remove(&mut self, removed: &HashSet<StateId>) {
        self.buckets.get_mut().retain(|_, bucket| {
            let mut ids = bucket.lock();
            ids.retain(|id| !removed.contains(id));
            !ids.is_empty()
        });
        self.merged
            .get_mut()
            .retain(|_, canonical| !removed.contains(canonical));
    }
}
