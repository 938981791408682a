//! The reaction network: owner of every state, pathway, reaction, ensemble
//! and provenance record.
//!
//! Inserts take `&self` so a network can be shared between worker threads.
//! State admission is serialized per dedup bucket only; unrelated molecules
//! are admitted in parallel. When several locks are needed they are taken in
//! this order: dedup bucket, ensembles, reactions, pathways, states, ledger.

mod config;
mod dedup;
mod ledger;

pub use config::NetworkConfig;
pub use dedup::{DedupKey, DedupStatus};
pub use ledger::{Ancestors, Lineage, ProvenanceLedger};

pub use crate::error::Error;

use crate::canon::{Canonicalizer, GraphCanonicalizer};
use crate::model::ensemble::Ensemble;
use crate::model::ids::{EnsembleId, ObjectId, PathwayId, ReactionId, StateId};
use crate::model::pathway::Pathway;
use crate::model::provenance::{ObjectType, Parent, Provenance};
use crate::model::reaction::Reaction;
use crate::model::state::State;
use dedup::DedupIndex;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of [`ReactionNetwork::add_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAdmission {
    /// Id of the canonical state now representing the molecule.
    pub id: StateId,
    /// `false` if an equivalent state was already present.
    pub is_new: bool,
}

/// Owned objects a network is rebuilt from.
#[derive(Debug, Default)]
pub(crate) struct NetworkParts {
    pub ledger: ProvenanceLedger,
    pub states: Vec<State>,
    pub aliases: Vec<(StateId, StateId)>,
    pub pathways: Vec<Pathway>,
    pub reactions: Vec<Reaction>,
    pub ensembles: Vec<Ensemble>,
}

pub struct ReactionNetwork {
    config: NetworkConfig,
    canonicalizer: Arc<dyn Canonicalizer>,
    states: RwLock<BTreeMap<StateId, Arc<State>>>,
    pathways: RwLock<BTreeMap<PathwayId, Arc<Pathway>>>,
    reactions: RwLock<BTreeMap<ReactionId, Arc<Reaction>>>,
    ensembles: RwLock<BTreeMap<EnsembleId, Ensemble>>,
    ledger: RwLock<ProvenanceLedger>,
    dedup: DedupIndex,
}

impl fmt::Debug for ReactionNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionNetwork")
            .field("canonicalizer", &self.canonicalizer)
            .field("states", &self.state_count())
            .field("pathways", &self.pathway_count())
            .field("reactions", &self.reaction_count())
            .field("ensembles", &self.ensemble_count())
            .field("provenance_records", &self.provenance_count())
            .finish()
    }
}

impl Default for ReactionNetwork {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl ReactionNetwork {
    /// Creates an empty network using the built-in canonicalizer.
    pub fn new(config: NetworkConfig) -> Self {
        let canonicalizer = Arc::new(GraphCanonicalizer::new(config.canon.clone()));
        Self::with_canonicalizer(config, canonicalizer)
    }

    /// Creates an empty network backed by a custom canonicalizer.
    ///
    /// States added to the network must be built with the same
    /// canonicalizer, or equivalent molecules will not be recognized.
    pub fn with_canonicalizer(config: NetworkConfig, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        Self {
            config,
            canonicalizer,
            states: RwLock::default(),
            pathways: RwLock::default(),
            reactions: RwLock::default(),
            ensembles: RwLock::default(),
            ledger: RwLock::default(),
            dedup: DedupIndex::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The canonicalizer states for this network should be built with.
    pub fn canonicalizer(&self) -> &dyn Canonicalizer {
        self.canonicalizer.as_ref()
    }

    /// Admits `state` unless an equivalent state is already present.
    ///
    /// Candidates sharing the state's [`DedupKey`] are compared by canonical
    /// notation. On a match the proposed state is discarded, its id is
    /// remembered as merged, and (unless disabled in the configuration) its
    /// provenance is appended to the ledger as an alternate derivation of the
    /// canonical state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] if the state's provenance names
    /// a parent with no record in this network, and
    /// [`Error::DuplicateObject`] if the proposed id or its provenance record
    /// is already used by a different object.
    pub fn add_state(&self, state: State) -> Result<StateAdmission, Error> {
        require_parent(&self.ledger.read(), state.provenance())?;

        let key = DedupKey::of(&state);
        let bucket = self.dedup.bucket(&key);
        let mut candidates = bucket.lock();

        let existing = {
            let states = self.states.read();
            candidates.iter().find_map(|id| {
                states
                    .get(id)
                    .filter(|c| c.canonical_notation() == state.canonical_notation())
                    .map(|c| Parent::new(c.kind().object_type(), *id))
            })
        };

        if let Some(target) = existing {
            let canonical = StateId::from(target.object_id);
            if canonical != state.id() {
                self.merge(&state, target)?;
            }
            debug!(state = %state.id(), %canonical, bucket = %key, "state already present");
            return Ok(StateAdmission {
                id: canonical,
                is_new: false,
            });
        }

        let id = state.id();
        let mut states = self.states.write();
        let mut ledger = self.ledger.write();
        if states.contains_key(&id) || self.dedup.canonical_of(id).is_some() {
            return Err(Error::duplicate("state", id.as_uuid()));
        }
        ledger.append(state.provenance().clone())?;
        states.insert(id, Arc::new(state));
        candidates.push(id);

        debug!(state = %id, bucket = %key, candidates = candidates.len(), "admitted new state");
        Ok(StateAdmission { id, is_new: true })
    }

    fn merge(&self, proposed: &State, target: Parent) -> Result<(), Error> {
        let alias = proposed.id();
        let canonical = StateId::from(target.object_id);
        if self.states.read().contains_key(&alias) {
            return Err(Error::duplicate("state", alias.as_uuid()));
        }
        match self.dedup.canonical_of(alias) {
            Some(previous) if previous == canonical => return Ok(()),
            Some(_) => return Err(Error::duplicate("state", alias.as_uuid())),
            None => {}
        }

        if self.config.record_alternate_provenance {
            let record = proposed.provenance().retarget(target);
            let mut ledger = self.ledger.write();
            if !ledger.contains(record.id()) {
                warn!(
                    proposed = %alias,
                    %canonical,
                    origin = %record.origin(),
                    "rediscovered state; recording alternate derivation"
                );
                ledger.append(record)?;
            }
        }
        self.dedup.record_merge(alias, canonical);
        Ok(())
    }

    /// Stores `pathway`; every member state must be canonical in this network.
    pub fn add_pathway(&self, pathway: Pathway) -> Result<PathwayId, Error> {
        let id = pathway.id();
        let mut pathways = self.pathways.write();
        if pathways.contains_key(&id) {
            return Err(Error::duplicate("pathway", id.as_uuid()));
        }
        {
            let states = self.states.read();
            if let Some(missing) = pathway.states().iter().find(|s| !states.contains_key(*s)) {
                return Err(Error::dangling(ObjectType::State, *missing));
            }
        }

        append_record(&mut self.ledger.write(), pathway.provenance())?;
        debug!(pathway = %id, states = pathway.len(), "stored pathway");
        pathways.insert(id, Arc::new(pathway));
        Ok(id)
    }

    /// Stores `reaction`; every state it references, and its pathway if
    /// any, must already be committed.
    pub fn add_reaction(&self, reaction: Reaction) -> Result<ReactionId, Error> {
        let id = reaction.id();
        let mut reactions = self.reactions.write();
        if reactions.contains_key(&id) {
            return Err(Error::duplicate("reaction", id.as_uuid()));
        }
        if let Some(pathway) = reaction.pathway() {
            if !self.pathways.read().contains_key(&pathway) {
                return Err(Error::dangling(ObjectType::Pathway, pathway));
            }
        }
        {
            let states = self.states.read();
            if let Some(missing) = reaction
                .state_ids()
                .into_iter()
                .find(|s| !states.contains_key(s))
            {
                return Err(Error::dangling(ObjectType::State, missing));
            }
        }

        append_record(&mut self.ledger.write(), reaction.provenance())?;
        debug!(
            reaction = %id,
            reactants = reaction.number_reactants(),
            products = reaction.number_products(),
            "stored reaction"
        );
        reactions.insert(id, Arc::new(reaction));
        Ok(id)
    }

    /// Stores `ensemble`; its member reactions must already be stored.
    pub fn add_ensemble(&self, ensemble: Ensemble) -> Result<EnsembleId, Error> {
        let id = ensemble.id();
        let mut ensembles = self.ensembles.write();
        if ensembles.contains_key(&id) {
            return Err(Error::duplicate("ensemble", id.as_uuid()));
        }
        {
            let reactions = self.reactions.read();
            if let Some(missing) = ensemble
                .reactions()
                .iter()
                .find(|r| !reactions.contains_key(*r))
            {
                return Err(Error::dangling(ObjectType::Reaction, *missing));
            }
        }

        append_record(&mut self.ledger.write(), ensemble.provenance())?;
        debug!(ensemble = %id, name = ensemble.name(), "stored ensemble");
        ensembles.insert(id, ensemble);
        Ok(id)
    }

    /// Adds a stored reaction to a stored ensemble.
    ///
    /// Returns `false` if the reaction was already a member.
    pub fn add_to_ensemble(&self, ensemble: EnsembleId, reaction: ReactionId) -> Result<bool, Error> {
        let mut ensembles = self.ensembles.write();
        let target = ensembles
            .get_mut(&ensemble)
            .ok_or_else(|| Error::dangling(ObjectType::Ensemble, ensemble))?;
        if !self.reactions.read().contains_key(&reaction) {
            return Err(Error::dangling(ObjectType::Reaction, reaction));
        }
        Ok(target.add_reaction(reaction))
    }

    /// Removes derived states no reaction or pathway references.
    ///
    /// Input states are always kept. Provenance of removed states stays in
    /// the ledger. Returns the removed ids in ascending order.
    pub fn prune_unreferenced(&mut self) -> Vec<StateId> {
        let mut referenced: HashSet<StateId> = HashSet::new();
        for reaction in self.reactions.get_mut().values() {
            referenced.extend(reaction.state_ids());
        }
        for pathway in self.pathways.get_mut().values() {
            referenced.extend(pathway.states().iter().copied());
        }

        let states = self.states.get_mut();
        let doomed: Vec<StateId> = states
            .values()
            .filter(|s| !s.is_input() && !referenced.contains(&s.id()))
            .map(|s| s.id())
            .collect();
        for id in &doomed {
            states.remove(id);
        }
        let remaining = states.len();

        let removed: HashSet<StateId> = doomed.iter().copied().collect();
        self.dedup.remove(&removed);
        info!(pruned = doomed.len(), remaining, "pruned unreferenced states");
        doomed
    }

    /// Lazy provenance lineage of `object`, starting at its primary record.
    ///
    /// Merged state ids are resolved to their canonical state first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownObject`] if the object has no record.
    pub fn lineage_of(&self, object: impl Into<ObjectId>) -> Result<Lineage<'_>, Error> {
        let mut object = object.into();
        if let Some(canonical) = self.dedup.canonical_of(StateId::from(object)) {
            object = canonical.into();
        }
        let ledger = self.ledger.read();
        let object_type = ledger
            .primary_for(object)
            .map(Provenance::object_type)
            .ok_or(Error::UnknownObject(object))?;
        Ok(Lineage::new(ledger, Parent::new(object_type, object)))
    }

    /// Every record for `object`: the primary one, then alternate derivations.
    pub fn records_for(&self, object: impl Into<ObjectId>) -> Vec<Provenance> {
        self.ledger.read().records_for(object).cloned().collect()
    }

    /// Runs `f` with shared access to the ledger.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&ProvenanceLedger) -> R) -> R {
        f(&*self.ledger.read())
    }

    pub fn status_of(&self, id: StateId) -> DedupStatus {
        if self.states.read().contains_key(&id) {
            DedupStatus::Canonical
        } else if let Some(canonical) = self.dedup.canonical_of(id) {
            DedupStatus::Merged(canonical)
        } else {
            DedupStatus::Proposed
        }
    }

    /// The live canonical id `id` stands for, if any.
    pub fn resolve(&self, id: StateId) -> Option<StateId> {
        let states = self.states.read();
        if states.contains_key(&id) {
            return Some(id);
        }
        self.dedup
            .canonical_of(id)
            .filter(|canonical| states.contains_key(canonical))
    }

    /// Id of a committed state equivalent to `state`, without inserting.
    pub fn find_equivalent(&self, state: &State) -> Option<StateId> {
        let candidates = self.dedup.candidates(&DedupKey::of(state));
        let states = self.states.read();
        candidates
            .into_iter()
            .find(|id| states.get(id).is_some_and(|c| c.is_equivalent(state)))
    }

    pub fn state(&self, id: StateId) -> Option<Arc<State>> {
        self.states.read().get(&id).cloned()
    }

    pub fn pathway(&self, id: PathwayId) -> Option<Arc<Pathway>> {
        self.pathways.read().get(&id).cloned()
    }

    pub fn reaction(&self, id: ReactionId) -> Option<Arc<Reaction>> {
        self.reactions.read().get(&id).cloned()
    }

    pub fn ensemble(&self, id: EnsembleId) -> Option<Ensemble> {
        self.ensembles.read().get(&id).cloned()
    }

    pub fn states(&self) -> Vec<Arc<State>> {
        self.states.read().values().cloned().collect()
    }

    pub fn pathways(&self) -> Vec<Arc<Pathway>> {
        self.pathways.read().values().cloned().collect()
    }

    pub fn reactions(&self) -> Vec<Arc<Reaction>> {
        self.reactions.read().values().cloned().collect()
    }

    pub fn ensembles(&self) -> Vec<Ensemble> {
        self.ensembles.read().values().cloned().collect()
    }

    /// Merged state ids paired with their canonical ids.
    pub fn merged_aliases(&self) -> Vec<(StateId, StateId)> {
        self.dedup.aliases()
    }

    /// Reactions referencing `state` directly.
    pub fn reactions_involving(&self, state: StateId) -> Vec<ReactionId> {
        self.reactions
            .read()
            .values()
            .filter(|r| r.involves(state))
            .map(|r| r.id())
            .collect()
    }

    pub fn state_count(&self) -> usize {
        self.states.read().len()
    }

    pub fn pathway_count(&self) -> usize {
        self.pathways.read().len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.read().len()
    }

    pub fn ensemble_count(&self) -> usize {
        self.ensembles.read().len()
    }

    pub fn provenance_count(&self) -> usize {
        self.ledger.read().len()
    }

    /// Rebuilds a network from persisted objects.
    ///
    /// The ledger is taken as is. Every object must have its primary record
    /// in it, and references are checked in dependency order.
    pub(crate) fn from_parts(
        config: NetworkConfig,
        canonicalizer: Arc<dyn Canonicalizer>,
        parts: NetworkParts,
    ) -> Result<Self, Error> {
        let NetworkParts {
            ledger,
            states,
            aliases,
            pathways,
            reactions,
            ensembles,
        } = parts;

        let mut network = Self::with_canonicalizer(config, canonicalizer);

        fn check_primary(
            ledger: &ProvenanceLedger,
            kind: ObjectType,
            id: ObjectId,
            record: &Provenance,
        ) -> Result<(), Error> {
            match ledger.primary_for(id) {
                Some(primary) if primary == record => Ok(()),
                Some(_) => Err(Error::invalid_provenance(format!(
                    "{kind} {id} does not carry its primary provenance record"
                ))),
                None => Err(Error::UnknownObject(id)),
            }
        }

        {
            let map = network.states.get_mut();
            for state in states {
                let id = state.id();
                check_primary(&ledger, state.kind().object_type(), id.into(), state.provenance())?;
                if map.contains_key(&id) {
                    return Err(Error::duplicate("state", id.as_uuid()));
                }
                let bucket = network.dedup.bucket(&DedupKey::of(&state));
                let mut candidates = bucket.lock();
                if let Some(twin) = candidates
                    .iter()
                    .find(|c| map.get(*c).is_some_and(|other| other.is_equivalent(&state)))
                {
                    return Err(Error::invalid_provenance(format!(
                        "states {twin} and {id} are equivalent but both canonical"
                    )));
                }
                candidates.push(id);
                map.insert(id, Arc::new(state));
            }

            for (alias, canonical) in aliases {
                if map.contains_key(&alias) {
                    return Err(Error::duplicate("state", alias.as_uuid()));
                }
                if !map.contains_key(&canonical) {
                    return Err(Error::dangling(ObjectType::State, canonical));
                }
                network.dedup.record_merge(alias, canonical);
            }
        }

        for pathway in pathways {
            let id = pathway.id();
            check_primary(&ledger, ObjectType::Pathway, id.into(), pathway.provenance())?;
            let states = network.states.get_mut();
            if let Some(missing) = pathway.states().iter().find(|s| !states.contains_key(*s)) {
                return Err(Error::dangling(ObjectType::State, *missing));
            }
            if network
                .pathways
                .get_mut()
                .insert(id, Arc::new(pathway))
                .is_some()
            {
                return Err(Error::duplicate("pathway", id.as_uuid()));
            }
        }

        for reaction in reactions {
            let id = reaction.id();
            check_primary(&ledger, ObjectType::Reaction, id.into(), reaction.provenance())?;
            if let Some(pathway) = reaction.pathway() {
                if !network.pathways.get_mut().contains_key(&pathway) {
                    return Err(Error::dangling(ObjectType::Pathway, pathway));
                }
            }
            let states = network.states.get_mut();
            if let Some(missing) = reaction
                .state_ids()
                .into_iter()
                .find(|s| !states.contains_key(s))
            {
                return Err(Error::dangling(ObjectType::State, missing));
            }
            if network
                .reactions
                .get_mut()
                .insert(id, Arc::new(reaction))
                .is_some()
            {
                return Err(Error::duplicate("reaction", id.as_uuid()));
            }
        }

        for ensemble in ensembles {
            let id = ensemble.id();
            check_primary(&ledger, ObjectType::Ensemble, id.into(), ensemble.provenance())?;
            let reactions = network.reactions.get_mut();
            if let Some(missing) = ensemble
                .reactions()
                .iter()
                .find(|r| !reactions.contains_key(*r))
            {
                return Err(Error::dangling(ObjectType::Reaction, *missing));
            }
            if network.ensembles.get_mut().insert(id, ensemble).is_some() {
                return Err(Error::duplicate("ensemble", id.as_uuid()));
            }
        }

        *network.ledger.get_mut() = ledger;
        info!(
            states = network.state_count(),
            reactions = network.reaction_count(),
            pathways = network.pathway_count(),
            ensembles = network.ensemble_count(),
            records = network.provenance_count(),
            "rebuilt reaction network"
        );
        Ok(network)
    }
}

/// A derived record may only name a parent that already has a primary
/// record, so every lineage ends at an INPUT record and never loops.
fn require_parent(ledger: &ProvenanceLedger, record: &Provenance) -> Result<(), Error> {
    match record.parent() {
        Some(parent) if ledger.primary_for(parent.object_id).is_none() => {
            Err(Error::dangling(parent.object_type, parent.object_id))
        }
        _ => Ok(()),
    }
}

fn append_record(ledger: &mut ProvenanceLedger, record: &Provenance) -> Result<(), Error> {
    require_parent(ledger, record)?;
    ledger.append(record.clone())
}
