//! Immutable derivation records.
//!
//! A [`Provenance`] says how one network object came to exist: either it was
//! supplied by the user ([`Origin::Input`]) or it was derived from a parent
//! object by some computation. Records are built once, validated on
//! construction, and never edited afterwards.

use super::ids::{ObjectId, ProvenanceId};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of network object a provenance record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    State,
    Endpoint,
    TransitionState,
    Pathway,
    Reaction,
    Ensemble,
}

impl ObjectType {
    /// Integer code used by the persistence schema.
    pub fn code(&self) -> i64 {
        match self {
            ObjectType::State => 1,
            ObjectType::Endpoint => 2,
            ObjectType::TransitionState => 3,
            ObjectType::Pathway => 4,
            ObjectType::Reaction => 5,
            ObjectType::Ensemble => 6,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ObjectType::State),
            2 => Some(ObjectType::Endpoint),
            3 => Some(ObjectType::TransitionState),
            4 => Some(ObjectType::Pathway),
            5 => Some(ObjectType::Reaction),
            6 => Some(ObjectType::Ensemble),
            _ => None,
        }
    }

    /// Whether objects of this type are molecular states.
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            ObjectType::State | ObjectType::Endpoint | ObjectType::TransitionState
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectType::State => "STATE",
            ObjectType::Endpoint => "ENDPOINT",
            ObjectType::TransitionState => "TRANSITION_STATE",
            ObjectType::Pathway => "PATHWAY",
            ObjectType::Reaction => "REACTION",
            ObjectType::Ensemble => "ENSEMBLE",
        })
    }
}

/// Source of a network object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Provided by the user.
    Input,
    /// Obtained by fragmenting a molecule.
    Fragmentation,
    /// Obtained by recombining fragments.
    Recombination,
    /// Obtained via conformer search.
    ConformerSearch,
    /// Obtained via reaction path optimization.
    PathOptimization,
    /// Obtained from a reaction endpoint.
    EndpointDerived,
}

impl Origin {
    pub fn code(&self) -> i64 {
        match self {
            Origin::Input => 1,
            Origin::Fragmentation => 2,
            Origin::Recombination => 3,
            Origin::ConformerSearch => 4,
            Origin::PathOptimization => 5,
            Origin::EndpointDerived => 6,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Origin::Input),
            2 => Some(Origin::Fragmentation),
            3 => Some(Origin::Recombination),
            4 => Some(Origin::ConformerSearch),
            5 => Some(Origin::PathOptimization),
            6 => Some(Origin::EndpointDerived),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Input => "INPUT",
            Origin::Fragmentation => "FRAGMENTATION",
            Origin::Recombination => "RECOMBINATION",
            Origin::ConformerSearch => "CONFORMER_SEARCH",
            Origin::PathOptimization => "PATH_OPTIMIZATION",
            Origin::EndpointDerived => "ENDPOINT_DERIVED",
        })
    }
}

/// The object a derived record points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parent {
    pub object_type: ObjectType,
    pub object_id: ObjectId,
}

impl Parent {
    pub fn new(object_type: ObjectType, object_id: impl Into<ObjectId>) -> Self {
        Self {
            object_type,
            object_id: object_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    id: ProvenanceId,
    object_type: ObjectType,
    object_id: ObjectId,
    origin: Origin,
    parent: Option<Parent>,
    calc_method: Option<String>,
    level_of_theory: Option<String>,
    index: Option<u32>,
    path: Option<PathBuf>,
}

impl Provenance {
    /// Creates a record with no optional annotations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProvenance`] if `origin` is [`Origin::Input`]
    /// and a parent is given, or if any other origin lacks a parent.
    pub fn create(
        object_type: ObjectType,
        object_id: impl Into<ObjectId>,
        origin: Origin,
        parent: Option<Parent>,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder(object_type, object_id, origin);
        builder.parent = parent;
        builder.build()
    }

    /// A record for an object supplied directly by the user.
    pub fn input(object_type: ObjectType, object_id: impl Into<ObjectId>) -> Self {
        Self {
            id: ProvenanceId::random(),
            object_type,
            object_id: object_id.into(),
            origin: Origin::Input,
            parent: None,
            calc_method: None,
            level_of_theory: None,
            index: None,
            path: None,
        }
    }

    pub fn builder(
        object_type: ObjectType,
        object_id: impl Into<ObjectId>,
        origin: Origin,
    ) -> ProvenanceBuilder {
        ProvenanceBuilder {
            id: None,
            object_type,
            object_id: object_id.into(),
            origin,
            parent: None,
            calc_method: None,
            level_of_theory: None,
            index: None,
            path: None,
        }
    }

    pub fn id(&self) -> ProvenanceId {
        self.id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.parent.as_ref()
    }

    pub fn calc_method(&self) -> Option<&str> {
        self.calc_method.as_deref()
    }

    pub fn level_of_theory(&self) -> Option<&str> {
        self.level_of_theory.as_deref()
    }

    /// Position along a pathway, where 0 is the reactant endpoint.
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// Directory holding calculation artifacts, if any exist.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_input(&self) -> bool {
        self.origin == Origin::Input
    }

    /// Copy of this record attached to another object.
    ///
    /// Used when a rediscovered state is merged into an existing canonical
    /// state: the derivation is kept, pointing at the surviving object.
    pub(crate) fn retarget(&self, target: Parent) -> Self {
        Self {
            object_type: target.object_type,
            object_id: target.object_id,
            ..self.clone()
        }
    }
}

/// Builder for [`Provenance`] records carrying optional annotations.
///
/// # Examples
///
/// ```
/// use rxn_ledger::{ObjectId, ObjectType, Origin, Parent, Provenance, StateId};
///
/// let parent = StateId::random();
/// let child = StateId::random();
/// let record = Provenance::builder(ObjectType::State, child, Origin::Fragmentation)
///     .parent(Parent::new(ObjectType::State, parent))
///     .calc_method("xtb")
///     .level_of_theory("GFN2-xTB")
///     .build()?;
///
/// assert_eq!(record.parent().unwrap().object_id, ObjectId::from(parent));
/// # Ok::<(), rxn_ledger::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProvenanceBuilder {
    id: Option<ProvenanceId>,
    object_type: ObjectType,
    object_id: ObjectId,
    origin: Origin,
    parent: Option<Parent>,
    calc_method: Option<String>,
    level_of_theory: Option<String>,
    index: Option<u32>,
    path: Option<PathBuf>,
}

impl ProvenanceBuilder {
    /// Uses an existing record id instead of generating one (rehydration).
    pub fn id(mut self, id: ProvenanceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn parent(mut self, parent: Parent) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn calc_method(mut self, method: impl Into<String>) -> Self {
        self.calc_method = Some(method.into());
        self
    }

    pub fn level_of_theory(mut self, level: impl Into<String>) -> Self {
        self.level_of_theory = Some(level.into());
        self
    }

    pub fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Provenance, Error> {
        match (self.origin, &self.parent) {
            (Origin::Input, Some(parent)) => {
                return Err(Error::invalid_provenance(format!(
                    "INPUT record for {} {} cannot have parent {} {}",
                    self.object_type, self.object_id, parent.object_type, parent.object_id
                )));
            }
            (origin, None) if origin != Origin::Input => {
                return Err(Error::invalid_provenance(format!(
                    "{origin} record for {} {} requires a parent",
                    self.object_type, self.object_id
                )));
            }
            _ => {}
        }

        if self.index.is_some() && !self.object_type.is_state() {
            return Err(Error::invalid_provenance(format!(
                "path index is only meaningful for states, not {}",
                self.object_type
            )));
        }

        Ok(Provenance {
            id: self.id.unwrap_or_else(ProvenanceId::random),
            object_type: self.object_type,
            object_id: self.object_id,
            origin: self.origin,
            parent: self.parent,
            calc_method: self.calc_method,
            level_of_theory: self.level_of_theory,
            index: self.index,
            path: self.path,
        })
    }
}

/// Resolves the provenance an object is created with.
///
/// With no record, the object gets a fresh id and an INPUT record. With a
/// record, the object takes the record's `object_id` as its own id, and the
/// record must describe an object of an accepted type.
pub(crate) fn adopt(
    accepted: &[ObjectType],
    default_type: ObjectType,
    provenance: Option<Provenance>,
) -> Result<(ObjectId, Provenance), Error> {
    match provenance {
        None => {
            let id = ObjectId::random();
            Ok((id, Provenance::input(default_type, id)))
        }
        Some(record) if accepted.contains(&record.object_type()) => {
            Ok((record.object_id(), record))
        }
        Some(record) => Err(Error::invalid_provenance(format!(
            "record {} describes a {} but a {} was expected",
            record.id(),
            record.object_type(),
            default_type
        ))),
    }
}
