//! Error types for network construction and mutation.
//!
//! Every variant represents a violated data invariant, not a transient
//! condition, so none of them are retried or swallowed. Validation happens
//! before any write, which means a returned error always leaves the
//! [`ReactionNetwork`](crate::ReactionNetwork) exactly as it was.

use crate::canon::StructureError;
use crate::model::ids::{ObjectId, ProvenanceId};
use crate::model::provenance::ObjectType;
use thiserror::Error;

/// Errors raised by identity objects, composite objects, the provenance
/// ledger and the reaction network.
#[derive(Debug, Error)]
pub enum Error {
    /// The molecular input could not be perceived or canonicalized.
    ///
    /// Fatal to the single state construction, never to the network.
    #[error("unusable structure: {0}")]
    Structure(#[from] StructureError),

    /// A provenance record violates the parent/origin rules.
    #[error("invalid provenance: {0}")]
    InvalidProvenance(String),

    /// The requested charge and spin multiplicity cannot describe the structure.
    #[error(
        "charge {charge} with spin multiplicity {spin} is inconsistent with {electrons} electrons"
    )]
    ChargeSpinMismatch {
        /// Net molecular charge.
        charge: i32,
        /// Spin multiplicity (2S + 1).
        spin: u32,
        /// Electron count implied by the structure and charge.
        electrons: i64,
    },

    /// A reaction has too many species or lacks an endpoint complex.
    #[error("reaction cardinality violated: {0}")]
    ReactionCardinality(String),

    /// A pathway was created without any states.
    #[error("a pathway requires at least one state")]
    EmptyPathway,

    /// A pathway does not show progress between consecutive states.
    #[error("pathway order violated at position {position}: {detail}")]
    PathwayOrder {
        /// Position of the offending member state.
        position: usize,
        /// Description of the problem.
        detail: String,
    },

    /// A referenced object is not committed to the network.
    #[error("{kind} {id} is not committed to the network")]
    DanglingReference {
        /// Type of the missing object.
        kind: ObjectType,
        /// Identifier of the missing object.
        id: ObjectId,
    },

    /// No provenance record exists for the object.
    #[error("object {0} has no provenance record")]
    UnknownObject(ObjectId),

    /// Lineage traversal revisited a record.
    #[error("provenance cycle detected at record {0}")]
    CycleDetected(ProvenanceId),

    /// An object or provenance record with the same id is already stored.
    #[error("{kind} {id} already exists")]
    DuplicateObject {
        /// What kind of entry collided.
        kind: &'static str,
        /// The colliding identifier.
        id: uuid::Uuid,
    },

    /// Failed to parse network configuration TOML.
    #[error("failed to parse network configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    /// Creates an [`InvalidProvenance`](Error::InvalidProvenance) error.
    pub fn invalid_provenance(details: impl Into<String>) -> Self {
        Self::InvalidProvenance(details.into())
    }

    /// Creates a [`PathwayOrder`](Error::PathwayOrder) error.
    pub fn pathway_order(position: usize, details: impl Into<String>) -> Self {
        Self::PathwayOrder {
            position,
            detail: details.into(),
        }
    }

    /// Creates a [`DanglingReference`](Error::DanglingReference) error.
    pub fn dangling(kind: ObjectType, id: impl Into<ObjectId>) -> Self {
        Self::DanglingReference {
            kind,
            id: id.into(),
        }
    }

    /// Creates a [`DuplicateObject`](Error::DuplicateObject) error.
    pub fn duplicate(kind: &'static str, id: &uuid::Uuid) -> Self {
        Self::DuplicateObject { kind, id: *id }
    }
}
