//! Identity, deduplication, and provenance tracking for chemical reaction networks.
//!
//! A [`ReactionNetwork`] owns molecular [`State`]s, the [`Reaction`]s that
//! connect them, multi-step [`Pathway`]s, named [`Ensemble`]s of related
//! reactions, and an append-only ledger of [`Provenance`] records describing
//! how every object was derived.
//!
//! # Features
//!
//! - **Stable identity** – typed 128-bit ids for every object, each created
//!   together with exactly one primary provenance record
//! - **Deduplication** – states are fingerprinted once at construction and
//!   bucketed by `(graph hash, charge, spin)`; rediscovered molecules resolve
//!   to the existing canonical state and keep their derivation as an
//!   alternate provenance record
//! - **Lineage** – lazy traversal from any object back to its input roots
//! - **Persistence** – relational schema plus JSON snapshots that rebuild the
//!   network, dedup index included
//! - **Structure adapters** – SDF/MOL (V2000) and XYZ readers
//!
//! # Quick Start
//!
//! ```
//! use rxn_ledger::{Atom, Bond, BondOrder, Element, ReactionNetwork, State, Structure};
//!
//! // Hydrogen fluoride, listed in two different atom orders
//! let mut hf = Structure::new();
//! hf.atoms.push(Atom::unplaced(Element::H));
//! hf.atoms.push(Atom::unplaced(Element::F));
//! hf.bonds.push(Bond::new(0, 1, BondOrder::Single));
//!
//! let mut fh = Structure::new();
//! fh.atoms.push(Atom::unplaced(Element::F));
//! fh.atoms.push(Atom::unplaced(Element::H));
//! fh.bonds.push(Bond::new(0, 1, BondOrder::Single));
//!
//! let network = ReactionNetwork::default();
//! let canon = network.canonicalizer();
//!
//! let first = network.add_state(State::create(hf, None, canon)?)?;
//! let second = network.add_state(State::create(fh, None, canon)?)?;
//!
//! assert!(first.is_new);
//! assert!(!second.is_new);
//! assert_eq!(first.id, second.id);
//! assert_eq!(network.state_count(), 1);
//! # Ok::<(), rxn_ledger::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`canon`] – structure perception and canonical fingerprints
//! - [`network`] – the network, its provenance ledger and dedup index
//! - [`store`] – relational schema, row types and JSON snapshots
//! - [`io`] – SDF and XYZ structure adapters

mod error;
mod model;

pub mod canon;
pub mod io;
pub mod network;
pub mod store;

pub use error::Error;

pub use model::atom::Atom;
pub use model::structure::{Bond, Structure};
pub use model::types::{BondOrder, Element, ParseBondOrderError, ParseElementError};

pub use model::ids::{EnsembleId, ObjectId, PathwayId, ProvenanceId, ReactionId, StateId};
pub use model::provenance::{ObjectType, Origin, Parent, Provenance, ProvenanceBuilder};
pub use model::thermo::{ReactionEnergetics, Thermochemistry};

pub use model::ensemble::Ensemble;
pub use model::pathway::Pathway;
pub use model::reaction::{MAX_SPECIES, Reaction, ReactionBuilder, Slots};
pub use model::state::{State, StateBuilder, StateKind, StateParts};

pub use canon::{
    CanonConfig, Canonicalizer, ElectronicState, Fingerprint, GraphCanonicalizer, StructureError,
};
pub use network::{
    DedupKey, DedupStatus, Lineage, NetworkConfig, ProvenanceLedger, ReactionNetwork,
    StateAdmission,
};
pub use store::Snapshot;
