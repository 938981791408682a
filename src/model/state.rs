//! Molecular states and their immutable identity payload.

use super::ids::StateId;
use super::provenance::{self, ObjectType, Parent, Provenance};
use super::structure::Structure;
use super::thermo::Thermochemistry;
use crate::canon::{Canonicalizer, Fingerprint};
use crate::error::Error;
use std::fmt;

/// Role of a state on the potential energy surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Any point on the surface.
    #[default]
    Point,
    /// An optimized reaction endpoint.
    Endpoint,
    /// An optimized transition state.
    TransitionState,
}

impl StateKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            StateKind::Point => ObjectType::State,
            StateKind::Endpoint => ObjectType::Endpoint,
            StateKind::TransitionState => ObjectType::TransitionState,
        }
    }

    pub fn from_object_type(object_type: ObjectType) -> Option<Self> {
        match object_type {
            ObjectType::State => Some(StateKind::Point),
            ObjectType::Endpoint => Some(StateKind::Endpoint),
            ObjectType::TransitionState => Some(StateKind::TransitionState),
            _ => None,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateKind::Point => "point",
            StateKind::Endpoint => "endpoint",
            StateKind::TransitionState => "transition state",
        })
    }
}

const STATE_TYPES: [ObjectType; 3] = [
    ObjectType::State,
    ObjectType::Endpoint,
    ObjectType::TransitionState,
];

/// A molecular structure with charge, spin, and optional thermochemistry.
///
/// The fingerprint is computed once when the state is built and never
/// recomputed; a different structure always means a different `State`.
/// Two states with the same fingerprint, charge and spin multiplicity are
/// structurally equivalent even when their ids differ.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    id: StateId,
    kind: StateKind,
    structure: Structure,
    provenance: Provenance,
    charge: i32,
    spin_multiplicity: u32,
    thermo: Thermochemistry,
    fingerprint: Fingerprint,
}

/// Persisted fields of a state, used to rebuild it without canonicalizing.
#[derive(Debug, Clone)]
pub struct StateParts {
    pub id: StateId,
    pub structure: Structure,
    pub provenance: Provenance,
    pub charge: i32,
    pub spin_multiplicity: u32,
    pub thermo: Thermochemistry,
    pub fingerprint: Fingerprint,
}

impl State {
    /// Starts building a state from `structure`.
    pub fn builder(structure: Structure) -> StateBuilder {
        StateBuilder {
            structure,
            id: None,
            kind: None,
            provenance: None,
            parent: None,
            charge: None,
            spin_multiplicity: None,
            thermo: Thermochemistry::default(),
        }
    }

    /// Builds a state with inferred charge and spin.
    ///
    /// Without a provenance record the state is treated as network input.
    pub fn create(
        structure: Structure,
        provenance: Option<Provenance>,
        canonicalizer: &dyn Canonicalizer,
    ) -> Result<Self, Error> {
        let builder = Self::builder(structure);
        match provenance {
            Some(record) => builder.provenance(record).build(canonicalizer),
            None => builder.build(canonicalizer),
        }
    }

    /// Rebuilds a persisted state by id, trusting its stored fingerprint.
    pub fn rehydrate(parts: StateParts) -> Result<Self, Error> {
        let record = &parts.provenance;
        let kind = StateKind::from_object_type(record.object_type()).ok_or_else(|| {
            Error::invalid_provenance(format!(
                "record {} describes a {}, not a state",
                record.id(),
                record.object_type()
            ))
        })?;
        if StateId::from(record.object_id()) != parts.id {
            return Err(Error::invalid_provenance(format!(
                "record {} belongs to {}, not state {}",
                record.id(),
                record.object_id(),
                parts.id
            )));
        }

        Ok(Self {
            id: parts.id,
            kind,
            structure: parts.structure,
            provenance: parts.provenance,
            charge: parts.charge,
            spin_multiplicity: parts.spin_multiplicity,
            thermo: parts.thermo,
            fingerprint: parts.fingerprint,
        })
    }

    #[inline]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> StateKind {
        self.kind
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// The primary provenance record this state was created with.
    #[inline]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    #[inline]
    pub fn charge(&self) -> i32 {
        self.charge
    }

    #[inline]
    pub fn spin_multiplicity(&self) -> u32 {
        self.spin_multiplicity
    }

    #[inline]
    pub fn thermo(&self) -> &Thermochemistry {
        &self.thermo
    }

    #[inline]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn formula(&self) -> &str {
        &self.fingerprint.formula
    }

    pub fn graph_hash(&self) -> &str {
        &self.fingerprint.graph_hash
    }

    pub fn canonical_notation(&self) -> &str {
        &self.fingerprint.canonical_notation
    }

    pub fn alternate_id(&self) -> &str {
        &self.fingerprint.alternate_id
    }

    pub fn is_input(&self) -> bool {
        self.provenance.is_input()
    }

    /// Whether both states describe the same molecule in the same electronic state.
    pub fn is_equivalent(&self, other: &State) -> bool {
        self.charge == other.charge
            && self.spin_multiplicity == other.spin_multiplicity
            && self.fingerprint == other.fingerprint
    }
}

/// Builder for [`State`].
///
/// # Examples
///
/// ```
/// use rxn_ledger::{Atom, Element, GraphCanonicalizer, State, StateKind, Structure};
///
/// let mut h2 = Structure::new();
/// h2.atoms.push(Atom::new(Element::H, [0.0, 0.0, 0.0]));
/// h2.atoms.push(Atom::new(Element::H, [0.74, 0.0, 0.0]));
///
/// let state = State::builder(h2)
///     .kind(StateKind::Endpoint)
///     .build(&GraphCanonicalizer::default())?;
///
/// assert_eq!(state.formula(), "H2");
/// assert_eq!(state.spin_multiplicity(), 1);
/// assert!(state.is_input());
/// # Ok::<(), rxn_ledger::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StateBuilder {
    structure: Structure,
    id: Option<StateId>,
    kind: Option<StateKind>,
    provenance: Option<Provenance>,
    parent: Option<Parent>,
    charge: Option<i32>,
    spin_multiplicity: Option<u32>,
    thermo: Thermochemistry,
}

impl StateBuilder {
    pub fn id(mut self, id: StateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn kind(mut self, kind: StateKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Derivation record; its `object_id` becomes the state's id.
    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Expected parent of the derivation; must match the record's parent.
    pub fn parent(mut self, parent: Parent) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn spin_multiplicity(mut self, spin: u32) -> Self {
        self.spin_multiplicity = Some(spin);
        self
    }

    pub fn thermo(mut self, thermo: Thermochemistry) -> Self {
        self.thermo = thermo;
        self
    }

    /// Perceives, reconciles charge and spin, and canonicalizes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProvenance`] for a parent hint without a record, a
    ///   record for a non-state object, or a record that disagrees with the
    ///   requested id, kind or parent.
    /// - [`Error::ChargeSpinMismatch`] if the requested charge and spin cannot
    ///   describe the structure.
    /// - [`Error::Structure`] if the structure cannot be canonicalized.
    pub fn build(self, canonicalizer: &dyn Canonicalizer) -> Result<State, Error> {
        let (id, kind, provenance) = self.resolve_provenance()?;

        let structure = canonicalizer.perceive(self.structure)?;
        let electronic =
            canonicalizer.electronic_state(&structure, self.charge, self.spin_multiplicity)?;
        let fingerprint = canonicalizer.canonicalize(&structure)?;

        Ok(State {
            id,
            kind,
            structure,
            provenance,
            charge: electronic.charge,
            spin_multiplicity: electronic.spin_multiplicity,
            thermo: self.thermo,
            fingerprint,
        })
    }

    fn resolve_provenance(&self) -> Result<(StateId, StateKind, Provenance), Error> {
        if self.provenance.is_none() {
            if let Some(parent) = &self.parent {
                return Err(Error::invalid_provenance(format!(
                    "parent {} {} given without a provenance record; \
                     only input states may omit provenance",
                    parent.object_type, parent.object_id
                )));
            }
            let id = self.id.unwrap_or_else(StateId::random);
            let kind = self.kind.unwrap_or_default();
            return Ok((id, kind, Provenance::input(kind.object_type(), id)));
        }

        let default_type = self.kind.unwrap_or_default().object_type();
        let (object_id, record) =
            provenance::adopt(&STATE_TYPES, default_type, self.provenance.clone())?;
        let id = StateId::from(object_id);
        let kind = StateKind::from_object_type(record.object_type()).unwrap_or_default();

        if let Some(requested) = self.id.filter(|requested| *requested != id) {
            return Err(Error::invalid_provenance(format!(
                "record {} belongs to {}, not state {}",
                record.id(),
                id,
                requested
            )));
        }
        if let Some(requested) = self.kind.filter(|requested| *requested != kind) {
            return Err(Error::invalid_provenance(format!(
                "record {} describes a {}, but a {} was requested",
                record.id(),
                kind,
                requested
            )));
        }
        if let Some(parent) = &self.parent {
            if record.parent() != Some(parent) {
                return Err(Error::invalid_provenance(format!(
                    "record {} does not derive from {} {}",
                    record.id(),
                    parent.object_type,
                    parent.object_id
                )));
            }
        }

        Ok((id, kind, record))
    }
}
