use super::ids::{PathwayId, StateId};
use super::provenance::{self, ObjectType, Provenance};
use super::state::State;
use crate::error::Error;

/// An ordered sequence of states along a reaction coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Pathway {
    id: PathwayId,
    states: Vec<StateId>,
    provenance: Provenance,
}

impl Pathway {
    /// Creates a pathway through `states`, in order.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPathway`] if `states` is empty.
    /// - [`Error::PathwayOrder`] if two consecutive states are structurally
    ///   equivalent, or a member's provenance index differs from its position.
    /// - [`Error::InvalidProvenance`] if `provenance` does not describe a pathway.
    pub fn create(states: &[&State], provenance: Option<Provenance>) -> Result<Self, Error> {
        if states.is_empty() {
            return Err(Error::EmptyPathway);
        }

        for (position, state) in states.iter().enumerate() {
            if let Some(index) = state.provenance().index() {
                if index as usize != position {
                    return Err(Error::pathway_order(
                        position,
                        format!("state {} carries path index {index}", state.id()),
                    ));
                }
            }
        }

        for (position, pair) in states.windows(2).enumerate() {
            if pair[0].is_equivalent(pair[1]) {
                return Err(Error::pathway_order(
                    position + 1,
                    format!(
                        "state {} repeats the structure of state {}",
                        pair[1].id(),
                        pair[0].id()
                    ),
                ));
            }
        }

        let (id, provenance) =
            provenance::adopt(&[ObjectType::Pathway], ObjectType::Pathway, provenance)?;
        Ok(Self {
            id: id.into(),
            states: states.iter().map(|s| s.id()).collect(),
            provenance,
        })
    }

    #[inline]
    pub fn id(&self) -> PathwayId {
        self.id
    }

    #[inline]
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    #[inline]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<StateId> {
        self.states.first().copied()
    }

    pub fn last(&self) -> Option<StateId> {
        self.states.last().copied()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }
}
