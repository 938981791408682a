//! Reactions: endpoint complexes plus optional isolated species.
//!
//! A reaction is defined first by its reactant and product complexes. Up to
//! [`MAX_SPECIES`] isolated reactants and products may be attached as a
//! decomposition of those complexes. Species occupy fixed slots filled
//! densely from the first, which is also how they are persisted.

use super::ids::{PathwayId, ReactionId, StateId};
use super::provenance::{self, ObjectType, Provenance};
use super::state::State;
use super::thermo::ReactionEnergetics;
use crate::error::Error;

/// Maximum number of isolated reactants or products.
pub const MAX_SPECIES: usize = 3;

/// Fixed-size, densely filled species slots.
pub type Slots = [Option<StateId>; MAX_SPECIES];

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    id: ReactionId,
    provenance: Provenance,
    reactants: Slots,
    products: Slots,
    reactant_complex: StateId,
    product_complex: StateId,
    transition_state: Option<StateId>,
    pathway: Option<PathwayId>,
    energetics: ReactionEnergetics,
}

impl Reaction {
    pub fn builder() -> ReactionBuilder {
        ReactionBuilder::default()
    }

    #[inline]
    pub fn id(&self) -> ReactionId {
        self.id
    }

    #[inline]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    #[inline]
    pub fn reactant_slots(&self) -> &Slots {
        &self.reactants
    }

    #[inline]
    pub fn product_slots(&self) -> &Slots {
        &self.products
    }

    pub fn reactants(&self) -> impl Iterator<Item = StateId> + '_ {
        self.reactants.iter().flatten().copied()
    }

    pub fn products(&self) -> impl Iterator<Item = StateId> + '_ {
        self.products.iter().flatten().copied()
    }

    pub fn number_reactants(&self) -> usize {
        count(&self.reactants)
    }

    pub fn number_products(&self) -> usize {
        count(&self.products)
    }

    #[inline]
    pub fn reactant_complex(&self) -> StateId {
        self.reactant_complex
    }

    #[inline]
    pub fn product_complex(&self) -> StateId {
        self.product_complex
    }

    #[inline]
    pub fn transition_state(&self) -> Option<StateId> {
        self.transition_state
    }

    #[inline]
    pub fn pathway(&self) -> Option<PathwayId> {
        self.pathway
    }

    #[inline]
    pub fn energetics(&self) -> &ReactionEnergetics {
        &self.energetics
    }

    /// Every state this reaction references directly, complexes first.
    ///
    /// Pathway members are not included; they belong to the pathway.
    pub fn state_ids(&self) -> Vec<StateId> {
        let mut ids = vec![self.reactant_complex, self.product_complex];
        ids.extend(self.reactants());
        ids.extend(self.products());
        ids.extend(self.transition_state);
        ids
    }

    pub fn involves(&self, state: StateId) -> bool {
        self.state_ids().contains(&state)
    }
}

fn count(slots: &Slots) -> usize {
    slots.iter().filter(|s| s.is_some()).count()
}

/// Builder for [`Reaction`].
///
/// # Examples
///
/// ```
/// use rxn_ledger::{Reaction, StateId};
///
/// let (a, b, ab) = (StateId::random(), StateId::random(), StateId::random());
/// let rc = StateId::random();
///
/// let reaction = Reaction::builder()
///     .reactant(a)
///     .reactant(b)
///     .product(ab)
///     .reactant_complex(rc)
///     .product_complex(ab)
///     .build(None)?;
///
/// assert_eq!(reaction.number_reactants(), 2);
/// assert_eq!(reaction.number_products(), 1);
/// assert!(reaction.transition_state().is_none());
/// # Ok::<(), rxn_ledger::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReactionBuilder {
    reactants: Vec<StateId>,
    products: Vec<StateId>,
    reactant_complex: Option<StateId>,
    product_complex: Option<StateId>,
    transition_state: Option<StateId>,
    pathway: Option<PathwayId>,
    energetics: Option<ReactionEnergetics>,
}

impl ReactionBuilder {
    pub fn reactant(mut self, id: StateId) -> Self {
        self.reactants.push(id);
        self
    }

    pub fn product(mut self, id: StateId) -> Self {
        self.products.push(id);
        self
    }

    pub fn reactants(mut self, ids: impl IntoIterator<Item = StateId>) -> Self {
        self.reactants.extend(ids);
        self
    }

    pub fn products(mut self, ids: impl IntoIterator<Item = StateId>) -> Self {
        self.products.extend(ids);
        self
    }

    pub fn reactant_complex(mut self, id: StateId) -> Self {
        self.reactant_complex = Some(id);
        self
    }

    pub fn product_complex(mut self, id: StateId) -> Self {
        self.product_complex = Some(id);
        self
    }

    /// Sets both complexes and, unless set explicitly, derives the
    /// energetics from their thermochemistry.
    pub fn complexes(mut self, reactant: &State, product: &State) -> Self {
        self.reactant_complex = Some(reactant.id());
        self.product_complex = Some(product.id());
        if self.energetics.is_none() {
            let derived = ReactionEnergetics::between(reactant.thermo(), product.thermo());
            if !derived.is_empty() {
                self.energetics = Some(derived);
            }
        }
        self
    }

    pub fn transition_state(mut self, id: StateId) -> Self {
        self.transition_state = Some(id);
        self
    }

    pub fn pathway(mut self, id: PathwayId) -> Self {
        self.pathway = Some(id);
        self
    }

    pub fn energetics(mut self, energetics: ReactionEnergetics) -> Self {
        self.energetics = Some(energetics);
        self
    }

    /// Validates cardinality and builds the reaction.
    ///
    /// # Errors
    ///
    /// - [`Error::ReactionCardinality`] if more than [`MAX_SPECIES`]
    ///   reactants or products were given, or either complex is missing.
    /// - [`Error::InvalidProvenance`] if `provenance` does not describe a reaction.
    pub fn build(self, provenance: Option<Provenance>) -> Result<Reaction, Error> {
        let reactants = into_slots("reactants", &self.reactants)?;
        let products = into_slots("products", &self.products)?;
        let reactant_complex = self.reactant_complex.ok_or_else(|| {
            Error::ReactionCardinality("the reactant complex is required".to_string())
        })?;
        let product_complex = self.product_complex.ok_or_else(|| {
            Error::ReactionCardinality("the product complex is required".to_string())
        })?;

        let (id, provenance) =
            provenance::adopt(&[ObjectType::Reaction], ObjectType::Reaction, provenance)?;

        Ok(Reaction {
            id: id.into(),
            provenance,
            reactants,
            products,
            reactant_complex,
            product_complex,
            transition_state: self.transition_state,
            pathway: self.pathway,
            energetics: self.energetics.unwrap_or_default(),
        })
    }
}

fn into_slots(side: &str, ids: &[StateId]) -> Result<Slots, Error> {
    if ids.len() > MAX_SPECIES {
        return Err(Error::ReactionCardinality(format!(
            "{} {side} given, at most {MAX_SPECIES} allowed",
            ids.len()
        )));
    }
    let mut slots = [None; MAX_SPECIES];
    for (slot, id) in slots.iter_mut().zip(ids) {
        *slot = Some(*id);
    }
    Ok(slots)
}
