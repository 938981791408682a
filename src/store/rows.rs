//! Row types mirroring the tables in [`schema`](super::schema).
//!
//! Conversions from network objects check the row contract on write, and
//! conversions back check it again on read.

use super::error::Error;
use super::schema;
use crate::canon::Fingerprint;
use crate::model::ensemble::Ensemble;
use crate::model::ids::{EnsembleId, ObjectId, PathwayId, ProvenanceId, ReactionId, StateId};
use crate::model::provenance::{ObjectType, Origin, Parent, Provenance};
use crate::model::reaction::{Reaction, Slots};
use crate::model::state::{State, StateParts};
use crate::model::structure::Structure;
use crate::model::thermo::{ReactionEnergetics, Thermochemistry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRow {
    pub id: ProvenanceId,
    pub object_type: i64,
    pub object_id: ObjectId,
    pub origin_type: i64,
    pub parent_type: Option<i64>,
    pub parent_id: Option<ObjectId>,
    pub calc_method: Option<String>,
    pub level_of_theory: Option<String>,
    pub index: Option<u32>,
    pub path: Option<PathBuf>,
}

impl From<&Provenance> for ProvenanceRow {
    fn from(record: &Provenance) -> Self {
        Self {
            id: record.id(),
            object_type: record.object_type().code(),
            object_id: record.object_id(),
            origin_type: record.origin().code(),
            parent_type: record.parent().map(|p| p.object_type.code()),
            parent_id: record.parent().map(|p| p.object_id),
            calc_method: record.calc_method().map(str::to_string),
            level_of_theory: record.level_of_theory().map(str::to_string),
            index: record.index(),
            path: record.path().map(|p| p.to_path_buf()),
        }
    }
}

impl ProvenanceRow {
    /// Validates codes and the parent rule, then rebuilds the record.
    pub fn into_record(self) -> Result<Provenance, Error> {
        let kind = object_type(self.object_type, "object_type")?;
        let origin = Origin::from_code(self.origin_type).ok_or_else(|| {
            Error::contract(
                schema::PROVENANCE,
                format!("unknown origin_type {} in record {}", self.origin_type, self.id),
            )
        })?;

        let mut builder = Provenance::builder(kind, self.object_id, origin).id(self.id);
        match (self.parent_type, self.parent_id) {
            (Some(code), Some(id)) => {
                builder = builder.parent(Parent::new(object_type(code, "parent_type")?, id));
            }
            (None, None) => {}
            _ => {
                return Err(Error::contract(
                    schema::PROVENANCE,
                    format!("record {} sets only one of parent_type and parent_id", self.id),
                ));
            }
        }
        if let Some(method) = self.calc_method {
            builder = builder.calc_method(method);
        }
        if let Some(level) = self.level_of_theory {
            builder = builder.level_of_theory(level);
        }
        if let Some(index) = self.index {
            builder = builder.index(index);
        }
        if let Some(path) = self.path {
            builder = builder.path(path);
        }
        Ok(builder.build()?)
    }
}

fn object_type(code: i64, column: &str) -> Result<ObjectType, Error> {
    ObjectType::from_code(code).ok_or_else(|| {
        Error::contract(schema::PROVENANCE, format!("unknown {column} {code}"))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRow {
    pub id: StateId,
    pub provenance_id: ProvenanceId,
    pub alphabetical_formula: String,
    pub graph_hash: String,
    pub canonical_notation: String,
    pub alternate_canonical_id: String,
    pub charge: i32,
    pub spin: u32,
    pub energy: Option<f64>,
    #[serde(rename = "enthalpy_298")]
    pub enthalpy: Option<f64>,
    #[serde(rename = "entropy_298")]
    pub entropy: Option<f64>,
    #[serde(rename = "free_energy_298")]
    pub free_energy: Option<f64>,
    /// JSON-encoded molecular graph.
    pub structure: String,
}

impl StateRow {
    pub fn from_state(state: &State) -> Result<Self, Error> {
        let fingerprint = state.fingerprint();
        let thermo = state.thermo();
        Ok(Self {
            id: state.id(),
            provenance_id: state.provenance().id(),
            alphabetical_formula: fingerprint.formula.clone(),
            graph_hash: fingerprint.graph_hash.clone(),
            canonical_notation: fingerprint.canonical_notation.clone(),
            alternate_canonical_id: fingerprint.alternate_id.clone(),
            charge: state.charge(),
            spin: state.spin_multiplicity(),
            energy: thermo.energy,
            enthalpy: thermo.enthalpy,
            entropy: thermo.entropy,
            free_energy: thermo.free_energy,
            structure: serde_json::to_string(state.structure())?,
        })
    }

    /// Rebuilds the state, given the record `provenance_id` points at.
    pub fn into_state(self, provenance: Provenance) -> Result<State, Error> {
        if self.spin == 0 {
            return Err(Error::contract(
                schema::STATES,
                format!("state {} has spin multiplicity 0", self.id),
            ));
        }
        let structure: Structure = serde_json::from_str(&self.structure)?;
        Ok(State::rehydrate(StateParts {
            id: self.id,
            structure,
            provenance,
            charge: self.charge,
            spin_multiplicity: self.spin,
            thermo: Thermochemistry {
                energy: self.energy,
                enthalpy: self.enthalpy,
                entropy: self.entropy,
                free_energy: self.free_energy,
            },
            fingerprint: Fingerprint {
                graph_hash: self.graph_hash,
                canonical_notation: self.canonical_notation,
                alternate_id: self.alternate_canonical_id,
                formula: self.alphabetical_formula,
            },
        })?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAliasRow {
    pub alias_id: StateId,
    pub canonical_id: StateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayRow {
    pub id: PathwayId,
    pub provenance_id: ProvenanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayStateRow {
    pub pathway_id: PathwayId,
    pub position: u32,
    pub state_id: StateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRow {
    pub id: ReactionId,
    pub provenance_id: ProvenanceId,
    pub number_reactants: u32,
    pub number_products: u32,
    pub reactant_1_id: Option<StateId>,
    pub reactant_2_id: Option<StateId>,
    pub reactant_3_id: Option<StateId>,
    pub reactant_complex_id: StateId,
    pub product_1_id: Option<StateId>,
    pub product_2_id: Option<StateId>,
    pub product_3_id: Option<StateId>,
    pub product_complex_id: StateId,
    pub transition_state_id: Option<StateId>,
    pub pathway_id: Option<PathwayId>,
    #[serde(rename = "dE")]
    pub d_e: Option<f64>,
    #[serde(rename = "dH_298")]
    pub d_h: Option<f64>,
    #[serde(rename = "dS_298")]
    pub d_s: Option<f64>,
    #[serde(rename = "dG_298")]
    pub d_g: Option<f64>,
}

impl ReactionRow {
    pub fn from_reaction(reaction: &Reaction) -> Result<Self, Error> {
        let [r1, r2, r3] = *reaction.reactant_slots();
        let [p1, p2, p3] = *reaction.product_slots();
        let energetics = reaction.energetics();
        let row = Self {
            id: reaction.id(),
            provenance_id: reaction.provenance().id(),
            number_reactants: reaction.number_reactants() as u32,
            number_products: reaction.number_products() as u32,
            reactant_1_id: r1,
            reactant_2_id: r2,
            reactant_3_id: r3,
            reactant_complex_id: reaction.reactant_complex(),
            product_1_id: p1,
            product_2_id: p2,
            product_3_id: p3,
            product_complex_id: reaction.product_complex(),
            transition_state_id: reaction.transition_state(),
            pathway_id: reaction.pathway(),
            d_e: energetics.d_e,
            d_h: energetics.d_h,
            d_s: energetics.d_s,
            d_g: energetics.d_g,
        };
        row.check_counts()?;
        Ok(row)
    }

    pub fn reactant_slots(&self) -> Slots {
        [self.reactant_1_id, self.reactant_2_id, self.reactant_3_id]
    }

    pub fn product_slots(&self) -> Slots {
        [self.product_1_id, self.product_2_id, self.product_3_id]
    }

    /// Checks that each count equals its populated slots and that slots are
    /// filled densely from the first.
    pub fn check_counts(&self) -> Result<(), Error> {
        check_side(self.id, "reactant", self.number_reactants, &self.reactant_slots())?;
        check_side(self.id, "product", self.number_products, &self.product_slots())
    }

    /// Rebuilds the reaction, given the record `provenance_id` points at.
    pub fn into_reaction(self, provenance: Provenance) -> Result<Reaction, Error> {
        self.check_counts()?;
        let mut builder = Reaction::builder()
            .reactants(self.reactant_slots().into_iter().flatten())
            .products(self.product_slots().into_iter().flatten())
            .reactant_complex(self.reactant_complex_id)
            .product_complex(self.product_complex_id)
            .energetics(ReactionEnergetics {
                d_e: self.d_e,
                d_h: self.d_h,
                d_s: self.d_s,
                d_g: self.d_g,
            });
        if let Some(ts) = self.transition_state_id {
            builder = builder.transition_state(ts);
        }
        if let Some(pathway) = self.pathway_id {
            builder = builder.pathway(pathway);
        }
        Ok(builder.build(Some(provenance))?)
    }
}

fn check_side(id: ReactionId, side: &str, count: u32, slots: &Slots) -> Result<(), Error> {
    let populated = slots.iter().filter(|s| s.is_some()).count();
    if count as usize != populated {
        return Err(Error::contract(
            schema::REACTIONS,
            format!("reaction {id} reports {count} {side}s but {populated} slots are populated"),
        ));
    }
    if let Some(gap) = slots[..populated].iter().position(Option::is_none) {
        return Err(Error::contract(
            schema::REACTIONS,
            format!("reaction {id} leaves {side} slot {} empty", gap + 1),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRow {
    pub id: EnsembleId,
    pub provenance_id: ProvenanceId,
    pub name: String,
}

impl From<&Ensemble> for EnsembleRow {
    fn from(ensemble: &Ensemble) -> Self {
        Self {
            id: ensemble.id(),
            provenance_id: ensemble.provenance().id(),
            name: ensemble.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReactionRow {
    pub ensemble_id: EnsembleId,
    pub position: u32,
    pub reaction_id: ReactionId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::StateId;

    fn reaction(reactants: usize, products: usize) -> Reaction {
        Reaction::builder()
            .reactants((0..reactants).map(|_| StateId::random()))
            .products((0..products).map(|_| StateId::random()))
            .reactant_complex(StateId::random())
            .product_complex(StateId::random())
            .build(None)
            .unwrap()
    }

    #[test]
    fn reaction_row_counts_populated_slots() {
        let r = reaction(2, 1);
        let row = ReactionRow::from_reaction(&r).unwrap();
        assert_eq!(row.number_reactants, 2);
        assert_eq!(row.number_products, 1);
        assert!(row.reactant_3_id.is_none());
        assert_eq!(row.clone().into_reaction(r.provenance().clone()).unwrap(), r);
    }

    #[test]
    fn inconsistent_count_is_rejected_on_read() {
        let r = reaction(2, 1);
        let mut row = ReactionRow::from_reaction(&r).unwrap();
        row.number_reactants = 3;
        assert!(matches!(
            row.into_reaction(r.provenance().clone()),
            Err(Error::Contract { table: "reactions", .. })
        ));
    }

    #[test]
    fn sparse_slots_are_rejected() {
        let r = reaction(1, 0);
        let mut row = ReactionRow::from_reaction(&r).unwrap();
        row.reactant_2_id = row.reactant_1_id.take();
        assert!(matches!(
            row.check_counts(),
            Err(Error::Contract { table: "reactions", .. })
        ));
    }

    #[test]
    fn provenance_row_rejects_unknown_codes() {
        let record = Provenance::input(ObjectType::State, StateId::random());
        let mut row = ProvenanceRow::from(&record);
        assert_eq!(row.clone().into_record().unwrap(), record);

        row.object_type = -1;
        assert!(matches!(
            row.into_record(),
            Err(Error::Contract { table: "provenance", .. })
        ));
    }

    #[test]
    fn derived_record_survives_row_conversion() {
        let record = Provenance::builder(
            ObjectType::TransitionState,
            StateId::random(),
            Origin::PathOptimization,
        )
        .parent(Parent::new(ObjectType::Endpoint, StateId::random()))
        .calc_method("neb")
        .index(3)
        .build()
        .unwrap();
        let row = ProvenanceRow::from(&record);
        assert_eq!(row.parent_type, Some(ObjectType::Endpoint.code()));

        let back = row.into_record().unwrap();
        assert_eq!(back, record);
        assert_eq!(back.object_type(), ObjectType::TransitionState);
        assert_eq!(back.parent().map(|p| p.object_type), Some(ObjectType::Endpoint));
    }

    #[test]
    fn provenance_row_enforces_parent_rule() {
        let record = Provenance::input(ObjectType::State, StateId::random());
        let mut row = ProvenanceRow::from(&record);
        row.parent_type = Some(ObjectType::State.code());
        row.parent_id = Some(ObjectId::random());
        assert!(matches!(
            row.clone().into_record(),
            Err(Error::Network(crate::error::Error::InvalidProvenance(_)))
        ));

        row.parent_id = None;
        assert!(matches!(
            row.into_record(),
            Err(Error::Contract { .. })
        ));
    }
}
