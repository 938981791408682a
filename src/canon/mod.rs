//! Structure perception and canonical fingerprints.
//!
//! The [`Canonicalizer`] trait is the contract the network relies on to decide
//! whether two independently produced states are the same molecule. It must
//! be deterministic and invariant under atom relabeling. The crate ships
//! [`GraphCanonicalizer`], a small reference implementation; production
//! deployments may plug in a cheminformatics toolkit behind the same trait.

mod config;
mod error;
mod labeling;
mod perception;

pub use config::CanonConfig;
pub use error::StructureError;

use crate::error::Error;
use crate::model::structure::Structure;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Isomorphism-invariant identity payload of a structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Weisfeiler–Lehman style graph hash; equal for isomorphic graphs but
    /// not collision-free.
    pub graph_hash: String,
    /// Canonical line notation; equal exactly for isomorphic graphs.
    pub canonical_notation: String,
    /// Short fixed-width identifier derived from the notation.
    pub alternate_id: String,
    /// Alphabetical formula, e.g. `C2 H6 O1`.
    pub formula: String,
}

/// Net charge and spin multiplicity of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectronicState {
    pub charge: i32,
    pub spin_multiplicity: u32,
}

/// Contract for structure perception and canonicalization.
pub trait Canonicalizer: Send + Sync + fmt::Debug {
    /// Returns `structure` with connectivity, inferring bonds if needed.
    fn perceive(&self, structure: Structure) -> Result<Structure, StructureError>;

    /// Computes the fingerprint of `structure`.
    fn canonicalize(&self, structure: &Structure) -> Result<Fingerprint, StructureError>;

    /// Infers or reconciles charge and spin multiplicity.
    ///
    /// Omitted values are inferred: the charge from the atoms' formal charges
    /// and the multiplicity as the lowest one allowed by the electron count.
    /// Supplied values are checked for parity against the electron count.
    fn electronic_state(
        &self,
        structure: &Structure,
        charge: Option<i32>,
        spin_multiplicity: Option<u32>,
    ) -> Result<ElectronicState, Error> {
        reconcile_electronic_state(structure, charge, spin_multiplicity)
    }
}

pub(crate) fn reconcile_electronic_state(
    structure: &Structure,
    charge: Option<i32>,
    spin_multiplicity: Option<u32>,
) -> Result<ElectronicState, Error> {
    let charge = charge.unwrap_or_else(|| structure.total_formal_charge());
    let electrons = structure.nuclear_charge() - charge as i64;
    let spin = spin_multiplicity.unwrap_or(if electrons % 2 == 0 { 1 } else { 2 });

    let mismatch = Error::ChargeSpinMismatch {
        charge,
        spin,
        electrons,
    };
    if electrons < 0 || spin == 0 {
        return Err(mismatch);
    }
    let unpaired = (spin - 1) as i64;
    if unpaired > electrons || (electrons - unpaired) % 2 != 0 {
        return Err(mismatch);
    }

    Ok(ElectronicState {
        charge,
        spin_multiplicity: spin,
    })
}

/// Reference canonicalizer based on colour refinement.
///
/// # Examples
///
/// ```
/// use rxn_ledger::{Atom, Bond, BondOrder, Canonicalizer, Element, GraphCanonicalizer, Structure};
///
/// let mut water = Structure::new();
/// water.atoms.push(Atom::unplaced(Element::O));
/// water.atoms.push(Atom::unplaced(Element::H));
/// water.atoms.push(Atom::unplaced(Element::H));
/// water.bonds.push(Bond::new(0, 1, BondOrder::Single));
/// water.bonds.push(Bond::new(0, 2, BondOrder::Single));
///
/// let canon = GraphCanonicalizer::default();
/// let fp = canon.canonicalize(&water)?;
/// assert_eq!(fp.formula, "H2 O1");
///
/// let reordered = water.relabeled(&[1, 2, 0]).unwrap();
/// assert_eq!(canon.canonicalize(&reordered)?, fp);
/// # Ok::<(), rxn_ledger::StructureError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphCanonicalizer {
    config: CanonConfig,
}

impl GraphCanonicalizer {
    pub fn new(config: CanonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanonConfig {
        &self.config
    }
}

impl Canonicalizer for GraphCanonicalizer {
    fn perceive(&self, mut structure: Structure) -> Result<Structure, StructureError> {
        if structure.is_empty() {
            return Err(StructureError::Empty);
        }
        perception::validate_bonds(&structure)?;

        if !structure.has_connectivity() {
            if !self.config.perceive_bonds {
                return Err(StructureError::MissingConnectivity(
                    "structure has no bonds and bond perception is disabled".to_string(),
                ));
            }
            structure.bonds = perception::perceive_bonds(&structure, self.config.bond_tolerance)?;
        }

        if self.config.require_connected {
            let fragments = structure.connected_components();
            if fragments > 1 {
                return Err(StructureError::Disconnected(fragments));
            }
        }

        Ok(structure)
    }

    fn canonicalize(&self, structure: &Structure) -> Result<Fingerprint, StructureError> {
        let perceived;
        let structure = if structure.has_connectivity() && !self.config.require_connected {
            if structure.is_empty() {
                return Err(StructureError::Empty);
            }
            perception::validate_bonds(structure)?;
            structure
        } else {
            perceived = self.perceive(structure.clone())?;
            &perceived
        };

        let graph = labeling::Graph::new(structure);
        let form = labeling::canonical_form(&graph, self.config.max_search_leaves)?;
        let formula = alphabetical_formula(structure);

        let canonical_notation = format!("{}/{}/{}", formula, form.skeleton, form.charges);
        let alternate_id = alternate_id(&form, &canonical_notation, structure.total_formal_charge());

        Ok(Fingerprint {
            graph_hash: labeling::wl_hash(&graph, self.config.wl_iterations),
            canonical_notation,
            alternate_id,
            formula,
        })
    }
}

/// Elements sorted alphabetically by symbol, each with its count.
pub fn alphabetical_formula(structure: &Structure) -> String {
    let mut parts: Vec<(&'static str, usize)> = structure
        .element_counts()
        .into_iter()
        .map(|(element, count)| (element.symbol(), count))
        .collect();
    parts.sort_by(|a, b| a.0.cmp(b.0));
    parts
        .iter()
        .map(|(symbol, count)| format!("{symbol}{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn alternate_id(form: &labeling::CanonicalForm, notation: &str, net_charge: i32) -> String {
    let skeleton = labeling::hex(&Sha256::digest(form.skeleton.as_bytes())).to_uppercase();
    let full = labeling::hex(&Sha256::digest(notation.as_bytes())).to_uppercase();
    let flag = match net_charge {
        0 => 'N',
        q if q > 0 => 'P',
        _ => 'M',
    };
    format!("{}-{}-{}", &skeleton[..14], &full[..10], flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::structure::Bond;
    use crate::model::types::{BondOrder, Element};

    fn ethanol() -> Structure {
        let mut s = Structure::new();
        s.atoms.push(Atom::new(Element::C, [-1.270, 0.248, 0.000]));
        s.atoms.push(Atom::new(Element::C, [0.139, -0.308, 0.000]));
        s.atoms.push(Atom::new(Element::O, [1.036, 0.789, 0.000]));
        s.atoms.push(Atom::new(Element::H, [-1.317, 0.885, 0.883]));
        s.atoms.push(Atom::new(Element::H, [-1.317, 0.885, -0.883]));
        s.atoms.push(Atom::new(Element::H, [-2.030, -0.533, 0.000]));
        s.atoms.push(Atom::new(Element::H, [0.358, -0.920, 0.876]));
        s.atoms.push(Atom::new(Element::H, [0.358, -0.920, -0.876]));
        s.atoms.push(Atom::new(Element::H, [1.939, 0.473, 0.000]));
        s.bonds.push(Bond::new(0, 1, BondOrder::Single));
        s.bonds.push(Bond::new(1, 2, BondOrder::Single));
        s.bonds.push(Bond::new(0, 3, BondOrder::Single));
        s.bonds.push(Bond::new(0, 4, BondOrder::Single));
        s.bonds.push(Bond::new(0, 5, BondOrder::Single));
        s.bonds.push(Bond::new(1, 6, BondOrder::Single));
        s.bonds.push(Bond::new(1, 7, BondOrder::Single));
        s.bonds.push(Bond::new(2, 8, BondOrder::Single));
        s
    }

    fn dimethyl_ether() -> Structure {
        let mut s = Structure::new();
        s.atoms.push(Atom::unplaced(Element::C));
        s.atoms.push(Atom::unplaced(Element::O));
        s.atoms.push(Atom::unplaced(Element::C));
        for _ in 0..6 {
            s.atoms.push(Atom::unplaced(Element::H));
        }
        s.bonds.push(Bond::new(0, 1, BondOrder::Single));
        s.bonds.push(Bond::new(1, 2, BondOrder::Single));
        for h in 3..6 {
            s.bonds.push(Bond::new(0, h, BondOrder::Single));
        }
        for h in 6..9 {
            s.bonds.push(Bond::new(2, h, BondOrder::Single));
        }
        s
    }

    #[test]
    fn formula_is_alphabetical() {
        assert_eq!(alphabetical_formula(&ethanol()), "C2 H6 O1");
        let mut s = Structure::new();
        s.atoms.push(Atom::unplaced(Element::Na));
        s.atoms.push(Atom::unplaced(Element::Cl));
        assert_eq!(alphabetical_formula(&s), "Cl1 Na1");
    }

    #[test]
    fn relabeling_does_not_change_fingerprint() {
        let canon = GraphCanonicalizer::default();
        let s = ethanol();
        let r = s.relabeled(&[8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        let shuffled = s.relabeled(&[3, 0, 6, 2, 8, 1, 5, 7, 4]).unwrap();
        let a = canon.canonicalize(&s).unwrap();
        assert_eq!(a, canon.canonicalize(&r).unwrap());
        assert_eq!(a, canon.canonicalize(&shuffled).unwrap());
    }

    #[test]
    fn isomers_are_distinguished() {
        let canon = GraphCanonicalizer::default();
        let a = canon.canonicalize(&ethanol()).unwrap();
        let b = canon.canonicalize(&dimethyl_ether()).unwrap();
        assert_eq!(a.formula, b.formula);
        assert_ne!(a.graph_hash, b.graph_hash);
        assert_ne!(a.canonical_notation, b.canonical_notation);
        assert_ne!(a.alternate_id, b.alternate_id);
    }

    #[test]
    fn perception_fills_missing_bonds() {
        let canon = GraphCanonicalizer::default();
        let mut bare = ethanol();
        bare.bonds.clear();
        let perceived = canon.perceive(bare.clone()).unwrap();
        assert_eq!(perceived.bond_count(), 8);
        assert_eq!(
            canon.canonicalize(&bare).unwrap(),
            canon.canonicalize(&ethanol()).unwrap()
        );
    }

    #[test]
    fn perception_can_be_disabled() {
        let canon = GraphCanonicalizer::new(CanonConfig {
            perceive_bonds: false,
            ..Default::default()
        });
        let mut bare = ethanol();
        bare.bonds.clear();
        assert!(matches!(
            canon.perceive(bare),
            Err(StructureError::MissingConnectivity(_))
        ));
    }

    #[test]
    fn connected_requirement_rejects_complexes() {
        let canon = GraphCanonicalizer::new(CanonConfig {
            require_connected: true,
            ..Default::default()
        });
        let mut complex = ethanol();
        complex.atoms.push(Atom::new(Element::Ar, [10.0, 0.0, 0.0]));
        assert_eq!(
            canon.canonicalize(&complex),
            Err(StructureError::Disconnected(2))
        );
    }

    #[test]
    fn empty_structure_is_rejected() {
        let canon = GraphCanonicalizer::default();
        assert_eq!(
            canon.canonicalize(&Structure::new()),
            Err(StructureError::Empty)
        );
        assert_eq!(
            canon.perceive(Structure::new()),
            Err(StructureError::Empty)
        );
    }

    #[test]
    fn alternate_id_layout() {
        let canon = GraphCanonicalizer::default();
        let fp = canon.canonicalize(&ethanol()).unwrap();
        let blocks: Vec<&str> = fp.alternate_id.split('-').collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].len(), 14);
        assert_eq!(blocks[1].len(), 10);
        assert_eq!(blocks[2], "N");
    }

    #[test]
    fn infers_singlet_and_doublet() {
        let canon = GraphCanonicalizer::default();
        let es = canon.electronic_state(&ethanol(), None, None).unwrap();
        assert_eq!(es, ElectronicState { charge: 0, spin_multiplicity: 1 });

        let mut methyl = Structure::new();
        methyl.atoms.push(Atom::unplaced(Element::C));
        for _ in 0..3 {
            methyl.atoms.push(Atom::unplaced(Element::H));
        }
        let es = canon.electronic_state(&methyl, None, None).unwrap();
        assert_eq!(es.spin_multiplicity, 2);
    }

    #[test]
    fn infers_charge_from_formal_charges() {
        let canon = GraphCanonicalizer::default();
        let mut hydroxide = Structure::new();
        hydroxide.atoms.push(Atom::unplaced(Element::O).with_formal_charge(-1));
        hydroxide.atoms.push(Atom::unplaced(Element::H));
        let es = canon.electronic_state(&hydroxide, None, None).unwrap();
        assert_eq!(es.charge, -1);
        assert_eq!(es.spin_multiplicity, 1);
    }

    #[test]
    fn rejects_parity_mismatch() {
        let canon = GraphCanonicalizer::default();
        let s = ethanol();
        assert!(matches!(
            canon.electronic_state(&s, Some(0), Some(2)),
            Err(Error::ChargeSpinMismatch { .. })
        ));
        assert!(matches!(
            canon.electronic_state(&s, Some(1), Some(1)),
            Err(Error::ChargeSpinMismatch { .. })
        ));
        assert!(canon.electronic_state(&s, Some(1), Some(2)).is_ok());
        assert!(canon.electronic_state(&s, Some(0), Some(3)).is_ok());
        assert!(matches!(
            canon.electronic_state(&s, Some(0), Some(0)),
            Err(Error::ChargeSpinMismatch { .. })
        ));
    }

    #[test]
    fn rejects_impossible_electron_counts() {
        let mut proton = Structure::new();
        proton.atoms.push(Atom::unplaced(Element::H));
        assert!(reconcile_electronic_state(&proton, Some(1), Some(1)).is_ok());
        assert!(reconcile_electronic_state(&proton, Some(2), None).is_err());
        assert!(reconcile_electronic_state(&proton, Some(1), Some(3)).is_err());
    }
}
