//! Connectivity checks and covalent-radius bond perception.

use super::error::StructureError;
use crate::model::structure::{Bond, Structure};
use crate::model::types::BondOrder;
use std::collections::HashSet;

/// Atoms closer than this are treated as overlapping, not bonded.
const MIN_BOND_DISTANCE: f64 = 0.4;

pub fn validate_bonds(structure: &Structure) -> Result<(), StructureError> {
    let n = structure.atom_count();
    let mut seen = HashSet::with_capacity(structure.bond_count());
    for bond in &structure.bonds {
        if bond.i >= n || bond.j >= n {
            return Err(StructureError::invalid_bond(
                bond.i,
                bond.j,
                format!("atom index out of range for {n} atoms"),
            ));
        }
        if bond.i == bond.j {
            return Err(StructureError::invalid_bond(bond.i, bond.j, "self-bond"));
        }
        let (i, j) = (bond.i.min(bond.j), bond.i.max(bond.j));
        if !seen.insert((i, j)) {
            return Err(StructureError::invalid_bond(i, j, "duplicate bond"));
        }
    }
    Ok(())
}

/// Infers single bonds between every pair of atoms closer than the sum of
/// their covalent radii plus `tolerance`.
pub fn perceive_bonds(structure: &Structure, tolerance: f64) -> Result<Vec<Bond>, StructureError> {
    let positions = structure
        .atoms
        .iter()
        .enumerate()
        .map(|(idx, atom)| {
            atom.position.ok_or_else(|| {
                StructureError::MissingConnectivity(format!(
                    "atom {idx} has no coordinates and the structure has no bonds"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut bonds = Vec::new();
    for i in 0..positions.len() {
        let ri = structure.atoms[i].element.covalent_radius();
        for j in (i + 1)..positions.len() {
            let rj = structure.atoms[j].element.covalent_radius();
            let d = distance(&positions[i], &positions[j]);
            if d > MIN_BOND_DISTANCE && d <= ri + rj + tolerance {
                bonds.push(Bond::new(i, j, BondOrder::Single));
            }
        }
    }
    Ok(bonds)
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
