use super::atom::Atom;
use super::types::{BondOrder, Element};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2, order }
        } else {
            Self { i: idx2, j: idx1, order }
        }
    }
}

/// An annotated molecular graph: atoms plus connectivity.
///
/// This is the single internal representation every external format is
/// converted into before a [`State`](crate::State) is built from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Whether connectivity is known. Single atoms trivially have it.
    pub fn has_connectivity(&self) -> bool {
        !self.bonds.is_empty() || self.atoms.len() <= 1
    }

    pub fn has_coordinates(&self) -> bool {
        self.atoms.iter().all(|a| a.position.is_some())
    }

    pub fn total_formal_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.formal_charge as i32).sum()
    }

    /// Sum of atomic numbers, i.e. the electron count of the neutral species.
    pub fn nuclear_charge(&self) -> i64 {
        self.atoms
            .iter()
            .map(|a| a.element.atomic_number() as i64)
            .sum()
    }

    pub fn element_counts(&self) -> BTreeMap<Element, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element).or_insert(0) += 1;
        }
        counts
    }

    /// Adjacency lists; out-of-range bonds are skipped.
    pub fn neighbors(&self) -> Vec<Vec<(usize, BondOrder)>> {
        let n = self.atoms.len();
        let mut adj = vec![Vec::new(); n];
        for bond in &self.bonds {
            if bond.i < n && bond.j < n && bond.i != bond.j {
                adj[bond.i].push((bond.j, bond.order));
                adj[bond.j].push((bond.i, bond.order));
            }
        }
        adj
    }

    pub fn connected_components(&self) -> usize {
        let adj = self.neighbors();
        let mut seen = vec![false; adj.len()];
        let mut components = 0;
        for start in 0..adj.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(node) = stack.pop() {
                for &(next, _) in &adj[node] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    /// Returns a copy whose atom `k` is this structure's atom `order[k]`.
    ///
    /// Returns `None` unless `order` is a permutation of `0..atom_count()`.
    pub fn relabeled(&self, order: &[usize]) -> Option<Structure> {
        let n = self.atoms.len();
        if order.len() != n {
            return None;
        }
        let mut new_index = vec![usize::MAX; n];
        for (new, &old) in order.iter().enumerate() {
            if old >= n || new_index[old] != usize::MAX {
                return None;
            }
            new_index[old] = new;
        }
        let atoms = order.iter().map(|&old| self.atoms[old].clone()).collect();
        let bonds = self
            .bonds
            .iter()
            .map(|b| Bond::new(new_index[b.i], new_index[b.j], b.order))
            .collect();
        Some(Structure { atoms, bonds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Structure {
        let mut s = Structure::new();
        s.atoms.push(Atom::new(Element::O, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::H, [0.96, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::H, [-0.24, 0.93, 0.0]));
        s.bonds.push(Bond::new(0, 1, BondOrder::Single));
        s.bonds.push(Bond::new(2, 0, BondOrder::Single));
        s
    }

    #[test]
    fn bond_new_orders_indices() {
        let b = Bond::new(5, 2, BondOrder::Double);
        assert_eq!((b.i, b.j), (2, 5));
    }

    #[test]
    fn counts_and_charges() {
        let mut s = water();
        assert_eq!(s.atom_count(), 3);
        assert_eq!(s.bond_count(), 2);
        assert_eq!(s.nuclear_charge(), 10);
        assert_eq!(s.total_formal_charge(), 0);
        s.atoms[0].formal_charge = -1;
        assert_eq!(s.total_formal_charge(), -1);
    }

    #[test]
    fn connectivity_flags() {
        let s = water();
        assert!(s.has_connectivity());
        assert!(s.has_coordinates());

        let mut bare = s.clone();
        bare.bonds.clear();
        assert!(!bare.has_connectivity());
        assert_eq!(bare.connected_components(), 3);

        let single = Structure {
            atoms: vec![Atom::unplaced(Element::He)],
            bonds: Vec::new(),
        };
        assert!(single.has_connectivity());
        assert!(!single.has_coordinates());
    }

    #[test]
    fn relabeled_permutes_atoms_and_bonds() {
        let s = water();
        let r = s.relabeled(&[2, 0, 1]).unwrap();
        assert_eq!(r.atoms[0].element, Element::H);
        assert_eq!(r.atoms[1].element, Element::O);
        assert!(r.bonds.contains(&Bond::new(0, 1, BondOrder::Single)));
        assert!(r.bonds.contains(&Bond::new(1, 2, BondOrder::Single)));
        assert_eq!(r.connected_components(), 1);
    }

    #[test]
    fn relabeled_rejects_non_permutations() {
        let s = water();
        assert!(s.relabeled(&[0, 0, 1]).is_none());
        assert!(s.relabeled(&[0, 1]).is_none());
        assert!(s.relabeled(&[0, 1, 3]).is_none());
    }

    #[test]
    fn element_counts_are_sorted_by_element() {
        let counts = water().element_counts();
        let keys: Vec<_> = counts.keys().copied().collect();
        assert_eq!(keys, vec![Element::H, Element::O]);
        assert_eq!(counts[&Element::H], 2);
    }
}
