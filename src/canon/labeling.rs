//! Colour refinement, canonical labeling, and Weisfeiler–Lehman hashing.
//!
//! Atoms start coloured by (atomic number, formal charge). Refinement splits
//! colour classes by the multiset of neighbour colours and bond orders until
//! the partition is stable. When classes remain, each member of the first
//! non-singleton class is individualized in turn and the search recurses;
//! the lexicographically smallest encoding over all leaves is canonical.
//! Branches that are images of explored ones under a discovered
//! automorphism are skipped, so symmetric molecules stay cheap.

use super::error::StructureError;
use crate::model::structure::Structure;
use sha2::{Digest, Sha256};

pub(crate) struct Graph<'s> {
    structure: &'s Structure,
    adj: Vec<Vec<(usize, u8)>>,
}

/// Encoding of the canonical labeling, split into its connectivity part and
/// the formal-charge annotations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CanonicalForm {
    pub skeleton: String,
    pub charges: String,
}

impl<'s> Graph<'s> {
    pub fn new(structure: &'s Structure) -> Self {
        let adj = structure
            .neighbors()
            .into_iter()
            .map(|list| list.into_iter().map(|(j, o)| (j, o.code())).collect())
            .collect();
        Self { structure, adj }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn atom_label(&self, v: usize) -> (u8, i8) {
        let atom = &self.structure.atoms[v];
        (atom.element.atomic_number(), atom.formal_charge)
    }

    fn initial_colors(&self) -> Vec<usize> {
        let labels: Vec<_> = (0..self.len()).map(|v| self.atom_label(v)).collect();
        rank(&labels)
    }

    fn refine(&self, mut colors: Vec<usize>) -> Vec<usize> {
        let mut classes = distinct_count(&colors);
        loop {
            let signatures: Vec<(usize, Vec<(usize, u8)>)> = (0..self.len())
                .map(|v| {
                    let mut around: Vec<_> =
                        self.adj[v].iter().map(|&(u, o)| (colors[u], o)).collect();
                    around.sort_unstable();
                    (colors[v], around)
                })
                .collect();
            let next = rank(&signatures);
            let next_classes = distinct_count(&next);
            if next_classes == classes {
                return next;
            }
            classes = next_classes;
            colors = next;
        }
    }

    fn encode(&self, colors: &[usize]) -> CanonicalForm {
        let n = self.len();
        let mut order = vec![0usize; n];
        for (v, &c) in colors.iter().enumerate() {
            order[c] = v;
        }

        let atoms: Vec<&str> = order
            .iter()
            .map(|&v| self.structure.atoms[v].element.symbol())
            .collect();

        let mut bonds: Vec<(usize, usize, u8)> = Vec::new();
        for (v, list) in self.adj.iter().enumerate() {
            for &(u, o) in list {
                let (a, b) = (colors[v], colors[u]);
                if a < b {
                    bonds.push((a, b, o));
                }
            }
        }
        bonds.sort_unstable();
        let bonds: Vec<String> = bonds
            .iter()
            .map(|(a, b, o)| format!("{a}-{b}:{o}"))
            .collect();

        let charges: Vec<String> = order
            .iter()
            .enumerate()
            .filter_map(|(rank, &v)| {
                let q = self.structure.atoms[v].formal_charge;
                (q != 0).then(|| format!("{rank}:{q:+}"))
            })
            .collect();

        CanonicalForm {
            skeleton: format!("{}/{}", atoms.join("."), bonds.join(",")),
            charges: charges.join(","),
        }
    }
}

/// Finds the canonical form of `graph`, visiting at most `budget` leaves.
pub(crate) fn canonical_form(
    graph: &Graph<'_>,
    budget: usize,
) -> Result<CanonicalForm, StructureError> {
    let mut search = Search {
        graph,
        budget,
        leaves: 0,
        path: Vec::new(),
        firsts: Vec::new(),
        best: None,
        generators: Vec::new(),
    };
    search.explore(graph.initial_colors())?;
    search
        .best
        .map(|leaf| leaf.form)
        .ok_or(StructureError::SearchBudgetExceeded(budget))
}

/// A discrete colouring reached by individualizing `path` in order.
#[derive(Clone)]
struct Leaf {
    path: Vec<usize>,
    colors: Vec<usize>,
    form: CanonicalForm,
}

impl Leaf {
    /// The permutation taking this leaf's labeling onto `other`'s. It is an
    /// automorphism whenever the two forms are equal.
    fn mapping_to(&self, other: &Leaf) -> Vec<usize> {
        let mut order = vec![0usize; other.colors.len()];
        for (v, &c) in other.colors.iter().enumerate() {
            order[c] = v;
        }
        self.colors.iter().map(|&c| order[c]).collect()
    }
}

/// Depth-first individualization–refinement search.
///
/// Two prunings keep symmetric molecules cheap. A leaf whose form repeats a
/// stored leaf yields an automorphism; if it maps the stored branch onto the
/// current one at their divergence point, the rest of the current branch is
/// an image of explored ground and is abandoned. Children of a node that
/// share an orbit with an explored sibling, under the automorphisms found so
/// far that fix the node's path, are skipped.
struct Search<'g, 's> {
    graph: &'g Graph<'s>,
    budget: usize,
    leaves: usize,
    path: Vec<usize>,
    /// First leaf reached below each node on the current path.
    firsts: Vec<Option<Leaf>>,
    best: Option<Leaf>,
    generators: Vec<Vec<usize>>,
}

impl Search<'_, '_> {
    /// Returns `Some(depth)` when the branch should be abandoned up to the
    /// node at `depth`.
    fn explore(&mut self, colors: Vec<usize>) -> Result<Option<usize>, StructureError> {
        let colors = self.graph.refine(colors);
        let depth = self.path.len();

        let Some(cell) = first_open_cell(&colors) else {
            return self.visit_leaf(colors);
        };

        self.firsts.truncate(depth);
        self.firsts.push(None);

        let members: Vec<usize> = (0..colors.len()).filter(|&v| colors[v] == cell).collect();
        let mut explored: Vec<usize> = Vec::new();
        for v in members {
            if self.shares_orbit(v, &explored) {
                continue;
            }
            let mut next: Vec<usize> = colors.iter().map(|&c| 2 * c + 1).collect();
            next[v] = 2 * cell;

            self.path.push(v);
            let jump = self.explore(next);
            self.path.pop();
            explored.push(v);

            if let Some(target) = jump?.filter(|&target| target < depth) {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    fn visit_leaf(&mut self, colors: Vec<usize>) -> Result<Option<usize>, StructureError> {
        self.leaves += 1;
        if self.leaves > self.budget {
            return Err(StructureError::SearchBudgetExceeded(self.budget));
        }
        let leaf = Leaf {
            path: self.path.clone(),
            form: self.graph.encode(&colors),
            colors,
        };

        let mut jump: Option<usize> = None;
        let mut found = Vec::new();
        for stored in self.firsts.iter().flatten().chain(self.best.iter()) {
            if stored.form != leaf.form {
                continue;
            }
            let gamma = stored.mapping_to(&leaf);
            let split = stored
                .path
                .iter()
                .zip(&leaf.path)
                .take_while(|(a, b)| a == b)
                .count();
            let maps_branch = split < stored.path.len()
                && split < leaf.path.len()
                && stored.path[..=split]
                    .iter()
                    .zip(&leaf.path[..=split])
                    .all(|(&a, &b)| gamma[a] == b);
            if maps_branch {
                jump = Some(jump.map_or(split, |j| j.min(split)));
            }
            found.push(gamma);
        }
        for gamma in found {
            let identity = gamma.iter().enumerate().all(|(v, &u)| v == u);
            if !identity && !self.generators.contains(&gamma) {
                self.generators.push(gamma);
            }
        }

        for slot in self.firsts.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(leaf.clone());
        }
        if self.best.as_ref().is_none_or(|best| leaf.form < best.form) {
            self.best = Some(leaf);
        }
        Ok(jump)
    }

    /// Whether `v` lies in the orbit of an explored sibling under the known
    /// automorphisms that fix every atom on the current path.
    fn shares_orbit(&self, v: usize, explored: &[usize]) -> bool {
        if explored.is_empty() {
            return false;
        }
        let n = self.graph.len();
        let mut parent: Vec<usize> = (0..n).collect();
        for gamma in &self.generators {
            if self.path.iter().any(|&p| gamma[p] != p) {
                continue;
            }
            for (a, &b) in gamma.iter().enumerate() {
                let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
                if ra != rb {
                    parent[ra] = rb;
                }
            }
        }
        let root = find(&mut parent, v);
        explored.iter().any(|&u| find(&mut parent, u) == root)
    }
}

fn find(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

/// Smallest colour shared by more than one atom.
fn first_open_cell(colors: &[usize]) -> Option<usize> {
    let mut counts = vec![0usize; colors.len()];
    for &c in colors {
        counts[c] += 1;
    }
    counts.iter().position(|&count| count > 1)
}

/// Replaces each value by its rank among the distinct values.
fn rank<T: Ord + Clone>(values: &[T]) -> Vec<usize> {
    let mut distinct = values.to_vec();
    distinct.sort();
    distinct.dedup();
    values
        .iter()
        .map(|v| distinct.binary_search(v).unwrap_or_else(|i| i))
        .collect()
}

fn distinct_count(colors: &[usize]) -> usize {
    let mut sorted = colors.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// Weisfeiler–Lehman subtree hash over `iterations` rounds.
pub(crate) fn wl_hash(graph: &Graph<'_>, iterations: usize) -> String {
    let mut labels: Vec<String> = (0..graph.len())
        .map(|v| {
            let (z, q) = graph.atom_label(v);
            if q == 0 {
                z.to_string()
            } else {
                format!("{z}{q:+}")
            }
        })
        .collect();

    let mut hasher = Sha256::new();
    absorb(&mut hasher, &labels);
    for _ in 0..iterations {
        labels = (0..graph.len())
            .map(|v| {
                let mut around: Vec<String> = graph.adj[v]
                    .iter()
                    .map(|&(u, o)| format!("{o}{}", labels[u]))
                    .collect();
                around.sort();
                let digest = Sha256::digest(format!("{}({})", labels[v], around.join(",")));
                hex(&digest[..8])
            })
            .collect();
        absorb(&mut hasher, &labels);
    }
    hex(&hasher.finalize()[..16])
}

fn absorb(hasher: &mut Sha256, labels: &[String]) {
    let mut sorted = labels.to_vec();
    sorted.sort();
    for label in &sorted {
        hasher.update(label.as_bytes());
        hasher.update(b";");
    }
    hasher.update(b"|");
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
