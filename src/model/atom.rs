use super::types::Element;
use serde::{Deserialize, Serialize};

/// A single atom of a molecular graph.
///
/// Coordinates are optional: graph-only inputs carry connectivity but no
/// geometry, and Cartesian-only inputs carry geometry that bond perception
/// turns into connectivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element: Element,
    pub position: Option<[f64; 3]>,
    #[serde(default)]
    pub formal_charge: i8,
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self {
            element,
            position: Some(position),
            formal_charge: 0,
        }
    }

    pub fn unplaced(element: Element) -> Self {
        Self {
            element,
            position: None,
            formal_charge: 0,
        }
    }

    pub fn with_formal_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }
}
