use serde::{Deserialize, Serialize};

/// Thermochemical properties of a single state.
///
/// Energies are in eV, entropy in eV K⁻¹. Any quantity may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thermochemistry {
    pub energy: Option<f64>,
    pub enthalpy: Option<f64>,
    pub entropy: Option<f64>,
    pub free_energy: Option<f64>,
}

impl Thermochemistry {
    pub fn with_energy(energy: f64) -> Self {
        Self {
            energy: Some(energy),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_none()
            && self.enthalpy.is_none()
            && self.entropy.is_none()
            && self.free_energy.is_none()
    }
}

/// Reaction energy changes (ΔE, ΔH, ΔS, ΔG), product minus reactant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionEnergetics {
    pub d_e: Option<f64>,
    pub d_h: Option<f64>,
    pub d_s: Option<f64>,
    pub d_g: Option<f64>,
}

impl ReactionEnergetics {
    /// Differences for every quantity known on both sides.
    pub fn between(reactant: &Thermochemistry, product: &Thermochemistry) -> Self {
        fn delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
            Some(b? - a?)
        }

        Self {
            d_e: delta(reactant.energy, product.energy),
            d_h: delta(reactant.enthalpy, product.enthalpy),
            d_s: delta(reactant.entropy, product.entropy),
            d_g: delta(reactant.free_energy, product.free_energy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.d_e.is_none() && self.d_h.is_none() && self.d_s.is_none() && self.d_g.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_need_both_sides() {
        let reactant = Thermochemistry {
            energy: Some(-10.0),
            enthalpy: Some(-9.5),
            entropy: None,
            free_energy: Some(-9.0),
        };
        let product = Thermochemistry {
            energy: Some(-10.75),
            enthalpy: None,
            entropy: Some(0.002),
            free_energy: Some(-9.25),
        };
        let d = ReactionEnergetics::between(&reactant, &product);
        assert!((d.d_e.unwrap() + 0.75).abs() < 1e-12);
        assert!(d.d_h.is_none());
        assert!(d.d_s.is_none());
        assert!((d.d_g.unwrap() + 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_detection() {
        assert!(Thermochemistry::default().is_empty());
        assert!(!Thermochemistry::with_energy(1.0).is_empty());
        assert!(ReactionEnergetics::default().is_empty());
    }
}
