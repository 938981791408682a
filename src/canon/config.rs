use serde::{Deserialize, Serialize};

/// Settings for the reference [`GraphCanonicalizer`](super::GraphCanonicalizer).
///
/// # Examples
///
/// ```
/// use rxn_ledger::CanonConfig;
///
/// let strict = CanonConfig {
///     require_connected: true,
///     ..Default::default()
/// };
/// assert!(strict.perceive_bonds);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonConfig {
    /// Weisfeiler–Lehman iterations folded into the graph hash.
    pub wl_iterations: usize,

    /// Slack in Ångströms added to the sum of covalent radii when inferring bonds.
    pub bond_tolerance: f64,

    /// Infer bonds from coordinates when a structure has none.
    pub perceive_bonds: bool,

    /// Reject structures that split into several fragments.
    ///
    /// Off by default since reaction complexes are usually disconnected.
    pub require_connected: bool,

    /// Upper bound on leaves visited by the canonical labeling search.
    pub max_search_leaves: usize,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            wl_iterations: 3,
            bond_tolerance: 0.45,
            perceive_bonds: true,
            require_connected: false,
            max_search_leaves: 20_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = CanonConfig::default();
        assert_eq!(config.wl_iterations, 3);
        assert!((config.bond_tolerance - 0.45).abs() < 1e-12);
        assert!(config.perceive_bonds);
        assert!(!config.require_connected);
        assert_eq!(config.max_search_leaves, 20_000);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: CanonConfig = toml::from_str("wl_iterations = 5").unwrap();
        assert_eq!(config.wl_iterations, 5);
        assert!(config.perceive_bonds);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CanonConfig>("wl_depth = 5").is_err());
    }
}
