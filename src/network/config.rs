use crate::canon::CanonConfig;
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Settings for a [`ReactionNetwork`](super::ReactionNetwork).
///
/// Loaded from TOML with every field optional:
///
/// ```
/// use rxn_ledger::NetworkConfig;
///
/// let config = NetworkConfig::from_toml_str(
///     r#"
///     record_alternate_provenance = false
///
///     [canon]
///     bond_tolerance = 0.4
///     "#,
/// )?;
/// assert!(!config.record_alternate_provenance);
/// assert_eq!(config.canon.wl_iterations, 3);
/// # Ok::<(), rxn_ledger::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Settings for the built-in canonicalizer.
    pub canon: CanonConfig,

    /// Append the provenance of a rediscovered state to the ledger as an
    /// alternate derivation of the canonical state.
    pub record_alternate_provenance: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            canon: CanonConfig::default(),
            record_alternate_provenance: true,
        }
    }
}

impl NetworkConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(
            NetworkConfig::from_toml_str("").unwrap(),
            NetworkConfig::default()
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = NetworkConfig::from_toml_str("dedup = \"off\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn nested_canon_section_is_read() {
        let config = NetworkConfig::from_toml_str(
            "[canon]\nrequire_connected = true\nmax_search_leaves = 10\n",
        )
        .unwrap();
        assert!(config.canon.require_connected);
        assert_eq!(config.canon.max_search_leaves, 10);
        assert!(config.record_alternate_provenance);
    }
}
