use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use rxn_ledger::NetworkConfig;

/// Reads network settings from `path`, or the defaults when none is given.
pub fn load_network_config(path: Option<&Path>) -> Result<NetworkConfig> {
    let Some(path) = path else {
        return Ok(NetworkConfig::default());
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    NetworkConfig::from_toml_str(&source)
        .with_context(|| format!("Invalid network config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(load_network_config(None).unwrap(), NetworkConfig::default());
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "record_alternate_provenance = false").unwrap();
        let config = load_network_config(Some(file.path())).unwrap();
        assert!(!config.record_alternate_provenance);
    }

    #[test]
    fn unknown_key_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bogus = 1").unwrap();
        let err = load_network_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid network config"));
    }
}
