use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, StdoutLock, Write};
use std::path::Path;

use anyhow::{Context, Result};

use rxn_ledger::io::{Format, read_structure};
use rxn_ledger::{NetworkConfig, ReactionNetwork, Structure, store};

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Reads one structure, inferring its format from the extension.
pub fn read_structure_file(path: &Path) -> Result<(Structure, Format)> {
    let format = Format::from_path(path)?;
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let structure = read_structure(BufReader::new(file), format)
        .with_context(|| format!("Failed to read {} file: {}", format, path.display()))?;
    Ok((structure, format))
}

/// Loads the snapshot at `path`, or starts an empty network if it does not exist yet.
pub fn open_network(path: &Path, config: NetworkConfig) -> Result<(ReactionNetwork, bool)> {
    if !path.exists() {
        return Ok((ReactionNetwork::new(config), false));
    }
    let network = store::load(path, config)
        .with_context(|| format!("Failed to load snapshot: {}", path.display()))?;
    Ok((network, true))
}

/// Loads the snapshot at `path`, which must exist.
pub fn load_network(path: &Path, config: NetworkConfig) -> Result<ReactionNetwork> {
    store::load(path, config).with_context(|| format!("Failed to load snapshot: {}", path.display()))
}

pub fn save_network(network: &ReactionNetwork, path: &Path) -> Result<()> {
    store::save(network, path)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))
}

pub enum OutputTarget {
    File(BufWriter<File>),
    Stdout(BufWriter<StdoutLock<'static>>),
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::File(w) => w.write(buf),
            OutputTarget::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::File(w) => w.flush(),
            OutputTarget::Stdout(w) => w.flush(),
        }
    }
}

pub fn create_output(path: Option<&Path>) -> Result<OutputTarget> {
    match path {
        Some(p) => {
            let file = File::create(p)
                .with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Ok(OutputTarget::File(BufWriter::new(file)))
        }
        None => Ok(OutputTarget::Stdout(BufWriter::new(io::stdout().lock()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_starts_empty_network() {
        let dir = tempfile::tempdir().unwrap();
        let (network, existed) =
            open_network(&dir.path().join("net.json"), NetworkConfig::default()).unwrap();
        assert!(!existed);
        assert_eq!(network.state_count(), 0);
    }

    #[test]
    fn reads_xyz_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h2.xyz");
        std::fs::write(&path, "2\nhydrogen\nH 0.0 0.0 0.0\nH 0.0 0.0 0.74\n").unwrap();
        let (structure, format) = read_structure_file(&path).unwrap();
        assert_eq!(format, Format::Xyz);
        assert_eq!(structure.atom_count(), 2);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_structure_file(Path::new("molecule.pdb")).unwrap_err();
        assert!(err.downcast_ref::<rxn_ledger::io::Error>().is_some());
    }
}
