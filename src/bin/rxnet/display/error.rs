use std::error::Error as StdError;
use std::io::{self, Write};

use anyhow::Error;

use rxn_ledger::io::{Error as IoError, Format};
use rxn_ledger::store::Error as StoreError;
use rxn_ledger::{Error as NetworkError, StructureError};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = collect_hints(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

/// Hints for the innermost typed error found in the chain.
fn collect_hints(err: &Error) -> Vec<String> {
    let mut hints = HintCollector::default();

    for cause in err.chain() {
        if hints.collect(cause) {
            return hints.0;
        }
    }

    hints.collect_fallback(&error_chain_text(err));
    hints.0
}

#[derive(Default)]
struct HintCollector(Vec<String>);

impl HintCollector {
    fn add(&mut self, hint: impl Into<String>) {
        self.0.push(hint.into());
    }

    /// Returns `true` once a typed error produced hints.
    fn collect(&mut self, cause: &(dyn StdError + 'static)) -> bool {
        if let Some(e) = cause.downcast_ref::<NetworkError>() {
            self.collect_network_hints(e);
        } else if let Some(e) = cause.downcast_ref::<StoreError>() {
            self.collect_store_hints(e);
        } else if let Some(e) = cause.downcast_ref::<IoError>() {
            self.collect_io_hints(e);
        } else if let Some(e) = cause.downcast_ref::<std::io::Error>() {
            self.collect_std_io_hints(e);
        } else {
            return false;
        }
        !self.0.is_empty()
    }

    fn collect_network_hints(&mut self, err: &NetworkError) {
        match err {
            NetworkError::Structure(inner) => self.collect_structure_hints(inner),

            NetworkError::ChargeSpinMismatch { electrons, .. } => {
                self.add(format!("The structure carries {electrons} electrons at this charge"));
                self.add("An even electron count needs an odd multiplicity and vice versa");
                self.add("Omit --spin to use the lowest consistent multiplicity");
            }

            NetworkError::InvalidProvenance(_) => {
                self.add("Input records must not name a parent; derived records must");
                self.add("Check that the record's object id matches the object it describes");
            }

            NetworkError::DanglingReference { kind, .. } => {
                self.add(format!("Add the {kind} to the network before referring to it"));
                self.add("Merged aliases cannot be referenced; use the canonical id");
            }

            NetworkError::UnknownObject(_) => {
                self.add("The id has no provenance record in this snapshot");
                self.add("Run `rxnet show` to list known state ids");
            }

            NetworkError::CycleDetected(_) => {
                self.add("The snapshot's provenance graph contains a loop");
                self.add("The snapshot was likely edited by hand or is corrupt");
            }

            NetworkError::DuplicateObject { .. } => {
                self.add("Every object and provenance record needs a unique id");
            }

            NetworkError::ConfigParse(_) => {
                self.add("Check the config file for unknown keys or wrong value types");
                self.add("Known keys: record_alternate_provenance, [canon]");
            }

            NetworkError::ReactionCardinality(_)
            | NetworkError::EmptyPathway
            | NetworkError::PathwayOrder { .. } => {
                self.add("The snapshot contains a malformed composite object");
            }
        }
    }

    fn collect_structure_hints(&mut self, err: &StructureError) {
        self.add(format!("The molecule could not be identified: {err}"));
        self.add("Provide bonds (SDF) or coordinates (XYZ) for every atom");
        self.add("Try a larger canon.bond_tolerance for stretched geometries");
    }

    fn collect_store_hints(&mut self, err: &StoreError) {
        match err {
            StoreError::Io { source, .. } => self.collect_std_io_hints(source),

            StoreError::Json(_) => {
                self.add("The snapshot is not valid JSON or has unexpected fields");
                self.add("Verify the file is not truncated");
            }

            StoreError::Contract { table, .. } => {
                self.add(format!("A row in the '{table}' table breaks the schema"));
                self.add("Run `rxnet schema` to see the expected columns");
            }

            StoreError::UnsupportedVersion { expected, .. } => {
                self.add(format!("This build reads snapshot version {expected}"));
            }

            StoreError::Network(inner) => self.collect_network_hints(inner),
        }
    }

    fn collect_io_hints(&mut self, err: &IoError) {
        match err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} format",
                    line, format
                ));
                self.add("Inspect the file around that line for malformed entries");
                match format {
                    Format::Sdf => {
                        self.add("SDF: only V2000 connection tables are read");
                        self.add("SDF: check the fixed-width atom and bond blocks");
                    }
                    Format::Xyz => {
                        self.add("XYZ: line 1 holds the atom count, line 2 a comment");
                    }
                }
            }

            IoError::UnknownFormat(_) => {
                self.add("Supported input extensions: .sdf, .sd, .mol, .xyz");
            }

            IoError::UnsupportedWriteFormat(_) | IoError::MissingCoordinates(_) => {
                self.add("Structures are exported as XYZ and need coordinates");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback(&mut self, msg: &str) {
        if msg.contains("invalid character") || msg.contains("invalid length") {
            self.add("Identifiers are hyphenated UUIDs, as printed by `rxnet show`");
        } else if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
