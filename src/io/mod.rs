//! Structure adapters: external file formats in, [`Structure`] out.
//!
//! Every reader produces the single internal molecular graph type; nothing
//! downstream knows which format a structure came from.

use crate::model::structure::Structure;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

pub mod error;
pub mod util;

mod sdf {
    pub mod reader;
}

mod xyz {
    pub mod reader;
    pub mod writer;
}

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sdf,
    Xyz,
}

impl Format {
    /// Infers the format from a file extension (`sdf`, `mol`, `sd`, `xyz`).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("sdf" | "sd" | "mol") => Ok(Format::Sdf),
            Some("xyz") => Ok(Format::Xyz),
            _ => Err(Error::UnknownFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Sdf => write!(f, "SDF"),
            Format::Xyz => write!(f, "XYZ"),
        }
    }
}

/// Reads one structure in `format` from `reader`.
pub fn read_structure<R: BufRead>(reader: R, format: Format) -> Result<Structure, Error> {
    match format {
        Format::Sdf => sdf::reader::read(reader),
        Format::Xyz => xyz::reader::read(reader),
    }
}

/// Writes `structure` as an XYZ frame.
pub fn write_xyz<W: Write>(writer: W, structure: &Structure, comment: &str) -> Result<(), Error> {
    xyz::writer::write(writer, structure, comment)
}

/// Writes `structure` in `format`; only XYZ output is supported.
pub fn write_structure<W: Write>(
    writer: W,
    structure: &Structure,
    format: Format,
) -> Result<(), Error> {
    match format {
        Format::Xyz => write_xyz(writer, structure, ""),
        other => Err(Error::UnsupportedWriteFormat(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::GraphCanonicalizer;
    use crate::model::state::State;
    use std::io::Cursor;

    const ETHANOL_SDF: &str = "\
ethanol
  hand-written

  9  8  0  0  0  0  0  0  0  0999 V2000
   -0.0094    0.5884    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.2147   -0.3119    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
   -1.1726   -0.2349    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    0.0302    1.2295    0.8891 H   0  0  0  0  0  0  0  0  0  0  0  0
    0.0302    1.2295   -0.8891 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.1776   -0.9563    0.8829 H   0  0  0  0  0  0  0  0  0  0  0  0
    1.1776   -0.9563   -0.8829 H   0  0  0  0  0  0  0  0  0  0  0  0
    2.1373    0.2755    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
   -1.9493    0.3459    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  1  3  1  0  0  0  0
  1  4  1  0  0  0  0
  1  5  1  0  0  0  0
  2  6  1  0  0  0  0
  2  7  1  0  0  0  0
  2  8  1  0  0  0  0
  3  9  1  0  0  0  0
M  END
$$$$
";

    // Same geometry, hydrogens first and no connectivity.
    const ETHANOL_XYZ: &str = "\
9
ethanol, hydrogens first
H     -1.9493     0.3459     0.0000
H      0.0302     1.2295     0.8891
H      2.1373     0.2755     0.0000
C      1.2147    -0.3119     0.0000
H      0.0302     1.2295    -0.8891
C     -0.0094     0.5884     0.0000
H      1.1776    -0.9563    -0.8829
O     -1.1726    -0.2349     0.0000
H      1.1776    -0.9563     0.8829
";

    #[test]
    fn sdf_and_xyz_of_one_molecule_canonicalize_identically() {
        let canon = GraphCanonicalizer::default();
        let from_sdf = read_structure(Cursor::new(ETHANOL_SDF), Format::Sdf).unwrap();
        let from_xyz = read_structure(Cursor::new(ETHANOL_XYZ), Format::Xyz).unwrap();
        assert_eq!(from_sdf.bonds.len(), 8);
        assert!(from_xyz.bonds.is_empty());

        let sdf_state = State::create(from_sdf, None, &canon).unwrap();
        let xyz_state = State::create(from_xyz, None, &canon).unwrap();
        assert_eq!(sdf_state.graph_hash(), xyz_state.graph_hash());
        assert_eq!(sdf_state.canonical_notation(), xyz_state.canonical_notation());
        assert_eq!(sdf_state.formula(), xyz_state.formula());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path("a/b.SDF").unwrap(), Format::Sdf);
        assert_eq!(Format::from_path("m.mol").unwrap(), Format::Sdf);
        assert_eq!(Format::from_path("m.xyz").unwrap(), Format::Xyz);
        assert!(matches!(
            Format::from_path("m.pdb"),
            Err(Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn sdf_output_is_unsupported() {
        let err = write_structure(Vec::new(), &Structure::new(), Format::Sdf).unwrap_err();
        assert!(matches!(err, Error::UnsupportedWriteFormat(Format::Sdf)));
    }
}
