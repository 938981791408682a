use crate::io::error::Error;
use crate::model::structure::Structure;
use std::io::Write;

pub fn write<W: Write>(mut writer: W, structure: &Structure, comment: &str) -> Result<(), Error> {
    writeln!(writer, "{}", structure.atom_count())?;
    writeln!(writer, "{}", comment.lines().next().unwrap_or(""))?;
    for (i, atom) in structure.atoms.iter().enumerate() {
        let [x, y, z] = atom.position.ok_or(Error::MissingCoordinates(i))?;
        writeln!(
            writer,
            "{:<2} {:>14.8} {:>14.8} {:>14.8}",
            atom.element.symbol(),
            x,
            y,
            z
        )?;
    }
    Ok(())
}
