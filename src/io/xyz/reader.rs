use crate::io::{Format, error::Error, util};
use crate::model::{atom::Atom, structure::Structure};
use std::io::BufRead;

/// Reads the first frame of an XYZ stream.
///
/// XYZ carries no connectivity; the returned structure has no bonds.
pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let mut lines = reader.lines().enumerate();

    let (_, count_line) = lines
        .next()
        .ok_or_else(|| Error::parse(Format::Xyz, 1, "empty XYZ input"))?;
    let atom_count = count_line?
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Xyz, 1, "first line must hold the atom count"))?;

    match lines.next() {
        Some((_, comment)) => {
            comment?;
        }
        None => return Err(Error::parse(Format::Xyz, 2, "missing comment line")),
    }

    let mut atoms = Vec::with_capacity(atom_count);
    for (i, line) in lines.take(atom_count) {
        let ln = i + 1;
        let line = line?;
        let tokens: Vec<_> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::parse(
                Format::Xyz,
                ln,
                "atom line must hold an element and three coordinates",
            ));
        }
        let element = util::element_from_token(tokens[0])
            .ok_or_else(|| Error::parse(Format::Xyz, ln, "unable to infer element symbol"))?;
        let mut position = [0.0; 3];
        for (axis, token) in position.iter_mut().zip(&tokens[1..4]) {
            *axis = token
                .parse::<f64>()
                .map_err(|_| Error::parse(Format::Xyz, ln, "invalid coordinate"))?;
        }
        atoms.push(Atom::new(element, position));
    }

    if atoms.len() != atom_count {
        return Err(Error::parse(
            Format::Xyz,
            atoms.len() + 3,
            format!("expected {atom_count} atoms, found {}", atoms.len()),
        ));
    }

    Ok(Structure {
        atoms,
        bonds: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;
    use std::io::Cursor;

    #[test]
    fn reads_water() {
        let text = "3\nwater\nO 0.0 0.0 0.117\nH 0.0 0.757 -0.467\nH 0.0 -0.757 -0.467\n";
        let s = read(Cursor::new(text)).unwrap();
        assert_eq!(s.atom_count(), 3);
        assert_eq!(s.atoms[0].element, Element::O);
        assert_eq!(s.atoms[2].position, Some([0.0, -0.757, -0.467]));
        assert!(s.bonds.is_empty());
    }

    #[test]
    fn short_frame_is_rejected() {
        let text = "3\nwater\nO 0.0 0.0 0.117\n";
        assert!(matches!(
            read(Cursor::new(text)),
            Err(Error::Parse { format: Format::Xyz, .. })
        ));
    }

    #[test]
    fn bad_count_is_rejected() {
        assert!(matches!(
            read(Cursor::new("three\n\n")),
            Err(Error::Parse { line: 1, .. })
        ));
    }
}
