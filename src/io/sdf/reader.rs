use crate::io::{Format, error::Error, util};
use crate::model::{
    atom::Atom,
    structure::{Bond, Structure},
};
use std::io::BufRead;

/// Reads the first record of an MDL SDF/MOL (V2000) stream.
///
/// Formal charges come from `M  CHG` property lines when present, otherwise
/// from the legacy charge field of each atom line.
pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let lines = collect_first_block(reader)?;
    if lines.len() < 4 {
        return Err(Error::parse(
            Format::Sdf,
            1,
            "SDF block must contain at least a header and counts line",
        ));
    }

    let counts_line_no = lines[3].0;
    let counts_line = &lines[3].1;
    if counts_line.contains("V3000") {
        return Err(Error::parse(
            Format::Sdf,
            counts_line_no,
            "V3000 is not supported",
        ));
    }

    let (atom_count, bond_count) = parse_counts(counts_line, counts_line_no)?;
    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;

    if lines.len() < props_start {
        return Err(Error::parse(
            Format::Sdf,
            lines.last().map(|(ln, _)| *ln).unwrap_or(counts_line_no),
            "SDF block ended before atoms/bonds were fully specified",
        ));
    }

    let mut atoms = parse_atoms(&lines[atom_start..bond_start])?;
    let bonds = parse_bonds(&lines[bond_start..props_start], atom_count)?;
    apply_charge_properties(&lines[props_start..], &mut atoms)?;

    Ok(Structure { atoms, bonds })
}

fn collect_first_block<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let content = line?;
        let ln = i + 1;
        if content.trim() == "$$$$" && !lines.is_empty() {
            break;
        }
        lines.push((ln, content));
    }
    Ok(lines)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let padded = format!("{line:<6}");
    let atoms = padded[0..3]
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid atom count"))?;
    let bonds = padded[3..6]
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atoms(lines: &[(usize, String)]) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let padded = format!("{raw:<42}");
        let coord = |range: std::ops::Range<usize>, axis: &str| {
            padded[range].trim().parse::<f64>().map_err(|_| {
                Error::parse(Format::Sdf, *ln, format!("invalid {axis} coordinate in atom line"))
            })
        };
        let x = coord(0..10, "x")?;
        let y = coord(10..20, "y")?;
        let z = coord(20..30, "z")?;

        let element = util::element_from_token(&padded[31..34])
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unable to infer element symbol"))?;

        let charge_field = padded[36..39].trim();
        let charge = if charge_field.is_empty() {
            0
        } else {
            charge_field
                .parse::<i32>()
                .ok()
                .and_then(util::charge_from_ctfile)
                .ok_or_else(|| Error::parse(Format::Sdf, *ln, "invalid charge field in atom line"))?
        };

        atoms.push(Atom::new(element, [x, y, z]).with_formal_charge(charge));
    }
    Ok(atoms)
}

fn parse_bonds(lines: &[(usize, String)], atom_count: usize) -> Result<Vec<Bond>, Error> {
    let mut bonds = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let padded = format!("{raw:<9}");
        let field = |range: std::ops::Range<usize>, what: &str| {
            padded[range]
                .trim()
                .parse::<i32>()
                .map_err(|_| Error::parse(Format::Sdf, *ln, format!("invalid {what} in bond line")))
        };
        let a1 = field(0..3, "first atom index")?;
        let a2 = field(3..6, "second atom index")?;
        let order_val = field(6..9, "bond order value")?;

        let order = util::bond_order_from_ctfile(order_val)
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unsupported bond order in bond line"))?;

        let in_range = |a: i32| a >= 1 && a as usize <= atom_count;
        if !in_range(a1) || !in_range(a2) {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                "bond references atom outside declared range",
            ));
        }

        bonds.push(Bond::new(a1 as usize - 1, a2 as usize - 1, order));
    }
    Ok(bonds)
}

fn apply_charge_properties(lines: &[(usize, String)], atoms: &mut [Atom]) -> Result<(), Error> {
    let mut reset = false;
    for (ln, raw) in lines {
        if raw.starts_with("M  END") {
            break;
        }
        if !raw.starts_with("M  CHG") {
            continue;
        }
        if !reset {
            for atom in atoms.iter_mut() {
                atom.formal_charge = 0;
            }
            reset = true;
        }

        let tokens: Vec<_> = raw[6..].split_whitespace().collect();
        let entries = tokens
            .first()
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "invalid M  CHG entry count"))?;
        if tokens.len() < 1 + 2 * entries {
            return Err(Error::parse(Format::Sdf, *ln, "truncated M  CHG line"));
        }
        for pair in tokens[1..1 + 2 * entries].chunks(2) {
            let index = pair[0]
                .parse::<usize>()
                .ok()
                .filter(|&i| i >= 1 && i <= atoms.len())
                .ok_or_else(|| Error::parse(Format::Sdf, *ln, "M  CHG references unknown atom"))?;
            let charge = pair[1]
                .parse::<i8>()
                .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid charge in M  CHG line"))?;
            atoms[index - 1].formal_charge = charge;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{BondOrder, Element};
    use std::io::Cursor;

    const HYDROXIDE: &str = "\
hydroxide
  hand-written

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    0.9700    0.0000    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
M  CHG  1   1  -1
M  END
$$$$
";

    #[test]
    fn reads_atoms_bonds_and_charges() {
        let s = read(Cursor::new(HYDROXIDE)).unwrap();
        assert_eq!(s.atom_count(), 2);
        assert_eq!(s.atoms[0].element, Element::O);
        assert_eq!(s.atoms[0].formal_charge, -1);
        assert_eq!(s.atoms[1].position, Some([0.97, 0.0, 0.0]));
        assert_eq!(s.bonds, vec![Bond::new(0, 1, BondOrder::Single)]);
        assert_eq!(s.total_formal_charge(), -1);
    }

    #[test]
    fn legacy_charge_field_is_used_without_properties() {
        let text = HYDROXIDE
            .replace("O   0  0  0", "O   0  5  0")
            .replace("M  CHG  1   1  -1\n", "");
        let s = read(Cursor::new(text)).unwrap();
        assert_eq!(s.atoms[0].formal_charge, -1);
    }

    #[test]
    fn rejects_out_of_range_bond() {
        let text = HYDROXIDE.replace("  1  2  1  0", "  1  3  1  0");
        let err = read(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, Error::Parse { format: Format::Sdf, line: 7, .. }));
    }

    #[test]
    fn rejects_v3000() {
        let text = HYDROXIDE.replace("V2000", "V3000");
        assert!(read(Cursor::new(text)).is_err());
    }

    #[test]
    fn rejects_truncated_block() {
        let text: String = HYDROXIDE.lines().take(5).map(|l| format!("{l}\n")).collect();
        assert!(matches!(
            read(Cursor::new(text)),
            Err(Error::Parse { .. })
        ));
    }
}
