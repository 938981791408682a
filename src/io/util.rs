use crate::model::types::{BondOrder, Element};

/// Reads an element from a file token such as `C`, `CL`, `cl`, `Cl1` or `17`.
pub fn element_from_token(token: &str) -> Option<Element> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(z) = token.parse::<u8>() {
        return Element::from_atomic_number(z);
    }

    let letters: String = token.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();

    if rest.len() <= 1 {
        if let Ok(element) = format!("{first}{rest}").parse() {
            return Some(element);
        }
    }
    first.to_string().parse().ok()
}

/// Maps an MDL connection table bond type to a bond order.
pub fn bond_order_from_ctfile(value: i32) -> Option<BondOrder> {
    match value {
        1 => Some(BondOrder::Single),
        2 => Some(BondOrder::Double),
        3 => Some(BondOrder::Triple),
        4 => Some(BondOrder::Aromatic),
        _ => None,
    }
}

/// Maps the legacy atom-block charge code of a V2000 atom line.
pub fn charge_from_ctfile(code: i32) -> Option<i8> {
    match code {
        0 => Some(0),
        1 => Some(3),
        2 => Some(2),
        3 => Some(1),
        4 => Some(0),
        5 => Some(-1),
        6 => Some(-2),
        7 => Some(-3),
        _ => None,
    }
}
