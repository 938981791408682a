use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

macro_rules! elements {
    ($($symbol:ident = $z:literal, $radius:literal;)+) => {
        /// Chemical elements hydrogen through xenon.
        ///
        /// The discriminant is the atomic number, which is also the neutral
        /// electron count used for charge/spin reconciliation.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[repr(u8)]
        pub enum Element {
            $($symbol = $z,)+
        }

        impl Element {
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Element::$symbol => stringify!($symbol),)+
                }
            }

            /// Single-bond covalent radius in Ångströms (Cordero et al., 2008).
            pub fn covalent_radius(&self) -> f64 {
                match self {
                    $(Element::$symbol => $radius,)+
                }
            }

            pub fn from_atomic_number(z: u8) -> Option<Self> {
                match z {
                    $($z => Some(Element::$symbol),)+
                    _ => None,
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($symbol) => Ok(Element::$symbol),)+
                    _ => Err(ParseElementError(s.to_string())),
                }
            }
        }
    };
}

elements! {
    H = 1, 0.31;
    He = 2, 0.28;
    Li = 3, 1.28;
    Be = 4, 0.96;
    B = 5, 0.84;
    C = 6, 0.76;
    N = 7, 0.71;
    O = 8, 0.66;
    F = 9, 0.57;
    Ne = 10, 0.58;
    Na = 11, 1.66;
    Mg = 12, 1.41;
    Al = 13, 1.21;
    Si = 14, 1.11;
    P = 15, 1.07;
    S = 16, 1.05;
    Cl = 17, 1.02;
    Ar = 18, 1.06;
    K = 19, 2.03;
    Ca = 20, 1.76;
    Sc = 21, 1.70;
    Ti = 22, 1.60;
    V = 23, 1.53;
    Cr = 24, 1.39;
    Mn = 25, 1.39;
    Fe = 26, 1.32;
    Co = 27, 1.26;
    Ni = 28, 1.24;
    Cu = 29, 1.32;
    Zn = 30, 1.22;
    Ga = 31, 1.22;
    Ge = 32, 1.20;
    As = 33, 1.19;
    Se = 34, 1.20;
    Br = 35, 1.20;
    Kr = 36, 1.16;
    Rb = 37, 2.20;
    Sr = 38, 1.95;
    Y = 39, 1.90;
    Zr = 40, 1.75;
    Nb = 41, 1.64;
    Mo = 42, 1.54;
    Tc = 43, 1.47;
    Ru = 44, 1.46;
    Rh = 45, 1.42;
    Pd = 46, 1.39;
    Ag = 47, 1.45;
    Cd = 48, 1.44;
    In = 49, 1.42;
    Sn = 50, 1.39;
    Sb = 51, 1.39;
    Te = 52, 1.38;
    I = 53, 1.39;
    Xe = 54, 1.40;
}

impl Element {
    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Compact code used in canonical notations and MDL bond blocks.
    pub fn code(&self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondOrder::Single),
            "double" | "2" => Ok(BondOrder::Double),
            "triple" | "3" => Ok(BondOrder::Triple),
            "aromatic" | "ar" | "4" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}
