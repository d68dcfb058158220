//! Four-state logic values with truth-table-based operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single 4-state logic value as used by event-driven HDL simulation.
///
/// The four states represent:
/// - `Zero` — logic low (driven 0)
/// - `One` — logic high (driven 1)
/// - `X` — unknown or uninitialized value
/// - `Z` — high-impedance (tri-state, not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns `true` if the value is `X` or `Z`.
    pub fn is_unknown(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }

    /// Returns `true` if the value is a driven `Zero` or `One`.
    pub fn is_known(self) -> bool {
        !self.is_unknown()
    }

    /// Converts a boolean to `Zero`/`One`.
    pub fn from_bool(b: bool) -> Self {
        if b {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}

/// 4-state AND truth table: a 0 on either side dominates, producing 0;
/// `1 & 1` is 1; every other combination is unknown.
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// 4-state OR truth table: a 1 on either side dominates, producing 1;
/// `0 | 0` is 0; every other combination is unknown.
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// 4-state XOR truth table: defined only when both operands are known;
/// any X/Z operand produces X.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// 4-state NOT: `!0 = 1`, `!1 = 0`, `!X = X`, `!Z = X`.
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::*;

    #[test]
    fn and_zero_dominates() {
        for v in [Zero, One, X, Z] {
            assert_eq!(Zero & v, Zero);
            assert_eq!(v & Zero, Zero);
        }
        assert_eq!(One & One, One);
        assert_eq!(One & X, X);
        assert_eq!(One & Z, X);
        assert_eq!(X & Z, X);
        assert_eq!(Z & Z, X);
    }

    #[test]
    fn or_one_dominates() {
        for v in [Zero, One, X, Z] {
            assert_eq!(One | v, One);
            assert_eq!(v | One, One);
        }
        assert_eq!(Zero | Zero, Zero);
        assert_eq!(Zero | X, X);
        assert_eq!(Zero | Z, X);
        assert_eq!(X | X, X);
    }

    #[test]
    fn xor_unknown_poisons() {
        assert_eq!(Zero ^ Zero, Zero);
        assert_eq!(One ^ One, Zero);
        assert_eq!(Zero ^ One, One);
        assert_eq!(One ^ Zero, One);
        for v in [Zero, One, X, Z] {
            assert_eq!(X ^ v, X);
            assert_eq!(Z ^ v, X);
        }
    }

    #[test]
    fn not_values() {
        assert_eq!(!Zero, One);
        assert_eq!(!One, Zero);
        assert_eq!(!X, X);
        assert_eq!(!Z, X);
    }

    #[test]
    fn unknown_queries() {
        assert!(X.is_unknown());
        assert!(Z.is_unknown());
        assert!(Zero.is_known());
        assert!(One.is_known());
    }

    #[test]
    fn from_bool() {
        use super::Logic;
        assert_eq!(Logic::from_bool(true), One);
        assert_eq!(Logic::from_bool(false), Zero);
    }

    #[test]
    fn from_char_valid() {
        use super::Logic;
        assert_eq!(Logic::from_char('0'), Some(Zero));
        assert_eq!(Logic::from_char('1'), Some(One));
        assert_eq!(Logic::from_char('x'), Some(X));
        assert_eq!(Logic::from_char('Z'), Some(Z));
        assert_eq!(Logic::from_char('q'), None);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{Zero}{One}{X}{Z}"), "01XZ");
    }
}
