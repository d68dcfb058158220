//! Packed vectors of 4-state logic values with full operator semantics.
//!
//! [`LogicVec`] is the value type carried by every signal and expression in
//! the kernel. Besides storage, it implements the 4-state semantics of the
//! bitwise, reduction, arithmetic, relational, case-equality, and shift
//! operators the expression evaluator is built on.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A fixed-width vector of 4-state [`Logic`] values packed for efficient storage.
///
/// Each logic value occupies 2 bits, with 32 values packed per `u64` word.
/// Bit 0 is the least significant bit of the vector.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a `LogicVec` with all bits set to `One`.
    pub fn all_one(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::One);
        }
        v
    }

    /// Creates a `LogicVec` with all bits set to `X`.
    pub fn all_x(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::X);
        }
        v
    }

    /// Creates a single-bit `LogicVec` from a boolean value.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        if value {
            v.set(0, Logic::One);
        }
        v
    }

    /// Creates a single-bit `LogicVec` holding the given logic value.
    pub fn from_logic(value: Logic) -> Self {
        let mut v = Self::new(1);
        v.set(0, value);
        v
    }

    /// Creates a `LogicVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Converts the `LogicVec` to a `u64`, if all bits are definite (0 or 1).
    ///
    /// Returns `None` if the vector contains X or Z values, or if the width
    /// exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Parses a binary string like `"10XZ"` into a `LogicVec`.
    ///
    /// The leftmost character is the most significant bit. Returns `None`
    /// if the string contains invalid characters.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let width = s.len() as u32;
        let mut v = Self::new(width);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        match (self.data[word_idx] >> bit_offset) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Returns `true` if any bit of the vector is X or Z.
    ///
    /// This is the first-class "unknown operand" query used by the arithmetic,
    /// relational, and shift operators.
    pub fn is_unknown(&self) -> bool {
        (0..self.width).any(|i| self.get(i).is_unknown())
    }

    /// Returns true if all bits are `Logic::Zero`.
    pub fn is_all_zero(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == Logic::Zero)
    }

    /// Reduces the vector to a single truth value.
    ///
    /// `One` if any bit is 1, `Zero` if every bit is 0, `X` otherwise.
    /// This is the OR-reduction the statement automaton applies to root
    /// expressions when choosing a control-flow successor.
    pub fn truth(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc | self.get(i);
            if acc == Logic::One {
                return Logic::One;
            }
        }
        acc
    }

    /// Returns a copy resized to `width`, zero-extending or truncating at the MSB.
    pub fn resized(&self, width: u32) -> Self {
        let mut result = Self::new(width);
        for i in 0..width.min(self.width) {
            result.set(i, self.get(i));
        }
        result
    }

    /// Extracts a `width`-bit window starting at bit `lsb`.
    ///
    /// Bits past the end of the vector read as `X`.
    pub fn slice(&self, lsb: u32, width: u32) -> Self {
        let mut result = Self::all_x(width);
        for i in 0..width {
            let src = lsb + i;
            if src < self.width {
                result.set(i, self.get(src));
            }
        }
        result
    }

    /// Overwrites a window starting at bit `lsb` with `value`.
    ///
    /// Bits of `value` past the end of the vector are dropped.
    pub fn splice(&mut self, lsb: u32, value: &Self) {
        for i in 0..value.width() {
            let dst = lsb + i;
            if dst < self.width {
                self.set(dst, value.get(i));
            }
        }
    }

    /// 4-state NAND of two equal-width vectors.
    pub fn nand(&self, rhs: &Self) -> Self {
        !&(self & rhs)
    }

    /// 4-state NOR of two equal-width vectors.
    pub fn nor(&self, rhs: &Self) -> Self {
        !&(self | rhs)
    }

    /// 4-state XNOR of two equal-width vectors.
    pub fn xnor(&self, rhs: &Self) -> Self {
        !&(self ^ rhs)
    }

    /// Unary reduction AND over all bits.
    pub fn reduce_and(&self) -> Logic {
        let mut acc = Logic::One;
        for i in 0..self.width {
            acc = acc & self.get(i);
        }
        acc
    }

    /// Unary reduction OR over all bits.
    pub fn reduce_or(&self) -> Logic {
        self.truth()
    }

    /// Unary reduction XOR over all bits.
    pub fn reduce_xor(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc ^ self.get(i);
        }
        acc
    }

    /// Unary reduction NAND over all bits.
    pub fn reduce_nand(&self) -> Logic {
        !self.reduce_and()
    }

    /// Unary reduction NOR over all bits.
    pub fn reduce_nor(&self) -> Logic {
        !self.reduce_or()
    }

    /// Unary reduction XNOR over all bits.
    pub fn reduce_xnor(&self) -> Logic {
        !self.reduce_xor()
    }

    /// Bit-serial 4-state addition of two equal-width vectors.
    ///
    /// Each bit is computed by a 4-state full adder; an unknown operand bit
    /// produces an X sum and X carry, contaminating the result from that bit
    /// upward. The final carry-out is dropped.
    pub fn add(&self, rhs: &Self) -> Self {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in add");
        add_with_carry(self, rhs, Logic::Zero)
    }

    /// Bit-serial 4-state subtraction (`self - rhs`) of two equal-width vectors.
    ///
    /// Implemented as two's-complement addition: `self + !rhs + 1`. Unknown
    /// operand bits contaminate the carry chain the same way addition does.
    pub fn sub(&self, rhs: &Self) -> Self {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in sub");
        add_with_carry(self, &!rhs, Logic::One)
    }

    /// 4-state multiplication of two equal-width vectors.
    ///
    /// Requires fully-known operands: if either contains X/Z the result is
    /// all-X. The result is truncated to the operand width.
    pub fn mul(&self, rhs: &Self) -> Self {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in mul");
        if self.is_unknown() || rhs.is_unknown() {
            return Self::all_x(self.width);
        }
        // Shift-and-add on known vectors; the adder is 2-state here.
        let mut acc = Self::new(self.width);
        for i in 0..self.width {
            if rhs.get(i) == Logic::One {
                acc = acc.add(&shl_known(self, i));
            }
        }
        acc
    }

    /// 4-state division of two equal-width vectors.
    ///
    /// If either operand contains X/Z the result is `Some(all-X)`. Division
    /// by a known zero returns `None`; the caller treats that as fatal.
    pub fn div(&self, rhs: &Self) -> Option<Self> {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in div");
        if self.is_unknown() || rhs.is_unknown() {
            return Some(Self::all_x(self.width));
        }
        if rhs.is_all_zero() {
            return None;
        }
        Some(divmod_known(self, rhs).0)
    }

    /// 4-state modulo of two equal-width vectors.
    ///
    /// Same unknown-operand and known-zero-divisor rules as [`div`](Self::div).
    pub fn rem(&self, rhs: &Self) -> Option<Self> {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in rem");
        if self.is_unknown() || rhs.is_unknown() {
            return Some(Self::all_x(self.width));
        }
        if rhs.is_all_zero() {
            return None;
        }
        Some(divmod_known(self, rhs).1)
    }

    /// Unsigned relational compare: `self < rhs`, X if either operand is unknown.
    pub fn cmp_lt(&self, rhs: &Self) -> Logic {
        match self.compare_known(rhs) {
            Some(ord) => Logic::from_bool(ord == std::cmp::Ordering::Less),
            None => Logic::X,
        }
    }

    /// Unsigned relational compare: `self > rhs`, X if either operand is unknown.
    pub fn cmp_gt(&self, rhs: &Self) -> Logic {
        match self.compare_known(rhs) {
            Some(ord) => Logic::from_bool(ord == std::cmp::Ordering::Greater),
            None => Logic::X,
        }
    }

    /// Unsigned relational compare: `self <= rhs`, X if either operand is unknown.
    pub fn cmp_le(&self, rhs: &Self) -> Logic {
        !self.cmp_gt(rhs)
    }

    /// Unsigned relational compare: `self >= rhs`, X if either operand is unknown.
    pub fn cmp_ge(&self, rhs: &Self) -> Logic {
        !self.cmp_lt(rhs)
    }

    /// Logical equality (`==`): X if either operand is unknown.
    pub fn cmp_eq(&self, rhs: &Self) -> Logic {
        match self.compare_known(rhs) {
            Some(ord) => Logic::from_bool(ord == std::cmp::Ordering::Equal),
            None => Logic::X,
        }
    }

    /// Logical inequality (`!=`): X if either operand is unknown.
    pub fn cmp_ne(&self, rhs: &Self) -> Logic {
        !self.cmp_eq(rhs)
    }

    /// Case equality (`===`): literal 4-state pattern compare, never X.
    ///
    /// Widths are zero-extended to the wider operand before comparing.
    pub fn case_eq(&self, rhs: &Self) -> Logic {
        let w = self.width.max(rhs.width);
        for i in 0..w {
            if self.bit_extended(i) != rhs.bit_extended(i) {
                return Logic::Zero;
            }
        }
        Logic::One
    }

    /// Case inequality (`!==`): literal 4-state pattern compare, never X.
    pub fn case_ne(&self, rhs: &Self) -> Logic {
        !self.case_eq(rhs)
    }

    /// `casex`-style wildcard equality: X and Z bits in either operand match
    /// anything. Never produces X.
    pub fn case_eq_wild_xz(&self, rhs: &Self) -> Logic {
        let w = self.width.max(rhs.width);
        for i in 0..w {
            let a = self.bit_extended(i);
            let b = rhs.bit_extended(i);
            if a.is_unknown() || b.is_unknown() {
                continue;
            }
            if a != b {
                return Logic::Zero;
            }
        }
        Logic::One
    }

    /// `casez`-style wildcard equality: only Z bits act as wildcards.
    /// Never produces X.
    pub fn case_eq_wild_z(&self, rhs: &Self) -> Logic {
        let w = self.width.max(rhs.width);
        for i in 0..w {
            let a = self.bit_extended(i);
            let b = rhs.bit_extended(i);
            if a == Logic::Z || b == Logic::Z {
                continue;
            }
            if a != b {
                return Logic::Zero;
            }
        }
        Logic::One
    }

    /// Left shift by the amount held in `amount`, zero-filled at the LSB.
    ///
    /// An unknown shift amount yields an all-X result.
    pub fn shl(&self, amount: &Self) -> Self {
        match amount.to_u64() {
            Some(n) if n < u64::from(self.width) => shl_known(self, n as u32),
            Some(_) => Self::new(self.width),
            None => Self::all_x(self.width),
        }
    }

    /// Right shift by the amount held in `amount`, zero-filled at the MSB.
    ///
    /// An unknown shift amount yields an all-X result.
    pub fn shr(&self, amount: &Self) -> Self {
        match amount.to_u64() {
            Some(n) if n < u64::from(self.width) => {
                let n = n as u32;
                let mut result = Self::new(self.width);
                for i in n..self.width {
                    result.set(i - n, self.get(i));
                }
                result
            }
            Some(_) => Self::new(self.width),
            None => Self::all_x(self.width),
        }
    }

    /// Concatenates parts into one vector, with the last part at the LSB.
    pub fn concat(parts: &[Self]) -> Self {
        let total: u32 = parts.iter().map(|p| p.width).sum();
        let mut result = Self::new(total);
        let mut offset = 0;
        for part in parts.iter().rev() {
            for i in 0..part.width {
                result.set(offset + i, part.get(i));
            }
            offset += part.width;
        }
        result
    }

    /// Replicates this vector `count` times (`{count{v}}`).
    ///
    /// The caller must have already resolved the repeat count to a known
    /// constant; an unresolvable count is a fatal elaboration error upstream.
    pub fn replicate(&self, count: u32) -> Self {
        let mut result = Self::new(self.width * count);
        for rep in 0..count {
            for i in 0..self.width {
                result.set(rep * self.width + i, self.get(i));
            }
        }
        result
    }

    /// Reads bit `index`, treating bits beyond the width as zero-extension.
    fn bit_extended(&self, index: u32) -> Logic {
        if index < self.width {
            self.get(index)
        } else {
            Logic::Zero
        }
    }

    /// Compares two fully-known vectors as unsigned integers.
    ///
    /// Returns `None` if either operand contains X/Z.
    fn compare_known(&self, rhs: &Self) -> Option<std::cmp::Ordering> {
        if self.is_unknown() || rhs.is_unknown() {
            return None;
        }
        let w = self.width.max(rhs.width);
        for i in (0..w).rev() {
            let a = self.bit_extended(i);
            let b = rhs.bit_extended(i);
            if a != b {
                return Some(if a == Logic::One {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Less
                });
            }
        }
        Some(std::cmp::Ordering::Equal)
    }
}

/// Bit-serial 4-state ripple adder with an explicit carry-in.
fn add_with_carry(lhs: &LogicVec, rhs: &LogicVec, carry_in: Logic) -> LogicVec {
    let mut result = LogicVec::new(lhs.width());
    let mut carry = carry_in;
    for i in 0..lhs.width() {
        let a = lhs.get(i);
        let b = rhs.get(i);
        result.set(i, a ^ b ^ carry);
        carry = (a & b) | (a & carry) | (b & carry);
    }
    result
}

/// Left shift of a known vector by a constant amount, zero-filled.
fn shl_known(v: &LogicVec, n: u32) -> LogicVec {
    let mut result = LogicVec::new(v.width());
    for i in 0..v.width().saturating_sub(n) {
        result.set(i + n, v.get(i));
    }
    result
}

/// Restoring long division on fully-known, non-zero-divisor operands.
fn divmod_known(dividend: &LogicVec, divisor: &LogicVec) -> (LogicVec, LogicVec) {
    let w = dividend.width();
    let mut quotient = LogicVec::new(w);
    let mut remainder = LogicVec::new(w);
    for i in (0..w).rev() {
        remainder = shl_known(&remainder, 1);
        remainder.set(0, dividend.get(i));
        if remainder.cmp_ge(divisor) == Logic::One {
            remainder = remainder.sub(divisor);
            quotient.set(i, Logic::One);
        }
    }
    (quotient, remainder)
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

impl BitAnd for &LogicVec {
    type Output = LogicVec;

    fn bitand(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in AND");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) & rhs.get(i));
        }
        result
    }
}

impl BitOr for &LogicVec {
    type Output = LogicVec;

    fn bitor(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in OR");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) | rhs.get(i));
        }
        result
    }
}

impl BitXor for &LogicVec {
    type Output = LogicVec;

    fn bitxor(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in XOR");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) ^ rhs.get(i));
        }
        result
    }
}

impl Not for &LogicVec {
    type Output = LogicVec;

    fn not(self) -> LogicVec {
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, !self.get(i));
        }
        result
    }
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(s: &str) -> LogicVec {
        LogicVec::from_binary_str(s).unwrap()
    }

    #[test]
    fn set_get_roundtrip() {
        let mut v = LogicVec::new(4);
        v.set(0, Logic::Zero);
        v.set(1, Logic::One);
        v.set(2, Logic::X);
        v.set(3, Logic::Z);
        assert_eq!(v.get(0), Logic::Zero);
        assert_eq!(v.get(1), Logic::One);
        assert_eq!(v.get(2), Logic::X);
        assert_eq!(v.get(3), Logic::Z);
    }

    #[test]
    fn from_u64_to_u64() {
        let v = LogicVec::from_u64(0b1011, 4);
        assert_eq!(v.to_u64(), Some(0b1011));
        assert_eq!(format!("{v}"), "1011");
    }

    #[test]
    fn to_u64_rejects_unknown() {
        assert_eq!(bv("10X1").to_u64(), None);
        assert_eq!(bv("10Z1").to_u64(), None);
    }

    #[test]
    fn is_unknown_query() {
        assert!(!bv("1010").is_unknown());
        assert!(bv("10X0").is_unknown());
        assert!(bv("Z000").is_unknown());
    }

    #[test]
    fn truth_reduction() {
        assert_eq!(bv("0000").truth(), Logic::Zero);
        assert_eq!(bv("0010").truth(), Logic::One);
        assert_eq!(bv("00X0").truth(), Logic::X);
        // A definite 1 dominates an X elsewhere.
        assert_eq!(bv("1X00").truth(), Logic::One);
    }

    #[test]
    fn bitwise_ops_known() {
        let a = bv("1100");
        let b = bv("1010");
        assert_eq!(format!("{}", &a & &b), "1000");
        assert_eq!(format!("{}", &a | &b), "1110");
        assert_eq!(format!("{}", &a ^ &b), "0110");
        assert_eq!(format!("{}", a.nand(&b)), "0111");
        assert_eq!(format!("{}", a.nor(&b)), "0001");
        assert_eq!(format!("{}", a.xnor(&b)), "1001");
    }

    #[test]
    fn xor_self_known_is_zero() {
        let v = bv("1011");
        assert!((&v ^ &v).is_all_zero());
    }

    #[test]
    fn xor_self_unknown_is_all_x() {
        let v = bv("1X11");
        let r = &v ^ &v;
        // Any unknown bit in v makes every affected bit X; here bit 2.
        assert_eq!(r.get(2), Logic::X);
        assert_eq!(r.get(0), Logic::Zero);
        let u = LogicVec::all_x(4);
        let r = &u ^ &u;
        for i in 0..4 {
            assert_eq!(r.get(i), Logic::X);
        }
    }

    #[test]
    fn reductions() {
        assert_eq!(bv("1111").reduce_and(), Logic::One);
        assert_eq!(bv("1101").reduce_and(), Logic::Zero);
        assert_eq!(bv("0000").reduce_or(), Logic::Zero);
        assert_eq!(bv("0100").reduce_or(), Logic::One);
        assert_eq!(bv("1101").reduce_xor(), Logic::One);
        assert_eq!(bv("1111").reduce_xor(), Logic::Zero);
        assert_eq!(bv("1111").reduce_nand(), Logic::Zero);
        assert_eq!(bv("0000").reduce_nor(), Logic::One);
        assert_eq!(bv("1101").reduce_xnor(), Logic::Zero);
        assert_eq!(bv("11X1").reduce_and(), Logic::X);
        // A 0 dominates AND-reduction even with unknowns present.
        assert_eq!(bv("10X1").reduce_and(), Logic::Zero);
    }

    #[test]
    fn add_matches_two_state() {
        for (a, b) in [(3u64, 5u64), (0, 0), (15, 1), (7, 9)] {
            let r = LogicVec::from_u64(a, 4).add(&LogicVec::from_u64(b, 4));
            assert_eq!(r.to_u64(), Some((a + b) & 0xF), "{a} + {b}");
        }
    }

    #[test]
    fn sub_matches_two_state() {
        for (a, b) in [(5u64, 3u64), (3, 5), (0, 1), (15, 15)] {
            let r = LogicVec::from_u64(a, 4).sub(&LogicVec::from_u64(b, 4));
            assert_eq!(r.to_u64(), Some(a.wrapping_sub(b) & 0xF), "{a} - {b}");
        }
    }

    #[test]
    fn add_unknown_contaminates_upward() {
        let r = bv("0X11").add(&bv("0001"));
        // Bit 0: 1+1 = 0 carry 1. Bit 1: 1+0+1 = 0 carry 1. Bit 2: X sum and
        // X carry (X & carry-1). Bit 3: X via the carry chain.
        assert_eq!(r.get(0), Logic::Zero);
        assert_eq!(r.get(1), Logic::Zero);
        assert_eq!(r.get(2), Logic::X);
        assert_eq!(r.get(3), Logic::X);
    }

    #[test]
    fn add_unknown_with_dominant_zero_partner_stays_bounded() {
        // An X bit adding 0 with no carry-in produces an X sum but a known
        // zero carry, so higher bits stay known.
        let r = bv("0X00").add(&bv("0000"));
        assert_eq!(r.get(2), Logic::X);
        assert_eq!(r.get(3), Logic::Zero);
    }

    #[test]
    fn mul_matches_two_state() {
        for (a, b) in [(3u64, 5u64), (0, 7), (12, 12), (255, 2)] {
            let r = LogicVec::from_u64(a, 8).mul(&LogicVec::from_u64(b, 8));
            assert_eq!(r.to_u64(), Some((a * b) & 0xFF), "{a} * {b}");
        }
    }

    #[test]
    fn mul_unknown_is_all_x() {
        let r = bv("1X10").mul(&bv("0011"));
        for i in 0..4 {
            assert_eq!(r.get(i), Logic::X);
        }
    }

    #[test]
    fn div_rem_match_two_state() {
        for (a, b) in [(17u64, 5u64), (100, 7), (8, 8), (3, 9)] {
            let av = LogicVec::from_u64(a, 8);
            let bvv = LogicVec::from_u64(b, 8);
            assert_eq!(av.div(&bvv).unwrap().to_u64(), Some(a / b), "{a} / {b}");
            assert_eq!(av.rem(&bvv).unwrap().to_u64(), Some(a % b), "{a} % {b}");
        }
    }

    #[test]
    fn div_by_known_zero_is_none() {
        let a = LogicVec::from_u64(9, 4);
        assert!(a.div(&LogicVec::new(4)).is_none());
        assert!(a.rem(&LogicVec::new(4)).is_none());
    }

    #[test]
    fn div_unknown_is_all_x() {
        let r = bv("1X10").div(&bv("0010")).unwrap();
        for i in 0..4 {
            assert_eq!(r.get(i), Logic::X);
        }
        // Unknown divisor, even with a zero pattern elsewhere, is X not fatal.
        let r = bv("1010").rem(&bv("00Z0")).unwrap();
        assert!(r.is_unknown());
    }

    #[test]
    fn relational_known() {
        let a = LogicVec::from_u64(3, 4);
        let b = LogicVec::from_u64(5, 4);
        assert_eq!(a.cmp_lt(&b), Logic::One);
        assert_eq!(a.cmp_gt(&b), Logic::Zero);
        assert_eq!(a.cmp_le(&b), Logic::One);
        assert_eq!(b.cmp_ge(&a), Logic::One);
        assert_eq!(a.cmp_eq(&a), Logic::One);
        assert_eq!(a.cmp_ne(&b), Logic::One);
    }

    #[test]
    fn relational_unknown_is_x() {
        let a = bv("00X1");
        let b = bv("0101");
        assert_eq!(a.cmp_lt(&b), Logic::X);
        assert_eq!(a.cmp_eq(&b), Logic::X);
        assert_eq!(b.cmp_ne(&a), Logic::X);
    }

    #[test]
    fn case_equality_literal() {
        assert_eq!(bv("1X0Z").case_eq(&bv("1X0Z")), Logic::One);
        assert_eq!(bv("1X0Z").case_eq(&bv("1X00")), Logic::Zero);
        assert_eq!(bv("1X0Z").case_ne(&bv("1X00")), Logic::One);
        // Never X, even on fully-unknown operands.
        assert_eq!(bv("XXXX").case_eq(&bv("XXXX")), Logic::One);
    }

    #[test]
    fn casex_wildcards() {
        assert_eq!(bv("1X01").case_eq_wild_xz(&bv("1101")), Logic::One);
        assert_eq!(bv("1Z01").case_eq_wild_xz(&bv("1001")), Logic::One);
        assert_eq!(bv("1X01").case_eq_wild_xz(&bv("1110")), Logic::Zero);
    }

    #[test]
    fn casez_wildcards() {
        assert_eq!(bv("1Z01").case_eq_wild_z(&bv("1101")), Logic::One);
        // X is not a wildcard under casez.
        assert_eq!(bv("1X01").case_eq_wild_z(&bv("1101")), Logic::Zero);
    }

    #[test]
    fn shifts_known() {
        let v = bv("0011");
        assert_eq!(format!("{}", v.shl(&LogicVec::from_u64(1, 2))), "0110");
        assert_eq!(format!("{}", v.shr(&LogicVec::from_u64(1, 2))), "0001");
        // Over-shift clears everything.
        assert!(v.shl(&LogicVec::from_u64(9, 8)).is_all_zero());
    }

    #[test]
    fn shift_by_unknown_is_all_x() {
        let v = bv("0011");
        let amt = bv("0X");
        assert!(v.shl(&amt).is_unknown());
        assert_eq!(v.shr(&amt).get(0), Logic::X);
    }

    #[test]
    fn concat_last_part_at_lsb() {
        let r = LogicVec::concat(&[bv("10"), bv("ZX")]);
        assert_eq!(format!("{r}"), "10ZX");
    }

    #[test]
    fn replicate() {
        let r = bv("1Z").replicate(3);
        assert_eq!(format!("{r}"), "1Z1Z1Z");
    }

    #[test]
    fn slice_window() {
        let v = bv("10XZ1010");
        assert_eq!(format!("{}", v.slice(1, 4)), "Z101");
        // reading past the end pads with X
        assert_eq!(format!("{}", v.slice(6, 4)), "XX10");
    }

    #[test]
    fn splice_window() {
        let mut v = bv("0000");
        v.splice(1, &bv("11"));
        assert_eq!(format!("{v}"), "0110");
        // bits falling off the end are dropped
        v.splice(3, &bv("XX"));
        assert_eq!(format!("{v}"), "X110");
    }

    #[test]
    fn resized_extend_and_truncate() {
        let v = bv("101");
        assert_eq!(format!("{}", v.resized(5)), "00101");
        assert_eq!(format!("{}", v.resized(2)), "01");
    }

    #[test]
    fn large_width_spanning_words() {
        let mut v = LogicVec::new(100);
        v.set(0, Logic::One);
        v.set(50, Logic::X);
        v.set(99, Logic::Z);
        assert_eq!(v.get(0), Logic::One);
        assert_eq!(v.get(50), Logic::X);
        assert_eq!(v.get(99), Logic::Z);
        assert_eq!(v.get(1), Logic::Zero);
    }

    #[test]
    fn serde_roundtrip() {
        let v = bv("10XZ1010");
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
