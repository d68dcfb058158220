//! Signals: named 4-state vectors with dependent-expression fanout.

use crate::ids::ExprId;
use covra_common::{BitMask, Ident, Logic, LogicVec};
use covra_source::Span;
use serde::{Deserialize, Serialize};

/// Port direction of a signal, as declared in its module header.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum PortDirection {
    /// Not a port; internal net or register.
    #[default]
    Internal,
    /// Input port.
    Input,
    /// Output port.
    Output,
    /// Bidirectional port.
    Inout,
}

impl PortDirection {
    /// Returns `true` for directions driven from outside the module.
    pub fn is_driven_externally(self) -> bool {
        matches!(self, PortDirection::Input | PortDirection::Inout)
    }
}

/// A named design signal owning its current 4-state value.
///
/// The signal is the sole owner of its value storage; expressions that
/// reference it alias into this vector by offset and width. The dependent
/// list holds every expression bound to this signal, in binding order, and
/// drives propagation when the value changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signal {
    /// Local name within the owning module.
    pub name: Ident,
    /// Full hierarchical scope of the owning instance (e.g. `top.u0`).
    pub scope: Ident,
    /// Most significant bit index of the declared packed range.
    pub msb: u32,
    /// Least significant bit index of the declared packed range.
    pub lsb: u32,
    /// Current 4-state value; bit 0 of storage is the declared LSB.
    pub value: LogicVec,
    /// Expressions bound to this signal, in binding order.
    pub dependents: Vec<ExprId>,
    /// Bits assigned by some statement block (race-check bookkeeping).
    pub assigned: BitMask,
    /// Bits observed transitioning 0 to 1.
    pub toggle01: BitMask,
    /// Bits observed transitioning 1 to 0.
    pub toggle10: BitMask,
    /// Declared port direction.
    pub port: PortDirection,
    /// Set once the signal has been through a completed scoring run.
    pub scored: bool,
    /// Declaration site.
    pub span: Span,
}

impl Signal {
    /// Creates a new signal with the given declared range.
    ///
    /// The initial value is all-X, matching an unsampled 4-state net.
    ///
    /// # Panics
    ///
    /// Panics if `msb < lsb`.
    pub fn new(name: Ident, scope: Ident, msb: u32, lsb: u32, span: Span) -> Self {
        assert!(msb >= lsb, "signal range must have msb >= lsb");
        let width = msb - lsb + 1;
        Self {
            name,
            scope,
            msb,
            lsb,
            value: LogicVec::all_x(width),
            dependents: Vec::new(),
            assigned: BitMask::new(width),
            toggle01: BitMask::new(width),
            toggle10: BitMask::new(width),
            port: PortDirection::Internal,
            scored: false,
            span,
        }
    }

    /// Returns the declared bit width.
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }

    /// Writes a new value, recording per-bit toggle coverage.
    ///
    /// Only known transitions count toward toggles: a bit moving from
    /// `Zero` to `One` sets its `toggle01` bit, `One` to `Zero` sets
    /// `toggle10`, and any transition involving `X` or `Z` records nothing.
    /// Returns `true` if any bit changed.
    pub fn write(&mut self, new: &LogicVec) -> bool {
        let width = self.width();
        let new = new.resized(width);
        let mut changed = false;
        for bit in 0..width {
            let old_bit = self.value.get(bit);
            let new_bit = new.get(bit);
            if old_bit == new_bit {
                continue;
            }
            changed = true;
            match (old_bit, new_bit) {
                (Logic::Zero, Logic::One) => self.toggle01.set(bit),
                (Logic::One, Logic::Zero) => self.toggle10.set(bit),
                _ => {}
            }
        }
        if changed {
            self.value = new;
        }
        changed
    }

    /// Returns `true` if every bit toggled in both directions.
    pub fn fully_toggled(&self) -> bool {
        let width = self.width();
        self.toggle01.count_ones() == width && self.toggle10.count_ones() == width
    }
}
