//! Simulation timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A simulation timestamp, in waveform ticks.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero.
    pub const ZERO: SimTime = SimTime(0);

    /// Creates a timestamp from a raw tick count.
    pub fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Returns this timestamp advanced by `ticks`.
    pub fn offset(self, ticks: u64) -> Self {
        Self(self.0 + ticks)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(SimTime::new(3) < SimTime::new(5));
        assert_eq!(SimTime::ZERO, SimTime::new(0));
    }

    #[test]
    fn offset_adds() {
        assert_eq!(SimTime::new(2).offset(5), SimTime::new(7));
    }

    #[test]
    fn display() {
        assert_eq!(SimTime::new(42).to_string(), "t42");
    }
}
