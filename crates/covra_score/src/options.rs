//! Kernel configuration.

use crate::race::RaceSeverity;
use serde::{Deserialize, Serialize};

/// Configuration knobs for a scoring run.
///
/// Owned and populated by the embedding application; the kernel only
/// reads it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// How race-validation findings are reported.
    pub race_severity: RaceSeverity,
    /// Force-fire remaining delayed statements once the trace ends.
    pub drain_on_finish: bool,
    /// Per-activation statement step limit guarding zero-delay loops.
    pub max_steps_per_activation: u32,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            race_severity: RaceSeverity::Normal,
            drain_on_finish: true,
            max_steps_per_activation: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ScoreOptions::default();
        assert_eq!(opts.race_severity, RaceSeverity::Normal);
        assert!(opts.drain_on_finish);
        assert_eq!(opts.max_steps_per_activation, 10_000);
    }

    #[test]
    fn serde_roundtrip() {
        let opts = ScoreOptions {
            race_severity: RaceSeverity::Fatal,
            drain_on_finish: false,
            max_steps_per_activation: 64,
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: ScoreOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.race_severity, RaceSeverity::Fatal);
        assert!(!back.drain_on_finish);
        assert_eq!(back.max_steps_per_activation, 64);
    }
}
