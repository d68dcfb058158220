//! Externally-sourced value-change events.

use crate::time::SimTime;
use covra_common::LogicVec;
use covra_model::SignalId;
use serde::{Deserialize, Serialize};

/// A single value change from the external waveform reader.
///
/// Events are transient: the kernel consumes any
/// `IntoIterator<Item = TraceEvent>` once, in arrival order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceEvent {
    /// The signal that changed.
    pub signal: SignalId,
    /// The new 4-state value.
    pub value: LogicVec,
    /// When the change happened.
    pub time: SimTime,
}

impl TraceEvent {
    /// Creates a new event.
    pub fn new(signal: SignalId, value: LogicVec, time: SimTime) -> Self {
        Self {
            signal,
            value,
            time,
        }
    }
}
