//! Event-driven scoring kernel.
//!
//! Replays an externally-produced value-change stream through an
//! elaborated [`Design`](covra_model::Design), executing its statement
//! blocks and accumulating line, toggle, and expression-combination
//! coverage as it goes. The pipeline is: bind (in `covra_model`), then
//! [`race::validate`], then [`score`] over the event stream.

#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod event;
pub mod kernel;
pub mod options;
pub mod race;
pub mod time;

pub use error::ScoreError;
pub use eval::{evaluate, EvalCx, EvalOutcome};
pub use event::TraceEvent;
pub use kernel::{score, ScoreSummary};
pub use options::ScoreOptions;
pub use race::{DisabledBlock, RaceReason, RaceSeverity};
pub use time::SimTime;
