//! Structured diagnostics for the Covra coverage kernel.
//!
//! Binder warnings, race-validator findings, and simulation diagnostics are
//! reported as structured [`Diagnostic`] values collected in a
//! [`DiagnosticSink`], never printed or exited from library code.
//!
//! # Code categories
//!
//! - **B-series (bind):** name-resolution warnings such as implicit signal creation
//! - **R-series (race):** race-validator reason codes R101-R106
//! - **S-series (sim):** simulation-time conditions

#![warn(missing_docs)]

mod code;
mod diagnostic;
mod severity;
mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
