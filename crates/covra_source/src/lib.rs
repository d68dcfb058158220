//! Source file and line-range tracking for model nodes and diagnostics.
//!
//! The external parser attributes every signal, expression, and statement to
//! a source file and line range. The kernel carries those attributions
//! through so disabled-block reports and fatal diagnostics can point back at
//! the HDL source.

#![warn(missing_docs)]

pub mod file_id;
pub mod span;

pub use file_id::FileId;
pub use span::Span;
