//! Shared foundational types used across the Covra coverage kernel.
//!
//! This crate provides the 4-state logic scalar and packed vector types used
//! for signal values, per-bit bitmaps for coverage and race tracking,
//! interned identifiers, and common result types.

#![warn(missing_docs)]

pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod mask;
pub mod result;

pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use mask::BitMask;
pub use result::{CovraResult, InternalError};
