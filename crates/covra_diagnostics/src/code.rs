//! Diagnostic codes combining a category letter with a rule number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Name binding and resolution (B-series).
    Bind,
    /// Race-condition validation (R-series).
    Race,
    /// Simulation-time conditions (S-series).
    Sim,
}

impl Category {
    /// Returns the single-letter prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Bind => 'B',
            Category::Race => 'R',
            Category::Sim => 'S',
        }
    }
}

/// A unique diagnostic code like `R105` or `B101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The code category.
    pub category: Category,
    /// The rule number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category.prefix(), self.number)
    }
}
