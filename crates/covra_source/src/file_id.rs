//! Opaque IDs for source files registered by the external parser.

use serde::{Deserialize, Serialize};

/// An opaque ID identifying a source file.
///
/// File paths themselves live with the external parser; the kernel only
/// needs a stable handle for grouping line ranges and diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A dummy file ID used when no source attribution is available.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
