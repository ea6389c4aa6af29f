//! Common trait for diagram interchange formats.

use crate::error::Result;
use crate::graph::DiagramGraph;

/// Capabilities supported by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapability {
    /// Can read/import diagrams.
    pub read: bool,
    /// Can write/export diagrams.
    pub write: bool,
    /// Preserves everything the model captures, layout included.
    pub lossless: bool,
}

impl FormatCapability {
    /// Full capability (read, write, lossless).
    pub const FULL: Self = Self {
        read: true,
        write: true,
        lossless: true,
    };

    /// Reads and writes a reduced subset of the model.
    pub const LOSSY: Self = Self {
        read: true,
        write: true,
        lossless: false,
    };
}

/// Trait for diagram interchange formats.
///
/// Implementations convert between a [`DiagramGraph`] and the bytes of an
/// external file format. Reading always builds the graph through its public
/// operations, so every format gets the same invariant checks.
pub trait DiagramFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    /// MIME type for this format.
    fn mime_type(&self) -> &'static str;

    /// Capabilities of this format implementation.
    fn capabilities(&self) -> FormatCapability;

    /// Read a diagram from bytes.
    fn read(&self, input: &[u8]) -> Result<DiagramGraph>;

    /// Write a diagram to bytes.
    fn write(&self, graph: &DiagramGraph) -> Result<Vec<u8>>;

    /// Quick well-formedness check that doesn't build a graph.
    fn validate(&self, input: &[u8]) -> Result<()> {
        let _ = input;
        Ok(())
    }
}
