//! Diagram interchange formats.
//!
//! - **BPMN XML** - BPMN 2.0 documents, lossless including diagram layout
//! - **CSV** - flat node/flow tables (behind the `csv` feature)
//!
//! ## Architecture
//!
//! Every format converts between bytes and a [`DiagramGraph`], building the
//! graph only through its public operations.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │  .bpmn/.xml  │     │     .csv     │
//! └──────┬───────┘     └──────┬───────┘
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                  DiagramFormat trait                      │
//! │  - read(&[u8]) -> Result<DiagramGraph>                   │
//! │  - write(&DiagramGraph) -> Result<Vec<u8>>               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use bpmn::interchange::{self, BpmnXml, DiagramFormat};
//!
//! let graph = interchange::read_file("order.bpmn".as_ref())?;
//! let bytes = BpmnXml::new().write(&graph)?;
//! # Ok::<(), bpmn::DiagramError>(())
//! ```

mod format;
mod options;
#[cfg(feature = "csv")]
mod tabular;
mod xml;

use std::path::Path;

use tracing::debug;

use crate::error::{DiagramError, Result};
use crate::graph::DiagramGraph;

pub use format::{DiagramFormat, FormatCapability};
pub use options::{ExportOptions, ImportOptions, ImportResult, ImportWarning};
#[cfg(feature = "csv")]
pub use tabular::Csv;
pub use xml::{BpmnXml, namespace};

/// Supported file extensions for interchange formats.
pub fn supported_extensions() -> &'static [&'static str] {
    if cfg!(feature = "csv") {
        &["bpmn", "xml", "csv"]
    } else {
        &["bpmn", "xml"]
    }
}

/// Detect format from file extension.
pub fn detect_format(path: &Path) -> Option<Box<dyn DiagramFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "bpmn" | "xml" => Some(Box::new(BpmnXml::new())),
        #[cfg(feature = "csv")]
        "csv" => Some(Box::new(Csv::new())),
        _ => None,
    }
}

/// Detect format from MIME type.
pub fn detect_format_from_mime(mime: &str) -> Option<Box<dyn DiagramFormat>> {
    match mime {
        "application/bpmn+xml" | "application/xml" | "text/xml" => Some(Box::new(BpmnXml::new())),
        #[cfg(feature = "csv")]
        "text/csv" => Some(Box::new(Csv::new())),
        _ => None,
    }
}

/// Read a diagram file, picking the format from its extension.
pub fn read_file(path: &Path) -> Result<DiagramGraph> {
    let format = format_for(path)?;
    let bytes = std::fs::read(path).map_err(|e| DiagramError::io(path, e))?;
    debug!(path = %path.display(), format = format.name(), "reading diagram");
    format.read(&bytes)
}

/// Write a diagram file, picking the format from its extension.
pub fn write_file(path: &Path, graph: &DiagramGraph) -> Result<()> {
    let format = format_for(path)?;
    let bytes = format.write(graph)?;
    debug!(path = %path.display(), format = format.name(), "writing diagram");
    std::fs::write(path, bytes).map_err(|e| DiagramError::io(path, e))
}

fn format_for(path: &Path) -> Result<Box<dyn DiagramFormat>> {
    detect_format(path).ok_or_else(|| {
        DiagramError::unsupported(format!("file format of {}", path.display()))
    })
}
