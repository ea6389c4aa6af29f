//! Import and export options

use std::fmt;

use crate::graph::DiagramGraph;

/// Options for reading BPMN XML
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Keep a boundary event whose `attachedToRef` does not resolve, recording
    /// a warning instead of failing
    pub lenient_attachments: bool,
    /// Collect warnings in [`ImportResult::warnings`] (they are always logged)
    pub record_warnings: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            lenient_attachments: false,
            record_warnings: true,
        }
    }
}

/// Options for writing BPMN XML
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write the `BPMNDiagram` section when layout data is present
    pub include_diagram_interchange: bool,
    /// Spaces per indentation level (0 writes a single line)
    pub indent_size: usize,
    /// `targetNamespace` used when the definitions do not carry one
    pub target_namespace: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_diagram_interchange: true,
            indent_size: 2,
            target_namespace: "http://bpmn.io/schema/bpmn".to_string(),
        }
    }
}

/// Something the reader skipped or could not reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    /// Element the warning is about, e.g. `"textAnnotation TextAnnotation_1"`.
    pub element: String,
    pub message: String,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}

/// A freshly imported graph plus the warnings raised while reading it.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub graph: DiagramGraph,
    pub warnings: Vec<ImportWarning>,
}
