//! BPMN 2.0 XML format support.
//!
//! ## Document Structure
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" ...>
//!   <bpmn:collaboration id="Collaboration_1">
//!     <bpmn:participant id="Pool_1" processRef="Process_1"/>
//!   </bpmn:collaboration>
//!   <bpmn:process id="Process_1" isExecutable="false">
//!     <bpmn:startEvent id="Start"><bpmn:outgoing>Flow_1</bpmn:outgoing></bpmn:startEvent>
//!     <bpmn:task id="Task"><bpmn:incoming>Flow_1</bpmn:incoming></bpmn:task>
//!     <bpmn:sequenceFlow id="Flow_1" sourceRef="Start" targetRef="Task"/>
//!   </bpmn:process>
//!   <bpmndi:BPMNDiagram id="Diagram_1">
//!     <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Collaboration_1">
//!       <bpmndi:BPMNShape id="Task_di" bpmnElement="Task">
//!         <dc:Bounds x="100" y="80" width="100" height="80"/>
//!       </bpmndi:BPMNShape>
//!     </bpmndi:BPMNPlane>
//!   </bpmndi:BPMNDiagram>
//! </bpmn:definitions>
//! ```
//!
//! Import matches local names, so any prefix (or a default namespace) is
//! accepted. Export always uses `bpmn:`, `bpmndi:`, `dc:` and `di:`.

mod reader;
mod tree;
mod writer;

use super::{DiagramFormat, ExportOptions, FormatCapability, ImportOptions, ImportResult};
use crate::error::{DiagramError, Result};
use crate::graph::DiagramGraph;

/// Namespace URIs of BPMN 2.0 documents.
pub mod namespace {
    /// Process model elements.
    pub const MODEL: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
    /// BPMN diagram interchange (shapes, edges).
    pub const BPMNDI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
    /// Diagram commons (bounds, points).
    pub const DC: &str = "http://www.omg.org/spec/DD/20100524/DC";
    /// Diagram interchange base (waypoints).
    pub const DI: &str = "http://www.omg.org/spec/DD/20100524/DI";
    /// XSI namespace for xsi:type.
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

    /// Whether the writer declares this namespace itself.
    pub fn is_standard(uri: &str) -> bool {
        [MODEL, BPMNDI, DC, DI, XSI].contains(&uri)
    }
}

/// BPMN XML format handler.
#[derive(Debug, Clone, Default)]
pub struct BpmnXml {
    pub import: ImportOptions,
    pub export: ExportOptions,
}

impl BpmnXml {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_import_options(mut self, options: ImportOptions) -> Self {
        self.import = options;
        self
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export = options;
        self
    }

    /// Read a document, returning the graph together with import warnings.
    pub fn import(&self, input: &[u8]) -> Result<ImportResult> {
        reader::BpmnReader::new(&self.import).read(input)
    }

    /// Write a document.
    pub fn export(&self, graph: &DiagramGraph) -> Result<Vec<u8>> {
        writer::BpmnWriter::new(&self.export).write(graph)
    }

    /// Write a document as a string.
    pub fn export_string(&self, graph: &DiagramGraph) -> Result<String> {
        let bytes = self.export(graph)?;
        String::from_utf8(bytes).map_err(|e| DiagramError::serialize(format!("Invalid UTF-8: {e}")))
    }
}

impl DiagramFormat for BpmnXml {
    fn name(&self) -> &'static str {
        "BPMN XML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["bpmn", "xml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/bpmn+xml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> Result<DiagramGraph> {
        self.import(input).map(|result| result.graph)
    }

    fn write(&self, graph: &DiagramGraph) -> Result<Vec<u8>> {
        self.export(graph)
    }

    fn validate(&self, input: &[u8]) -> Result<()> {
        let content = std::str::from_utf8(input)
            .map_err(|e| DiagramError::malformed(format!("Invalid UTF-8: {e}")))?;
        if !content.contains("definitions") || !content.contains(namespace::MODEL) {
            return Err(DiagramError::malformed("Missing BPMN definitions root"));
        }
        Ok(())
    }
}
