//! Error types shared by the model, the graph and the interchange formats.

use std::path::PathBuf;
use thiserror::Error;

use crate::base::ElementId;

/// Result alias used throughout the crate.
pub type Result<T, E = DiagramError> = std::result::Result<T, E>;

/// Errors that can occur while building, editing or converting a diagram.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// An entity with this identifier already exists in the graph.
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(ElementId),

    /// The requested entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: ElementId },

    /// A reference from `element` names an id that does not resolve.
    #[error("Dangling reference to {id} from {element}")]
    DanglingReference { id: String, element: String },

    /// Node type, event trigger or other kind name is not recognized.
    #[error("Unsupported element kind: {0}")]
    UnsupportedElementKind(String),

    /// The XML input is not a well-formed BPMN document.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// A required attribute is absent.
    #[error("Missing required attribute '{attribute}' on {element}")]
    MissingRequiredAttribute { element: String, attribute: &'static str },

    /// CSV syntax or shape error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Writer failure during export.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// IO error, with the path that caused it.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<ElementId>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a dangling reference error.
    pub fn dangling(id: impl Into<String>, element: impl Into<String>) -> Self {
        Self::DanglingReference {
            id: id.into(),
            element: element.into(),
        }
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingRequiredAttribute {
            element: element.into(),
            attribute,
        }
    }

    /// Create a malformed XML error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedXml(message.into())
    }

    /// Create an unsupported kind error.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedElementKind(kind.into())
    }

    /// Create a CSV error.
    pub fn csv(message: impl Into<String>) -> Self {
        Self::Csv(message.into())
    }

    /// Create a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize(message.into())
    }

    /// Wrap an IO error with its path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
