//! Foundation types for the BPMN diagram model.
//!
//! This module provides the primitives shared by every entity:
//! - [`ElementId`] - Opaque, cheaply clonable element identifiers
//! - [`AttributeBag`] - Ordered string attributes kept for round-trip fidelity
//! - [`di`] - Keys under which diagram-interchange layout is stored
//!
//! This module has NO dependencies on other crate modules.

mod attributes;
mod id;

pub use attributes::{AttributeBag, di};
pub use id::ElementId;
