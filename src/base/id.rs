use std::sync::Arc;

/// Unique identifier for a diagram element.
///
/// This corresponds to the `id` attribute in BPMN XML. Identifiers are unique
/// within a single [`DiagramGraph`](crate::graph::DiagramGraph).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Arc<str>);

impl ElementId {
    /// Prefix for generated identifiers. XML ids must not start with a digit.
    pub const GENERATED_PREFIX: &'static str = "id_";

    /// Create a new element ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID-based ID.
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::GENERATED_PREFIX, uuid::Uuid::new_v4()).into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_ncnames() {
        let a = ElementId::generate();
        let b = ElementId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("id_"));
        assert!(!a.as_str().contains(':'));
    }

    #[test]
    fn test_borrow_as_str_for_map_lookup() {
        let mut map = indexmap::IndexMap::new();
        map.insert(ElementId::new("Task_1"), 1);
        assert_eq!(map.get("Task_1"), Some(&1));
    }
}
