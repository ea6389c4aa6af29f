use indexmap::IndexMap;
use std::sync::Arc;

/// Keys used to store diagram-interchange layout inside an [`AttributeBag`].
///
/// Layout is presentational, so it is not modeled as typed geometry. Shape
/// and edge data read from `BPMNDiagram` lands under these keys on the
/// referenced element and is written back out on export.
pub mod di {
    /// Prefix shared by every layout key.
    pub const PREFIX: &str = "_di:";
    /// Id of the `BPMNShape` / `BPMNEdge` element.
    pub const ID: &str = "_di:id";
    pub const X: &str = "_di:x";
    pub const Y: &str = "_di:y";
    pub const WIDTH: &str = "_di:width";
    pub const HEIGHT: &str = "_di:height";
    /// Label bounds as `x,y,width,height`.
    pub const LABEL: &str = "_di:label";
    /// Edge waypoints as space separated `x,y` pairs.
    pub const WAYPOINTS: &str = "_di:waypoints";
}

/// Ordered string-keyed attributes attached to an entity.
///
/// Plain keys are XML attributes the model does not promote to typed fields;
/// they are written back verbatim. Keys under [`di::PREFIX`] hold layout and
/// are never written as element attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeBag {
    entries: IndexMap<Arc<str>, Arc<str>>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<Arc<str>>,
        value: impl Into<Arc<str>>,
    ) -> Option<Arc<str>> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a value, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Arc<str>> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every entry, internal keys included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    /// Entries that are written back as XML attributes.
    pub fn plain(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !k.starts_with(di::PREFIX))
    }

    /// Layout entries with the [`di::PREFIX`] stripped.
    pub fn layout(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(k, v)| k.strip_prefix(di::PREFIX).map(|name| (name, v)))
    }

    /// Whether any layout data has been recorded.
    pub fn has_layout(&self) -> bool {
        self.layout().next().is_some()
    }

    /// Whether complete shape bounds are present.
    pub fn has_bounds(&self) -> bool {
        [di::X, di::Y, di::WIDTH, di::HEIGHT]
            .iter()
            .all(|key| self.contains(key))
    }

    /// Store shape bounds.
    pub fn set_bounds(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.insert(di::X, x.to_string());
        self.insert(di::Y, y.to_string());
        self.insert(di::WIDTH, width.to_string());
        self.insert(di::HEIGHT, height.to_string());
    }

    /// Store edge waypoints.
    pub fn set_waypoints(&mut self, points: &[(f64, f64)]) {
        let joined = points
            .iter()
            .map(|(x, y)| format!("{x},{y}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.insert(di::WAYPOINTS, joined);
    }

    /// Stored waypoints as raw `(x, y)` strings.
    pub fn waypoints(&self) -> Vec<(&str, &str)> {
        self.get(di::WAYPOINTS)
            .map(|raw| {
                raw.split_whitespace()
                    .filter_map(|pair| pair.split_once(','))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K: Into<Arc<str>>, V: Into<Arc<str>>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
