//! Processes, lanes and collaboration participants.

use indexmap::IndexSet;

use crate::base::{AttributeBag, ElementId};

use super::kind::ProcessType;

/// A named collection of flow nodes and sequence flows.
///
/// Membership sets are maintained by the graph and compare order-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: ElementId,
    pub name: Option<String>,
    pub is_executable: bool,
    pub is_closed: bool,
    pub process_type: ProcessType,
    pub(crate) node_ids: IndexSet<ElementId>,
    pub(crate) flow_ids: IndexSet<ElementId>,
    pub(crate) lane_set: Option<LaneSet>,
    pub attributes: AttributeBag,
}

impl Process {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_executable: false,
            is_closed: false,
            process_type: ProcessType::None,
            node_ids: IndexSet::new(),
            flow_ids: IndexSet::new(),
            lane_set: None,
            attributes: AttributeBag::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn executable(mut self, is_executable: bool) -> Self {
        self.is_executable = is_executable;
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Member node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.node_ids.iter()
    }

    /// Member sequence flow ids in insertion order.
    pub fn flow_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.flow_ids.iter()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn lane_set(&self) -> Option<&LaneSet> {
        self.lane_set.as_ref()
    }
}

/// A `laneSet`; partitions a process (or a parent lane) into lanes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneSet {
    pub id: Option<ElementId>,
    pub name: Option<String>,
    pub lanes: Vec<Lane>,
}

impl LaneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lanes.push(lane);
        self
    }

    /// All lanes, depth first, child lanes included.
    pub fn all_lanes(&self) -> Vec<&Lane> {
        let mut out = Vec::new();
        for lane in &self.lanes {
            out.push(lane);
            if let Some(child) = &lane.child_lane_set {
                out.extend(child.all_lanes());
            }
        }
        out
    }

    /// Find a lane by id, searching child lane sets.
    pub(crate) fn lane_mut(&mut self, id: &str) -> Option<&mut Lane> {
        for lane in &mut self.lanes {
            if lane.id.as_str() == id {
                return Some(lane);
            }
            if let Some(child) = &mut lane.child_lane_set {
                if let Some(found) = child.lane_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Visit every lane, child lanes included.
    pub(crate) fn for_each_lane_mut(&mut self, f: &mut impl FnMut(&mut Lane)) {
        for lane in &mut self.lanes {
            f(lane);
            if let Some(child) = &mut lane.child_lane_set {
                child.for_each_lane_mut(f);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub id: ElementId,
    pub name: Option<String>,
    /// Nodes assigned to this lane, in document order.
    pub flow_node_refs: Vec<ElementId>,
    pub child_lane_set: Option<LaneSet>,
    /// Unmodeled attributes and `_di:` layout.
    pub attributes: AttributeBag,
}

impl Lane {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            flow_node_refs: Vec::new(),
            child_lane_set: None,
            attributes: AttributeBag::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_node(mut self, node: impl Into<ElementId>) -> Self {
        self.flow_node_refs.push(node.into());
        self
    }
}

/// A pool in a collaboration. Without a process it is a black box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ElementId,
    pub name: Option<String>,
    pub(crate) process_ref: Option<ElementId>,
    pub attributes: AttributeBag,
}

impl Participant {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            process_ref: None,
            attributes: AttributeBag::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_process(mut self, process: impl Into<ElementId>) -> Self {
        self.process_ref = Some(process.into());
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn process_ref(&self) -> Option<&ElementId> {
        self.process_ref.as_ref()
    }
}
