//! Sequence flows and message flows.

use crate::base::{AttributeBag, ElementId};

/// `conditionExpression` of a sequence flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionExpression {
    pub id: Option<ElementId>,
    pub body: String,
    /// Usually carries `xsi:type` and `language`.
    pub attributes: AttributeBag,
}

impl ConditionExpression {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }
}

/// Directed edge between two flow nodes of the same process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFlow {
    id: ElementId,
    pub name: Option<String>,
    source: ElementId,
    target: ElementId,
    pub(crate) process: Option<ElementId>,
    pub(crate) container: Option<ElementId>,
    pub condition: Option<ConditionExpression>,
    /// Unmodeled XML attributes and `_di:` waypoints.
    pub attributes: AttributeBag,
}

impl SequenceFlow {
    pub fn new(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            source: source.into(),
            target: target.into(),
            process: None,
            container: None,
            condition: None,
            attributes: AttributeBag::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Put the flow in an explicit process. When absent, the graph uses the
    /// source node's process.
    pub fn with_process(mut self, process: impl Into<ElementId>) -> Self {
        self.process = Some(process.into());
        self
    }

    pub fn in_container(mut self, container: impl Into<ElementId>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_condition(mut self, condition: ConditionExpression) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn source(&self) -> &ElementId {
        &self.source
    }

    pub fn target(&self) -> &ElementId {
        &self.target
    }

    pub fn process(&self) -> Option<&ElementId> {
        self.process.as_ref()
    }

    pub fn container(&self) -> Option<&ElementId> {
        self.container.as_ref()
    }
}

/// Message exchange between pools; endpoints are flow nodes or participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFlow {
    id: ElementId,
    pub name: Option<String>,
    source: ElementId,
    target: ElementId,
    pub attributes: AttributeBag,
}

impl MessageFlow {
    pub fn new(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            source: source.into(),
            target: target.into(),
            attributes: AttributeBag::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn source(&self) -> &ElementId {
        &self.source
    }

    pub fn target(&self) -> &ElementId {
        &self.target
    }
}
