//! Flow nodes and their kind-specific details.

use crate::base::{AttributeBag, ElementId};
use crate::error::{DiagramError, Result};

use super::kind::{EventDefinitionType, EventGatewayType, EventTrigger, GatewayDirection, NodeKind};

// ============================================================================
// DETAILS
// ============================================================================

/// A concrete `*EventDefinition` child of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDefinition {
    pub id: Option<ElementId>,
    pub kind: EventDefinitionType,
    /// Attributes such as `messageRef` or `errorRef`.
    pub attributes: AttributeBag,
    /// Nested elements such as `timeDuration` or `condition`.
    pub children: Vec<DefinitionChild>,
}

impl EventDefinition {
    pub fn new(kind: EventDefinitionType) -> Self {
        Self {
            id: None,
            kind,
            attributes: AttributeBag::new(),
            children: Vec::new(),
        }
    }
}

/// An element nested inside an event definition, e.g.
/// `<timeDuration xsi:type="tFormalExpression">PT5M</timeDuration>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionChild {
    /// Local name without prefix.
    pub name: String,
    pub attributes: AttributeBag,
    pub text: String,
    pub children: Vec<DefinitionChild>,
}

impl DefinitionChild {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeBag::new(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key, value);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityDetails {
    pub(crate) default_flow: Option<ElementId>,
    /// Event sub-process flag; only meaningful for sub-process kinds.
    pub triggered_by_event: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayDetails {
    pub direction: GatewayDirection,
    pub(crate) default_flow: Option<ElementId>,
    /// Event-based gateways only.
    pub instantiate: bool,
    /// Event-based gateways only.
    pub event_gateway_type: EventGatewayType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub trigger: EventTrigger,
    pub definitions: Vec<EventDefinition>,
    pub parallel_multiple: bool,
    /// Start events only.
    pub is_interrupting: bool,
    /// Boundary events only.
    pub cancel_activity: bool,
    pub(crate) attached_to: Option<ElementId>,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            trigger: EventTrigger::None,
            definitions: Vec::new(),
            parallel_multiple: false,
            is_interrupting: true,
            cancel_activity: true,
            attached_to: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataDetails {
    pub is_collection: bool,
}

/// Kind-specific fields of a [`FlowNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDetails {
    Activity(ActivityDetails),
    Gateway(GatewayDetails),
    Event(EventDetails),
    Data(DataDetails),
}

impl NodeDetails {
    /// Default details for a node kind.
    pub fn for_kind(kind: NodeKind) -> Self {
        if kind.is_gateway() {
            Self::Gateway(GatewayDetails::default())
        } else if kind.is_event() {
            Self::Event(EventDetails::default())
        } else if kind.is_data() {
            Self::Data(DataDetails::default())
        } else {
            Self::Activity(ActivityDetails::default())
        }
    }
}

// ============================================================================
// FLOW NODE
// ============================================================================

/// A BPMN element that participates in sequence flow.
///
/// Identity, kind, ownership and adjacency are fixed once the node is in a
/// [`DiagramGraph`](crate::graph::DiagramGraph); the graph is the only thing
/// that changes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    id: ElementId,
    kind: NodeKind,
    pub name: Option<String>,
    pub(crate) process: Option<ElementId>,
    pub(crate) container: Option<ElementId>,
    pub(crate) incoming: Vec<ElementId>,
    pub(crate) outgoing: Vec<ElementId>,
    pub(crate) details: NodeDetails,
    /// Unmodeled XML attributes and `_di:` layout.
    pub attributes: AttributeBag,
}

impl FlowNode {
    /// Create a node with default details for its kind.
    pub fn new(id: impl Into<ElementId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            process: None,
            container: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            details: NodeDetails::for_kind(kind),
            attributes: AttributeBag::new(),
        }
    }

    /// Create a node from a type name such as `"userTask"`.
    pub fn from_type_name(id: impl Into<ElementId>, type_name: &str) -> Result<Self> {
        let kind = type_name.parse::<NodeKind>()?;
        Ok(Self::new(id, kind))
    }

    pub fn task(id: impl Into<ElementId>) -> Self {
        Self::new(id, NodeKind::Task)
    }

    /// Create a gateway. Fails if `kind` is not a gateway kind.
    pub fn gateway(id: impl Into<ElementId>, kind: NodeKind) -> Result<Self> {
        if !kind.is_gateway() {
            return Err(DiagramError::unsupported(format!("{kind} is not a gateway")));
        }
        Ok(Self::new(id, kind))
    }

    /// Create an event with the given trigger name (`"timer"`, `"none"`, ...).
    pub fn event(id: impl Into<ElementId>, kind: NodeKind, trigger: &str) -> Result<Self> {
        if !kind.is_event() {
            return Err(DiagramError::unsupported(format!("{kind} is not an event")));
        }
        let trigger = trigger.parse::<EventTrigger>()?;
        let mut node = Self::new(id, kind);
        if let NodeDetails::Event(event) = &mut node.details {
            event.trigger = trigger;
            event.parallel_multiple = trigger == EventTrigger::ParallelMultiple;
        }
        Ok(node)
    }

    /// Create a boundary event attached to `attached_to`.
    pub fn boundary_event(
        id: impl Into<ElementId>,
        attached_to: impl Into<ElementId>,
        trigger: &str,
    ) -> Result<Self> {
        let mut node = Self::event(id, NodeKind::BoundaryEvent, trigger)?;
        if let NodeDetails::Event(event) = &mut node.details {
            event.attached_to = Some(attached_to.into());
        }
        Ok(node)
    }

    /// Give an event explicit definitions; the trigger follows from them.
    /// This is how `multiple` and `parallelMultiple` events say what they
    /// wait for.
    pub fn with_definitions(mut self, definitions: Vec<EventDefinition>) -> Result<Self> {
        let NodeDetails::Event(event) = &mut self.details else {
            return Err(DiagramError::unsupported(format!(
                "event definitions on {}",
                self.kind
            )));
        };
        if definitions.is_empty() {
            return Err(DiagramError::unsupported(format!(
                "empty event definition list on {}",
                self.id
            )));
        }
        let types: Vec<_> = definitions.iter().map(|def| def.kind).collect();
        event.trigger = EventTrigger::from_definitions(&types, event.parallel_multiple);
        event.definitions = definitions;
        Ok(self)
    }

    // ---- builders -------------------------------------------------------

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_process(mut self, process: impl Into<ElementId>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Place the node inside a sub-process.
    pub fn in_container(mut self, container: impl Into<ElementId>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Set the gateway direction. No effect on non-gateways.
    pub fn with_direction(mut self, direction: GatewayDirection) -> Self {
        if let NodeDetails::Gateway(gateway) = &mut self.details {
            gateway.direction = direction;
        }
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key, value);
        self
    }

    // ---- accessors ------------------------------------------------------

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Name, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn process(&self) -> Option<&ElementId> {
        self.process.as_ref()
    }

    pub fn container(&self) -> Option<&ElementId> {
        self.container.as_ref()
    }

    /// Ids of sequence flows targeting this node, in insertion order.
    pub fn incoming(&self) -> &[ElementId] {
        &self.incoming
    }

    /// Ids of sequence flows leaving this node, in insertion order.
    pub fn outgoing(&self) -> &[ElementId] {
        &self.outgoing
    }

    pub fn details(&self) -> &NodeDetails {
        &self.details
    }

    /// Mutable access to the kind-specific flags. Cross-references stay
    /// read-only.
    pub fn details_mut(&mut self) -> &mut NodeDetails {
        &mut self.details
    }

    pub fn event_details(&self) -> Option<&EventDetails> {
        match &self.details {
            NodeDetails::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn gateway_details(&self) -> Option<&GatewayDetails> {
        match &self.details {
            NodeDetails::Gateway(gateway) => Some(gateway),
            _ => None,
        }
    }

    pub fn trigger(&self) -> Option<EventTrigger> {
        self.event_details().map(|event| event.trigger)
    }

    pub fn default_flow(&self) -> Option<&ElementId> {
        match &self.details {
            NodeDetails::Activity(activity) => activity.default_flow.as_ref(),
            NodeDetails::Gateway(gateway) => gateway.default_flow.as_ref(),
            _ => None,
        }
    }

    /// Activity a boundary event is attached to.
    pub fn attached_to(&self) -> Option<&ElementId> {
        self.event_details().and_then(|event| event.attached_to.as_ref())
    }

    /// Whether the details variant is the one [`NodeDetails::for_kind`] gives.
    pub(crate) fn details_match_kind(&self) -> bool {
        std::mem::discriminant(&self.details)
            == std::mem::discriminant(&NodeDetails::for_kind(self.kind))
    }

    pub(crate) fn set_default_flow_ref(&mut self, flow: Option<ElementId>) {
        match &mut self.details {
            NodeDetails::Activity(activity) => activity.default_flow = flow,
            NodeDetails::Gateway(gateway) => gateway.default_flow = flow,
            _ => {}
        }
    }

    pub(crate) fn clear_attachment(&mut self) {
        if let NodeDetails::Event(event) = &mut self.details {
            event.attached_to = None;
        }
    }
}

impl ActivityDetails {
    pub fn default_flow(&self) -> Option<&ElementId> {
        self.default_flow.as_ref()
    }
}

impl GatewayDetails {
    pub fn default_flow(&self) -> Option<&ElementId> {
        self.default_flow.as_ref()
    }
}

impl EventDetails {
    pub fn attached_to(&self) -> Option<&ElementId> {
        self.attached_to.as_ref()
    }

    /// Definition types, falling back to the trigger's single definition.
    pub fn definition_types(&self) -> Vec<EventDefinitionType> {
        if self.definitions.is_empty() {
            self.trigger.definition_type().into_iter().collect()
        } else {
            self.definitions.iter().map(|def| def.kind).collect()
        }
    }
}
