//! Closed vocabularies: node kinds, event triggers and enumerated attributes.

use std::fmt;
use std::str::FromStr;

use crate::error::DiagramError;

/// Kind of a [`FlowNode`](super::FlowNode).
///
/// The mapping to XML tag names is total; [`NodeKind::from_tag`] is its
/// partial inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Task,
    UserTask,
    ServiceTask,
    ManualTask,
    ScriptTask,
    SendTask,
    ReceiveTask,
    BusinessRuleTask,
    SubProcess,
    Transaction,
    AdHocSubProcess,
    CallActivity,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    ComplexGateway,
    EventBasedGateway,
    StartEvent,
    EndEvent,
    IntermediateCatchEvent,
    IntermediateThrowEvent,
    BoundaryEvent,
    DataObject,
}

impl NodeKind {
    pub const ALL: [NodeKind; 23] = [
        Self::Task,
        Self::UserTask,
        Self::ServiceTask,
        Self::ManualTask,
        Self::ScriptTask,
        Self::SendTask,
        Self::ReceiveTask,
        Self::BusinessRuleTask,
        Self::SubProcess,
        Self::Transaction,
        Self::AdHocSubProcess,
        Self::CallActivity,
        Self::ExclusiveGateway,
        Self::ParallelGateway,
        Self::InclusiveGateway,
        Self::ComplexGateway,
        Self::EventBasedGateway,
        Self::StartEvent,
        Self::EndEvent,
        Self::IntermediateCatchEvent,
        Self::IntermediateThrowEvent,
        Self::BoundaryEvent,
        Self::DataObject,
    ];

    /// Local XML tag name for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::UserTask => "userTask",
            Self::ServiceTask => "serviceTask",
            Self::ManualTask => "manualTask",
            Self::ScriptTask => "scriptTask",
            Self::SendTask => "sendTask",
            Self::ReceiveTask => "receiveTask",
            Self::BusinessRuleTask => "businessRuleTask",
            Self::SubProcess => "subProcess",
            Self::Transaction => "transaction",
            Self::AdHocSubProcess => "adHocSubProcess",
            Self::CallActivity => "callActivity",
            Self::ExclusiveGateway => "exclusiveGateway",
            Self::ParallelGateway => "parallelGateway",
            Self::InclusiveGateway => "inclusiveGateway",
            Self::ComplexGateway => "complexGateway",
            Self::EventBasedGateway => "eventBasedGateway",
            Self::StartEvent => "startEvent",
            Self::EndEvent => "endEvent",
            Self::IntermediateCatchEvent => "intermediateCatchEvent",
            Self::IntermediateThrowEvent => "intermediateThrowEvent",
            Self::BoundaryEvent => "boundaryEvent",
            Self::DataObject => "dataObject",
        }
    }

    /// Look up a kind by its exact local tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const fn is_task(self) -> bool {
        matches!(
            self,
            Self::Task
                | Self::UserTask
                | Self::ServiceTask
                | Self::ManualTask
                | Self::ScriptTask
                | Self::SendTask
                | Self::ReceiveTask
                | Self::BusinessRuleTask
        )
    }

    /// Kinds that may contain other flow elements.
    pub const fn is_sub_process(self) -> bool {
        matches!(
            self,
            Self::SubProcess | Self::Transaction | Self::AdHocSubProcess
        )
    }

    pub const fn is_activity(self) -> bool {
        self.is_task() || self.is_sub_process() || matches!(self, Self::CallActivity)
    }

    pub const fn is_gateway(self) -> bool {
        matches!(
            self,
            Self::ExclusiveGateway
                | Self::ParallelGateway
                | Self::InclusiveGateway
                | Self::ComplexGateway
                | Self::EventBasedGateway
        )
    }

    /// Gateways that may carry a `default` sequence flow.
    pub const fn supports_default_flow(self) -> bool {
        self.is_activity()
            || matches!(
                self,
                Self::ExclusiveGateway | Self::InclusiveGateway | Self::ComplexGateway
            )
    }

    pub const fn is_event(self) -> bool {
        matches!(
            self,
            Self::StartEvent
                | Self::EndEvent
                | Self::IntermediateCatchEvent
                | Self::IntermediateThrowEvent
                | Self::BoundaryEvent
        )
    }

    pub const fn is_data(self) -> bool {
        matches!(self, Self::DataObject)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NodeKind {
    type Err = DiagramError;

    /// Accepts the tag name, ignoring ASCII case (`userTask`, `UserTask`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_tag(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|kind| kind.tag().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| DiagramError::unsupported(s))
    }
}

/// What triggers (or is produced by) an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventTrigger {
    #[default]
    None,
    Message,
    Timer,
    Conditional,
    Signal,
    Error,
    Escalation,
    Cancel,
    Compensation,
    Link,
    Terminate,
    Multiple,
    ParallelMultiple,
}

impl EventTrigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Message => "message",
            Self::Timer => "timer",
            Self::Conditional => "conditional",
            Self::Signal => "signal",
            Self::Error => "error",
            Self::Escalation => "escalation",
            Self::Cancel => "cancel",
            Self::Compensation => "compensation",
            Self::Link => "link",
            Self::Terminate => "terminate",
            Self::Multiple => "multiple",
            Self::ParallelMultiple => "parallelMultiple",
        }
    }

    /// The single event definition this trigger corresponds to, if any.
    pub const fn definition_type(self) -> Option<EventDefinitionType> {
        match self {
            Self::Message => Some(EventDefinitionType::Message),
            Self::Timer => Some(EventDefinitionType::Timer),
            Self::Conditional => Some(EventDefinitionType::Conditional),
            Self::Signal => Some(EventDefinitionType::Signal),
            Self::Error => Some(EventDefinitionType::Error),
            Self::Escalation => Some(EventDefinitionType::Escalation),
            Self::Cancel => Some(EventDefinitionType::Cancel),
            Self::Compensation => Some(EventDefinitionType::Compensate),
            Self::Link => Some(EventDefinitionType::Link),
            Self::Terminate => Some(EventDefinitionType::Terminate),
            Self::None | Self::Multiple | Self::ParallelMultiple => None,
        }
    }

    /// Derive the trigger from the definitions an event declares.
    pub fn from_definitions(types: &[EventDefinitionType], parallel_multiple: bool) -> Self {
        match types {
            [] => Self::None,
            [single] => single.trigger(),
            _ if parallel_multiple => Self::ParallelMultiple,
            _ => Self::Multiple,
        }
    }
}

impl fmt::Display for EventTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTrigger {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trigger = match s.trim() {
            "" | "none" => Self::None,
            "message" => Self::Message,
            "timer" => Self::Timer,
            "conditional" => Self::Conditional,
            "signal" => Self::Signal,
            "error" => Self::Error,
            "escalation" => Self::Escalation,
            "cancel" => Self::Cancel,
            "compensation" => Self::Compensation,
            "link" => Self::Link,
            "terminate" => Self::Terminate,
            "multiple" => Self::Multiple,
            "parallelMultiple" | "parallel-multiple" => Self::ParallelMultiple,
            other => return Err(DiagramError::unsupported(format!("event trigger '{other}'"))),
        };
        Ok(trigger)
    }
}

/// Concrete `*EventDefinition` child element of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventDefinitionType {
    Message,
    Timer,
    Conditional,
    Signal,
    Error,
    Escalation,
    Cancel,
    Compensate,
    Link,
    Terminate,
}

impl EventDefinitionType {
    pub const ALL: [EventDefinitionType; 10] = [
        Self::Message,
        Self::Timer,
        Self::Conditional,
        Self::Signal,
        Self::Error,
        Self::Escalation,
        Self::Cancel,
        Self::Compensate,
        Self::Link,
        Self::Terminate,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Message => "messageEventDefinition",
            Self::Timer => "timerEventDefinition",
            Self::Conditional => "conditionalEventDefinition",
            Self::Signal => "signalEventDefinition",
            Self::Error => "errorEventDefinition",
            Self::Escalation => "escalationEventDefinition",
            Self::Cancel => "cancelEventDefinition",
            Self::Compensate => "compensateEventDefinition",
            Self::Link => "linkEventDefinition",
            Self::Terminate => "terminateEventDefinition",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|def| def.tag() == tag)
    }

    pub const fn trigger(self) -> EventTrigger {
        match self {
            Self::Message => EventTrigger::Message,
            Self::Timer => EventTrigger::Timer,
            Self::Conditional => EventTrigger::Conditional,
            Self::Signal => EventTrigger::Signal,
            Self::Error => EventTrigger::Error,
            Self::Escalation => EventTrigger::Escalation,
            Self::Cancel => EventTrigger::Cancel,
            Self::Compensate => EventTrigger::Compensation,
            Self::Link => EventTrigger::Link,
            Self::Terminate => EventTrigger::Terminate,
        }
    }
}

/// Declares the expected shape of a gateway's incoming/outgoing flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GatewayDirection {
    #[default]
    Unspecified,
    Converging,
    Diverging,
    Mixed,
}

impl GatewayDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Converging => "Converging",
            Self::Diverging => "Diverging",
            Self::Mixed => "Mixed",
        }
    }
}

impl FromStr for GatewayDirection {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unspecified" => Ok(Self::Unspecified),
            "Converging" => Ok(Self::Converging),
            "Diverging" => Ok(Self::Diverging),
            "Mixed" => Ok(Self::Mixed),
            other => Err(DiagramError::unsupported(format!("gatewayDirection '{other}'"))),
        }
    }
}

/// `eventGatewayType` of an event-based gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventGatewayType {
    #[default]
    Exclusive,
    Parallel,
}

impl EventGatewayType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exclusive => "Exclusive",
            Self::Parallel => "Parallel",
        }
    }
}

impl FromStr for EventGatewayType {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exclusive" => Ok(Self::Exclusive),
            "Parallel" => Ok(Self::Parallel),
            other => Err(DiagramError::unsupported(format!("eventGatewayType '{other}'"))),
        }
    }
}

/// `processType` of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessType {
    #[default]
    None,
    Public,
    Private,
}

impl ProcessType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

impl FromStr for ProcessType {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Public" => Ok(Self::Public),
            "Private" => Ok(Self::Private),
            other => Err(DiagramError::unsupported(format!("processType '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping_is_total_and_invertible() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::from_tag("lane"), None);
    }

    #[test]
    fn test_from_str_ignores_case() {
        assert_eq!("UserTask".parse::<NodeKind>().ok(), Some(NodeKind::UserTask));
        assert_eq!("exclusivegateway".parse::<NodeKind>().ok(), Some(NodeKind::ExclusiveGateway));
        assert!(matches!(
            "swimlane".parse::<NodeKind>(),
            Err(DiagramError::UnsupportedElementKind(_))
        ));
    }

    #[test]
    fn test_categories() {
        assert!(NodeKind::CallActivity.is_activity());
        assert!(!NodeKind::CallActivity.is_sub_process());
        assert!(NodeKind::Transaction.is_sub_process());
        assert!(NodeKind::BoundaryEvent.is_event());
        assert!(!NodeKind::ParallelGateway.supports_default_flow());
        assert!(NodeKind::InclusiveGateway.supports_default_flow());
    }

    #[test]
    fn test_trigger_parsing() {
        assert_eq!("parallel-multiple".parse::<EventTrigger>().ok(), Some(EventTrigger::ParallelMultiple));
        assert_eq!("parallelMultiple".parse::<EventTrigger>().ok(), Some(EventTrigger::ParallelMultiple));
        assert_eq!("timer".parse::<EventTrigger>().ok(), Some(EventTrigger::Timer));
        assert!("sometimes".parse::<EventTrigger>().is_err());
    }

    #[test]
    fn test_trigger_from_definitions() {
        use EventDefinitionType as D;
        assert_eq!(EventTrigger::from_definitions(&[], false), EventTrigger::None);
        assert_eq!(EventTrigger::from_definitions(&[D::Compensate], false), EventTrigger::Compensation);
        assert_eq!(EventTrigger::from_definitions(&[D::Message, D::Timer], false), EventTrigger::Multiple);
        assert_eq!(
            EventTrigger::from_definitions(&[D::Message, D::Timer], true),
            EventTrigger::ParallelMultiple
        );
    }
}
