//! Typed BPMN entities.
//!
//! Every entity is a typed record holding the fields the crate understands,
//! plus an [`AttributeBag`](crate::base::AttributeBag) carrying everything
//! else so documents survive a round trip.
//!
//! ```text
//! Process ── node_ids ──▶ FlowNode (NodeKind + NodeDetails)
//!        └── flow_ids ──▶ SequenceFlow (source → target)
//! Participant ── process_ref ──▶ Process
//! MessageFlow (FlowNode | Participant → FlowNode | Participant)
//! ```
//!
//! Cross-references (process, container, adjacency, default flow, boundary
//! attachment) are read-only here; [`DiagramGraph`](crate::graph::DiagramGraph)
//! owns and maintains them.

mod flow;
mod kind;
mod node;
mod process;

pub use flow::{ConditionExpression, MessageFlow, SequenceFlow};
pub use kind::{
    EventDefinitionType, EventGatewayType, EventTrigger, GatewayDirection, NodeKind, ProcessType,
};
pub use node::{
    ActivityDetails, DataDetails, DefinitionChild, EventDefinition, EventDetails, FlowNode,
    GatewayDetails, NodeDetails,
};
pub use process::{Lane, LaneSet, Participant, Process};
