//! Data plane decision core
//!
//! Classifies punted frames, learns host locations, and either installs a
//! forwarding rule or floods.

mod classifier;
mod flow_rule;
mod host_table;
mod installer;
mod node;
mod pipeline;
mod services;
mod topology;

pub use classifier::{classify, Classification, FlowDescriptor, NotApplicable, Transport};
pub use flow_rule::{
    FlowAction, FlowMatch, FlowRuleBuilder, ForwardingRule, DEFAULT_HARD_TIMEOUT,
    DEFAULT_IDLE_TIMEOUT,
};
pub use host_table::{AttachmentKey, HostLocationTable, Learned};
pub use installer::{FloodReport, RuleInstaller};
pub use node::{AttachmentPoint, Edge, EdgeProperty, NodeId, PortId, TopoEdgeUpdate, UpdateType};
pub use pipeline::{Disposition, PacketResult, Pipeline, PipelineConfig};
pub use services::{
    FlowProgrammer, OutboundFrame, PacketTransmitter, Services, SwitchManager, TopologyManager,
};
pub use topology::{TopologyListener, TopologyMonitor, TopologySnapshot};
