//! Switch, port and link identifiers shared with the controller platform

use std::fmt;

/// Switch port number
pub type PortId = u32;

/// Switch identifier (datapath id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "of:{:016x}", self.0)
    }
}

/// The (switch, port) pair where a host was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentPoint {
    pub node: NodeId,
    pub port: PortId,
}

impl AttachmentPoint {
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node, self.port)
    }
}

/// Directed inter-switch link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub tail: AttachmentPoint,
    pub head: AttachmentPoint,
}

impl Edge {
    pub fn new(tail: AttachmentPoint, head: AttachmentPoint) -> Self {
        Self { tail, head }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.tail, self.head)
    }
}

/// Link attributes reported by the topology service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeProperty {
    /// Bits per second
    Bandwidth(u64),
    Up(bool),
}

/// Kind of change carried by a topology notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Added,
    Removed,
    Changed,
}

/// One edge change pushed by the topology service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoEdgeUpdate {
    pub edge: Edge,
    pub properties: Vec<EdgeProperty>,
    pub update_type: UpdateType,
}
