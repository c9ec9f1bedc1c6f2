//! Controller platform services consumed by the pipeline
//!
//! Every collaborator is handed to the pipeline at construction time; there
//! are no process-wide service handles.

use crate::dataplane::{AttachmentPoint, Edge, EdgeProperty, ForwardingRule, NodeId, PortId};
use crate::protocol::ethernet::{HEADER_SIZE, MAX_FRAME_SIZE};
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// A copy of a frame addressed to one switch port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    egress: AttachmentPoint,
    data: Vec<u8>,
}

impl OutboundFrame {
    pub fn new(raw: &[u8], egress: AttachmentPoint) -> Result<Self> {
        if raw.len() < HEADER_SIZE {
            return Err(Error::InvalidPacket(format!(
                "{} bytes is shorter than an Ethernet header",
                raw.len()
            )));
        }
        if raw.len() > MAX_FRAME_SIZE {
            return Err(Error::InvalidPacket(format!(
                "{} bytes exceeds maximum frame size",
                raw.len()
            )));
        }

        Ok(Self {
            egress,
            data: raw.to_vec(),
        })
    }

    pub fn egress(&self) -> AttachmentPoint {
        self.egress
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Port inventory of the managed switches
pub trait SwitchManager: Send + Sync {
    /// Ports currently up on `node`
    fn active_ports(&self, node: NodeId) -> Result<BTreeSet<PortId>>;
}

/// Frame emission through a switch (packet-out)
pub trait PacketTransmitter: Send + Sync {
    fn transmit(&self, frame: &OutboundFrame) -> Result<()>;
}

/// Rule programming on a switch (flow-mod)
pub trait FlowProgrammer: Send + Sync {
    /// Install `rule` on `node`; an `Err` means the switch or the
    /// programming service refused it
    fn add_flow(&self, node: NodeId, rule: &ForwardingRule) -> Result<()>;
}

/// Read-only view of the discovered topology
pub trait TopologyManager: Send + Sync {
    fn edges(&self) -> HashMap<NodeId, HashSet<Edge>>;

    fn edge_properties(&self) -> HashMap<Edge, Vec<EdgeProperty>>;
}

/// Service handles injected into the pipeline
#[derive(Clone)]
pub struct Services {
    pub switches: Arc<dyn SwitchManager>,
    pub transmitter: Arc<dyn PacketTransmitter>,
    pub programmer: Arc<dyn FlowProgrammer>,
    pub topology: Arc<dyn TopologyManager>,
}

impl Services {
    /// Use one backend for every service
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SwitchManager + PacketTransmitter + FlowProgrammer + TopologyManager + 'static,
    {
        Self {
            switches: backend.clone(),
            transmitter: backend.clone(),
            programmer: backend.clone(),
            topology: backend,
        }
    }
}
