//! In-memory switch fabric
//!
//! Switches with up/down ports, a static link list, and knobs to make a
//! switch refuse rules or a port refuse frames. Every transmitted frame and
//! programmed rule is recorded for inspection.

use crate::dataplane::{
    AttachmentPoint, Edge, EdgeProperty, FlowProgrammer, ForwardingRule, NodeId, OutboundFrame,
    PacketTransmitter, PortId, SwitchManager, TopologyManager,
};
use crate::{Error, Result};
use dashmap::{DashMap, DashSet};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::trace;

#[derive(Debug, Default)]
pub struct InMemoryFabric {
    /// node -> (port -> up)
    switches: DashMap<NodeId, BTreeMap<PortId, bool>>,
    links: Mutex<Vec<(Edge, Vec<EdgeProperty>)>>,
    rejecting: DashSet<NodeId>,
    failing_ports: DashSet<AttachmentPoint>,
    transmitted: Mutex<Vec<OutboundFrame>>,
    programmed: Mutex<Vec<(NodeId, ForwardingRule)>>,
    topology_queries: AtomicUsize,
}

impl InMemoryFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a switch whose listed ports are all up
    pub fn add_switch(&self, node: NodeId, ports: impl IntoIterator<Item = PortId>) {
        let ports = ports.into_iter().map(|port| (port, true)).collect();
        self.switches.insert(node, ports);
    }

    /// Set the state of an existing port
    pub fn set_port_up(&self, point: AttachmentPoint, up: bool) -> Result<()> {
        let mut ports = self
            .switches
            .get_mut(&point.node)
            .ok_or(Error::UnknownNode(point.node))?;
        ports.insert(point.port, up);
        Ok(())
    }

    /// Add a bidirectional link between two switch ports
    pub fn add_link(&self, a: AttachmentPoint, b: AttachmentPoint, properties: Vec<EdgeProperty>) {
        let mut links = self.links.lock().unwrap_or_else(PoisonError::into_inner);
        links.push((Edge::new(a, b), properties.clone()));
        links.push((Edge::new(b, a), properties));
    }

    /// Make `node` refuse every rule
    pub fn reject_rules(&self, node: NodeId) {
        self.rejecting.insert(node);
    }

    pub fn accept_rules(&self, node: NodeId) {
        self.rejecting.remove(&node);
    }

    /// Make every transmit out of `point` fail
    pub fn fail_transmit(&self, point: AttachmentPoint) {
        self.failing_ports.insert(point);
    }

    pub fn transmitted(&self) -> Vec<OutboundFrame> {
        self.transmitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn programmed(&self) -> Vec<(NodeId, ForwardingRule)> {
        self.programmed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the edge map was requested
    pub fn topology_queries(&self) -> usize {
        self.topology_queries.load(Ordering::Relaxed)
    }

    /// Forget recorded frames and rules
    pub fn clear_records(&self) {
        self.transmitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.programmed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SwitchManager for InMemoryFabric {
    fn active_ports(&self, node: NodeId) -> Result<BTreeSet<PortId>> {
        let ports = self.switches.get(&node).ok_or(Error::UnknownNode(node))?;
        Ok(ports
            .iter()
            .filter(|(_, up)| **up)
            .map(|(port, _)| *port)
            .collect())
    }
}

impl PacketTransmitter for InMemoryFabric {
    fn transmit(&self, frame: &OutboundFrame) -> Result<()> {
        let egress = frame.egress();
        if !self.switches.contains_key(&egress.node) {
            return Err(Error::UnknownNode(egress.node));
        }
        if self.failing_ports.contains(&egress) {
            return Err(Error::Transmit {
                point: egress,
                reason: "port refused frame".into(),
            });
        }

        trace!("fabric: {} bytes out {}", frame.data().len(), egress);
        self.transmitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.clone());
        Ok(())
    }
}

impl FlowProgrammer for InMemoryFabric {
    fn add_flow(&self, node: NodeId, rule: &ForwardingRule) -> Result<()> {
        if !self.switches.contains_key(&node) {
            return Err(Error::UnknownNode(node));
        }
        if self.rejecting.contains(&node) {
            return Err(Error::RuleRejected {
                node,
                reason: "switch refused flow-mod".into(),
            });
        }

        self.programmed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((node, rule.clone()));
        Ok(())
    }
}

impl TopologyManager for InMemoryFabric {
    fn edges(&self) -> HashMap<NodeId, HashSet<Edge>> {
        self.topology_queries.fetch_add(1, Ordering::Relaxed);

        let links = self.links.lock().unwrap_or_else(PoisonError::into_inner);
        let mut edges: HashMap<NodeId, HashSet<Edge>> = HashMap::new();
        for (edge, _) in links.iter() {
            edges.entry(edge.tail.node).or_default().insert(*edge);
            edges.entry(edge.head.node).or_default().insert(*edge);
        }
        edges
    }

    fn edge_properties(&self) -> HashMap<Edge, Vec<EdgeProperty>> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}
