//! Packet processing pipeline
//!
//! Entry point for every frame punted up by a switch. Per frame:
//!
//! 1. classify; anything but an ICMP-over-IPv4 flow is left to other handlers
//! 2. learn the source host at the ingress attachment point
//! 3. look up the destination host
//!    - unknown: flood on the ingress switch, install nothing
//!    - known: install an exact-match rule on the destination's switch and
//!      send this frame out the destination port
//!
//! A refused rule drops the frame; there is no flood fallback and no retry.

use crate::dataplane::{
    classify, AttachmentPoint, Classification, FloodReport, FlowDescriptor, FlowRuleBuilder,
    ForwardingRule, HostLocationTable, Learned, NodeId, NotApplicable, RuleInstaller, Services,
    TopologyManager, TopologySnapshot, Transport, DEFAULT_HARD_TIMEOUT, DEFAULT_IDLE_TIMEOUT,
};
use crate::telemetry::MetricsRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Answer given back to the platform for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketResult {
    /// Frame handled here
    Consumed,
    /// Frame left for the next handler
    Ignored,
}

/// Terminal state reached for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    NotApplicable(NotApplicable),
    /// Destination unknown, frame flooded on the ingress switch
    Flooded(FloodReport),
    /// Rule installed and frame sent out the egress port
    Forwarded {
        rule: ForwardingRule,
        egress: AttachmentPoint,
    },
    /// The switch refused the rule; frame dropped
    InstallFailed { node: NodeId, rule: ForwardingRule },
    /// Rule installed but the explicit transmit failed
    ForwardFailed { egress: AttachmentPoint },
}

impl Disposition {
    pub fn packet_result(&self) -> PacketResult {
        match self {
            Disposition::NotApplicable(_) | Disposition::InstallFailed { .. } => {
                PacketResult::Ignored
            }
            Disposition::Flooded(_)
            | Disposition::Forwarded { .. }
            | Disposition::ForwardFailed { .. } => PacketResult::Consumed,
        }
    }
}

/// Pipeline tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    /// Fetch and log a topology snapshot on every rule decision
    pub snapshot_per_decision: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            hard_timeout: DEFAULT_HARD_TIMEOUT,
            snapshot_per_decision: true,
        }
    }
}

/// Host-learning flow decision pipeline
///
/// `receive` takes `&self` and may run on many threads at once; the host
/// table is the only state it mutates.
pub struct Pipeline {
    hosts: HostLocationTable,
    rules: FlowRuleBuilder,
    installer: RuleInstaller,
    topology: Arc<dyn TopologyManager>,
    snapshot_per_decision: bool,
    metrics: Arc<MetricsRegistry>,
}

impl Pipeline {
    pub fn new(services: Services, config: PipelineConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            hosts: HostLocationTable::new(),
            rules: FlowRuleBuilder::new(config.idle_timeout, config.hard_timeout),
            installer: RuleInstaller::new(&services, metrics.clone()),
            topology: services.topology,
            snapshot_per_decision: config.snapshot_per_decision,
            metrics,
        }
    }

    pub fn hosts(&self) -> &HostLocationTable {
        &self.hosts
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Handle a frame punted up from `ingress`
    pub fn receive(&self, raw: &[u8], ingress: AttachmentPoint) -> PacketResult {
        self.process(raw, ingress).packet_result()
    }

    /// Handle a frame and report the terminal state reached
    pub fn process(&self, raw: &[u8], ingress: AttachmentPoint) -> Disposition {
        self.metrics.frames_received.inc();
        self.metrics.record_rx(ingress.node);

        let flow = match classify(raw, ingress) {
            Classification::Routable(flow) => flow,
            Classification::NotApplicable(reason) => return self.ignore(ingress, reason),
        };

        match flow.transport {
            Transport::Icmp { .. } => {}
            Transport::Tcp { .. } | Transport::Udp { .. } => {
                let protocol = flow.transport.protocol();
                return self.ignore(ingress, NotApplicable::Unrouted { protocol });
            }
        }

        self.learn_source(&flow);

        match self.hosts.lookup(&flow.destination_key()) {
            None => {
                debug!("Destination {} unknown, flooding on {}", flow.dst_ip, ingress.node);
                self.metrics.frames_flooded.inc();
                Disposition::Flooded(self.installer.flood(raw, ingress))
            }
            Some(egress) => self.install_and_forward(raw, &flow, egress),
        }
    }

    fn ignore(&self, ingress: AttachmentPoint, reason: NotApplicable) -> Disposition {
        trace!("Ignoring frame from {}: {}", ingress, reason);
        self.metrics.frames_ignored.inc();
        Disposition::NotApplicable(reason)
    }

    fn learn_source(&self, flow: &FlowDescriptor) {
        let key = flow.source_key();
        match self.hosts.learn(key, flow.ingress) {
            Learned::New => {
                self.metrics.hosts_learned.inc();
                self.metrics.set_host_table_size(self.hosts.len());
                info!("Learned host {} at {}", key, flow.ingress);
            }
            Learned::Moved { from } => {
                self.metrics.host_moves.inc();
                info!("Host {} moved from {} to {}", key, from, flow.ingress);
            }
            Learned::Refreshed => {}
        }
    }

    fn install_and_forward(
        &self,
        raw: &[u8],
        flow: &FlowDescriptor,
        egress: AttachmentPoint,
    ) -> Disposition {
        if self.snapshot_per_decision {
            let snapshot = TopologySnapshot::fetch(self.topology.as_ref());
            self.metrics.topology_snapshots.inc();
            debug!(
                "Topology snapshot: {} nodes, {} edges, {} at {}",
                snapshot.node_count(),
                snapshot.edge_count(),
                snapshot.edges_of(egress.node).map_or(0, HashSet::len),
                egress.node
            );
        }

        let rule = self.rules.build(flow, egress);

        if let Err(e) = self.installer.install(egress.node, &rule) {
            warn!("Dropping {}: {}", flow, e);
            return Disposition::InstallFailed {
                node: egress.node,
                rule,
            };
        }

        match self.installer.forward(raw, egress) {
            Ok(()) => {
                debug!("Forwarded {} out {}", flow, egress);
                Disposition::Forwarded { rule, egress }
            }
            Err(e) => {
                self.metrics.forward_errors.inc();
                warn!("Rule installed but forwarding {} failed: {}", flow, e);
                Disposition::ForwardFailed { egress }
            }
        }
    }
}
