//! Rule installation and frame emission
//!
//! Wraps the flow programmer and the packet transmitter. Every failure is
//! contained to the frame being handled: install errors are reported to the
//! caller, flood errors only cost the affected port.

use crate::dataplane::{
    AttachmentPoint, FlowProgrammer, ForwardingRule, NodeId, OutboundFrame, PacketTransmitter,
    PortId, Services, SwitchManager,
};
use crate::telemetry::MetricsRegistry;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of flooding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodReport {
    pub node: NodeId,
    /// Ports the frame was sent out of
    pub sent: Vec<PortId>,
    /// Ports skipped because the copy could not be built or sent
    pub skipped: Vec<PortId>,
}

impl FloodReport {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            sent: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Submits rules to switches and emits frames
pub struct RuleInstaller {
    switches: Arc<dyn SwitchManager>,
    transmitter: Arc<dyn PacketTransmitter>,
    programmer: Arc<dyn FlowProgrammer>,
    metrics: Arc<MetricsRegistry>,
}

impl RuleInstaller {
    pub fn new(services: &Services, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            switches: Arc::clone(&services.switches),
            transmitter: Arc::clone(&services.transmitter),
            programmer: Arc::clone(&services.programmer),
            metrics,
        }
    }

    /// Install `rule` on `node`
    ///
    /// A refusal is returned as `Error::RuleRejected`; nothing is retried.
    pub fn install(&self, node: NodeId, rule: &ForwardingRule) -> Result<()> {
        match self.programmer.add_flow(node, rule) {
            Ok(()) => {
                self.metrics.record_rule(node);
                debug!("Installed rule on {}: {}", node, rule);
                Ok(())
            }
            Err(e) => {
                self.metrics.rule_install_failures.inc();
                warn!("Rule install on {} failed: {}", node, e);
                Err(match e {
                    rejected @ Error::RuleRejected { .. } => rejected,
                    other => Error::RuleRejected {
                        node,
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    /// Send `raw` out of `egress`
    pub fn forward(&self, raw: &[u8], egress: AttachmentPoint) -> Result<()> {
        let frame = OutboundFrame::new(raw, egress)?;
        self.transmitter.transmit(&frame)?;
        self.metrics.record_tx(egress.node);
        self.metrics.frames_forwarded.inc();
        trace!("Forwarded {} bytes out {}", raw.len(), egress);
        Ok(())
    }

    /// Send `raw` out of every active port of the ingress switch except
    /// the ingress port
    pub fn flood(&self, raw: &[u8], ingress: AttachmentPoint) -> FloodReport {
        let mut report = FloodReport::new(ingress.node);

        let ports = match self.switches.active_ports(ingress.node) {
            Ok(ports) => ports,
            Err(e) => {
                warn!("Cannot flood on {}: {}", ingress.node, e);
                return report;
            }
        };

        for port in ports.into_iter().filter(|&p| p != ingress.port) {
            let egress = AttachmentPoint::new(ingress.node, port);
            let sent = OutboundFrame::new(raw, egress)
                .and_then(|frame| self.transmitter.transmit(&frame));

            match sent {
                Ok(()) => {
                    self.metrics.record_tx(ingress.node);
                    self.metrics.flood_transmits.inc();
                    report.sent.push(port);
                }
                Err(e) => {
                    self.metrics.flood_port_errors.inc();
                    warn!("Skipping flood port {}: {}", egress, e);
                    report.skipped.push(port);
                }
            }
        }

        trace!(
            "Flooded on {}: sent={:?} skipped={:?}",
            ingress.node,
            report.sent,
            report.skipped
        );
        report
    }
}
