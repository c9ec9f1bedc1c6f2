//! Forwarding rule synthesis
//!
//! One exact-match rule per observed flow; no wildcarding or aggregation.

use crate::dataplane::{AttachmentPoint, FlowDescriptor, PortId};
use crate::protocol::ipv4::Protocol;
use crate::protocol::{EtherType, MacAddr};
use std::fmt;
use std::net::Ipv4Addr;

/// Default idle timeout in seconds
pub const DEFAULT_IDLE_TIMEOUT: u16 = 30;

/// Default hard timeout in seconds
pub const DEFAULT_HARD_TIMEOUT: u16 = 60;

/// Exact-match fields of a forwarding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowMatch {
    pub ether_type: EtherType,
    pub protocol: Protocol,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
}

/// Rule action executed by the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowAction {
    Output(PortId),
}

/// Installable forwarding rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingRule {
    flow_match: FlowMatch,
    actions: Vec<FlowAction>,
    idle_timeout: u16,
    hard_timeout: u16,
}

impl ForwardingRule {
    pub fn flow_match(&self) -> &FlowMatch {
        &self.flow_match
    }

    pub fn actions(&self) -> &[FlowAction] {
        &self.actions
    }

    pub fn idle_timeout(&self) -> u16 {
        self.idle_timeout
    }

    pub fn hard_timeout(&self) -> u16 {
        self.hard_timeout
    }
}

impl fmt::Display for ForwardingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.flow_match;
        write!(
            f,
            "match(0x{:04x}, {:?}, {}@{} -> {}@{}) actions{:?} idle={} hard={}",
            m.ether_type.as_u16(),
            m.protocol,
            m.src_ip,
            m.src_mac,
            m.dst_ip,
            m.dst_mac,
            self.actions,
            self.idle_timeout,
            self.hard_timeout
        )
    }
}

/// Builds forwarding rules with fixed timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRuleBuilder {
    idle_timeout: u16,
    hard_timeout: u16,
}

impl Default for FlowRuleBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_HARD_TIMEOUT)
    }
}

impl FlowRuleBuilder {
    pub fn new(idle_timeout: u16, hard_timeout: u16) -> Self {
        Self {
            idle_timeout,
            hard_timeout,
        }
    }

    /// Build the rule forwarding `flow` out of `egress`
    ///
    /// The protocol field is taken from the descriptor; callers only pass
    /// flows they route (ICMP).
    pub fn build(&self, flow: &FlowDescriptor, egress: AttachmentPoint) -> ForwardingRule {
        ForwardingRule {
            flow_match: FlowMatch {
                ether_type: EtherType::Ipv4,
                protocol: flow.transport.protocol(),
                src_ip: flow.src_ip,
                dst_ip: flow.dst_ip,
                src_mac: flow.src_mac,
                dst_mac: flow.dst_mac,
            },
            actions: vec![FlowAction::Output(egress.port)],
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
        }
    }
}
