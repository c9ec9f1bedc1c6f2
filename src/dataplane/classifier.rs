//! Packet classifier
//!
//! Turns a raw punted frame into a `FlowDescriptor`, or explains why the
//! frame is not something this core handles. Decoding never fails loudly:
//! malformed input is just another `NotApplicable` reason.

use crate::dataplane::{AttachmentKey, AttachmentPoint};
use crate::protocol::ethernet::{Frame, MAX_FRAME_SIZE};
use crate::protocol::icmp::IcmpPacket;
use crate::protocol::ipv4::{Ipv4Header, Protocol};
use crate::protocol::transport::Ports;
use crate::protocol::{EtherType, MacAddr};
use std::fmt;
use std::net::Ipv4Addr;

/// Transport-layer identity of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Icmp { icmp_type: u8, code: u8 },
    Tcp { src_port: u16, dst_port: u16 },
    Udp { src_port: u16, dst_port: u16 },
}

impl Transport {
    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Icmp { .. } => Protocol::Icmp,
            Transport::Tcp { .. } => Protocol::Tcp,
            Transport::Udp { .. } => Protocol::Udp,
        }
    }
}

/// Routable identity of one received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowDescriptor {
    pub ingress: AttachmentPoint,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub transport: Transport,
}

impl FlowDescriptor {
    pub fn source_key(&self) -> AttachmentKey {
        AttachmentKey::new(self.src_ip, self.src_mac)
    }

    pub fn destination_key(&self) -> AttachmentKey {
        AttachmentKey::new(self.dst_ip, self.dst_mac)
    }
}

impl fmt::Display for FlowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {}@{} -> {}@{}",
            self.transport.protocol(),
            self.src_ip,
            self.src_mac,
            self.dst_ip,
            self.dst_mac
        )
    }
}

/// Why a frame was left for other handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotApplicable {
    /// Link or network header could not be decoded
    Malformed(String),
    /// Larger than any frame a switch port will emit
    Oversized { len: usize },
    /// EtherType other than IPv4
    NotIpv4 { ethertype: u16 },
    /// Non-first fragment, no transport header to classify
    Fragment,
    /// IPv4 protocol number with no decoder
    UnknownTransport { protocol: u8 },
    /// Decoded fine, but the flow family is not routed by this core
    Unrouted { protocol: Protocol },
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotApplicable::Malformed(reason) => write!(f, "malformed frame: {}", reason),
            NotApplicable::Oversized { len } => {
                write!(f, "{} byte frame exceeds {} bytes", len, MAX_FRAME_SIZE)
            }
            NotApplicable::NotIpv4 { ethertype } => write!(f, "ethertype 0x{:04x}", ethertype),
            NotApplicable::Fragment => write!(f, "trailing IPv4 fragment"),
            NotApplicable::UnknownTransport { protocol } => {
                write!(f, "IP protocol {}", protocol)
            }
            NotApplicable::Unrouted { protocol } => write!(f, "{:?} flows are not routed", protocol),
        }
    }
}

/// Result of classifying a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Routable(FlowDescriptor),
    NotApplicable(NotApplicable),
}

/// Decode `raw` received on `ingress` into a flow descriptor
pub fn classify(raw: &[u8], ingress: AttachmentPoint) -> Classification {
    // Checked up front so no rule is installed for a frame that cannot be sent on
    if raw.len() > MAX_FRAME_SIZE {
        return Classification::NotApplicable(NotApplicable::Oversized { len: raw.len() });
    }

    let frame = match Frame::parse(raw) {
        Ok(frame) => frame,
        Err(e) => return Classification::NotApplicable(NotApplicable::Malformed(e.to_string())),
    };

    if EtherType::from_u16(frame.ethertype()) != Some(EtherType::Ipv4) {
        return Classification::NotApplicable(NotApplicable::NotIpv4 {
            ethertype: frame.ethertype(),
        });
    }

    let ip = match Ipv4Header::parse(frame.payload()) {
        Ok(ip) => ip,
        Err(e) => return Classification::NotApplicable(NotApplicable::Malformed(e.to_string())),
    };

    if !ip.validate_checksum() {
        return Classification::NotApplicable(NotApplicable::Malformed(
            "bad IPv4 header checksum".into(),
        ));
    }

    if ip.is_trailing_fragment() {
        return Classification::NotApplicable(NotApplicable::Fragment);
    }

    match decode_transport(ip.protocol(), ip.payload()) {
        Ok(transport) => Classification::Routable(FlowDescriptor {
            ingress,
            src_ip: ip.src_addr(),
            dst_ip: ip.dst_addr(),
            src_mac: frame.src_mac(),
            dst_mac: frame.dst_mac(),
            transport,
        }),
        Err(reason) => Classification::NotApplicable(reason),
    }
}

fn decode_transport(protocol: u8, segment: &[u8]) -> Result<Transport, NotApplicable> {
    let malformed = |e: crate::Error| NotApplicable::Malformed(e.to_string());

    match Protocol::from_u8(protocol) {
        Some(Protocol::Icmp) => {
            let icmp = IcmpPacket::parse(segment).map_err(malformed)?;
            Ok(Transport::Icmp {
                icmp_type: icmp.icmp_type(),
                code: icmp.code(),
            })
        }
        Some(Protocol::Tcp) => {
            let ports = Ports::parse(segment).map_err(malformed)?;
            Ok(Transport::Tcp {
                src_port: ports.src,
                dst_port: ports.dst,
            })
        }
        Some(Protocol::Udp) => {
            let ports = Ports::parse(segment).map_err(malformed)?;
            Ok(Transport::Udp {
                src_port: ports.src,
                dst_port: ports.dst,
            })
        }
        None => Err(NotApplicable::UnknownTransport { protocol }),
    }
}
