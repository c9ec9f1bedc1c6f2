//! Ethernet II frame parsing and construction

use super::{EtherType, MacAddr};
use crate::{Error, Result};

/// Header length of an untagged frame
pub const HEADER_SIZE: usize = 14;
/// Header length with a single 802.1Q tag
pub const TAGGED_HEADER_SIZE: usize = 18;
/// Largest frame accepted for retransmission (without FCS, with VLAN tag)
pub const MAX_FRAME_SIZE: usize = 1522;

/// Parsed Ethernet frame borrowing the received buffer
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    buffer: &'a [u8],
    dst_mac: MacAddr,
    src_mac: MacAddr,
    ethertype: u16,
    payload_offset: usize,
}

impl<'a> Frame<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Parse("frame too short".into()));
        }

        let dst_mac = MacAddr::from_slice(&buffer[0..6])
            .ok_or_else(|| Error::Parse("frame too short".into()))?;
        let src_mac = MacAddr::from_slice(&buffer[6..12])
            .ok_or_else(|| Error::Parse("frame too short".into()))?;
        let outer = u16::from_be_bytes([buffer[12], buffer[13]]);

        if outer != EtherType::Vlan.as_u16() {
            return Ok(Self {
                buffer,
                dst_mac,
                src_mac,
                ethertype: outer,
                payload_offset: HEADER_SIZE,
            });
        }

        if buffer.len() < TAGGED_HEADER_SIZE {
            return Err(Error::Parse("VLAN frame too short".into()));
        }

        // Tag control information is skipped; flows are not VLAN scoped
        Ok(Self {
            buffer,
            dst_mac,
            src_mac,
            ethertype: u16::from_be_bytes([buffer[16], buffer[17]]),
            payload_offset: TAGGED_HEADER_SIZE,
        })
    }

    pub fn dst_mac(&self) -> MacAddr {
        self.dst_mac
    }

    pub fn src_mac(&self) -> MacAddr {
        self.src_mac
    }

    /// EtherType of the payload (inner type for tagged frames)
    pub fn ethertype(&self) -> u16 {
        self.ethertype
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.payload_offset..]
    }
}

/// Builder for Ethernet frames
pub struct FrameBuilder {
    dst_mac: MacAddr,
    src_mac: MacAddr,
    ethertype: u16,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            dst_mac: MacAddr::BROADCAST,
            src_mac: MacAddr::ZERO,
            ethertype: EtherType::Ipv4.as_u16(),
            payload: Vec::new(),
        }
    }

    pub fn dst_mac(mut self, mac: MacAddr) -> Self {
        self.dst_mac = mac;
        self
    }

    pub fn src_mac(mut self, mac: MacAddr) -> Self {
        self.src_mac = mac;
        self
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buffer.extend_from_slice(&self.dst_mac.0);
        buffer.extend_from_slice(&self.src_mac.0);
        buffer.extend_from_slice(&self.ethertype.to_be_bytes());
        buffer.extend_from_slice(&self.payload);
        buffer
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
