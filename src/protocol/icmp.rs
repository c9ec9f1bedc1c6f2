//! ICMP message decoding - RFC 792

use super::ethernet::FrameBuilder;
use super::ipv4::{checksum, Ipv4Builder, Protocol};
use super::{EtherType, MacAddr};
use crate::{Error, Result};
use std::net::Ipv4Addr;

/// ICMP header size
pub const HEADER_SIZE: usize = 8;

/// Echo request message type
pub const ECHO_REQUEST: u8 = 8;

/// Parsed ICMP message
#[derive(Debug, Clone, Copy)]
pub struct IcmpPacket<'a> {
    buffer: &'a [u8],
}

impl<'a> IcmpPacket<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Parse("ICMP packet too short".into()));
        }
        Ok(Self { buffer })
    }

    pub fn icmp_type(&self) -> u8 {
        self.buffer[0]
    }

    pub fn code(&self) -> u8 {
        self.buffer[1]
    }
}

/// Build an ICMP echo request message (type 8, code 0)
pub fn build_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.extend_from_slice(&[ECHO_REQUEST, 0, 0, 0]);
    message.extend_from_slice(&identifier.to_be_bytes());
    message.extend_from_slice(&sequence.to_be_bytes());
    message.extend_from_slice(payload);

    let sum = checksum(&message);
    message[2..4].copy_from_slice(&sum.to_be_bytes());
    message
}

/// Addressing of a complete echo request frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoEndpoints {
    pub src_mac: MacAddr,
    pub src_ip: Ipv4Addr,
    pub dst_mac: MacAddr,
    pub dst_ip: Ipv4Addr,
}

/// Build an Ethernet/IPv4/ICMP echo request frame
pub fn echo_request_frame(endpoints: &EchoEndpoints, identifier: u16, sequence: u16) -> Vec<u8> {
    let packet = Ipv4Builder::new()
        .identification(sequence)
        .src_addr(endpoints.src_ip)
        .dst_addr(endpoints.dst_ip)
        .protocol(Protocol::Icmp.number())
        .payload(&build_echo_request(identifier, sequence, &[0u8; 32]))
        .build();

    FrameBuilder::new()
        .dst_mac(endpoints.dst_mac)
        .src_mac(endpoints.src_mac)
        .ethertype(EtherType::Ipv4.as_u16())
        .payload(&packet)
        .build()
}
