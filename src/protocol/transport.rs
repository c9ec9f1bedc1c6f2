//! TCP and UDP port extraction
//!
//! Only the leading port pair is decoded; both protocols place source and
//! destination port in the first four bytes of the segment.

use crate::{Error, Result};

/// Source and destination transport ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ports {
    pub src: u16,
    pub dst: u16,
}

impl Ports {
    pub fn parse(segment: &[u8]) -> Result<Self> {
        match segment {
            [s0, s1, d0, d1, ..] => Ok(Self {
                src: u16::from_be_bytes([*s0, *s1]),
                dst: u16::from_be_bytes([*d0, *d1]),
            }),
            _ => Err(Error::Parse("transport header too short".into())),
        }
    }
}
