//! Frame decoders
//!
//! Just enough of Ethernet, IPv4, ICMP and the TCP/UDP port pair to classify
//! a punted frame into a flow.

pub mod ethernet;
pub mod icmp;
pub mod ipv4;
pub mod transport;
pub mod types;

pub use types::*;
