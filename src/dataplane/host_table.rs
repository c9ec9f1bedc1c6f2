//! Host location table
//!
//! Maps an observed (IPv4 address, MAC address) pair to the attachment point
//! where that host last sent traffic. Entries are learned passively from
//! source addresses and are never aged out: a host that goes silent keeps
//! its last known location until it is re-learned elsewhere.

use crate::dataplane::AttachmentPoint;
use crate::protocol::MacAddr;
use dashmap::DashMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Host identity as seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentKey {
    ip: Ipv4Addr,
    mac: MacAddr,
}

impl AttachmentKey {
    pub fn new(ip: Ipv4Addr, mac: MacAddr) -> Self {
        Self { ip, mac }
    }
}

impl fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ip, self.mac)
    }
}

/// What a `learn` call changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Learned {
    /// First sighting of this host
    New,
    /// Host reappeared at a different attachment point
    Moved { from: AttachmentPoint },
    /// Same location as before
    Refreshed,
}

/// Concurrent host location table
///
/// Backed by a sharded map, so lookups and inserts for different keys
/// proceed in parallel and conflicting writes to one key are serialized
/// by its shard lock. Callers never lock.
#[derive(Debug, Default)]
pub struct HostLocationTable {
    hosts: DashMap<AttachmentKey, AttachmentPoint>,
}

impl HostLocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &AttachmentKey) -> Option<AttachmentPoint> {
        self.hosts.get(key).map(|entry| *entry.value())
    }

    /// Record `point` as the location of `key`, replacing any previous one
    pub fn learn(&self, key: AttachmentKey, point: AttachmentPoint) -> Learned {
        match self.hosts.insert(key, point) {
            None => Learned::New,
            Some(previous) if previous == point => Learned::Refreshed,
            Some(previous) => Learned::Moved { from: previous },
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Point-in-time copy of all entries, sorted by key
    pub fn hosts(&self) -> Vec<(AttachmentKey, AttachmentPoint)> {
        let mut hosts: Vec<_> = self
            .hosts
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        hosts.sort();
        hosts
    }
}
