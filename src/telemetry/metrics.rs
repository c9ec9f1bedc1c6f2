//! Pipeline counters
//!
//! Lock-free atomic counters shared by every thread that drives the
//! pipeline, plus per-switch frame statistics.

use crate::dataplane::NodeId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-switch frame statistics.
#[derive(Debug, Default)]
pub struct NodeStats {
    /// Frames punted up from this switch.
    pub rx_frames: Counter,
    /// Frames sent out through this switch.
    pub tx_frames: Counter,
    /// Rules accepted by this switch.
    pub rules_installed: Counter,
}

/// Metrics registry for the decision pipeline.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    nodes: DashMap<NodeId, NodeStats>,

    /// Frames handed to the pipeline.
    pub frames_received: Counter,
    /// Frames left for other handlers.
    pub frames_ignored: Counter,
    /// Frames flooded because the destination was unknown.
    pub frames_flooded: Counter,
    /// Per-port copies sent while flooding.
    pub flood_transmits: Counter,
    /// Ports skipped while flooding.
    pub flood_port_errors: Counter,
    /// Frames sent out the resolved egress port after a rule install.
    pub frames_forwarded: Counter,
    /// Explicit forwards that failed after a successful install.
    pub forward_errors: Counter,
    /// Rules accepted by a switch.
    pub rules_installed: Counter,
    /// Rules refused by a switch.
    pub rule_install_failures: Counter,
    /// Hosts seen for the first time.
    pub hosts_learned: Counter,
    /// Hosts re-learned at a different attachment point.
    pub host_moves: Counter,
    /// Topology snapshots fetched during rule decisions.
    pub topology_snapshots: Counter,
    /// Edge notifications received from the topology service.
    pub edge_updates: Counter,

    /// Current number of host table entries.
    pub host_table_size: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame punted up from `node`.
    pub fn record_rx(&self, node: NodeId) {
        self.nodes.entry(node).or_default().rx_frames.inc();
    }

    /// Records a frame transmitted through `node`.
    pub fn record_tx(&self, node: NodeId) {
        self.nodes.entry(node).or_default().tx_frames.inc();
    }

    /// Records a rule accepted by `node`.
    pub fn record_rule(&self, node: NodeId) {
        self.rules_installed.inc();
        self.nodes.entry(node).or_default().rules_installed.inc();
    }

    pub fn set_host_table_size(&self, size: usize) {
        self.host_table_size.store(size as u64, Ordering::Relaxed);
    }

    /// Exports all metrics as key-value pairs.
    pub fn export(&self) -> Vec<(String, u64)> {
        let mut result = vec![
            ("frames_received".into(), self.frames_received.get()),
            ("frames_ignored".into(), self.frames_ignored.get()),
            ("frames_flooded".into(), self.frames_flooded.get()),
            ("flood_transmits".into(), self.flood_transmits.get()),
            ("flood_port_errors".into(), self.flood_port_errors.get()),
            ("frames_forwarded".into(), self.frames_forwarded.get()),
            ("forward_errors".into(), self.forward_errors.get()),
            ("rules_installed".into(), self.rules_installed.get()),
            (
                "rule_install_failures".into(),
                self.rule_install_failures.get(),
            ),
            ("hosts_learned".into(), self.hosts_learned.get()),
            ("host_moves".into(), self.host_moves.get()),
            ("topology_snapshots".into(), self.topology_snapshots.get()),
            ("edge_updates".into(), self.edge_updates.get()),
            (
                "host_table_size".into(),
                self.host_table_size.load(Ordering::Relaxed),
            ),
        ];

        let mut nodes: Vec<_> = self.nodes.iter().collect();
        nodes.sort_by_key(|entry| *entry.key());
        for entry in nodes {
            let (node, stats) = (entry.key(), entry.value());
            result.extend([
                (format!("{}_rx_frames", node), stats.rx_frames.get()),
                (format!("{}_tx_frames", node), stats.tx_frames.get()),
                (
                    format!("{}_rules_installed", node),
                    stats.rules_installed.get(),
                ),
            ]);
        }

        result
    }
}
