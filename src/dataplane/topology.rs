//! Topology view and notifications
//!
//! The pipeline takes a fresh `TopologySnapshot` on every rule decision; it
//! is only reported in the logs and never changes the egress choice.
//! `TopologyMonitor` receives edge notifications pushed by the platform.

use crate::dataplane::{Edge, EdgeProperty, NodeId, TopoEdgeUpdate, TopologyManager, UpdateType};
use crate::telemetry::MetricsRegistry;
use dashmap::DashSet;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Topology as reported at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologySnapshot {
    edges: HashMap<NodeId, HashSet<Edge>>,
    properties: HashMap<Edge, Vec<EdgeProperty>>,
}

impl TopologySnapshot {
    pub fn fetch(manager: &dyn TopologyManager) -> Self {
        Self {
            edges: manager.edges(),
            properties: manager.edge_properties(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of distinct edges across all nodes
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flatten()
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn edges_of(&self, node: NodeId) -> Option<&HashSet<Edge>> {
        self.edges.get(&node)
    }
}

/// Receiver of topology change notifications
pub trait TopologyListener: Send + Sync {
    fn edge_update(&self, updates: &[TopoEdgeUpdate]);

    fn edge_over_utilized(&self, edge: &Edge);

    fn edge_util_back_to_normal(&self, edge: &Edge);
}

/// Logs topology notifications and tracks congested edges
#[derive(Debug)]
pub struct TopologyMonitor {
    over_utilized: DashSet<Edge>,
    metrics: Arc<MetricsRegistry>,
}

impl TopologyMonitor {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            over_utilized: DashSet::new(),
            metrics,
        }
    }

    pub fn over_utilized_count(&self) -> usize {
        self.over_utilized.len()
    }
}

impl TopologyListener for TopologyMonitor {
    fn edge_update(&self, updates: &[TopoEdgeUpdate]) {
        for update in updates {
            self.metrics.edge_updates.inc();
            match update.update_type {
                UpdateType::Added => info!("Edge added: {}", update.edge),
                UpdateType::Removed => {
                    info!("Edge removed: {}", update.edge);
                    self.over_utilized.remove(&update.edge);
                }
                UpdateType::Changed => {
                    debug!("Edge changed: {} {:?}", update.edge, update.properties)
                }
            }
        }
        trace!("Processed {} edge updates", updates.len());
    }

    fn edge_over_utilized(&self, edge: &Edge) {
        if self.over_utilized.insert(*edge) {
            info!("Edge over-utilized: {}", edge);
        }
    }

    fn edge_util_back_to_normal(&self, edge: &Edge) {
        if self.over_utilized.remove(edge).is_some() {
            info!("Edge utilization back to normal: {}", edge);
        }
    }
}
