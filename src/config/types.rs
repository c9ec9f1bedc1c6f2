//! Configuration types

use crate::dataplane::{PipelineConfig, DEFAULT_HARD_TIMEOUT, DEFAULT_IDLE_TIMEOUT};
use crate::telemetry::LogConfig;
use serde::Deserialize;

/// Contents of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LogConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub topology: TopologyConfig,
    /// Switches of the simulated fabric
    #[serde(default)]
    pub fabric: FabricConfig,
    /// Frames replayed by `learnflow simulate`
    #[serde(default)]
    pub traffic: Vec<TrafficConfig>,
}

impl Config {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            idle_timeout: self.flow.idle_timeout,
            hard_timeout: self.flow.hard_timeout,
            snapshot_per_decision: self.topology.snapshot_per_decision,
        }
    }
}

/// Timeouts of installed rules, in seconds (0 = never)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub idle_timeout: u16,
    pub hard_timeout: u16,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            hard_timeout: DEFAULT_HARD_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Fetch the topology on every rule decision (logged only)
    pub snapshot_per_decision: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            snapshot_per_decision: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FabricConfig {
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    pub node: u64,
    pub ports: Vec<u32>,
    /// Ports that exist but are down
    #[serde(default)]
    pub down_ports: Vec<u32>,
    /// Switch refuses every rule
    #[serde(default)]
    pub reject_rules: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// "node/port"
    pub a: String,
    pub b: String,
    /// Bits per second
    pub bandwidth: Option<u64>,
}

/// One echo request injected into the fabric
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficConfig {
    /// Frames of the same round are dispatched concurrently
    #[serde(default)]
    pub round: u32,
    /// Ingress attachment point, "node/port"
    pub ingress: String,
    pub src_ip: String,
    pub src_mac: String,
    pub dst_ip: String,
    pub dst_mac: String,
}
