//! Shared fixtures

use learnflow::dataplane::{AttachmentPoint, NodeId, Pipeline, PipelineConfig, Services};
use learnflow::platform::InMemoryFabric;
use learnflow::protocol::ethernet::FrameBuilder;
use learnflow::protocol::icmp::{echo_request_frame, EchoEndpoints};
use learnflow::protocol::ipv4::{Ipv4Builder, Protocol};
use learnflow::protocol::{EtherType, MacAddr};
use learnflow::telemetry::MetricsRegistry;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub const S1: NodeId = NodeId(1);
pub const S2: NodeId = NodeId(2);

#[derive(Debug, Clone, Copy)]
pub struct Host {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

pub fn host(n: u8) -> Host {
    Host {
        ip: Ipv4Addr::new(10, 0, 0, n),
        mac: MacAddr([0x02, 0, 0, 0, 0, n]),
    }
}

pub fn at(node: NodeId, port: u32) -> AttachmentPoint {
    AttachmentPoint::new(node, port)
}

pub fn ping(from: Host, to: Host) -> Vec<u8> {
    echo_request_frame(
        &EchoEndpoints {
            src_mac: from.mac,
            src_ip: from.ip,
            dst_mac: to.mac,
            dst_ip: to.ip,
        },
        0x1234,
        1,
    )
}

/// UDP datagram from `from` to `to`, ports 5000 -> 53
pub fn udp(from: Host, to: Host) -> Vec<u8> {
    let mut segment = Vec::new();
    segment.extend_from_slice(&5000u16.to_be_bytes());
    segment.extend_from_slice(&53u16.to_be_bytes());
    segment.extend_from_slice(&12u16.to_be_bytes());
    segment.extend_from_slice(&[0, 0, 0xde, 0xad, 0xbe, 0xef]);

    let packet = Ipv4Builder::new()
        .src_addr(from.ip)
        .dst_addr(to.ip)
        .protocol(Protocol::Udp.number())
        .payload(&segment)
        .build();

    FrameBuilder::new()
        .src_mac(from.mac)
        .dst_mac(to.mac)
        .ethertype(EtherType::Ipv4.as_u16())
        .payload(&packet)
        .build()
}

pub struct Harness {
    pub fabric: Arc<InMemoryFabric>,
    pub pipeline: Pipeline,
    pub metrics: Arc<MetricsRegistry>,
}

/// Two switches, S1 with ports 1-4 and S2 with ports 1-3
pub fn harness() -> Harness {
    harness_with(PipelineConfig::default())
}

pub fn harness_with(config: PipelineConfig) -> Harness {
    let fabric = Arc::new(InMemoryFabric::new());
    fabric.add_switch(S1, [1, 2, 3, 4]);
    fabric.add_switch(S2, [1, 2, 3]);

    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = Pipeline::new(
        Services::from_backend(fabric.clone()),
        config,
        metrics.clone(),
    );

    Harness {
        fabric,
        pipeline,
        metrics,
    }
}
