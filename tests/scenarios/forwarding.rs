//! Known destinations: rule install and forward

use super::common::{at, harness, harness_with, host, ping, S1, S2};
use learnflow::dataplane::{
    Disposition, EdgeProperty, FlowAction, NotApplicable, PacketResult, PipelineConfig,
};
use learnflow::protocol::ipv4::Protocol;
use learnflow::protocol::EtherType;

#[test]
fn test_known_destination_installs_and_forwards() {
    let h = harness();
    let (a, b) = (host(1), host(2));

    // B announces itself at S2 port 3
    h.pipeline.receive(&ping(b, a), at(S2, 3));
    h.fabric.clear_records();

    let frame = ping(a, b);
    let result = h.pipeline.receive(&frame, at(S1, 1));

    assert_eq!(result, PacketResult::Consumed);

    let programmed = h.fabric.programmed();
    assert_eq!(programmed.len(), 1);
    let (node, rule) = &programmed[0];
    assert_eq!(*node, S2);

    let m = rule.flow_match();
    assert_eq!(m.ether_type, EtherType::Ipv4);
    assert_eq!(m.protocol, Protocol::Icmp);
    assert_eq!((m.src_ip, m.src_mac), (a.ip, a.mac));
    assert_eq!((m.dst_ip, m.dst_mac), (b.ip, b.mac));
    assert_eq!(rule.actions(), &[FlowAction::Output(3)]);
    assert_eq!(rule.idle_timeout(), 30);
    assert_eq!(rule.hard_timeout(), 60);

    let sent = h.fabric.transmitted();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].egress(), at(S2, 3));
    assert_eq!(sent[0].data(), &frame[..]);
}

#[test]
fn test_reply_path_after_both_hosts_learned() {
    let h = harness();
    let (a, b) = (host(1), host(2));

    // Flood, then learn B, then both directions resolve
    assert!(matches!(
        h.pipeline.process(&ping(a, b), at(S1, 1)),
        Disposition::Flooded(_)
    ));
    assert!(matches!(
        h.pipeline.process(&ping(b, a), at(S2, 3)),
        Disposition::Forwarded { egress, .. } if egress == at(S1, 1)
    ));
    assert!(matches!(
        h.pipeline.process(&ping(a, b), at(S1, 1)),
        Disposition::Forwarded { egress, .. } if egress == at(S2, 3)
    ));
    assert_eq!(h.metrics.rules_installed.get(), 2);
}

#[test]
fn test_rejected_rule_drops_frame() {
    let h = harness();
    let (a, b) = (host(1), host(2));
    h.pipeline.receive(&ping(b, a), at(S2, 3));
    h.fabric.clear_records();
    h.fabric.reject_rules(S2);

    let disposition = h.pipeline.process(&ping(a, b), at(S1, 1));

    assert!(matches!(disposition, Disposition::InstallFailed { node, .. } if node == S2));
    assert_eq!(disposition.packet_result(), PacketResult::Ignored);
    assert!(h.fabric.transmitted().is_empty());
    assert!(h.fabric.programmed().is_empty());
    assert_eq!(h.metrics.rule_install_failures.get(), 1);

    // The source was still learned
    assert_eq!(h.pipeline.hosts().len(), 2);

    h.fabric.accept_rules(S2);
    assert!(matches!(
        h.pipeline.process(&ping(a, b), at(S1, 1)),
        Disposition::Forwarded { .. }
    ));
}

#[test]
fn test_forward_failure_keeps_rule() {
    let h = harness();
    let (a, b) = (host(1), host(2));
    h.pipeline.receive(&ping(b, a), at(S2, 3));
    h.fabric.clear_records();
    h.fabric.fail_transmit(at(S2, 3));

    let disposition = h.pipeline.process(&ping(a, b), at(S1, 1));

    assert_eq!(disposition, Disposition::ForwardFailed { egress: at(S2, 3) });
    assert_eq!(h.fabric.programmed().len(), 1);
    assert!(h.fabric.transmitted().is_empty());
    assert_eq!(h.metrics.forward_errors.get(), 1);
}

#[test]
fn test_destination_behind_ingress_port_still_gets_rule() {
    let h = harness();
    let (a, b) = (host(1), host(2));
    h.pipeline.receive(&ping(b, a), at(S1, 1));
    h.fabric.clear_records();

    let disposition = h.pipeline.process(&ping(a, b), at(S1, 1));

    assert!(matches!(disposition, Disposition::Forwarded { egress, .. } if egress == at(S1, 1)));
    assert_eq!(h.fabric.programmed().len(), 1);
}

#[test]
fn test_topology_snapshot_per_decision() {
    let h = harness();
    h.fabric
        .add_link(at(S1, 4), at(S2, 1), vec![EdgeProperty::Bandwidth(1_000_000_000)]);
    let (a, b) = (host(1), host(2));

    h.pipeline.receive(&ping(b, a), at(S2, 3));
    assert_eq!(h.fabric.topology_queries(), 0);

    h.pipeline.receive(&ping(a, b), at(S1, 1));
    h.pipeline.receive(&ping(a, b), at(S1, 1));
    assert_eq!(h.fabric.topology_queries(), 2);
    assert_eq!(h.metrics.topology_snapshots.get(), 2);

    let quiet = harness_with(PipelineConfig {
        snapshot_per_decision: false,
        ..PipelineConfig::default()
    });
    quiet.pipeline.receive(&ping(b, a), at(S2, 3));
    quiet.pipeline.receive(&ping(a, b), at(S1, 1));
    assert_eq!(quiet.fabric.topology_queries(), 0);
    assert_eq!(quiet.fabric.programmed().len(), 1);
}

#[test]
fn test_configured_timeouts_reach_rule() {
    let h = harness_with(PipelineConfig {
        idle_timeout: 5,
        hard_timeout: 0,
        snapshot_per_decision: false,
    });
    let (a, b) = (host(1), host(2));
    h.pipeline.receive(&ping(b, a), at(S2, 3));
    h.pipeline.receive(&ping(a, b), at(S1, 1));

    let (_, rule) = &h.fabric.programmed()[0];
    assert_eq!(rule.idle_timeout(), 5);
    assert_eq!(rule.hard_timeout(), 0);
}

#[test]
fn test_oversized_frame_to_known_host_installs_nothing() {
    let h = harness();
    let (a, b) = (host(1), host(2));
    h.pipeline.receive(&ping(b, a), at(S2, 3));
    h.fabric.clear_records();

    let mut jumbo = ping(a, b);
    jumbo.resize(9000, 0);

    let disposition = h.pipeline.process(&jumbo, at(S1, 1));

    assert!(matches!(
        disposition,
        Disposition::NotApplicable(NotApplicable::Oversized { len: 9000 })
    ));
    assert_eq!(disposition.packet_result(), PacketResult::Ignored);
    assert!(h.fabric.programmed().is_empty());
    assert!(h.fabric.transmitted().is_empty());
    assert_eq!(h.metrics.forward_errors.get(), 0);
}
