//! Unknown destinations

use super::common::{at, harness, host, ping, S1};
use learnflow::dataplane::{AttachmentPoint, Disposition, PacketResult};

fn ports_sent(h: &super::common::Harness) -> Vec<AttachmentPoint> {
    let mut ports: Vec<_> = h.fabric.transmitted().iter().map(|f| f.egress()).collect();
    ports.sort();
    ports
}

#[test]
fn test_unknown_destination_floods_except_ingress() {
    let h = harness();
    let frame = ping(host(1), host(2));

    let result = h.pipeline.receive(&frame, at(S1, 2));

    assert_eq!(result, PacketResult::Consumed);
    assert_eq!(ports_sent(&h), vec![at(S1, 1), at(S1, 3), at(S1, 4)]);
    assert!(h.fabric.programmed().is_empty());
    for sent in h.fabric.transmitted() {
        assert_eq!(sent.data(), &frame[..]);
    }
}

#[test]
fn test_flood_skips_down_ports() {
    let h = harness();
    h.fabric.set_port_up(at(S1, 4), false).unwrap();

    h.pipeline.receive(&ping(host(1), host(2)), at(S1, 1));

    assert_eq!(ports_sent(&h), vec![at(S1, 2), at(S1, 3)]);
}

#[test]
fn test_flood_count_when_ingress_is_not_active() {
    let h = harness();
    h.fabric.set_port_up(at(S1, 1), false).unwrap();

    // Ingress is not among the active ports, so every active port gets a copy
    h.pipeline.receive(&ping(host(1), host(2)), at(S1, 1));

    assert_eq!(h.fabric.transmitted().len(), 3);
}

#[test]
fn test_flood_continues_past_failing_port() {
    let h = harness();
    h.fabric.fail_transmit(at(S1, 3));

    let disposition = h.pipeline.process(&ping(host(1), host(2)), at(S1, 1));

    match disposition {
        Disposition::Flooded(report) => {
            assert_eq!(report.node, S1);
            assert_eq!(report.sent, vec![2, 4]);
            assert_eq!(report.skipped, vec![3]);
        }
        other => panic!("expected flood, got {:?}", other),
    }
    assert_eq!(h.metrics.flood_port_errors.get(), 1);
    assert_eq!(h.metrics.flood_transmits.get(), 2);
}

#[test]
fn test_flood_on_unknown_switch_sends_nothing() {
    let h = harness();

    let disposition = h
        .pipeline
        .process(&ping(host(1), host(2)), at(learnflow::dataplane::NodeId(9), 1));

    assert!(matches!(disposition, Disposition::Flooded(ref r) if r.sent.is_empty()));
    assert!(h.fabric.transmitted().is_empty());
}
