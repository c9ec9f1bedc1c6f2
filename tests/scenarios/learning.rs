//! Host location learning

use super::common::{at, harness, host, ping, udp, S1, S2};
use learnflow::dataplane::{AttachmentKey, Disposition, PacketResult};
use learnflow::protocol::MacAddr;
use std::sync::Arc;
use std::thread;

#[test]
fn test_source_is_learned_at_ingress() {
    let h = harness();
    let (a, b) = (host(1), host(2));

    h.pipeline.receive(&ping(a, b), at(S1, 1));

    assert_eq!(
        h.pipeline.hosts().lookup(&AttachmentKey::new(a.ip, a.mac)),
        Some(at(S1, 1))
    );
    assert_eq!(h.pipeline.hosts().len(), 1);
}

#[test]
fn test_host_move_last_write_wins() {
    let h = harness();
    let (a, b) = (host(1), host(2));
    let key = AttachmentKey::new(a.ip, a.mac);

    h.pipeline.receive(&ping(a, b), at(S1, 1));
    h.pipeline.receive(&ping(a, b), at(S2, 2));

    assert_eq!(h.pipeline.hosts().lookup(&key), Some(at(S2, 2)));
    assert_eq!(h.pipeline.hosts().len(), 1);
    assert_eq!(h.metrics.hosts_learned.get(), 1);
    assert_eq!(h.metrics.host_moves.get(), 1);
}

#[test]
fn test_group_mac_source_is_learned_and_reachable() {
    let h = harness();
    let b = host(2);
    let mut a = host(9);
    a.mac = MacAddr([0x03, 0, 0, 0, 0, 0x09]);

    h.pipeline.receive(&ping(a, b), at(S1, 1));
    assert_eq!(
        h.pipeline.hosts().lookup(&AttachmentKey::new(a.ip, a.mac)),
        Some(at(S1, 1))
    );

    let reply = h.pipeline.process(&ping(b, a), at(S1, 2));
    assert!(matches!(reply, Disposition::Forwarded { egress, .. } if egress == at(S1, 1)));
    assert_eq!(h.fabric.programmed().len(), 1);
}

#[test]
fn test_same_ip_different_mac_are_distinct_hosts() {
    let h = harness();
    let a = host(1);
    let mut clone = a;
    clone.mac = MacAddr([0x02, 0, 0, 0, 0, 0x99]);

    h.pipeline.receive(&ping(a, host(2)), at(S1, 1));
    h.pipeline.receive(&ping(clone, host(2)), at(S1, 2));

    assert_eq!(h.pipeline.hosts().len(), 2);
}

#[test]
fn test_non_icmp_is_neither_learned_nor_consumed() {
    let h = harness();

    let result = h.pipeline.receive(&udp(host(1), host(2)), at(S1, 1));

    assert_eq!(result, PacketResult::Ignored);
    assert!(h.pipeline.hosts().is_empty());
    assert!(h.fabric.transmitted().is_empty());
    assert!(h.fabric.programmed().is_empty());
}

#[test]
fn test_garbage_is_ignored() {
    let h = harness();

    for raw in [vec![], vec![0u8; 10], vec![0xffu8; 60]] {
        let disposition = h.pipeline.process(&raw, at(S1, 1));
        assert!(matches!(disposition, Disposition::NotApplicable(_)));
    }
    assert!(h.pipeline.hosts().is_empty());
    assert_eq!(h.metrics.frames_ignored.get(), 3);
}

#[test]
fn test_concurrent_receive_learns_every_host() {
    let h = Arc::new(harness());

    thread::scope(|s| {
        for n in 1..=16u8 {
            let h = Arc::clone(&h);
            s.spawn(move || {
                let port = u32::from(n % 4) + 1;
                for _ in 0..50 {
                    h.pipeline.receive(&ping(host(n), host(200)), at(S1, port));
                }
            });
        }
    });

    assert_eq!(h.pipeline.hosts().len(), 16);
    for n in 1..=16u8 {
        let a = host(n);
        assert_eq!(
            h.pipeline.hosts().lookup(&AttachmentKey::new(a.ip, a.mac)),
            Some(at(S1, u32::from(n % 4) + 1))
        );
    }
    assert_eq!(h.metrics.frames_received.get(), 16 * 50);
    assert_eq!(h.metrics.hosts_learned.get(), 16);
}
