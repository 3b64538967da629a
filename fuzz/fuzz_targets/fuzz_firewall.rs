#![no_main]

use libfuzzer_sys::fuzz_target;

use domain::common::entity::Direction;
use domain::firewall::engine::FirewallEngine;
use domain::firewall::entity::FirewallAction;

// Layout:
//   [0]    = number of rules (0-7)
//   then   = 17-byte rule chunks: action, src, src_mask, dst, dst_mask (BE)
//   rest   = the packet
//
// The engine verdict is checked against a plain first-match scan.
fuzz_target!(|data: &[u8]| {
    let Some((&count, mut rest)) = data.split_first() else {
        return;
    };
    let count = usize::from(count % 8);

    let word = |b: &[u8]| u32::from_be_bytes([b[0], b[1], b[2], b[3]]);

    let mut engine = FirewallEngine::new();
    let mut raw = Vec::new();
    for _ in 0..count {
        if rest.len() < 17 {
            break;
        }
        let (chunk, tail) = rest.split_at(17);
        rest = tail;
        let action = if chunk[0] & 1 == 0 {
            FirewallAction::Allow
        } else {
            FirewallAction::Deny
        };
        let (src, src_mask) = (word(&chunk[1..5]), word(&chunk[5..9]));
        let (dst, dst_mask) = (word(&chunk[9..13]), word(&chunk[13..17]));
        engine.append_rule(Direction::Inbound, action, src, src_mask, dst, dst_mask);
        raw.push((action, src & src_mask, src_mask, dst & dst_mask, dst_mask));
    }

    let packet = rest;
    let verdict = engine.evaluate(Direction::Inbound, packet);
    if packet.len() < 20 {
        assert!(verdict.is_err());
        return;
    }

    let src = word(&packet[12..16]);
    let dst = word(&packet[16..20]);
    let expected = raw
        .iter()
        .find(|(_, s, sm, d, dm)| src & sm == *s && dst & dm == *d)
        .map_or(FirewallAction::Allow, |r| r.0);
    assert_eq!(verdict, Ok(expected));
    assert_eq!(
        engine.evaluate(Direction::Outbound, packet),
        Ok(FirewallAction::Allow)
    );
});
