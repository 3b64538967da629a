use crate::common::entity::Direction;
use crate::packet::entity::Ipv4Header;
use crate::packet::error::PacketError;
use crate::rule::entity::Ipv4Cidr;

use super::entity::{FirewallAction, FirewallChain, FirewallRule};

/// Per-direction firewall chains.
///
/// Built once at startup through `append_rule`, then only read. Evaluation
/// returns the action of the first matching rule in insertion order, or
/// `Allow` when nothing matches.
#[derive(Debug, Clone, Default)]
pub struct FirewallEngine {
    inbound: FirewallChain,
    outbound: FirewallChain,
}

impl FirewallEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from two prepared chains.
    pub fn from_chains(inbound: FirewallChain, outbound: FirewallChain) -> Self {
        Self { inbound, outbound }
    }

    /// Evaluate a raw IPv4 packet against the chain for `direction`.
    pub fn evaluate(
        &self,
        direction: Direction,
        packet: &[u8],
    ) -> Result<FirewallAction, PacketError> {
        Self::evaluate_chain(self.chain(direction), packet)
    }

    /// Evaluate a raw IPv4 packet against an arbitrary chain.
    ///
    /// Fails only when the packet is shorter than an IPv4 header.
    pub fn evaluate_chain(
        chain: &FirewallChain,
        packet: &[u8],
    ) -> Result<FirewallAction, PacketError> {
        let header = Ipv4Header::parse(packet)?;
        Ok(Self::evaluate_header(chain, &header))
    }

    /// Evaluate already-decoded addressing fields. Default-allow.
    pub fn evaluate_header(chain: &FirewallChain, header: &Ipv4Header) -> FirewallAction {
        chain
            .first_match(header)
            .map_or(FirewallAction::Allow, |r| *r.target())
    }

    /// Append a rule from raw addresses and mask words.
    pub fn append_rule(
        &mut self,
        direction: Direction,
        action: FirewallAction,
        src_addr: u32,
        src_mask: u32,
        dst_addr: u32,
        dst_mask: u32,
    ) -> &FirewallRule {
        self.chain_mut(direction)
            .append_raw(action, src_addr, src_mask, dst_addr, dst_mask)
    }

    /// Append a rule from typed networks (`None` = any).
    pub fn append_cidr(
        &mut self,
        direction: Direction,
        action: FirewallAction,
        src: Option<Ipv4Cidr>,
        dst: Option<Ipv4Cidr>,
    ) -> &FirewallRule {
        let (src_addr, src_mask) = src.map_or((0, 0), |c| (c.network(), c.mask()));
        let (dst_addr, dst_mask) = dst.map_or((0, 0), |c| (c.network(), c.mask()));
        self.append_rule(direction, action, src_addr, src_mask, dst_addr, dst_mask)
    }

    pub fn chain(&self, direction: Direction) -> &FirewallChain {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }

    fn chain_mut(&mut self, direction: Direction) -> &mut FirewallChain {
        match direction {
            Direction::Inbound => &mut self.inbound,
            Direction::Outbound => &mut self.outbound,
        }
    }

    /// Total rules across both directions.
    pub fn rule_count(&self) -> usize {
        self.inbound.len() + self.outbound.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Test helpers ───────────────────────────────────────────────

    fn packet(src: [u8; 4], dst: [u8; 4]) -> Vec<u8> {
        let mut pkt = vec![0u8; 40];
        pkt[0] = 0x45;
        pkt[9] = 6;
        pkt[12..16].copy_from_slice(&src);
        pkt[16..20].copy_from_slice(&dst);
        pkt
    }

    fn cidr(addr: u32, prefix_len: u8) -> Option<Ipv4Cidr> {
        Some(Ipv4Cidr::new(addr, prefix_len).unwrap())
    }

    // ── Malformed input ────────────────────────────────────────────

    #[test]
    fn short_packets_are_malformed_regardless_of_rules() {
        let mut engine = FirewallEngine::new();
        engine.append_rule(Direction::Inbound, FirewallAction::Deny, 0, 0, 0, 0);
        for len in [0, 1, 12, 19] {
            let pkt = vec![0x45u8; len];
            assert!(engine.evaluate(Direction::Inbound, &pkt).is_err());
            assert!(engine.evaluate(Direction::Outbound, &pkt).is_err());
        }
    }

    // ── Default policy ─────────────────────────────────────────────

    #[test]
    fn empty_chain_allows() {
        let engine = FirewallEngine::new();
        let pkt = packet([10, 0, 0, 1], [10, 0, 0, 2]);
        assert_eq!(
            engine.evaluate(Direction::Inbound, &pkt),
            Ok(FirewallAction::Allow)
        );
        assert_eq!(
            engine.evaluate(Direction::Outbound, &pkt),
            Ok(FirewallAction::Allow)
        );
    }

    #[test]
    fn no_match_falls_through_to_allow() {
        let mut engine = FirewallEngine::new();
        engine.append_cidr(
            Direction::Inbound,
            FirewallAction::Deny,
            cidr(0xC0A8_0000, 16),
            None,
        );
        let pkt = packet([10, 1, 1, 1], [10, 0, 0, 2]);
        assert_eq!(
            engine.evaluate(Direction::Inbound, &pkt),
            Ok(FirewallAction::Allow)
        );
    }

    // ── Ordering ───────────────────────────────────────────────────

    #[test]
    fn first_match_wins_over_more_specific() {
        let mut engine = FirewallEngine::new();
        engine.append_cidr(
            Direction::Inbound,
            FirewallAction::Deny,
            cidr(0x0A00_0000, 8),
            None,
        );
        engine.append_cidr(
            Direction::Inbound,
            FirewallAction::Allow,
            cidr(0x0A00_0000, 24),
            None,
        );
        let pkt = packet([10, 0, 0, 5], [1, 1, 1, 1]);
        assert_eq!(
            engine.evaluate(Direction::Inbound, &pkt),
            Ok(FirewallAction::Deny)
        );
    }

    #[test]
    fn bare_deny_blocks_everything() {
        let mut engine = FirewallEngine::new();
        engine.append_rule(Direction::Outbound, FirewallAction::Deny, 0, 0, 0, 0);
        for (src, dst) in [
            ([0, 0, 0, 0], [0, 0, 0, 0]),
            ([10, 0, 0, 1], [8, 8, 8, 8]),
            ([255, 255, 255, 255], [192, 168, 1, 1]),
        ] {
            assert_eq!(
                engine.evaluate(Direction::Outbound, &packet(src, dst)),
                Ok(FirewallAction::Deny)
            );
        }
    }

    // ── Masking ────────────────────────────────────────────────────

    #[test]
    fn subnet_masking() {
        let mut engine = FirewallEngine::new();
        // Raw address is un-masked; engine must mask it on insert.
        engine.append_rule(
            Direction::Inbound,
            FirewallAction::Deny,
            0xC0A8_0137,
            0xFFFF_FF00,
            0,
            0,
        );
        assert_eq!(
            engine.evaluate(Direction::Inbound, &packet([192, 168, 1, 254], [1, 2, 3, 4])),
            Ok(FirewallAction::Deny)
        );
        assert_eq!(
            engine.evaluate(Direction::Inbound, &packet([192, 168, 2, 1], [1, 2, 3, 4])),
            Ok(FirewallAction::Allow)
        );
    }

    #[test]
    fn destination_constraint() {
        let mut engine = FirewallEngine::new();
        engine.append_cidr(
            Direction::Outbound,
            FirewallAction::Deny,
            None,
            cidr(0x0808_0808, 32),
        );
        assert_eq!(
            engine.evaluate(Direction::Outbound, &packet([10, 0, 0, 1], [8, 8, 8, 8])),
            Ok(FirewallAction::Deny)
        );
        assert_eq!(
            engine.evaluate(Direction::Outbound, &packet([10, 0, 0, 1], [8, 8, 4, 4])),
            Ok(FirewallAction::Allow)
        );
    }

    // ── Directions ─────────────────────────────────────────────────

    #[test]
    fn directions_are_independent() {
        let mut engine = FirewallEngine::new();
        engine.append_rule(Direction::Inbound, FirewallAction::Deny, 0, 0, 0, 0);
        let pkt = packet([10, 0, 0, 1], [10, 0, 0, 2]);
        assert_eq!(
            engine.evaluate(Direction::Inbound, &pkt),
            Ok(FirewallAction::Deny)
        );
        assert_eq!(
            engine.evaluate(Direction::Outbound, &pkt),
            Ok(FirewallAction::Allow)
        );
        assert_eq!(engine.chain(Direction::Inbound).len(), 1);
        assert!(engine.chain(Direction::Outbound).is_empty());
        assert_eq!(engine.rule_count(), 1);
    }

    #[test]
    fn evaluate_does_not_touch_packet() {
        let mut engine = FirewallEngine::new();
        engine.append_rule(Direction::Inbound, FirewallAction::Deny, 0, 0, 0, 0);
        let pkt = packet([10, 0, 0, 1], [10, 0, 0, 2]);
        let before = pkt.clone();
        let _ = engine.evaluate(Direction::Inbound, &pkt);
        assert_eq!(pkt, before);
    }

    #[test]
    fn engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FirewallEngine>();
    }
}
