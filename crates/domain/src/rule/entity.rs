use std::net::Ipv4Addr;

use crate::packet::entity::Ipv4Header;

use super::error::RuleError;

// ── CIDR mask helpers ───────────────────────────────────────────────

/// Convert an IPv4 prefix length to a bitmask.
/// e.g. 24 -> `0xFFFF_FF00`, 0 -> `0`, 32 (or more) -> `0xFFFF_FFFF`.
pub fn prefix_to_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else if prefix_len >= 32 {
        !0u32
    } else {
        !0u32 << (32 - prefix_len)
    }
}

/// Recover the prefix length of a contiguous mask.
pub fn mask_to_prefix(mask: u32) -> Result<u8, RuleError> {
    (0..=32u8)
        .find(|&prefix_len| prefix_to_mask(prefix_len) == mask)
        .ok_or(RuleError::NonContiguousMask { mask })
}

// ── IPv4 network ────────────────────────────────────────────────────

/// An IPv4 network stored pre-masked (`network == address & mask`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: u32,
    mask: u32,
}

impl Ipv4Cidr {
    /// Build from a host-order address and prefix length (0-32).
    pub fn new(addr: u32, prefix_len: u8) -> Result<Self, RuleError> {
        if prefix_len > 32 {
            return Err(RuleError::InvalidPrefix { prefix_len });
        }
        Ok(Self::from_mask(addr, prefix_to_mask(prefix_len)))
    }

    /// Build from a raw address and a full 32-bit mask word.
    pub fn from_mask(addr: u32, mask: u32) -> Self {
        Self {
            network: addr & mask,
            mask,
        }
    }

    pub fn network(&self) -> u32 {
        self.network
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn prefix_len(&self) -> Result<u8, RuleError> {
        mask_to_prefix(self.mask)
    }

    pub fn contains(&self, ip: u32) -> bool {
        ip & self.mask == self.network
    }
}

impl std::fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let network = Ipv4Addr::from(self.network);
        match self.prefix_len() {
            Ok(prefix_len) => write!(f, "{network}/{prefix_len}"),
            Err(_) => write!(f, "{network}&{}", Ipv4Addr::from(self.mask)),
        }
    }
}

// ── Address match ───────────────────────────────────────────────────

/// Source/destination predicate of a rule. `None` = no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AddressMatch {
    pub src: Option<Ipv4Cidr>,
    pub dst: Option<Ipv4Cidr>,
}

impl AddressMatch {
    /// Matches every packet.
    pub fn any() -> Self {
        Self::default()
    }

    /// Build from raw address/mask words. A zero mask leaves the field
    /// unconstrained.
    pub fn from_raw(src_addr: u32, src_mask: u32, dst_addr: u32, dst_mask: u32) -> Self {
        Self {
            src: (src_mask != 0).then(|| Ipv4Cidr::from_mask(src_addr, src_mask)),
            dst: (dst_mask != 0).then(|| Ipv4Cidr::from_mask(dst_addr, dst_mask)),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.src.is_none() && self.dst.is_none()
    }

    pub fn matches(&self, src_addr: u32, dst_addr: u32) -> bool {
        if let Some(ref cidr) = self.src
            && !cidr.contains(src_addr)
        {
            return false;
        }
        if let Some(ref cidr) = self.dst
            && !cidr.contains(dst_addr)
        {
            return false;
        }
        true
    }
}

impl std::fmt::Display for AddressMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.src {
            Some(cidr) => write!(f, "{cidr}")?,
            None => f.write_str("any")?,
        }
        f.write_str(" -> ")?;
        match self.dst {
            Some(cidr) => write!(f, "{cidr}"),
            None => f.write_str("any"),
        }
    }
}

// ── Rule ────────────────────────────────────────────────────────────

/// A match predicate bound to a target: an action for firewall rules,
/// a gateway for route rules. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<T> {
    matcher: AddressMatch,
    target: T,
}

impl<T> Rule<T> {
    pub fn new(matcher: AddressMatch, target: T) -> Self {
        Self { matcher, target }
    }

    pub fn matcher(&self) -> &AddressMatch {
        &self.matcher
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn matches(&self, header: &Ipv4Header) -> bool {
        self.matcher.matches(header.src_addr, header.dst_addr)
    }
}

// ── Rule chain ──────────────────────────────────────────────────────

/// Ordered, append-only rule list. Evaluation is first-match-wins in
/// insertion order. Rules are never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleChain<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleChain<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a prebuilt rule at the tail and return it.
    pub fn append(&mut self, rule: Rule<T>) -> &Rule<T> {
        self.rules.push(rule);
        let last = self.rules.len() - 1;
        &self.rules[last]
    }

    /// Append a rule from raw (unmasked) addresses and full mask words.
    ///
    /// Networks are masked here so matching is a single AND + compare.
    /// Duplicates and overlaps are accepted; order resolves them.
    pub fn append_raw(
        &mut self,
        target: T,
        src_addr: u32,
        src_mask: u32,
        dst_addr: u32,
        dst_mask: u32,
    ) -> &Rule<T> {
        let matcher = AddressMatch::from_raw(src_addr, src_mask, dst_addr, dst_mask);
        self.append(Rule::new(matcher, target))
    }

    /// First rule matching the header, if any.
    pub fn first_match(&self, header: &Ipv4Header) -> Option<&Rule<T>> {
        self.rules.iter().find(|r| r.matches(header))
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> Default for RuleChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdr(src: u32, dst: u32) -> Ipv4Header {
        Ipv4Header {
            version: 4,
            header_len: 20,
            src_addr: src,
            dst_addr: dst,
        }
    }

    // ── Mask helpers ───────────────────────────────────────────────

    #[test]
    fn prefix_to_mask_edges() {
        assert_eq!(prefix_to_mask(0), 0);
        assert_eq!(prefix_to_mask(1), 0x8000_0000);
        assert_eq!(prefix_to_mask(24), 0xFFFF_FF00);
        assert_eq!(prefix_to_mask(32), 0xFFFF_FFFF);
        assert_eq!(prefix_to_mask(40), 0xFFFF_FFFF);
    }

    #[test]
    fn prefix_round_trips_through_mask() {
        let addr = 0xC0A8_7B2D; // 192.168.123.45
        for p in 1..=32u8 {
            let cidr = Ipv4Cidr::new(addr, p).unwrap();
            let mask = 0xFFFF_FFFFu32 << (32 - u32::from(p));
            assert_eq!(cidr.mask(), mask);
            assert_eq!(cidr.network(), addr & mask);
            assert_eq!(cidr.prefix_len().unwrap(), p);
        }
    }

    #[test]
    fn mask_to_prefix_rejects_holes() {
        assert_eq!(mask_to_prefix(0), Ok(0));
        assert_eq!(
            mask_to_prefix(0xFF00_FF00),
            Err(RuleError::NonContiguousMask { mask: 0xFF00_FF00 })
        );
    }

    #[test]
    fn mask_to_prefix_covers_every_contiguous_mask() {
        assert_eq!(mask_to_prefix(0xFFFF_FFFF), Ok(32));
        assert_eq!(mask_to_prefix(0x8000_0000), Ok(1));
        for p in 0..=32u8 {
            assert_eq!(mask_to_prefix(prefix_to_mask(p)), Ok(p));
        }
        assert!(mask_to_prefix(0x0000_00FF).is_err());
        assert!(mask_to_prefix(0xFFFF_FFFE ^ 0x8000_0000).is_err());
    }

    #[test]
    fn cidr_rejects_prefix_over_32() {
        assert_eq!(
            Ipv4Cidr::new(0, 33),
            Err(RuleError::InvalidPrefix { prefix_len: 33 })
        );
    }

    // ── Ipv4Cidr ───────────────────────────────────────────────────

    #[test]
    fn cidr_subnet_match() {
        // 192.168.1.0/24
        let cidr = Ipv4Cidr::new(0xC0A8_0100, 24).unwrap();
        assert!(cidr.contains(0xC0A8_01FE)); // 192.168.1.254
        assert!(!cidr.contains(0xC0A8_0201)); // 192.168.2.1
    }

    #[test]
    fn cidr_is_stored_masked() {
        let cidr = Ipv4Cidr::from_mask(0x0A00_0011, 0xFFFF_FF00);
        assert_eq!(cidr.network(), 0x0A00_0000);
    }

    #[test]
    fn cidr_display() {
        assert_eq!(Ipv4Cidr::new(0x0A00_0005, 8).unwrap().to_string(), "10.0.0.0/8");
        assert_eq!(
            Ipv4Cidr::from_mask(0x0A0B_0C0D, 0xFF00_FF00).to_string(),
            "10.0.12.0&255.0.255.0"
        );
    }

    // ── AddressMatch ───────────────────────────────────────────────

    #[test]
    fn zero_masks_are_wildcards() {
        let m = AddressMatch::from_raw(0x0A00_0001, 0, 0xC0A8_0001, 0);
        assert!(m.is_wildcard());
        assert!(m.matches(0, 0));
        assert!(m.matches(0xFFFF_FFFF, 0x1234_5678));
    }

    #[test]
    fn network_zero_with_mask_constrains() {
        // 0.0.0.0/8 is a real constraint, not a wildcard.
        let m = AddressMatch::from_raw(0, 0xFF00_0000, 0, 0);
        assert!(!m.is_wildcard());
        assert!(m.matches(0x00AB_CDEF, 1));
        assert!(!m.matches(0x0A00_0001, 1));
    }

    #[test]
    fn both_fields_must_hold() {
        let m = AddressMatch::from_raw(0x0A00_0000, 0xFF00_0000, 0xC0A8_0100, 0xFFFF_FF00);
        assert!(m.matches(0x0A01_0203, 0xC0A8_0109));
        assert!(!m.matches(0x0A01_0203, 0xC0A8_0209));
        assert!(!m.matches(0x0B01_0203, 0xC0A8_0109));
    }

    #[test]
    fn address_match_display() {
        let m = AddressMatch::from_raw(0x0A00_0000, 0xFF00_0000, 0, 0);
        assert_eq!(m.to_string(), "10.0.0.0/8 -> any");
    }

    // ── RuleChain ──────────────────────────────────────────────────

    #[test]
    fn append_preserves_insertion_order() {
        let mut chain = RuleChain::new();
        chain.append_raw('a', 0, 0, 0, 0);
        chain.append_raw('b', 0, 0, 0, 0);
        chain.append_raw('c', 0, 0, 0, 0);
        let targets: Vec<char> = chain.rules().iter().map(|r| *r.target()).collect();
        assert_eq!(targets, vec!['a', 'b', 'c']);
    }

    #[test]
    fn append_returns_new_rule() {
        let mut chain = RuleChain::new();
        let rule = chain.append_raw(7u8, 0x0A00_0011, 0xFFFF_FF00, 0, 0);
        assert_eq!(*rule.target(), 7);
        assert_eq!(rule.matcher().src.unwrap().network(), 0x0A00_0000);
    }

    #[test]
    fn duplicates_are_accepted() {
        let mut chain = RuleChain::new();
        chain.append_raw(1, 0x0A00_0000, 0xFF00_0000, 0, 0);
        chain.append_raw(2, 0x0A00_0000, 0xFF00_0000, 0, 0);
        assert_eq!(chain.len(), 2);
        assert_eq!(*chain.first_match(&hdr(0x0A00_0001, 0)).unwrap().target(), 1);
    }

    #[test]
    fn first_match_skips_non_matching() {
        let mut chain = RuleChain::new();
        chain.append_raw("lan", 0xC0A8_0100, 0xFFFF_FF00, 0, 0);
        chain.append_raw("ten", 0x0A00_0000, 0xFF00_0000, 0, 0);
        let hit = chain.first_match(&hdr(0x0A00_0005, 0x0808_0808)).unwrap();
        assert_eq!(*hit.target(), "ten");
        assert!(chain.first_match(&hdr(0xAC10_0001, 0)).is_none());
    }

    #[test]
    fn empty_chain_matches_nothing() {
        let chain: RuleChain<()> = RuleChain::default();
        assert!(chain.is_empty());
        assert!(chain.first_match(&hdr(1, 2)).is_none());
    }
}
