use std::net::SocketAddrV4;

use crate::rule::entity::{Rule, RuleChain};

/// A route rule: packets matching the predicate are shipped verbatim to
/// `gateway` inside a UDP datagram.
pub type RouteRule = Rule<SocketAddrV4>;

/// The route table, read-only once built and shared by every packet thread.
pub type RouteTable = RuleChain<SocketAddrV4>;

impl RouteRule {
    pub fn gateway(&self) -> SocketAddrV4 {
        *self.target()
    }
}
