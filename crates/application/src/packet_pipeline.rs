use std::net::SocketAddrV4;
use std::sync::Arc;

use domain::common::entity::Direction;
use domain::firewall::entity::FirewallAction;

use crate::firewall_service_impl::FirewallAppService;
use crate::routing_service_impl::{RouteVerdict, RoutingAppService};

/// Why a packet was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    Denied,
}

/// What the packet pump should do with a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    Drop(DropReason),
    /// Already handed to a gateway; do not deliver locally.
    Routed(SocketAddrV4),
    /// Deliver through the normal path.
    Deliver,
}

/// Per-packet decision sequence used by the packet pump.
///
/// The firewall chain for the direction runs first. Outbound packets that
/// pass are then offered to the route table when routing is enabled.
pub struct PacketFilter {
    firewall: Arc<FirewallAppService>,
    routing: Option<Arc<RoutingAppService>>,
}

impl PacketFilter {
    pub fn new(
        firewall: Arc<FirewallAppService>,
        routing: Option<Arc<RoutingAppService>>,
    ) -> Self {
        Self { firewall, routing }
    }

    pub fn process(&self, direction: Direction, packet: &[u8]) -> PacketDisposition {
        match self.firewall.check(direction, packet) {
            Err(_) => return PacketDisposition::Drop(DropReason::Malformed),
            Ok(FirewallAction::Deny) => return PacketDisposition::Drop(DropReason::Denied),
            Ok(FirewallAction::Allow) => {}
        }

        if direction == Direction::Outbound
            && let Some(routing) = &self.routing
        {
            return match routing.check_route(packet) {
                Ok(RouteVerdict::Forwarded { gateway, .. }) => PacketDisposition::Routed(gateway),
                Ok(RouteVerdict::NoRoute) => PacketDisposition::Deliver,
                Err(_) => PacketDisposition::Drop(DropReason::Malformed),
            };
        }
        PacketDisposition::Deliver
    }

    pub fn firewall(&self) -> &FirewallAppService {
        &self.firewall
    }

    pub fn routing(&self) -> Option<&RoutingAppService> {
        self.routing.as_deref()
    }
}
