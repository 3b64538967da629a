use std::net::SocketAddrV4;

use crate::packet::entity::Ipv4Header;
use crate::packet::error::PacketError;

use super::entity::{RouteRule, RouteTable};

/// Route lookup over an immutable route table.
///
/// The engine only decides where a packet goes; shipping it is the
/// caller's job (see the `DatagramSender` port).
#[derive(Debug, Clone, Default)]
pub struct RouteEngine {
    table: RouteTable,
}

impl RouteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: RouteTable) -> Self {
        Self { table }
    }

    /// Find the first route matching a raw IPv4 packet.
    ///
    /// Returns `Ok(None)` when the table is exhausted without a match.
    pub fn lookup(&self, packet: &[u8]) -> Result<Option<&RouteRule>, PacketError> {
        let header = Ipv4Header::parse(packet)?;
        Ok(self.table.first_match(&header))
    }

    /// Append a route from raw addresses and mask words.
    pub fn append_route(
        &mut self,
        src_addr: u32,
        src_mask: u32,
        dst_addr: u32,
        dst_mask: u32,
        gateway: SocketAddrV4,
    ) -> &RouteRule {
        self.table
            .append_raw(gateway, src_addr, src_mask, dst_addr, dst_mask)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn route_count(&self) -> usize {
        self.table.len()
    }
}
