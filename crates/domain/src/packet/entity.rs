use super::error::PacketError;

/// Minimum IPv4 header size (IHL = 5, no options).
pub const IPV4_MIN_HEADER_LEN: usize = 20;

const VERSION_IHL_OFFSET: usize = 0;
const SRC_ADDR_OFFSET: usize = 12;
const DST_ADDR_OFFSET: usize = 16;

/// Addressing fields decoded from the front of a raw IPv4 datagram.
///
/// Source and destination sit at bytes 12..16 and 16..20, ahead of any
/// options, so IHL never moves them. Addresses are host-order `u32`.
/// Version and header length are decoded for diagnostics only: the
/// classifier does not reject packets on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    /// IHL in bytes (`ihl * 4`).
    pub header_len: usize,
    pub src_addr: u32,
    pub dst_addr: u32,
}

impl Ipv4Header {
    /// Decode the header fields used for rule matching.
    ///
    /// Fails with `PacketError::Truncated` when fewer than 20 bytes are
    /// available.
    pub fn parse(packet: &[u8]) -> Result<Self, PacketError> {
        let truncated = PacketError::Truncated {
            len: packet.len(),
            min: IPV4_MIN_HEADER_LEN,
        };
        if packet.len() < IPV4_MIN_HEADER_LEN {
            return Err(truncated);
        }

        let version_ihl = *packet.get(VERSION_IHL_OFFSET).ok_or(truncated)?;
        let src_addr = read_u32_be(packet, SRC_ADDR_OFFSET).ok_or(truncated)?;
        let dst_addr = read_u32_be(packet, DST_ADDR_OFFSET).ok_or(truncated)?;

        Ok(Self {
            version: version_ihl >> 4,
            header_len: usize::from(version_ihl & 0x0F) * 4,
            src_addr,
            dst_addr,
        })
    }

    /// `true` when the IHL field announces options beyond the fixed header.
    pub fn has_options(&self) -> bool {
        self.header_len > IPV4_MIN_HEADER_LEN
    }
}

fn read_u32_be(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}
