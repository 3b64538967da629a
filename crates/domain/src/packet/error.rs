use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("truncated IPv4 packet: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },
}
