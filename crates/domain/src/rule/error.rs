use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid CIDR prefix length: {prefix_len} (must be 0-32)")]
    InvalidPrefix { prefix_len: u8 },

    #[error("mask {mask:#010x} is not a contiguous CIDR prefix")]
    NonContiguousMask { mask: u32 },
}
