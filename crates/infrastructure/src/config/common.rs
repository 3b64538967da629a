//! Shared parsing helpers and the configuration error type.

use std::path::Path;

use tracing::warn;

use domain::rule::entity::Ipv4Cidr;

// ── Config errors ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("invalid CIDR notation '{value}': {reason}")]
    InvalidCidr { value: String, reason: String },

    #[error("invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid gateway '{value}': {reason}")]
    InvalidGateway { value: String, reason: String },

    #[error("invalid value '{value}' for field '{field}': expected one of {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        Self::Yaml(e.to_string())
    }
}

impl ConfigError {
    /// Re-label an error with the config field it came from.
    pub(super) fn at(self, field: impl Into<String>) -> Self {
        match self {
            Self::Validation { .. } | Self::Io(_) | Self::Yaml(_) => self,
            other => Self::Validation {
                field: field.into(),
                message: other.to_string(),
            },
        }
    }
}

// ── Parsing helpers ────────────────────────────────────────────────

/// Parse an IPv4 network like `"192.168.1.0/24"` or `"10.0.0.1"`.
///
/// A missing prefix means `/32`. Host bits are cleared, so
/// `"192.168.1.55/24"` yields `192.168.1.0/24`.
pub fn parse_cidr(s: &str) -> Result<Ipv4Cidr, ConfigError> {
    let (ip_str, prefix_len) = match s.split_once('/') {
        Some((ip, prefix)) => {
            let invalid = || ConfigError::InvalidCidr {
                value: s.to_string(),
                reason: format!("invalid prefix length: '{prefix}'"),
            };
            if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let len = prefix.parse::<u8>().map_err(|_| invalid())?;
            (ip, len)
        }
        None => (s, 32),
    };

    let addr: std::net::Ipv4Addr = ip_str.parse().map_err(|e| ConfigError::InvalidCidr {
        value: s.to_string(),
        reason: format!("invalid IPv4 address: {e}"),
    })?;

    Ipv4Cidr::new(u32::from(addr), prefix_len).map_err(|e| ConfigError::InvalidCidr {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Log a warning if a file is world-readable (Unix only).
///
/// Needs a subscriber to be visible, so callers run it after logging init.
#[cfg(unix)]
pub fn warn_if_world_readable(path: &Path, label: &str) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(metadata) = std::fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o004 != 0 {
            warn!(
                path = %path.display(),
                mode = format!("{mode:04o}"),
                "{label} is world-readable, consider chmod 640 or stricter",
            );
        }
    }
}

#[cfg(not(unix))]
pub fn warn_if_world_readable(_path: &Path, _label: &str) {}

/// Enforce a maximum count on a config collection.
pub(super) fn check_limit(field: &str, count: usize, max: usize) -> Result<(), ConfigError> {
    if count > max {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            message: format!("count {count} exceeds maximum {max}"),
        });
    }
    Ok(())
}
