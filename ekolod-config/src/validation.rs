//! Custom validation functions for configuration.
//!
//! Shared validation logic used across the configuration modules.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref HOST_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]*$").expect("host regex must compile");
}

/// Validate that a host is a plausible IPv4 address or hostname.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    if !host.is_empty() && host.len() <= 253 && HOST_RE.is_match(host) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_host"))
    }
}

/// Validate that a port base leaves room for derived per-node ports.
pub fn validate_port_base(base: u16) -> Result<(), ValidationError> {
    // Nodes are numbered from 1; the base itself is never bound directly.
    if base >= 1024 && base < u16::MAX - 512 {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_port_base"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_loopback_and_hostnames() {
        assert!(validate_host("127.0.0.1").is_ok());
        assert!(validate_host("sim-host.local").is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_hosts() {
        assert!(validate_host("").is_err());
        assert!(validate_host("host name").is_err());
    }

    #[test]
    fn rejects_privileged_port_bases() {
        assert!(validate_port_base(80).is_err());
        assert!(validate_port_base(4000).is_ok());
    }
}
