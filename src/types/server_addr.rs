// ABOUTME: IPv4 address validation for the deployment target.
// ABOUTME: Accepts exactly four dot-separated decimal octets in 0..=255.

use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerAddrError {
    #[error("expected four dot-separated octets, found {0}")]
    OctetCount(usize),

    #[error("octet '{0}' is not a decimal number")]
    NotNumeric(String),

    #[error("octet '{0}' is out of range (0-255)")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerAddr(Ipv4Addr);

impl ServerAddr {
    /// Parse dot-decimal notation. Leading zeros are tolerated (`010` is 10);
    /// signs, whitespace and empty octets are not.
    pub fn parse(value: &str) -> Result<Self, ServerAddrError> {
        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() != 4 {
            return Err(ServerAddrError::OctetCount(parts.len()));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ServerAddrError::NotNumeric(part.to_string()));
            }
            *slot = part
                .parse::<u8>()
                .map_err(|_| ServerAddrError::OutOfRange(part.to_string()))?;
        }

        Ok(Self(Ipv4Addr::from(octets)))
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_address() {
        let addr = ServerAddr::parse("203.0.113.7").unwrap();
        assert_eq!(addr.to_string(), "203.0.113.7");
    }

    #[test]
    fn leading_zeros_are_normalised() {
        let addr = ServerAddr::parse("010.000.000.001").unwrap();
        assert_eq!(addr.to_string(), "10.0.0.1");
    }

    #[test]
    fn rejects_hostnames_and_partial_addresses() {
        assert!(matches!(
            ServerAddr::parse("example.com"),
            Err(ServerAddrError::OctetCount(2))
        ));
        assert!(matches!(
            ServerAddr::parse("10.0.0"),
            Err(ServerAddrError::OctetCount(3))
        ));
        assert!(matches!(
            ServerAddr::parse("10..0.1"),
            Err(ServerAddrError::NotNumeric(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_octet() {
        assert_eq!(
            ServerAddr::parse("10.0.0.256"),
            Err(ServerAddrError::OutOfRange("256".to_string()))
        );
    }
}
