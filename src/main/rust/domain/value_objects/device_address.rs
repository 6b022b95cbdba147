use std::fmt;

use serde::Serialize;

use crate::domain::errors::{DomainError, Result};

const OCTET_COUNT: usize = 6;

/// Control-plane device address (`AA:BB:CC:DD:EE:FF`), the only lookup key for a device.
///
/// Addresses are normalised to upper case, matching what the control tool prints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = raw.trim();
        if !Self::is_address_shaped(candidate) {
            return Err(DomainError::InvalidDeviceIdentifier(raw.to_string()));
        }
        Ok(Self(candidate.to_ascii_uppercase()))
    }

    /// Six colon-separated pairs of hex digits
    pub fn is_address_shaped(candidate: &str) -> bool {
        let octets: Vec<&str> = candidate.split(':').collect();
        octets.len() == OCTET_COUNT
            && octets
                .iter()
                .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
