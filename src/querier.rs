//! Boundary to the DNS query collaborator.
//!
//! The validation core never talks to the network itself. It is handed a
//! [`DnsQuerier`] at construction time and asks it for presentation-format
//! records one `(name, type)` pair at a time. Picking the transport (a
//! stub resolver, a `dig` subprocess, a fixture in tests) is left to the
//! composition root.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::error::QueryError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum RecordType {
    A,
    NS,
    SOA,
    AAAA,
    DS,
    RRSIG,
    DNSKEY,
    Unknown(u16),
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            2 => RecordType::NS,
            6 => RecordType::SOA,
            28 => RecordType::AAAA,
            43 => RecordType::DS,
            46 => RecordType::RRSIG,
            48 => RecordType::DNSKEY,
            x => RecordType::Unknown(x),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::SOA => 6,
            RecordType::AAAA => 28,
            RecordType::DS => 43,
            RecordType::RRSIG => 46,
            RecordType::DNSKEY => 48,
            RecordType::Unknown(x) => x,
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::DS => write!(f, "DS"),
            RecordType::RRSIG => write!(f, "RRSIG"),
            RecordType::DNSKEY => write!(f, "DNSKEY"),
            RecordType::Unknown(x) => write!(f, "TYPE{}", x),
        }
    }
}

/// A resource record as returned by the querier, RDATA still in text form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    /// Owner name
    pub name: String,
    /// Type of this record (RRSIGs arrive next to the records they cover)
    pub record_type: RecordType,
    /// Presentation-format RDATA, e.g. `257 3 8 AwEAAa...`
    pub value: String,
    /// TTL in seconds
    pub ttl: u32,
}

impl RawRecord {
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl,
        }
    }
}

/// Resolves a name and record type to raw records.
///
/// Implementations should request DNSSEC-aware answers so that RRSIG
/// records covering the answer are included in the returned set.
#[async_trait]
pub trait DnsQuerier: Send + Sync {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<RawRecord>, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_numbers() {
        assert_eq!(RecordType::from(48), RecordType::DNSKEY);
        assert_eq!(RecordType::from(43), RecordType::DS);
        assert_eq!(u16::from(RecordType::RRSIG), 46);
        assert_eq!(RecordType::from(99), RecordType::Unknown(99));
        assert_eq!(u16::from(RecordType::Unknown(99)), 99);
    }

    #[test]
    fn test_record_type_display() {
        assert_eq!(RecordType::DNSKEY.to_string(), "DNSKEY");
        assert_eq!(RecordType::Unknown(65).to_string(), "TYPE65");
    }
}
