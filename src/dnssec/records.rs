//! Typed DNSKEY, DS and RRSIG records parsed from presentation-format RDATA.
//!
//! Parsing is tolerant in the way `dig` output requires: comments after `;`
//! are split off (and mined for `key id = N`), parentheses from `+multi`
//! output are dropped, and base64/hex payloads split over several chunks are
//! joined. A record that still cannot be parsed is skipped by the batch
//! helpers; it never fails the whole response.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use super::constants::{KSK_FLAGS, SEP_FLAG, ZSK_FLAGS};
use super::{DigestType, DnsSecAlgorithm, key_tag_from_base64};
use crate::querier::{RawRecord, RecordType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordParseError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid signature timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("public key is not valid base64")]
    InvalidBase64,

    #[error("digest is not valid hex")]
    InvalidHex,
}

/// DNSKEY record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnskeyRecord {
    /// 256 = ZSK, 257 = KSK
    pub flags: u16,
    /// Always 3 for DNSSEC
    pub protocol: u8,
    pub algorithm: DnsSecAlgorithm,
    pub key_tag: u16,
    /// Base64 public key, whitespace removed
    pub public_key: String,
    pub ttl: u32,
}

impl DnskeyRecord {
    /// Parse DNSKEY RDATA: `flags protocol algorithm public-key`
    pub fn parse(value: &str, ttl: u32) -> Result<Self, RecordParseError> {
        let (data, comment) = split_comments(value);
        let fields: Vec<&str> = data.split_whitespace().collect();
        require_fields(&fields, 4)?;

        let flags = parse_number::<u16>(fields[0], "flags")?;
        let protocol = parse_number::<u8>(fields[1], "protocol")?;
        let algorithm_number = parse_number::<u8>(fields[2], "algorithm")?;
        let public_key = fields[3..].concat();

        let key_tag = match key_id_from_comment(&comment) {
            Some(tag) => tag,
            None => key_tag_from_base64(flags, protocol, algorithm_number, &public_key)
                .map_err(|_| RecordParseError::InvalidBase64)?,
        };

        Ok(Self {
            flags,
            protocol,
            algorithm: DnsSecAlgorithm::from_u8(algorithm_number),
            key_tag,
            public_key,
            ttl,
        })
    }

    /// Check if this is a Key Signing Key (flags == 257)
    pub fn is_key_signing_key(&self) -> bool {
        self.flags == KSK_FLAGS
    }

    /// Check if this is a Zone Signing Key (flags == 256)
    pub fn is_zone_signing_key(&self) -> bool {
        self.flags == ZSK_FLAGS
    }

    /// Secure Entry Point bit
    pub fn is_sep(&self) -> bool {
        self.flags & SEP_FLAG != 0
    }
}

/// DS (Delegation Signer) record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: DnsSecAlgorithm,
    pub digest_type: DigestType,
    /// Lowercase hex digest
    pub digest: String,
    pub ttl: u32,
}

impl DsRecord {
    /// Parse DS RDATA: `key-tag algorithm digest-type digest`
    pub fn parse(value: &str, ttl: u32) -> Result<Self, RecordParseError> {
        let (data, _) = split_comments(value);
        let fields: Vec<&str> = data.split_whitespace().collect();
        require_fields(&fields, 4)?;

        let key_tag = parse_number::<u16>(fields[0], "key tag")?;
        let algorithm = parse_number::<u8>(fields[1], "algorithm")?;
        let digest_type = parse_number::<u8>(fields[2], "digest type")?;
        let digest = fields[3..].concat().to_ascii_lowercase();

        if hex::decode(&digest).is_err() {
            return Err(RecordParseError::InvalidHex);
        }

        Ok(Self {
            key_tag,
            algorithm: DnsSecAlgorithm::from_u8(algorithm),
            digest_type: DigestType::from_u8(digest_type),
            digest,
            ttl,
        })
    }

    /// Whether the digest has the length its digest type prescribes.
    /// Unknown digest types are never flagged.
    pub fn digest_len_matches(&self) -> bool {
        match self.digest_type.digest_len() {
            Some(len) => self.digest.len() == len * 2,
            None => true,
        }
    }
}

/// RRSIG (Resource Record Signature) record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrsigRecord {
    /// Covered type mnemonic, e.g. `A` or `DNSKEY`
    pub type_covered: String,
    pub algorithm: DnsSecAlgorithm,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: DateTime<Utc>,
    pub signature_inception: DateTime<Utc>,
    /// Key tag of the signing DNSKEY
    pub key_tag: u16,
    pub signer_name: String,
    pub signature: String,
    pub ttl: u32,
}

impl RrsigRecord {
    /// Parse RRSIG RDATA:
    /// `type algorithm labels original-ttl expiration inception key-tag signer signature`
    pub fn parse(value: &str, ttl: u32) -> Result<Self, RecordParseError> {
        let (data, _) = split_comments(value);
        let fields: Vec<&str> = data.split_whitespace().collect();
        require_fields(&fields, 9)?;

        Ok(Self {
            type_covered: fields[0].to_ascii_uppercase(),
            algorithm: DnsSecAlgorithm::from_u8(parse_number::<u8>(fields[1], "algorithm")?),
            labels: parse_number::<u8>(fields[2], "labels")?,
            original_ttl: parse_number::<u32>(fields[3], "original TTL")?,
            signature_expiration: parse_signature_time(fields[4])?,
            signature_inception: parse_signature_time(fields[5])?,
            key_tag: parse_number::<u16>(fields[6], "key tag")?,
            signer_name: fields[7].to_string(),
            signature: fields[8..].concat(),
            ttl,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.signature_expiration
    }

    pub fn is_not_yet_valid(&self) -> bool {
        self.is_not_yet_valid_at(Utc::now())
    }

    pub fn is_not_yet_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.signature_inception
    }

    /// Whole days left before the signature expires, 0 once expired
    pub fn days_until_expiry(&self) -> i64 {
        self.days_until_expiry_at(Utc::now())
    }

    pub fn days_until_expiry_at(&self, now: DateTime<Utc>) -> i64 {
        if self.is_expired_at(now) {
            return 0;
        }
        (self.signature_expiration - now).num_days()
    }
}

/// Parse all DNSKEY records in a response, skipping malformed ones
pub fn parse_dnskey_records(records: &[RawRecord]) -> Vec<DnskeyRecord> {
    parse_records(records, RecordType::DNSKEY, DnskeyRecord::parse)
}

/// Parse all DS records in a response, skipping malformed ones
pub fn parse_ds_records(records: &[RawRecord]) -> Vec<DsRecord> {
    parse_records(records, RecordType::DS, DsRecord::parse)
}

/// Parse all RRSIG records in a response, skipping malformed ones
pub fn parse_rrsig_records(records: &[RawRecord]) -> Vec<RrsigRecord> {
    parse_records(records, RecordType::RRSIG, RrsigRecord::parse)
}

fn parse_records<T>(
    records: &[RawRecord],
    record_type: RecordType,
    parse: fn(&str, u32) -> Result<T, RecordParseError>,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.record_type == record_type)
        .filter_map(|r| match parse(&r.value, r.ttl) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                trace!("Skipping malformed {} record for {}: {}", record_type, r.name, e);
                None
            }
        })
        .collect()
}

/// Split RDATA into its data part and the concatenated `;` comments.
/// Comments run to end of line; parentheses are treated as whitespace.
fn split_comments(value: &str) -> (String, String) {
    let mut data = String::with_capacity(value.len());
    let mut comment = String::new();

    for line in value.lines() {
        let (line_data, line_comment) = match line.find(';') {
            Some(pos) => (&line[..pos], &line[pos..]),
            None => (line, ""),
        };
        data.push_str(line_data);
        data.push(' ');
        comment.push_str(line_comment);
        comment.push(' ');
    }

    (data.replace(['(', ')'], " "), comment)
}

/// `dig +multi` annotates DNSKEYs with `; key id = 20326`
fn key_id_from_comment(comment: &str) -> Option<u16> {
    let pos = comment.find("key id =")?;
    comment[pos + "key id =".len()..]
        .split_whitespace()
        .next()
        .map(|token| token.trim_end_matches(|c: char| !c.is_ascii_digit()))
        .and_then(|token| token.parse::<u16>().ok())
}

fn require_fields(fields: &[&str], expected: usize) -> Result<(), RecordParseError> {
    if fields.len() < expected {
        return Err(RecordParseError::MissingFields {
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
) -> Result<T, RecordParseError> {
    value.parse::<T>().map_err(|_| RecordParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// RFC 4034 3.2: `YYYYMMDDHHmmSS` in UTC, or seconds since the epoch
fn parse_signature_time(value: &str) -> Result<DateTime<Utc>, RecordParseError> {
    let invalid = || RecordParseError::InvalidTimestamp(value.to_string());

    if !value.bytes().all(|b| b.is_ascii_digit()) || value.is_empty() {
        return Err(invalid());
    }

    if value.len() == 14 {
        return parse_calendar_time(value).ok_or_else(invalid);
    }

    let seconds = value.parse::<i64>().map_err(|_| invalid())?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(invalid)
}

fn parse_calendar_time(value: &str) -> Option<DateTime<Utc>> {
    let field = |range: std::ops::Range<usize>| value.get(range)?.parse::<u32>().ok();

    let year = value.get(0..4)?.parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?;
    let time = date.and_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)?;
    Some(time.and_utc())
}
