use serde::Serialize;

use super::constants::{MAX_LABEL_LEN, MAX_NAME_LEN, ROOT_ZONE};
use super::records::{DnskeyRecord, DsRecord, RrsigRecord};
use crate::error::{QueryError, ValidationError};
use crate::querier::RecordType;

/// A querier call that failed and was absorbed during the walk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFailure {
    pub query_name: String,
    pub record_type: RecordType,
    pub message: String,
    pub timed_out: bool,
}

impl QueryFailure {
    pub fn new(query_name: &str, record_type: RecordType, error: &QueryError) -> Self {
        Self {
            query_name: query_name.to_string(),
            record_type,
            message: error.to_string(),
            timed_out: error.is_timeout(),
        }
    }
}

/// Authentication data fetched for one level of the delegation chain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoneData {
    pub zone_name: String,
    pub dnskey_records: Vec<DnskeyRecord>,
    /// DS records this zone holds for its child
    pub ds_records: Vec<DsRecord>,
    pub rrsig_records: Vec<RrsigRecord>,
    pub query_failures: Vec<QueryFailure>,
}

impl ZoneData {
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            ..Default::default()
        }
    }

    pub fn has_dnskey(&self) -> bool {
        !self.dnskey_records.is_empty()
    }

    pub fn has_ds(&self) -> bool {
        !self.ds_records.is_empty()
    }

    pub fn has_rrsig(&self) -> bool {
        !self.rrsig_records.is_empty()
    }

    pub fn dnskey_tags(&self) -> Vec<u16> {
        self.dnskey_records.iter().map(|k| k.key_tag).collect()
    }

    pub fn ds_tags(&self) -> Vec<u16> {
        self.ds_records.iter().map(|d| d.key_tag).collect()
    }

    /// DNSKEYs whose key tag appears on a DS record held at this same level
    pub fn matched_dnskeys(&self) -> Vec<&DnskeyRecord> {
        self.dnskey_records
            .iter()
            .filter(|key| self.ds_records.iter().any(|ds| ds.key_tag == key.key_tag))
            .collect()
    }

    pub(crate) fn record_failure(&mut self, query_name: &str, record_type: RecordType, error: &QueryError) {
        self.query_failures
            .push(QueryFailure::new(query_name, record_type, error));
    }
}

/// Normalize a domain for walking: trimmed, lowercase, no trailing dot.
/// The root itself normalizes to `"."`.
pub fn normalize_domain(domain: &str) -> Result<String, ValidationError> {
    let trimmed = domain.trim();
    if trimmed == ROOT_ZONE {
        return Ok(ROOT_ZONE.to_string());
    }

    let name = trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase();
    if name.is_empty() {
        return Err(ValidationError::InvalidDomain("empty domain name".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidDomain(format!(
            "{} exceeds {} octets",
            name, MAX_NAME_LEN
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(ValidationError::InvalidDomain(format!(
                "{} contains an empty label",
                name
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(ValidationError::InvalidDomain(format!(
                "label {} exceeds {} octets",
                label, MAX_LABEL_LEN
            )));
        }
    }

    Ok(name)
}

/// Labels of a normalized domain, leftmost first. The root has none.
pub fn split_labels(domain: &str) -> Vec<String> {
    if domain == ROOT_ZONE {
        return Vec::new();
    }
    domain.split('.').map(|label| label.to_string()).collect()
}

/// Zone name made of the rightmost `depth` labels; depth 0 is the root
pub fn zone_at_depth(labels: &[String], depth: usize) -> String {
    if depth == 0 {
        return ROOT_ZONE.to_string();
    }
    labels[labels.len() - depth..].join(".")
}

/// Every zone above the target, root first:
/// `a.b.example.com` -> `[".", "com", "example.com", "b.example.com"]`
pub fn parent_zone_names(labels: &[String]) -> Vec<String> {
    (0..labels.len())
        .map(|depth| zone_at_depth(labels, depth))
        .collect()
}
