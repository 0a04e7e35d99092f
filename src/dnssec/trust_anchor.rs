use super::DnsSecAlgorithm;
use super::constants::{ROOT_KSK_KEY_TAG, ROOT_ZONE};
use super::records::DnskeyRecord;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A DNSSEC trust anchor, identified by key tag and algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct TrustAnchor {
    /// Zone this anchor is for
    pub zone: String,
    /// Key tag
    pub key_tag: u16,
    /// Algorithm
    pub algorithm: DnsSecAlgorithm,
}

impl TrustAnchor {
    /// Create a new trust anchor
    pub fn new(zone: impl Into<String>, key_tag: u16, algorithm: DnsSecAlgorithm) -> Self {
        Self {
            zone: zone.into(),
            key_tag,
            algorithm,
        }
    }

    /// Whether a published DNSKEY carries this anchor's key tag and algorithm
    pub fn matches(&self, key: &DnskeyRecord) -> bool {
        key.key_tag == self.key_tag && key.algorithm == self.algorithm
    }
}

/// Trust anchor store for managing DNSSEC trust anchors
#[derive(Debug, Clone)]
pub struct TrustAnchorStore {
    /// Map of zone -> Vec<TrustAnchor>
    anchors: Arc<RwLock<HashMap<String, Vec<TrustAnchor>>>>,
}

impl Default for TrustAnchorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustAnchorStore {
    /// Create a new trust anchor store with the default root trust anchor
    pub fn new() -> Self {
        let store = Self::empty();
        // Root KSK-2024
        store.add_anchor(TrustAnchor::new(
            ROOT_ZONE,
            ROOT_KSK_KEY_TAG,
            DnsSecAlgorithm::RsaSha256,
        ));
        store
    }

    /// Create a store with no anchors at all
    pub fn empty() -> Self {
        Self {
            anchors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a trust anchor
    pub fn add_anchor(&self, anchor: TrustAnchor) {
        debug!(
            "Adding trust anchor for {} with key tag {}",
            anchor.zone, anchor.key_tag
        );
        let mut anchors = self.anchors.write();
        anchors
            .entry(normalize_zone(&anchor.zone))
            .or_default()
            .push(anchor);
    }

    /// Get the anchors configured for exactly this zone
    pub fn get_anchors(&self, zone: &str) -> Option<Vec<TrustAnchor>> {
        self.anchors.read().get(&normalize_zone(zone)).cloned()
    }

    /// Remove all anchors for a zone
    pub fn remove_anchors(&self, zone: &str) {
        self.anchors.write().remove(&normalize_zone(zone));
    }

    /// Number of zones that have at least one anchor
    pub fn zone_count(&self) -> usize {
        self.anchors.read().len()
    }

    /// Anchors for `zone` that none of `keys` match.
    ///
    /// Returns `None` when the zone has no anchors configured, or when at
    /// least one anchor is present in the key set.
    pub fn missing_anchors(&self, zone: &str, keys: &[DnskeyRecord]) -> Option<Vec<TrustAnchor>> {
        let anchors = self.get_anchors(zone)?;
        if anchors.iter().any(|a| keys.iter().any(|k| a.matches(k))) {
            return None;
        }
        Some(anchors)
    }
}

fn normalize_zone(zone: &str) -> String {
    let trimmed = zone.trim().trim_end_matches('.').to_ascii_lowercase();
    if trimmed.is_empty() {
        ROOT_ZONE.to_string()
    } else {
        trimmed
    }
}
