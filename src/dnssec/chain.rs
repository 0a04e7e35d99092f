use serde::Serialize;
use tracing::{debug, trace};

use super::records::{DnskeyRecord, DsRecord, RrsigRecord};
use super::zone::{QueryFailure, ZoneData};
use super::constants::ROOT_ZONE;

/// DNSSEC chain of trust for a target domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnssecChain {
    pub domain: String,
    pub has_ds_record: bool,
    pub has_dnskey_record: bool,
    pub has_rrsig_record: bool,
    pub ds_records: Vec<DsRecord>,
    pub dnskey_records: Vec<DnskeyRecord>,
    pub rrsig_records: Vec<RrsigRecord>,
    /// Zones above the target, root first
    pub parent_zones: Vec<ZoneData>,
    /// Absorbed failures of the target's own non-primary queries
    pub query_failures: Vec<QueryFailure>,
}

impl DnssecChain {
    /// Signed when the zone publishes keys and signatures
    pub fn is_signed(&self) -> bool {
        self.has_dnskey_record && self.has_rrsig_record
    }

    /// Signed and endorsed by a DS record in the parent
    pub fn has_chain_of_trust(&self) -> bool {
        self.has_ds_record && self.is_signed()
    }

    pub fn ksk_count(&self) -> usize {
        self.dnskey_records
            .iter()
            .filter(|key| key.is_key_signing_key())
            .count()
    }

    pub fn zsk_count(&self) -> usize {
        self.dnskey_records
            .iter()
            .filter(|key| key.is_zone_signing_key())
            .count()
    }

    /// Whether some DS for the target carries the key tag of a target DNSKEY
    pub fn ds_matches_dnskey(&self) -> bool {
        self.ds_records
            .iter()
            .any(|ds| self.dnskey_records.iter().any(|key| key.key_tag == ds.key_tag))
    }
}

/// Key-tag correlation inside a single zone level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneCorrelation {
    pub zone_name: String,
    pub dnskey_count: usize,
    pub ds_count: usize,
    /// Tags of DNSKEYs that a DS at the same level refers to
    pub matched_key_tags: Vec<u16>,
}

impl ZoneCorrelation {
    pub fn has_match(&self) -> bool {
        !self.matched_key_tags.is_empty()
    }
}

/// The DS set a parent holds for a child next to the child's DNSKEY set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelegationLink {
    pub parent: String,
    pub child: String,
    pub ds_key_tags: Vec<u16>,
    pub dnskey_key_tags: Vec<u16>,
    pub child_is_target: bool,
}

impl DelegationLink {
    pub fn matched_key_tags(&self) -> Vec<u16> {
        self.ds_key_tags
            .iter()
            .copied()
            .filter(|tag| self.dnskey_key_tags.contains(tag))
            .collect()
    }

    pub fn is_matched(&self) -> bool {
        self.ds_key_tags
            .iter()
            .any(|tag| self.dnskey_key_tags.contains(tag))
    }
}

/// Assembles walked zone data into a [`DnssecChain`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainBuilder;

impl ChainBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the chain for `domain` from its own zone data and the zones above it
    pub fn build(&self, domain: &str, target: ZoneData, mut parents: Vec<ZoneData>) -> DnssecChain {
        // Stable, so equal depths keep the walker's order
        parents.sort_by_key(|zone| zone_depth(&zone.zone_name));

        debug!(
            "Building DNSSEC chain for {}: {} DNSKEY, {} DS, {} RRSIG, {} parent zones",
            domain,
            target.dnskey_records.len(),
            target.ds_records.len(),
            target.rrsig_records.len(),
            parents.len()
        );

        DnssecChain {
            domain: domain.to_string(),
            has_ds_record: target.has_ds(),
            has_dnskey_record: target.has_dnskey(),
            has_rrsig_record: target.has_rrsig(),
            ds_records: target.ds_records,
            dnskey_records: target.dnskey_records,
            rrsig_records: target.rrsig_records,
            parent_zones: parents,
            query_failures: target.query_failures,
        }
    }

    /// Same-level DS/DNSKEY key-tag correlation for every parent zone
    pub fn correlate(&self, chain: &DnssecChain) -> Vec<ZoneCorrelation> {
        chain
            .parent_zones
            .iter()
            .map(|zone| {
                let matched_key_tags: Vec<u16> =
                    zone.matched_dnskeys().iter().map(|key| key.key_tag).collect();
                trace!(
                    "Zone {} has {} DNSKEY matched by a DS at the same level",
                    zone.zone_name,
                    matched_key_tags.len()
                );
                ZoneCorrelation {
                    zone_name: zone.zone_name.clone(),
                    dnskey_count: zone.dnskey_records.len(),
                    ds_count: zone.ds_records.len(),
                    matched_key_tags,
                }
            })
            .collect()
    }

    /// Parent-to-child links down the chain, ending at the target
    pub fn delegation_links(&self, chain: &DnssecChain) -> Vec<DelegationLink> {
        let zones = &chain.parent_zones;

        zones
            .iter()
            .enumerate()
            .map(|(index, parent)| match zones.get(index + 1) {
                Some(child) => DelegationLink {
                    parent: parent.zone_name.clone(),
                    child: child.zone_name.clone(),
                    ds_key_tags: parent.ds_tags(),
                    dnskey_key_tags: child.dnskey_tags(),
                    child_is_target: false,
                },
                None => DelegationLink {
                    parent: parent.zone_name.clone(),
                    child: chain.domain.clone(),
                    ds_key_tags: parent.ds_tags(),
                    dnskey_key_tags: chain.dnskey_records.iter().map(|k| k.key_tag).collect(),
                    child_is_target: true,
                },
            })
            .collect()
    }
}

fn zone_depth(zone_name: &str) -> usize {
    if zone_name == ROOT_ZONE {
        0
    } else {
        zone_name.split('.').count()
    }
}
