use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use super::chain::{ChainBuilder, DnssecChain};
use super::constants::ROOT_ZONE;
use super::trust_anchor::TrustAnchorStore;
use super::walker::{ZoneWalk, ZoneWalker};
use super::zone::QueryFailure;
use super::DnssecStatus;
use crate::config::ValidatorConfig;
use crate::error::ConfigError;
use crate::querier::{DnsQuerier, RecordType};

/// Outcome of validating one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnssecValidation {
    pub domain: String,
    pub status: DnssecStatus,
    pub validation_time_ms: f64,
    pub timestamp: DateTime<Utc>,
    /// Absent when the walk failed before a chain could be built
    pub chain: Option<DnssecChain>,
    pub warnings: Vec<String>,
    pub error_message: Option<String>,
}

impl DnssecValidation {
    pub fn is_secure(&self) -> bool {
        self.status == DnssecStatus::Secure
    }

    pub fn is_insecure(&self) -> bool {
        self.status == DnssecStatus::Insecure
    }

    pub fn is_bogus(&self) -> bool {
        self.status == DnssecStatus::Bogus
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Classify a chain. BOGUS is never produced: signatures are not verified.
pub fn classify(chain: &DnssecChain) -> DnssecStatus {
    if !chain.has_dnskey_record {
        DnssecStatus::Insecure
    } else if chain.has_chain_of_trust() {
        DnssecStatus::Secure
    } else {
        DnssecStatus::Indeterminate
    }
}

/// DNSSEC chain-of-trust validator
pub struct DnssecValidator {
    walker: ZoneWalker,
    builder: ChainBuilder,
    trust_anchors: Arc<TrustAnchorStore>,
    config: ValidatorConfig,
    /// Current time for signature validity checks (for testing)
    current_time: Option<DateTime<Utc>>,
}

impl DnssecValidator {
    /// Create a validator with the default configuration
    pub fn new(querier: Arc<dyn DnsQuerier>) -> Self {
        Self::build(querier, ValidatorConfig::default())
    }

    /// Create a validator with a custom configuration, rejecting invalid ones
    pub fn with_config(
        querier: Arc<dyn DnsQuerier>,
        config: ValidatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(querier, config))
    }

    fn build(querier: Arc<dyn DnsQuerier>, config: ValidatorConfig) -> Self {
        Self {
            walker: ZoneWalker::new(querier, config.clone()),
            builder: ChainBuilder::new(),
            trust_anchors: Arc::new(TrustAnchorStore::new()),
            config,
            current_time: None,
        }
    }

    /// Replace the default root trust anchor store
    pub fn with_trust_anchors(mut self, trust_anchors: Arc<TrustAnchorStore>) -> Self {
        self.trust_anchors = trust_anchors;
        self
    }

    /// Set current time for testing
    pub fn set_current_time(&mut self, time: DateTime<Utc>) {
        self.current_time = Some(time);
    }

    fn current_time(&self) -> DateTime<Utc> {
        self.current_time.unwrap_or_else(Utc::now)
    }

    /// Validate a domain. Every failure is folded into the returned value.
    ///
    /// The walk is bounded by `validation_timeout`. Parent levels still
    /// pending at that point become query-failure warnings; only the target's
    /// own DNSKEY query running out of time fails the validation.
    pub async fn validate(&self, domain: &str) -> DnssecValidation {
        let start = Instant::now();
        let domain = domain.trim().to_string();
        debug!("Starting DNSSEC validation for {}", domain);

        match self.walker.walk(&domain).await {
            Ok(walk) => self.finish(domain, walk, start),
            Err(e) => {
                warn!("DNSSEC validation for {} failed: {}", domain, e);
                DnssecValidation {
                    domain,
                    status: DnssecStatus::Indeterminate,
                    validation_time_ms: elapsed_ms(start),
                    timestamp: Utc::now(),
                    chain: None,
                    warnings: Vec::new(),
                    error_message: Some(format!("DNSSEC validation failed: {}", e)),
                }
            }
        }
    }

    fn finish(&self, domain: String, walk: ZoneWalk, start: Instant) -> DnssecValidation {
        let ZoneWalk { target, parents } = walk;
        let chain_domain = target.zone_name.clone();
        let chain = self.builder.build(&chain_domain, target, parents);

        for correlation in self.builder.correlate(&chain) {
            trace!(
                "Zone {}: {} of {} DNSKEY matched by same-level DS",
                correlation.zone_name,
                correlation.matched_key_tags.len(),
                correlation.dnskey_count
            );
        }

        let status = classify(&chain);
        let warnings = self.collect_warnings(&chain);

        info!(
            "DNSSEC validation for {}: {} ({} warnings)",
            domain,
            status,
            warnings.len()
        );

        DnssecValidation {
            domain,
            status,
            validation_time_ms: elapsed_ms(start),
            timestamp: Utc::now(),
            chain: Some(chain),
            warnings,
            error_message: None,
        }
    }

    /// Human-readable findings about the chain, in a stable order
    pub fn collect_warnings(&self, chain: &DnssecChain) -> Vec<String> {
        let mut warnings = Warnings::default();

        if chain.has_dnskey_record {
            if !chain.has_ds_record {
                warnings.push("Domain has DNSKEY but no DS record in parent zone.".to_string());
            }
            if chain.ksk_count() == 0 {
                warnings.push("No Key Signing Key (KSK) found.".to_string());
            }
            if chain.zsk_count() == 0 {
                warnings.push("No Zone Signing Key (ZSK) found.".to_string());
            }
            if chain.has_ds_record && !chain.ds_matches_dnskey() {
                warnings.push(
                    "DS record in parent zone does not match any DNSKEY (key tag mismatch)."
                        .to_string(),
                );
            }
        }

        for ds in chain.ds_records.iter().filter(|ds| !ds.digest_len_matches()) {
            warnings.push(format!(
                "DS record (key tag {}) has a {} digest of unexpected length.",
                ds.key_tag, ds.digest_type
            ));
        }

        for link in self.builder.delegation_links(chain) {
            if link.child_is_target || link.dnskey_key_tags.is_empty() {
                continue;
            }
            if link.ds_key_tags.is_empty() {
                warnings.push(format!(
                    "Zone {} publishes DNSKEY but {} holds no DS record for it.",
                    link.child, link.parent
                ));
            } else if !link.is_matched() {
                warnings.push(format!(
                    "DS records for {} in {} do not match any DNSKEY published by {}.",
                    link.child, link.parent, link.child
                ));
            }
        }

        let now = self.current_time();
        for sig in &chain.rrsig_records {
            if sig.is_expired_at(now) {
                warnings.push(format!(
                    "RRSIG covering {} (key tag {}) has expired.",
                    sig.type_covered, sig.key_tag
                ));
            } else if sig.is_not_yet_valid_at(now) {
                warnings.push(format!(
                    "RRSIG covering {} (key tag {}) is not yet valid.",
                    sig.type_covered, sig.key_tag
                ));
            } else {
                let days = sig.days_until_expiry_at(now);
                if days <= self.config.expiry_warning_days {
                    warnings.push(format!(
                        "RRSIG covering {} (key tag {}) expires in {} day(s).",
                        sig.type_covered, sig.key_tag, days
                    ));
                }
            }
        }

        for key in &chain.dnskey_records {
            if key.algorithm.is_deprecated() {
                warnings.push(format!(
                    "DNSKEY {} uses deprecated algorithm {}.",
                    key.key_tag, key.algorithm
                ));
            }
        }

        let root_keys = if chain.domain == ROOT_ZONE {
            Some(&chain.dnskey_records)
        } else {
            chain
                .parent_zones
                .first()
                .filter(|zone| zone.zone_name == ROOT_ZONE)
                .map(|zone| &zone.dnskey_records)
        };
        if let Some(keys) = root_keys.filter(|keys| !keys.is_empty()) {
            if let Some(missing) = self.trust_anchors.missing_anchors(ROOT_ZONE, keys) {
                let tags: Vec<String> = missing.iter().map(|a| a.key_tag.to_string()).collect();
                warnings.push(format!(
                    "Root zone DNSKEY set does not include a configured trust anchor (expected key tag {}).",
                    tags.join(", ")
                ));
            }
        }

        let failures = chain
            .parent_zones
            .iter()
            .flat_map(|zone| zone.query_failures.iter())
            .chain(chain.query_failures.iter());
        for failure in failures {
            warnings.push(failure_warning(failure));
        }

        warnings.into_inner()
    }
}

fn failure_warning(failure: &QueryFailure) -> String {
    if failure.record_type == RecordType::DS && failure.timed_out {
        format!(
            "DS query for {} timed out (TLD nameservers may be rate-limited).",
            failure.query_name
        )
    } else {
        format!(
            "Failed to query {} records for {}: {}.",
            failure.record_type, failure.query_name, failure.message
        )
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Ordered warning list without duplicates
#[derive(Default)]
struct Warnings(Vec<String>);

impl Warnings {
    fn push(&mut self, warning: String) {
        if !self.0.contains(&warning) {
            self.0.push(warning);
        }
    }

    fn into_inner(self) -> Vec<String> {
        self.0
    }
}
