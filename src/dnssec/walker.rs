use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

use super::records::{RrsigRecord, parse_dnskey_records, parse_ds_records, parse_rrsig_records};
use super::zone::{
    QueryFailure, ZoneData, normalize_domain, parent_zone_names, split_labels, zone_at_depth,
};
use crate::config::{MAX_CONCURRENT_QUERIES, ValidatorConfig};
use crate::error::{QueryError, Result, ValidationError};
use crate::querier::{DnsQuerier, RawRecord, RecordType};

/// Zone data collected for a domain: the target itself and every zone above it
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneWalk {
    pub target: ZoneData,
    /// Root first, target's parent last
    pub parents: Vec<ZoneData>,
}

/// Query permits and the shared deadline of one walk
struct WalkBudget {
    permits: Semaphore,
    deadline: Instant,
}

/// Walks the delegation chain from the root down to a domain
pub struct ZoneWalker {
    querier: Arc<dyn DnsQuerier>,
    config: ValidatorConfig,
}

impl ZoneWalker {
    pub fn new(querier: Arc<dyn DnsQuerier>, config: ValidatorConfig) -> Self {
        Self { querier, config }
    }

    /// Fetch DNSKEY/DS data for every level from the root to `domain`.
    ///
    /// All levels are fetched concurrently. A failed query on a parent level
    /// leaves that level empty and is recorded on it; only a failed DNSKEY
    /// query for the target itself is an error.
    ///
    /// Every query shares the `validation_timeout` deadline. Queries still
    /// pending at the deadline are recorded as timed out, so levels that
    /// already answered are kept.
    pub async fn walk(&self, domain: &str) -> Result<ZoneWalk> {
        let name = normalize_domain(domain)?;
        let labels = split_labels(&name);
        let parent_names = parent_zone_names(&labels);
        let budget = WalkBudget {
            permits: Semaphore::new(
                self.config
                    .max_concurrent_queries
                    .clamp(1, MAX_CONCURRENT_QUERIES),
            ),
            deadline: deadline_after(self.config.validation_timeout),
        };

        debug!(
            "Walking DNSSEC chain for {} across {} parent zones",
            name,
            parent_names.len()
        );

        let parent_fetches = parent_names.iter().enumerate().map(|(depth, zone)| {
            let child = zone_at_depth(&labels, depth + 1);
            self.fetch_parent_zone(zone, child, &budget)
        });

        let (target, parents) = tokio::join!(
            self.fetch_target_zone(&name, &budget),
            join_all(parent_fetches)
        );
        let mut target = target?;

        // The DS set for the target is the one its parent holds for it
        if let Some(parent) = parents.last() {
            target.ds_records = parent.ds_records.clone();
        }

        debug!(
            "Walk for {} finished: target has {} DNSKEY, {} DS, {} RRSIG",
            name,
            target.dnskey_records.len(),
            target.ds_records.len(),
            target.rrsig_records.len()
        );

        Ok(ZoneWalk { target, parents })
    }

    /// DNSKEY set of `zone` and the DS set it holds for `child`
    async fn fetch_parent_zone(&self, zone: &str, child: String, budget: &WalkBudget) -> ZoneData {
        let mut data = ZoneData::new(zone);

        let (dnskey, ds) = tokio::join!(
            self.query(zone, RecordType::DNSKEY, budget),
            self.query(&child, RecordType::DS, budget)
        );

        match dnskey {
            Ok(records) => {
                data.dnskey_records = parse_dnskey_records(&records);
                data.rrsig_records = parse_rrsig_records(&records);
            }
            Err(e) => {
                warn!("DNSKEY query for zone {} failed: {}", zone, e);
                data.record_failure(zone, RecordType::DNSKEY, &e);
            }
        }

        match ds {
            Ok(records) => data.ds_records = parse_ds_records(&records),
            Err(e) => {
                warn!("DS query for {} in zone {} failed: {}", child, zone, e);
                data.record_failure(&child, RecordType::DS, &e);
            }
        }

        trace!(
            "Zone {}: {} DNSKEY, {} DS for {}",
            zone,
            data.dnskey_records.len(),
            data.ds_records.len(),
            child
        );
        data
    }

    /// DNSKEY set of the target plus any RRSIGs a signed lookup turns up
    async fn fetch_target_zone(&self, name: &str, budget: &WalkBudget) -> Result<ZoneData> {
        let (dnskey, (lookup_sigs, lookup_failures)) = tokio::join!(
            self.query(name, RecordType::DNSKEY, budget),
            self.lookup_rrsig(name, budget)
        );

        let records = match dnskey {
            Ok(records) => records,
            Err(QueryError::Timeout) if Instant::now() >= budget.deadline => {
                return Err(ValidationError::Timeout(self.config.validation_timeout));
            }
            Err(source) => {
                return Err(ValidationError::TargetQuery {
                    domain: name.to_string(),
                    source,
                });
            }
        };

        let mut data = ZoneData::new(name);
        data.dnskey_records = parse_dnskey_records(&records);
        data.rrsig_records = parse_rrsig_records(&records);
        data.rrsig_records.extend(lookup_sigs);
        data.query_failures = lookup_failures;

        Ok(data)
    }

    /// Look for signatures on the target's A set, then on its NS set
    async fn lookup_rrsig(
        &self,
        name: &str,
        budget: &WalkBudget,
    ) -> (Vec<RrsigRecord>, Vec<QueryFailure>) {
        let mut failures = Vec::new();
        let mut signatures = Vec::new();

        let mut lookups = vec![RecordType::A];
        if self.config.rrsig_ns_fallback {
            lookups.push(RecordType::NS);
        }

        for record_type in lookups {
            match self.query(name, record_type, budget).await {
                Ok(records) => signatures = parse_rrsig_records(&records),
                Err(e) => {
                    debug!("RRSIG lookup ({}) for {} failed: {}", record_type, name, e);
                    failures.push(QueryFailure::new(name, record_type, &e));
                }
            }
            if !signatures.is_empty() {
                failures.clear();
                break;
            }
        }

        (signatures, failures)
    }

    /// [`Self::query_with_retry`] cut off at the walk deadline
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
        budget: &WalkBudget,
    ) -> std::result::Result<Vec<RawRecord>, QueryError> {
        match timeout_at(
            budget.deadline,
            self.query_with_retry(name, record_type, &budget.permits),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                debug!("{} {} query still pending at the walk deadline", name, record_type);
                Err(QueryError::Timeout)
            }
        }
    }

    /// One querier call under the per-query timeout, with retries
    async fn query_with_retry(
        &self,
        name: &str,
        record_type: RecordType,
        permits: &Semaphore,
    ) -> std::result::Result<Vec<RawRecord>, QueryError> {
        let _permit = permits
            .acquire()
            .await
            .map_err(|_| QueryError::Other("query permits closed".to_string()))?;

        let mut attempt: u8 = 0;
        loop {
            let result = match timeout(
                self.config.query_timeout,
                self.querier.query(name, record_type),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(QueryError::Timeout),
            };

            match result {
                Ok(records) => {
                    if attempt > 0 {
                        debug!("{} {} query succeeded on retry {}", name, record_type, attempt);
                    }
                    trace!("{} {} returned {} records", name, record_type, records.len());
                    return Ok(records);
                }
                Err(e) if attempt < self.config.max_retries && e.is_retryable() => {
                    debug!(
                        "{} {} query attempt {} failed, retrying: {}",
                        name,
                        record_type,
                        attempt + 1,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(100 * (u64::from(attempt) + 1)))
                        .await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn deadline_after(budget: Duration) -> Instant {
    let now = Instant::now();
    // Out-of-range budgets behave like one year
    now.checked_add(budget)
        .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 60 * 60))
}
