//! Common test utilities for the DNSSEC chain validator tests

#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dnssec_chain::{
    DnsQuerier, DnssecValidator, QueryError, RawRecord, RecordType, ValidatorConfig,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Root KSK-2024, key tag 20326
pub const ROOT_KSK_2024: &str = "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kvArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+eoZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfdRUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwNR1AkUTV74bU=";

pub const COM_KSK_TAG: u16 = 19718;
pub const COM_ZSK_TAG: u16 = 1000;
pub const EXAMPLE_KSK_TAG: u16 = 370;
pub const EXAMPLE_ZSK_TAG: u16 = 2371;

type Scripted = Result<Vec<RawRecord>, QueryError>;

/// Scripted in-memory querier.
///
/// Each `(name, type)` pair answers from a queue of responses; the last
/// one repeats. Unscripted pairs answer with an empty record set.
#[derive(Default)]
pub struct MockQuerier {
    responses: Mutex<HashMap<(String, RecordType), VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, RecordType)>>,
    delay: Option<Duration>,
}

impl MockQuerier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every answer is delayed by `delay` (tokio time)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, name: &str, record_type: RecordType, records: Vec<RawRecord>) {
        self.push(name, record_type, Ok(records));
    }

    pub fn fail(&self, name: &str, record_type: RecordType, error: QueryError) {
        self.push(name, record_type, Err(error));
    }

    fn push(&self, name: &str, record_type: RecordType, response: Scripted) {
        self.responses
            .lock()
            .entry((name.to_string(), record_type))
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, RecordType)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, name: &str, record_type: RecordType) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(n, t)| n == name && *t == record_type)
            .count()
    }

    fn next_response(&self, name: &str, record_type: RecordType) -> Scripted {
        let mut responses = self.responses.lock();
        match responses.get_mut(&(name.to_string(), record_type)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(vec![])),
            Some(queue) => queue.front().cloned().unwrap_or(Ok(vec![])),
            None => Ok(vec![]),
        }
    }
}

#[async_trait]
impl DnsQuerier for MockQuerier {
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<RawRecord>, QueryError> {
        self.calls.lock().push((name.to_string(), record_type));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_response(name, record_type)
    }
}

pub fn dnskey(zone: &str, flags: u16, algorithm: u8, key_tag: u16) -> RawRecord {
    RawRecord::new(
        zone,
        RecordType::DNSKEY,
        format!(
            "{} 3 {} ( dGVzdC1rZXktbWF0ZXJpYWw= ) ; {} ; alg = {} ; key id = {}",
            flags,
            algorithm,
            if flags == 257 { "KSK" } else { "ZSK" },
            algorithm,
            key_tag
        ),
        3600,
    )
}

pub fn root_ksk() -> RawRecord {
    RawRecord::new(".", RecordType::DNSKEY, format!("257 3 8 {}", ROOT_KSK_2024), 172800)
}

pub fn ds(child: &str, key_tag: u16, algorithm: u8) -> RawRecord {
    RawRecord::new(
        child,
        RecordType::DS,
        format!("{} {} 2 {}", key_tag, algorithm, "5a".repeat(32)),
        86400,
    )
}

pub fn rrsig(owner: &str, covered: &str, key_tag: u16, expiration: &str) -> RawRecord {
    RawRecord::new(
        owner,
        RecordType::RRSIG,
        format!(
            "{} 13 {} 3600 {} 20240101000000 {} {}. c2lnbmF0dXJl",
            covered,
            owner.split('.').count(),
            expiration,
            key_tag,
            owner
        ),
        3600,
    )
}

pub fn a_record(owner: &str) -> RawRecord {
    RawRecord::new(owner, RecordType::A, "93.184.215.14", 300)
}

/// Root and `com` fully scripted, `example.com` delegated with a matching DS
pub fn signed_parents(querier: &MockQuerier) {
    querier.respond(
        ".",
        RecordType::DNSKEY,
        vec![root_ksk(), dnskey(".", 256, 8, 38696)],
    );
    querier.respond("com", RecordType::DS, vec![ds("com", COM_KSK_TAG, 13)]);
    querier.respond(
        "com",
        RecordType::DNSKEY,
        vec![
            dnskey("com", 257, 13, COM_KSK_TAG),
            dnskey("com", 256, 13, COM_ZSK_TAG),
        ],
    );
}

/// A fully signed `example.com`
pub fn signed_example(querier: &MockQuerier) {
    signed_parents(querier);
    querier.respond(
        "example.com",
        RecordType::DS,
        vec![ds("example.com", EXAMPLE_KSK_TAG, 13)],
    );
    signed_example_zone(querier);
}

/// Keys and signatures published by `example.com` itself
pub fn signed_example_zone(querier: &MockQuerier) {
    querier.respond(
        "example.com",
        RecordType::DNSKEY,
        vec![
            dnskey("example.com", 257, 13, EXAMPLE_KSK_TAG),
            dnskey("example.com", 256, 13, EXAMPLE_ZSK_TAG),
            rrsig("example.com", "DNSKEY", EXAMPLE_KSK_TAG, "20990101000000"),
        ],
    );
    querier.respond(
        "example.com",
        RecordType::A,
        vec![
            a_record("example.com"),
            rrsig("example.com", "A", EXAMPLE_ZSK_TAG, "20990101000000"),
        ],
    );
}

/// Config for tests: no retries, generous timeouts
pub fn test_config() -> ValidatorConfig {
    ValidatorConfig {
        max_retries: 0,
        ..ValidatorConfig::default()
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn validator(querier: Arc<dyn DnsQuerier>, config: ValidatorConfig) -> DnssecValidator {
    let mut validator =
        DnssecValidator::with_config(querier, config).expect("valid test config");
    validator.set_current_time(fixed_now());
    validator
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
