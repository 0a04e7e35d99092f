pub mod algorithm;
pub mod chain;
pub mod digest;
pub mod key_tag;
pub mod records;
pub mod trust_anchor;
pub mod validator;
pub mod walker;
pub mod zone;

use serde::Serialize;
use std::fmt;

pub use algorithm::DnsSecAlgorithm;
pub use chain::{ChainBuilder, DelegationLink, DnssecChain, ZoneCorrelation};
pub use digest::DigestType;
pub use key_tag::{calculate_key_tag, key_tag_from_base64};
pub use records::{DnskeyRecord, DsRecord, RecordParseError, RrsigRecord};
pub use trust_anchor::{TrustAnchor, TrustAnchorStore};
pub use validator::{DnssecValidation, DnssecValidator, classify};
pub use walker::{ZoneWalk, ZoneWalker};
pub use zone::{QueryFailure, ZoneData};

/// DNSSEC validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DnssecStatus {
    /// Keys, signatures and a DS in the parent are all present
    Secure,
    /// The domain publishes no DNSKEY
    Insecure,
    /// Signature verification failed. Never produced without cryptographic checks.
    Bogus,
    /// Keys are present but the chain is incomplete, or validation failed
    Indeterminate,
}

impl fmt::Display for DnssecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DnssecStatus::Secure => "SECURE",
            DnssecStatus::Insecure => "INSECURE",
            DnssecStatus::Bogus => "BOGUS",
            DnssecStatus::Indeterminate => "INDETERMINATE",
        };
        write!(f, "{}", s)
    }
}

/// DNSSEC constants
pub mod constants {
    /// Name of the root zone
    pub const ROOT_ZONE: &str = ".";

    /// DNSKEY flags of a Key Signing Key (Zone Key + SEP)
    pub const KSK_FLAGS: u16 = 257;

    /// DNSKEY flags of a Zone Signing Key
    pub const ZSK_FLAGS: u16 = 256;

    /// Secure Entry Point bit
    pub const SEP_FLAG: u16 = 0x0001;

    /// Root trust anchor key tag (2024 KSK)
    pub const ROOT_KSK_KEY_TAG: u16 = 20326;

    pub const MAX_LABEL_LEN: usize = 63;
    pub const MAX_NAME_LEN: usize = 253;
}
