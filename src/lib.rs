pub mod config;
pub mod dnssec;
pub mod error;
pub mod querier;

pub use config::ValidatorConfig;
pub use dnssec::{DnssecStatus, DnssecValidation, DnssecValidator};
pub use error::{QueryError, ValidationError};
pub use querier::{DnsQuerier, RawRecord, RecordType};
