use crate::error::ConfigError;
use std::time::Duration;

/// Upper bound for `max_concurrent_queries`
pub const MAX_CONCURRENT_QUERIES: usize = 64;

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Timeout applied to every individual querier call
    pub query_timeout: Duration,

    /// Soft deadline for the whole walk
    pub validation_timeout: Duration,

    /// Retries after a failed querier call (0 = single attempt)
    pub max_retries: u8,

    /// Max number of querier calls in flight for one validation
    pub max_concurrent_queries: usize,

    /// Look in the target's NS set for RRSIGs when the A answer carries none
    pub rrsig_ns_fallback: bool,

    /// Warn when a target signature expires within this many days
    pub expiry_warning_days: i64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            validation_timeout: Duration::from_secs(30),
            max_retries: 1,
            max_concurrent_queries: 8,
            rrsig_ns_fallback: true,
            expiry_warning_days: 7,
        }
    }
}

impl ValidatorConfig {
    /// Create a ValidatorConfig from environment variables
    /// Returns Err if a variable is present but invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(timeout_str) = std::env::var("DNSSEC_CHAIN_QUERY_TIMEOUT") {
            config.query_timeout = parse_timeout_secs(&timeout_str)?;
        }

        if let Ok(timeout_str) = std::env::var("DNSSEC_CHAIN_VALIDATION_TIMEOUT") {
            config.validation_timeout = parse_timeout_secs(&timeout_str)?;
        }

        if let Ok(max_retries) = std::env::var("DNSSEC_CHAIN_MAX_RETRIES") {
            config.max_retries = max_retries
                .parse::<u8>()
                .map_err(|_| ConfigError::InvalidRetries(max_retries.clone()))?;
        }

        if let Ok(max_concurrent) = std::env::var("DNSSEC_CHAIN_MAX_CONCURRENT_QUERIES") {
            config.max_concurrent_queries = max_concurrent
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidConcurrency(max_concurrent.clone()))?;
        }

        if let Ok(fallback) = std::env::var("DNSSEC_CHAIN_RRSIG_NS_FALLBACK") {
            config.rrsig_ns_fallback = parse_bool(&fallback, true);
        }

        if let Ok(days) = std::env::var("DNSSEC_CHAIN_EXPIRY_WARNING_DAYS") {
            config.expiry_warning_days = days.parse::<i64>().map_err(|_| {
                ConfigError::ParseError(format!("Invalid expiry warning days: {}", days))
            })?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "Query timeout must be greater than 0".to_string(),
            ));
        }

        if self.query_timeout.as_secs() > 300 {
            return Err(ConfigError::InvalidTimeout(
                "Query timeout too large (max 300 seconds)".to_string(),
            ));
        }

        if self.validation_timeout < self.query_timeout {
            return Err(ConfigError::InvalidTimeout(
                "Validation timeout must not be shorter than the query timeout".to_string(),
            ));
        }

        if self.max_retries > 5 {
            return Err(ConfigError::InvalidRetries(
                "Too many retries (max 5)".to_string(),
            ));
        }

        if self.max_concurrent_queries == 0 || self.max_concurrent_queries > MAX_CONCURRENT_QUERIES {
            return Err(ConfigError::InvalidConcurrency(format!(
                "Concurrent queries must be between 1 and {}, got {}",
                MAX_CONCURRENT_QUERIES, self.max_concurrent_queries
            )));
        }

        if self.expiry_warning_days < 0 {
            return Err(ConfigError::ParseError(
                "Expiry warning days must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_timeout_secs(value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout(value.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(
            "Timeout must be greater than 0".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean from a string, with a default value for invalid input
fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
