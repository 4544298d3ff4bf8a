//! Configuration module for the applicant client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Applicants API (scheme, host and port)
    pub api_base: String,
    /// Page size used until the user picks another one
    pub page_size: u32,
    /// Per-request timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,
    /// Accept self-signed certificates (local development servers)
    pub accept_invalid_certs: bool,
    /// Inclusive age range enforced by the applicant form
    pub age_range: RangeInclusive<i32>,
    /// Reload the current page after every successful mutation
    pub refresh_after_mutation: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://localhost:7292".to_string(),
            page_size: 6,
            request_timeout: None,
            accept_invalid_certs: false,
            age_range: 20..=60,
            refresh_after_mutation: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base = env::var("APPLICANTS_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let page_size = parse_var::<u32>("APPLICANTS_PAGE_SIZE", "a positive integer")?
            .filter(|size| *size > 0)
            .unwrap_or(defaults.page_size);

        let request_timeout = parse_var::<u64>("APPLICANTS_TIMEOUT_SECS", "a number of seconds")?
            .map(Duration::from_secs);

        let accept_invalid_certs =
            parse_flag("APPLICANTS_ACCEPT_INVALID_CERTS")?.unwrap_or(false);

        let min_age = parse_var::<i32>("APPLICANTS_MIN_AGE", "an integer")?
            .unwrap_or(*defaults.age_range.start());
        let max_age = parse_var::<i32>("APPLICANTS_MAX_AGE", "an integer")?
            .unwrap_or(*defaults.age_range.end());
        if min_age > max_age {
            return Err(ConfigError {
                variable: "APPLICANTS_MIN_AGE",
                value: min_age.to_string(),
                expected: "a value not above APPLICANTS_MAX_AGE",
            });
        }

        let refresh_after_mutation =
            parse_flag("APPLICANTS_REFRESH_AFTER_MUTATION")?.unwrap_or(false);

        let log_level = env::var("APPLICANTS_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            api_base,
            page_size,
            request_timeout,
            accept_invalid_certs,
            age_range: min_age..=max_age,
            refresh_after_mutation,
            log_level,
        })
    }
}

fn parse_var<T: FromStr>(
    variable: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError {
            variable,
            value: raw,
            expected,
        }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(variable: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(ConfigError {
                variable,
                value: raw,
                expected: "a boolean",
            }),
        },
        Err(_) => Ok(None),
    }
}
