//! Run configuration, read once from action inputs at process entry.
//!
//! The CI platform exposes action inputs as `INPUT_<NAME>` environment
//! variables. Each input is looked up there first and then under its bare
//! name, so the binary also runs outside of a workflow.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Default timeout for HTTP requests and git processes (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "RECOMMIT_TIMEOUT";

/// Default number of commits fetched and described concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default GitHub REST API base.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// How the rewritten branch is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// `git push --force`, overwriting whatever the remote holds.
    #[default]
    Force,
    /// `git push --force-with-lease`.
    ForceWithLease,
}

/// Everything a run needs, constructed once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub openai_api_key: String,
    pub openai_api_endpoint: String,
    pub openai_api_model: String,
    pub remote: String,
    pub push_mode: PushMode,
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let push_mode = match optional_input("FORCE_WITH_LEASE") {
            Some(v) if parse_bool("FORCE_WITH_LEASE", &v)? => PushMode::ForceWithLease,
            _ => PushMode::Force,
        };

        let max_concurrency = match optional_input("MAX_CONCURRENCY") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidInput {
                        name: "MAX_CONCURRENCY",
                        value: v,
                        reason: "expected a positive integer".to_string(),
                    });
                }
            },
            None => DEFAULT_MAX_CONCURRENCY,
        };

        Ok(Self {
            github_token: required_input("GITHUB_TOKEN")?,
            github_api_url: optional_input("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            openai_api_key: required_input("OPENAI_API_KEY")?,
            openai_api_endpoint: normalize_base_url(&required_input("OPENAI_API_ENDPOINT")?),
            openai_api_model: required_input("OPENAI_API_MODEL")?,
            remote: optional_input("REMOTE").unwrap_or_else(|| "origin".to_string()),
            push_mode,
            max_concurrency,
            timeout: get_timeout(),
            dry_run: false,
        })
    }
}

/// Ensure a base URL ends with exactly one `/` so relative joins append.
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

/// Get the configured timeout duration.
///
/// Reads from RECOMMIT_TIMEOUT if set, otherwise uses the default of 300
/// seconds. An unparseable value logs a warning and falls back.
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

fn required_input(name: &'static str) -> Result<String, ConfigError> {
    optional_input(name).ok_or(ConfigError::MissingInput(name))
}

fn optional_input(name: &str) -> Option<String> {
    [format!("INPUT_{name}"), name.to_string()]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidInput {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
