pub mod policy;

use std::path::PathBuf;

use clap::Args;

use crate::config::policy::PolicyConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TrackError};
use crate::utils::validation::{validate_range, validate_url, Validate};

pub const DEFAULT_BASE_URL: &str = "http://info.sweettracker.co.kr/api/v1";

#[derive(Debug, Clone, Args)]
pub struct CliConfig {
    /// Sweet Tracker API key (falls back to SWEET_TRACKER_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, global = true, default_value = "30")]
    pub timeout_secs: u64,

    /// TOML file overriding the diagnosis rules and SLA tables
    #[arg(long, global = true)]
    pub policy_file: Option<PathBuf>,

    /// Print results as JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl CliConfig {
    /// API key from the flag or the environment. Only commands that hit the
    /// network need one.
    pub fn resolved_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.trim().is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var("SWEET_TRACKER_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(TrackError::MissingConfig {
                field: "api_key (flag --api-key or env SWEET_TRACKER_API_KEY)".to_string(),
            }),
        }
    }

    pub fn load_policy(&self) -> Result<PolicyConfig> {
        match &self.policy_file {
            Some(path) => PolicyConfig::from_path(path),
            None => Ok(PolicyConfig::default()),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
        Ok(())
    }
}

/// Resolved settings handed to the HTTP client. Separate from `CliConfig` so
/// the client does not care where the key came from.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        cli.validate()?;
        Ok(Self {
            api_key: cli.resolved_api_key()?,
            base_url: cli.base_url.clone(),
            timeout_secs: cli.timeout_secs,
        })
    }
}

impl ConfigProvider for ClientConfig {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}
