use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::query::DEFAULT_PAGE_SIZE;
use crate::service::{DEFAULT_FAILURE_RATE, DEFAULT_LOAD_DELAY};

/// Runtime settings, from flags or environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "company-directory",
    version,
    about = "Browse and edit a company directory in the terminal"
)]
pub struct Config {
    /// Probability (0.0 - 1.0) that a simulated load fails.
    #[arg(long, env = "COMPANY_DIR_FAILURE_RATE", default_value_t = DEFAULT_FAILURE_RATE)]
    pub failure_rate: f64,

    /// Seed for the failure simulation; random when omitted.
    #[arg(long, env = "COMPANY_DIR_SEED")]
    pub seed: Option<u64>,

    /// Simulated load latency in milliseconds.
    #[arg(
        long,
        env = "COMPANY_DIR_LOAD_DELAY_MS",
        default_value_t = DEFAULT_LOAD_DELAY.as_millis() as u64
    )]
    pub load_delay_ms: u64,

    /// Companies per page.
    #[arg(long, env = "COMPANY_DIR_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Where to write the log. Defaults to the platform data directory.
    #[arg(long, env = "COMPANY_DIR_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Start with an empty directory instead of the demo companies.
    #[arg(long)]
    pub no_seed_data: bool,

    /// Open the detail view for this address on startup, e.g. `company/3`.
    #[arg(long)]
    pub open: Option<String>,
}

impl Config {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["company-directory"]).unwrap();
        assert_eq!(config.page_size(), 9);
        assert_eq!(config.load_delay(), Duration::from_millis(1500));
        assert!(config.seed.is_none());
        assert!(!config.no_seed_data);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "company-directory",
            "--failure-rate",
            "0",
            "--seed",
            "7",
            "--page-size",
            "0",
            "--open",
            "company/4",
        ])
        .unwrap();
        assert_eq!(config.failure_rate, 0.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.page_size(), 1);
        assert_eq!(config.open.as_deref(), Some("company/4"));
    }
}
