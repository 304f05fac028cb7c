//! CLI arguments and parsing

use crate::config::Overrides;
use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Export the complete Percipio catalog to a JSON file
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "percipio-catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML); built-in defaults are used when omitted
    #[arg(short, long, env = "PERCIPIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token for the API
    #[arg(long, env = "BEARER", hide_env_values = true)]
    pub bearer: Option<String>,

    /// API base URL
    #[arg(long, env = "BASEURL")]
    pub base_url: Option<String>,

    /// Organization UUID
    #[arg(long, env = "ORGID")]
    pub org_id: Option<String>,

    /// Directory for the JSON document and the log file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Only return catalog changes since this ISO-8601 timestamp
    #[arg(long)]
    pub updated_since: Option<String>,

    /// Records per page (1-1000)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Validate configuration and show the request without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (debug level unless --log-level is given)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration values carried by the arguments
    pub fn overrides(&self) -> Overrides {
        let log_level = self
            .log_level
            .or_else(|| self.verbose.then_some(LogLevel::Debug));

        Overrides {
            bearer: self.bearer.clone(),
            base_url: self.base_url.clone(),
            org_id: self.org_id.clone(),
            output_dir: self.output_dir.clone(),
            log_level,
            updated_since: self.updated_since.clone(),
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "percipio-catalog",
            "--config",
            "cfg.yaml",
            "--bearer",
            "t",
            "--base-url",
            "https://api.example.com",
            "--org-id",
            "o-1",
            "--page-size",
            "10",
            "--log-level",
            "warn",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("cfg.yaml")));
        assert!(cli.dry_run);
        let overrides = cli.overrides();
        assert_eq!(overrides.bearer.as_deref(), Some("t"));
        assert_eq!(overrides.org_id.as_deref(), Some("o-1"));
        assert_eq!(overrides.page_size, Some(10));
        assert_eq!(overrides.log_level, Some(LogLevel::Warn));
    }

    #[test]
    fn test_verbose_means_debug() {
        let cli = Cli::try_parse_from(["percipio-catalog", "-v"]).unwrap();
        assert_eq!(cli.overrides().log_level, Some(LogLevel::Debug));

        let cli = Cli::try_parse_from(["percipio-catalog", "-v", "--log-level", "error"]).unwrap();
        assert_eq!(cli.overrides().log_level, Some(LogLevel::Error));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["percipio-catalog", "--log-level", "silly"]).is_err());
    }
}
