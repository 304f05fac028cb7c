//! CLI runner - loads configuration and drives one export

use crate::cli::commands::Cli;
use crate::config::AppConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::logging::{self, Logger, TracingLogger};
use crate::output::{JsonFileWriter, RecordWriter};
use crate::pagination::Pager;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

const LABEL: &str = "run";

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File the records were written to
    pub path: PathBuf,
    /// Records written
    pub records: usize,
    /// Total reported by the server
    pub total_count: u64,
    /// Page requests made
    pub pages: u32,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the export, installing the global log subscriber first
    pub async fn run(&self) -> Result<Option<ExportSummary>> {
        let config = self.prepare()?;

        logging::init(
            config.debug.logging_level,
            Some(config.log_file_path().as_path()),
        )?;
        let logger = TracingLogger::shared();

        logger.info(
            LABEL,
            &format!("Start {} - v{}", crate::NAME, crate::VERSION),
        );
        logger.debug(
            LABEL,
            &format!("Options: {}", to_json(&config.redacted())),
        );

        let result = if self.cli.dry_run {
            Self::dry_run(&config, logger.as_ref()).map(|()| None)
        } else {
            Self::export(&config, logger.clone()).await.map(Some)
        };

        if let Err(e) = &result {
            logger.error(LABEL, &format!("Error: {e}"));
        }
        logger.info(LABEL, &format!("End {} - v{}", crate::NAME, crate::VERSION));

        result
    }

    /// Load, override, and validate configuration; create output directories
    pub fn prepare(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;
        config.apply_overrides(self.cli.overrides());
        config.resolve_filenames(Utc::now());
        config.validate()?;

        std::fs::create_dir_all(&config.debug.path)?;
        std::fs::create_dir_all(&config.output.path)?;

        Ok(config)
    }

    /// Log what a run would request without touching the network
    pub fn dry_run(config: &AppConfig, logger: &dyn Logger) -> Result<()> {
        let spec = config.request_spec()?;
        let url = spec.url()?;
        logger.info(LABEL, &format!("Dry run: {} {url}", spec.method));
        logger.info(
            LABEL,
            &format!("Dry run query parameters: {:?}", spec.query_pairs()),
        );
        logger.info(
            LABEL,
            &format!(
                "Dry run output file: {}",
                config.output_file_path().display()
            ),
        );
        Ok(())
    }

    /// Fetch every page and write the records to the configured file
    pub async fn export(config: &AppConfig, logger: Arc<dyn Logger>) -> Result<ExportSummary> {
        let client = HttpClient::new(logger.clone())?;
        let pager = Pager::new(client, config.pager_config()?, logger.clone());

        logger.info(LABEL, "Calling the catalog API");
        let outcome = pager
            .fetch_all(config.request_spec()?, &config.retry_policy())
            .await?;

        let path = config.output_file_path();
        JsonFileWriter::new().write(&path, &outcome.records).await?;
        logger.info(LABEL, &format!("Response saved to: {}", path.display()));

        Ok(ExportSummary {
            path,
            records: outcome.records.len(),
            total_count: outcome.total_count,
            pages: outcome.pages,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::logging::MemoryLogger;
    use crate::types::LogLevel;

    #[test]
    fn test_prepare_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let cli = Cli {
            bearer: Some("t".to_string()),
            base_url: Some("https://api.example.com".to_string()),
            org_id: Some("o-1".to_string()),
            output_dir: Some(out.clone()),
            ..Default::default()
        };

        let config = Runner::new(cli).prepare().unwrap();
        assert!(out.is_dir());
        assert!(config.output.filename.ends_with("_results.json"));
        assert!(!config.output.filename.contains('{'));
    }

    #[test]
    fn test_prepare_reports_missing_token() {
        let cli = Cli {
            config: None,
            bearer: None,
            base_url: Some("https://api.example.com".to_string()),
            org_id: Some("o-1".to_string()),
            ..Default::default()
        };
        let err = Runner::new(cli).prepare().unwrap_err();
        assert!(err.to_string().contains("request.bearer"));
    }

    #[test]
    fn test_dry_run_logs_request() {
        let mut config = AppConfig::default();
        config.apply_overrides(Overrides {
            bearer: Some("t".to_string()),
            base_url: Some("https://api.example.com".to_string()),
            org_id: Some("o-1".to_string()),
            ..Default::default()
        });
        let logger = MemoryLogger::new();

        Runner::dry_run(&config, &logger).unwrap();

        assert!(logger.contains(
            LogLevel::Info,
            "GET https://api.example.com/content-discovery/v2/organizations/o-1/catalog-content"
        ));
        assert!(logger.contains(LogLevel::Info, "max"));
    }
}
