use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analytics::aggregate::FirstResponseAveraging;

/// Main configuration structure for ticket-pulse
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TicketPulseConfig {
    /// Upstream helpdesk source settings
    pub upstream: UpstreamConfig,
    /// Pipeline behaviour
    pub analytics: AnalyticsConfig,
    /// Table sizes for paginated views
    pub views: ViewConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Path of the helpdesk snapshot export
    pub snapshot_path: String,
    /// API token (can be set via env var)
    pub token: Option<String>,
    /// Sustained upstream request rate
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
    /// How long the department directory is cached
    pub department_cache_ttl_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            snapshot_path: "helpdesk-snapshot.json".to_string(),
            token: None,
            requests_per_second: 5,
            burst_capacity: 20,
            department_cache_ttl_seconds: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Offset of the dashboard's local calendar from UTC, in minutes.
    /// Date-range filters cut days at local midnight.
    pub utc_offset_minutes: i32,
    /// How per-agent first response averages are divided
    pub first_response_averaging: FirstResponseAveraging,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330, // IST
            first_response_averaging: FirstResponseAveraging::Approximate,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    pub metrics_page_size: usize,
    pub archived_page_size: usize,
    pub performance_page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            metrics_page_size: 200,
            archived_page_size: 500,
            performance_page_size: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human readable output
    pub json_logs: bool,
    /// Log upstream request counters when a command finishes
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TicketPulseConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (ticket-pulse.toml, .ticket-pulse-rc)
    /// 3. Environment variables (prefixed with TICKET_PULSE__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("ticket-pulse.toml").exists() {
            builder = builder.add_source(File::with_name("ticket-pulse"));
        }

        if Path::new(".ticket-pulse-rc").exists() {
            builder = builder.add_source(
                File::with_name(".ticket-pulse-rc").format(config::FileFormat::Toml),
            );
        }

        // Double underscore keeps snake_case keys like `snapshot_path` intact
        builder = builder.add_source(
            Environment::with_prefix("TICKET_PULSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut ticket_pulse_config: TicketPulseConfig = builder.build()?.try_deserialize()?;

        if ticket_pulse_config.upstream.token.is_none() {
            if let Ok(token) = std::env::var("TICKET_PULSE_TOKEN") {
                ticket_pulse_config.upstream.token = Some(token);
            }
        }

        Ok(ticket_pulse_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TicketPulseConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = TicketPulseConfig::load_env_file();
        TicketPulseConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TicketPulseConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_tables() {
        let config = TicketPulseConfig::default();
        assert_eq!(config.views.metrics_page_size, 200);
        assert_eq!(config.views.archived_page_size, 500);
        assert_eq!(config.analytics.utc_offset_minutes, 330);
        assert_eq!(
            config.analytics.first_response_averaging,
            FirstResponseAveraging::Approximate
        );
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket-pulse.toml");

        let mut config = TicketPulseConfig::default();
        config.upstream.snapshot_path = "exports/today.json".to_string();
        config.analytics.first_response_averaging = FirstResponseAveraging::Recorded;
        config.save_to_file(&path).unwrap();

        let loaded: TicketPulseConfig = Config::builder()
            .add_source(File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.upstream.snapshot_path, "exports/today.json");
        assert_eq!(
            loaded.analytics.first_response_averaging,
            FirstResponseAveraging::Recorded
        );
        assert_eq!(loaded.views.archived_page_size, 500);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let loaded: TicketPulseConfig = Config::builder()
            .add_source(config::File::from_str(
                "[views]\nmetrics_page_size = 50\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.views.metrics_page_size, 50);
        assert_eq!(loaded.views.archived_page_size, 500);
        assert_eq!(loaded.observability.log_level, "info");
    }
}
