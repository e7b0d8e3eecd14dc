use super::{open_service, print_json};
use crate::config::TicketPulseConfig;
use crate::service::PerformanceQuery;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Prints the performance endpoint's response body.
pub struct PerformanceCommand {
    pub snapshot: Option<PathBuf>,
    pub query: PerformanceQuery,
    pub config: TicketPulseConfig,
}

impl PerformanceCommand {
    pub fn new(snapshot: Option<PathBuf>, query: PerformanceQuery) -> Self {
        Self {
            snapshot,
            query,
            config: TicketPulseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TicketPulseConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let service = open_service(self.snapshot.as_deref(), &self.config).await?;
        let response = service.agent_performance(&self.query).await;

        print_json(&response.body)?;
        if !response.is_success() {
            bail!("Agent performance failed with status {}", response.status);
        }
        Ok(())
    }
}
