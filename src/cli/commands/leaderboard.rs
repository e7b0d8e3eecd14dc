use super::{export_if_requested, open_service, print_json};
use crate::cli::OutputArgs;
use crate::config::TicketPulseConfig;
use crate::service::PerformanceQuery;
use crate::views::{paginate, performance};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct LeaderboardCommand {
    pub snapshot: Option<PathBuf>,
    pub query: PerformanceQuery,
    pub output: OutputArgs,
    pub config: TicketPulseConfig,
}

impl LeaderboardCommand {
    pub fn new(snapshot: Option<PathBuf>, query: PerformanceQuery, output: OutputArgs) -> Self {
        Self {
            snapshot,
            query,
            output,
            config: TicketPulseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TicketPulseConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let service = open_service(self.snapshot.as_deref(), &self.config).await?;
        let report = service
            .compute_agent_performance(&self.query)
            .await
            .context("Failed to compute agent performance")?;

        let rows = performance::build(&report.agents);
        export_if_requested(&rows, self.output.export.as_deref())?;
        print_json(&paginate(rows, self.output.page, self.config.views.performance_page_size))
    }
}
