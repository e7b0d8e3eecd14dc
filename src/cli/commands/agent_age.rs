use super::{export_if_requested, load_dashboard, print_json, view_context};
use crate::analytics::AgeBucket;
use crate::config::TicketPulseConfig;
use crate::views::{agent_age, ViewFilters};
use anyhow::Result;
use std::path::PathBuf;

/// Agent-wise ticket age table.
pub struct AgentAgeCommand {
    pub snapshot: Option<PathBuf>,
    pub filters: ViewFilters,
    pub buckets: Vec<AgeBucket>,
    pub export: Option<PathBuf>,
    pub config: TicketPulseConfig,
}

impl AgentAgeCommand {
    pub fn new(snapshot: Option<PathBuf>, filters: ViewFilters, export: Option<PathBuf>) -> Self {
        Self {
            snapshot,
            filters,
            buckets: Vec::new(),
            export,
            config: TicketPulseConfig::default(),
        }
    }

    /// Empty shows every bucket.
    pub fn with_buckets(mut self, buckets: Vec<AgeBucket>) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_config(mut self, config: TicketPulseConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let (service, data) = load_dashboard(self.snapshot.as_deref(), &self.config).await?;
        let ctx = view_context(&service, &data);
        let view = agent_age::build(&data.active, &self.filters, &ctx, &self.buckets);

        export_if_requested(&view.rows, self.export.as_deref())?;
        print_json(&view)
    }
}
