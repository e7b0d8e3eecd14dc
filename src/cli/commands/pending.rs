use super::{export_if_requested, load_dashboard, print_json, view_context};
use crate::config::TicketPulseConfig;
use crate::views::{pending, ViewFilters};
use anyhow::Result;
use std::path::PathBuf;

pub struct PendingCommand {
    pub snapshot: Option<PathBuf>,
    pub filters: ViewFilters,
    pub export: Option<PathBuf>,
    pub config: TicketPulseConfig,
}

impl PendingCommand {
    pub fn new(snapshot: Option<PathBuf>, filters: ViewFilters, export: Option<PathBuf>) -> Self {
        Self {
            snapshot,
            filters,
            export,
            config: TicketPulseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TicketPulseConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let (service, data) = load_dashboard(self.snapshot.as_deref(), &self.config).await?;
        let ctx = view_context(&service, &data);
        let rows = pending::build(&data.active, &self.filters, &ctx);

        export_if_requested(&rows, self.export.as_deref())?;
        print_json(&rows)
    }
}
