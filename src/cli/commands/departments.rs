use super::{export_if_requested, load_dashboard, print_json, view_context};
use crate::config::TicketPulseConfig;
use crate::views::{department_age, ViewFilters};
use anyhow::Result;
use std::path::PathBuf;

/// Department-wise ticket age table.
pub struct DepartmentsCommand {
    pub snapshot: Option<PathBuf>,
    pub filters: ViewFilters,
    pub export: Option<PathBuf>,
    pub config: TicketPulseConfig,
}

impl DepartmentsCommand {
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
        let rows = department_age::build(&data.active, &self.filters, &ctx);

        export_if_requested(&rows, self.export.as_deref())?;
        print_json(&rows)
    }
}
