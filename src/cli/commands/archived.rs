use super::{export_if_requested, load_dashboard, print_json, view_context};
use crate::cli::OutputArgs;
use crate::config::TicketPulseConfig;
use crate::views::{archived, paginate, ViewFilters};
use anyhow::Result;
use std::path::PathBuf;

pub struct ArchivedCommand {
    pub snapshot: Option<PathBuf>,
    pub filters: ViewFilters,
    pub output: OutputArgs,
    pub config: TicketPulseConfig,
}

impl ArchivedCommand {
    pub fn new(snapshot: Option<PathBuf>, filters: ViewFilters, output: OutputArgs) -> Self {
        Self {
            snapshot,
            filters,
            output,
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
        let rows = archived::build(&data.archived, &self.filters, &ctx);

        export_if_requested(&rows, self.output.export.as_deref())?;
        print_json(&paginate(rows, self.output.page, self.config.views.archived_page_size))
    }
}
