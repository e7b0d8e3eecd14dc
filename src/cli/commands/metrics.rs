use super::{export_if_requested, load_dashboard, print_json, view_context};
use crate::cli::OutputArgs;
use crate::config::TicketPulseConfig;
use crate::views::{metrics, paginate, AgentAverages, MetricsViewRow, Page, ViewFilters};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// One page of metric rows plus every agent's averages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsPage {
    #[serde(flatten)]
    page: Page<MetricsViewRow>,
    averages: Vec<AgentAverages>,
}

pub struct MetricsCommand {
    pub snapshot: Option<PathBuf>,
    pub filters: ViewFilters,
    pub output: OutputArgs,
    pub config: TicketPulseConfig,
}

impl MetricsCommand {
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
        let view = metrics::build(&data.metrics, &self.filters, &ctx);

        export_if_requested(&view.rows, self.output.export.as_deref())?;
        print_json(&MetricsPage {
            page: paginate(view.rows, self.output.page, self.config.views.metrics_page_size),
            averages: view.averages,
        })
    }
}
