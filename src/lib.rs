// ticket-pulse library - helpdesk ticket analytics
// This exposes the pipeline, views and upstream seam for the CLI and tests

pub mod analytics;
pub mod cli;
pub mod config;
pub mod export;
pub mod observability;
pub mod service;
pub mod telemetry;
pub mod upstream;
pub mod views;

// Re-export key types for easy access
pub use analytics::{
    AgentAggregate, FirstResponseAveraging, LocalCalendar, PerformanceReport, PerformanceSummary,
    StatusClassifier, StatusTables,
};
pub use config::{config, TicketPulseConfig};
pub use export::{export_to_path, CsvSink, ExportError, ExportRow, ExportSink, JsonSink, ToExportRow};
pub use observability::{upstream_metrics, OperationTimer, UpstreamMetrics};
pub use service::{DashboardData, EndpointResponse, PerformanceQuery, PerformanceService, ServiceError};
pub use telemetry::{create_request_span, generate_correlation_id, init_telemetry};
pub use upstream::{RateLimitedSource, Snapshot, SnapshotSource, TicketSource, UpstreamError};
pub use views::{paginate, Page, ViewContext, ViewFilters};
