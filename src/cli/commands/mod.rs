use crate::config::TicketPulseConfig;
use crate::export::{export_to_path, ExportRow, ToExportRow};
use crate::service::{DashboardData, PerformanceService};
use crate::upstream::{RateLimitedSource, SnapshotSource};
use crate::views::ViewContext;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod agent_age;
pub mod archived;
pub mod departments;
pub mod leaderboard;
pub mod metrics;
pub mod pending;
pub mod performance;

/// The service every command runs against.
pub type DashboardService = PerformanceService<RateLimitedSource<SnapshotSource>>;

/// Open the snapshot given on the command line, else the configured one.
pub async fn open_service(snapshot: Option<&Path>, config: &TicketPulseConfig) -> Result<DashboardService> {
    let path = snapshot
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.upstream.snapshot_path));

    let mut source = SnapshotSource::load(&path)
        .await
        .with_context(|| format!("Failed to open helpdesk snapshot {}", path.display()))?;
    if let Some(token) = &config.upstream.token {
        source = source.with_token(token.clone());
    }

    let source = RateLimitedSource::new(source, &config.upstream);
    Ok(PerformanceService::from_config(source, &config.analytics))
}

/// Load everything the table views need.
pub async fn load_dashboard(snapshot: Option<&Path>, config: &TicketPulseConfig) -> Result<(DashboardService, DashboardData)> {
    let service = open_service(snapshot, config).await?;
    let data = service
        .dashboard_data()
        .await
        .context("Failed to load dashboard data")?;
    Ok((service, data))
}

pub fn view_context<'a>(service: &DashboardService, data: &'a DashboardData) -> ViewContext<'a> {
    ViewContext::new(&data.directory, service.calendar(), Utc::now())
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Write rows to `path` when one was given.
pub fn export_if_requested<R: ToExportRow>(rows: &[R], path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let rows: Vec<ExportRow> = rows.iter().map(ToExportRow::to_export_row).collect();
    export_to_path(path, &rows).with_context(|| format!("Failed to export to {}", path.display()))?;
    eprintln!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
