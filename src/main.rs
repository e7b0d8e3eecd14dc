use anyhow::Result;
use clap::{CommandFactory, Parser};
use ticket_pulse::cli::commands::agent_age::AgentAgeCommand;
use ticket_pulse::cli::commands::archived::ArchivedCommand;
use ticket_pulse::cli::commands::departments::DepartmentsCommand;
use ticket_pulse::cli::commands::leaderboard::LeaderboardCommand;
use ticket_pulse::cli::commands::metrics::MetricsCommand;
use ticket_pulse::cli::commands::pending::PendingCommand;
use ticket_pulse::cli::commands::performance::PerformanceCommand;
use ticket_pulse::cli::{Cli, Commands};
use ticket_pulse::{config, init_telemetry, upstream_metrics};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config()?.clone();
    init_telemetry(&config.observability)?;

    let snapshot = cli.snapshot;
    let result = match cli.command {
        None => {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
        Some(Commands::Performance { query }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                PerformanceCommand::new(snapshot, (&query).into())
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::Leaderboard { query, output }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                LeaderboardCommand::new(snapshot, (&query).into(), output)
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::Metrics { filters, output }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                MetricsCommand::new(snapshot, filters.view_filters(), output)
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::Pending { filters, export }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                PendingCommand::new(snapshot, filters.view_filters(), export.export)
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::Archived { filters, output }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                ArchivedCommand::new(snapshot, filters.view_filters(), output)
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::Departments { filters, export }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                DepartmentsCommand::new(snapshot, filters.view_filters(), export.export)
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
        Some(Commands::AgentAge { filters, buckets, export }) => {
            tokio::runtime::Runtime::new()?.block_on(async {
                AgentAgeCommand::new(snapshot, filters.view_filters(), export.export)
                    .with_buckets(buckets.into_iter().map(Into::into).collect())
                    .with_config(config.clone())
                    .execute()
                    .await
            })
        }
    };

    if config.observability.metrics_enabled {
        upstream_metrics().log_stats();
    }
    result
}
