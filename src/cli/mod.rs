use crate::analytics::{AgeBucket, DateRange};
use crate::service::{parse_query_date, PerformanceQuery};
use crate::views::ViewFilters;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "ticket-pulse")]
#[command(about = "Helpdesk ticket analytics: agent performance, backlog age and ticket tables")]
#[command(long_about = "ticket-pulse reads a helpdesk export (active tickets, archived tickets, \
                       per-ticket metrics and the department list) and prints dashboard tables as JSON. \
                       Start with 'ticket-pulse performance' for the agent summary.")]
pub struct Cli {
    /// Helpdesk snapshot to read
    #[arg(long, global = true, help = "Path of the helpdesk snapshot JSON (defaults to upstream.snapshot_path)")]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Agent performance summary, as the performance endpoint returns it
    Performance {
        #[command(flatten)]
        query: PerformanceArgs,
    },
    /// Agents ranked by tickets resolved
    Leaderboard {
        #[command(flatten)]
        query: PerformanceArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-ticket metrics grouped by agent
    Metrics {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Open, on hold, in progress and escalated tickets per agent
    Pending {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Archived tickets with their resolution time
    Archived {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Department-wise backlog by ticket age
    Departments {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Agent-wise backlog by ticket age
    AgentAge {
        #[command(flatten)]
        filters: FilterArgs,
        /// Age columns to show
        #[arg(long = "bucket", value_enum, help = "Age column to show; repeat for several (default: all)")]
        buckets: Vec<BucketArg>,
        #[command(flatten)]
        export: ExportArgs,
    },
}

/// Filters shared by the table commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, help = "First day of the date range (YYYY-MM-DD), inclusive")]
    pub from: Option<String>,
    #[arg(long, help = "Last day of the date range (YYYY-MM-DD), inclusive")]
    pub to: Option<String>,
    #[arg(long, help = "Department id, or 'all'")]
    pub department: Option<String>,
    #[arg(long = "agent", help = "Agent name; repeat for several")]
    pub agents: Vec<String>,
    #[arg(long = "status", help = "Status (open, hold, in progress, escalated); repeat for several")]
    pub statuses: Vec<String>,
    #[arg(long, help = "Case-insensitive search text")]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn view_filters(&self) -> ViewFilters {
        ViewFilters {
            department: self.department.clone(),
            agents: self.agents.clone(),
            statuses: self.statuses.clone(),
            range: DateRange::new(
                parse_query_date(self.from.as_deref()),
                parse_query_date(self.to.as_deref()),
            ),
            search: self.search.clone(),
        }
    }
}

/// Parameters of the performance endpoint.
#[derive(Args, Debug, Clone, Default)]
pub struct PerformanceArgs {
    #[arg(long, help = "First day of the date range (YYYY-MM-DD), inclusive")]
    pub from: Option<String>,
    #[arg(long, help = "Last day of the date range (YYYY-MM-DD), inclusive")]
    pub to: Option<String>,
    #[arg(long, help = "Department id, or 'all'")]
    pub department: Option<String>,
    #[arg(long = "agent", help = "Assignee id, or 'all'")]
    pub agent_id: Option<String>,
}

impl From<&PerformanceArgs> for PerformanceQuery {
    fn from(args: &PerformanceArgs) -> Self {
        PerformanceQuery {
            from_date: args.from.clone(),
            to_date: args.to.clone(),
            department_id: args.department.clone(),
            agent_id: args.agent_id.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, default_value = "1", help = "Page to print (1-based)")]
    pub page: usize,
    #[arg(long, help = "Also write every filtered row to this .csv or .json file")]
    pub export: Option<PathBuf>,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self { page: 1, export: None }
    }
}

/// For tables printed whole.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    #[arg(long, help = "Also write the rows to this .csv or .json file")]
    pub export: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketArg {
    /// 1 - 15 days
    First,
    /// 16 - 30 days
    Second,
    /// 30+ days
    Third,
}

impl From<BucketArg> for AgeBucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::First => AgeBucket::First,
            BucketArg::Second => AgeBucket::Second,
            BucketArg::Third => AgeBucket::Third,
        }
    }
}
