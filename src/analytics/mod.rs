//! Ticket analytics pipeline
//!
//! Leaf-first: duration and status parsing, the ticket/metric join, record
//! filters, per-agent and per-department accumulation, then ranking and age
//! bucketing.

pub mod aggregate;
pub mod directory;
pub mod duration;
pub mod filters;
pub mod join;
pub mod ranking;
pub mod status;
pub mod timestamps;

pub use aggregate::{
    aggregate_agents, AgentAccumulator, AgentAgeAccumulator, AgentAggregate, AgentAggregator,
    DepartmentAgeAccumulator, FirstResponseAveraging, PerformanceReport, PerformanceSummary,
};
pub use directory::DepartmentDirectory;
pub use duration::{hrs_to_minutes, parse_duration_hours};
pub use filters::{
    AgentFilter, DateRange, DateReference, DateWindow, DepartmentFilter, FilterSet, Predicate,
    SearchMode, SearchQuery, StatusFilter, TicketFields,
};
pub use join::{keyed_metrics, EnrichedRecord, TicketIndex, TicketMeta};
pub use ranking::{leaderboard, AgeBucket, AgeGrid, AgeScheme, GroupSpan, RankTag, RankedAgent};
pub use status::{normalize_status, Resolution, StatusClassifier, StatusTables};
pub use timestamps::LocalCalendar;
