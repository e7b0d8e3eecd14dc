pub mod errors;
pub mod rate_limited;
pub mod source;
pub mod types;

pub use errors::UpstreamError;
pub use rate_limited::RateLimitedSource;
pub use source::{Snapshot, SnapshotSource, TicketSource};
pub use types::{AccessToken, Assignee, Department, HandledEntry, MetricRow, StagingEntry, Ticket, TicketOrigin};
