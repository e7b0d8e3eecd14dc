use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Canonical status tokens the dashboard understands.
pub const OPEN: &str = "open";
pub const HOLD: &str = "hold";
pub const IN_PROGRESS: &str = "inProgress";
pub const ESCALATED: &str = "escalated";

/// Order pending/age tables list statuses in.
pub const STATUS_ORDER: [&str; 4] = [OPEN, HOLD, IN_PROGRESS, ESCALATED];

const RESOLVED_STATUSES: [&str; 3] = ["closed", "resolved", "archived"];
const PENDING_STATUSES: [&str; 5] = ["open", "hold", "inprogress", "in progress", "escalated"];

/// Map free text onto the canonical vocabulary.
///
/// Unknown values pass through lowercased with separators removed, so a new
/// upstream status shows up as its own bucket instead of being dropped.
pub fn normalize_status(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase();

    match cleaned.as_str() {
        "hold" | "onhold" => HOLD.to_string(),
        "inprogress" => IN_PROGRESS.to_string(),
        "open" => OPEN.to_string(),
        "escalated" => ESCALATED.to_string(),
        _ => cleaned,
    }
}

/// Sort rank of a normalized status; unknown statuses sort last.
pub fn status_rank(normalized: &str) -> u8 {
    STATUS_ORDER
        .iter()
        .position(|s| *s == normalized)
        .map(|p| p as u8)
        .unwrap_or(99)
}

/// Outcome of classifying a ticket status for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Resolved,
    Pending,
    /// Neither resolved nor pending. Counted as seen, nothing else.
    Other,
}

/// Fixed resolved/pending vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTables {
    resolved: HashSet<String>,
    pending: HashSet<String>,
}

impl StatusTables {
    pub fn new<I, J, S>(resolved: I, pending: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resolved: resolved.into_iter().map(Into::into).collect(),
            pending: pending.into_iter().map(Into::into).collect(),
        }
    }

    /// The helpdesk's standard tables, built once per process.
    pub fn standard() -> &'static StatusTables {
        static STANDARD: LazyLock<StatusTables> =
            LazyLock::new(|| StatusTables::new(RESOLVED_STATUSES, PENDING_STATUSES));
        &STANDARD
    }
}

/// Classifies raw status text against injected [`StatusTables`].
///
/// Classification keys are trimmed and lowercased only: `"In Progress"` is
/// pending while `"In-Progress"` is not.
#[derive(Debug, Clone, Copy)]
pub struct StatusClassifier<'t> {
    tables: &'t StatusTables,
}

impl Default for StatusClassifier<'static> {
    fn default() -> Self {
        Self::new(StatusTables::standard())
    }
}

impl<'t> StatusClassifier<'t> {
    pub fn new(tables: &'t StatusTables) -> Self {
        Self { tables }
    }

    pub fn key(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn classify(&self, raw: &str) -> Resolution {
        let key = Self::key(raw);
        if self.tables.resolved.contains(&key) {
            Resolution::Resolved
        } else if self.tables.pending.contains(&key) {
            Resolution::Pending
        } else {
            Resolution::Other
        }
    }

    pub fn is_escalated(&self, raw: &str) -> bool {
        Self::key(raw) == ESCALATED
    }
}
