//! Ticket ⨝ metric join
//!
//! Tickets are keyed by `id || ticketNumber`, metric rows by
//! `ticketNumber || id`. The ticket side is indexed once per request and each
//! metric row does a single lookup.

use crate::upstream::types::{non_empty, MetricRow, Ticket};
use std::collections::HashMap;
use tracing::debug;

/// Join key of a ticket; `None` when neither identifier is present.
pub fn ticket_key(ticket: &Ticket) -> Option<String> {
    non_empty(&ticket.id)
        .or_else(|| non_empty(&ticket.ticket_number))
        .map(str::to_string)
}

/// Join key of a metric row; `None` when neither identifier is present.
pub fn metric_key(row: &MetricRow) -> Option<String> {
    non_empty(&row.ticket_number)
        .or_else(|| non_empty(&row.id))
        .map(str::to_string)
}

/// The slice of a ticket the aggregation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketMeta {
    /// Lowercased raw status.
    pub status: String,
    pub assignee_id: String,
    pub assignee_name: String,
}

impl From<&Ticket> for TicketMeta {
    fn from(ticket: &Ticket) -> Self {
        Self {
            status: ticket.status.as_deref().unwrap_or_default().to_lowercase(),
            assignee_id: ticket.assignee_identifier().unwrap_or_default().to_string(),
            assignee_name: ticket.assignee_display_name().unwrap_or_default().to_string(),
        }
    }
}

/// A metric row together with the meta of the ticket it belongs to, if any.
#[derive(Debug, Clone, Copy)]
pub struct EnrichedRecord<'a> {
    /// Empty when the row carries no identifier.
    pub key: &'a str,
    pub metric: &'a MetricRow,
    pub ticket: Option<&'a TicketMeta>,
}

impl EnrichedRecord<'_> {
    /// Ticket status when known, else the row's own status; lowercased and trimmed.
    pub fn effective_status(&self) -> String {
        let from_ticket = self
            .ticket
            .map(|meta| meta.status.as_str())
            .filter(|s| !s.is_empty());
        match from_ticket {
            Some(status) => status.trim().to_string(),
            None => self
                .metric
                .status
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .trim()
                .to_string(),
        }
    }

    /// Metric `agentName`, then ticket assignee, then `"Unassigned"`.
    pub fn agent_name(&self) -> &str {
        non_empty(&self.metric.agent_name)
            .or_else(|| {
                self.ticket
                    .map(|meta| meta.assignee_name.as_str())
                    .filter(|name| !name.trim().is_empty())
            })
            .unwrap_or(UNASSIGNED)
    }
}

pub const UNASSIGNED: &str = "Unassigned";

/// Ticket meta keyed by join key.
#[derive(Debug, Default)]
pub struct TicketIndex {
    meta: HashMap<String, TicketMeta>,
    dropped: usize,
}

impl TicketIndex {
    /// Index tickets by join key; keyless tickets are skipped, later
    /// duplicates replace earlier ones.
    pub fn build<'a, I>(tickets: I) -> Self
    where
        I: IntoIterator<Item = &'a Ticket>,
    {
        let mut index = Self::default();
        for ticket in tickets {
            match ticket_key(ticket) {
                Some(key) => {
                    index.meta.insert(key, TicketMeta::from(ticket));
                }
                None => index.dropped += 1,
            }
        }
        if index.dropped > 0 {
            debug!(dropped = index.dropped, "Tickets without identifier left out of join");
        }
        index
    }

    pub fn len(&self) -> usize {
        self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// Tickets skipped for lacking a key.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, key: &str) -> Option<&TicketMeta> {
        self.meta.get(key)
    }

    /// Pair every metric row with its ticket meta.
    pub fn enrich<'a>(&'a self, rows: &'a [(Option<String>, MetricRow)]) -> Vec<EnrichedRecord<'a>> {
        rows.iter()
            .map(|(key, metric)| {
                let key = key.as_deref().unwrap_or_default();
                EnrichedRecord {
                    key,
                    metric,
                    ticket: if key.is_empty() { None } else { self.meta.get(key) },
                }
            })
            .collect()
    }
}

/// Pre-compute join keys so enriched records can borrow them.
pub fn keyed_metrics(rows: Vec<MetricRow>) -> Vec<(Option<String>, MetricRow)> {
    rows.into_iter().map(|row| (metric_key(&row), row)).collect()
}
