use super::{compare_names, ViewContext, ViewFilters};
use crate::analytics::filters::{DateReference, FilterSet, TicketFields};
use crate::analytics::join::UNASSIGNED;
use crate::analytics::ranking::{group_with_spans, GroupSpan};
use crate::analytics::status::{normalize_status, status_rank, STATUS_ORDER};
use crate::analytics::timestamps::age_in_days;
use crate::export::{ExportRow, ToExportRow};
use crate::upstream::types::Ticket;
use serde::Serialize;

/// One open ticket in the pending table, grouped under its agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRow {
    pub name: String,
    pub department: String,
    pub status: String,
    #[serde(skip)]
    pub status_rank: u8,
    pub ticket_number: String,
    pub ticket_created: String,
    /// Whole days since creation; `None` when the created time is unusable.
    pub days_not_responded: Option<u64>,
    #[serde(flatten)]
    pub span: GroupSpan,
}

impl PendingRow {
    fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.name,
            self.department,
            self.status,
            self.ticket_number,
            self.ticket_created,
            self.days_not_responded.map(|d| d.to_string()).unwrap_or_default()
        )
    }
}

impl ToExportRow for PendingRow {
    fn to_export_row(&self) -> ExportRow {
        ExportRow::new()
            .with("Agent Name", self.name.as_str())
            .with("Department Name", self.department.as_str())
            .with("Total Pending Tickets", self.span.total_tickets)
            .with("Ticket Status", self.status.as_str())
            .with("Ticket Number", self.ticket_number.as_str())
            .with("Ticket Created Date & Time", self.ticket_created.as_str())
            .with("Ticket Age Days", self.days_not_responded)
    }
}

/// Active tickets in one of the pending statuses, sorted by agent then status
/// order, searched, then grouped with row spans.
pub fn build(tickets: &[Ticket], filters: &ViewFilters, ctx: &ViewContext<'_>) -> Vec<PendingRow> {
    let set = FilterSet::new()
        .department(filters.department_id(), ctx.directory)
        .agents(filters.agent_filter())
        .statuses(filters.status_filter())
        .dates(filters.range, DateReference::CreatedOnly, ctx.calendar);

    let mut rows: Vec<PendingRow> = set
        .apply(tickets)
        .into_iter()
        .filter_map(|ticket| {
            let normalized = normalize_status(ticket.status().unwrap_or_default());
            let rank = status_rank(&normalized);
            if rank as usize >= STATUS_ORDER.len() {
                return None;
            }
            let created = ticket.created_time().and_then(|raw| ctx.calendar.parse(raw));
            Some(PendingRow {
                name: ticket.agent_name().unwrap_or(UNASSIGNED).to_string(),
                department: ctx.department_name(ticket.department_name(), ticket.department_id()),
                status: ticket.status().unwrap_or_default().to_string(),
                status_rank: rank,
                ticket_number: ticket.ticket_number().unwrap_or_default().to_string(),
                ticket_created: created
                    .as_ref()
                    .map(|at| ctx.calendar.format_instant(at))
                    .unwrap_or_default(),
                days_not_responded: created.map(|at| age_in_days(&at, ctx.now)),
                span: GroupSpan {
                    total_tickets: 0,
                    is_first: false,
                    row_span: 0,
                },
            })
        })
        .collect();

    rows.sort_by(|a, b| compare_names(&a.name, &b.name).then(a.status_rank.cmp(&b.status_rank)));

    let query = filters.search_query();
    if !query.is_empty() {
        rows.retain(|row| query.matches_text(&row.search_text()));
    }

    group_with_spans(rows, |row| row.name.clone())
        .into_iter()
        .map(|(row, span)| PendingRow { span, ..row })
        .collect()
}
