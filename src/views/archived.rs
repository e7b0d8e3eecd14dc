use super::{compare_names, ViewContext, ViewFilters};
use crate::analytics::filters::{DateReference, FilterSet, SearchMode, TicketFields};
use crate::analytics::join::UNASSIGNED;
use crate::export::{ExportRow, ToExportRow};
use crate::upstream::types::Ticket;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedRow {
    pub si_no: usize,
    pub agent_name: String,
    pub department_name: String,
    pub ticket_number: String,
    pub subject: String,
    pub status: String,
    pub created_time: String,
    pub closed_time: String,
    /// Closed minus created, in hours to two decimals.
    pub resolution_time_hours: Option<f64>,
}

impl ToExportRow for ArchivedRow {
    fn to_export_row(&self) -> ExportRow {
        ExportRow::new()
            .with("SI. NO.", self.si_no)
            .with("Agent Name", self.agent_name.as_str())
            .with("Department", self.department_name.as_str())
            .with("Ticket Number", self.ticket_number.as_str())
            .with("Subject", self.subject.as_str())
            .with("Status", self.status.as_str())
            .with("Created", self.created_time.as_str())
            .with("Closed", self.closed_time.as_str())
            .with("Resolution Time (Hours)", self.resolution_time_hours)
    }
}

fn resolution_hours(ticket: &Ticket, ctx: &ViewContext<'_>) -> Option<f64> {
    let created = ctx.calendar.parse(ticket.created_time()?)?;
    let closed = ctx.calendar.parse(ticket.closed_time()?)?;
    let minutes = closed.signed_duration_since(created).num_minutes();
    (minutes >= 0).then(|| (minutes as f64 / 60.0 * 100.0).round() / 100.0)
}

/// Archived tickets filtered by department, agent and created date, then
/// searched by ticket number or agent name prefix, sorted by agent name.
pub fn build(tickets: &[Ticket], filters: &ViewFilters, ctx: &ViewContext<'_>) -> Vec<ArchivedRow> {
    let set = FilterSet::new()
        .department(filters.department_id(), ctx.directory)
        .agents(filters.agent_filter())
        .dates(filters.range, DateReference::CreatedOnly, ctx.calendar)
        .search(filters.search_query(), SearchMode::Archived);

    let mut visible = set.apply(tickets);
    visible.sort_by(|a, b| {
        compare_names(
            a.agent_name().unwrap_or_default(),
            b.agent_name().unwrap_or_default(),
        )
    });

    visible
        .into_iter()
        .enumerate()
        .map(|(index, ticket)| {
            let format = |raw: Option<&str>| {
                raw.map(|t| ctx.calendar.format_local(t)).unwrap_or_default()
            };
            ArchivedRow {
                si_no: index + 1,
                agent_name: ticket.agent_name().unwrap_or(UNASSIGNED).to_string(),
                department_name: ctx.department_name(ticket.department_name(), ticket.department_id()),
                ticket_number: ticket.ticket_number().unwrap_or_default().to_string(),
                subject: ticket.subject.clone().unwrap_or_default(),
                status: ticket.status().unwrap_or_default().to_string(),
                created_time: format(ticket.created_time()),
                closed_time: format(ticket.closed_time()),
                resolution_time_hours: resolution_hours(ticket, ctx),
            }
        })
        .collect()
}
