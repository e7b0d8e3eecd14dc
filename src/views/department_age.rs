use super::{compare_names, ViewContext, ViewFilters};
use crate::analytics::aggregate::DepartmentAgeAccumulator;
use crate::analytics::filters::{FilterSet, StatusFilter};
use crate::analytics::ranking::{AgeBucket, AgeGrid, AgeScheme};
use crate::analytics::status::STATUS_ORDER;
use crate::export::{ExportRow, ToExportRow};
use crate::upstream::types::Ticket;
use serde::Serialize;

/// Tickets of one status inside an age bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCell {
    pub status: String,
    pub count: usize,
    pub tickets: Vec<String>,
}

/// One age bucket column of a backlog row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCell {
    pub label: String,
    pub count: usize,
    pub tickets: Vec<String>,
    /// Per-status breakdown; only filled when statuses are selected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_status: Vec<StatusCell>,
}

impl AgeCell {
    pub(crate) fn from_grid(scheme: AgeScheme, bucket: AgeBucket, grid: &AgeGrid, statuses: &StatusFilter) -> Self {
        let by_status = if statuses.is_empty() {
            Vec::new()
        } else {
            STATUS_ORDER
                .iter()
                .filter(|status| statuses.contains(status))
                .map(|status| StatusCell {
                    status: status.to_string(),
                    count: grid.count(bucket, status),
                    tickets: grid.tickets(bucket, status).to_vec(),
                })
                .collect()
        };
        let tickets: Vec<String> = grid
            .bucket_tickets(bucket, statuses)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            label: scheme.label(bucket).to_string(),
            count: tickets.len(),
            tickets,
            by_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAgeRow {
    pub si: usize,
    pub department_id: String,
    pub department_name: String,
    /// Every pending ticket of the department, across all buckets and statuses.
    pub total: usize,
    pub buckets: Vec<AgeCell>,
}

impl ToExportRow for DepartmentAgeRow {
    fn to_export_row(&self) -> ExportRow {
        let mut row = ExportRow::new()
            .with("SI. No.", self.si)
            .with("Department Name", self.department_name.as_str())
            .with("Total Ticket Count", self.total);
        for cell in &self.buckets {
            row.push(cell.label.as_str(), cell.count);
        }
        row
    }
}

/// Department-wise backlog in 1-7 / 8-15 / 15+ day buckets. Every directory
/// department gets a row, sorted by name; search matches name or total.
pub fn build(tickets: &[Ticket], filters: &ViewFilters, ctx: &ViewContext<'_>) -> Vec<DepartmentAgeRow> {
    let scope = FilterSet::new().agents(filters.agent_filter());
    let statuses = filters.status_filter();

    let mut accumulator = DepartmentAgeAccumulator::new(ctx.directory);
    for ticket in scope.apply(tickets) {
        accumulator.add(ticket, &ctx.calendar, ctx.now);
    }

    let mut rows: Vec<DepartmentAgeRow> = accumulator
        .finish()
        .into_iter()
        .map(|(department_id, department_name, grid)| DepartmentAgeRow {
            si: 0,
            department_id,
            department_name,
            total: grid.total(),
            buckets: AgeBucket::ALL
                .iter()
                .map(|bucket| {
                    AgeCell::from_grid(DepartmentAgeAccumulator::SCHEME, *bucket, &grid, &statuses)
                })
                .collect(),
        })
        .collect();

    rows.sort_by(|a, b| compare_names(&a.department_name, &b.department_name));
    for (index, row) in rows.iter_mut().enumerate() {
        row.si = index + 1;
    }

    let query = filters.search_query();
    rows.retain(|row| query.matches_text(&format!("{} {}", row.department_name, row.total)));
    rows
}
