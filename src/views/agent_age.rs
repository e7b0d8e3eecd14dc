use super::department_age::AgeCell;
use super::{compare_names, ViewContext, ViewFilters};
use crate::analytics::aggregate::AgentAgeAccumulator;
use crate::analytics::filters::StatusFilter;
use crate::analytics::ranking::{AgeBucket, AgeGrid};
use crate::export::{ExportRow, ToExportRow};
use crate::upstream::types::Ticket;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAgeRow {
    pub si: usize,
    pub name: String,
    /// Set only while a department is selected.
    pub department_name: String,
    /// Tickets across the visible buckets and every pending status.
    pub total: usize,
    pub buckets: Vec<AgeCell>,
}

impl ToExportRow for AgentAgeRow {
    fn to_export_row(&self) -> ExportRow {
        let mut row = ExportRow::new()
            .with("SI. NO.", self.si)
            .with("Agent Name", self.name.as_str());
        if !self.department_name.is_empty() {
            row.push("Department", self.department_name.as_str());
        }
        row.push("Total Ticket Count", self.total);
        for cell in &self.buckets {
            row.push(cell.label.as_str(), cell.count);
        }
        row
    }
}

/// Agent-wise table plus the title it is shown under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAgeView {
    pub title: String,
    pub rows: Vec<AgentAgeRow>,
}

/// Agent-wise backlog in 1-15 / 16-30 / 30+ day buckets.
///
/// With a department selected only that department's grid counts; otherwise
/// the agent's grids are merged. Agents with nothing pending are dropped.
/// `buckets` picks the visible columns; empty means all three.
pub fn build(
    tickets: &[Ticket],
    filters: &ViewFilters,
    ctx: &ViewContext<'_>,
    buckets: &[AgeBucket],
) -> AgentAgeView {
    let visible: &[AgeBucket] = if buckets.is_empty() { &AgeBucket::ALL } else { buckets };
    let department = filters.department_id();
    let agents = filters.agent_filter();
    let statuses = filters.status_filter();
    let query = filters.search_query();

    let mut accumulator = AgentAgeAccumulator::new();
    for ticket in tickets {
        accumulator.add(ticket, &ctx.calendar, ctx.now);
    }

    let department_name = department
        .map(|id| ctx.directory.display_name(id).to_string())
        .unwrap_or_default();

    let mut rows: Vec<AgentAgeRow> = accumulator
        .finish()
        .into_iter()
        .filter(|(name, _)| agents.contains(name.trim()))
        .filter_map(|(name, by_department)| {
            let grid = match department {
                Some(id) => by_department.get(id).cloned()?,
                None => by_department.values().fold(AgeGrid::default(), |mut merged, grid| {
                    merged.merge(grid);
                    merged
                }),
            };
            if grid.is_empty() {
                return None;
            }
            let all_statuses = StatusFilter::default();
            let total = visible
                .iter()
                .map(|bucket| grid.bucket_total(*bucket, &all_statuses))
                .sum();
            Some(AgentAgeRow {
                si: 0,
                name,
                department_name: department_name.clone(),
                total,
                buckets: visible
                    .iter()
                    .map(|bucket| AgeCell::from_grid(AgentAgeAccumulator::SCHEME, *bucket, &grid, &statuses))
                    .collect(),
            })
        })
        .filter(|row| {
            query.is_empty()
                || row.name.to_lowercase().contains(query.as_str())
                || row.department_name.to_lowercase().contains(query.as_str())
                || row
                    .buckets
                    .iter()
                    .flat_map(|cell| cell.tickets.iter())
                    .any(|number| number.to_lowercase().contains(query.as_str()))
        })
        .collect();

    rows.sort_by(|a, b| compare_names(&a.name, &b.name));
    for (index, row) in rows.iter_mut().enumerate() {
        row.si = index + 1;
    }

    let title = if department.is_some() && !department_name.is_empty() {
        format!("{department_name} - Agent-wise Ticket Age")
    } else {
        "Agent-wise Ticket Age".to_string()
    };

    AgentAgeView { title, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{DepartmentDirectory, LocalCalendar};
    use crate::upstream::types::{Assignee, Department};
    use chrono::{TimeZone, Utc};

    fn ticket(number: &str, agent: &str, dept: &str, status: &str, created: &str) -> Ticket {
        Ticket {
            ticket_number: Some(number.into()),
            status: Some(status.into()),
            created_time: Some(created.into()),
            department_id: Some(dept.into()),
            assignee: Some(Assignee { id: None, display_name: Some(agent.into()) }),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket("101", "bob", "1", "Open", "2024-05-30T12:00:00Z"),
            ticket("102", "Alice", "1", "Hold", "2024-05-10T12:00:00Z"),
            ticket("103", "Alice", "2", "Escalated", "2024-04-01T12:00:00Z"),
            ticket("104", "Carol", "2", "Closed", "2024-05-30T12:00:00Z"),
        ]
    }

    fn build_with(filters: ViewFilters, buckets: &[AgeBucket]) -> AgentAgeView {
        let directory = DepartmentDirectory::new(vec![
            Department { id: "1".into(), name: "Support".into() },
            Department { id: "2".into(), name: "Billing".into() },
        ]);
        let ctx = ViewContext::new(
            &directory,
            LocalCalendar::utc(),
            Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap(),
        );
        build(&sample(), &filters, &ctx, buckets)
    }

    #[test]
    fn test_all_departments_merge_grids() {
        let view = build_with(ViewFilters::default(), &[]);
        assert_eq!(view.title, "Agent-wise Ticket Age");
        let names: Vec<_> = view.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Alice", "bob"]);

        let alice = &view.rows[0];
        assert_eq!(alice.total, 2);
        assert_eq!(alice.buckets[1].tickets, ["102"]);
        assert_eq!(alice.buckets[2].tickets, ["103"]);
        assert_eq!(alice.department_name, "");
    }

    #[test]
    fn test_selected_department_narrows_grid() {
        let filters = ViewFilters {
            department: Some("2".into()),
            ..Default::default()
        };
        let view = build_with(filters, &[]);
        assert_eq!(view.title, "Billing - Agent-wise Ticket Age");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "Alice");
        assert_eq!(view.rows[0].total, 1);
        assert_eq!(view.rows[0].department_name, "Billing");
    }

    #[test]
    fn test_visible_buckets_drive_total() {
        let view = build_with(ViewFilters::default(), &[AgeBucket::Third]);
        let alice = &view.rows[0];
        assert_eq!(alice.buckets.len(), 1);
        assert_eq!(alice.total, 1);
        assert_eq!(alice.buckets[0].label, "30+ Days Tickets");
    }

    #[test]
    fn test_search_matches_ticket_numbers() {
        let filters = ViewFilters {
            search: Some("101".into()),
            ..Default::default()
        };
        let view = build_with(filters, &[]);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "bob");
        assert_eq!(view.rows[0].si, 1);
    }

    #[test]
    fn test_agent_filter() {
        let filters = ViewFilters {
            agents: vec!["bob".into()],
            ..Default::default()
        };
        let view = build_with(filters, &[]);
        assert_eq!(view.rows.len(), 1);
        let export = view.rows[0].to_export_row();
        assert_eq!(export.columns().next(), Some("SI. NO."));
    }
}
