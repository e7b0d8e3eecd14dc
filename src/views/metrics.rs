//! Per-ticket metrics table with per-agent averages

use super::{compare_names, ViewContext, ViewFilters};
use crate::analytics::duration::{hrs_to_hm, hrs_to_minutes, minutes_to_days_label, minutes_to_hm};
use crate::analytics::filters::{DateReference, FilterSet, SearchMode};
use crate::analytics::ranking::{group_with_spans, GroupSpan};
use crate::export::{ExportRow, ToExportRow};
use crate::upstream::types::{non_empty, MetricRow};
use serde::Serialize;
use std::collections::HashMap;

const UNKNOWN_AGENT: &str = "Unknown";

/// Strict-minute averages of one agent's visible rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAverages {
    pub agent_name: String,
    pub avg_first_response_min: Option<u64>,
    pub avg_first_response_hm: String,
    pub avg_resolution_min: Option<u64>,
    pub avg_resolution_hm: String,
}

#[derive(Debug, Default)]
struct MinuteSums {
    first_response_sum: u64,
    first_response_count: u64,
    resolution_sum: u64,
    resolution_count: u64,
}

fn rounded_average(sum: u64, count: u64) -> Option<u64> {
    (count > 0).then(|| (sum as f64 / count as f64).round() as u64)
}

fn hm_or_dash(minutes: Option<u64>) -> String {
    minutes.map(minutes_to_hm).unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsViewRow {
    pub agent_name: String,
    pub ticket_number: String,
    pub status: String,
    pub department_name: String,
    /// Created time in the local calendar.
    pub created_time: String,
    /// `H:MM`, empty when under a minute or not recorded.
    pub first_response_time: String,
    pub first_response_at: Option<String>,
    pub resolution_time: String,
    pub resolution_days: String,
    pub thread_count: u64,
    pub response_count: u64,
    pub outgoing_count: u64,
    pub reopen_count: u64,
    pub reassign_count: u64,
    /// `status: time` per staging entry.
    pub staging: Vec<String>,
    /// `agent: time` per handling agent.
    pub agents_handled: Vec<String>,
    pub avg_first_response: String,
    pub avg_first_response_days: String,
    #[serde(flatten)]
    pub span: GroupSpan,
}

impl ToExportRow for MetricsViewRow {
    fn to_export_row(&self) -> ExportRow {
        ExportRow::new()
            .with("Agent Name", self.agent_name.as_str())
            .with("Ticket Number", self.ticket_number.as_str())
            .with("Ticket Status", self.status.as_str())
            .with("Department", self.department_name.as_str())
            .with("Ticket Created", self.created_time.as_str())
            .with("First Response Time", self.first_response_time.as_str())
            .with("First Response At", self.first_response_at.clone().unwrap_or_default())
            .with("Resolution Time", self.resolution_time.as_str())
            .with("Threads", self.thread_count)
            .with("User Response", self.response_count)
            .with("Agent Response", self.outgoing_count)
            .with("Reopens", self.reopen_count)
            .with("Reassigns", self.reassign_count)
            .with("Staging (Status / Time)", self.staging.join("; "))
            .with("Agents (Name / Time)", self.agents_handled.join("; "))
            .with("Avg First Response Time", self.avg_first_response.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub rows: Vec<MetricsViewRow>,
    pub averages: Vec<AgentAverages>,
}

/// Filter by agent, department, status and created date, search, sort by
/// agent name, then attach each agent's averages.
pub fn build(metrics: &[MetricRow], filters: &ViewFilters, ctx: &ViewContext<'_>) -> MetricsView {
    let set = FilterSet::new()
        .agents(filters.agent_filter())
        .department(filters.department_id(), ctx.directory)
        .statuses(filters.status_filter())
        .dates(filters.range, DateReference::CreatedOnly, ctx.calendar)
        .search(filters.search_query(), SearchMode::Metrics);

    let mut visible = set.apply(metrics);
    visible.sort_by(|a, b| {
        compare_names(
            a.agent_name.as_deref().unwrap_or_default(),
            b.agent_name.as_deref().unwrap_or_default(),
        )
    });

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, MinuteSums> = HashMap::new();
    for row in &visible {
        let name = non_empty(&row.agent_name).unwrap_or(UNKNOWN_AGENT).to_string();
        let entry = sums.entry(name.clone()).or_insert_with(|| {
            order.push(name);
            MinuteSums::default()
        });
        if let Some(minutes) = hrs_to_minutes(row.first_response_time.as_deref()) {
            entry.first_response_sum = entry.first_response_sum.saturating_add(minutes);
            entry.first_response_count += 1;
        }
        if let Some(minutes) = hrs_to_minutes(row.resolution_time.as_deref()) {
            entry.resolution_sum = entry.resolution_sum.saturating_add(minutes);
            entry.resolution_count += 1;
        }
    }

    let averages: Vec<AgentAverages> = order
        .iter()
        .filter_map(|name| {
            let s = sums.get(name)?;
            let fr = rounded_average(s.first_response_sum, s.first_response_count);
            let res = rounded_average(s.resolution_sum, s.resolution_count);
            Some(AgentAverages {
                agent_name: name.clone(),
                avg_first_response_min: fr,
                avg_first_response_hm: hm_or_dash(fr),
                avg_resolution_min: res,
                avg_resolution_hm: hm_or_dash(res),
            })
        })
        .collect();
    let by_agent: HashMap<&str, &AgentAverages> =
        averages.iter().map(|a| (a.agent_name.as_str(), a)).collect();

    let grouped = group_with_spans(visible, |row| row.agent_name.clone().unwrap_or_default());
    let rows = grouped
        .into_iter()
        .map(|(row, span)| {
            let name = non_empty(&row.agent_name).unwrap_or(UNKNOWN_AGENT);
            let average = by_agent.get(name);
            let first_response_minutes = hrs_to_minutes(row.first_response_time.as_deref());
            let recorded_response = first_response_minutes.is_some_and(|m| m >= 1);

            MetricsViewRow {
                agent_name: row.agent_name.clone().unwrap_or_default(),
                ticket_number: non_empty(&row.ticket_number)
                    .or_else(|| non_empty(&row.id))
                    .unwrap_or_default()
                    .to_string(),
                status: row.status.clone().unwrap_or_default(),
                department_name: ctx.department_name(row.department_name.as_deref(), row.department_id.as_deref()),
                created_time: row
                    .created_time
                    .as_deref()
                    .map(|t| ctx.calendar.format_local(t))
                    .unwrap_or_default(),
                first_response_time: if recorded_response {
                    hrs_to_hm(row.first_response_time.as_deref())
                } else {
                    String::new()
                },
                first_response_at: ctx
                    .calendar
                    .first_response_at(row.created_time.as_deref(), row.first_response_time.as_deref()),
                resolution_time: hrs_to_hm(row.resolution_time.as_deref()),
                resolution_days: hrs_to_minutes(row.resolution_time.as_deref())
                    .map(minutes_to_days_label)
                    .unwrap_or_default(),
                thread_count: row.thread_count.unwrap_or_default(),
                response_count: row.response_count.unwrap_or_default(),
                outgoing_count: row.outgoing_count.unwrap_or_default(),
                reopen_count: row.reopen_count.unwrap_or_default(),
                reassign_count: row.reassign_count.unwrap_or_default(),
                staging: row
                    .staging_data
                    .iter()
                    .map(|s| {
                        format!(
                            "{}: {}",
                            s.status.as_deref().unwrap_or_default(),
                            s.handled_time.as_deref().unwrap_or_default()
                        )
                    })
                    .collect(),
                agents_handled: row
                    .agents_handled
                    .iter()
                    .map(|a| {
                        format!(
                            "{}: {}",
                            a.agent_name.as_deref().unwrap_or_default(),
                            a.handling_time.as_deref().unwrap_or_default()
                        )
                    })
                    .collect(),
                avg_first_response: average
                    .map(|a| a.avg_first_response_hm.clone())
                    .unwrap_or_else(|| "-".to_string()),
                avg_first_response_days: average
                    .and_then(|a| a.avg_first_response_min)
                    .map(minutes_to_days_label)
                    .unwrap_or_default(),
                span,
            }
        })
        .collect();

    MetricsView { rows, averages }
}
