use crate::analytics::aggregate::AgentAggregate;
use crate::analytics::duration::hours_to_hm;
use crate::analytics::ranking::{leaderboard, RankTag};
use crate::export::{ExportRow, ToExportRow};
use serde::Serialize;

/// One leaderboard line as the performance table shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRow {
    pub position: usize,
    pub rank_tag: Option<RankTag>,
    pub agent_name: String,
    /// Resolved plus pending.
    pub total_tickets: u64,
    pub tickets_resolved: u64,
    pub pending_tickets: u64,
    pub avg_resolution_text: String,
    pub avg_first_response_text: String,
    pub avg_threads: String,
}

impl ToExportRow for PerformanceRow {
    fn to_export_row(&self) -> ExportRow {
        ExportRow::new()
            .with("Sl. No.", self.position)
            .with("Agent Name", self.agent_name.as_str())
            .with("Total Tickets", self.total_tickets)
            .with("Resolved", self.tickets_resolved)
            .with("Pending", self.pending_tickets)
            .with("Avg Resolution (H:MM)", self.avg_resolution_text.as_str())
            .with("Avg First Response (H:MM)", self.avg_first_response_text.as_str())
            .with("Avg Threads", self.avg_threads.as_str())
    }
}

/// Rank agents by tickets resolved and render the table columns.
pub fn build(agents: &[AgentAggregate]) -> Vec<PerformanceRow> {
    leaderboard(agents.to_vec())
        .into_iter()
        .map(|ranked| {
            let agent = ranked.agent;
            PerformanceRow {
                position: ranked.position,
                rank_tag: ranked.rank_tag,
                total_tickets: agent.tickets_resolved + agent.pending_tickets,
                tickets_resolved: agent.tickets_resolved,
                pending_tickets: agent.pending_tickets,
                avg_resolution_text: hours_to_hm(agent.avg_resolution_hours),
                avg_first_response_text: hours_to_hm(agent.avg_first_response_hours),
                avg_threads: format!("{:.2}", agent.avg_threads),
                agent_name: agent.agent_name,
            }
        })
        .collect()
}
