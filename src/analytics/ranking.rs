//! Leaderboard ranking and ticket age bucketing

use super::aggregate::AgentAggregate;
use super::filters::StatusFilter;
use super::status::STATUS_ORDER;
use serde::{Deserialize, Serialize};

/// Podium marker for the top three leaderboard positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankTag {
    Gold,
    Silver,
    Bronze,
}

impl RankTag {
    /// Tag for a zero-based leaderboard position.
    pub fn for_position(position: usize) -> Option<Self> {
        match position {
            0 => Some(RankTag::Gold),
            1 => Some(RankTag::Silver),
            2 => Some(RankTag::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAgent {
    /// One-based position in the full leaderboard.
    pub position: usize,
    pub rank_tag: Option<RankTag>,
    #[serde(flatten)]
    pub agent: AgentAggregate,
}

/// Order agents by tickets resolved, highest first. The sort is stable so
/// tied agents keep the order they were aggregated in.
pub fn leaderboard(mut agents: Vec<AgentAggregate>) -> Vec<RankedAgent> {
    agents.sort_by(|a, b| b.tickets_resolved.cmp(&a.tickets_resolved));
    agents
        .into_iter()
        .enumerate()
        .map(|(index, agent)| RankedAgent {
            position: index + 1,
            rank_tag: RankTag::for_position(index),
            agent,
        })
        .collect()
}

/// Age bucket boundaries for a backlog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeScheme {
    /// 1-15, 16-30 and 30+ days.
    Agent,
    /// 1-7, 8-15 and 15+ days.
    Department,
}

/// Position of a bucket within its scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBucket {
    First,
    Second,
    Third,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 3] = [AgeBucket::First, AgeBucket::Second, AgeBucket::Third];

    pub fn index(self) -> usize {
        match self {
            AgeBucket::First => 0,
            AgeBucket::Second => 1,
            AgeBucket::Third => 2,
        }
    }
}

impl AgeScheme {
    pub fn bounds(self) -> (u64, u64) {
        match self {
            AgeScheme::Agent => (15, 30),
            AgeScheme::Department => (7, 15),
        }
    }

    pub fn bucket_for(self, age_days: u64) -> AgeBucket {
        let (first, second) = self.bounds();
        if age_days <= first {
            AgeBucket::First
        } else if age_days <= second {
            AgeBucket::Second
        } else {
            AgeBucket::Third
        }
    }

    pub fn label(self, bucket: AgeBucket) -> &'static str {
        match (self, bucket) {
            (AgeScheme::Agent, AgeBucket::First) => "1 - 15 Days Tickets",
            (AgeScheme::Agent, AgeBucket::Second) => "16 - 30 Days Tickets",
            (AgeScheme::Agent, AgeBucket::Third) => "30+ Days Tickets",
            (AgeScheme::Department, AgeBucket::First) => "1 - 7 Days Tickets",
            (AgeScheme::Department, AgeBucket::Second) => "8 - 15 Days Tickets",
            (AgeScheme::Department, AgeBucket::Third) => "15+ Days Tickets",
        }
    }
}

/// Ticket numbers per (age bucket × pending status).
///
/// Only the four pending statuses have columns; anything else is rejected by
/// [`AgeGrid::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeGrid {
    cells: [[Vec<String>; 4]; 3],
}

impl AgeGrid {
    /// Record a ticket under a normalized status. Returns `false` when the
    /// status has no column.
    pub fn add(&mut self, bucket: AgeBucket, status: &str, ticket_number: impl Into<String>) -> bool {
        match STATUS_ORDER.iter().position(|s| *s == status) {
            Some(column) => {
                self.cells[bucket.index()][column].push(ticket_number.into());
                true
            }
            None => false,
        }
    }

    pub fn tickets(&self, bucket: AgeBucket, status: &str) -> &[String] {
        STATUS_ORDER
            .iter()
            .position(|s| *s == status)
            .map(|column| self.cells[bucket.index()][column].as_slice())
            .unwrap_or_default()
    }

    pub fn count(&self, bucket: AgeBucket, status: &str) -> usize {
        self.tickets(bucket, status).len()
    }

    /// Tickets in a bucket across the statuses the filter lets through, in
    /// status display order.
    pub fn bucket_tickets(&self, bucket: AgeBucket, statuses: &StatusFilter) -> Vec<&str> {
        STATUS_ORDER
            .iter()
            .filter(|status| statuses.contains(status))
            .flat_map(|status| self.tickets(bucket, status).iter().map(String::as_str))
            .collect()
    }

    pub fn bucket_total(&self, bucket: AgeBucket, statuses: &StatusFilter) -> usize {
        STATUS_ORDER
            .iter()
            .filter(|status| statuses.contains(status))
            .map(|status| self.count(bucket, status))
            .sum()
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &AgeGrid) {
        for (row, other_row) in self.cells.iter_mut().zip(&other.cells) {
            for (cell, other_cell) in row.iter_mut().zip(other_row) {
                cell.extend(other_cell.iter().cloned());
            }
        }
    }
}

/// Row-span metadata for a table grouped by agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpan {
    pub total_tickets: usize,
    pub is_first: bool,
    pub row_span: usize,
}

/// Group consecutive-or-not rows by `key`, in first-appearance order, and
/// attach span metadata to each row.
pub fn group_with_spans<T, K, F>(rows: Vec<T>, key: F) -> Vec<(T, GroupSpan)>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for row in rows {
        let k = key(&row);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(row),
            None => groups.push((k, vec![row])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(_, members)| {
            let size = members.len();
            members.into_iter().enumerate().map(move |(i, row)| {
                (
                    row,
                    GroupSpan {
                        total_tickets: size,
                        is_first: i == 0,
                        row_span: size,
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, resolved: u64) -> AgentAggregate {
        AgentAggregate {
            agent_name: name.to_string(),
            tickets_resolved: resolved,
            ..AgentAggregate::empty(name)
        }
    }

    #[test]
    fn test_leaderboard_ties_keep_input_order() {
        let ranked = leaderboard(vec![agent("A", 5), agent("B", 5), agent("C", 3)]);
        let names: Vec<_> = ranked.iter().map(|r| r.agent.agent_name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);

        let ranked = leaderboard(vec![agent("C", 3), agent("B", 5), agent("A", 5)]);
        let names: Vec<_> = ranked.iter().map(|r| r.agent.agent_name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn test_rank_tags() {
        let ranked = leaderboard(vec![agent("A", 4), agent("B", 3), agent("C", 2), agent("D", 1)]);
        let tags: Vec<_> = ranked.iter().map(|r| r.rank_tag).collect();
        assert_eq!(tags, [Some(RankTag::Gold), Some(RankTag::Silver), Some(RankTag::Bronze), None]);
        assert_eq!(ranked[3].position, 4);
    }

    #[test]
    fn test_agent_scheme_boundaries() {
        let scheme = AgeScheme::Agent;
        assert_eq!(scheme.bucket_for(0), AgeBucket::First);
        assert_eq!(scheme.bucket_for(15), AgeBucket::First);
        assert_eq!(scheme.bucket_for(16), AgeBucket::Second);
        assert_eq!(scheme.bucket_for(30), AgeBucket::Second);
        assert_eq!(scheme.bucket_for(31), AgeBucket::Third);
    }

    #[test]
    fn test_department_scheme_boundaries() {
        let scheme = AgeScheme::Department;
        assert_eq!(scheme.bucket_for(7), AgeBucket::First);
        assert_eq!(scheme.bucket_for(8), AgeBucket::Second);
        assert_eq!(scheme.bucket_for(15), AgeBucket::Second);
        assert_eq!(scheme.bucket_for(16), AgeBucket::Third);
        assert_eq!(scheme.label(AgeBucket::Third), "15+ Days Tickets");
    }

    #[test]
    fn test_age_grid_counts_pending_statuses_only() {
        let mut grid = AgeGrid::default();
        assert!(grid.add(AgeBucket::First, "open", "1"));
        assert!(grid.add(AgeBucket::First, "escalated", "2"));
        assert!(grid.add(AgeBucket::Third, "hold", "3"));
        assert!(!grid.add(AgeBucket::First, "closed", "4"));

        let all = StatusFilter::default();
        assert_eq!(grid.total(), 3);
        assert_eq!(grid.bucket_total(AgeBucket::First, &all), 2);
        assert_eq!(grid.bucket_tickets(AgeBucket::First, &all), ["1", "2"]);

        let only_open = StatusFilter::new(["open"]);
        assert_eq!(grid.bucket_total(AgeBucket::First, &only_open), 1);

        let mut merged = AgeGrid::default();
        merged.merge(&grid);
        merged.merge(&grid);
        assert_eq!(merged.count(AgeBucket::Third, "hold"), 2);
    }

    #[test]
    fn test_group_with_spans() {
        let rows = vec![("Alice", 1), ("Alice", 2), ("Bob", 3), ("Alice", 4)];
        let grouped = group_with_spans(rows, |(name, _)| *name);

        let order: Vec<_> = grouped.iter().map(|((_, n), _)| *n).collect();
        assert_eq!(order, [1, 2, 4, 3]);

        let (_, first) = grouped[0];
        assert_eq!(first, GroupSpan { total_tickets: 3, is_first: true, row_span: 3 });
        assert!(!grouped[1].1.is_first);
        assert_eq!(grouped[3].1, GroupSpan { total_tickets: 1, is_first: true, row_span: 1 });
    }
}
