//! Per-agent and per-department accumulation
//!
//! Accumulators only hold sums and id sets; every average is derived when the
//! accumulator is finalized.

use super::directory::DepartmentDirectory;
use super::duration::parse_duration_hours;
use super::filters::TicketFields;
use super::join::{EnrichedRecord, UNASSIGNED};
use super::ranking::{AgeGrid, AgeScheme};
use super::status::{normalize_status, Resolution, StatusClassifier};
use super::timestamps::{age_in_days, LocalCalendar};
use crate::upstream::types::Ticket;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// How an agent's average first response is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstResponseAveraging {
    /// Total first response divided by tickets created, once any first
    /// response was recorded.
    #[default]
    Approximate,
    /// Total first response divided by the rows that recorded one.
    Recorded,
}

/// Running totals for one agent.
#[derive(Debug, Clone, Default)]
pub struct AgentAccumulator {
    name: String,
    ticket_ids: HashSet<String>,
    resolved_ids: HashSet<String>,
    pending_ids: HashSet<String>,
    total_resolution_hours: f64,
    total_first_response_hours: f64,
    first_response_samples: u64,
    total_threads: u64,
    escalated: u64,
    single_touch: u64,
    satisfaction_sum: f64,
    satisfaction_count: u64,
}

impl AgentAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn resolved_ids(&self) -> &HashSet<String> {
        &self.resolved_ids
    }

    pub(crate) fn pending_ids(&self) -> &HashSet<String> {
        &self.pending_ids
    }

    pub fn observe(&mut self, record: &EnrichedRecord<'_>, classifier: &StatusClassifier<'_>) {
        let status = record.effective_status();

        if !record.key.is_empty() {
            let key = record.key;
            self.ticket_ids.insert(key.to_string());
            match classifier.classify(&status) {
                Resolution::Resolved => {
                    self.pending_ids.remove(key);
                    self.resolved_ids.insert(key.to_string());
                }
                Resolution::Pending if !self.resolved_ids.contains(key) => {
                    self.pending_ids.insert(key.to_string());
                }
                Resolution::Pending | Resolution::Other => {}
            }
        }

        self.total_resolution_hours += parse_duration_hours(record.metric.resolution_time.as_deref());

        let first_response = parse_duration_hours(record.metric.first_response_time.as_deref());
        self.total_first_response_hours += first_response;
        if first_response > 0.0 {
            self.first_response_samples += 1;
        }

        let threads = record.metric.effective_thread_count();
        self.total_threads += threads;

        if classifier.is_escalated(&status) {
            self.escalated += 1;
        }
        if threads == 1 {
            self.single_touch += 1;
        }
    }

    pub fn finalize(&self, averaging: FirstResponseAveraging) -> AgentAggregate {
        let created = self.ticket_ids.len() as u64;
        let resolved = self.resolved_ids.len() as u64;

        let avg_resolution_hours = ratio(self.total_resolution_hours, resolved);
        let avg_first_response_hours = match averaging {
            FirstResponseAveraging::Approximate if self.total_first_response_hours > 0.0 => {
                ratio(self.total_first_response_hours, created)
            }
            FirstResponseAveraging::Approximate => 0.0,
            FirstResponseAveraging::Recorded => {
                ratio(self.total_first_response_hours, self.first_response_samples)
            }
        };

        AgentAggregate {
            agent_name: self.name.clone(),
            tickets_created: created,
            tickets_resolved: resolved,
            pending_tickets: self.pending_ids.len() as u64,
            avg_resolution_hours,
            avg_first_response_hours,
            avg_threads: ratio(self.total_threads as f64, created),
            escalated_count: self.escalated,
            single_touch_count: self.single_touch,
            avg_satisfaction: (self.satisfaction_count > 0)
                .then(|| self.satisfaction_sum / self.satisfaction_count as f64),
        }
    }
}

fn ratio(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Finalized per-agent performance figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAggregate {
    pub agent_name: String,
    pub tickets_created: u64,
    pub tickets_resolved: u64,
    pub pending_tickets: u64,
    pub avg_resolution_hours: f64,
    pub avg_first_response_hours: f64,
    pub avg_threads: f64,
    pub escalated_count: u64,
    pub single_touch_count: u64,
    pub avg_satisfaction: Option<f64>,
}

impl AgentAggregate {
    /// An agent with nothing recorded.
    pub fn empty(name: impl Into<String>) -> Self {
        AgentAccumulator::new(name).finalize(FirstResponseAveraging::default())
    }
}

/// Groups enriched records by agent, keeping first-appearance order.
#[derive(Debug)]
pub struct AgentAggregator<'t> {
    classifier: StatusClassifier<'t>,
    averaging: FirstResponseAveraging,
    agents: Vec<AgentAccumulator>,
    slots: HashMap<String, usize>,
}

impl<'t> AgentAggregator<'t> {
    pub fn new(classifier: StatusClassifier<'t>, averaging: FirstResponseAveraging) -> Self {
        Self {
            classifier,
            averaging,
            agents: Vec::new(),
            slots: HashMap::new(),
        }
    }

    pub fn observe(&mut self, record: &EnrichedRecord<'_>) {
        let name = record.agent_name();
        let slot = match self.slots.get(name) {
            Some(&slot) => slot,
            None => {
                self.slots.insert(name.to_string(), self.agents.len());
                self.agents.push(AgentAccumulator::new(name));
                self.agents.len() - 1
            }
        };
        self.agents[slot].observe(record, &self.classifier);
    }

    pub(crate) fn accumulators(&self) -> &[AgentAccumulator] {
        &self.agents
    }

    pub fn finish(self) -> Vec<AgentAggregate> {
        self.agents
            .iter()
            .map(|agent| agent.finalize(self.averaging))
            .collect()
    }
}

/// Aggregate enriched records into per-agent figures.
pub fn aggregate_agents(
    records: &[EnrichedRecord<'_>],
    classifier: StatusClassifier<'_>,
    averaging: FirstResponseAveraging,
) -> Vec<AgentAggregate> {
    let mut aggregator = AgentAggregator::new(classifier, averaging);
    for record in records {
        aggregator.observe(record);
    }
    let agents = aggregator.finish();
    debug!(rows = records.len(), agents = agents.len(), "Aggregated agent metrics");
    agents
}

/// Dashboard-wide totals derived from the per-agent figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub tickets_created: u64,
    pub tickets_resolved: u64,
    pub pending_tickets: u64,
    pub escalated_tickets: u64,
    pub single_touch_tickets: u64,
    pub total_threads: f64,
    pub total_resolution_hours: f64,
    pub total_first_response_hours: f64,
    pub avg_threads: f64,
    pub avg_resolution_hours: f64,
    pub avg_first_response_hours: f64,
}

impl PerformanceSummary {
    /// Totals are weighted back from each agent's averages.
    pub fn from_agents(agents: &[AgentAggregate]) -> Self {
        let mut summary = agents.iter().fold(Self::default(), |mut acc, agent| {
            acc.tickets_created += agent.tickets_created;
            acc.tickets_resolved += agent.tickets_resolved;
            acc.pending_tickets += agent.pending_tickets;
            acc.escalated_tickets += agent.escalated_count;
            acc.single_touch_tickets += agent.single_touch_count;
            acc.total_threads += agent.avg_threads * agent.tickets_created as f64;
            acc.total_resolution_hours += agent.avg_resolution_hours * agent.tickets_resolved as f64;
            acc.total_first_response_hours +=
                agent.avg_first_response_hours * agent.tickets_created as f64;
            acc
        });

        summary.avg_threads = ratio(summary.total_threads, summary.tickets_created);
        summary.avg_resolution_hours = ratio(summary.total_resolution_hours, summary.tickets_resolved);
        summary.avg_first_response_hours =
            ratio(summary.total_first_response_hours, summary.tickets_created);
        summary
    }
}

/// Body of the agent performance response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    #[serde(serialize_with = "summary_or_empty")]
    pub summary: Option<PerformanceSummary>,
    pub agents: Vec<AgentAggregate>,
}

impl PerformanceReport {
    pub fn empty() -> Self {
        Self {
            summary: None,
            agents: Vec::new(),
        }
    }

    /// Report over aggregated metric rows. The summary is always present,
    /// zeroed when no row produced an agent.
    pub fn from_agents(agents: Vec<AgentAggregate>) -> Self {
        Self {
            summary: Some(PerformanceSummary::from_agents(&agents)),
            agents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.agents.is_empty()
    }
}

fn summary_or_empty<S>(summary: &Option<PerformanceSummary>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match summary {
        Some(summary) => summary.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Aged backlog of a ticket: where it falls and under which status.
struct AgedTicket<'a> {
    number: &'a str,
    status: String,
    age_days: u64,
}

fn aged<'a>(ticket: &'a Ticket, calendar: &LocalCalendar, now: DateTime<Utc>) -> Option<AgedTicket<'a>> {
    let created = calendar.parse(ticket.created_time()?)?;
    Some(AgedTicket {
        number: ticket.ticket_number()?,
        status: normalize_status(ticket.status().unwrap_or_default()),
        age_days: age_in_days(&created, now),
    })
}

/// Backlog age per department, seeded from the directory.
#[derive(Debug, Clone)]
pub struct DepartmentAgeAccumulator {
    grids: Vec<(String, String, AgeGrid)>,
    slots: HashMap<String, usize>,
}

impl DepartmentAgeAccumulator {
    pub const SCHEME: AgeScheme = AgeScheme::Department;

    pub fn new(directory: &DepartmentDirectory) -> Self {
        let mut grids = Vec::with_capacity(directory.len());
        let mut slots = HashMap::with_capacity(directory.len());
        for department in directory.iter() {
            slots.insert(department.id.clone(), grids.len());
            let name = if department.name.is_empty() {
                department.id.clone()
            } else {
                department.name.clone()
            };
            grids.push((department.id.clone(), name, AgeGrid::default()));
        }
        Self { grids, slots }
    }

    /// Tickets of unknown departments, without a usable created time, or
    /// outside the pending statuses are skipped. Returns whether it counted.
    pub fn add(&mut self, ticket: &Ticket, calendar: &LocalCalendar, now: DateTime<Utc>) -> bool {
        let Some(&slot) = ticket.department_id().and_then(|id| self.slots.get(id)) else {
            return false;
        };
        let Some(aged) = aged(ticket, calendar, now) else {
            return false;
        };
        let bucket = Self::SCHEME.bucket_for(aged.age_days);
        self.grids[slot].2.add(bucket, &aged.status, aged.number)
    }

    /// `(department id, department name, grid)` in directory order.
    pub fn finish(self) -> Vec<(String, String, AgeGrid)> {
        self.grids
    }
}

/// Backlog age per agent and department.
#[derive(Debug, Clone, Default)]
pub struct AgentAgeAccumulator {
    agents: BTreeMap<String, BTreeMap<String, AgeGrid>>,
}

impl AgentAgeAccumulator {
    pub const SCHEME: AgeScheme = AgeScheme::Agent;

    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets without a department are filed under an empty department id.
    pub fn add(&mut self, ticket: &Ticket, calendar: &LocalCalendar, now: DateTime<Utc>) -> bool {
        let Some(aged) = aged(ticket, calendar, now) else {
            return false;
        };
        let agent = ticket.agent_name().unwrap_or(UNASSIGNED).trim().to_string();
        let department = ticket.department_id().unwrap_or_default().to_string();
        let bucket = Self::SCHEME.bucket_for(aged.age_days);

        // Probe first so rejected statuses leave no empty agent behind.
        let mut probe = AgeGrid::default();
        if !probe.add(bucket, &aged.status, aged.number) {
            return false;
        }
        self.agents
            .entry(agent)
            .or_default()
            .entry(department)
            .or_default()
            .merge(&probe);
        true
    }

    /// Agent name → department id → grid, agents in name order.
    pub fn finish(self) -> BTreeMap<String, BTreeMap<String, AgeGrid>> {
        self.agents
    }
}
