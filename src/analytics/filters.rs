//! Composable record filters
//!
//! Every predicate is a pure function of a record and one filter value. Views
//! pick the predicates they need and [`FilterSet`] ANDs them together.

use super::directory::DepartmentDirectory;
use super::status::normalize_status;
use super::timestamps::LocalCalendar;
use crate::upstream::types::{non_empty, MetricRow, Ticket};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Read access to the fields filters look at.
pub trait TicketFields {
    fn department_id(&self) -> Option<&str>;
    fn department_name(&self) -> Option<&str>;
    fn agent_name(&self) -> Option<&str>;
    fn status(&self) -> Option<&str>;
    fn ticket_number(&self) -> Option<&str>;
    fn created_time(&self) -> Option<&str>;

    fn closed_time(&self) -> Option<&str> {
        None
    }
}

impl TicketFields for Ticket {
    fn department_id(&self) -> Option<&str> {
        non_empty(&self.department_id)
    }

    fn department_name(&self) -> Option<&str> {
        non_empty(&self.department_name)
    }

    fn agent_name(&self) -> Option<&str> {
        self.assignee_display_name()
    }

    fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    fn ticket_number(&self) -> Option<&str> {
        non_empty(&self.ticket_number).or_else(|| non_empty(&self.id))
    }

    fn created_time(&self) -> Option<&str> {
        non_empty(&self.created_time)
    }

    fn closed_time(&self) -> Option<&str> {
        non_empty(&self.closed_time)
    }
}

impl TicketFields for MetricRow {
    fn department_id(&self) -> Option<&str> {
        non_empty(&self.department_id)
    }

    fn department_name(&self) -> Option<&str> {
        non_empty(&self.department_name)
    }

    fn agent_name(&self) -> Option<&str> {
        non_empty(&self.agent_name)
    }

    fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    fn ticket_number(&self) -> Option<&str> {
        non_empty(&self.ticket_number).or_else(|| non_empty(&self.id))
    }

    fn created_time(&self) -> Option<&str> {
        non_empty(&self.created_time)
    }
}

/// Inclusive calendar-day range; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Which timestamp a view measures a record's date by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateReference {
    /// Closed time when present, else created time.
    ClosedOrCreated,
    CreatedOnly,
}

/// A [`DateRange`] resolved to instants in the local calendar.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    from: Option<DateTime<FixedOffset>>,
    to: Option<DateTime<FixedOffset>>,
    reference: DateReference,
    calendar: LocalCalendar,
}

impl DateWindow {
    pub fn new(range: DateRange, reference: DateReference, calendar: LocalCalendar) -> Self {
        Self {
            from: range.start.and_then(|d| calendar.start_of_day(d)),
            to: range.end.and_then(|d| calendar.end_of_day(d)),
            reference,
            calendar,
        }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains_instant(&self, at: &DateTime<FixedOffset>) -> bool {
        self.from.is_none_or(|from| *at >= from) && self.to.is_none_or(|to| *at <= to)
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        if !self.is_active() {
            return true;
        }
        let reference = match self.reference {
            DateReference::ClosedOrCreated => record.closed_time().or_else(|| record.created_time()),
            DateReference::CreatedOnly => record.created_time(),
        };
        reference
            .and_then(|raw| self.calendar.parse(raw))
            .is_some_and(|at| self.contains_instant(&at))
    }
}

/// Department selection; matches on id or on the directory name of the id.
#[derive(Debug, Clone)]
pub struct DepartmentFilter {
    id: String,
    name: Option<String>,
}

impl DepartmentFilter {
    /// `None`, empty and `"all"` select everything.
    pub fn new(selected: Option<&str>, directory: &DepartmentDirectory) -> Option<Self> {
        let id = selected.map(str::trim).filter(|s| !s.is_empty() && *s != "all")?;
        Some(Self {
            id: id.to_string(),
            name: directory.name(id).map(str::to_string),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        record.department_id() == Some(self.id.as_str())
            || self
                .name
                .as_deref()
                .is_some_and(|name| record.department_name() == Some(name))
    }
}

/// Exact membership of the agent name.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    names: HashSet<String>,
}

impl AgentFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.contains(name)
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        self.names.is_empty() || record.agent_name().is_some_and(|name| self.names.contains(name))
    }
}

/// Membership of the normalized status.
#[derive(Debug, Clone, Default)]
pub struct StatusFilter {
    statuses: HashSet<String>,
}

impl StatusFilter {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            statuses: statuses
                .into_iter()
                .map(|s| normalize_status(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.statuses.is_empty() || self.statuses.contains(normalized)
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        self.statuses.is_empty()
            || self
                .statuses
                .contains(&normalize_status(record.status().unwrap_or_default()))
    }
}

/// How free-text search reads a ticket or metric record.
///
/// Views that search their own presentation rows (pending, age tables) join
/// the visible columns and call [`SearchQuery::matches_text`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Substring over agent, ticket number, status, department and created time.
    Metrics,
    /// Exact ticket number for digit queries, agent word prefix otherwise.
    Archived,
}

/// Trimmed, lowercased search text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
}

impl SearchQuery {
    pub fn new(raw: Option<&str>) -> Self {
        Self {
            text: raw.unwrap_or_default().trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substring match against text the caller already joined.
    pub fn matches_text(&self, haystack: &str) -> bool {
        self.is_empty() || haystack.to_lowercase().contains(&self.text)
    }

    /// All-digit queries match the ticket number exactly, anything else is a
    /// word prefix of the agent name.
    pub fn matches_archived(&self, agent_name: Option<&str>, ticket_number: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.text.chars().all(|c| c.is_ascii_digit()) {
            return ticket_number.is_some_and(|n| n.trim().to_lowercase() == self.text);
        }
        agent_name
            .unwrap_or_default()
            .to_lowercase()
            .split_whitespace()
            .any(|word| word.starts_with(&self.text))
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R, mode: SearchMode) -> bool {
        if self.is_empty() {
            return true;
        }
        match mode {
            SearchMode::Metrics => self.matches_text(&metrics_haystack(record)),
            SearchMode::Archived => self.matches_archived(record.agent_name(), record.ticket_number()),
        }
    }
}

fn metrics_haystack<R: TicketFields + ?Sized>(record: &R) -> String {
    [
        record.agent_name(),
        record.ticket_number(),
        record.status(),
        record.department_name(),
        record.created_time(),
    ]
    .map(Option::unwrap_or_default)
    .join(" ")
}

/// One filter dimension.
#[derive(Debug, Clone)]
pub enum Predicate {
    Department(DepartmentFilter),
    Agents(AgentFilter),
    Statuses(StatusFilter),
    Dates(DateWindow),
    Search(SearchQuery, SearchMode),
}

impl Predicate {
    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::Department(filter) => filter.matches(record),
            Predicate::Agents(filter) => filter.matches(record),
            Predicate::Statuses(filter) => filter.matches(record),
            Predicate::Dates(window) => window.matches(record),
            Predicate::Search(query, mode) => query.matches(record, *mode),
        }
    }
}

/// Predicates composed by logical AND, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn department(self, selected: Option<&str>, directory: &DepartmentDirectory) -> Self {
        match DepartmentFilter::new(selected, directory) {
            Some(filter) => self.with(Predicate::Department(filter)),
            None => self,
        }
    }

    pub fn agents(self, filter: AgentFilter) -> Self {
        if filter.is_empty() {
            self
        } else {
            self.with(Predicate::Agents(filter))
        }
    }

    pub fn statuses(self, filter: StatusFilter) -> Self {
        if filter.is_empty() {
            self
        } else {
            self.with(Predicate::Statuses(filter))
        }
    }

    pub fn dates(self, range: DateRange, reference: DateReference, calendar: LocalCalendar) -> Self {
        let window = DateWindow::new(range, reference, calendar);
        if window.is_active() {
            self.with(Predicate::Dates(window))
        } else {
            self
        }
    }

    pub fn search(self, query: SearchQuery, mode: SearchMode) -> Self {
        if query.is_empty() {
            self
        } else {
            self.with(Predicate::Search(query, mode))
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches<R: TicketFields + ?Sized>(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    pub fn apply<'r, R: TicketFields>(&self, records: &'r [R]) -> Vec<&'r R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }

    pub fn retain<R: TicketFields>(&self, records: Vec<R>) -> Vec<R> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
