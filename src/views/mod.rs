//! Presentation-ready rows for each dashboard table
//!
//! Builders take the fetched collections plus the user's filter selection and
//! return plain serializable rows. Rendering is someone else's job.

pub mod agent_age;
pub mod archived;
pub mod department_age;
pub mod metrics;
pub mod pending;
pub mod performance;

use crate::analytics::{
    AgentFilter, DateRange, DepartmentDirectory, LocalCalendar, SearchQuery, StatusFilter,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

pub use agent_age::{AgentAgeRow, AgentAgeView};
pub use archived::ArchivedRow;
pub use department_age::DepartmentAgeRow;
pub use metrics::{AgentAverages, MetricsView, MetricsViewRow};
pub use pending::PendingRow;
pub use performance::PerformanceRow;

/// The user's filter selection, shared by every view.
#[derive(Debug, Clone, Default)]
pub struct ViewFilters {
    /// Department id; `"all"` selects everything.
    pub department: Option<String>,
    pub agents: Vec<String>,
    pub statuses: Vec<String>,
    pub range: DateRange,
    pub search: Option<String>,
}

impl ViewFilters {
    pub fn department_id(&self) -> Option<&str> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "all")
    }

    pub fn agent_filter(&self) -> AgentFilter {
        AgentFilter::new(self.agents.iter().map(|a| a.trim().to_string()))
    }

    pub fn status_filter(&self) -> StatusFilter {
        StatusFilter::new(&self.statuses)
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new(self.search.as_deref())
    }
}

/// Request-wide inputs every builder needs.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub directory: &'a DepartmentDirectory,
    pub calendar: LocalCalendar,
    pub now: DateTime<Utc>,
}

impl<'a> ViewContext<'a> {
    pub fn new(directory: &'a DepartmentDirectory, calendar: LocalCalendar, now: DateTime<Utc>) -> Self {
        Self {
            directory,
            calendar,
            now,
        }
    }

    /// Name from the record itself, else from the directory, else the id.
    pub fn department_name(&self, name: Option<&str>, id: Option<&str>) -> String {
        name.filter(|n| !n.trim().is_empty())
            .or_else(|| id.and_then(|id| self.directory.name(id)))
            .or(id)
            .unwrap_or_default()
            .to_string()
    }
}

/// One page of rows plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out a one-based page. There is always at least one page and the
/// requested page is clamped into range.
pub fn paginate<T>(rows: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let items = rows
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Case-insensitive name ordering used by every table.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
