//! Request-scoped orchestration: fetch, join, filter, aggregate
//!
//! Each call runs one full pass against a [`TicketSource`]. Nothing is shared
//! between calls except whatever the source itself caches.

use crate::analytics::{
    aggregate_agents, keyed_metrics, DateRange, DateReference, DateWindow, DepartmentDirectory,
    FirstResponseAveraging, LocalCalendar, PerformanceReport, StatusClassifier, StatusTables,
    TicketIndex,
};
use crate::config::AnalyticsConfig;
use crate::observability::OperationTimer;
use crate::telemetry::{create_request_span, generate_correlation_id};
use crate::upstream::{AccessToken, Department, MetricRow, Ticket, TicketSource, UpstreamError};
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn, Instrument};

/// Body returned whenever the performance computation fails.
pub const PERFORMANCE_FAILURE: &str = "Failed to compute agent performance";

/// Query parameters of the agent performance endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    /// `YYYY-MM-DD`, inclusive.
    pub from_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub to_date: Option<String>,
    /// `"all"` selects every department.
    pub department_id: Option<String>,
    /// Compared against the ticket's assignee id; `"all"` selects everyone.
    pub agent_id: Option<String>,
}

impl PerformanceQuery {
    pub fn department(&self) -> Option<&str> {
        selection(self.department_id.as_deref())
    }

    pub fn agent(&self) -> Option<&str> {
        selection(self.agent_id.as_deref())
    }

    /// Unparseable dates leave that side of the range open.
    pub fn range(&self) -> DateRange {
        DateRange::new(
            parse_query_date(self.from_date.as_deref()),
            parse_query_date(self.to_date.as_deref()),
        )
    }
}

fn selection(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

/// Accepts `YYYY-MM-DD` or anything starting with it, such as an RFC 3339 stamp.
pub fn parse_query_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    let date = raw
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());
    if date.is_none() {
        warn!(value = raw, "Ignoring unparseable date bound");
    }
    date
}

/// Status code plus JSON body, ready for whatever transport serves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Value,
}

impl EndpointResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            status: 500,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything the table views are built from.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub directory: DepartmentDirectory,
    pub active: Vec<Ticket>,
    pub archived: Vec<Ticket>,
    pub metrics: Vec<MetricRow>,
}

pub struct PerformanceService<S> {
    source: S,
    calendar: LocalCalendar,
    averaging: FirstResponseAveraging,
    tables: StatusTables,
}

impl<S: TicketSource> PerformanceService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            calendar: LocalCalendar::default(),
            averaging: FirstResponseAveraging::default(),
            tables: StatusTables::standard().clone(),
        }
    }

    pub fn from_config(source: S, config: &AnalyticsConfig) -> Self {
        Self::new(source)
            .with_calendar(LocalCalendar::from_offset_minutes(config.utc_offset_minutes))
            .with_averaging(config.first_response_averaging)
    }

    pub fn with_calendar(mut self, calendar: LocalCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_averaging(mut self, averaging: FirstResponseAveraging) -> Self {
        self.averaging = averaging;
        self
    }

    pub fn with_tables(mut self, tables: StatusTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn calendar(&self) -> LocalCalendar {
        self.calendar
    }

    /// The agent performance endpoint. Upstream failures are logged and
    /// collapse into a generic 500.
    pub async fn agent_performance(&self, query: &PerformanceQuery) -> EndpointResponse {
        let span = create_request_span("agent_performance", &generate_correlation_id());
        let result = self.compute_agent_performance(query).instrument(span).await;

        match result.and_then(|report| serde_json::to_value(report).map_err(Into::into)) {
            Ok(body) => EndpointResponse::ok(body),
            Err(e) => {
                error!(error = %e, "Agent performance request failed");
                EndpointResponse::internal_error(PERFORMANCE_FAILURE)
            }
        }
    }

    /// The fallible core of [`Self::agent_performance`].
    pub async fn compute_agent_performance(
        &self,
        query: &PerformanceQuery,
    ) -> Result<PerformanceReport, ServiceError> {
        let timer = OperationTimer::new("agent_performance");
        let token = self.source.access_token().await?;

        let department = query.department();
        let department_ids: Vec<String> = department.map(str::to_string).into_iter().collect();
        let active = self
            .source
            .fetch_all_tickets(&token, &department_ids, query.agent().map(str::to_string))
            .await?;

        let departments = self.relevant_departments(department).await?;
        let archived = self.fetch_archived(&token, &departments).await?;

        let mut tickets = active;
        tickets.extend(archived);
        let fetched = tickets.len();

        if let Some(agent) = query.agent() {
            tickets.retain(|t| t.assignee_identifier() == Some(agent));
        }
        let range = query.range();
        if !range.is_open() {
            let window = DateWindow::new(range, DateReference::ClosedOrCreated, self.calendar);
            tickets.retain(|t| window.matches(t));
        }

        info!(fetched, kept = tickets.len(), "Tickets selected for performance");
        if tickets.is_empty() {
            timer.finish();
            return Ok(PerformanceReport::empty());
        }

        let metrics = self.source.fetch_ticket_metrics(&token, &tickets).await?;
        let index = TicketIndex::build(&tickets);
        let keyed = keyed_metrics(metrics);
        let records = index.enrich(&keyed);
        let agents = aggregate_agents(&records, StatusClassifier::new(&self.tables), self.averaging);

        info!(
            tickets = tickets.len(),
            metric_rows = keyed.len(),
            agents = agents.len(),
            "Agent performance computed"
        );
        timer.finish();
        Ok(PerformanceReport::from_agents(agents))
    }

    /// Fetch everything the table views need in one pass: the department
    /// directory, active tickets, archived tickets of every department and the
    /// metric rows of both.
    pub async fn dashboard_data(&self) -> Result<DashboardData, ServiceError> {
        let span = create_request_span("dashboard_data", &generate_correlation_id());
        async {
            let timer = OperationTimer::new("dashboard_data");
            let token = self.source.access_token().await?;
            let departments = self.source.departments().await?;
            let active = self.source.fetch_all_tickets(&token, &[], None).await?;
            let archived = self.fetch_archived(&token, &departments).await?;

            let scope: Vec<Ticket> = active.iter().chain(archived.iter()).cloned().collect();
            let metrics = if scope.is_empty() {
                Vec::new()
            } else {
                self.source.fetch_ticket_metrics(&token, &scope).await?
            };

            info!(
                departments = departments.len(),
                active = active.len(),
                archived = archived.len(),
                metric_rows = metrics.len(),
                "Dashboard data loaded"
            );
            timer.finish();
            Ok::<_, ServiceError>(DashboardData {
                directory: DepartmentDirectory::new(departments),
                active,
                archived,
                metrics,
            })
        }
        .instrument(span)
        .await
    }

    /// Departments whose archive is fetched. An unknown selection skips the
    /// archived fetch rather than failing the request.
    async fn relevant_departments(&self, selected: Option<&str>) -> Result<Vec<Department>, ServiceError> {
        let departments = self.source.departments().await?;
        Ok(select_departments(departments, selected).unwrap_or_else(|e| {
            warn!(error = %e, "Skipping archived tickets");
            Vec::new()
        }))
    }

    /// One archived fetch per department, issued concurrently.
    async fn fetch_archived(
        &self,
        token: &AccessToken,
        departments: &[Department],
    ) -> Result<Vec<Ticket>, ServiceError> {
        let batches = try_join_all(
            departments
                .iter()
                .map(|d| self.source.fetch_all_archived_tickets(token, &d.id)),
        )
        .await?;
        let archived: Vec<Ticket> = batches.into_iter().flatten().collect();
        debug!(departments = departments.len(), archived = archived.len(), "Fetched archived tickets");
        Ok(archived)
    }
}

/// Narrow the directory to the selected department, if any.
pub fn select_departments(
    mut departments: Vec<Department>,
    selected: Option<&str>,
) -> Result<Vec<Department>, UpstreamError> {
    let Some(id) = selected else {
        return Ok(departments);
    };
    departments.retain(|d| d.id == id);
    if departments.is_empty() {
        return Err(UpstreamError::UnknownDepartment(id.to_string()));
    }
    Ok(departments)
}

/// Why a service pass could not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("Failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::source::MockTicketSource;
    use crate::upstream::Assignee;

    fn ticket(id: &str, status: &str, assignee_id: &str, name: &str, created: &str) -> Ticket {
        Ticket {
            id: Some(id.into()),
            ticket_number: Some(id.into()),
            status: Some(status.into()),
            created_time: Some(created.into()),
            assignee_id: Some(assignee_id.into()),
            assignee: Some(Assignee { id: None, display_name: Some(name.into()) }),
            department_id: Some("1".into()),
            ..Default::default()
        }
    }

    fn metric(number: &str, resolution: &str) -> MetricRow {
        MetricRow {
            ticket_number: Some(number.into()),
            resolution_time: Some(resolution.into()),
            thread_count: Some(1),
            ..Default::default()
        }
    }

    fn base_mock() -> MockTicketSource {
        let mut source = MockTicketSource::new();
        source
            .expect_access_token()
            .returning(|| Ok(AccessToken("t".into())));
        source.expect_departments().returning(|| {
            Ok(vec![
                Department { id: "1".into(), name: "Support".into() },
                Department { id: "2".into(), name: "Billing".into() },
            ])
        });
        source
    }

    #[test]
    fn test_query_selection_and_dates() {
        let query = PerformanceQuery {
            from_date: Some("2024-05-01".into()),
            to_date: Some("not a date".into()),
            department_id: Some("all".into()),
            agent_id: Some(" 7 ".into()),
        };
        assert_eq!(query.department(), None);
        assert_eq!(query.agent(), Some("7"));
        assert_eq!(query.range().start, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(query.range().end, None);
        assert_eq!(
            parse_query_date(Some("2024-05-31T10:00:00Z")),
            NaiveDate::from_ymd_opt(2024, 5, 31)
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let mut source = MockTicketSource::new();
        source
            .expect_access_token()
            .returning(|| Err(UpstreamError::TokenUnavailable("expired".into())));

        let service = PerformanceService::new(source);
        let response = service.agent_performance(&PerformanceQuery::default()).await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!({ "error": PERFORMANCE_FAILURE }));
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_no_tickets_skips_metrics_fetch() {
        let mut source = base_mock();
        source.expect_fetch_all_tickets().returning(|_, _, _| Ok(Vec::new()));
        source
            .expect_fetch_all_archived_tickets()
            .times(2)
            .returning(|_, _| Ok(Vec::new()));
        source.expect_fetch_ticket_metrics().never();

        let service = PerformanceService::new(source);
        let response = service.agent_performance(&PerformanceQuery::default()).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({ "summary": {}, "agents": [] }));
    }

    #[tokio::test]
    async fn test_department_selection_narrows_fetches() {
        let mut source = base_mock();
        source
            .expect_fetch_all_tickets()
            .withf(|_, ids, agent| ids == ["2".to_string()] && agent.is_none())
            .returning(|_, _, _| Ok(Vec::new()));
        source
            .expect_fetch_all_archived_tickets()
            .withf(|_, id| id == "2")
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = PerformanceService::new(source);
        let query = PerformanceQuery {
            department_id: Some("2".into()),
            ..Default::default()
        };
        let report = service.compute_agent_performance(&query).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_agent_and_date_filters_before_metrics() {
        let mut source = base_mock();
        source.expect_fetch_all_tickets().returning(|_, _, _| {
            Ok(vec![
                ticket("1", "Closed", "7", "Alice", "2024-05-01T10:00:00Z"),
                ticket("2", "Open", "7", "Alice", "2024-04-01T10:00:00Z"),
                ticket("3", "Open", "8", "Bob", "2024-05-01T10:00:00Z"),
            ])
        });
        source
            .expect_fetch_all_archived_tickets()
            .returning(|_, _| Ok(Vec::new()));
        source
            .expect_fetch_ticket_metrics()
            .withf(|_, tickets| tickets.len() == 1 && tickets[0].id.as_deref() == Some("1"))
            .times(1)
            .returning(|_, _| Ok(vec![metric("1", "26:00 hrs")]));

        let service = PerformanceService::new(source).with_calendar(LocalCalendar::utc());
        let query = PerformanceQuery {
            from_date: Some("2024-05-01".into()),
            to_date: Some("2024-05-01".into()),
            agent_id: Some("7".into()),
            ..Default::default()
        };
        let response = service.agent_performance(&query).await;

        assert_eq!(response.status, 200);
        let agents = response.body["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0]["agentName"], "Alice");
        assert_eq!(agents[0]["ticketsResolved"], 1);
        assert_eq!(response.body["summary"]["ticketsCreated"], 1);
    }

    #[test]
    fn test_select_departments() {
        let directory = vec![
            Department { id: "1".into(), name: "Support".into() },
            Department { id: "2".into(), name: "Billing".into() },
        ];
        assert_eq!(select_departments(directory.clone(), None).unwrap().len(), 2);

        let billing = select_departments(directory.clone(), Some("2")).unwrap();
        assert_eq!(billing, vec![Department { id: "2".into(), name: "Billing".into() }]);

        let missing = select_departments(directory, Some("42"));
        assert!(matches!(missing, Err(UpstreamError::UnknownDepartment(ref id)) if id == "42"));
    }

    #[tokio::test]
    async fn test_unknown_department_skips_archived_fetch() {
        let mut source = base_mock();
        source
            .expect_fetch_all_tickets()
            .withf(|_, ids, _| ids == ["42".to_string()])
            .returning(|_, _, _| Ok(Vec::new()));
        source.expect_fetch_all_archived_tickets().never();
        source.expect_fetch_ticket_metrics().never();

        let query = PerformanceQuery {
            department_id: Some("42".into()),
            ..Default::default()
        };
        let response = PerformanceService::new(source).agent_performance(&query).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({ "summary": {}, "agents": [] }));
    }

    #[tokio::test]
    async fn test_tickets_without_metrics_keep_zeroed_summary() {
        let mut source = base_mock();
        source
            .expect_fetch_all_tickets()
            .withf(|_, ids, _| ids == ["1".to_string()])
            .returning(|_, _, _| Ok(vec![ticket("1", "Open", "7", "Alice", "2024-05-01T10:00:00Z")]));
        source
            .expect_fetch_all_archived_tickets()
            .returning(|_, _| Ok(Vec::new()));
        source
            .expect_fetch_ticket_metrics()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let query = PerformanceQuery {
            department_id: Some("1".into()),
            ..Default::default()
        };
        let response = PerformanceService::new(source).agent_performance(&query).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["agents"], json!([]));
        let summary = &response.body["summary"];
        for field in [
            "ticketsCreated",
            "ticketsResolved",
            "pendingTickets",
            "escalatedTickets",
            "singleTouchTickets",
        ] {
            assert_eq!(summary[field], 0, "{field}");
        }
        assert_eq!(summary["avgResolutionHours"], 0.0);
        assert_eq!(summary["avgFirstResponseHours"], 0.0);
    }

    #[tokio::test]
    async fn test_archived_fetch_failure_aborts_request() {
        let mut source = base_mock();
        source.expect_fetch_all_tickets().returning(|_, _, _| Ok(Vec::new()));
        source
            .expect_fetch_all_archived_tickets()
            .returning(|_, id| {
                if id == "2" {
                    Err(UpstreamError::request_failed("archived", "timeout"))
                } else {
                    Ok(Vec::new())
                }
            });

        let service = PerformanceService::new(source);
        let result = service.compute_agent_performance(&PerformanceQuery::default()).await;
        assert!(matches!(result, Err(ServiceError::Upstream(UpstreamError::RequestFailed { .. }))));
    }

    #[tokio::test]
    async fn test_dashboard_data_collects_all_sources() {
        let mut source = base_mock();
        source.expect_fetch_all_tickets().returning(|_, _, _| {
            Ok(vec![ticket("1", "Open", "7", "Alice", "2024-05-01T10:00:00Z")])
        });
        source.expect_fetch_all_archived_tickets().returning(|_, id| {
            Ok(if id == "1" {
                vec![ticket("9", "Closed", "7", "Alice", "2024-04-01T10:00:00Z")]
            } else {
                Vec::new()
            })
        });
        source
            .expect_fetch_ticket_metrics()
            .withf(|_, tickets| tickets.len() == 2)
            .returning(|_, _| Ok(vec![metric("1", "1:00 hrs")]));

        let data = PerformanceService::new(source).dashboard_data().await.unwrap();
        assert_eq!(data.directory.len(), 2);
        assert_eq!(data.active.len(), 1);
        assert_eq!(data.archived.len(), 1);
        assert_eq!(data.metrics.len(), 1);
    }
}
