// Upstream failures must collapse into the generic 500 response

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use ticket_pulse::service::{PerformanceQuery, PerformanceService, PERFORMANCE_FAILURE};
use ticket_pulse::upstream::{AccessToken, Department, MetricRow, Ticket, TicketSource, UpstreamError};

mock! {
    pub Helpdesk {}

    #[async_trait]
    impl TicketSource for Helpdesk {
        async fn access_token(&self) -> Result<AccessToken, UpstreamError>;
        async fn fetch_all_tickets(
            &self,
            token: &AccessToken,
            department_ids: &[String],
            agent_id: Option<String>,
        ) -> Result<Vec<Ticket>, UpstreamError>;
        async fn fetch_all_archived_tickets(
            &self,
            token: &AccessToken,
            department_id: &str,
        ) -> Result<Vec<Ticket>, UpstreamError>;
        async fn fetch_ticket_metrics(
            &self,
            token: &AccessToken,
            tickets: &[Ticket],
        ) -> Result<Vec<MetricRow>, UpstreamError>;
        async fn departments(&self) -> Result<Vec<Department>, UpstreamError>;
    }
}

fn healthy_until_metrics() -> MockHelpdesk {
    let mut helpdesk = MockHelpdesk::new();
    helpdesk
        .expect_access_token()
        .returning(|| Ok(AccessToken("token".into())));
    helpdesk
        .expect_departments()
        .returning(|| Ok(vec![Department { id: "1".into(), name: "Support".into() }]));
    helpdesk.expect_fetch_all_tickets().returning(|_, _, _| {
        Ok(vec![Ticket {
            id: Some("T1".into()),
            status: Some("Open".into()),
            assignee_id: Some("a1".into()),
            created_time: Some("2024-05-01T10:00:00Z".into()),
            ..Default::default()
        }])
    });
    helpdesk
        .expect_fetch_all_archived_tickets()
        .returning(|_, _| Ok(Vec::new()));
    helpdesk
}

#[tokio::test]
async fn test_metrics_failure_returns_generic_500() {
    let mut helpdesk = healthy_until_metrics();
    helpdesk
        .expect_fetch_ticket_metrics()
        .times(1)
        .returning(|_, _| Err(UpstreamError::request_failed("metrics", "HTTP 502")));

    let response = PerformanceService::new(helpdesk)
        .agent_performance(&PerformanceQuery::default())
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({ "error": "Failed to compute agent performance" }));
    assert_eq!(response.body["error"], PERFORMANCE_FAILURE);
}

#[tokio::test]
async fn test_active_fetch_failure_skips_everything_else() {
    let mut helpdesk = MockHelpdesk::new();
    helpdesk
        .expect_access_token()
        .returning(|| Ok(AccessToken("token".into())));
    helpdesk
        .expect_fetch_all_tickets()
        .returning(|_, _, _| Err(UpstreamError::request_failed("tickets", "connection reset")));
    helpdesk.expect_fetch_all_archived_tickets().never();
    helpdesk.expect_fetch_ticket_metrics().never();

    let response = PerformanceService::new(helpdesk)
        .agent_performance(&PerformanceQuery::default())
        .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_successful_metrics_fetch_returns_200() {
    let mut helpdesk = healthy_until_metrics();
    helpdesk.expect_fetch_ticket_metrics().returning(|_, _| {
        Ok(vec![MetricRow {
            id: Some("T1".into()),
            agent_name: Some("Alice".into()),
            thread_count: Some(1),
            ..Default::default()
        }])
    });

    let response = PerformanceService::new(helpdesk)
        .agent_performance(&PerformanceQuery::default())
        .await;

    assert!(response.is_success());
    assert_eq!(response.body["agents"][0]["agentName"], "Alice");
    assert_eq!(response.body["agents"][0]["pendingTickets"], 1);
    assert_eq!(response.body["summary"]["singleTouchTickets"], 1);
}
