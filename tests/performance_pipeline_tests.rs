// End-to-end runs of the agent performance pipeline over a snapshot source

mod common;

use common::{approx, snapshot_source};
use serde_json::json;
use ticket_pulse::analytics::LocalCalendar;
use ticket_pulse::service::{PerformanceQuery, PerformanceService};
use ticket_pulse::views::{paginate, performance};
use ticket_pulse::{AgentAggregate, FirstResponseAveraging};

fn service() -> PerformanceService<ticket_pulse::SnapshotSource> {
    PerformanceService::new(snapshot_source()).with_calendar(LocalCalendar::utc())
}

fn agent<'a>(agents: &'a [AgentAggregate], name: &str) -> &'a AgentAggregate {
    agents
        .iter()
        .find(|a| a.agent_name == name)
        .unwrap_or_else(|| panic!("agent {name} missing"))
}

#[tokio::test]
async fn test_alice_and_bob_over_active_and_archived() {
    let report = service()
        .compute_agent_performance(&PerformanceQuery::default())
        .await
        .unwrap();

    let names: Vec<_> = report.agents.iter().map(|a| a.agent_name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);

    let alice = agent(&report.agents, "Alice");
    assert_eq!(alice.tickets_created, 2);
    assert_eq!(alice.tickets_resolved, 1);
    assert_eq!(alice.pending_tickets, 1);
    assert!(approx(alice.avg_resolution_hours, 26.0));
    assert!(approx(alice.avg_first_response_hours, 0.25));
    assert!(approx(alice.avg_threads, 2.0));
    assert_eq!(alice.single_touch_count, 1);
    assert_eq!(alice.escalated_count, 0);

    let bob = agent(&report.agents, "Bob");
    assert_eq!(bob.pending_tickets, 1);
    assert_eq!(bob.escalated_count, 1);
    assert!(approx(bob.avg_resolution_hours, 6.0));
}

#[tokio::test]
async fn test_summary_reconciles_with_agents() {
    let report = service()
        .compute_agent_performance(&PerformanceQuery::default())
        .await
        .unwrap();
    let summary = report.summary.clone().unwrap();

    let sum = |f: fn(&AgentAggregate) -> u64| report.agents.iter().map(f).sum::<u64>();
    assert_eq!(summary.tickets_created, sum(|a| a.tickets_created));
    assert_eq!(summary.tickets_resolved, sum(|a| a.tickets_resolved));
    assert_eq!(summary.pending_tickets, sum(|a| a.pending_tickets));
    assert_eq!(summary.escalated_tickets, sum(|a| a.escalated_count));
    assert_eq!(summary.single_touch_tickets, sum(|a| a.single_touch_count));

    // 26h and 6h over two resolved tickets
    assert!(approx(summary.total_resolution_hours, 32.0));
    assert!(approx(summary.avg_resolution_hours, 16.0));
    assert!(approx(summary.avg_threads, 1.75));
    assert!(approx(summary.avg_first_response_hours, 0.375));
}

#[tokio::test]
async fn test_date_range_uses_closed_time_when_present() {
    let query = PerformanceQuery {
        from_date: Some("2024-05-02".into()),
        to_date: Some("2024-05-02".into()),
        ..Default::default()
    };
    let report = service().compute_agent_performance(&query).await.unwrap();

    assert_eq!(report.agents.len(), 1);
    let alice = &report.agents[0];
    assert_eq!(alice.agent_name, "Alice");
    assert_eq!(alice.tickets_created, 2);
}

#[tokio::test]
async fn test_agent_and_department_selection() {
    let by_agent = PerformanceQuery {
        agent_id: Some("b2".into()),
        ..Default::default()
    };
    let report = service().compute_agent_performance(&by_agent).await.unwrap();
    assert_eq!(report.agents.len(), 1);
    assert_eq!(report.agents[0].agent_name, "Bob");
    assert_eq!(report.agents[0].tickets_created, 2);

    let by_department = PerformanceQuery {
        department_id: Some("1".into()),
        agent_id: Some("all".into()),
        ..Default::default()
    };
    let report = service().compute_agent_performance(&by_department).await.unwrap();
    assert_eq!(report.agents.len(), 1);
    assert_eq!(report.agents[0].agent_name, "Alice");
}

#[tokio::test]
async fn test_nothing_selected_gives_empty_body() {
    let query = PerformanceQuery {
        from_date: Some("2023-01-01".into()),
        to_date: Some("2023-01-31".into()),
        ..Default::default()
    };
    let response = service().agent_performance(&query).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "summary": {}, "agents": [] }));

    let report = service().compute_agent_performance(&query).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"summary":{},"agents":[]}"#);
}

#[tokio::test]
async fn test_recorded_averaging_divides_by_samples() {
    let report = service()
        .with_averaging(FirstResponseAveraging::Recorded)
        .compute_agent_performance(&PerformanceQuery::default())
        .await
        .unwrap();
    assert!(approx(agent(&report.agents, "Alice").avg_first_response_hours, 0.5));
    assert!(approx(agent(&report.agents, "Bob").avg_first_response_hours, 1.0));
}

#[tokio::test]
async fn test_leaderboard_page_keeps_tie_order() {
    let report = service()
        .compute_agent_performance(&PerformanceQuery::default())
        .await
        .unwrap();

    let rows = performance::build(&report.agents);
    let page = paginate(rows, 1, 25);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items[0].agent_name, "Alice");
    assert_eq!(page.items[0].position, 1);
    assert_eq!(page.items[1].agent_name, "Bob");
    assert_eq!(page.items[0].avg_resolution_text, "26:00");
    assert_eq!(page.items[1].total_tickets, 2);
}

#[test]
fn test_leaderboard_ties_keep_insertion_order() {
    let agents: Vec<AgentAggregate> = [("A", 5), ("B", 5), ("C", 3)]
        .into_iter()
        .map(|(name, resolved)| AgentAggregate {
            tickets_resolved: resolved,
            ..AgentAggregate::empty(name)
        })
        .collect();

    let rows = performance::build(&agents);
    let names: Vec<_> = rows.iter().map(|r| r.agent_name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
}
