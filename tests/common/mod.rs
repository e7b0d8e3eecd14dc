// Shared helpdesk snapshot used by the integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use ticket_pulse::upstream::{Snapshot, SnapshotSource};

/// Two agents, two departments: Alice has one closed and one open ticket,
/// Bob one closed and one escalated.
pub fn snapshot_json() -> Value {
    json!({
        "departments": [
            { "id": "1", "name": "Support" },
            { "id": 2, "name": "Billing" }
        ],
        "tickets": [
            {
                "id": "T2", "ticketNumber": "1002", "status": "Open", "subject": "Login loop",
                "assigneeId": "a1", "assignee": { "displayName": "Alice" },
                "departmentId": "1", "createdTime": "2024-05-02T09:00:00Z"
            },
            {
                "id": "T4", "ticketNumber": "1004", "status": "Escalated", "subject": "Refund",
                "assigneeId": "b2", "assignee": { "displayName": "Bob" },
                "departmentId": "2", "createdTime": "2024-05-03T09:00:00Z"
            }
        ],
        "archivedTickets": [
            {
                "id": "T1", "ticketNumber": "1001", "status": "Closed", "subject": "Password reset",
                "assigneeId": "a1", "assignee": { "displayName": "Alice" },
                "departmentId": "1", "createdTime": "2024-05-01T09:00:00Z",
                "closedTime": "2024-05-02T11:00:00Z"
            },
            {
                "id": "T3", "ticketNumber": "1003", "status": "Closed", "subject": "Invoice copy",
                "assigneeId": "b2", "assignee": { "displayName": "Bob" },
                "departmentId": "2", "createdTime": "2024-05-01T09:00:00Z",
                "closedTime": "2024-05-01T15:00:00Z"
            }
        ],
        "metrics": [
            {
                "id": "T1", "agentName": "Alice", "status": "Closed", "departmentId": "1",
                "createdTime": "2024-05-01T09:00:00Z",
                "resolutionTime": "1 days 02:00 hrs", "threadCount": 1
            },
            {
                "id": "T2", "agentName": "Alice", "status": "Open", "departmentId": "1",
                "createdTime": "2024-05-02T09:00:00Z",
                "firstResponseTime": "0:30 hrs", "threadCount": 3
            },
            {
                "id": "T3", "agentName": "Bob", "status": "Closed", "departmentId": "2",
                "createdTime": "2024-05-01T09:00:00Z",
                "resolutionTime": "6:00 hrs", "firstResponseTime": "1:00 hrs", "threadCount": "2"
            },
            {
                "id": "T4", "agentName": "Bob", "status": "Escalated", "departmentId": "2",
                "createdTime": "2024-05-03T09:00:00Z", "threadCount": 1
            }
        ]
    })
}

pub fn snapshot() -> Snapshot {
    serde_json::from_value(snapshot_json()).expect("fixture snapshot is valid")
}

pub fn snapshot_source() -> SnapshotSource {
    SnapshotSource::new(snapshot())
}

/// Write the fixture snapshot into a fresh temp dir.
pub fn snapshot_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot_json()).unwrap()).unwrap();
    (dir, path)
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
