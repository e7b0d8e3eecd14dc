//! Upstream ticketing data source abstraction
//!
//! The pipeline only ever talks to a [`TicketSource`]. The live helpdesk
//! client lives outside this crate; [`SnapshotSource`] serves a JSON export of
//! the same endpoints so every view can be computed offline.

use super::errors::UpstreamError;
use super::types::{AccessToken, Department, MetricRow, Ticket, TicketOrigin};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Contract of the upstream helpdesk API.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, UpstreamError>;

    /// Active tickets, optionally narrowed server-side by department and assignee.
    async fn fetch_all_tickets(
        &self,
        token: &AccessToken,
        department_ids: &[String],
        agent_id: Option<String>,
    ) -> Result<Vec<Ticket>, UpstreamError>;

    /// Archived tickets of a single department.
    async fn fetch_all_archived_tickets(
        &self,
        token: &AccessToken,
        department_id: &str,
    ) -> Result<Vec<Ticket>, UpstreamError>;

    /// Metric rows scoped to the given tickets.
    async fn fetch_ticket_metrics(
        &self,
        token: &AccessToken,
        tickets: &[Ticket],
    ) -> Result<Vec<MetricRow>, UpstreamError>;

    async fn departments(&self) -> Result<Vec<Department>, UpstreamError>;
}

/// On-disk layout of a helpdesk export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub archived_tickets: Vec<Ticket>,
    #[serde(default)]
    pub metrics: Vec<MetricRow>,
}

/// Serves the upstream contract from an in-memory [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
    token: String,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            token: "snapshot".to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UpstreamError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let shown = path.display().to_string();
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| UpstreamError::SnapshotIo {
                path: shown.clone(),
                source,
            })?;
        let snapshot: Snapshot =
            serde_json::from_str(&raw).map_err(|source| UpstreamError::SnapshotFormat {
                path: shown,
                source,
            })?;

        info!(
            path = %path.display(),
            tickets = snapshot.tickets.len(),
            archived = snapshot.archived_tickets.len(),
            metrics = snapshot.metrics.len(),
            "Loaded helpdesk snapshot"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl TicketSource for SnapshotSource {
    async fn access_token(&self) -> Result<AccessToken, UpstreamError> {
        if self.token.trim().is_empty() {
            return Err(UpstreamError::TokenUnavailable("empty token".to_string()));
        }
        Ok(AccessToken(self.token.clone()))
    }

    async fn fetch_all_tickets(
        &self,
        _token: &AccessToken,
        department_ids: &[String],
        agent_id: Option<String>,
    ) -> Result<Vec<Ticket>, UpstreamError> {
        let tickets: Vec<Ticket> = self
            .snapshot
            .tickets
            .iter()
            .filter(|t| {
                department_ids.is_empty()
                    || t.department_id
                        .as_ref()
                        .is_some_and(|d| department_ids.contains(d))
            })
            .filter(|t| match agent_id.as_deref() {
                None | Some("all") => true,
                Some(agent) => t.assignee_identifier() == Some(agent),
            })
            .cloned()
            .map(|t| t.with_origin(TicketOrigin::Active))
            .collect();

        debug!(count = tickets.len(), "Served active tickets from snapshot");
        Ok(tickets)
    }

    async fn fetch_all_archived_tickets(
        &self,
        _token: &AccessToken,
        department_id: &str,
    ) -> Result<Vec<Ticket>, UpstreamError> {
        Ok(self
            .snapshot
            .archived_tickets
            .iter()
            .filter(|t| t.department_id.as_deref() == Some(department_id))
            .cloned()
            .map(|t| t.with_origin(TicketOrigin::Archived))
            .collect())
    }

    async fn fetch_ticket_metrics(
        &self,
        _token: &AccessToken,
        tickets: &[Ticket],
    ) -> Result<Vec<MetricRow>, UpstreamError> {
        let identifiers: HashSet<&str> = tickets
            .iter()
            .flat_map(|t| [t.id.as_deref(), t.ticket_number.as_deref()])
            .flatten()
            .collect();

        Ok(self
            .snapshot
            .metrics
            .iter()
            .filter(|row| {
                [row.ticket_number.as_deref(), row.id.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|key| identifiers.contains(key))
            })
            .cloned()
            .collect())
    }

    async fn departments(&self) -> Result<Vec<Department>, UpstreamError> {
        Ok(self.snapshot.departments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_source() -> SnapshotSource {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "departments": [{ "id": "1", "name": "Support" }, { "id": 2, "name": "Billing" }],
            "tickets": [
                { "id": "T1", "ticketNumber": "101", "departmentId": "1", "assigneeId": "a1" },
                { "id": "T2", "ticketNumber": "102", "departmentId": "2", "assigneeId": "a2" }
            ],
            "archivedTickets": [
                { "id": "T3", "ticketNumber": "103", "departmentId": "2" }
            ],
            "metrics": [
                { "ticketNumber": "101", "resolutionTime": "1:00 hrs" },
                { "ticketNumber": "999" }
            ]
        }))
        .unwrap();
        SnapshotSource::new(snapshot)
    }

    #[tokio::test]
    async fn test_active_tickets_filtered_server_side() {
        let source = sample_source();
        let token = source.access_token().await.unwrap();

        let all = source.fetch_all_tickets(&token, &[], None).await.unwrap();
        assert_eq!(all.len(), 2);

        let support = source
            .fetch_all_tickets(&token, &["1".to_string()], None)
            .await
            .unwrap();
        assert_eq!(support.len(), 1);
        assert_eq!(support[0].id.as_deref(), Some("T1"));

        let by_agent = source
            .fetch_all_tickets(&token, &[], Some("a2".to_string()))
            .await
            .unwrap();
        assert_eq!(by_agent.len(), 1);
        assert_eq!(by_agent[0].id.as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn test_archived_tickets_are_tagged() {
        let source = sample_source();
        let token = source.access_token().await.unwrap();

        let archived = source.fetch_all_archived_tickets(&token, "2").await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].origin, TicketOrigin::Archived);
        assert!(source.fetch_all_archived_tickets(&token, "1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_scoped_to_requested_tickets() {
        let source = sample_source();
        let token = source.access_token().await.unwrap();
        let tickets = source.fetch_all_tickets(&token, &[], None).await.unwrap();

        let rows = source.fetch_ticket_metrics(&token, &tickets).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticket_number.as_deref(), Some("101"));
    }

    #[tokio::test]
    async fn test_blank_token_is_rejected() {
        let source = SnapshotSource::new(Snapshot::default()).with_token(" ");
        assert!(matches!(
            source.access_token().await,
            Err(UpstreamError::TokenUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_load_reports_missing_file() {
        let result = SnapshotSource::load("/definitely/not/here.json").await;
        assert!(matches!(result, Err(UpstreamError::SnapshotIo { .. })));
    }

    #[tokio::test]
    async fn test_load_reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = sample_source().snapshot().clone();
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let loaded = SnapshotSource::load(&path).await.unwrap();
        assert_eq!(loaded.snapshot().tickets.len(), 2);
        assert_eq!(loaded.snapshot().archived_tickets.len(), 1);
    }

    #[tokio::test]
    async fn test_load_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = SnapshotSource::load(&path).await;
        assert!(matches!(result, Err(UpstreamError::SnapshotFormat { .. })));
    }
}
