use super::errors::UpstreamError;
use super::source::TicketSource;
use super::types::{AccessToken, Department, MetricRow, Ticket};
use crate::config::UpstreamConfig;
use crate::observability::upstream_metrics;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEPARTMENTS_KEY: &str = "departments";

/// Throttles calls into another [`TicketSource`] and caches the department
/// directory, which rarely changes between requests.
pub struct RateLimitedSource<S> {
    inner: S,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    departments: Cache<String, Vec<Department>>,
}

impl<S: TicketSource> RateLimitedSource<S> {
    pub fn new(inner: S, config: &UpstreamConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_capacity).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        let departments = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.department_cache_ttl_seconds))
            .build();

        Self {
            inner,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            departments,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn throttle(&self, endpoint: &str) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;
        upstream_metrics().record_request();
        debug!(endpoint, "Upstream request admitted by rate limiter");
    }

    fn track<T>(result: Result<T, UpstreamError>) -> Result<T, UpstreamError> {
        if result.is_err() {
            upstream_metrics().record_error();
        }
        result
    }

    /// Drop the cached department directory.
    pub async fn clear_cache(&self) {
        self.departments.invalidate_all();
    }
}

#[async_trait]
impl<S: TicketSource> TicketSource for RateLimitedSource<S> {
    async fn access_token(&self) -> Result<AccessToken, UpstreamError> {
        self.throttle("token").await;
        Self::track(self.inner.access_token().await)
    }

    async fn fetch_all_tickets(
        &self,
        token: &AccessToken,
        department_ids: &[String],
        agent_id: Option<String>,
    ) -> Result<Vec<Ticket>, UpstreamError> {
        self.throttle("tickets").await;
        Self::track(self.inner.fetch_all_tickets(token, department_ids, agent_id).await)
    }

    async fn fetch_all_archived_tickets(
        &self,
        token: &AccessToken,
        department_id: &str,
    ) -> Result<Vec<Ticket>, UpstreamError> {
        self.throttle("archived_tickets").await;
        Self::track(self.inner.fetch_all_archived_tickets(token, department_id).await)
    }

    async fn fetch_ticket_metrics(
        &self,
        token: &AccessToken,
        tickets: &[Ticket],
    ) -> Result<Vec<MetricRow>, UpstreamError> {
        self.throttle("ticket_metrics").await;
        Self::track(self.inner.fetch_ticket_metrics(token, tickets).await)
    }

    async fn departments(&self) -> Result<Vec<Department>, UpstreamError> {
        if let Some(cached) = self.departments.get(DEPARTMENTS_KEY).await {
            upstream_metrics().record_cache_hit();
            return Ok(cached);
        }
        upstream_metrics().record_cache_miss();

        self.throttle("departments").await;
        let departments = Self::track(self.inner.departments().await)?;
        self.departments
            .insert(DEPARTMENTS_KEY.to_string(), departments.clone())
            .await;
        Ok(departments)
    }
}
