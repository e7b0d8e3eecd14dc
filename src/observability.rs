use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Upstream helpdesk API usage counters
#[derive(Debug, Default)]
pub struct UpstreamMetrics {
    pub total_requests: AtomicU64,
    pub errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
}

impl UpstreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> UpstreamStats {
        UpstreamStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requests = stats.total_requests,
            errors = stats.errors,
            cache_hits = stats.cache_hits,
            cache_misses = stats.cache_misses,
            "Upstream API usage"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamStats {
    pub total_requests: u64,
    pub errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

static UPSTREAM_METRICS: std::sync::LazyLock<UpstreamMetrics> =
    std::sync::LazyLock::new(UpstreamMetrics::new);

pub fn upstream_metrics() -> &'static UpstreamMetrics {
    &UPSTREAM_METRICS
}

/// Logs how long a pipeline stage took when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = UpstreamMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_error();
        metrics.record_cache_hit();

        assert_eq!(
            metrics.get_stats(),
            UpstreamStats {
                total_requests: 2,
                errors: 1,
                cache_hits: 1,
                cache_misses: 0,
            }
        );
    }
}
