//! Metric names shared by the collector and the renderer.
//!
//! The k6 script writes these names into its summary export; everything that
//! reads a result artifact looks them up through this module.

/// Total HTTP requests. Its `rate` field is the throughput in req/s.
pub const TOTAL_REQUESTS: &str = "http_reqs";

/// Duration of every HTTP request (ms). Carries `avg` and `p(95)`.
pub const REQUEST_DURATION: &str = "http_req_duration";

/// Share of failed HTTP requests. Its `rate` field is the error rate (0..1).
pub const REQUEST_FAILED: &str = "http_req_failed";

/// Field names inside a metric's `values` object.
pub mod field {
    pub const RATE: &str = "rate";
    pub const AVG: &str = "avg";
    pub const P95: &str = "p(95)";
}

/// Maps one logical workload to the trend metric that records its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioMetricKey {
    /// k6 scenario name.
    pub scenario: &'static str,
    /// Metric carrying the scenario's request duration.
    pub metric: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Workloads shown in the report's scenario table, in display order.
pub const SCENARIOS: &[ScenarioMetricKey] = &[
    ScenarioMetricKey {
        scenario: "health_check",
        metric: "health_duration",
        title: "Health Check",
        description: "Static JSON, no DB",
    },
    ScenarioMetricKey {
        scenario: "read_posts",
        metric: "list_posts_duration",
        title: "List Posts",
        description: "DB query (Limit 20)",
    },
    ScenarioMetricKey {
        scenario: "single_post",
        metric: "single_post_duration",
        title: "Single Post",
        description: "DB Find by ID",
    },
    ScenarioMetricKey {
        scenario: "write_posts",
        metric: "create_post_duration",
        title: "Create Post",
        description: "DB Insert + Validation",
    },
    ScenarioMetricKey {
        scenario: "heavy_compute",
        metric: "heavy_duration",
        title: "Heavy Compute",
        description: "Fibonacci 30 + JSON loops",
    },
];
