//! Metrics endpoint
//!
//! Exposes request counters in the Prometheus text exposition format,
//! backed by the lock-free `RequestStats` tracker.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::api::middleware::AppState;

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let stats = &state.request_stats;

    let body = format!(
        "# HELP newsroom_requests_total Total number of HTTP requests processed.\n\
         # TYPE newsroom_requests_total counter\n\
         newsroom_requests_total {}\n\
         # HELP newsroom_response_time_avg_us Average response time in microseconds.\n\
         # TYPE newsroom_response_time_avg_us gauge\n\
         newsroom_response_time_avg_us {}\n\
         # HELP newsroom_uptime_seconds Process uptime in seconds.\n\
         # TYPE newsroom_uptime_seconds gauge\n\
         newsroom_uptime_seconds {}\n",
        stats.total_requests(),
        stats.avg_response_time_us(),
        stats.uptime_seconds(),
    );

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
