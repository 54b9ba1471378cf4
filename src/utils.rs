use std::time::{Duration, Instant};

/// Portal round-trips slower than this are logged at warn level.
pub const SLOW_REQUEST: Duration = Duration::from_secs(3);

/// Format a `Duration` with automatic unit scaling, e.g. `1.94ms` or `2.34s`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Warn when a request that began at `start` took longer than [`SLOW_REQUEST`].
pub fn log_if_slow(start: Instant, method: &str, url: &url::Url) {
    let elapsed = start.elapsed();
    if elapsed > SLOW_REQUEST {
        tracing::warn!(
            method,
            path = url.path(),
            duration = fmt_duration(elapsed),
            "slow portal request"
        );
    }
}
