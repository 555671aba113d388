//! Small helpers — data paths, request ids, string truncation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Get the Automation Global data directory (e.g. `~/.autoglobal/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".autoglobal")
}

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique request id, e.g. `req_1712345678901_0042`.
///
/// Millisecond timestamp plus a process-wide counter — unique within a
/// process and stable enough to correlate logs across the fallback path.
pub fn request_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req_{}_{:04}", millis, seq % 10_000)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
