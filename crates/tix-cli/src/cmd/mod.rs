//! Command handlers, one module per subcommand.

pub mod completions;
pub mod create;
pub mod delete;
pub mod edit;
pub mod health;
pub mod list;
pub mod watch;

/// Wall-clock milliseconds, the timebase for notification expiry.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
