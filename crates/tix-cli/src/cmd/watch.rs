//! `tix watch` — follow the live change stream and mirror the store.
//!
//! Human mode prints one line per status change, applied event, and
//! notification. JSON mode emits NDJSON, one object per line, so the output
//! stays consumable while the stream is still open.

use crate::cmd::now_millis;
use crate::output::OutputMode;
use clap::Args;
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tix_core::notify::NotificationQueue;
use tix_sync::config::ApiConfig;
use tix_sync::feed::{FeedMessage, subscribe};
use tix_sync::reconcile::{Applied, Reconciler};
use tix_sync::transport::HttpTransport;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Stop after this many applied events (default: run until interrupted).
    #[arg(long)]
    pub max_events: Option<usize>,
}

pub fn run_watch(args: &WatchArgs, config: &ApiConfig, output: OutputMode) -> anyhow::Result<()> {
    let transport = HttpTransport::new(config);
    let mut sub = subscribe(transport);
    let mut rec = Reconciler::new();
    let mut notices = NotificationQueue::new();

    // Notifications are printed once, by id; expiry only trims the queue.
    let mut printed_through: Option<u64> = None;
    let mut applied_count = 0usize;

    let stdout = std::io::stdout();

    loop {
        let message = sub.poll(POLL_INTERVAL);
        let now = now_millis();

        if let Some(message) = message {
            let mut out = stdout.lock();
            match message {
                FeedMessage::Status(status) => {
                    if output.is_json() {
                        writeln!(out, "{}", json!({ "status": status }))?;
                    } else {
                        writeln!(out, "status: {status}")?;
                    }
                }
                FeedMessage::Degraded { reason } => {
                    if output.is_json() {
                        writeln!(out, "{}", json!({ "degraded": reason }))?;
                    } else {
                        writeln!(out, "degraded: {reason} (resyncing)")?;
                    }
                }
                FeedMessage::Event(event) => {
                    let applied = rec.apply(event, &mut notices, now);
                    applied_count += 1;
                    write_applied(&applied, rec.store().len(), output, &mut out)?;
                }
            }

            for notice in notices.entries() {
                if printed_through.is_none_or(|last| notice.id > last) {
                    if output.is_json() {
                        writeln!(out, "{}", json!({ "notification": notice }))?;
                    } else {
                        crate::output::notification_line(notice, &mut out)?;
                    }
                    printed_through = Some(notice.id);
                }
            }
        }

        let expired = notices.expire_due(now_millis());
        if expired > 0 {
            debug!(expired, "notifications expired");
        }

        if args.max_events.is_some_and(|max| applied_count >= max) {
            break;
        }
    }

    sub.close();
    Ok(())
}

fn write_applied(
    applied: &Applied,
    store_len: usize,
    output: OutputMode,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    if output.is_json() {
        let line = match applied {
            Applied::SnapshotLoaded { count } => json!({ "event": "snapshot", "count": count }),
            Applied::Inserted(id) => json!({ "event": "inserted", "id": id }),
            Applied::Updated(id) => json!({ "event": "updated", "id": id }),
            Applied::Removed(id) => json!({ "event": "removed", "id": id }),
            Applied::AlreadyAbsent(id) => json!({ "event": "noop", "id": id }),
        };
        return writeln!(out, "{line}");
    }
    match applied {
        Applied::SnapshotLoaded { count } => {
            writeln!(out, "snapshot: {count} tickets")
        }
        Applied::Inserted(id) => writeln!(out, "+ {} ({store_len} total)", id.short()),
        Applied::Updated(id) => writeln!(out, "~ {}", id.short()),
        Applied::Removed(id) => writeln!(out, "- {} ({store_len} total)", id.short()),
        Applied::AlreadyAbsent(id) => writeln!(out, "- {} (already absent)", id.short()),
    }
}
