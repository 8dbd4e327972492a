//! The subscription runner.
//!
//! A reader thread owns the [`Transport`] and publishes [`FeedMessage`]s
//! over an mpsc channel; the consumer side drains them into the reconciler.
//! The loop guarantees snapshot-before-live within each connection epoch:
//! live forwarding starts only after a snapshot fetch succeeds, and every
//! reconnect (and every malformed payload) forces a fresh snapshot because
//! the stream is at-least-once only while connected.

use crate::event::{ChangeEvent, normalize_value};
use crate::status::ConnectionStatus;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tix_core::model::Ticket;
use tracing::{debug, info, warn};

/// Errors the transport can surface to the runner.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("snapshot fetch failed: {0}")]
    Snapshot(String),

    #[error("change stream failed: {0}")]
    Stream(String),
}

/// Boundary to the realtime provider.
///
/// `next_change` should block at most briefly (the runner polls the shutdown
/// flag between calls) and return `Ok(None)` when nothing is pending.
pub trait Transport: Send {
    /// One-shot full read of all tickets, ordered `created_at` descending.
    fn fetch_snapshot(&mut self) -> Result<Vec<Ticket>, TransportError>;

    /// Next raw change payload, if any. `Err` means the stream is gone and
    /// the runner must reconnect.
    fn next_change(&mut self) -> Result<Option<Value>, TransportError>;
}

/// What the reader thread publishes.
#[derive(Debug)]
pub enum FeedMessage {
    /// Connection state transition, independent of ticket data.
    Status(ConnectionStatus),
    /// A normalized event ready for the reconciler.
    Event(ChangeEvent),
    /// A payload was dropped; a resync snapshot follows (or a reconnect if
    /// the resync fetch itself failed).
    Degraded { reason: String },
}

/// Tuning for the runner; defaults are production values, tests shrink them.
#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    /// First reconnect delay; doubles per consecutive failure.
    pub backoff_base: Duration,
    /// Upper bound for the reconnect delay.
    pub backoff_cap: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            backoff_base: Duration::from_millis(250),
            backoff_cap: Duration::from_secs(15),
        }
    }
}

/// Exponential backoff with jitter, reset on every successful snapshot.
struct Backoff {
    options: FeedOptions,
    attempt: u32,
}

impl Backoff {
    const fn new(options: FeedOptions) -> Self {
        Self {
            options,
            attempt: 0,
        }
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_delay(&mut self) -> Duration {
        let exp = self
            .options
            .backoff_base
            .saturating_mul(1_u32 << self.attempt.min(6));
        let capped = exp.min(self.options.backoff_cap);
        self.attempt = self.attempt.saturating_add(1);

        let jitter_range = capped.as_millis() as u64 / 2;
        let jitter = if jitter_range == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_range)
        };
        capped + Duration::from_millis(jitter)
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle tears the subscription down; `close` may also be
/// called explicitly and is idempotent.
pub struct Subscription {
    messages: Receiver<FeedMessage>,
    shutdown: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
    closed: bool,
}

/// Start a subscription with default options.
pub fn subscribe(transport: impl Transport + 'static) -> Subscription {
    subscribe_with(transport, FeedOptions::default())
}

/// Start a subscription with explicit options.
pub fn subscribe_with(transport: impl Transport + 'static, options: FeedOptions) -> Subscription {
    let (tx, rx) = mpsc::channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let feed_tx = tx.clone();
    let worker = match thread::Builder::new()
        .name("tix-feed".to_string())
        .spawn(move || run_feed(transport, &feed_tx, &flag, options))
    {
        Ok(handle) => Some(handle),
        Err(err) => {
            // A subscription that can never produce must still terminate:
            // hand the consumer a final Closed instead of eternal silence.
            warn!(error = %err, "feed worker failed to start");
            let _ = tx.send(FeedMessage::Status(ConnectionStatus::Closed));
            None
        }
    };

    Subscription {
        messages: rx,
        shutdown,
        worker,
        closed: false,
    }
}

impl Subscription {
    /// Wait up to `timeout` for the next message. Returns `None` on timeout
    /// or after the subscription has been closed.
    pub fn poll(&self, timeout: Duration) -> Option<FeedMessage> {
        if self.closed {
            return None;
        }
        self.messages.recv_timeout(timeout).ok()
    }

    /// Non-blocking variant of [`Subscription::poll`].
    pub fn try_message(&self) -> Option<FeedMessage> {
        if self.closed {
            return None;
        }
        self.messages.try_recv().ok()
    }

    /// Tear down the subscription. Safe to call twice; the second call is a
    /// no-op. Stops delivery immediately: the runner exits at its next poll
    /// and anything it managed to queue meanwhile is never handed out.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("subscription closed");
    }

    /// Whether `close` has already run.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sleep in short slices so shutdown stays responsive. Returns false when
/// interrupted by shutdown.
fn sleep_interruptible(total: Duration, shutdown: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(Duration::from_millis(10));
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !shutdown.load(Ordering::SeqCst)
}

fn run_feed(
    mut transport: impl Transport,
    tx: &Sender<FeedMessage>,
    shutdown: &AtomicBool,
    options: FeedOptions,
) {
    let mut backoff = Backoff::new(options);

    if tx.send(FeedMessage::Status(ConnectionStatus::Connecting)).is_err() {
        return;
    }

    'connect: loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        // Snapshot phase. Live forwarding never starts without a baseline.
        match transport.fetch_snapshot() {
            Ok(tickets) => {
                debug!(count = tickets.len(), "snapshot loaded");
                backoff.reset();
                if tx.send(FeedMessage::Event(ChangeEvent::Snapshot(tickets))).is_err() {
                    return;
                }
                if tx.send(FeedMessage::Status(ConnectionStatus::Subscribed)).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "snapshot fetch failed, backing off");
                if tx.send(FeedMessage::Status(ConnectionStatus::Reconnecting)).is_err() {
                    return;
                }
                if !sleep_interruptible(backoff.next_delay(), shutdown) {
                    break 'connect;
                }
                continue 'connect;
            }
        }

        // Live phase.
        loop {
            if shutdown.load(Ordering::SeqCst) {
                break 'connect;
            }

            match transport.next_change() {
                Ok(Some(raw)) => match normalize_value(raw) {
                    Ok(event) => {
                        if tx.send(FeedMessage::Event(event)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        // Drop the event, tell the consumer, restore a known
                        // baseline right away.
                        warn!(error = %err, "dropping malformed change event");
                        if tx
                            .send(FeedMessage::Degraded {
                                reason: err.to_string(),
                            })
                            .is_err()
                        {
                            return;
                        }
                        match transport.fetch_snapshot() {
                            Ok(tickets) => {
                                if tx
                                    .send(FeedMessage::Event(ChangeEvent::Snapshot(tickets)))
                                    .is_err()
                                {
                                    return;
                                }
                            }
                            Err(snap_err) => {
                                warn!(error = %snap_err, "resync snapshot failed");
                                if tx
                                    .send(FeedMessage::Status(ConnectionStatus::Reconnecting))
                                    .is_err()
                                {
                                    return;
                                }
                                if !sleep_interruptible(backoff.next_delay(), shutdown) {
                                    break 'connect;
                                }
                                continue 'connect;
                            }
                        }
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "change stream lost, reconnecting");
                    if tx.send(FeedMessage::Status(ConnectionStatus::Reconnecting)).is_err() {
                        return;
                    }
                    if !sleep_interruptible(backoff.next_delay(), shutdown) {
                        break 'connect;
                    }
                    continue 'connect;
                }
            }
        }
    }

    let _ = tx.send(FeedMessage::Status(ConnectionStatus::Closed));
}

#[cfg(test)]
mod tests {
    use super::{Backoff, FeedMessage, FeedOptions, Subscription};
    use crate::status::ConnectionStatus;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn backoff_grows_and_respects_cap() {
        let mut backoff = Backoff::new(FeedOptions {
            backoff_base: Duration::from_millis(100),
            backoff_cap: Duration::from_millis(400),
        });

        let first = backoff.next_delay();
        assert!(first >= Duration::from_millis(100));
        assert!(first <= Duration::from_millis(150));

        let second = backoff.next_delay();
        assert!(second >= Duration::from_millis(200));

        // Far past the doubling range the cap (plus jitter) bounds it.
        for _ in 0..10 {
            let delay = backoff.next_delay();
            assert!(delay <= Duration::from_millis(600));
        }
    }

    #[test]
    fn backoff_reset_returns_to_base() {
        let mut backoff = Backoff::new(FeedOptions {
            backoff_base: Duration::from_millis(100),
            backoff_cap: Duration::from_secs(10),
        });
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert!(backoff.next_delay() <= Duration::from_millis(150));
    }

    // The state a failed worker spawn leaves behind: no thread, a Closed
    // status already queued. The handle must deliver it and tear down
    // cleanly rather than hang its consumer.
    #[test]
    fn workerless_subscription_delivers_closed_and_shuts_down() {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(FeedMessage::Status(ConnectionStatus::Closed));
        let mut sub = Subscription {
            messages: rx,
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: None,
            closed: false,
        };

        match sub.poll(Duration::from_millis(100)) {
            Some(FeedMessage::Status(ConnectionStatus::Closed)) => {}
            other => panic!("expected terminal Closed, got {other:?}"),
        }

        sub.close();
        assert!(sub.is_closed());
        assert!(sub.try_message().is_none());
    }
}
