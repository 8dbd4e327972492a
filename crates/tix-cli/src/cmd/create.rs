//! `tix create` — submit a new ticket for classification.

use crate::cmd::now_millis;
use crate::output::{OutputMode, notification_line, render};
use clap::Args;
use serde::Serialize;
use tix_core::notify::{Notification, NotificationQueue};
use tix_sync::api::TicketApi;
use tix_sync::coordinator::{MutationCoordinator, MutationOutcome};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Free-text problem description (category and sentiment are assigned
    /// server-side).
    pub description: String,
}

#[derive(Debug, Serialize)]
struct MutationOutput {
    ok: bool,
    notifications: Vec<Notification>,
}

pub fn run_create(
    args: &CreateArgs,
    api: impl TicketApi,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut coordinator = MutationCoordinator::new(api);
    let mut notices = NotificationQueue::new();
    let outcome = coordinator.create(&args.description, &mut notices, now_millis());
    report(outcome, notices, output)
}

/// Shared tail for the mutation commands: print what the coordinator queued
/// and fail the process when the mutation did not go through.
pub fn report(
    outcome: MutationOutcome,
    notices: NotificationQueue,
    output: OutputMode,
) -> anyhow::Result<()> {
    let payload = MutationOutput {
        ok: outcome == MutationOutcome::Accepted,
        notifications: notices.entries().to_vec(),
    };
    render(output, &payload, |result, w| {
        for notice in &result.notifications {
            notification_line(notice, w)?;
        }
        Ok(())
    })?;
    if payload.ok {
        Ok(())
    } else {
        anyhow::bail!("mutation rejected")
    }
}
