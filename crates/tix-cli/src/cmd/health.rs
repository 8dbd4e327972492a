//! `tix health` — backend reachability check.

use crate::output::{CliError, OutputMode, render, render_error};
use clap::Args;
use serde::Serialize;
use tix_sync::api::{HttpApi, TicketApi};

#[derive(Args, Debug, Default)]
pub struct HealthArgs {}

#[derive(Debug, Serialize)]
struct HealthOutput {
    ok: bool,
    base_url: String,
}

pub fn run_health(_args: &HealthArgs, api: &HttpApi, output: OutputMode) -> anyhow::Result<()> {
    let base_url = api.config().base_url.clone();
    match api.health() {
        Ok(()) => {
            let payload = HealthOutput { ok: true, base_url };
            render(output, &payload, |health, w| {
                writeln!(w, "✓ backend reachable at {}", health.base_url)
            })
        }
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(err.to_string(), err.error_code()),
            )?;
            anyhow::bail!("backend health check failed")
        }
    }
}
