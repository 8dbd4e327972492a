//! `tix edit` — replace a ticket's description; the backend re-classifies.

use crate::cmd::now_millis;
use crate::output::OutputMode;
use clap::Args;
use tix_core::model::TicketId;
use tix_core::notify::NotificationQueue;
use tix_sync::api::TicketApi;
use tix_sync::coordinator::MutationCoordinator;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Ticket id (full id as shown in JSON output).
    pub id: String,

    /// New description.
    pub description: String,
}

pub fn run_edit(args: &EditArgs, api: impl TicketApi, output: OutputMode) -> anyhow::Result<()> {
    let mut coordinator = MutationCoordinator::new(api);
    let mut notices = NotificationQueue::new();
    let id = TicketId::new(&args.id);
    let outcome = coordinator.edit(&id, &args.description, &mut notices, now_millis());
    super::create::report(outcome, notices, output)
}

#[cfg(test)]
mod tests {
    use super::EditArgs;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: EditArgs,
    }

    #[test]
    fn id_then_description() {
        let w = Wrapper::parse_from(["test", "abc123", "texto corregido"]);
        assert_eq!(w.args.id, "abc123");
        assert_eq!(w.args.description, "texto corregido");
    }
}
