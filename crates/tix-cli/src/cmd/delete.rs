//! `tix delete` — remove a ticket.

use crate::cmd::now_millis;
use crate::output::OutputMode;
use clap::Args;
use tix_core::model::TicketId;
use tix_core::notify::NotificationQueue;
use tix_sync::api::TicketApi;
use tix_sync::coordinator::MutationCoordinator;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Ticket id to delete.
    pub id: String,
}

pub fn run_delete(args: &DeleteArgs, api: impl TicketApi, output: OutputMode) -> anyhow::Result<()> {
    let mut coordinator = MutationCoordinator::new(api);
    let mut notices = NotificationQueue::new();
    let id = TicketId::new(&args.id);
    let outcome = coordinator.delete(&id, &mut notices, now_millis());
    super::create::report(outcome, notices, output)
}

#[cfg(test)]
mod tests {
    use super::DeleteArgs;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: DeleteArgs,
    }

    #[test]
    fn id_is_positional() {
        let w = Wrapper::parse_from(["test", "abc123"]);
        assert_eq!(w.args.id, "abc123");
    }
}
