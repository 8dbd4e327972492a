//! `tix list` — one-shot snapshot, filtered and paginated.

use crate::output::{CliError, OutputMode, render, render_error, ticket_line};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use tix_core::model::Ticket;
use tix_core::project::{self, DEFAULT_PAGE_SIZE, PageInfo};
use tix_core::store::TicketStore;
use tix_sync::api::TicketApi;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match against description and category.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show (1-based; clamped to the last page).
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Tickets per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    tickets: Vec<Ticket>,
    #[serde(flatten)]
    page: PageInfo,
}

pub fn run_list(args: &ListArgs, api: &impl TicketApi, output: OutputMode) -> anyhow::Result<()> {
    let tickets = match api.fetch_tickets() {
        Ok(tickets) => tickets,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(err.to_string(), err.error_code()),
            )?;
            anyhow::bail!("could not load tickets");
        }
    };

    let mut store = TicketStore::new();
    store.replace_all(tickets);

    let search = args.search.as_deref().unwrap_or("");
    let projected = project::project(store.snapshot(), search, args.page, args.page_size);

    let payload = ListOutput {
        page: projected.info(),
        tickets: projected.tickets.into_iter().cloned().collect(),
    };

    render(output, &payload, |list, w| render_list_human(list, w))
}

fn render_list_human(list: &ListOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if list.tickets.is_empty() {
        return writeln!(w, "no tickets");
    }
    for ticket in &list.tickets {
        ticket_line(ticket, w)?;
    }
    writeln!(
        w,
        "page {}/{} ({} matching)",
        list.page.page, list.page.total_pages, list.page.filtered
    )
}

#[cfg(test)]
mod tests {
    use super::ListArgs;
    use clap::Parser;
    use tix_core::project::DEFAULT_PAGE_SIZE;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_defaults() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.search.is_none());
        assert_eq!(w.args.page, 1);
        assert_eq!(w.args.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn list_args_parse_search_and_page() {
        let w = Wrapper::parse_from(["test", "--search", "factura", "--page", "3"]);
        assert_eq!(w.args.search.as_deref(), Some("factura"));
        assert_eq!(w.args.page, 3);
    }
}
