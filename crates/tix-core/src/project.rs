//! View projection: filter + paginate without touching the store.
//!
//! `project` is a pure function of (tickets, search term, page, page size)
//! and is safe to call on every render. Filtering never reorders; the
//! store's arrival order is the display order.

use crate::model::Ticket;
use serde::Serialize;

/// Page size used by the dashboard grid (3×3).
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// One page of the filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedPage<'a> {
    /// Tickets on this page, in store order.
    pub tickets: Vec<&'a Ticket>,
    /// The 1-based page actually shown (clamped).
    pub page: usize,
    /// Total pages for the current filter; at least 1 even when empty.
    pub total_pages: usize,
    /// How many tickets matched the filter across all pages.
    pub filtered: usize,
}

/// Serializable summary of a page, for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub filtered: usize,
}

impl ProjectedPage<'_> {
    #[must_use]
    pub fn info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            total_pages: self.total_pages,
            filtered: self.filtered,
        }
    }
}

/// Does `ticket` match a (pre-lowercased, non-empty) search needle?
///
/// Matches description or category, case-insensitively. A ticket without a
/// category never matches on category.
fn matches(ticket: &Ticket, needle: &str) -> bool {
    if ticket.description.to_lowercase().contains(needle) {
        return true;
    }
    ticket
        .category
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(needle))
}

/// Clamp a requested 1-based page into `[1, total_pages]`.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Filter, order-preserve, paginate.
///
/// `search_term` empty means "match everything". `page` is 1-based and
/// clamped; a `page_size` of zero is treated as one.
#[must_use]
pub fn project<'a>(
    tickets: &'a [Ticket],
    search_term: &str,
    page: usize,
    page_size: usize,
) -> ProjectedPage<'a> {
    let page_size = page_size.max(1);
    let needle = search_term.trim().to_lowercase();

    let filtered: Vec<&Ticket> = if needle.is_empty() {
        tickets.iter().collect()
    } else {
        tickets.iter().filter(|t| matches(t, &needle)).collect()
    };

    let total_pages = filtered.len().div_ceil(page_size).max(1);
    let page = clamp_page(page, total_pages);
    let start = (page - 1) * page_size;
    let slice = filtered
        .iter()
        .skip(start)
        .take(page_size)
        .copied()
        .collect();

    ProjectedPage {
        tickets: slice,
        page,
        total_pages,
        filtered: filtered.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PAGE_SIZE, clamp_page, project};
    use crate::model::{Ticket, TicketId};
    use chrono::{TimeZone, Utc};

    fn ticket(id: &str, description: &str, category: Option<&str>) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            description: description.to_string(),
            category: category.map(str::to_string),
            sentiment: None,
            processed: category.is_some(),
        }
    }

    fn corpus(n: usize) -> Vec<Ticket> {
        (0..n)
            .map(|i| ticket(&format!("t{i}"), &format!("issue number {i}"), None))
            .collect()
    }

    #[test]
    fn empty_search_matches_everything() {
        let tickets = corpus(4);
        let page = project(&tickets, "", 1, DEFAULT_PAGE_SIZE);
        assert_eq!(page.filtered, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.tickets.len(), 4);
    }

    #[test]
    fn twenty_tickets_page_three_holds_remainder() {
        let tickets = corpus(20);
        let page = project(&tickets, "", 3, 9);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.tickets.len(), 2);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn category_only_match_is_included() {
        let tickets = vec![
            ticket("t1", "password reset", Some("Acceso")),
            ticket("t2", "refund please", Some("Facturación")),
            ticket("t3", "billing page broken", None),
        ];
        let page = project(&tickets, "facturación", 1, 9);
        let ids: Vec<&str> = page.tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t2"]);
    }

    #[test]
    fn null_category_never_matches_nonempty_term() {
        let tickets = vec![ticket("t1", "totally unrelated", None)];
        let page = project(&tickets, "billing", 1, 9);
        assert_eq!(page.filtered, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.tickets.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_on_description() {
        let tickets = vec![ticket("t1", "BILLING portal down", None)];
        let page = project(&tickets, "billing", 1, 9);
        assert_eq!(page.filtered, 1);
    }

    #[test]
    fn filtering_preserves_store_order() {
        let tickets = vec![
            ticket("t1", "alpha billing", None),
            ticket("t2", "noise", None),
            ticket("t3", "beta billing", None),
        ];
        let page = project(&tickets, "billing", 1, 9);
        let ids: Vec<&str> = page.tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t3"]);
    }

    #[test]
    fn out_of_range_page_clamps() {
        let tickets = corpus(3);
        let page = project(&tickets, "", 99, 9);
        assert_eq!(page.page, 1);
        let page = project(&tickets, "", 0, 9);
        assert_eq!(page.page, 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(0, 0), 1);
    }

    #[test]
    fn projection_is_idempotent() {
        let tickets = corpus(20);
        let first = project(&tickets, "number 1", 2, 5);
        let second = project(&tickets, "number 1", 2, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let tickets = corpus(2);
        let page = project(&tickets, "", 1, 0);
        assert_eq!(page.tickets.len(), 1);
        assert_eq!(page.total_pages, 2);
    }
}
