//! Incremental merge of listing pages into the displayed list.
//!
//! Each fetch is described by a [`FetchTicket`]. A reset ticket starts a new
//! generation and is always issued; a load-more ticket is only issued when
//! nothing is in flight and more pages remain. Responses for an older
//! generation are discarded, so a late reply can never overwrite a newer
//! listing.

use std::collections::HashSet;
use std::fmt::Display;

use atelier_core::api::ListResponse;
use atelier_core::{Product, ProductId};

/// Identifies one fetch and how its response must be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
    pub reset: bool,
}

/// What [`ResultAccumulator::complete`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Replaced (reset) or extended (load more) the list.
    Applied { added: usize },
    /// A newer reset superseded the ticket; nothing changed.
    Stale,
    /// The fetch failed; prior results are kept.
    Failed,
}

/// Displayed products plus the paging cursor.
#[derive(Debug, Clone)]
pub struct ResultAccumulator {
    items: Vec<Product>,
    seen: HashSet<ProductId>,
    next_page: u32,
    has_more: bool,
    in_flight: bool,
    generation: u64,
    total_products: u64,
    total_pages: u64,
    error: Option<String>,
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            has_more: true,
            in_flight: false,
            generation: 0,
            total_products: 0,
            total_pages: 0,
            error: None,
        }
    }

    /// Start a fresh listing.
    ///
    /// Clears the displayed list, rewinds to page 1 and bumps the generation
    /// so any fetch still in flight becomes stale.
    pub fn begin_reset(&mut self) -> FetchTicket {
        self.generation += 1;
        self.items.clear();
        self.seen.clear();
        self.next_page = 1;
        self.has_more = true;
        self.in_flight = true;
        self.error = None;

        FetchTicket {
            generation: self.generation,
            page: 1,
            reset: true,
        }
    }

    /// Ask for the next page.
    ///
    /// Returns `None`, dropping the request, while another fetch is in flight
    /// or when the last page has already been merged.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;

        Some(FetchTicket {
            generation: self.generation,
            page: self.next_page,
            reset: false,
        })
    }

    /// Merge the outcome of the fetch described by `ticket`.
    pub fn complete<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<ListResponse, E>,
    ) -> MergeOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale listing response"
            );
            return MergeOutcome::Stale;
        }
        self.in_flight = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, page = ticket.page, "listing fetch failed");
                self.error = Some(format!("Could not load products: {e}"));
                return MergeOutcome::Failed;
            }
        };

        if ticket.reset {
            self.items.clear();
            self.seen.clear();
        }

        let before = self.items.len();
        for product in response.data {
            if self.seen.insert(product.id) {
                self.items.push(product);
            }
        }

        self.next_page = if ticket.reset { 2 } else { ticket.page + 1 };
        self.has_more = u64::from(response.current_page) < response.total_pages;
        self.total_products = response.total_products;
        self.total_pages = response.total_pages;
        self.error = None;

        MergeOutcome::Applied {
            added: self.items.len() - before,
        }
    }

    /// Products in display order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.next_page
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Total matching products reported by the last applied response.
    #[must_use]
    pub const fn total_products(&self) -> u64 {
        self.total_products
    }

    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Message for the most recent failed fetch, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
