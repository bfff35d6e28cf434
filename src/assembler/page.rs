//! Page span bookkeeping.
//!
//! The decoder declares every page span up front. Opening a span picks the
//! declared span that covers the next physical page; running past the last
//! declared page is fatal.

use crate::error::{Error, Result};
use crate::model::{PageGeometry, PageSpan};

/// Result of applying a page break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    /// The open span still has pages left; the next paragraph starts a page
    NextPage,
    /// The open span is used up and must be closed
    CloseSpan,
    /// No span is open; nothing to do
    Idle,
}

/// Page state of a session. Not part of sub-document snapshots.
#[derive(Debug, Clone)]
pub struct PageState {
    spans: Vec<PageSpan>,
    /// Physical pages started so far
    pages_started: u32,
    /// Pages of the open span after the current one
    pages_remaining: u32,
    current: Option<usize>,
    page_number: u32,
}

impl PageState {
    /// Create the page state for a declared span sequence.
    pub fn new(spans: Vec<PageSpan>) -> Self {
        Self {
            spans,
            pages_started: 0,
            pages_remaining: 0,
            current: None,
            page_number: 1,
        }
    }

    /// Total number of declared physical pages.
    pub fn total_pages(&self) -> u32 {
        self.spans
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.page_count.max(1)))
    }

    /// Check if a span is open.
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The open span.
    pub fn current_span(&self) -> Option<&PageSpan> {
        self.current.and_then(|i| self.spans.get(i))
    }

    /// Geometry of the open span, or of the next span to open.
    pub fn geometry(&self) -> PageGeometry {
        self.current_span()
            .or_else(|| self.locate(self.pages_started).and_then(|i| self.spans.get(i)))
            .or_else(|| self.spans.last())
            .map(|s| s.geometry)
            .unwrap_or_default()
    }

    /// Physical pages started so far.
    pub fn pages_started(&self) -> u32 {
        self.pages_started
    }

    /// Current page number, advanced once per requested break.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Count a break request.
    pub fn count_break(&mut self) {
        self.page_number = self.page_number.saturating_add(1);
    }

    fn locate(&self, page: u32) -> Option<usize> {
        let mut end = 0u32;
        for (index, span) in self.spans.iter().enumerate() {
            end = end.saturating_add(span.page_count.max(1));
            if page < end {
                return Some(index);
            }
        }
        None
    }

    /// Open the span covering the next physical page and return its index.
    pub fn open(&mut self) -> Result<usize> {
        if let Some(index) = self.current {
            return Ok(index);
        }
        let Some(index) = self.locate(self.pages_started) else {
            return Err(Error::PageSpanExhausted {
                page: self.pages_started.saturating_add(1),
                available: self.total_pages(),
            });
        };

        let end = self.spans[..=index]
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.page_count.max(1)));
        // locate() guarantees pages_started < end
        self.pages_remaining = end - self.pages_started - 1;
        self.pages_started += 1;
        self.current = Some(index);
        if let Some(start) = self.spans[index].page_number_start {
            self.page_number = start;
        }
        log::debug!(
            "opening page span {} at page {} ({} more pages)",
            index,
            self.pages_started,
            self.pages_remaining
        );
        Ok(index)
    }

    /// Mark the open span closed. Remaining pages of the span are skipped.
    pub fn close(&mut self) {
        if self.current.take().is_some() {
            self.pages_started = self.pages_started.saturating_add(self.pages_remaining);
            self.pages_remaining = 0;
        }
    }

    /// Apply a page break to the open span.
    pub fn apply_break(&mut self) -> BreakOutcome {
        if self.current.is_none() {
            return BreakOutcome::Idle;
        }
        if self.pages_remaining > 0 {
            self.pages_remaining -= 1;
            self.pages_started += 1;
            BreakOutcome::NextPage
        } else {
            BreakOutcome::CloseSpan
        }
    }
}
