use serde::Serialize;

/// Per-page result slot. A slot is allocated when a page is submitted for
/// recognition and filled in whatever order completions arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSlot {
    Pending,
    Done(String),
    Failed,
}

/// Handle returned by [`Session::submit_page`]. Carries the session epoch at
/// submission time so that completions arriving after a `clear` can be told
/// apart from live ones and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    epoch: u64,
    index: usize,
}

impl PageTicket {
    /// Zero-based page index this ticket was issued for.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Outcome of applying a completion to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was applied to the session.
    Applied,
    /// The ticket was issued before the last `clear`; the result was ignored.
    Stale,
}

/// Accumulated per-document state: one result slot per submitted page, plus
/// the running counters shown to the user.
///
/// All mutation goes through `submit_page` / `complete_page` / `fail_page` /
/// `clear`; recognized text is always assembled in page-index order, never in
/// completion order.
#[derive(Debug, Default)]
pub struct Session {
    epoch: u64,
    slots: Vec<PageSlot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a result slot for a page entering the pipeline.
    ///
    /// This is the single point where the image count grows: one increment per
    /// submitted page, whether or not recognition later succeeds.
    pub fn submit_page(&mut self) -> PageTicket {
        let index = self.slots.len();
        self.slots.push(PageSlot::Pending);
        PageTicket { epoch: self.epoch, index }
    }

    /// Record a successful recognition result for the ticket's page.
    pub fn complete_page(&mut self, ticket: PageTicket, text: String) -> Completion {
        self.apply(ticket, PageSlot::Done(text))
    }

    /// Record a recognition failure for the ticket's page. The page keeps its
    /// slot (and its place in the image count) but contributes no text.
    pub fn fail_page(&mut self, ticket: PageTicket) -> Completion {
        self.apply(ticket, PageSlot::Failed)
    }

    fn apply(&mut self, ticket: PageTicket, slot: PageSlot) -> Completion {
        if ticket.epoch != self.epoch {
            return Completion::Stale;
        }
        self.slots[ticket.index] = slot;
        Completion::Applied
    }

    /// Reset text, counters, and slots. Outstanding tickets from before the
    /// clear become stale and their results will be discarded on arrival.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.slots.clear();
    }

    /// Assembled recognized text: successful pages joined with line breaks in
    /// page-index order. Pending and failed pages are skipped.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        for slot in &self.slots {
            if let PageSlot::Done(text) = slot {
                parts.push(text.as_str());
            }
        }
        parts.join("\n")
    }

    /// Number of pages that have entered the pipeline this session.
    pub fn image_count(&self) -> usize {
        self.slots.len()
    }

    /// Word count over the full assembled text. Recomputed on every call
    /// rather than tracked incrementally, so failed pages can never leave the
    /// counter out of sync with the displayed text.
    pub fn word_count(&self) -> usize {
        count_words(&self.text())
    }

    /// Pages submitted but not yet completed or failed.
    pub fn pending_pages(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, PageSlot::Pending)).count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            text: self.text(),
            image_count: self.image_count(),
            word_count: self.word_count(),
        }
    }
}

/// Serializable view of the session for display or `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub text: String,
    pub image_count: usize,
    pub word_count: usize,
}

/// Whitespace-separated word count, blank runs filtered.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
