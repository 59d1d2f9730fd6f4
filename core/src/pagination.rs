//! Next-page cursor.
//!
//! The platform signals more pages through `Links.Next` (percent-encoded).
//! At the end of a result set it sometimes repeats the last next-URL instead
//! of omitting it, so the cursor remembers the last URL it followed and stops
//! when it sees it again.

use crate::builder::EndpointBuilder;
use crate::response::Handled;

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    last_next: Option<String>,
}

/// What the page loop does after delivering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStep {
    /// The call is not paginated (or the payload was not a list): stop
    /// without a completion marker.
    Finished,
    /// The builder now points at this URL; fetch it.
    Follow(String),
    /// The cursor converged; emit `PaginationComplete` and stop.
    Complete,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last_next.as_deref()
    }

    /// Decode `next` and return it if it moves the cursor forward.
    pub fn advance(&mut self, next: Option<&str>) -> Option<String> {
        let decoded = urlencoding::decode(next?).ok()?.into_owned();
        if decoded.is_empty() || self.last_next.as_deref() == Some(decoded.as_str()) {
            return None;
        }
        self.last_next = Some(decoded.clone());
        Some(decoded)
    }

    /// Decide the next step after `handled` was delivered, pointing the
    /// builder at the next page when there is one.
    pub fn step(&mut self, builder: &mut EndpointBuilder, handled: &Handled) -> PageStep {
        if !builder.paginates() || !handled.payload.is_list() {
            return PageStep::Finished;
        }
        match self.advance(handled.next.as_deref()) {
            Some(url) => {
                builder.follow(&url);
                PageStep::Follow(url)
            }
            None => PageStep::Complete,
        }
    }
}
