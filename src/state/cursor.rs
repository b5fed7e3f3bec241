use std::fmt;

/// Position of the crawl in the catalog
///
/// Page indices start at 1 and only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageCursor(u32);

impl PageCursor {
    /// Cursor pointing at the catalog root
    pub fn first() -> Self {
        Self(1)
    }

    /// Current page index (always >= 1)
    pub fn page(&self) -> u32 {
        self.0
    }

    /// Moves to the following page
    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}
