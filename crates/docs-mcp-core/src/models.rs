//! Core data types shared by the filter and its callers.

use std::fmt;

/// Topic value that disables filtering and returns the working text as-is.
pub const OVERVIEW_TOPIC: &str = "overview";

/// Default ceiling on the selected body, in characters.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Which half of a multiplexed corpus to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Everything before the sentinel.
    First,
    /// The sentinel line and everything after it.
    Second,
}

/// A partition choice paired with the sentinel that splits the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSelection<'a> {
    pub sentinel: &'a str,
    pub partition: Partition,
}

impl<'a> PartitionSelection<'a> {
    pub fn new(sentinel: &'a str, partition: Partition) -> Self {
        Self {
            sentinel,
            partition,
        }
    }
}

/// Which step of the filter produced an excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The overview topic was requested; no filtering applied.
    Overview,
    /// One or more heading-delimited sections matched.
    Sections,
    /// No section matched, but one or more paragraphs did.
    Paragraphs,
    /// Nothing matched; the full working text was returned.
    Unfiltered,
    /// Fetched and converted from a remote page; no topic filter applies.
    Remote,
}

/// The bounded text returned to a caller.
///
/// `body` never exceeds the configured character ceiling. When the selected
/// content was cut, `truncated` is set and `notice` holds the text appended
/// after the body by [`Excerpt::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub body: String,
    pub truncated: bool,
    pub notice: Option<String>,
    pub selection: Selection,
}

impl Excerpt {
    /// Body followed by the truncation notice, if any.
    pub fn text(&self) -> String {
        match &self.notice {
            Some(notice) => format!("{}{}", self.body, notice),
            None => self.body.clone(),
        }
    }

    /// Consumes the excerpt, returning the same string as [`Excerpt::text`].
    pub fn into_text(self) -> String {
        match self.notice {
            Some(notice) => self.body + &notice,
            None => self.body,
        }
    }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)?;
        if let Some(notice) = &self.notice {
            f.write_str(notice)?;
        }
        Ok(())
    }
}
