//! Topic-relevance filter over a local documentation corpus.
//!
//! [`select`] is the single entry point. It is a pure function of its inputs:
//! the corpus is scanned fresh on every call and nothing is cached.
//!
//! # Algorithm
//!
//! 1. **Partition**: for multiplexed corpora, keep the text before the
//!    sentinel ([`Partition::First`]) or from the sentinel onward
//!    ([`Partition::Second`]). A missing sentinel keeps the whole corpus.
//! 2. **Overview**: the reserved topic [`OVERVIEW_TOPIC`] returns the
//!    working text unfiltered.
//! 3. **Sections**: keep every section whose lower-cased text contains the
//!    lower-cased topic, in source order.
//! 4. **Paragraphs**: if no section matched, keep every matching paragraph
//!    under a synthesized `# Search results for "<topic>"` header.
//! 5. **Fallback**: if nothing matched, return the full working text.
//! 6. **Truncate**: cut the selection to `max_chars` characters and append
//!    the notice when it was longer.
//!
//! Matching is a binary substring test. There is no scoring or reordering.

use std::borrow::Cow;

use crate::models::{
    Excerpt, Partition, PartitionSelection, Selection, DEFAULT_MAX_CHARS, OVERVIEW_TOPIC,
};
use crate::section::{paragraphs, sections};

/// Output ceiling and the notice appended when it is hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Maximum number of characters kept from the selection.
    pub max_chars: usize,
    /// Appended after the cut body when truncation happens.
    pub notice: String,
}

impl FilterOptions {
    /// Options whose notice points the reader at `location` for the full text.
    pub fn new(max_chars: usize, location: &str) -> Self {
        Self {
            max_chars,
            notice: truncation_notice(location),
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            notice: "\n\n... (content truncated)".to_string(),
        }
    }
}

/// The fixed notice naming where the untruncated content lives.
pub fn truncation_notice(location: &str) -> String {
    format!(
        "\n\n... (content truncated; see {} for the full documentation)",
        location
    )
}

/// Returns true when `topic` requests the unfiltered overview.
pub fn is_overview(topic: &str) -> bool {
    topic.trim().eq_ignore_ascii_case(OVERVIEW_TOPIC)
}

/// Restrict `corpus` to the selected partition.
///
/// Only the first occurrence of the sentinel counts. When the sentinel does
/// not occur, both partitions resolve to the whole corpus.
pub fn partition<'a>(corpus: &'a str, selection: Option<PartitionSelection<'_>>) -> &'a str {
    let Some(selection) = selection else {
        return corpus;
    };
    if selection.sentinel.is_empty() {
        return corpus;
    }
    match corpus.find(selection.sentinel) {
        Some(idx) => match selection.partition {
            Partition::First => &corpus[..idx],
            Partition::Second => &corpus[idx..],
        },
        None => corpus,
    }
}

/// Select the part of `corpus` most relevant to `topic`, bounded by `options`.
///
/// Never fails: a topic that matches nothing yields the full working text.
pub fn select(
    corpus: &str,
    selection: Option<PartitionSelection<'_>>,
    topic: &str,
    options: &FilterOptions,
) -> Excerpt {
    let working = partition(corpus, selection);
    let (text, how) = select_text(working, topic);
    truncate(&text, how, options)
}

fn select_text<'a>(working: &'a str, topic: &str) -> (Cow<'a, str>, Selection) {
    if is_overview(topic) {
        return (Cow::Borrowed(working), Selection::Overview);
    }

    let needle = topic.to_lowercase();
    let contains = |text: &str| text.to_lowercase().contains(&needle);

    // Each section text starts with its own "# " line, so a newline is the
    // only separator needed to restore the heading marker between them.
    let matched: Vec<&str> = sections(working)
        .into_iter()
        .filter(|s| contains(s.text))
        .map(|s| s.text)
        .collect();
    if !matched.is_empty() {
        return (Cow::Owned(matched.join("\n")), Selection::Sections);
    }

    let matched: Vec<&str> = paragraphs(working)
        .into_iter()
        .filter(|p| contains(p))
        .collect();
    if !matched.is_empty() {
        let text = format!(
            "# Search results for \"{}\"\n\n{}",
            topic,
            matched.join("\n\n")
        );
        return (Cow::Owned(text), Selection::Paragraphs);
    }

    (Cow::Borrowed(working), Selection::Unfiltered)
}

/// Cut `text` to at most `options.max_chars` characters.
///
/// The cut is a hard character boundary, never a byte split inside a code
/// point. The notice is attached only when something was removed.
pub fn truncate(text: &str, selection: Selection, options: &FilterOptions) -> Excerpt {
    match text.char_indices().nth(options.max_chars) {
        Some((cut, _)) => Excerpt {
            body: text[..cut].to_string(),
            truncated: true,
            notice: Some(options.notice.clone()),
            selection,
        },
        None => Excerpt {
            body: text.to_string(),
            truncated: false,
            notice: None,
            selection,
        },
    }
}
