//! Lexical scanning of corpus text into sections and paragraphs.
//!
//! A **section** starts at a line beginning with `"# "` (a single heading
//! marker followed by a space) and runs until the next such line or the end
//! of the text. Deeper headings (`"## "`, `"### "`) stay inside the enclosing
//! section. Text before the first heading belongs to no section; it is only
//! reachable through paragraph scanning.
//!
//! A **paragraph** is a maximal run of non-blank lines. Lines containing only
//! whitespace separate paragraphs. Headings do not: a heading line with no
//! blank line before it belongs to the preceding paragraph.
//!
//! Both scanners are single linear passes and return borrowed slices of the
//! input in source order.

/// Marker that opens a section heading line.
pub const HEADING_MARKER: &str = "# ";

/// A heading-delimited span of corpus text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading title without the marker.
    pub heading: &'a str,
    /// The full span, heading line included, with trailing whitespace removed.
    pub text: &'a str,
}

/// Returns true when `line` opens a new section.
pub fn is_heading(line: &str) -> bool {
    line.starts_with(HEADING_MARKER)
}

/// Split `text` into sections in source order.
///
/// Text before the first heading is skipped.
///
/// # Example
///
/// ```rust
/// use docs_mcp_core::section::sections;
///
/// let parsed = sections("# Intro\nHello\n# Routing\nUse the router.");
/// assert_eq!(parsed.len(), 2);
/// assert_eq!(parsed[1].heading, "Routing");
/// assert_eq!(parsed[1].text, "# Routing\nUse the router.");
/// ```
pub fn sections(text: &str) -> Vec<Section<'_>> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if is_heading(line) {
            starts.push(offset);
        }
        offset += line.len();
    }

    let mut out = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let span = text[start..end].trim_end();
        let heading = span
            .lines()
            .next()
            .and_then(|line| line.strip_prefix(HEADING_MARKER))
            .map(str::trim)
            .unwrap_or_default();
        out.push(Section {
            heading,
            text: span,
        });
    }

    out
}

/// Split `text` into blank-line-delimited paragraphs in source order.
///
/// Each paragraph keeps its internal newlines; the line terminator of its
/// last line is not included.
pub fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                out.push(&text[s..end]);
            }
        } else {
            if start.is_none() {
                start = Some(offset);
            }
            end = offset + line.trim_end_matches(&['\n', '\r'][..]).len();
        }
        offset += line.len();
    }

    if let Some(s) = start {
        out.push(&text[s..end]);
    }

    out
}
