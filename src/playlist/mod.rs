//! Playlist entries and how they are decoded from M3U text.
//!
//! Decoding is a single linear pass: the text is normalized into meaningful lines, the lines are grouped into
//! `#EXTINF` blocks and each block becomes an [`Entry`] with its display name and resource locator extracted.

pub mod m3u;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for lines that look like a stream locator
    static ref RE_LOCATOR: Regex = Regex::new(r"(?i)^(?:https?|ftp)://").expect("Regex error");
}

/// Informational defects of an entry. These never abort anything, they only get logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEntryError {
    #[error("Entry has no display name: \"{0}\"")]
    MissingName(String),
    #[error("Entry \"{0}\" has no resource locator")]
    MissingLocator(String),
}

/// One playlist item: the `#EXTINF` line and everything up to the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    metadata_line: String,
    body_lines: Vec<String>,
    display_name: String,
    resource_locator: Option<String>,
    source_index: usize,
}

impl Entry {
    /// Create a entry from its lines.
    ///
    /// Returns [`None`] if `metadata_line` does not start with [`m3u::MARKER`].
    pub fn new<S: Into<String>>(
        metadata_line: S,
        body_lines: Vec<String>,
        source_index: usize,
    ) -> Option<Self> {
        let metadata_line = metadata_line.into();
        if !metadata_line.starts_with(m3u::MARKER) {
            return None;
        }

        let display_name = display_name(&metadata_line).to_string();
        let resource_locator =
            resource_locator(body_lines.iter().map(String::as_str)).map(ToString::to_string);

        Some(Self {
            metadata_line,
            body_lines,
            display_name,
            resource_locator,
            source_index,
        })
    }

    fn from_block(block: &m3u::Block<'_>, source_index: usize) -> Option<Self> {
        Self::new(
            block.metadata,
            block.body.iter().map(|line| (*line).to_string()).collect(),
            source_index,
        )
    }

    pub fn metadata_line(&self) -> &str {
        &self.metadata_line
    }

    pub fn body_lines(&self) -> &[String] {
        &self.body_lines
    }

    /// Trimmed text after the last comma of the metadata line, empty if there is no comma
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn resource_locator(&self) -> Option<&str> {
        self.resource_locator.as_deref()
    }

    /// Index of the source (in configured order) this entry was read from
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Replace the metadata line. Only the rewriter touches this, and it keeps the marker prefix intact.
    pub(crate) fn set_metadata_line(&mut self, line: String) {
        debug_assert!(line.starts_with(m3u::MARKER));
        self.metadata_line = line;
    }

    /// Report whether the fields filtering and dedup depend on could be extracted
    pub fn check(&self) -> Result<(), MalformedEntryError> {
        if self.display_name.is_empty() {
            return Err(MalformedEntryError::MissingName(self.metadata_line.clone()));
        }
        if self.resource_locator.is_none() {
            return Err(MalformedEntryError::MissingLocator(
                self.display_name.clone(),
            ));
        }

        Ok(())
    }

    /// All lines of this entry in output order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.metadata_line.as_str()).chain(self.body_lines.iter().map(String::as_str))
    }
}

/// Decode the text of one source into its entries, in order of appearance.
///
/// Empty or marker-less content simply yields no entries.
pub fn decode(content: &str, source_index: usize) -> Vec<Entry> {
    let lines = m3u::normalize(content);
    m3u::split_blocks(&lines)
        .iter()
        .filter_map(|block| Entry::from_block(block, source_index))
        .collect()
}

/// Text after the last comma, trimmed. A line without a comma has no name.
pub fn display_name(metadata_line: &str) -> &str {
    metadata_line
        .rsplit_once(',')
        .map_or("", |(_, name)| name.trim())
}

/// Characters of a attribute name, `tvg-id`, `group-title`, ...
pub fn is_attribute_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Values of every quoted `attribute="..."` on `line`, in order.
///
/// `attribute` has to start at a name boundary, so `group-title` does not match inside `tvg-group-title`.
pub fn attribute_values<'a>(
    line: &'a str,
    attribute: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    line.match_indices(attribute).filter_map(move |(start, _)| {
        if line[..start].chars().next_back().is_some_and(is_attribute_char) {
            return None;
        }
        let value = line[start + attribute.len()..].strip_prefix("=\"")?;
        value.split_once('"').map(|(value, _)| value)
    })
}

/// The first line starting with `http://`, `https://` or `ftp://` (any case)
pub fn resource_locator<'a, I>(body_lines: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    body_lines
        .into_iter()
        .find(|line| RE_LOCATOR.is_match(line))
}
