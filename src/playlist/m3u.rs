//! Split raw M3U text into `#EXTINF` blocks

/// Header line every written playlist starts with
pub const HEADER: &str = "#EXTM3U";

/// Prefix of the metadata line that opens a new entry
pub const MARKER: &str = "#EXTINF";

/// One `#EXTINF` line together with the lines that follow it, up to the next marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub metadata: &'a str,
    pub body: Vec<&'a str>,
}

/// Trim every line and drop the blank ones. Order is kept as-is.
pub fn normalize(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Group normalized lines into blocks, each starting at a [`MARKER`] line.
///
/// Anything before the first marker (like the [`HEADER`]) does not belong to an entry and is discarded.
/// The last block is closed at the end of input.
pub fn split_blocks<'a>(lines: &[&'a str]) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'a>> = None;

    for &line in lines {
        if line.starts_with(MARKER) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(Block {
                metadata: line,
                body: Vec::new(),
            });
        } else if let Some(block) = current.as_mut() {
            block.body.push(line);
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}
