//! First-wins duplicate removal
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::playlist::Entry;

/// Which field decides that two entries are the same
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// Exact resource locator
    #[default]
    Locator,
    /// Display name, ignoring case
    Name,
}

impl DedupKey {
    /// The key of `entry`, [`None`] if the entry has no locator (or no name) to compare by
    pub fn key_of(self, entry: &Entry) -> Option<String> {
        match self {
            DedupKey::Locator => entry.resource_locator().map(ToString::to_string),
            DedupKey::Name => {
                let name = entry.display_name();
                (!name.is_empty()).then(|| name.to_lowercase())
            }
        }
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DedupKey::Locator => "locator",
                DedupKey::Name => "name",
            }
        )
    }
}

/// What happened to a entry offered to the [`Deduplicator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Kept,
    /// The key was already seen
    Duplicate,
    /// Locator based dedup, but the entry has no locator
    MissingKey,
    /// Name based dedup, but the entry has no name. Kept, it cannot collide with anything.
    Nameless,
}

/// Remembers seen keys for one run, across all sources
#[derive(Debug, Clone)]
pub struct Deduplicator {
    key: DedupKey,
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new(key: DedupKey) -> Self {
        Self {
            key,
            seen: HashSet::new(),
        }
    }

    pub fn key(&self) -> DedupKey {
        self.key
    }

    pub fn admit(&mut self, entry: &Entry) -> Admission {
        let Some(key) = self.key.key_of(entry) else {
            return match self.key {
                DedupKey::Locator => Admission::MissingKey,
                DedupKey::Name => Admission::Nameless,
            };
        };

        if self.seen.insert(key) {
            Admission::Kept
        } else {
            Admission::Duplicate
        }
    }
}

/// Counters of what [`dedup_with_stats`] dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupStats {
    pub duplicates: usize,
    pub missing_key: usize,
    /// Kept without comparing, name based dedup only
    pub nameless: usize,
}

/// Keep the first entry for every distinct key, preserving input order
pub fn dedup(entries: Vec<Entry>, key: DedupKey) -> Vec<Entry> {
    dedup_with_stats(entries, key).0
}

/// Like [`dedup`], but also count what was dropped
pub fn dedup_with_stats(entries: Vec<Entry>, key: DedupKey) -> (Vec<Entry>, DedupStats) {
    let mut seen = Deduplicator::new(key);
    let mut stats = DedupStats::default();

    let kept = entries
        .into_iter()
        .filter(|entry| match seen.admit(entry) {
            Admission::Kept => true,
            Admission::Nameless => {
                debug!(
                    "Keeping entry without a name: {}",
                    entry.resource_locator().unwrap_or_default()
                );
                stats.nameless += 1;
                true
            }
            Admission::Duplicate => {
                info!(
                    "Ignoring duplicate {key} for \"{}\": {}",
                    entry.display_name(),
                    entry.resource_locator().unwrap_or_default()
                );
                stats.duplicates += 1;
                false
            }
            Admission::MissingKey => {
                info!(
                    "Dropping \"{}\", it has no resource locator",
                    entry.display_name()
                );
                stats.missing_key += 1;
                false
            }
        })
        .collect();

    (kept, stats)
}
