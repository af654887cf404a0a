use std::path::PathBuf;

use super::{OnFetchError, RewriteSpec, Settings, SourceSpec};
use crate::dedup::DedupKey;

/// The loaded Settings, with possible overwrites (like from CLI)
///
/// Overwrites are never saved back to a config file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SettingsOverlay {
    /// The loaded Settings
    pub settings: Settings,

    /// Replace the configured sources, if not empty
    pub sources: Vec<String>,
    /// Replace the configured include needles, if not empty
    pub include: Vec<String>,
    /// Replace the configured exclude needles, if not empty
    pub exclude: Vec<String>,
    /// Replace the configured group labels, if not empty
    pub groups: Vec<String>,
    pub output: Option<PathBuf>,
    pub local_file: Option<PathBuf>,
    pub dedup_key: Option<DedupKey>,
    pub on_fetch_error: Option<OnFetchError>,
    pub rewrite: Option<RewriteSpec>,
}

impl SettingsOverlay {
    /// Apply all overwrites and get the Settings a run should use
    #[must_use]
    pub fn into_settings(self) -> Settings {
        let mut settings = self.settings;

        if !self.sources.is_empty() {
            settings.sources = self.sources.into_iter().map(SourceSpec::new).collect();
        }
        if !self.include.is_empty() {
            settings.include = self.include;
        }
        if !self.exclude.is_empty() {
            settings.exclude = self.exclude;
        }
        if !self.groups.is_empty() {
            settings.groups = self.groups.into_iter().collect();
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(local_file) = self.local_file {
            settings.local_file = Some(local_file);
        }
        if let Some(key) = self.dedup_key {
            settings.dedup_key = key;
        }
        if let Some(policy) = self.on_fetch_error {
            settings.on_fetch_error = policy;
        }
        if let Some(rewrite) = self.rewrite {
            settings.rewrite = Some(rewrite);
        }

        settings.output = expand_path(&settings.output);
        settings.local_file = settings.local_file.as_deref().map(expand_path);

        settings
    }
}

fn expand_path(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}
