/**
 * MIT License
 *
 * m3umerge - Copyright (c) 2024 m3umerge contributors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */
mod overlay;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::dedup::DedupKey;
use crate::filter::{FilterRule, FilterSet};
use crate::rewrite::{FieldRewrite, RewriteError, RewriteStage};

pub use overlay::SettingsOverlay;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_OUTPUT: &str = "output_blocks/filtered_playlist.m3u";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// What to do when a source cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OnFetchError {
    /// Log it and continue without that source's entries
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

/// One configured playlist source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Url or local path
    pub location: String,
    /// Replaces the global filter for this source only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterRule>,
}

impl SourceSpec {
    pub fn new<S: Into<String>>(location: S) -> Self {
        Self {
            location: location.into(),
            filter: None,
        }
    }
}

/// Attribute rewrite as written in the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSpec {
    pub attribute: String,
    pub value: String,
}

impl RewriteSpec {
    pub fn compile(&self) -> Result<FieldRewrite, RewriteError> {
        FieldRewrite::new(&self.attribute, &self.value)
    }
}

impl std::str::FromStr for RewriteSpec {
    type Err = anyhow::Error;

    /// Parse `ATTR=VALUE`
    fn from_str(s: &str) -> Result<Self> {
        let (attribute, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected ATTR=VALUE, got \"{s}\""))?;
        let attribute = attribute.trim();
        if attribute.is_empty() {
            bail!("empty attribute name in \"{s}\"");
        }

        Ok(Self {
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
    }
}

/// Everything a run needs, immutable once the pipeline starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Include needles for the display name
    pub include: Vec<String>,
    /// Exclude needles for the display name, they win over `include`
    pub exclude: Vec<String>,
    /// Required `group-title` labels, any of them
    pub groups: BTreeSet<String>,
    pub dedup_key: DedupKey,
    pub on_fetch_error: OnFetchError,
    pub rewrite_stage: RewriteStage,
    pub output: PathBuf,
    /// Read after all sources; silently skipped if it does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_file: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteSpec>,
    pub sources: Vec<SourceSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            groups: BTreeSet::new(),
            dedup_key: DedupKey::default(),
            on_fetch_error: OnFetchError::default(),
            rewrite_stage: RewriteStage::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            local_file: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            rewrite: None,
            sources: Vec::new(),
        }
    }
}

impl Settings {
    /// Read a config file, needs to be toml formatted
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data: Self = Figment::new().merge(Toml::file(path)).extract()?;

        Ok(data)
    }

    /// Load `explicit` if given, otherwise the default config file if it exists, otherwise the defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file \"{}\" does not exist", path.display());
            }
            return Self::from_file(path)
                .with_context(|| format!("parsing config \"{}\"", path.display()));
        }

        let path = get_app_config_path()?.join(CONFIG_FILE_NAME);
        if path.exists() {
            info!("Loading config from \"{}\"", path.display());
            return Self::from_file(&path)
                .with_context(|| format!("parsing config \"{}\"", path.display()));
        }

        Ok(Self::default())
    }

    /// Save as toml, for showing the effective settings or as a starting point for a config file
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// `true` if there is nothing at all to read from, a missing local file does not count
    pub fn has_no_sources(&self) -> bool {
        self.sources.is_empty()
            && !self
                .local_file
                .as_deref()
                .is_some_and(Path::exists)
    }

    /// The filter used for sources without their own
    pub fn global_filter(&self) -> FilterSet {
        FilterSet::from_parts(&self.include, &self.exclude, &self.groups)
    }

    /// The filter for `source`: its own rule if it has one, otherwise the global filter
    pub fn filter_for(&self, source: &SourceSpec) -> FilterSet {
        match &source.filter {
            Some(rule) => FilterSet::from(rule.clone()),
            None => self.global_filter(),
        }
    }
}

/// Directory holding the config file, `<config dir>/m3umerge`
pub fn get_app_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow!("failed to find os config dir."))?;
    path.push("m3umerge");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
include = ["Zee Marathi", "Star Plus"]
exclude = ["USA"]
groups = ["Marathi"]
dedup_key = "name"
on_fetch_error = "abort"
rewrite_stage = "after_dedup"
output = "out/merged.m3u"
local_file = "local.m3u"
fetch_timeout_secs = 5

[rewrite]
attribute = "group-title"
value = "General"

[[sources]]
location = "https://example.org/one.m3u"

[[sources]]
location = "https://example.org/sports.m3u"
filter = { type = "group", labels = ["AI SPORTS", "EXTRAS"] }
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.include, vec!["Zee Marathi", "Star Plus"]);
        assert_eq!(settings.dedup_key, DedupKey::Name);
        assert_eq!(settings.on_fetch_error, OnFetchError::Abort);
        assert_eq!(settings.rewrite_stage, RewriteStage::AfterDedup);
        assert_eq!(settings.output, PathBuf::from("out/merged.m3u"));
        assert_eq!(settings.fetch_timeout_secs, 5);
        assert_eq!(
            settings.rewrite,
            Some(RewriteSpec {
                attribute: "group-title".to_string(),
                value: "General".to_string()
            })
        );
        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.filter_for(&settings.sources[0]).rules().len(), 2);
        assert!(matches!(
            settings.filter_for(&settings.sources[1]).rules(),
            [FilterRule::IncludeByGroup { .. }]
        ));
    }

    #[test]
    fn empty_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.has_no_sources());
        assert_eq!(settings.global_filter().rules(), &[FilterRule::IncludeAll]);
    }

    #[test]
    fn local_file_counts_only_if_it_exists() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local.m3u");
        let settings = Settings {
            local_file: Some(local.clone()),
            ..Default::default()
        };
        assert!(settings.has_no_sources());

        std::fs::write(&local, "#EXTINF:-1,A\nhttp://a/1\n").unwrap();
        assert!(!settings.has_no_sources());
    }

    #[test]
    fn missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut settings = Settings::default();
        settings.sources.push(SourceSpec::new("http://a/list.m3u"));
        settings.sources.push(SourceSpec {
            location: "http://b/list.m3u".to_string(),
            filter: Some(FilterRule::IncludeByNameSubstring {
                needle: "STAR SPORTS".to_string(),
            }),
        });
        settings.rewrite = Some("group-title=General".parse().unwrap());

        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn should_parse_rewrite_spec() {
        let spec: RewriteSpec = "group-title=Sports = Live".parse().unwrap();
        assert_eq!(spec.attribute, "group-title");
        assert_eq!(spec.value, "Sports = Live");
        assert!("group-title".parse::<RewriteSpec>().is_err());
        assert!("=x".parse::<RewriteSpec>().is_err());
    }
}
