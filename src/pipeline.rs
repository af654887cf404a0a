//! One run: fetch every source, filter, rewrite, de-duplicate and write the merged playlist.
//!
//! Sources are handled one at a time in configured order, followed by the optional local file.
use std::path::PathBuf;

use crate::config::{OnFetchError, Settings};
use crate::dedup::dedup_with_stats;
use crate::emit::{self, OutputWriteError};
use crate::fetch::{Fetch, FetchError, Source};
use crate::filter::{FilterSet, Verdict};
use crate::playlist::{self, Entry};
use crate::rewrite::{FieldRewrite, RewriteError, RewriteStage};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No playlist sources given")]
    NoSources,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    #[error(transparent)]
    Output(#[from] OutputWriteError),
}

/// Counters of one run, all informational
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Sources that were fetched and decoded
    pub sources_read: usize,
    /// Sources whose fetch failed and were skipped
    pub sources_skipped: usize,
    /// Entries decoded over all sources
    pub entries_read: usize,
    /// Entries with a missing name or locator, still subject to the normal rules
    pub malformed: usize,
    pub filtered_out: usize,
    /// Dropped before locator based dedup because they have no locator
    pub missing_locator: usize,
    pub duplicates: usize,
    pub written: usize,
    pub output: Option<PathBuf>,
}

/// Run everything except writing the result. Returns the surviving entries in output order.
pub fn merge<F: Fetch + ?Sized>(
    settings: &Settings,
    fetcher: &F,
) -> Result<(Vec<Entry>, Report), PipelineError> {
    if settings.has_no_sources() {
        return Err(PipelineError::NoSources);
    }

    // compile first, so a bad rewrite fails before any fetch
    let rewrite = settings
        .rewrite
        .as_ref()
        .map(crate::config::RewriteSpec::compile)
        .transpose()?;

    let mut report = Report::default();
    let mut survivors = Vec::new();

    let mut plan: Vec<(Source, FilterSet)> = settings
        .sources
        .iter()
        .map(|spec| (Source::parse(&spec.location), settings.filter_for(spec)))
        .collect();
    if let Some(local_file) = &settings.local_file {
        if local_file.exists() {
            plan.push((Source::File(local_file.clone()), settings.global_filter()));
        } else {
            info!(
                "Local playlist \"{}\" does not exist, skipping",
                local_file.display()
            );
        }
    }

    for (source_index, (source, filter)) in plan.iter().enumerate() {
        info!("Fetching playlist from: {source}");
        let content = match fetcher.fetch(source) {
            Ok(v) => v,
            Err(err) => {
                if err.is_fatal() || settings.on_fetch_error == OnFetchError::Abort {
                    return Err(err.into());
                }
                warn!("{err}, skipping this source");
                report.sources_skipped += 1;
                continue;
            }
        };
        report.sources_read += 1;

        let entries = playlist::decode(&content, source_index);
        info!("Read {} entries from {source}", entries.len());
        report.entries_read += entries.len();

        for entry in entries {
            if let Err(err) = entry.check() {
                debug!("{err}");
                report.malformed += 1;
            }

            match filter.evaluate(&entry) {
                Verdict::Keep => survivors.push(entry),
                Verdict::Excluded(needle) => {
                    info!(
                        "Excluded unwanted channel: {} (matched \"{needle}\")",
                        entry.display_name()
                    );
                    report.filtered_out += 1;
                }
                Verdict::NotIncluded => report.filtered_out += 1,
            }
        }
    }

    if settings.rewrite_stage == RewriteStage::BeforeDedup {
        apply_rewrite(rewrite.as_ref(), &mut survivors);
    }

    let (mut kept, stats) = dedup_with_stats(survivors, settings.dedup_key);
    report.duplicates = stats.duplicates;
    report.missing_locator = stats.missing_key;

    if settings.rewrite_stage == RewriteStage::AfterDedup {
        apply_rewrite(rewrite.as_ref(), &mut kept);
    }

    report.written = kept.len();
    Ok((kept, report))
}

fn apply_rewrite(rewrite: Option<&FieldRewrite>, entries: &mut [Entry]) {
    let Some(rewrite) = rewrite else {
        return;
    };

    let changed = entries
        .iter_mut()
        .map(|entry| rewrite.apply(entry))
        .filter(|changed| *changed)
        .count();
    debug!(
        "Rewrote {}=\"{}\" on {changed} of {} entries",
        rewrite.attribute(),
        rewrite.value(),
        entries.len()
    );
}

/// Merge and write the result to the configured output
pub fn run<F: Fetch + ?Sized>(settings: &Settings, fetcher: &F) -> Result<Report, PipelineError> {
    let (entries, mut report) = merge(settings, fetcher)?;

    emit::write_atomic(&settings.output, &emit::render(&entries))?;
    report.output = Some(settings.output.clone());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSpec;
    use crate::fetch::FetchErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Serves fixed text per location, everything else is a 404
    struct StaticFetcher(HashMap<String, String>);

    impl Fetch for StaticFetcher {
        fn fetch(&self, source: &Source) -> Result<String, FetchError> {
            self.0
                .get(&source.to_string())
                .cloned()
                .ok_or_else(|| FetchError::new(source, FetchErrorKind::Status(404)))
        }
    }

    fn settings_for(locations: &[&str]) -> Settings {
        Settings {
            sources: locations.iter().copied().map(SourceSpec::new).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn no_sources() {
        let fetcher = StaticFetcher(HashMap::new());
        assert!(matches!(
            merge(&Settings::default(), &fetcher),
            Err(PipelineError::NoSources)
        ));

        // a local file that does not exist is nothing to read from
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            local_file: Some(dir.path().join("local.m3u")),
            ..Default::default()
        };
        assert!(matches!(
            merge(&settings, &fetcher),
            Err(PipelineError::NoSources)
        ));
    }

    #[test]
    fn skip_and_abort() {
        let fetcher = StaticFetcher(
            [(
                "http://ok/list".to_string(),
                "#EXTINF:-1,A\nhttp://a/1".to_string(),
            )]
            .into_iter()
            .collect(),
        );
        let mut settings = settings_for(&["http://missing/list", "http://ok/list"]);

        let (entries, report) = merge(&settings, &fetcher).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(report.sources_skipped, 1);
        assert_eq!(report.sources_read, 1);
        // index follows configured order, skipped sources included
        assert_eq!(entries[0].source_index(), 1);

        settings.on_fetch_error = OnFetchError::Abort;
        assert!(matches!(
            merge(&settings, &fetcher),
            Err(PipelineError::Fetch(_))
        ));
    }

    #[test]
    fn bad_rewrite_fails_early() {
        let fetcher = StaticFetcher(HashMap::new());
        let mut settings = settings_for(&["http://a"]);
        settings.rewrite = Some("bad attr=x".parse().unwrap());

        assert!(matches!(
            merge(&settings, &fetcher),
            Err(PipelineError::Rewrite(_))
        ));
    }
}
