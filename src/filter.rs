//! Decide which entries survive, by display name and by `group-title`
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::playlist::{attribute_values, Entry};

/// A single keep/drop rule.
///
/// Name rules match case-insensitive substrings of the display name, group rules match the exact,
/// case-sensitive value of any `group-title` attribute on the metadata line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FilterRule {
    /// Keep everything
    #[serde(rename = "all")]
    IncludeAll,
    #[serde(rename = "group")]
    IncludeByGroup { labels: BTreeSet<String> },
    #[serde(rename = "name")]
    IncludeByNameSubstring { needle: String },
    /// Keep names containing any `include` needle and none of the `exclude` needles.
    ///
    /// With an empty `include` list nothing is kept.
    #[serde(rename = "include_exclude")]
    IncludeExcludeByName {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

/// The outcome of a filter for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// No include rule matched
    NotIncluded,
    /// A exclude needle matched, regardless of any include match
    Excluded(String),
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        *self == Verdict::Keep
    }
}

impl FilterRule {
    pub fn evaluate(&self, entry: &Entry) -> Verdict {
        match self {
            FilterRule::IncludeAll => Verdict::Keep,
            FilterRule::IncludeByGroup { labels } => {
                let found = attribute_values(entry.metadata_line(), "group-title")
                    .any(|value| labels.contains(value));
                if found {
                    Verdict::Keep
                } else {
                    Verdict::NotIncluded
                }
            }
            FilterRule::IncludeByNameSubstring { needle } => {
                if contains_ignore_case(entry.display_name(), needle) {
                    Verdict::Keep
                } else {
                    Verdict::NotIncluded
                }
            }
            FilterRule::IncludeExcludeByName { include, exclude } => {
                // exclude is checked first, it always wins over a include match
                if let Some(bad) = excluded_by(entry, exclude) {
                    return Verdict::Excluded(bad.clone());
                }
                let name = entry.display_name().to_lowercase();
                if include
                    .iter()
                    .any(|needle| name.contains(&needle.to_lowercase()))
                {
                    Verdict::Keep
                } else {
                    Verdict::NotIncluded
                }
            }
        }
    }

    pub fn keeps(&self, entry: &Entry) -> bool {
        self.evaluate(entry).is_keep()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The first `exclude` needle contained in the display name
fn excluded_by<'a>(entry: &Entry, exclude: &'a [String]) -> Option<&'a String> {
    let name = entry.display_name().to_lowercase();
    exclude
        .iter()
        .find(|bad| name.contains(&bad.to_lowercase()))
}

/// A conjunction of rules, every rule has to keep a entry for it to survive.
///
/// Exclude needles without any include needle are kept apart from the rules and checked before them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    rules: Vec<FilterRule>,
    exclude: Vec<String>,
}

impl FilterSet {
    /// An empty set keeps everything
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self {
            rules,
            exclude: Vec::new(),
        }
    }

    /// Build the set from the global name lists and group labels
    pub fn from_parts(include: &[String], exclude: &[String], groups: &BTreeSet<String>) -> Self {
        let mut set = Self::new(Vec::new());
        if !groups.is_empty() {
            set.rules.push(FilterRule::IncludeByGroup {
                labels: groups.clone(),
            });
        }
        if include.is_empty() {
            set.exclude = exclude.to_vec();
        } else {
            set.rules.push(FilterRule::IncludeExcludeByName {
                include: include.to_vec(),
                exclude: exclude.to_vec(),
            });
        }
        if set.rules.is_empty() {
            set.rules.push(FilterRule::IncludeAll);
        }

        set
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Exclude needles checked on their own, without a include side
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// The first non-keep verdict, or [`Verdict::Keep`]
    pub fn evaluate(&self, entry: &Entry) -> Verdict {
        if let Some(bad) = excluded_by(entry, &self.exclude) {
            return Verdict::Excluded(bad.clone());
        }

        self.rules
            .iter()
            .map(|rule| rule.evaluate(entry))
            .find(|verdict| !verdict.is_keep())
            .unwrap_or(Verdict::Keep)
    }
}

impl From<FilterRule> for FilterSet {
    fn from(rule: FilterRule) -> Self {
        Self::new(vec![rule])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(metadata: &str) -> Entry {
        Entry::new(metadata, vec!["http://x/1".to_string()], 0).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn include_all() {
        assert!(FilterRule::IncludeAll.keeps(&entry("#EXTINF:-1")));
    }

    #[test]
    fn by_group() {
        let rule = FilterRule::IncludeByGroup {
            labels: ["AI SPORTS", "EXTRAS"].iter().map(ToString::to_string).collect(),
        };

        assert!(rule.keeps(&entry(r#"#EXTINF:-1 group-title="EXTRAS",Bonus"#)));
        // label is case-sensitive
        assert!(!rule.keeps(&entry(r#"#EXTINF:-1 group-title="extras",Bonus"#)));
        // attribute key is case-sensitive too
        assert!(!rule.keeps(&entry(r#"#EXTINF:-1 GROUP-TITLE="EXTRAS",Bonus"#)));
        // only a exact quoted match counts
        assert!(!rule.keeps(&entry(r#"#EXTINF:-1 group-title="AI SPORTS 2",X"#)));
        // a longer attribute name ending in "group-title" is something else
        assert!(!rule.keeps(&entry(r#"#EXTINF:-1 tvg-group-title="EXTRAS",Bonus"#)));
        assert!(rule.keeps(&entry(
            r#"#EXTINF:-1 tvg-group-title="Other" group-title="AI SPORTS",Match"#
        )));
        assert!(!rule.keeps(&entry("#EXTINF:-1,No Group")));
    }

    #[test]
    fn by_name_substring() {
        let rule = FilterRule::IncludeByNameSubstring {
            needle: "STAR SPORTS".to_string(),
        };
        assert!(rule.keeps(&entry("#EXTINF:-1,Star Sports 1 Hindi HD")));
        assert!(!rule.keeps(&entry("#EXTINF:-1,Sony Sports")));
        assert!(!rule.keeps(&entry(r#"#EXTINF:-1 tvg-name="Star Sports""#)));
    }

    #[test]
    fn exclude_takes_precedence() {
        let rule = FilterRule::IncludeExcludeByName {
            include: strings(&["Star Plus"]),
            exclude: strings(&["USA"]),
        };

        assert_eq!(rule.evaluate(&entry("#EXTINF:-1,star plus")), Verdict::Keep);
        assert_eq!(
            rule.evaluate(&entry("#EXTINF:-1,Star Plus HD usa")),
            Verdict::Excluded("USA".to_string())
        );
        assert_eq!(
            rule.evaluate(&entry("#EXTINF:-1,Colors")),
            Verdict::NotIncluded
        );
    }

    #[test]
    fn empty_include_keeps_nothing() {
        let rule = FilterRule::IncludeExcludeByName {
            include: Vec::new(),
            exclude: strings(&["Thrills"]),
        };
        assert_eq!(
            rule.evaluate(&entry("#EXTINF:-1,Anything")),
            Verdict::NotIncluded
        );
        assert_eq!(
            rule.evaluate(&entry("#EXTINF:-1,Sony Thrills")),
            Verdict::Excluded("Thrills".to_string())
        );
    }

    #[test]
    fn exclude_only_set() {
        let set = FilterSet::from_parts(&[], &strings(&["Thrills"]), &BTreeSet::new());
        assert_eq!(set.rules(), &[FilterRule::IncludeAll]);
        assert_eq!(set.exclude(), &strings(&["Thrills"]));

        assert!(set.evaluate(&entry("#EXTINF:-1,Anything")).is_keep());
        assert_eq!(
            set.evaluate(&entry("#EXTINF:-1,Sony THRILLS")),
            Verdict::Excluded("Thrills".to_string())
        );
    }

    #[test]
    fn set_is_conjunction() {
        let groups = ["Marathi".to_string()].into_iter().collect();
        let set = FilterSet::from_parts(&strings(&["Zee"]), &strings(&["Talkies"]), &groups);
        assert_eq!(set.rules().len(), 2);

        assert!(set
            .evaluate(&entry(r#"#EXTINF:-1 group-title="Marathi",Zee Marathi"#))
            .is_keep());
        assert_eq!(
            set.evaluate(&entry(r#"#EXTINF:-1 group-title="Hindi",Zee TV"#)),
            Verdict::NotIncluded
        );
        assert_eq!(
            set.evaluate(&entry(r#"#EXTINF:-1 group-title="Marathi",Zee Talkies"#)),
            Verdict::Excluded("Talkies".to_string())
        );
    }

    #[test]
    fn empty_parts_keep_all() {
        let set = FilterSet::from_parts(&[], &[], &BTreeSet::new());
        assert_eq!(set.rules(), &[FilterRule::IncludeAll]);
    }

    #[test]
    fn should_deserialize() {
        let rule: FilterRule = toml::from_str(
            r#"
type = "include_exclude"
include = ["Zee"]
"#,
        )
        .unwrap();
        assert_eq!(
            rule,
            FilterRule::IncludeExcludeByName {
                include: strings(&["Zee"]),
                exclude: Vec::new(),
            }
        );

        let rule: FilterRule = toml::from_str(
            r#"
type = "group"
labels = ["AI SPORTS"]
"#,
        )
        .unwrap();
        assert!(matches!(rule, FilterRule::IncludeByGroup { .. }));
    }
}
