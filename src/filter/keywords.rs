use std::collections::BTreeMap;

use tracing::warn;

const DEFAULT_REGIONS: &[(&str, &[&str])] = &[
    ("India", &["india", "delhi", "mumbai", "bengaluru", "kolkata"]),
    (
        "UK",
        &["united kingdom", "britain", "british", "england", "london", "scotland", "wales"],
    ),
    (
        "US",
        &["united states", "america", "washington", "new york", "california", "white house"],
    ),
    ("Europe", &["europe", "brussels", "france", "germany", "italy", "spain"]),
    ("Asia", &["asia", "china", "japan", "korea", "singapore", "indonesia"]),
    ("Africa", &["africa", "nigeria", "kenya", "egypt", "ethiopia"]),
    ("Australia", &["australia", "sydney", "melbourne", "canberra"]),
];

const DEFAULT_TOPICS: &[(&str, &[&str])] = &[
    ("Football", &["football", "premier league", "champions league", "soccer", "fifa"]),
    ("Cricket", &["cricket", "test match", "ashes", "wicket"]),
    ("Rugby", &["rugby", "six nations"]),
    ("Tennis", &["tennis", "wimbledon", "grand slam"]),
    ("Golf", &["golf", "pga", "ryder cup"]),
    ("Cycling", &["cycling", "cyclist", "tour de france"]),
    ("Politics", &["politics", "election", "parliament", "government", "minister"]),
    ("Business", &["business", "economy", "market", "finance"]),
    ("Technology", &["technology", "tech", "software", "internet", "cyber"]),
    ("Science", &["science", "research", "scientist", "space"]),
    ("Culture", &["culture", "film", "music", "books", "theatre"]),
];

/// Named keyword sets for one filter axis, in display order.
///
/// Keywords are stored lowercased; names keep their display casing and are
/// looked up case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    fn from_static(table: &[(&str, &[&str])]) -> Self {
        Self {
            entries: table
                .iter()
                .map(|(name, keywords)| {
                    (
                        name.to_string(),
                        keywords.iter().map(|k| k.to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn regions() -> Self {
        Self::from_static(DEFAULT_REGIONS)
    }

    pub fn topics() -> Self {
        Self::from_static(DEFAULT_TOPICS)
    }

    /// Replace the keywords of existing names and append new names.
    /// Overrides without a usable keyword are ignored.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (name, keywords) in overrides {
            let keywords: Vec<String> = keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if keywords.is_empty() {
                warn!("Ignoring filter override {:?}: no keywords", name);
                continue;
            }

            match self
                .entries
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            {
                Some((_, existing)) => *existing = keywords,
                None => self.entries.push((name.clone(), keywords)),
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, keywords)| keywords.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// The name after `current`, cycling back through "All". An unknown
    /// current value also goes back to "All".
    pub fn next_after(&self, current: &str) -> String {
        let next = if current.eq_ignore_ascii_case(super::ALL) {
            self.entries.first()
        } else {
            self.entries
                .iter()
                .position(|(name, _)| name.eq_ignore_ascii_case(current))
                .and_then(|i| self.entries.get(i + 1))
        };

        next.map(|(name, _)| name.clone())
            .unwrap_or_else(|| super::ALL.to_string())
    }
}
