//! Keyword and verification filtering.
//!
//! Filtering is pure: the same articles and selection always give the same
//! output, in input order. Region and topic names that are not in their
//! keyword table let every article through.

mod keywords;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Article;

pub use keywords::KeywordTable;

/// Selection value that disables an axis.
pub const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Verification {
    #[default]
    All,
    Verified,
    Fake,
}

impl Verification {
    pub fn next(self) -> Self {
        match self {
            Verification::All => Verification::Verified,
            Verification::Verified => Verification::Fake,
            Verification::Fake => Verification::All,
        }
    }

    fn admits(self, article: &Article) -> bool {
        match self {
            Verification::All => true,
            Verification::Verified => article.prediction,
            Verification::Fake => !article.prediction,
        }
    }
}

/// Unknown values mean no verification filter.
impl FromStr for Verification {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "verified" | "real" => Verification::Verified,
            "fake" => Verification::Fake,
            _ => Verification::All,
        })
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verification::All => "All",
            Verification::Verified => "Verified",
            Verification::Fake => "Fake",
        };
        f.write_str(label)
    }
}

/// The three independent filter axes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSelection {
    pub region: String,
    pub topic: String,
    pub verification: Verification,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            region: ALL.to_string(),
            topic: ALL.to_string(),
            verification: Verification::All,
        }
    }
}

impl FilterSelection {
    pub fn new(region: &str, topic: &str, verification: Verification) -> Self {
        Self {
            region: region.trim().to_string(),
            topic: topic.trim().to_string(),
            verification,
        }
    }

    pub fn region(region: &str) -> Self {
        Self::new(region, ALL, Verification::All)
    }

    pub fn topic(topic: &str) -> Self {
        Self::new(ALL, topic, Verification::All)
    }

    pub fn verification(verification: Verification) -> Self {
        Self::new(ALL, ALL, verification)
    }

    pub fn is_unfiltered(&self) -> bool {
        is_all(&self.region) && is_all(&self.topic) && self.verification == Verification::All
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region={} topic={} verification={}",
            self.region, self.topic, self.verification
        )
    }
}

fn is_all(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

#[derive(Debug, Clone)]
pub struct FilterEngine {
    regions: KeywordTable,
    topics: KeywordTable,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(KeywordTable::regions(), KeywordTable::topics())
    }
}

impl FilterEngine {
    pub fn new(regions: KeywordTable, topics: KeywordTable) -> Self {
        Self { regions, topics }
    }

    /// Built-in tables extended by configured keyword sets.
    pub fn with_overrides(
        regions: &BTreeMap<String, Vec<String>>,
        topics: &BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self::new(
            KeywordTable::regions().with_overrides(regions),
            KeywordTable::topics().with_overrides(topics),
        )
    }

    pub fn regions(&self) -> &KeywordTable {
        &self.regions
    }

    pub fn topics(&self) -> &KeywordTable {
        &self.topics
    }

    pub fn apply(&self, articles: &[Article], selection: &FilterSelection) -> Vec<Article> {
        if selection.is_unfiltered() {
            return articles.to_vec();
        }

        articles
            .iter()
            .filter(|article| self.matches(article, selection))
            .cloned()
            .collect()
    }

    pub fn matches(&self, article: &Article, selection: &FilterSelection) -> bool {
        self.matches_region(article, &selection.region)
            && self.matches_topic(article, &selection.topic)
            && selection.verification.admits(article)
    }

    fn matches_region(&self, article: &Article, region: &str) -> bool {
        if is_all(region) {
            return true;
        }
        match self.regions.get(region) {
            Some(keywords) => {
                contains_any(&article.title, keywords)
                    || article
                        .section_name
                        .as_deref()
                        .is_some_and(|s| contains_any(s, keywords))
            }
            // Unrecognized selections do not filter.
            None => true,
        }
    }

    fn matches_topic(&self, article: &Article, topic: &str) -> bool {
        if is_all(topic) {
            return true;
        }
        match self.topics.get(topic) {
            Some(keywords) => {
                contains_any(&article.title, keywords)
                    || article
                        .section_name
                        .as_deref()
                        .is_some_and(|s| contains_any(s, keywords))
                    || contains_any(&article.news_category, keywords)
            }
            None => true,
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, title: &str, section: &str, prediction: bool) -> Article {
        let mut a = Article::new(id, title);
        a.section_name = Some(section.to_string());
        a.prediction = prediction;
        a
    }

    fn sample() -> Vec<Article> {
        vec![
            article(1, "India win the Test match in Mumbai", "Sport", true),
            article(2, "Parliament debates new budget", "Politics", true),
            article(3, "Wimbledon final goes to five sets", "Sport", false),
            article(4, "London markets close higher", "Business", true),
            article(5, "Mumbai election results", "World news", false),
            article(6, "Sydney hosts rugby sevens", "Sport", true),
            article(7, "Delhi tech startups raise record funds", "Technology", false),
            article(8, "Premier League title race", "Football", true),
            article(9, "New film festival opens", "Culture", false),
            article(10, "Kenya marathon record", "Sport", true),
        ]
    }

    fn ids(articles: &[Article]) -> Vec<i64> {
        articles.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_fake_keeps_only_unverified_in_order() {
        let engine = FilterEngine::default();
        let out = engine.apply(&sample(), &FilterSelection::verification(Verification::Fake));
        assert_eq!(ids(&out), vec![3, 5, 7, 9]);
    }

    #[test]
    fn test_verified_keeps_predicted_real() {
        let engine = FilterEngine::default();
        let out = engine.apply(
            &sample(),
            &FilterSelection::verification(Verification::Verified),
        );
        assert_eq!(ids(&out), vec![1, 2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_region_matches_title_case_insensitively() {
        let engine = FilterEngine::default();
        let out = engine.apply(&sample(), &FilterSelection::region("india"));
        assert_eq!(ids(&out), vec![1, 5, 7]);
    }

    #[test]
    fn test_region_ignores_category_but_topic_uses_it() {
        let engine = FilterEngine::default();
        let mut a = article(1, "Quarterly results", "Money", true);
        a.news_category = "Business".to_string();

        assert!(engine.apply(&[a.clone()], &FilterSelection::region("UK")).is_empty());
        assert_eq!(engine.apply(&[a], &FilterSelection::topic("Business")).len(), 1);
    }

    #[test]
    fn test_topic_matches_section_name() {
        let engine = FilterEngine::default();
        let out = engine.apply(&sample(), &FilterSelection::topic("Football"));
        assert_eq!(ids(&out), vec![8]);
    }

    #[test]
    fn test_unknown_selection_is_fail_open() {
        let engine = FilterEngine::default();
        let articles = sample();
        assert_eq!(
            engine.apply(&articles, &FilterSelection::region("Atlantis")).len(),
            articles.len()
        );
        assert_eq!(
            engine.apply(&articles, &FilterSelection::topic("Curling")).len(),
            articles.len()
        );
        assert_eq!("maybe".parse::<Verification>().unwrap(), Verification::All);
    }

    #[test]
    fn test_all_is_identity() {
        let engine = FilterEngine::default();
        let articles = sample();
        assert_eq!(
            ids(&engine.apply(&articles, &FilterSelection::default())),
            ids(&articles)
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let engine = FilterEngine::default();
        let selection = FilterSelection::new("India", "All", Verification::Fake);
        let once = engine.apply(&sample(), &selection);
        let twice = engine.apply(&once, &selection);
        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(ids(&once), vec![5, 7]);
    }

    #[test]
    fn test_axes_compose_in_any_order() {
        let engine = FilterEngine::default();
        let region = FilterSelection::region("India");
        let topic = FilterSelection::topic("Politics");
        let fake = FilterSelection::verification(Verification::Fake);

        let a = engine.apply(&engine.apply(&engine.apply(&sample(), &region), &topic), &fake);
        let b = engine.apply(&engine.apply(&engine.apply(&sample(), &fake), &topic), &region);
        let combined = engine.apply(
            &sample(),
            &FilterSelection::new("India", "Politics", Verification::Fake),
        );

        assert_eq!(ids(&a), ids(&b));
        assert_eq!(ids(&a), ids(&combined));
        assert_eq!(ids(&combined), vec![5]);
    }

    #[test]
    fn test_configured_keywords_extend_tables() {
        let mut regions = BTreeMap::new();
        regions.insert("Kenya".to_string(), vec!["kenya".to_string(), "nairobi".to_string()]);
        let engine = FilterEngine::with_overrides(&regions, &BTreeMap::new());

        let out = engine.apply(&sample(), &FilterSelection::region("Kenya"));
        assert_eq!(ids(&out), vec![10]);
    }

    #[test]
    fn test_verification_cycle_and_parse() {
        assert_eq!(Verification::All.next(), Verification::Verified);
        assert_eq!(Verification::Fake.next(), Verification::All);
        assert_eq!("FAKE".parse::<Verification>().unwrap(), Verification::Fake);
        assert_eq!(" Verified ".parse::<Verification>().unwrap(), Verification::Verified);
    }
}
