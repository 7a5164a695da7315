use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Sentinel the API uses when an article has no image.
pub const NO_IMAGE: &str = "None";

/// Reliability tier of the publishing source, as assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceCredibility {
    High,
    Medium,
    Low,
    FactChecker,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SourceCredibility {
    /// Short badge text, `None` when the tier is not worth showing.
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            SourceCredibility::High => Some("H"),
            SourceCredibility::Medium => Some("M"),
            SourceCredibility::Low => Some("L"),
            SourceCredibility::FactChecker => Some("FC"),
            SourceCredibility::Unknown => None,
        }
    }
}

/// How an article should be labelled in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FactCheck,
    Verified,
    Flagged,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::FactCheck => "Fact-Check",
            Verdict::Verified => "Verified",
            Verdict::Flagged => "Flagged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub news_category: String,
    #[serde(default = "default_prediction")]
    pub prediction: bool,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default)]
    pub source_credibility: Option<SourceCredibility>,
    #[serde(default)]
    pub is_fact_check_article: bool,
    #[serde(default)]
    pub fact_check_verdict: Option<String>,
    #[serde(default)]
    pub source_domain: Option<String>,
}

fn default_prediction() -> bool {
    true
}

/// Publication dates come from several scrapers. Timestamps without an offset
/// are taken as UTC; anything unreadable becomes `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_date(&s),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => {
            debug!("Ignoring non-string publication date {}", other);
            None
        }
    })
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(midnight.and_utc());
    }
    debug!("Unreadable publication date {:?}", s);
    None
}

impl Article {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            publication_date: None,
            news_category: String::new(),
            prediction: true,
            section_id: None,
            section_name: None,
            kind: None,
            web_url: None,
            img_url: None,
            source_credibility: None,
            is_fact_check_article: false,
            fact_check_verdict: None,
            source_domain: None,
        }
    }

    /// Section label, falling back to "News" when the API sent none.
    pub fn section_label(&self) -> &str {
        match self.section_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "News",
        }
    }

    /// Image URL, treating the API's sentinel and empty strings as absent.
    pub fn image_url(&self) -> Option<&str> {
        match self.img_url.as_deref() {
            None | Some("") | Some(NO_IMAGE) => None,
            Some(url) => Some(url),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_fact_check_article {
            Verdict::FactCheck
        } else if self.prediction {
            Verdict::Verified
        } else {
            Verdict::Flagged
        }
    }

    pub fn credibility(&self) -> SourceCredibility {
        self.source_credibility.unwrap_or_default()
    }

    pub fn display_date(&self) -> String {
        self.publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_article() {
        let json = r#"{
            "id": 42,
            "title": "Storm hits coast",
            "publication_date": "2024-03-01T10:00:00Z",
            "news_category": "News",
            "prediction": false,
            "section_id": "world",
            "section_name": "World news",
            "type": "article",
            "web_url": "https://www.theguardian.com/world/1",
            "img_url": "https://i.guim.co.uk/1.jpg",
            "source_credibility": "HIGH",
            "is_fact_check_article": false,
            "fact_check_verdict": null,
            "source_domain": "theguardian.com"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, 42);
        assert_eq!(article.kind.as_deref(), Some("article"));
        assert_eq!(article.credibility(), SourceCredibility::High);
        assert!(!article.prediction);
        assert_eq!(article.display_date(), "2024-03-01");
    }

    #[test]
    fn test_decode_minimal_article_uses_defaults() {
        let article: Article = serde_json::from_str(r#"{"id": 1, "title": "t"}"#).unwrap();
        assert!(article.prediction);
        assert!(!article.is_fact_check_article);
        assert_eq!(article.credibility(), SourceCredibility::Unknown);
        assert_eq!(article.section_label(), "News");
    }

    #[test]
    fn test_naive_and_unreadable_dates() {
        let naive: Article = serde_json::from_str(
            r#"{"id": 1, "title": "a", "publication_date": "2024-03-01T10:15:30.123456"}"#,
        )
        .unwrap();
        assert_eq!(
            naive.publication_date.unwrap().to_rfc3339(),
            "2024-03-01T10:15:30.123456+00:00"
        );

        let date_only: Article = serde_json::from_str(
            r#"{"id": 2, "title": "b", "publication_date": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(date_only.display_date(), "2024-03-01");

        let garbage: Vec<Article> = serde_json::from_str(
            r#"[{"id": 3, "title": "c", "publication_date": "yesterday"},
                {"id": 4, "title": "d", "publication_date": 1700000000},
                {"id": 5, "title": "e", "publication_date": null}]"#,
        )
        .unwrap();
        assert_eq!(garbage.len(), 3);
        assert!(garbage.iter().all(|a| a.publication_date.is_none()));
    }

    #[test]
    fn test_unrecognized_credibility_is_unknown() {
        let article: Article =
            serde_json::from_str(r#"{"id": 1, "title": "t", "source_credibility": "SHAKY"}"#)
                .unwrap();
        assert_eq!(article.credibility(), SourceCredibility::Unknown);
        assert_eq!(article.credibility().badge(), None);
    }

    #[test]
    fn test_fact_checker_badge() {
        assert_eq!(SourceCredibility::FactChecker.badge(), Some("FC"));
    }

    #[test]
    fn test_image_url_sentinel() {
        let mut article = Article::new(1, "t");
        assert_eq!(article.image_url(), None);
        article.img_url = Some(NO_IMAGE.into());
        assert_eq!(article.image_url(), None);
        article.img_url = Some(String::new());
        assert_eq!(article.image_url(), None);
        article.img_url = Some("https://img/1.jpg".into());
        assert_eq!(article.image_url(), Some("https://img/1.jpg"));
    }

    #[test]
    fn test_fact_check_takes_precedence_over_prediction() {
        let mut article = Article::new(1, "t");
        article.prediction = false;
        assert_eq!(article.verdict(), Verdict::Flagged);
        article.is_fact_check_article = true;
        assert_eq!(article.verdict(), Verdict::FactCheck);
        article.is_fact_check_article = false;
        article.prediction = true;
        assert_eq!(article.verdict(), Verdict::Verified);
    }

    #[test]
    fn test_section_label_ignores_empty() {
        let mut article = Article::new(1, "t");
        article.section_name = Some(String::new());
        assert_eq!(article.section_label(), "News");
        article.section_name = Some("Sport".into());
        assert_eq!(article.section_label(), "Sport");
    }
}
