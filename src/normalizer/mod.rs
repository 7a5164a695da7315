use std::collections::HashSet;

use html_escape::decode_html_entities;

use crate::app::FetchError;
use crate::domain::Article;

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Decode an API response body into a clean article collection.
    ///
    /// Display text has HTML entities decoded and duplicate ids are dropped,
    /// keeping the first occurrence so the server's ordering survives.
    pub fn normalize(&self, body: &[u8]) -> Result<Vec<Article>, FetchError> {
        let articles: Vec<Article> = serde_json::from_slice(body)?;
        Ok(self.clean(articles))
    }

    pub fn clean(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut seen = HashSet::new();

        articles
            .into_iter()
            .filter(|article| seen.insert(article.id))
            .map(|mut article| {
                article.title = decode_html_entities(article.title.trim()).to_string();
                article.section_name = article
                    .section_name
                    .map(|s| decode_html_entities(&s).to_string());
                article
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE_SAMPLE: &str = r#"[
        {"id": 3, "title": "Rates held &amp; markets rally", "section_name": "Business", "prediction": true},
        {"id": 2, "title": "  Cup final tonight ", "section_name": "Sport", "prediction": false},
        {"id": 3, "title": "Rates held (duplicate)", "section_name": "Business", "prediction": true}
    ]"#;

    #[test]
    fn test_normalize_decodes_and_dedups() {
        let normalizer = Normalizer::new();
        let articles = normalizer.normalize(LIVE_SAMPLE.as_bytes()).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, 3);
        assert_eq!(articles[0].title, "Rates held & markets rally");
        assert_eq!(articles[1].title, "Cup final tonight");
    }

    #[test]
    fn test_normalize_empty_array() {
        let normalizer = Normalizer::new();
        assert!(normalizer.normalize(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_rejects_malformed_body() {
        let normalizer = Normalizer::new();
        let err = normalizer.normalize(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let err = normalizer.normalize(br#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
