//! Asking the news service to classify a title typed by the user.
//!
//! The service does the classification; the client only sends the title and
//! reports the answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::FetchError;

pub const TITLE_CHECK_ENDPOINT: &str = "api/usercheck/title/";

/// Request body for [`TITLE_CHECK_ENDPOINT`].
#[derive(Debug, Serialize)]
pub struct TitleCheckRequest<'a> {
    pub user_news: &'a str,
    pub use_meta_model: bool,
}

/// One web search hit the search-backed model based its answer on.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub title: String,
    pub source: String,
    pub snippet: String,
    pub link: String,
}

/// The service's answer. Only `prediction` is always present; the rest comes
/// from the search-backed model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleCheck {
    pub prediction: bool,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub detailed_analysis: Option<String>,
    #[serde(default)]
    pub search_results: Vec<SearchHit>,
}

impl TitleCheck {
    pub fn decode(body: &[u8]) -> Result<Self, FetchError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn label(&self) -> &'static str {
        if self.prediction {
            "Real news"
        } else {
            "Fake news"
        }
    }
}

#[async_trait]
pub trait TitleChecker {
    async fn check_title(&self, title: &str, use_meta_model: bool)
        -> Result<TitleCheck, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(TitleCheckRequest {
            user_news: "Moon made of cheese",
            use_meta_model: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"user_news": "Moon made of cheese", "use_meta_model": true})
        );
    }

    #[test]
    fn test_decode_plain_prediction() {
        let check = TitleCheck::decode(br#"{"prediction": false}"#).unwrap();
        assert!(!check.prediction);
        assert_eq!(check.label(), "Fake news");
        assert_eq!(check.verdict, None);
        assert!(check.search_results.is_empty());
    }

    #[test]
    fn test_decode_search_backed_answer() {
        let body = br#"{
            "prediction": true,
            "verdict": "TRUE",
            "confidence": 85,
            "detailed_analysis": "VERDICT: TRUE\nCONFIDENCE: 85",
            "search_results": [
                {"title": "Rain in Kochi", "source": "Onmanorama", "link": "https://example.com/1"}
            ]
        }"#;
        let check = TitleCheck::decode(body).unwrap();
        assert_eq!(check.label(), "Real news");
        assert_eq!(check.verdict.as_deref(), Some("TRUE"));
        assert_eq!(check.confidence, Some(85.0));
        assert_eq!(check.search_results.len(), 1);
        assert_eq!(check.search_results[0].source, "Onmanorama");
        assert_eq!(check.search_results[0].snippet, "");
    }

    #[test]
    fn test_decode_rejects_validation_errors() {
        let err = TitleCheck::decode(br#"{"user_news": ["This field may not be blank."]}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
