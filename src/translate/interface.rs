//! Request and result types for the `/translate` endpoint

use serde::{Deserialize, Serialize};

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response";

/// Inbound body. Both fields are optional at the serde level so a missing
/// field reaches validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "targetLang")]
    pub target_lang: Option<String>,
}

impl TranslateRequest {
    /// Returns `(text, target_lang)` when both are present and non-empty.
    pub fn into_validated(self) -> Option<(String, String)> {
        let text = self.text.filter(|t| !t.is_empty())?;
        let target_lang = self.target_lang.filter(|l| !l.is_empty())?;
        Some((text, target_lang))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    pub language: String,
}

/// What the handler returns with HTTP 200: either the structured
/// translation or the raw reply the parser could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedResult {
    Translated(Translation),
    ParseFailure { error: String, raw: String },
}

impl ParsedResult {
    pub fn parse_failure(raw: String) -> Self {
        ParsedResult::ParseFailure {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            raw,
        }
    }
}
