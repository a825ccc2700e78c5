use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::warn;

use super::interface::{ParsedResult, Translation};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("reply is not a JSON object")]
    NotAnObject,
    #[error("missing or non-string field `{0}`")]
    MissingField(String),
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    description: String,
}

/// Asks the model for a flat JSON object of named string fields and reads
/// it back out of the reply.
///
/// Accepted reply shapes:
/// - a fenced code block (optionally tagged, e.g. ```` ```json ````); the
///   text after the first opening fence is parsed, up to the next fence or
///   the end of the reply when the closing fence is missing
/// - otherwise the whole reply, trimmed
///
/// The parsed value must be an object holding every declared field as a
/// string. Extra keys are ignored.
#[derive(Debug, Clone)]
pub struct StructuredOutputParser {
    fields: Vec<FieldSpec>,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[\w-]*\s*(.*?)(?:```|\z)").expect("valid fence pattern")
    })
}

impl StructuredOutputParser {
    pub fn from_names_and_descriptions(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, description)| FieldSpec {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    pub fn translation() -> Self {
        Self::from_names_and_descriptions(&[
            ("translatedText", "The translated version of the input text"),
            ("language", "The target language used for the translation"),
        ])
    }

    fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    json!({ "type": "string", "description": field.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn get_format_instructions(&self) -> String {
        format!(
            "You must format your output as a JSON object that adheres to the JSON Schema below.\n\
             Every property listed under \"required\" must be present and must be a string.\n\
             \n\
             Here is the JSON Schema your output must adhere to:\n\
             ```json\n\
             {}\n\
             ```\n\
             \n\
             Reply with only the JSON object, enclosed in a markdown code block tagged json.",
            self.json_schema()
        )
    }

    pub fn parse(&self, raw: &str) -> Result<Map<String, Value>, ParseError> {
        let candidate = fence_regex()
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(raw)
            .trim();

        let object = match serde_json::from_str::<Value>(candidate)? {
            Value::Object(object) => object,
            _ => return Err(ParseError::NotAnObject),
        };

        for field in &self.fields {
            if !object.get(&field.name).is_some_and(Value::is_string) {
                return Err(ParseError::MissingField(field.name.clone()));
            }
        }

        Ok(object)
    }

    pub fn parse_translation(&self, raw: &str) -> Result<Translation, ParseError> {
        let object = self.parse(raw)?;
        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ParseError::MissingField(name.to_string()))
        };

        Ok(Translation {
            translated_text: field("translatedText")?,
            language: field("language")?,
        })
    }

    /// Never fails: an unparseable reply becomes `ParsedResult::ParseFailure`
    /// carrying the raw text.
    pub fn parse_or_fallback(&self, raw: String) -> ParsedResult {
        match self.parse_translation(&raw) {
            Ok(translation) => ParsedResult::Translated(translation),
            Err(e) => {
                warn!("Could not parse model reply ({} bytes): {}", raw.len(), e);
                ParsedResult::parse_failure(raw)
            }
        }
    }
}
