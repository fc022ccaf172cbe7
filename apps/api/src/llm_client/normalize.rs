//! Turns raw model text into JSON the handlers can return.
//!
//! Models like to wrap structured output in Markdown fences, sometimes with
//! prose around them. One layer of fencing is removed and the remainder is
//! parsed exactly once; on failure the raw text travels back under `error`.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Parsed answer, or the error object carrying the unparsed text.
/// Serializes as the bare answer or as `{"error": raw}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Structured<T> {
    Parsed(T),
    Failed { error: String },
}

impl<T> Structured<T> {
    pub fn map(self, f: impl FnOnce(T) -> T) -> Self {
        match self {
            Structured::Parsed(value) => Structured::Parsed(f(value)),
            failed => failed,
        }
    }
}

impl<T: Serialize> Structured<T> {
    /// `{key: answer}` on success, `{"error": raw}` otherwise.
    pub fn wrapped(self, key: &str) -> Value {
        match self {
            Structured::Parsed(value) => {
                let mut map = Map::new();
                map.insert(key.to_string(), serde_json::to_value(value).unwrap_or_default());
                Value::Object(map)
            }
            Structured::Failed { error } => error_payload(&error),
        }
    }
}

/// Strips fences and parses once. Never panics, never fails the request.
pub fn normalize<T: DeserializeOwned>(raw: String) -> Structured<T> {
    match parse_model_json::<T>(&raw) {
        Ok(parsed) => Structured::Parsed(parsed),
        Err(e) => {
            warn!("Failed to parse AI response: {e}");
            Structured::Failed { error: raw }
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
///
/// Text before the opening fence and after the closing fence is dropped.
/// An unterminated fence keeps everything after the opening marker.
pub fn strip_code_fences(text: &str) -> &str {
    let body = if let Some((_, rest)) = text.split_once(JSON_FENCE) {
        rest.split_once(FENCE).map_or(rest, |(inner, _)| inner)
    } else if let Some((_, rest)) = text.split_once(FENCE) {
        rest.split_once(FENCE).map_or(rest, |(inner, _)| inner)
    } else {
        text
    };
    body.trim()
}

/// Removes every ```html / ``` marker from an HTML answer.
pub fn strip_html_fences(text: &str) -> String {
    text.replace("```html", "").replace(FENCE, "").trim().to_string()
}

/// Strips fences, then deserializes the model output as `T`.
pub fn parse_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw))
}

pub fn error_payload(raw: &str) -> Value {
    json!({ "error": raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(raw: &str) -> Value {
        serde_json::to_value(normalize::<Value>(raw.to_string())).unwrap()
    }

    #[test]
    fn test_strip_code_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_drops_surrounding_prose() {
        let input = "Sure! Here you go:\n```json\n[1, 2]\n```\nLet me know if you need more.";
        assert_eq!(strip_code_fences(input), "[1, 2]");
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_normalize_fenced_and_clean_agree() {
        let clean = r#"{"ats_score": 72, "technical_skills": ["Rust", "SQL"]}"#;

        let expected = normalized(clean);
        assert_eq!(normalized(&format!("```json\n{clean}\n```")), expected);
        assert_eq!(normalized(&format!("```\n{clean}\n```")), expected);
        assert_eq!(expected["ats_score"], 72);
    }

    #[test]
    fn test_normalize_malformed_embeds_raw_text() {
        let raw = "I'm sorry, I can't produce JSON for that résumé.";
        assert_eq!(normalized(raw), json!({ "error": raw }));
    }

    #[test]
    fn test_normalize_gateway_error_text_is_embedded() {
        let raw = "Error 403: API key not valid";
        assert_eq!(normalized(raw)["error"], raw);
    }

    #[test]
    fn test_normalize_typed_shape_mismatch_is_failure() {
        let result = normalize::<Vec<u32>>("{\"not\": \"a list\"}".to_string());
        assert!(matches!(result, Structured::Failed { .. }));
    }

    #[test]
    fn test_parse_model_json_typed() {
        let parsed: Vec<u32> = parse_model_json("```json\n[3, 4]\n```").unwrap();
        assert_eq!(parsed, vec![3, 4]);
        assert!(parse_model_json::<Vec<u32>>("not json").is_err());
    }

    #[test]
    fn test_wrapped() {
        let ok: Structured<Vec<u32>> = Structured::Parsed(vec![1]);
        assert_eq!(ok.wrapped("roadmap"), json!({"roadmap": [1]}));

        let failed: Structured<Vec<u32>> = Structured::Failed {
            error: "nope".to_string(),
        };
        assert_eq!(failed.wrapped("roadmap"), json!({"error": "nope"}));
    }

    #[test]
    fn test_strip_html_fences() {
        let raw = "```html\n<h3>Impact</h3>\n<ul><li>Quantify results</li></ul>\n```";
        assert_eq!(
            strip_html_fences(raw),
            "<h3>Impact</h3>\n<ul><li>Quantify results</li></ul>"
        );
    }
}
