use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

/// Marker stored in the fallback object when the model reply is not a JSON object
pub const PARSE_FAILURE_MARKER: &str = "JSON 파싱에 실패했습니다.";

/// Normalized model output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    /// The reply parsed as a JSON object; keys are passed through untouched
    Parsed(Map<String, Value>),
    /// The reply could not be parsed; carries the text verbatim
    Fallback(Fallback),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub error: String,
    pub original_content: String,
}

impl Summary {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Summary::Fallback(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Summary::Parsed(map) => Value::Object(map.clone()),
            Summary::Fallback(fb) => serde_json::json!({
                "error": fb.error,
                "original_content": fb.original_content,
            }),
        }
    }
}

/// Strip a fenced code block down to its outermost `{ ... }` span.
///
/// Text that does not start with a fence, or has no brace pair, is returned as-is.
pub fn strip_fence(text: &str) -> &str {
    if !text.trim_start().starts_with("```") {
        return text;
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Turn a model reply into a structured summary. Never fails.
pub fn normalize(text: &str) -> Summary {
    let candidate = strip_fence(text);
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => {
            debug!("Parsed model reply with {} top-level keys", map.len());
            Summary::Parsed(map)
        }
        Ok(other) => {
            warn!("Model reply is JSON but not an object ({})", kind(&other));
            fallback(text)
        }
        Err(e) => {
            warn!("Model reply is not valid JSON: {e}");
            fallback(text)
        }
    }
}

fn fallback(text: &str) -> Summary {
    Summary::Fallback(Fallback {
        error: PARSE_FAILURE_MARKER.to_string(),
        original_content: text.to_string(),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json() {
        let summary = normalize("```json\n{\"a\":1}\n```");
        assert_eq!(summary.to_value(), json!({"a": 1}));
        assert!(!summary.is_fallback());
    }

    #[test]
    fn test_plain_json() {
        let summary = normalize(r#"{"요약": "스트레칭 루틴", "운동 루틴": ["1. 목 돌리기"]}"#);
        assert_eq!(
            summary.to_value(),
            json!({"요약": "스트레칭 루틴", "운동 루틴": ["1. 목 돌리기"]})
        );
    }

    #[test]
    fn test_key_order_preserved() {
        let summary = normalize(r#"{"요약": "a", "운동 강도": "b", "운동 루틴": [], "자극 신체 부위": "c"}"#);
        match summary {
            Summary::Parsed(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                assert_eq!(keys, ["요약", "운동 강도", "운동 루틴", "자극 신체 부위"]);
            }
            other => panic!("expected parsed summary, got {other:?}"),
        }
    }

    #[test]
    fn test_fence_without_language_tag() {
        let summary = normalize("```\n{\"key_topics\": [\"운동\"]}\n```");
        assert_eq!(summary.to_value(), json!({"key_topics": ["운동"]}));
    }

    #[test]
    fn test_not_json() {
        let summary = normalize("not json at all");
        match summary {
            Summary::Fallback(fb) => {
                assert_eq!(fb.original_content, "not json at all");
                assert_eq!(fb.error, PARSE_FAILURE_MARKER);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_fenced_but_broken_keeps_original_text() {
        let text = "```json\n{\"a\": 1,,}\n```";
        match normalize(text) {
            Summary::Fallback(fb) => assert_eq!(fb.original_content, text),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_fence_without_braces() {
        assert!(normalize("```json\n```").is_fallback());
        assert!(normalize("```json\n} backwards {\n```").is_fallback());
    }

    #[test]
    fn test_prose_around_json_is_not_repaired() {
        assert!(normalize("Here you go: {\"a\": 1}").is_fallback());
    }

    #[test]
    fn test_non_object_json_falls_back() {
        assert!(normalize("[1, 2, 3]").is_fallback());
        assert!(normalize("\"just a string\"").is_fallback());
        assert!(normalize("42").is_fallback());
    }

    #[test]
    fn test_total_on_odd_input() {
        for input in ["", "   ", "```", "{", "}", "```json\n{", "\u{0}", "null"] {
            let summary = normalize(input);
            assert!(summary.to_value().is_object(), "input: {input:?}");
        }
    }

    #[test]
    fn test_idempotent_on_fallback() {
        let first = normalize("모델이 JSON 대신 평문으로 답했습니다");
        let again = normalize(&first.to_value().to_string());
        assert_eq!(again.to_value(), first.to_value());
    }

    #[test]
    fn test_serialize_matches_to_value() {
        for summary in [normalize("{\"a\": [1]}"), normalize("nope")] {
            assert_eq!(serde_json::to_value(&summary).unwrap(), summary.to_value());
        }
    }
}
