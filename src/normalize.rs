//! Recover JSON from free-form model replies.
//!
//! Models often wrap structured output in a markdown fence (```` ```json ````)
//! or answer with a bare object where an array was asked for. The normalizer
//! absorbs both: fences are stripped, arrays are flattened one level, and
//! any other JSON value becomes a single record. A reply that still does not
//! parse contributes nothing and is logged, never raised.

use serde_json::Value;
use tracing::{info, warn};

use crate::models::CompletionReply;

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Strip one leading code fence (```` ```json ````, any case, or a bare
/// ```` ``` ````) and one trailing fence, then trim whitespace.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        let rest = rest.trim_start_matches([' ', '\t']);
        body = match rest.get(..JSON_TAG.len()) {
            Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &rest[JSON_TAG.len()..],
            _ => rest,
        };
    }

    body = body.trim();
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Turn one reply into zero or more JSON records.
///
/// `chunk_index` only labels the log lines.
pub fn normalize_reply(reply: &CompletionReply, chunk_index: usize) -> Vec<Value> {
    let text = match reply {
        CompletionReply::Content(text) => text,
        CompletionReply::NoChoices => {
            info!(chunk = chunk_index, "no choices returned");
            return Vec::new();
        }
        CompletionReply::EmptyContent => {
            info!(chunk = chunk_index, "empty content returned");
            return Vec::new();
        }
    };

    let body = strip_code_fence(text);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(value) => vec![value],
        Err(e) => {
            warn!(chunk = chunk_index, error = %e, "reply is not valid JSON, skipping chunk");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(s: &str) -> CompletionReply {
        CompletionReply::Content(s.to_string())
    }

    #[test]
    fn test_array_is_flattened() {
        let out = normalize_reply(&content(r#"["a","b"]"#), 1);
        assert_eq!(out, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_nested_array_flattened_one_level_only() {
        let out = normalize_reply(&content("[[1,2],3]"), 1);
        assert_eq!(out, vec![json!([1, 2]), json!(3)]);
    }

    #[test]
    fn test_object_wrapped() {
        let out = normalize_reply(&content(r#"{"x":1}"#), 1);
        assert_eq!(out, vec![json!({"x": 1})]);
    }

    #[test]
    fn test_scalar_wrapped() {
        assert_eq!(normalize_reply(&content("42"), 1), vec![json!(42)]);
    }

    #[test]
    fn test_fenced_equals_unfenced() {
        let fenced = normalize_reply(&content("```json\n[1,2]\n```"), 1);
        let bare = normalize_reply(&content("[1,2]"), 1);
        assert_eq!(fenced, vec![json!(1), json!(2)]);
        assert_eq!(fenced, bare);
    }

    #[test]
    fn test_fence_variants() {
        assert_eq!(strip_code_fence("  ```JSON\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("``` json {\"a\":1} ```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[true]\n```"), "[true]");
        assert_eq!(strip_code_fence("[1]"), "[1]");
    }

    #[test]
    fn test_unterminated_fence() {
        let out = normalize_reply(&content("```json\n{\"open\": true}"), 1);
        assert_eq!(out, vec![json!({"open": true})]);
    }

    #[test]
    fn test_malformed_yields_nothing() {
        assert!(normalize_reply(&content("not json"), 3).is_empty());
        assert!(normalize_reply(&content("```json\n[1,\n```"), 3).is_empty());
    }

    #[test]
    fn test_empty_sentinels_yield_nothing() {
        assert!(normalize_reply(&CompletionReply::NoChoices, 1).is_empty());
        assert!(normalize_reply(&CompletionReply::EmptyContent, 1).is_empty());
    }

    #[test]
    fn test_multibyte_after_fence() {
        let out = normalize_reply(&content("```é"), 1);
        assert!(out.is_empty());
    }
}
