//! Locating the JSON payload inside a model reply.
//!
//! Models wrap their answer in prose or Markdown more often than not. Three strategies are
//! tried, loosest last:
//!
//! 1. the body of the first fenced code block (```` ```json ```` or bare ```` ``` ````)
//! 2. the substring from the first `{` to the last `}`, and the one from the first `[` to the
//!    last `]`, earliest opener first
//! 3. the whole reply
//!
//! When none parses, the error of the whole-reply attempt is reported.

use crate::error::{ConverterError, ConverterResult};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*(?i:json)?[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    })
}

/// Body of the first fenced code block, if any.
pub fn fenced_block(reply: &str) -> Option<&str> {
    fence_pattern()
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Substring from the first `open` to the last `close`.
pub fn delimited_slice(reply: &str, open: char, close: char) -> Option<&str> {
    let start = reply.find(open)?;
    let end = reply.rfind(close)?;
    (end > start).then(|| &reply[start..=end])
}

/// Object and array slices of the reply, the one that opens earlier first.
fn delimited_candidates(reply: &str) -> Vec<&str> {
    let mut slices: Vec<&str> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| delimited_slice(reply, open, close))
        .collect();
    slices.sort_by_key(|slice| slice.as_ptr() as usize);
    slices
}

/// Parses the JSON payload out of a model reply.
pub fn extract_json(reply: &str) -> ConverterResult<Value> {
    if let Some(block) = fenced_block(reply) {
        match serde_json::from_str(block) {
            Ok(value) => return Ok(value),
            Err(e) => tracing::debug!("fenced block is not valid JSON: {e}"),
        }
    }

    for slice in delimited_candidates(reply) {
        match serde_json::from_str(slice) {
            Ok(value) => return Ok(value),
            Err(e) => tracing::debug!("delimited slice is not valid JSON: {e}"),
        }
    }

    serde_json::from_str(reply.trim()).map_err(|e| ConverterError::ReplyParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_block_wins_over_surrounding_text() {
        let reply = r#"Here is the bundle you asked for {not json}:

```json
{"resourceType": "Bundle", "type": "collection", "entry": []}
```

Let me know if you need {"anything": "else"}."#;

        let value = extract_json(reply).unwrap();
        assert_eq!(
            value,
            json!({"resourceType": "Bundle", "type": "collection", "entry": []})
        );
    }

    #[test]
    fn bare_fence_is_accepted() {
        let reply = "```\n[{\"resourceType\": \"InsurancePlan\"}]\n```";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!([{"resourceType": "InsurancePlan"}])
        );
    }

    #[test]
    fn uppercase_language_tag_is_accepted() {
        let reply = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_json(reply).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn falls_back_to_brace_delimited_substring() {
        let reply = "Sure! {\"resourceType\": \"InsurancePlan\", \"name\": \"Gold\"} Hope that helps.";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["name"], "Gold");
    }

    #[test]
    fn falls_back_when_fence_body_is_broken() {
        let reply = "```json\n{broken\n```\nActual: {\"ok\": true}";
        // The slice runs from the first '{' inside the fence to the last '}', which is not
        // valid either, so the whole-reply attempt fails.
        assert!(matches!(
            extract_json(reply),
            Err(ConverterError::ReplyParse(_))
        ));
    }

    #[test]
    fn array_payload_is_found_by_bracket_slice() {
        let reply = "Plans: [{\"error\": \"row 3 unreadable\"}] end";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!([{"error": "row 3 unreadable"}])
        );
    }

    #[test]
    fn bracketed_prose_before_object_does_not_hide_it() {
        let reply = "Based on the document [page 1], here is the result: \
                     {\"resourceType\": \"InsurancePlan\", \"name\": \"Gold\"}";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["resourceType"], "InsurancePlan");
        assert_eq!(value["name"], "Gold");
    }

    #[test]
    fn array_is_preferred_when_it_opens_first() {
        let reply = "Result: [{\"resourceType\": \"InsurancePlan\"}] (see {notes})";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!([{"resourceType": "InsurancePlan"}])
        );
    }

    #[test]
    fn whole_reply_parse_error_is_surfaced() {
        let err = extract_json("I could not find any insurance plans.").unwrap_err();
        match err {
            ConverterError::ReplyParse(msg) => assert!(msg.contains("expected"), "{msg}"),
            other => panic!("expected ReplyParse, got {other:?}"),
        }
    }

    #[test]
    fn delimited_slice_requires_closer_after_opener() {
        assert_eq!(delimited_slice("} nothing {", '{', '}'), None);
        assert_eq!(delimited_slice("x {\"a\":1} y", '{', '}'), Some("{\"a\":1}"));
        assert_eq!(delimited_slice("see [1] and {}", '[', ']'), Some("[1]"));
    }
}
