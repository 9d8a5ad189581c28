//! Generated-text extraction for watsonx.ai generation responses.
//!
//! The upstream response schema is not pinned down, so the text is looked up
//! in a fixed order of known shapes. The first extractor that finds a string
//! wins. If nothing matches, the whole body is returned pretty-printed so the
//! user still sees what came back.

use serde_json::Value;

/// A single lookup strategy. Returns `None` when its shape is absent.
pub type Extractor = fn(&Value) -> Option<String>;

/// Tried in order; first hit wins.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("output.content.text", extract_output_content_text),
    ("generated_text", extract_generated_text),
    ("outputs.text", extract_outputs_text),
];

/// Extract the generated text, or fall back to the pretty-printed body.
pub fn extract_text(json: &Value) -> String {
    for (shape, extractor) in EXTRACTORS {
        if let Some(text) = extractor(json) {
            tracing::debug!(shape = %shape, "matched generation response shape");
            return text;
        }
    }

    tracing::debug!("unrecognised generation response shape, returning raw body");
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}

/// output[*].content[*].text (first string found)
fn extract_output_content_text(json: &Value) -> Option<String> {
    json.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(|c| c.as_array()))
        .flatten()
        .find_map(|part| part.get("text").and_then(|t| t.as_str()))
        .map(String::from)
}

/// generated_text
fn extract_generated_text(json: &Value) -> Option<String> {
    json.get("generated_text")
        .and_then(|t| t.as_str())
        .map(String::from)
}

/// outputs[0].text
fn extract_outputs_text(json: &Value) -> Option<String> {
    json.get("outputs")?
        .as_array()?
        .first()?
        .get("text")
        .and_then(|t| t.as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_text_shape() {
        assert_eq!(extract_text(&json!({"generated_text": "X"})), "X");
    }

    #[test]
    fn test_output_content_shape() {
        let body = json!({"output": [{"content": [{"text": "Y"}]}]});
        assert_eq!(extract_text(&body), "Y");
    }

    #[test]
    fn test_outputs_shape() {
        assert_eq!(extract_text(&json!({"outputs": [{"text": "Z"}]})), "Z");
    }

    #[test]
    fn test_output_content_skips_parts_without_text() {
        let body = json!({
            "output": [
                {"role": "assistant"},
                {"content": [{"type": "reasoning"}, {"type": "text", "text": "first"}]},
                {"content": [{"text": "second"}]}
            ]
        });
        assert_eq!(extract_text(&body), "first");
    }

    #[test]
    fn test_output_content_takes_precedence() {
        let body = json!({
            "generated_text": "later",
            "output": [{"content": [{"text": "earlier"}]}]
        });
        assert_eq!(extract_text(&body), "earlier");
    }

    #[test]
    fn test_generated_text_beats_outputs() {
        let body = json!({
            "outputs": [{"text": "Z"}],
            "generated_text": "X"
        });
        assert_eq!(extract_text(&body), "X");
    }

    #[test]
    fn test_outputs_only_looks_at_first_entry() {
        let body = json!({"outputs": [{"score": 1}, {"text": "nope"}]});
        assert_eq!(extract_text(&body), serde_json::to_string_pretty(&body).unwrap());
    }

    #[test]
    fn test_non_string_text_is_ignored() {
        let body = json!({"generated_text": 42});
        assert_eq!(extract_text(&body), serde_json::to_string_pretty(&body).unwrap());
    }

    #[test]
    fn test_unknown_shape_returns_pretty_body() {
        let body = json!({"results": [{"generated": "hidden"}], "model_id": "m"});
        let out = extract_text(&body);
        assert_eq!(out, serde_json::to_string_pretty(&body).unwrap());
        assert!(out.contains('\n'));
    }

    #[test]
    fn test_each_extractor_independently() {
        let shapes = [
            json!({"output": [{"content": [{"text": "a"}]}]}),
            json!({"generated_text": "b"}),
            json!({"outputs": [{"text": "c"}]}),
        ];
        for (i, (_, extractor)) in EXTRACTORS.iter().enumerate() {
            for (j, body) in shapes.iter().enumerate() {
                assert_eq!(extractor(body).is_some(), i == j, "extractor {} on shape {}", i, j);
            }
        }
    }
}
