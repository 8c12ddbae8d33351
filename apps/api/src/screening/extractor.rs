//! Response Extractor — isolates the JSON array from a free-text backend reply.
//!
//! Takes the span from the first `[` to the last `]`, inclusive. No structural
//! matching happens here; the validator copes with whatever the span holds.

use thiserror::Error;

/// Characters of the reply kept in `NoArrayFound` for diagnostics.
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no JSON array found in backend response: {preview:?}")]
    NoArrayFound { preview: String },
}

/// Returns the substring believed to hold the structured array.
pub fn extract_array(raw_response: &str) -> Result<&str, ExtractError> {
    let start = raw_response.find('[');
    let end = raw_response.rfind(']');

    match (start, end) {
        // Both delimiters are ASCII, so `end + 1` is a char boundary.
        (Some(start), Some(end)) if start < end => Ok(&raw_response[start..=end]),
        _ => Err(ExtractError::NoArrayFound {
            preview: preview(raw_response, PREVIEW_CHARS),
        }),
    }
}

/// Returns at most `max_chars` characters of `text`, marking truncation.
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_array() {
        assert_eq!(extract_array(r#"[{"a":1}]"#).unwrap(), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_extract_tolerates_surrounding_prose() {
        let raw = "Sure! Here are the results:\n[{\"a\":1}, {\"b\":2}]\nLet me know if you need more.";
        assert_eq!(extract_array(raw).unwrap(), r#"[{"a":1}, {"b":2}]"#);
    }

    #[test]
    fn test_extract_tolerates_markdown_fences() {
        let raw = "```json\n[\n  {\"candidate_name\": \"Ada\"}\n]\n```";
        assert_eq!(
            extract_array(raw).unwrap(),
            "[\n  {\"candidate_name\": \"Ada\"}\n]"
        );
    }

    #[test]
    fn test_extract_spans_first_open_to_last_close() {
        let raw = r#"[{"skills": ["rust"]}, {"skills": []}] trailing"#;
        assert_eq!(
            extract_array(raw).unwrap(),
            r#"[{"skills": ["rust"]}, {"skills": []}]"#
        );
    }

    #[test]
    fn test_prose_only_is_no_array_found() {
        let result = extract_array("I could not assess these resumes, sorry.");
        assert!(matches!(result, Err(ExtractError::NoArrayFound { .. })));
    }

    #[test]
    fn test_empty_reply_is_no_array_found() {
        assert!(matches!(
            extract_array(""),
            Err(ExtractError::NoArrayFound { .. })
        ));
    }

    #[test]
    fn test_reversed_delimiters_are_no_array_found() {
        assert!(matches!(
            extract_array("] nothing here ["),
            Err(ExtractError::NoArrayFound { .. })
        ));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(10);
        assert_eq!(preview(&text, 3), "ééé…");
        assert_eq!(preview("short", 10), "short");
    }
}
