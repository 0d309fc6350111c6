//! Recovery of JSON arrays embedded in page scripts

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Result of looking for an embedded array
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedJson {
    /// The array parsed as-is
    Parsed(Vec<Value>),
    /// The array was cut off or malformed; these are the complete elements
    /// recovered by the bracket scan
    RecoveredPartial(Vec<Value>),
    /// Key absent or nothing usable behind it
    Unavailable,
}

impl EmbeddedJson {
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Parsed(values) | Self::RecoveredPartial(values) => values,
            Self::Unavailable => Vec::new(),
        }
    }
}

/// Find the array stored under `"key"` in `text`.
///
/// When `next_key` is given the array is first matched as the value that is
/// immediately followed by that key, which pins its end even if elements
/// contain nested arrays.
pub fn extract_array(text: &str, key: &str, next_key: Option<&str>) -> EmbeddedJson {
    let quoted_key = format!("\"{key}\"");
    let Some(key_at) = text.find(&quoted_key) else {
        return EmbeddedJson::Unavailable;
    };

    let mut patterns = Vec::new();
    if let Some(next) = next_key {
        patterns.push(format!(
            r#""{}"\s*:\s*(\[[\s\S]+?\])\s*,\s*"{}""#,
            regex::escape(key),
            regex::escape(next)
        ));
    }
    patterns.push(format!(r#""{}"\s*:\s*(\[[\s\S]+?\])"#, regex::escape(key)));

    for pattern in patterns {
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if let Some(caps) = re.captures(text) {
            match serde_json::from_str::<Vec<Value>>(&caps[1]) {
                Ok(values) => return EmbeddedJson::Parsed(values),
                Err(e) => debug!("\"{}\" array did not parse directly: {}", key, e),
            }
        }
    }

    balanced_scan(&text[key_at..])
}

/// Walk from the first `[` tracking depth (outside string literals). A
/// closed array is parsed whole; an unclosed one is cut back to its last
/// complete top-level element.
fn balanced_scan(text: &str) -> EmbeddedJson {
    let Some(open) = text.find('[') else {
        return EmbeddedJson::Unavailable;
    };

    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // End (exclusive) of the last complete top-level element
    let mut complete_end = None;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
                if depth == 1 {
                    complete_end = Some(i + 1);
                }
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return match serde_json::from_str::<Vec<Value>>(&text[open..=i]) {
                        Ok(values) => EmbeddedJson::RecoveredPartial(values),
                        Err(e) => {
                            debug!("Balanced array failed to parse: {}", e);
                            EmbeddedJson::Unavailable
                        }
                    };
                }
                if depth == 1 {
                    complete_end = Some(i + 1);
                }
            }
            b',' if depth == 1 => complete_end = Some(i),
            _ => {}
        }
    }

    // Truncated before the array closed
    let Some(end) = complete_end else {
        return EmbeddedJson::Unavailable;
    };
    let candidate = format!("{}]", text[open..end].trim_end().trim_end_matches(','));
    match serde_json::from_str::<Vec<Value>>(&candidate) {
        Ok(values) if !values.is_empty() => EmbeddedJson::RecoveredPartial(values),
        Ok(_) => EmbeddedJson::Unavailable,
        Err(e) => {
            debug!("Truncated array not recoverable: {}", e);
            EmbeddedJson::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_intact_array_with_anchor() {
        let text = r#"window.INITIAL_DATA__ = {"adverts":[{"title":"A","attrs":[1,2]},{"title":"B"}],"total_count":2}"#;
        let found = extract_array(text, "adverts", Some("total_count"));
        assert_eq!(
            found,
            EmbeddedJson::Parsed(vec![json!({"title":"A","attrs":[1,2]}), json!({"title":"B"})])
        );
    }

    #[test]
    fn nested_arrays_without_anchor_go_through_scan() {
        let text = r#"{"adverts":[{"title":"A","tags":["x"]},{"title":"B"}],"other":1}"#;
        let found = extract_array(text, "adverts", None);
        assert_eq!(found.into_values().len(), 2);
    }

    #[test]
    fn truncated_array_keeps_complete_objects() {
        let text = r#"{"adverts":[{"title":"A","price":1},{"title":"B, [tricky]","price":2},{"title":"C","pri"#;
        match extract_array(text, "adverts", Some("total_count")) {
            EmbeddedJson::RecoveredPartial(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[1]["title"], "B, [tricky]");
            }
            other => panic!("expected partial recovery, got {other:?}"),
        }
    }

    #[test]
    fn truncated_right_after_an_object() {
        let text = r#"{"adverts":[{"title":"A"},{"title":"B"}"#;
        assert_eq!(
            extract_array(text, "adverts", None),
            EmbeddedJson::RecoveredPartial(vec![json!({"title":"A"}), json!({"title":"B"})])
        );
    }

    #[test]
    fn nothing_complete_is_unavailable() {
        let text = r#"{"adverts":[{"title":"A","pri"#;
        assert_eq!(extract_array(text, "adverts", None), EmbeddedJson::Unavailable);
        assert_eq!(extract_array("no payload here", "adverts", None), EmbeddedJson::Unavailable);
    }
}
