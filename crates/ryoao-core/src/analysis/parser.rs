//! Parsing of the analysis backend's textual payload.
//!
//! The backend relays language-model output: a JSON array of findings that
//! may arrive wrapped in code fences or surrounded by prose. Parsing runs in
//! two phases, decoration stripping and then strict validation, and is
//! all-or-nothing: a single bad element rejects the whole payload.

use super::model::{RiskRecord, Severity};
use serde_json::{Map, Value};
use thiserror::Error;

const FENCE: &str = "```";

const SEVERITY_KEYS: &[&str] = &["rank", "severity"];
const TITLE_KEYS: &[&str] = &["title"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const ACTION_KEYS: &[&str] = &["action", "recommendedAction", "recommended_action"];

/// Reasons an analysis payload is rejected.
///
/// Element indices are zero-based positions in the decoded array.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("analysis payload is empty")]
    Empty,

    #[error("analysis payload does not contain a JSON array")]
    NotAnArray,

    #[error("analysis payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("finding at index {index} is not an object")]
    NotAnObject { index: usize },

    #[error("finding at index {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("finding at index {index} has a non-text `{field}`")]
    InvalidField { index: usize, field: &'static str },

    #[error("finding at index {index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },

    #[error("finding at index {index} has unknown severity `{value}`")]
    UnknownSeverity { index: usize, value: String },
}

/// Removes code-fence markers and surrounding prose.
///
/// Returns the text from the first `[` to the last `]`, or `None` when no
/// bracketed region exists.
pub fn strip_decoration(raw: &str) -> Option<&str> {
    let text = unfence(raw);
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end >= start).then(|| &text[start..=end])
}

fn unfence(raw: &str) -> &str {
    let text = raw.trim();
    let text = match text.strip_prefix(FENCE) {
        // Drop the info string (e.g. "json") that follows the opening fence
        Some(rest) => rest.split_once('\n').map_or(rest, |(_, body)| body),
        None => text,
    };
    let text = text.trim_end();
    text.strip_suffix(FENCE).unwrap_or(text)
}

/// Parses raw backend output into an ordered list of validated findings.
///
/// # Errors
///
/// Returns a [`ParseError`] when the cleaned text is not a well-formed array,
/// when any element lacks a required field, or when a severity falls outside
/// the three recognized ranks. No partial list is ever returned.
pub fn parse(raw: &str) -> Result<Vec<RiskRecord>, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let text = unfence(raw);
    let start = text.find('[').ok_or(ParseError::NotAnArray)?;
    let elements = decode_array(&text[start..])?;

    let records = elements
        .iter()
        .enumerate()
        .map(|(index, element)| validate_element(index, element))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = records.len(), "Parsed analysis payload");
    Ok(records)
}

/// Decodes the findings array from `text`, which starts at its first `[`.
///
/// The whole bracketed region is tried first. When it does not decode,
/// later `[` positions are tried only past the end of each earlier region,
/// so brackets quoted inside a broken payload are never taken for it. An
/// unterminated region rejects the payload. An empty array counts only
/// when it is the sole bracketed region.
fn decode_array(text: &str) -> Result<Vec<Value>, ParseError> {
    let end = text.rfind(']').ok_or(ParseError::NotAnArray)?;
    let whole_error = match serde_json::from_str::<Vec<Value>>(&text[..=end]) {
        Ok(elements) if !elements.is_empty() || !text[end..].contains('[') => {
            return Ok(elements);
        }
        Ok(_) => None,
        Err(err) => Some(ParseError::Malformed(err.to_string())),
    };

    let mut resume_at = 0;
    for (offset, _) in text.match_indices('[') {
        if offset < resume_at {
            continue;
        }

        let mut stream = serde_json::Deserializer::from_str(&text[offset..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(elements))) if !elements.is_empty() => return Ok(elements),
            Some(Ok(_)) => resume_at = offset + stream.byte_offset(),
            Some(Err(err)) => match region_len(&text[offset..]) {
                Some(len) => resume_at = offset + len,
                None => {
                    return Err(
                        whole_error.unwrap_or_else(|| ParseError::Malformed(err.to_string()))
                    );
                }
            },
            None => break,
        }
    }

    Err(whole_error.unwrap_or(ParseError::NotAnArray))
}

/// Byte length of the bracketed region opening at the start of `text`,
/// skipping brackets inside string literals. `None` if it never closes.
fn region_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn validate_element(index: usize, element: &Value) -> Result<RiskRecord, ParseError> {
    let object = element
        .as_object()
        .ok_or(ParseError::NotAnObject { index })?;

    let severity_label = required_text(object, index, "rank", SEVERITY_KEYS)?;
    let severity =
        Severity::from_label(severity_label).ok_or_else(|| ParseError::UnknownSeverity {
            index,
            value: severity_label.to_string(),
        })?;

    Ok(RiskRecord {
        severity,
        title: required_text(object, index, "title", TITLE_KEYS)?.to_string(),
        description: required_text(object, index, "description", DESCRIPTION_KEYS)?.to_string(),
        recommended_action: required_text(object, index, "action", ACTION_KEYS)?.to_string(),
    })
}

fn required_text<'a>(
    object: &'a Map<String, Value>,
    index: usize,
    field: &'static str,
    keys: &[&str],
) -> Result<&'a str, ParseError> {
    let value = keys
        .iter()
        .find_map(|key| object.get(*key).filter(|v| !v.is_null()))
        .ok_or(ParseError::MissingField { index, field })?;

    let text = value
        .as_str()
        .ok_or(ParseError::InvalidField { index, field })?;

    if text.trim().is_empty() {
        return Err(ParseError::EmptyField { index, field });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FINDINGS: &str = r#"[
        {"rank": "高", "title": "Unlimited liability", "description": "No cap on damages.", "action": "Cap at 12 months of fees."},
        {"rank": "中", "title": "Auto renewal", "description": "Three month notice window.", "action": "Shorten to one month."}
    ]"#;

    #[test]
    fn test_parse_plain_array_preserves_order_and_values() {
        let records = parse(TWO_FINDINGS).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::High);
        assert_eq!(records[0].title, "Unlimited liability");
        assert_eq!(records[0].description, "No cap on damages.");
        assert_eq!(records[0].recommended_action, "Cap at 12 months of fees.");
        assert_eq!(records[1].severity, Severity::Medium);
        assert_eq!(records[1].title, "Auto renewal");
    }

    #[test]
    fn test_parse_strips_json_fence() {
        let fenced = format!("```json\n{TWO_FINDINGS}\n```");
        assert_eq!(parse(&fenced).unwrap(), parse(TWO_FINDINGS).unwrap());
    }

    #[test]
    fn test_parse_strips_bare_fence_and_whitespace() {
        let fenced = format!("\n\n```\n{TWO_FINDINGS}\n```\n  ");
        assert_eq!(parse(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_ignores_surrounding_prose() {
        let wrapped = format!("Here is the review you asked for:\n{TWO_FINDINGS}\nLet me know [if needed].");
        let records = parse(&wrapped).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].recommended_action, "Shorten to one month.");
    }

    #[test]
    fn test_parse_skips_bracketed_prose_before_payload() {
        let wrapped = format!("Findings [draft]:\n{TWO_FINDINGS}");
        assert_eq!(parse(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_accepts_english_field_names() {
        let raw = r#"[{"severity": "Low", "title": "t", "description": "d", "recommendedAction": "a"}]"#;
        let records = parse(raw).unwrap();
        assert_eq!(records[0].severity, Severity::Low);
        assert_eq!(records[0].recommended_action, "a");
    }

    #[test]
    fn test_parse_empty_array_is_valid_zero_findings() {
        assert_eq!(parse("[]").unwrap(), Vec::new());
        assert_eq!(parse("```json\n[]\n```").unwrap(), Vec::new());
    }

    #[test]
    fn test_parse_rejects_empty_payload() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_object_payload() {
        let result = parse(r#"{"rank": "高", "title": "t"}"#);
        assert_eq!(result, Err(ParseError::NotAnArray));
    }

    #[test]
    fn test_parse_rejects_truncated_array() {
        let result = parse(r#"[{"rank": "高", "title": "t", "description": "d", "action": "a"}, {"rank": ]"#);
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_field_without_partial_result() {
        let raw = r#"[
            {"rank": "高", "title": "ok", "description": "d", "action": "a"},
            {"rank": "低", "title": "missing action", "description": "d"}
        ]"#;
        assert_eq!(
            parse(raw),
            Err(ParseError::MissingField {
                index: 1,
                field: "action"
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_severity() {
        let raw = r#"[{"rank": "Critical", "title": "t", "description": "d", "action": "a"}]"#;
        assert_eq!(
            parse(raw),
            Err(ParseError::UnknownSeverity {
                index: 0,
                value: "Critical".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_blank_and_null_fields() {
        let blank = r#"[{"rank": "高", "title": "  ", "description": "d", "action": "a"}]"#;
        assert_eq!(
            parse(blank),
            Err(ParseError::EmptyField {
                index: 0,
                field: "title"
            })
        );

        let null = r#"[{"rank": "高", "title": "t", "description": null, "action": "a"}]"#;
        assert_eq!(
            parse(null),
            Err(ParseError::MissingField {
                index: 0,
                field: "description"
            })
        );
    }

    #[test]
    fn test_parse_rejects_non_object_and_non_text_elements() {
        assert_eq!(parse(r#"["just text"]"#), Err(ParseError::NotAnObject { index: 0 }));

        let numeric = r#"[{"rank": "高", "title": 7, "description": "d", "action": "a"}]"#;
        assert_eq!(
            parse(numeric),
            Err(ParseError::InvalidField {
                index: 0,
                field: "title"
            })
        );
    }

    #[test]
    fn test_parse_rejects_truncated_array_quoting_brackets() {
        let raw = r#"[{"rank": "高", "title": "t", "description": "blank field [] in clause 4", "action": "a"}, {"rank": ]"#;
        assert!(matches!(parse(raw), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_skips_empty_brackets_in_prose() {
        let raw = r#"Sections with issues: []
[{"rank": "低", "title": "Governing law", "description": "Foreign venue.", "action": "Use local courts."}]"#;
        let records = parse(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Governing law");
    }

    #[test]
    fn test_parse_rejects_empty_brackets_before_unterminated_payload() {
        let raw = r#"Sections with issues: []
[{"rank": "高", "title": "t", "description": "d""#;
        assert!(matches!(parse(raw), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_several_empty_arrays() {
        assert!(matches!(parse("[] and []"), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_region_len_ignores_quoted_brackets() {
        assert_eq!(region_len(r#"[{"a": "]"}] tail"#), Some(12));
        assert_eq!(region_len(r#"["\"]"] x"#), Some(7));
        assert_eq!(region_len("[draft"), None);
    }

    #[test]
    fn test_strip_decoration() {
        assert_eq!(strip_decoration("```json\n[1]\n```"), Some("[1]"));
        assert_eq!(strip_decoration("no array here"), None);
        assert_eq!(strip_decoration("] backwards ["), None);
    }
}
