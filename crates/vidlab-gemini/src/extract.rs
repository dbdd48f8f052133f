//! Tolerant extraction of structured reports from free-form model output.
//!
//! The model is asked for strict JSON but its adherence is unenforced: replies
//! arrive wrapped in markdown fences, as a bare object, as a JSON array, as a
//! numbered-products mapping, or as several standalone objects concatenated
//! without an enclosing array. Extraction tries the cheap whole-text parse
//! first and falls back to brace-balanced scanning. The result is always a
//! non-empty ordered list of mappings, or [`GeminiError::NoReports`].

use serde_json::{Map, Value};

use crate::error::GeminiError;

/// One report as produced by the model: an opaque JSON mapping.
pub type ReportPayload = Map<String, Value>;

/// Turns raw model text into an ordered list of report payloads.
///
/// # Errors
///
/// Returns [`GeminiError::NoReports`] when no mapping can be recovered.
pub fn extract_reports(raw: &str) -> Result<Vec<ReportPayload>, GeminiError> {
    let text = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        let reports = reports_from_value(value);
        if reports.is_empty() {
            return Err(GeminiError::NoReports);
        }
        return Ok(reports);
    }

    let reports = scan_balanced_objects(text);
    if reports.is_empty() {
        tracing::warn!(
            preview = text.chars().take(120).collect::<String>(),
            "model output yielded no parseable reports"
        );
        return Err(GeminiError::NoReports);
    }
    Ok(reports)
}

/// Removes exactly one optional leading fenced-code marker and one optional
/// trailing marker, each verbatim.
fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Normalizes one successfully parsed JSON value into a report list.
fn reports_from_value(value: Value) -> Vec<ReportPayload> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                other => {
                    tracing::warn!(kind = json_kind(&other), "skipping non-object array element");
                    None
                }
            })
            .collect(),
        Value::Object(map) => {
            if !map.is_empty() && map.keys().all(|k| is_all_digits(k)) {
                // Numbered-products convention: {"1": {...}, "2": {...}}.
                return sorted_object_values(&map);
            }
            if let Some(Value::Object(products)) = map.get("products") {
                let inner = sorted_object_values(products);
                if !inner.is_empty() {
                    return inner;
                }
            }
            vec![map]
        }
        other => {
            tracing::warn!(kind = json_kind(&other), "model output is not a report shape");
            Vec::new()
        }
    }
}

/// Returns the mapping's object values ordered by key, numerically when every
/// key is a decimal number and lexicographically otherwise.
fn sorted_object_values(map: &Map<String, Value>) -> Vec<ReportPayload> {
    let mut keys: Vec<&String> = map.keys().collect();
    if keys.iter().all(|k| is_all_digits(k)) {
        keys.sort_by_key(|k| k.parse::<u64>().unwrap_or(u64::MAX));
    } else {
        keys.sort();
    }

    keys.into_iter()
        .filter_map(|k| map.get(k).and_then(Value::as_object).cloned())
        .collect()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Fallback for concatenated standalone objects: scans left to right, parses
/// each brace-balanced span independently, and stops at the first span that
/// fails to parse. Text between spans is skipped.
fn scan_balanced_objects(text: &str) -> Vec<ReportPayload> {
    let bytes = text.as_bytes();
    let mut reports = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }

        let Some(end) = matching_brace(bytes, i) else {
            break;
        };
        match serde_json::from_str::<ReportPayload>(&text[i..=end]) {
            Ok(map) => {
                reports.push(map);
                i = end + 1;
            }
            Err(e) => {
                tracing::warn!(offset = i, error = %e, "unparseable span terminates report scan");
                break;
            }
        }
    }

    reports
}

/// Finds the index of the brace matching `bytes[start]` by depth counting,
/// or `None` when the span never closes.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn json_kind(value: &Value) -> &'static str {
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

    fn ids(reports: &[ReportPayload]) -> Vec<&str> {
        reports
            .iter()
            .map(|r| r.get("product_id").and_then(Value::as_str).unwrap_or("?"))
            .collect()
    }

    #[test]
    fn json_array_round_trips_in_order() {
        let raw = r#"[{"product_id": "A"}, {"product_id": "B"}]"#;
        let reports = extract_reports(raw).expect("array should extract");
        assert_eq!(ids(&reports), vec!["A", "B"]);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n[{\"product_id\": \"A\"}]\n```";
        let reports = extract_reports(raw).expect("fenced array should extract");
        assert_eq!(ids(&reports), vec!["A"]);
    }

    #[test]
    fn bare_fence_without_language_tag_is_unwrapped() {
        let raw = "```\n{\"product_id\": \"A\"}\n```";
        let reports = extract_reports(raw).expect("fenced object should extract");
        assert_eq!(ids(&reports), vec!["A"]);
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let raw = r#"{"product_id": "A", "product_info": {"verdict": "Pass"}}"#;
        let reports = extract_reports(raw).expect("object should extract");
        assert_eq!(ids(&reports), vec!["A"]);
    }

    #[test]
    fn numbered_products_mapping_sorts_numerically() {
        // Key order in the source is deliberately non-numeric: serde_json
        // preserves insertion order, so a naive iteration would yield 2,10,1.
        let raw = r#"{"2": {"product_id": "B"}, "10": {"product_id": "C"}, "1": {"product_id": "A"}}"#;
        let reports = extract_reports(raw).expect("numbered mapping should extract");
        assert_eq!(ids(&reports), vec!["A", "B", "C"]);
    }

    #[test]
    fn products_wrapper_mapping_is_unwrapped_sorted() {
        let raw = r#"{"products": {"2": {"product_id": "B"}, "1": {"product_id": "A"}}}"#;
        let reports = extract_reports(raw).expect("products mapping should extract");
        assert_eq!(ids(&reports), vec!["A", "B"]);
    }

    #[test]
    fn object_with_products_array_is_a_single_report() {
        // Only a mapping-valued `products` key triggers unwrapping.
        let raw = r#"{"products": [1, 2], "product_id": "A"}"#;
        let reports = extract_reports(raw).expect("should extract");
        assert_eq!(reports.len(), 1);
        assert_eq!(ids(&reports), vec!["A"]);
    }

    #[test]
    fn concatenated_objects_fall_back_to_brace_scan() {
        let raw = "{\"product_id\": \"A\"}\n{\"product_id\": \"B\"}";
        let reports = extract_reports(raw).expect("concatenated objects should extract");
        assert_eq!(ids(&reports), vec!["A", "B"]);
    }

    #[test]
    fn prose_between_objects_is_skipped() {
        let raw = "Here is the first product: {\"product_id\": \"A\"} and the second: {\"product_id\": \"B\"}.";
        let reports = extract_reports(raw).expect("objects in prose should extract");
        assert_eq!(ids(&reports), vec!["A", "B"]);
    }

    #[test]
    fn unparseable_span_terminates_the_scan() {
        let raw = "{\"product_id\": \"A\"} {not json} {\"product_id\": \"B\"}";
        let reports = extract_reports(raw).expect("first object should extract");
        assert_eq!(ids(&reports), vec!["A"], "scan must stop at the bad span");
    }

    #[test]
    fn unclosed_object_yields_whatever_parsed_before_it() {
        let raw = "{\"product_id\": \"A\"} {\"product_id\": \"B\"";
        let reports = extract_reports(raw).expect("first object should extract");
        assert_eq!(ids(&reports), vec!["A"]);
    }

    #[test]
    fn empty_input_is_no_reports() {
        assert!(matches!(extract_reports(""), Err(GeminiError::NoReports)));
        assert!(matches!(
            extract_reports("no json here"),
            Err(GeminiError::NoReports)
        ));
    }

    #[test]
    fn scalar_json_is_no_reports() {
        assert!(matches!(
            extract_reports("42"),
            Err(GeminiError::NoReports)
        ));
    }

    #[test]
    fn array_round_trip_preserves_payload_content() {
        let original = vec![
            json!({"product_id": "A", "basic_tests": {"protein": {"result": "Pass"}}}),
            json!({"product_id": "B", "product_info": {"verdict": "Fail"}}),
        ];
        let raw = serde_json::to_string(&original).expect("serializes");
        let reports = extract_reports(&raw).expect("round trip");
        let reparsed: Vec<Value> = reports.into_iter().map(Value::Object).collect();
        assert_eq!(reparsed, original);
    }
}
