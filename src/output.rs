//! @ai:module:intent Format lookup results for standard output
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_result, render_result, is_empty_result, NO_RESULT
//! @ai:module:stateless true

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Printed instead of JSON when the service returns nothing.
pub const NO_RESULT: &str = "No result";

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[default]
    JsonPretty,
}

/// @ai:intent Render a result as JSON with sorted object keys
/// @ai:effects pure
pub fn format_result(value: &Value, format: OutputFormat) -> String {
    let value = sort_keys(value);
    match format {
        OutputFormat::Json => serde_json::to_string(&value).unwrap_or_default(),
        OutputFormat::JsonPretty => to_pretty_json(&value),
    }
}

/// @ai:intent Text printed for a result: formatted JSON, or NO_RESULT when empty
/// @ai:effects pure
pub fn render_result(value: &Value, format: OutputFormat) -> String {
    if is_empty_result(value) {
        NO_RESULT.to_string()
    } else {
        format_result(value, format)
    }
}

/// Key order must not depend on whether serde_json preserves insertion order.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Four-space indentation.
fn to_pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// @ai:intent Whether a result carries nothing worth printing
/// @ai:effects pure
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_pretty_uses_four_spaces_and_sorted_keys() {
        let value = json!({"pos": 1, "chromosome": "chr3"});
        let text = format_result(&value, OutputFormat::JsonPretty);
        assert_eq!(text, "{\n    \"chromosome\": \"chr3\",\n    \"pos\": 1\n}");
    }

    #[test]
    fn test_compact_is_single_line() {
        let value = json!([{"a": 1}, [{"b": 2}]]);
        assert_eq!(format_result(&value, OutputFormat::Json), "[{\"a\":1},[{\"b\":2}]]");
    }

    #[test]
    fn test_render_result() {
        assert_eq!(render_result(&json!([]), OutputFormat::JsonPretty), NO_RESULT);
        assert_eq!(render_result(&json!({"a": 1}), OutputFormat::Json), "{\"a\":1}");
    }

    #[test]
    fn test_empty_results() {
        assert!(is_empty_result(&Value::Null));
        assert!(is_empty_result(&json!([])));
        assert!(is_empty_result(&json!({})));
        assert!(is_empty_result(&json!("")));
        assert!(!is_empty_result(&json!({"chromosome": "chr3"})));
        assert!(!is_empty_result(&json!(0)));
    }
}
