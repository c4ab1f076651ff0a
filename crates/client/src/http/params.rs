//! Query-parameter flattening and URL construction.
//!
//! The API expects nested filter objects in bracket notation:
//! `{"guestBreakdown": {"adults": 2}}` becomes `guestBreakdown[adults]=2`,
//! arrays index as `tags[0]=a`. Null leaves are dropped entirely. Keys that
//! already carry brackets (`"filters[type]"`) are leaf keys and pass
//! through unchanged.

use std::collections::BTreeMap;

use serde_json::Value;
use url::form_urlencoded;

/// Flatten a nested parameter object into bracket-notation key/value pairs.
pub fn flatten(params: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into(&mut out, "", params);
    out
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: &str, value: &Value) {
    match value {
        // Null leaves must not appear in the output at all.
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let child_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}[{key}]")
                };
                flatten_into(out, &child_prefix, child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(out, &format!("{prefix}[{index}]"), child);
            }
        }
        Value::String(s) => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), s.clone());
            }
        }
        other => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), other.to_string());
            }
        }
    }
}

/// Build the form-urlencoded query string for a parameter object, or `None`
/// when flattening produced nothing.
pub fn build_query(params: &Value) -> Option<String> {
    let flat = flatten(params);
    if flat.is_empty() {
        return None;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &flat {
        serializer.append_pair(key, value);
    }
    Some(serializer.finish())
}

/// Concatenate base URL and path, appending the encoded query when present.
pub fn build_url(base: &str, path: &str, params: Option<&Value>) -> String {
    let mut url =
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    if let Some(query) = params.and_then(build_query) {
        url.push('?');
        url.push_str(&query);
    }
    url
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_nested_objects_into_bracket_keys() {
        let flat = flatten(&json!({"guestBreakdown": {"adults": 2, "children": 1}}));

        assert_eq!(flat.get("guestBreakdown[adults]").map(String::as_str), Some("2"));
        assert_eq!(flat.get("guestBreakdown[children]").map(String::as_str), Some("1"));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn flattens_arrays_with_indices() {
        let flat = flatten(&json!({"tags": ["a", "b"]}));

        assert_eq!(flat.get("tags[0]").map(String::as_str), Some("a"));
        assert_eq!(flat.get("tags[1]").map(String::as_str), Some("b"));
    }

    #[test]
    fn null_leaves_are_skipped_entirely() {
        let flat = flatten(&json!({"a": null, "c": 1}));

        assert!(!flat.contains_key("a"));
        assert_eq!(flat.get("c").map(String::as_str), Some("1"));
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn pre_bracketed_keys_pass_through_unchanged() {
        let flat = flatten(&json!({"filters[type]": "apartment"}));

        assert_eq!(flat.get("filters[type]").map(String::as_str), Some("apartment"));
    }

    #[test]
    fn deep_nesting_composes_brackets() {
        let flat = flatten(&json!({"a": {"b": ["x", "y"]}}));

        assert_eq!(flat.get("a[b][0]").map(String::as_str), Some("x"));
        assert_eq!(flat.get("a[b][1]").map(String::as_str), Some("y"));
    }

    #[test]
    fn booleans_and_numbers_coerce_to_strings() {
        let flat = flatten(&json!({"includeRooms": true, "limit": 25}));

        assert_eq!(flat.get("includeRooms").map(String::as_str), Some("true"));
        assert_eq!(flat.get("limit").map(String::as_str), Some("25"));
    }

    #[test]
    fn build_url_appends_encoded_query() {
        let url = build_url(
            "https://api.rentora.io",
            "/v2/properties",
            Some(&json!({"name": "Sea View", "limit": 10})),
        );

        assert_eq!(url, "https://api.rentora.io/v2/properties?limit=10&name=Sea+View");
    }

    #[test]
    fn build_url_without_params_has_no_question_mark() {
        let url = build_url("https://api.rentora.io/", "v2/properties", None);
        assert_eq!(url, "https://api.rentora.io/v2/properties");

        let url = build_url("https://api.rentora.io", "/v2/properties", Some(&json!({})));
        assert_eq!(url, "https://api.rentora.io/v2/properties");
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let url = build_url(
            "https://api.rentora.io",
            "/v2/properties",
            Some(&json!({"q": "beach&sun=fun"})),
        );

        assert_eq!(url, "https://api.rentora.io/v2/properties?q=beach%26sun%3Dfun");
    }
}
