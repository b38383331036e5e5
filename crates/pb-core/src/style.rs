//! Generic presentation hooks carried by every node: `className` and
//! `styleJson`.

use crate::model::Props;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat CSS property → value map. Ordered so output is deterministic.
pub type StyleMap = BTreeMap<String, String>;

/// The two universal props, resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub class_name: Option<String>,
    pub style: StyleMap,
}

impl Presentation {
    pub fn from_props(props: &Props) -> Self {
        let class_name = props
            .get("className")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let style = props
            .get("styleJson")
            .and_then(Value::as_str)
            .map(parse_style_json)
            .unwrap_or_default();
        Self { class_name, style }
    }
}

/// Parse a `styleJson` string into a flat style map.
///
/// Never fails: malformed JSON or a non-object document yields an empty
/// map. Strings are kept, numbers and booleans are stringified, nested
/// values and `null` are dropped. Keys are CSS property names; camelCase
/// keys as written for the canvas (`backgroundColor`) are converted.
pub fn parse_style_json(raw: &str) -> StyleMap {
    if raw.trim().is_empty() {
        return StyleMap::new();
    }
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::debug!("styleJson is not an object, ignoring");
            return StyleMap::new();
        }
        Err(err) => {
            log::debug!("styleJson is not valid JSON ({err}), ignoring");
            return StyleMap::new();
        }
    };

    parsed
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((css_property(&key), value))
        })
        .collect()
}

/// `backgroundColor` → `background-color`, `WebkitTransition` →
/// `-webkit-transition`, `msTransform` → `-ms-transform`. Keys that are
/// already kebab-case and custom properties (`--accent`) pass through.
pub fn css_property(key: &str) -> String {
    if key.starts_with("--") || !key.chars().any(|c| c.is_ascii_uppercase()) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    let bytes = key.as_bytes();
    if key.starts_with("ms") && bytes.get(2).is_some_and(u8::is_ascii_uppercase) {
        out.push('-');
    }
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a `styleJson` string parses as a JSON object (for diagnostics).
pub fn is_valid_style_json(raw: &str) -> bool {
    raw.trim().is_empty() || matches!(serde_json::from_str::<Value>(raw), Ok(Value::Object(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_flat_object() {
        let style = parse_style_json(r#"{"color":"red","opacity":0.5,"hidden":false}"#);
        assert_eq!(style.get("color").map(String::as_str), Some("red"));
        assert_eq!(style.get("opacity").map(String::as_str), Some("0.5"));
        assert_eq!(style.get("hidden").map(String::as_str), Some("false"));
    }

    #[test]
    fn malformed_json_degrades_to_empty() {
        assert!(parse_style_json("{not valid json").is_empty());
        assert!(parse_style_json("[1,2]").is_empty());
        assert!(parse_style_json("").is_empty());
    }

    #[test]
    fn nested_values_are_dropped() {
        let style = parse_style_json(r#"{"a":{"b":1},"c":[1],"d":null,"e":"ok"}"#);
        assert_eq!(style.len(), 1);
        assert!(style.contains_key("e"));
    }

    #[test]
    fn camel_case_keys_become_css_properties() {
        let style = parse_style_json(
            r##"{"backgroundColor":"#fff","borderTopLeftRadius":"4px","font-size":"12px","--accent":"red"}"##,
        );
        let keys: Vec<&str> = style.keys().map(String::as_str).collect();
        assert_eq!(keys, ["--accent", "background-color", "border-top-left-radius", "font-size"]);
        assert_eq!(css_property("WebkitTransition"), "-webkit-transition");
        assert_eq!(css_property("msTransform"), "-ms-transform");
        assert_eq!(css_property("color"), "color");
    }

    #[test]
    fn presentation_from_props() {
        let props = json!({"className": "  hero  ", "styleJson": "{\"margin\":\"0 auto\"}"});
        let p = Presentation::from_props(props.as_object().unwrap());
        assert_eq!(p.class_name.as_deref(), Some("hero"));
        assert_eq!(p.style.get("margin").map(String::as_str), Some("0 auto"));
    }

    #[test]
    fn blank_class_name_is_absent() {
        let props = json!({"className": "   "});
        assert_eq!(Presentation::from_props(props.as_object().unwrap()).class_name, None);
    }

    #[test]
    fn validity_check_matches_parser() {
        assert!(is_valid_style_json(r#"{"a":"b"}"#));
        assert!(is_valid_style_json(""));
        assert!(!is_valid_style_json("{oops"));
        assert!(!is_valid_style_json("42"));
    }
}
