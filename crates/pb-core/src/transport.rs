//! Render-link transport: a schema travels as base64 of its UTF-8 JSON in a
//! single URL query parameter.
//!
//! Links get mangled in transit (form decoding turns `+` into a space, some
//! hosts re-encode with the URL-safe alphabet or drop padding), so decoding
//! accepts all of those. The decoded JSON then goes through the normalizer;
//! only transport-level failures surface as [`DecodeError`].

use crate::error::DecodeError;
use crate::id::IdGenerator;
use crate::model::PageSchema;
use crate::normalize::normalize;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use url::Url;

/// Query parameter carrying the schema unless configured otherwise.
pub const DEFAULT_SCHEMA_PARAM: &str = "schema";

/// Standard, padded base64 of the schema's JSON.
#[must_use]
pub fn encode_schema(schema: &PageSchema) -> String {
    STANDARD.encode(schema.to_json())
}

/// Raw bytes of an encoded parameter, tolerating transport damage.
///
/// # Errors
/// Fails when the text is not base64 in either alphabet.
pub fn decode_param_bytes(param: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = param
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    let unpadded = cleaned.trim_end_matches('=');
    if unpadded.contains(['-', '_']) {
        URL_SAFE_NO_PAD.decode(unpadded)
    } else {
        STANDARD_NO_PAD.decode(unpadded)
    }
}

/// Decode an encoded parameter value into a normalized schema.
///
/// # Errors
/// Fails on bad base64, bad UTF-8 or text that is not JSON. Any JSON value
/// is accepted and normalized.
pub fn decode_schema_param(
    param: &str,
    ids: &mut dyn IdGenerator,
) -> Result<PageSchema, DecodeError> {
    let bytes = decode_param_bytes(param)?;
    let text = String::from_utf8(bytes)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Ok(normalize(&value, ids))
}

/// Find `param` in a query string (leading `?` optional) and decode it.
///
/// # Errors
/// [`DecodeError::MissingParameter`] when the parameter is absent or empty,
/// otherwise as [`decode_schema_param`].
pub fn schema_from_query(
    query: &str,
    param: &str,
    ids: &mut dyn IdGenerator,
) -> Result<PageSchema, DecodeError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let value = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| DecodeError::MissingParameter {
            param: param.to_string(),
        })?;
    decode_schema_param(&value, ids)
}

/// Build a render URL for `schema` on top of `base_url`, replacing any
/// existing `param` and keeping every other query pair.
///
/// # Errors
/// Fails when `base_url` is not an absolute URL.
pub fn render_link(base_url: &str, schema: &PageSchema, param: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(param, &encode_schema(schema));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{NodeId, SequentialIdGenerator};
    use crate::model::{ComponentNode, ComponentType, Edge, Position};
    use pretty_assertions::assert_eq;

    fn sample() -> PageSchema {
        let section = ComponentNode::new(NodeId::intern("s1"), ComponentType::Section, Position::default())
            .with_label("Héro ✨");
        let edge = Edge::to_preview(NodeId::intern("e1"), section.id);
        PageSchema {
            title: Some("Beranda".into()),
            nodes: vec![section],
            edges: vec![edge],
        }
    }

    fn ids() -> SequentialIdGenerator {
        SequentialIdGenerator::new()
    }

    #[test]
    fn encoded_schema_decodes_to_itself() {
        let schema = sample();
        let decoded = decode_schema_param(&encode_schema(&schema), &mut ids()).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn tolerates_plus_mangling_and_url_safe_alphabet() {
        let schema = sample();
        let encoded = encode_schema(&schema);
        let mangled = encoded.replace('+', " ");
        assert_eq!(decode_schema_param(&mangled, &mut ids()).unwrap(), schema);

        let url_safe = URL_SAFE_NO_PAD.encode(schema.to_json());
        assert_eq!(decode_schema_param(&url_safe, &mut ids()).unwrap(), schema);
    }

    #[test]
    fn bad_input_reports_the_failing_layer() {
        assert!(matches!(
            decode_schema_param("%%%not base64%%%", &mut ids()),
            Err(DecodeError::Base64(_))
        ));
        let not_utf8 = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_schema_param(&not_utf8, &mut ids()),
            Err(DecodeError::Utf8(_))
        ));
        let not_json = STANDARD.encode("{oops");
        assert!(matches!(
            decode_schema_param(&not_json, &mut ids()),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn valid_json_of_any_shape_is_normalized() {
        let encoded = STANDARD.encode("{}");
        let schema = decode_schema_param(&encoded, &mut ids()).unwrap();
        schema.validate().unwrap();
    }

    #[test]
    fn link_round_trips_through_query() {
        let schema = sample();
        let url = render_link("https://cms.example.com/render?theme=dark", &schema, DEFAULT_SCHEMA_PARAM)
            .unwrap();
        assert_eq!(url.path(), "/render");
        assert!(url.query_pairs().any(|(k, v)| k == "theme" && v == "dark"));

        let query = url.query().unwrap_or_default();
        let decoded = schema_from_query(query, DEFAULT_SCHEMA_PARAM, &mut ids()).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn link_replaces_existing_schema_param() {
        let url = render_link("https://x.test/r?schema=old", &sample(), "schema").unwrap();
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "schema").count(), 1);
    }

    #[test]
    fn missing_parameter_is_reported() {
        let err = schema_from_query("?other=1", "schema", &mut ids()).unwrap_err();
        assert_eq!(err.to_string(), "missing `schema` query parameter");
        assert!(matches!(
            schema_from_query("schema=", "schema", &mut ids()),
            Err(DecodeError::MissingParameter { .. })
        ));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(render_link("/render", &sample(), "schema").is_err());
    }
}
