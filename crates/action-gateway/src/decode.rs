//! Request Decoder & Context Builder (§4.1).
//!
//! Parses the web action URL into a [`RouteMatch`], parses the entity body
//! per `Content-Type`, and assembles an [`InvocationContext`]. Runs before
//! any store is consulted — a malformed URL or oversized body never reaches
//! Identity Lookup.

use crate::error::{GatewayError, GatewayResult};
use crate::media;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gateway_kernel::gateway::{HttpMethod, InvocationContext, MediaExtension};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Entity names (namespace, non-default package, action) must match this
/// pattern: an alphanumeric, `_`, `.`, or `-` run, not starting with a dot,
/// between 1 and 256 characters. Mirrors the entity-name constraints common
/// to namespace/package/action identifiers — single-character names (e.g.
/// the `ns` namespace used throughout §8's concrete scenarios) are valid.
static ENTITY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]{0,255}$").unwrap());

fn validate_entity_name(segment: &str) -> GatewayResult<()> {
    if ENTITY_NAME.is_match(segment) {
        Ok(())
    } else {
        Err(GatewayError::LookupMissing(format!(
            "invalid entity name: {segment}"
        )))
    }
}

/// Fully decoded URL addressing: namespace/package/action plus the media
/// extension and the projection-path tail.
#[derive(Debug, Clone)]
pub struct DecodedRoute {
    pub namespace: String,
    pub package: String,
    pub action: String,
    pub extension: MediaExtension,
    pub projection_path: Vec<String>,
}

/// Split the `web/` tail of the route into namespace/package/action segments
/// and the remaining projection-path segments.
///
/// `tail` is everything after `.../web/`, e.g.
/// `guest/default/hello.json/msg`.
fn split_tail(tail: &str) -> GatewayResult<(&str, &str, &str, Vec<&str>)> {
    let mut segments = tail.split('/').filter(|s| !s.is_empty());
    let namespace = segments
        .next()
        .ok_or_else(|| GatewayError::LookupMissing("missing namespace segment".into()))?;
    let package = segments
        .next()
        .ok_or_else(|| GatewayError::LookupMissing("missing package segment".into()))?;
    let action_segment = segments
        .next()
        .ok_or_else(|| GatewayError::LookupMissing("missing action segment".into()))?;
    let rest: Vec<&str> = segments.collect();
    Ok((namespace, package, action_segment, rest))
}

/// Split an action segment into its base name and recognized extension, via
/// longest-suffix match against the known extension table (§9: match is
/// case-insensitive, the table itself is lowercase).
fn split_action_extension(action_segment: &str, enforce_extension: bool) -> GatewayResult<(String, MediaExtension)> {
    for ext in MediaExtension::ALL {
        let suffix = format!(".{}", ext.as_str());
        if action_segment.len() > suffix.len()
            && action_segment
                .to_ascii_lowercase()
                .ends_with(&suffix.to_ascii_lowercase())
        {
            let base = &action_segment[..action_segment.len() - suffix.len()];
            return Ok((base.to_string(), ext));
        }
    }
    if enforce_extension {
        Err(GatewayError::MediaUnsupported)
    } else {
        Ok((action_segment.to_string(), MediaExtension::default_when_unenforced()))
    }
}

/// Decode the `web/`-relative tail of a request path into a [`DecodedRoute`].
pub fn decode_route(tail: &str, enforce_extension: bool) -> GatewayResult<DecodedRoute> {
    let (namespace, package, action_segment, rest) = split_tail(tail)?;

    validate_entity_name(namespace)?;
    if package != gateway_kernel::gateway::DEFAULT_PACKAGE {
        validate_entity_name(package)?;
    }

    let (action_base, extension) = split_action_extension(action_segment, enforce_extension)?;
    validate_entity_name(&action_base)?;

    Ok(DecodedRoute {
        namespace: namespace.to_string(),
        package: package.to_string(),
        action: action_base,
        extension,
        projection_path: rest.into_iter().map(str::to_string).collect(),
    })
}

/// Parse a request entity body into an optional JSON value, per §4.1's
/// content-type rules, and enforce the configured entity size limit.
pub fn decode_body(
    content_type: Option<&str>,
    body: &[u8],
    entity_size_limit_bytes: usize,
) -> GatewayResult<Option<Value>> {
    if body.len() > entity_size_limit_bytes {
        return Err(GatewayError::EntityTooLarge);
    }
    if body.is_empty() {
        return Ok(None);
    }

    let content_type = content_type.unwrap_or("application/octet-stream");
    let mime = media::parse(content_type);

    match mime.as_ref().map(|m| (m.type_(), m.subtype())) {
        Some((mime::APPLICATION, mime::JSON)) => {
            let value: Value = serde_json::from_slice(body)
                .map_err(|e| GatewayError::BadInput(format!("invalid json body: {e}")))?;
            if !value.is_object() {
                return Err(GatewayError::BadInput(
                    "json body must be an object".to_string(),
                ));
            }
            Ok(Some(value))
        }
        Some((mime::APPLICATION, mime::WWW_FORM_URLENCODED)) => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
                .map_err(|e| GatewayError::BadInput(format!("invalid form body: {e}")))?;
            let mut map = Map::new();
            for (k, v) in pairs {
                map.insert(k, Value::String(v));
            }
            Ok(Some(Value::Object(map)))
        }
        _ => {
            let is_binary = mime.as_ref().map(media::is_binary).unwrap_or(true);
            if is_binary {
                Ok(Some(Value::String(BASE64.encode(body))))
            } else {
                let text = String::from_utf8(body.to_vec())
                    .map_err(|e| GatewayError::BadInput(format!("body is not valid utf-8: {e}")))?;
                Ok(Some(Value::String(text)))
            }
        }
    }
}

/// Assemble an [`InvocationContext`] from a decoded route, raw query
/// string, parsed body, and caller identity.
pub fn build_context(
    method: HttpMethod,
    headers: Vec<(String, String)>,
    route: &DecodedRoute,
    query: HashMap<String, String>,
    body: Option<Value>,
    on_behalf_of: Option<String>,
) -> InvocationContext {
    let mut ctx = InvocationContext::new(method, route.extension);
    ctx.headers = headers;
    ctx.path = route.projection_path.join("/");
    ctx.query = query;
    ctx.body = body;
    ctx.on_behalf_of = on_behalf_of;
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_default_package_route_with_known_extension() {
        let route = decode_route("guest/default/hello.json", false).unwrap();
        assert_eq!(route.namespace, "guest");
        assert_eq!(route.package, "default");
        assert_eq!(route.action, "hello");
        assert!(matches!(route.extension, MediaExtension::Json));
        assert!(route.projection_path.is_empty());
    }

    #[test]
    fn decodes_projection_path_tail() {
        let route = decode_route("guest/default/hello.text/msg/nested", false).unwrap();
        assert_eq!(route.projection_path, vec!["msg", "nested"]);
    }

    #[test]
    fn unknown_extension_defaults_to_http_when_not_enforced() {
        let route = decode_route("guest/default/hello", false).unwrap();
        assert!(matches!(route.extension, MediaExtension::Http));
        assert_eq!(route.action, "hello");
    }

    #[test]
    fn missing_extension_is_rejected_when_enforced() {
        let err = decode_route("guest/default/hello", true).unwrap_err();
        assert!(matches!(err, GatewayError::MediaUnsupported));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let route = decode_route("guest/default/hello.JSON", false).unwrap();
        assert!(matches!(route.extension, MediaExtension::Json));
        assert_eq!(route.action, "hello");
    }

    #[test]
    fn invalid_namespace_segment_is_rejected() {
        let err = decode_route("a!b/default/hello.json", false).unwrap_err();
        assert!(matches!(err, GatewayError::LookupMissing(_)));
    }

    #[test]
    fn missing_action_segment_is_rejected() {
        let err = decode_route("guest/default", false).unwrap_err();
        assert!(matches!(err, GatewayError::LookupMissing(_)));
    }

    #[test]
    fn json_body_must_be_object() {
        let err = decode_body(Some("application/json"), b"[1,2,3]", 1024).unwrap_err();
        assert!(matches!(err, GatewayError::BadInput(_)));
    }

    #[test]
    fn json_body_parses_into_object() {
        let value = decode_body(Some("application/json"), br#"{"x":1}"#, 1024)
            .unwrap()
            .unwrap();
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn form_body_wraps_into_json_object() {
        let value = decode_body(Some("application/x-www-form-urlencoded"), b"x=1&y=two", 1024)
            .unwrap()
            .unwrap();
        assert_eq!(value["x"], "1");
        assert_eq!(value["y"], "two");
    }

    #[test]
    fn plain_text_body_becomes_json_string() {
        let value = decode_body(Some("text/plain"), b"hello", 1024).unwrap().unwrap();
        assert_eq!(value, Value::String("hello".to_string()));
    }

    #[test]
    fn binary_body_becomes_base64_json_string() {
        let value = decode_body(Some("application/octet-stream"), &[0xff, 0x00, 0x10], 1024)
            .unwrap()
            .unwrap();
        assert_eq!(value, Value::String(BASE64.encode([0xff, 0x00, 0x10])));
    }

    #[test]
    fn empty_body_is_none() {
        assert_eq!(decode_body(Some("application/json"), b"", 1024).unwrap(), None);
    }

    #[test]
    fn oversized_body_is_rejected() {
        let err = decode_body(Some("text/plain"), b"abcdef", 3).unwrap_err();
        assert!(matches!(err, GatewayError::EntityTooLarge));
    }

    #[test]
    fn body_exactly_at_limit_is_accepted() {
        assert!(decode_body(Some("text/plain"), b"abc", 3).is_ok());
    }
}
