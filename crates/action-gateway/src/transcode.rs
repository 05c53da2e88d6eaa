//! Invocation & Response Transcoder (§4.7).
//!
//! Projects the activation result into the field the caller asked for, folds
//! application errors into the same projection machinery, and renders the
//! projected value per the requested media extension's contract.

use crate::error::{GatewayError, GatewayResult};
use crate::media;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gateway_kernel::gateway::{Activation, ActivationStatus, MediaExtension, ERROR_FIELD};
use serde_json::Value;

/// A fully rendered HTTP response, ready to hand to the web framework.
pub struct RenderedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RenderedResponse {
    fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body,
        }
    }
}

/// Descend into `result` along `path`, left-associative (`/a/b/c` ≡
/// `V["a"]["b"]["c"]`). Returns `None` on a miss at any step.
fn project(result: &Value, path: &[String]) -> Option<Value> {
    let mut cursor = result.clone();
    for segment in path {
        cursor = cursor.get(segment)?.clone();
    }
    Some(cursor)
}

/// Render an [`Activation`] through the extension's transcoder, after
/// applying the error fold and projection per §4.7.
pub fn transcode(
    activation: &Activation,
    extension: MediaExtension,
    requested_projection_path: &[String],
) -> GatewayResult<RenderedResponse> {
    match activation.status {
        ActivationStatus::DeveloperError | ActivationStatus::SystemError => {
            return Err(GatewayError::BadInput("error processing request".to_string()));
        }
        _ => {}
    }

    let path: Vec<String> = if activation.status == ActivationStatus::ApplicationError {
        vec![ERROR_FIELD.to_string()]
    } else if extension.projection_allowed() && !requested_projection_path.is_empty() {
        requested_projection_path.to_vec()
    } else if let Some(default) = extension.default_projection() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    let projected = project(&activation.result, &path)
        .ok_or_else(|| GatewayError::LookupMissing("property not found".to_string()))?;

    match extension {
        MediaExtension::Json => render_json(&projected),
        MediaExtension::Text => render_text(&projected),
        MediaExtension::Html => render_html(&projected),
        MediaExtension::Svg => render_svg(&projected),
        MediaExtension::Http => render_http(&projected),
    }
}

fn render_json(v: &Value) -> GatewayResult<RenderedResponse> {
    if !v.is_object() && !v.is_array() {
        return Err(GatewayError::BadInput(
            "projected value is not an object or array".to_string(),
        ));
    }
    let body = serde_json::to_vec(v).map_err(|e| GatewayError::Internal(e.to_string()))?;
    Ok(RenderedResponse::new(200, "application/json", body))
}

/// `JsNull` renders as an empty body, not the literal string `"null"` —
/// picked to match `.json`'s treatment of an absent value and documented as
/// the chosen behavior for the otherwise-ambiguous §9 open point.
fn render_text(v: &Value) -> GatewayResult<RenderedResponse> {
    let text = match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(v).map_err(|e| GatewayError::Internal(e.to_string()))?
        }
    };
    Ok(RenderedResponse::new(200, "text/plain", text.into_bytes()))
}

fn render_html(v: &Value) -> GatewayResult<RenderedResponse> {
    match v {
        Value::String(s) => Ok(RenderedResponse::new(200, "text/html", s.clone().into_bytes())),
        _ => Err(GatewayError::BadInput("projected value is not a string".to_string())),
    }
}

fn render_svg(v: &Value) -> GatewayResult<RenderedResponse> {
    match v {
        Value::String(s) => Ok(RenderedResponse::new(200, "image/svg+xml", s.clone().into_bytes())),
        _ => Err(GatewayError::BadInput("projected value is not a string".to_string())),
    }
}

fn parse_http_status(obj: &serde_json::Map<String, Value>) -> GatewayResult<u16> {
    let raw = obj.get("statusCode").or_else(|| obj.get("code"));
    let Some(raw) = raw else {
        return Ok(200);
    };
    let code = raw
        .as_i64()
        .ok_or_else(|| GatewayError::BadInput("invalid status code".to_string()))?;
    if !(100..=599).contains(&code) {
        return Err(GatewayError::BadInput("invalid status code".to_string()));
    }
    Ok(code as u16)
}

fn parse_http_headers(obj: &serde_json::Map<String, Value>) -> GatewayResult<Vec<(String, String)>> {
    let Some(Value::Object(headers)) = obj.get("headers") else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(headers.len());
    for (k, v) in headers {
        let value = match v {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            _ => return Err(GatewayError::BadInput("invalid header value".to_string())),
        };
        out.push((k.to_lowercase(), value));
    }
    Ok(out)
}

fn render_http(v: &Value) -> GatewayResult<RenderedResponse> {
    let Value::Object(obj) = v else {
        return Err(GatewayError::BadInput("projected value is not an object".to_string()));
    };

    let status = parse_http_status(obj)?;
    let mut headers = parse_http_headers(obj)?;

    let content_type_str = headers
        .iter()
        .find(|(k, _)| k == "content-type")
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| media::DEFAULT_HTTP_CONTENT_TYPE.to_string());

    let content_type = media::lookup_known(&content_type_str)
        .ok_or_else(|| GatewayError::BadInput("http unknown content type".to_string()))?;

    if !headers.iter().any(|(k, _)| k == "content-type") {
        headers.push(("content-type".to_string(), content_type_str.clone()));
    }

    let body = match obj.get("body") {
        None => Vec::new(),
        Some(Value::String(s)) => {
            if media::is_binary(&content_type) {
                BASE64
                    .decode(s)
                    .map_err(|_| GatewayError::BadInput("invalid base64 body".to_string()))?
            } else {
                s.clone().into_bytes()
            }
        }
        Some(_) => return Err(GatewayError::BadInput("http body must be a string".to_string())),
    };

    Ok(RenderedResponse {
        status,
        headers,
        body,
    })
}
