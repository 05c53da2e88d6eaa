//! The media-type registry referenced by the Request Decoder (body parsing,
//! §4.1) and the `.http` transcoder (content-type validation, §4.7).
//!
//! The registry's only job is answering "is this content-type binary" and
//! "is this a known content-type at all". It does not classify by extension;
//! everything keys off the MIME essence string.

use mime::Mime;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Parse a `Content-Type` header value into a [`Mime`], ignoring parameters.
///
/// This is a syntax parse only — it accepts any well-formed `type/subtype`,
/// known or not. The Request Decoder uses it to classify an *inbound*
/// body (§4.1), where an unrecognized-but-well-formed content-type is still
/// handled (as binary, see [`is_binary`]). Callers that need to reject an
/// *unknown* content-type outright (the `.http` transcoder, §4.7) must go
/// through [`lookup_known`] instead.
pub fn parse(content_type: &str) -> Option<Mime> {
    content_type.parse::<Mime>().ok()
}

/// The finite set of content-types the `.http` transcoder recognizes, keyed
/// by essence string (`type/subtype`, parameters stripped). Anything outside
/// this set is "unknown" per §4.7 step 3, even if it is a syntactically
/// well-formed MIME type — `xyz/bar` parses fine but is not a content-type
/// this gateway knows how to serve.
static KNOWN_CONTENT_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "text/plain",
        "text/html",
        "text/css",
        "text/csv",
        "text/xml",
        "application/json",
        "application/xml",
        "application/javascript",
        "application/x-www-form-urlencoded",
        "application/octet-stream",
        "application/pdf",
        "application/zip",
        "image/png",
        "image/jpeg",
        "image/gif",
        "image/svg+xml",
        "image/webp",
        "audio/mpeg",
        "audio/wav",
        "video/mp4",
        "video/webm",
        "multipart/form-data",
    ]
    .into_iter()
    .collect()
});

/// Parse `content_type` and look it up against the finite
/// [`KNOWN_CONTENT_TYPES`] registry. Returns `None` both for malformed MIME
/// syntax and for well-formed but unrecognized types — the `.http`
/// transcoder treats both cases identically as "http unknown content type".
pub fn lookup_known(content_type: &str) -> Option<Mime> {
    let mime = parse(content_type)?;
    if KNOWN_CONTENT_TYPES.contains(mime.essence_str()) {
        Some(mime)
    } else {
        None
    }
}

/// Subtypes under `application/` that are treated as text despite not being
/// under the `text/` top-level type.
static TEXTUAL_APPLICATION_SUBTYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "json",
        "xml",
        "x-www-form-urlencoded",
        "javascript",
        "ecmascript",
        "x-yaml",
        "yaml",
        "graphql",
        "ld+json",
    ]
    .into_iter()
    .collect()
});

/// Whether a content-type's body should be treated as binary (base64-encoded)
/// rather than a UTF-8 string, per §4.1's "binary per the media-type
/// registry" rule and §4.7's `.http` body decoding rule.
///
/// `text/*` and a fixed set of textual `application/*` subtypes (including
/// any `+json`/`+xml` structured-syntax suffix) are non-binary; everything
/// else — images, audio, octet-stream, unknown types — is binary.
pub fn is_binary(mime: &Mime) -> bool {
    if mime.type_() == mime::TEXT {
        return false;
    }
    if mime.type_() == mime::APPLICATION {
        let subtype = mime.subtype().as_str();
        if TEXTUAL_APPLICATION_SUBTYPES.contains(subtype) {
            return false;
        }
        if let Some(suffix) = mime.suffix() {
            if suffix == mime::JSON || suffix == mime::XML {
                return false;
            }
        }
    }
    true
}

/// The content-type applied to an `.http` response when none is specified.
pub const DEFAULT_HTTP_CONTENT_TYPE: &str = "text/html";
