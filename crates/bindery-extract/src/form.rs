//! Form body and query string decoding into ordered key/value pairs.

use crate::config::MultipartConfig;
use crate::HttpError;
use bytes::Bytes;
use futures_util::FutureExt;
use std::io;

/// Form encodings the binder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormKind {
    UrlEncoded,
    Multipart,
}

impl FormKind {
    pub(crate) fn of(content_type: &mime::Mime) -> Option<Self> {
        if content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            Some(Self::UrlEncoded)
        } else if content_type.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
            Some(Self::Multipart)
        } else {
            None
        }
    }
}

/// Decodes `a=1&b=2&a=3` into pairs, keeping order and repeats.
pub(crate) fn parse_urlencoded(input: &[u8]) -> Result<Vec<(String, String)>, HttpError> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)
        .map_err(|e| HttpError::bad_request(format!("failed to parse url-encoded data: {e}")))
}

/// Reads the text parts of a multipart body, in order. File parts are
/// skipped.
pub(crate) fn parse_multipart(
    content_type: &str,
    body: Bytes,
    config: &MultipartConfig,
) -> Result<Vec<(String, String)>, HttpError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        HttpError::bad_request("missing or invalid boundary in multipart Content-Type")
    })?;
    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().per_field(config.max_field_size as u64));
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    // The whole body is already buffered, so every future below is ready
    // on its first poll.
    let mut pairs = Vec::new();
    let mut field_count = 0;
    loop {
        let field = multipart
            .next_field()
            .now_or_never()
            .ok_or_else(incomplete)?
            .map_err(|e| multipart_error(&e, config))?;
        let Some(field) = field else {
            break;
        };
        field_count += 1;
        if field_count > config.max_fields {
            return Err(HttpError::bad_request(format!(
                "too many fields (max {})",
                config.max_fields
            )));
        }
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field
            .text()
            .now_or_never()
            .ok_or_else(incomplete)?
            .map_err(|e| multipart_error(&e, config))?;
        pairs.push((name, text));
    }
    Ok(pairs)
}

fn incomplete() -> HttpError {
    HttpError::bad_request("incomplete multipart body")
}

fn multipart_error(err: &multer::Error, config: &MultipartConfig) -> HttpError {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
            HttpError::new(
                crate::ErrorKind::PayloadTooLarge,
                format!(
                    "multipart field too large: max {} bytes",
                    config.max_field_size
                ),
            )
        }
        _ => HttpError::bad_request(format!("failed to parse multipart body: {err}")),
    }
}

/// Drops a trailing `[]` from a query key.
pub(crate) fn strip_array_suffix(key: &str) -> &str {
    key.strip_suffix("[]").unwrap_or(key)
}
