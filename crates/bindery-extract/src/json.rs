//! JSON body decoding.

use crate::HttpError;
use bindery_core::Params;
use serde_json::error::Category;

/// Returns true for `application/json`, ignoring parameters.
pub(crate) fn is_json(content_type: &mime::Mime) -> bool {
    content_type.essence_str() == mime::APPLICATION_JSON.essence_str()
}

/// Decodes the first JSON value in `body` and merges it into `params`.
///
/// Anything after the first value is ignored.
pub(crate) fn decode_into<P: Params>(params: &mut P, body: &[u8]) -> Result<(), HttpError> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<P::Patch>();
    match values.next() {
        Some(Ok(patch)) => {
            params.apply_patch(patch);
            Ok(())
        }
        Some(Err(err)) => Err(decode_error(&err, body)),
        None => Err(HttpError::bad_request("EOF")),
    }
}

fn decode_error(err: &serde_json::Error, body: &[u8]) -> HttpError {
    let offset = byte_offset(body, err.line(), err.column());
    let text = err.to_string();
    let message = text
        .rsplit_once(" at line ")
        .map_or(text.as_str(), |(message, _)| message);
    match err.classify() {
        Category::Data => HttpError::bad_request(format!(
            "Unmarshal type error: {message}, offset={offset}"
        )),
        Category::Syntax | Category::Eof => HttpError::bad_request(format!(
            "Syntax error: offset={offset}, error={message}"
        )),
        Category::Io => HttpError::bad_request(message),
    }
}

// serde_json reports 1-based line and column; column 0 means the error
// sits before the first byte of the line.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line - 1)
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column).min(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        let json: mime::Mime = "application/json; charset=utf-8".parse().unwrap();
        let problem: mime::Mime = "application/problem+json".parse().unwrap();
        let xml: mime::Mime = "application/xml".parse().unwrap();
        assert!(is_json(&json));
        assert!(!is_json(&problem));
        assert!(!is_json(&xml));
    }

    #[test]
    fn test_byte_offset() {
        let body = b"{\n  \"a\": x\n}";
        assert_eq!(byte_offset(body, 1, 1), 1);
        assert_eq!(byte_offset(body, 2, 8), 10);
        assert_eq!(byte_offset(body, 9, 9), body.len());
        assert_eq!(byte_offset(body, 0, 0), 0);
    }

    #[test]
    fn test_error_messages() {
        let body = br#"{"a": "x"}"#;
        let err = serde_json::from_slice::<std::collections::HashMap<String, i64>>(body)
            .unwrap_err();
        let http = decode_error(&err, body);
        let message = &http.messages()[0];
        assert!(message.starts_with("Unmarshal type error: invalid type: string"));
        assert!(message.contains(", offset="));

        let body = b"{\"a\" 1}";
        let err = serde_json::from_slice::<serde_json::Value>(body).unwrap_err();
        let message = decode_error(&err, body).messages()[0].clone();
        assert!(message.starts_with("Syntax error: offset="));
        assert!(message.ends_with("error=expected `:`"));
    }
}
