//! Eager form-body snapshotting.
//!
//! The request body is a one-shot stream: once the inner service consumes
//! it, nothing is left to log. When the active policy may need form data,
//! the middleware buffers the body here at request begin, decodes the
//! ordered field pairs, and hands the inner service a rebuilt body that is
//! indistinguishable from the original.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::debug;

use crate::types::FormField;

/// Error type for body snapshot operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FormCaptureError {
    #[error("body stream error: {0}")]
    Stream(String),
}

/// Whether `request` carries a urlencoded form body worth snapshotting.
pub(crate) fn is_form_request(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|content_type| content_type.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Buffers `body` fully and returns a replacement body plus the decoded
/// fields.
///
/// Never fails: a body that errors mid-stream yields an empty snapshot and
/// an empty replacement body (the request was unreadable for the inner
/// service too), and whatever was buffered always flows through to the
/// inner service byte for byte.
pub(crate) async fn snapshot_form(body: Body) -> (Body, Vec<FormField>) {
    let bytes: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(source) => {
            let error = FormCaptureError::Stream(source.to_string());
            debug!(error = %error, "failed to buffer form body");
            return (Body::empty(), Vec::new());
        }
    };
    let fields = parse_form(&bytes);
    (Body::from(bytes), fields)
}

/// Decodes urlencoded bytes into ordered fields, duplicates preserved.
/// Decode failures are treated as "no form data".
pub(crate) fn parse_form(bytes: &[u8]) -> Vec<FormField> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(name, value)| FormField { name, value })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn request_with_content_type(content_type: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/submit")
            .header(CONTENT_TYPE, content_type)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn form_content_type_is_recognized() {
        assert!(is_form_request(&request_with_content_type(
            "application/x-www-form-urlencoded"
        )));
        assert!(is_form_request(&request_with_content_type(
            "application/x-www-form-urlencoded; charset=utf-8"
        )));
        assert!(is_form_request(&request_with_content_type(
            "Application/X-WWW-Form-Urlencoded"
        )));
    }

    #[test]
    fn other_content_types_are_not() {
        assert!(!is_form_request(&request_with_content_type(
            "application/json"
        )));
        assert!(!is_form_request(&request_with_content_type("text/plain")));

        let no_header = HttpRequest::builder()
            .method("POST")
            .uri("/submit")
            .body(Body::empty())
            .unwrap();
        assert!(!is_form_request(&no_header));
    }

    #[test]
    fn parse_preserves_order_and_duplicates() {
        let fields = parse_form(b"Foo=Bar&Foo=Qux&Other=Value");
        assert_eq!(
            fields,
            vec![
                FormField::new("Foo", "Bar"),
                FormField::new("Foo", "Qux"),
                FormField::new("Other", "Value"),
            ]
        );
    }

    #[test]
    fn parse_decodes_percent_escapes() {
        let fields = parse_form(b"name=J%C3%B6rg&city=New+York");
        assert_eq!(
            fields,
            vec![
                FormField::new("name", "J\u{f6}rg"),
                FormField::new("city", "New York"),
            ]
        );
    }

    #[test]
    fn empty_body_parses_to_no_fields() {
        assert!(parse_form(b"").is_empty());
    }

    #[tokio::test]
    async fn snapshot_preserves_the_body_for_the_inner_service() {
        let original = "user=amy&password=hunter2";
        let (rebuilt, fields) = snapshot_form(Body::from(original)).await;

        assert_eq!(
            fields,
            vec![
                FormField::new("user", "amy"),
                FormField::new("password", "hunter2"),
            ]
        );

        let replayed = rebuilt.collect().await.unwrap().to_bytes();
        assert_eq!(replayed, original.as_bytes());
    }

    #[tokio::test]
    async fn empty_body_snapshots_to_no_fields_and_an_empty_body() {
        let (rebuilt, fields) = snapshot_form(Body::empty()).await;

        assert!(fields.is_empty());
        let replayed = rebuilt.collect().await.unwrap().to_bytes();
        assert!(replayed.is_empty());
    }
}
