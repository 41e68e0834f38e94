//! Turns whatever came back from the API into a typed value or a [`YtError`].
//!
//! YouTube reports failures in several shapes: transport errors with no response at all,
//! non-2xx responses with a Google error envelope, the occasional 200 that still carries an
//! `error` object, and OAuth-style `{"error": "invalid_grant"}` bodies. Every gateway call
//! goes through [`check`] (and [`decode`] for typed bodies) so callers only ever see the
//! three [`YtError`] variants.

use crate::error::YtError;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Fails if the response reports an error in its status or body.
///
/// The order matters: an `error` member in the body wins over the HTTP status, since it
/// carries the reason YouTube gave.
pub fn check(status: StatusCode, body: &[u8]) -> Result<(), YtError> {
    if let Some(error) = embedded_error(status, body) {
        tracing::warn!(%status, "YouTube API reported an error: {}", error);
        return Err(error);
    }

    if !status.is_success() {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        let message = if text.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            text.to_string()
        };
        tracing::warn!(%status, "YouTube API request failed: {}", message);
        return Err(YtError::System {
            code: status.as_u16(),
            message,
        });
    }

    Ok(())
}

/// [`check`]s the response and then decodes the body as `T`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, YtError> {
    check(status, body)?;
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "could not decode YouTube API response");
        YtError::message(format!("Parsing data error: {e}"))
    })
}

/// Extracts the error object from a Google API error envelope, if there is one.
///
/// ```json
/// {"error": {"code": 403, "message": "...", "errors": [{"reason": "...", ...}]}}
/// ```
fn embedded_error(status: StatusCode, body: &[u8]) -> Option<YtError> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    let error = payload.get("error")?;

    let (code, message) = match error {
        Value::Object(error) => {
            let code = error
                .get("code")
                .and_then(Value::as_u64)
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(status.as_u16());
            let message = error.get("message").and_then(Value::as_str).unwrap_or("");
            let reason = error
                .get("errors")
                .and_then(|errors| errors.get(0))
                .and_then(|first| first.get("reason"))
                .and_then(Value::as_str)
                .filter(|reason| !reason.is_empty());
            let message = match reason {
                Some(reason) => format!("{reason} - {message}"),
                None => message.to_string(),
            };
            (code, message)
        }
        // OAuth endpoints answer with {"error": "invalid_grant", "error_description": "..."}.
        Value::String(kind) if !kind.is_empty() => {
            let description = payload
                .get("error_description")
                .or_else(|| payload.get("message"))
                .and_then(Value::as_str);
            let message = match description {
                Some(description) => format!("{kind} - {description}"),
                None => kind.clone(),
            };
            (status.as_u16(), message)
        }
        _ => return None,
    };

    Some(YtError::Api {
        code,
        message,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[derive(Debug, serde::Deserialize)]
    struct Thing {
        id: String,
    }

    #[test]
    fn error_object_in_ok_response_is_api_error() {
        let err = decode::<Thing>(StatusCode::OK, br#"{"error":{"message":"X"}}"#).unwrap_err();
        let YtError::Api { code, message, payload } = &err else {
            panic!("expected api error, got {err:?}");
        };
        assert_eq!(*code, 200);
        assert!(message.contains('X'), "{message}");
        assert_eq!(payload["error"]["message"], "X");
    }

    #[test]
    fn google_error_envelope_is_api_error() {
        let body = br#"{
            "error": {
                "code": 403,
                "message": "Invalid transition",
                "errors": [{"message": "Invalid transition", "domain": "youtube.liveBroadcast", "reason": "invalidTransition"}]
            }
        }"#;
        let err = check(StatusCode::FORBIDDEN, body).unwrap_err();
        assert_snapshot!(err, @r"
        Api error: 403
        invalidTransition - Invalid transition
        ");
    }

    #[test]
    fn oauth_style_error_is_api_error() {
        let body = br#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#;
        let err = check(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_snapshot!(err, @r"
        Api error: 400
        invalid_grant - Token has been expired or revoked.
        ");
    }

    #[test]
    fn undecodable_ok_body_is_parsing_error() {
        let err = decode::<Thing>(StatusCode::OK, b"<html>surprise</html>").unwrap_err();
        assert!(matches!(err, YtError::Message(_)), "{err:?}");
        assert!(err.to_string().contains("Parsing data error"), "{err}");

        let err = decode::<Thing>(StatusCode::OK, br#"{"kind":"youtube#liveBroadcast"}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("Parsing data error: missing field `id`"), "{err}");
    }

    #[test]
    fn failed_status_without_envelope_is_system_error() {
        let err = check(StatusCode::BAD_GATEWAY, b"upstream went away").unwrap_err();
        assert_snapshot!(err, @r"
        System error: 502
        upstream went away
        ");

        let err = check(StatusCode::SERVICE_UNAVAILABLE, b"").unwrap_err();
        assert_snapshot!(err, @r"
        System error: 503
        Service Unavailable
        ");
    }

    #[test]
    fn empty_success_passes() {
        check(StatusCode::NO_CONTENT, b"").unwrap();
        let thing: Thing = decode(StatusCode::OK, br#"{"id":"bc-1"}"#).unwrap();
        assert_eq!(thing.id, "bc-1");
    }
}
