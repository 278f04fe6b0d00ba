use crate::request::{IncomingRequest, Payload};
use log::{error, warn};
use serde_json::Value;
use thiserror::Error;

/// The only content type accepted, parameters (e.g. charset) are not tolerated.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A custom error describing why the payload was not accepted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The request was not sent with the JSON content type.
    #[error("unsupported content type {0:?}, expected application/json")]
    UnsupportedMediaType(String),
    /// The body cannot be parsed as JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The body is valid JSON, but not an object.
    #[error("invalid JSON: expected an object")]
    NotAnObject,
}

/// Check the content type. This runs before authentication, so it only looks at the header.
pub fn check_content_type(request: &IncomingRequest) -> Result<(), ValidationError> {
    let content_type = request.content_type();
    if content_type == JSON_CONTENT_TYPE {
        Ok(())
    } else {
        warn!("A request with an invalid content type: {content_type:?}.");
        Err(ValidationError::UnsupportedMediaType(content_type.to_string()))
    }
}

/// Parse the raw body into a JSON object.
pub fn parse_payload(request: &IncomingRequest) -> Result<Payload, ValidationError> {
    let parsed = serde_json::from_slice::<Value>(request.body()).map_err(|err| {
        error!("A request with invalid JSON: {err}.");
        ValidationError::from(err)
    })?;

    match parsed {
        Value::Object(payload) => Ok(payload),
        _ => {
            error!("A request with JSON that is not an object.");
            Err(ValidationError::NotAnObject)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_request(body: &str) -> IncomingRequest {
        IncomingRequest::new(body).with_header("Content-Type", JSON_CONTENT_TYPE)
    }

    #[test]
    fn it_should_accept_json_content_type() {
        assert!(check_content_type(&json_request("{}")).is_ok());
    }

    #[test]
    fn it_should_reject_other_content_types() {
        let missing = IncomingRequest::new("{}");
        let result = check_content_type(&missing);
        assert!(
            matches!(result, Err(ValidationError::UnsupportedMediaType(ref ct)) if ct.is_empty()),
            "{result:?} should be UnsupportedMediaType"
        );

        let form = IncomingRequest::new("{}")
            .with_header("Content-Type", "application/x-www-form-urlencoded");
        assert!(check_content_type(&form).is_err());
    }

    #[test]
    fn it_should_not_tolerate_content_type_parameters() {
        let request = IncomingRequest::new("{}")
            .with_header("Content-Type", "application/json; charset=utf-8");

        let result = check_content_type(&request);
        assert!(
            matches!(result, Err(ValidationError::UnsupportedMediaType(_))),
            "{result:?} should be UnsupportedMediaType"
        );
    }

    #[test]
    fn it_should_parse_objects() -> Result<(), ValidationError> {
        let payload = parse_payload(&json_request(r#"{"ref":"refs/heads/main","size":3}"#))?;

        assert_eq!(Some("refs/heads/main"), payload["ref"].as_str());
        assert_eq!(Some(3), payload["size"].as_i64());

        Ok(())
    }

    #[test]
    fn it_should_reject_malformed_json() {
        let result = parse_payload(&json_request("{\"ref\":"));
        assert!(
            matches!(result, Err(ValidationError::InvalidJson(_))),
            "{result:?} should be InvalidJson"
        );

        let result = parse_payload(&IncomingRequest::new(vec![0xc3, 0x28]));
        assert!(
            matches!(result, Err(ValidationError::InvalidJson(_))),
            "{result:?} should be InvalidJson"
        );
    }

    #[test]
    fn it_should_reject_json_that_is_not_an_object() {
        for body in ["[1, 2]", "\"push\"", "12", "null"] {
            let result = parse_payload(&json_request(body));
            assert!(
                matches!(result, Err(ValidationError::NotAnObject)),
                "{result:?} should be NotAnObject"
            );
        }
    }
}
