//! Server responses and their classification

use serde_json::{Map, Value};
use tracing::error;

use crate::error::{Result, SolrError, TransportError};

/// Decoded response body returned to callers
pub type Document = Map<String, Value>;

/// Raw result of one attempt against one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase (empty if the transport has none)
    pub reason: String,
    /// Body text
    pub text: String,
}

impl ServerResponse {
    pub fn new(status: u16, reason: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            text: text.into(),
        }
    }

    /// Check if this is the one status the dispatcher accepts
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 200 with a JSON object body
    Success(Document),
    /// The host could not be reached
    TransportFailure(String),
    /// The host answered with a status other than 200
    StatusFailure { status: u16, reason: String },
    /// 200 whose body is not a JSON object
    DecodeFailure(String),
}

impl Outcome {
    /// Whether the dispatcher should try the next host
    #[must_use]
    pub fn is_host_failure(&self) -> bool {
        matches!(
            self,
            Outcome::TransportFailure(_) | Outcome::StatusFailure { .. }
        )
    }

    /// Convert into the caller-facing result
    ///
    /// # Errors
    /// Returns the [`SolrError`] matching the failure kind.
    pub fn into_result(self) -> Result<Document> {
        match self {
            Outcome::Success(document) => Ok(document),
            Outcome::TransportFailure(message) => Err(SolrError::Transport(
                TransportError::Connectivity(message),
            )),
            Outcome::StatusFailure { status, reason } => Err(SolrError::Status { status, reason }),
            Outcome::DecodeFailure(body) => Err(SolrError::Decode { body }),
        }
    }
}

/// Classify a response into an [`Outcome`]
///
/// Re-validates the status even though the dispatcher only hands over 200s.
#[must_use]
pub fn classify(response: &ServerResponse) -> Outcome {
    if !response.is_ok() {
        return Outcome::StatusFailure {
            status: response.status,
            reason: response.reason.clone(),
        };
    }

    match serde_json::from_str::<Value>(&response.text) {
        Ok(Value::Object(document)) => Outcome::Success(document),
        Ok(other) => {
            error!(body = %response.text, kind = json_kind(&other), "solr body is not a JSON object");
            Outcome::DecodeFailure(response.text.clone())
        }
        Err(err) => {
            error!(body = %response.text, error = %err, "failed to parse solr text");
            Outcome::DecodeFailure(response.text.clone())
        }
    }
}

/// Classify a response and turn it into the caller-facing result
///
/// # Errors
/// Returns [`SolrError::Status`] for a non-200 status and
/// [`SolrError::Decode`] for a body that is not a JSON object.
pub fn process_response(response: &ServerResponse) -> Result<Document> {
    classify(response).into_result()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_returns_document_unchanged() {
        let response = ServerResponse::new(200, "OK", r#"{"response":{"numFound":2},"ok":1}"#);
        let document = process_response(&response).unwrap();
        assert_eq!(document["ok"], json!(1));
        assert_eq!(document["response"]["numFound"], json!(2));
    }

    #[test]
    fn non_200_fails_with_reason() {
        let response = ServerResponse::new(404, "Not Found", "{}");
        assert_eq!(
            classify(&response),
            Outcome::StatusFailure {
                status: 404,
                reason: "Not Found".to_string()
            }
        );
        let err = process_response(&response).unwrap_err();
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn unparsable_body_names_the_body() {
        let response = ServerResponse::new(200, "OK", "<html>proxy error</html>");
        let err = process_response(&response).unwrap_err();
        assert!(matches!(err, SolrError::Decode { ref body } if body == "<html>proxy error</html>"));
        assert!(err.to_string().contains("<html>proxy error</html>"));
    }

    #[test]
    fn non_object_json_is_a_decode_failure() {
        let response = ServerResponse::new(200, "OK", "[1,2,3]");
        assert_eq!(
            classify(&response),
            Outcome::DecodeFailure("[1,2,3]".to_string())
        );
    }

    #[test]
    fn host_failure_kinds() {
        assert!(Outcome::TransportFailure("refused".into()).is_host_failure());
        assert!(
            Outcome::StatusFailure {
                status: 500,
                reason: "Internal Server Error".into()
            }
            .is_host_failure()
        );
        assert!(!Outcome::DecodeFailure("x".into()).is_host_failure());
        assert!(!Outcome::Success(Document::new()).is_host_failure());
    }
}
