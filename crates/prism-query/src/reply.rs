//! Turning a Query API response into projections or a query error.

use prism_results::{QueryOutcome, QueryResponse};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::QueryError;

/// Error body returned with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<ServerError>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Interpret a finished HTTP exchange.
///
/// 2xx bodies are decoded and projected; anything else is mapped to the first
/// error the server reported.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<QueryOutcome, QueryError> {
    if status.is_success() {
        let response = QueryResponse::from_slice(body)?;
        tracing::debug!(
            fields = response.data.fields.len(),
            rows = response.data.values.len(),
            "Decoded query response"
        );
        return Ok(QueryOutcome::from(response.data));
    }
    Err(server_error(status, body))
}

/// Interpret a saved response body with no HTTP status attached.
///
/// A body carrying an `errors` list is treated as a rejected statement,
/// anything else as a result.
pub fn interpret_body(body: &[u8]) -> Result<QueryOutcome, QueryError> {
    if let Ok(ErrorBody { errors }) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.into_error(None));
        }
    }
    let response = QueryResponse::from_slice(body)?;
    Ok(QueryOutcome::from(response.data))
}

impl ServerError {
    fn into_error(self, status: Option<u16>) -> QueryError {
        QueryError::Server {
            status,
            code: self.code,
            message: self.message,
        }
    }
}

fn server_error(status: StatusCode, body: &[u8]) -> QueryError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { errors }) => match errors.into_iter().next() {
            Some(first) => first.into_error(Some(status.as_u16())),
            None => QueryError::MalformedResponse(format!("HTTP {status} with no errors listed")),
        },
        Err(e) => QueryError::MalformedResponse(format!("HTTP {status} with unreadable body: {e}")),
    }
}

/// Caller-facing result of one query: both projections, or an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryReply {
    Success(QueryOutcome),
    Failure { error: String },
}

impl QueryReply {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryReply::Success(_))
    }
}

impl From<Result<QueryOutcome, QueryError>> for QueryReply {
    fn from(result: Result<QueryOutcome, QueryError>) -> Self {
        match result {
            Ok(outcome) => QueryReply::Success(outcome),
            Err(e) => QueryReply::Failure { error: e.message() },
        }
    }
}
