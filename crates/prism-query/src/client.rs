//! Query API connection settings and the shared query client.

use std::time::Instant;

use prism_core::QueryConfig;
use prism_results::{DecodeError, QueryOutcome};
use reqwest::header::ACCEPT;
use serde::Serialize;

use crate::reply::{interpret_response, QueryReply};

/// Media type that makes the Query API answer with typed JSON.
pub const QUERY_MEDIA_TYPE: &str = "application/vnd.neo4j.query";

/// Errors from query execution.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("Query API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the statement.
    #[error("{message}")]
    Server {
        /// HTTP status, when the error came from a live exchange.
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Malformed query response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl QueryError {
    /// Text shown to the caller: the server's own message for rejected
    /// statements, the full error otherwise.
    pub fn message(&self) -> String {
        match self {
            QueryError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    statement: &'a str,
}

/// Client for one Query API endpoint.
///
/// Clone is cheap (the inner HTTP client is reference-counted).
#[derive(Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl QueryClient {
    /// Build a client with the configured endpoint, timeout and credentials.
    pub fn new(config: &QueryConfig) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let credentials = config
            .credentials()
            .map(|(user, password)| (user.to_string(), password.to_string()));

        tracing::info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "Query client ready"
        );
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `statement` and project the result into graph and table views.
    pub async fn execute(&self, statement: &str) -> Result<QueryOutcome, QueryError> {
        let started = Instant::now();

        let mut request = self
            .http
            .post(&self.base_url)
            .header(ACCEPT, QUERY_MEDIA_TYPE)
            .json(&QueryRequest { statement });
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let result = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.bytes().await {
                    Ok(body) => interpret_response(status, &body),
                    Err(e) => Err(QueryError::Transport(e)),
                }
            }
            Err(e) => Err(QueryError::Transport(e)),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => tracing::info!(
                nodes = outcome.graph.nodes.len(),
                relationships = outcome.graph.relationships.len(),
                rows = outcome.table.rows.len(),
                elapsed_ms,
                "Query succeeded"
            ),
            Err(e) => tracing::warn!(error = %e, elapsed_ms, "Query failed"),
        }
        result
    }

    /// Like [`execute`](Self::execute), folded into the caller-facing reply shape.
    pub async fn execute_reply(&self, statement: &str) -> QueryReply {
        QueryReply::from(self.execute(statement).await)
    }
}
