//! prism-query: Neo4j HTTP Query API client.
//!
//! Sends one Cypher statement per call to the configured Query API endpoint
//! and hands the typed result to both `prism-results` projections. Failures
//! of any kind come back as a single [`QueryError`].

pub mod client;
pub mod reply;

pub use client::{QueryClient, QueryError};
pub use reply::{interpret_body, interpret_response, QueryReply};
