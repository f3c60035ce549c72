//! prism-core: Shared configuration and error handling for the Prism query console.
//!
//! This crate provides the pieces every other Prism crate depends on:
//! - `AppConfig`, loaded once at startup and passed by reference
//! - Query endpoint settings (base URL, timeout, credentials)
//! - UI layout defaults consumed by front ends
//! - The top-level error type

pub mod config;
pub mod error;

pub use config::{AppConfig, LayoutConfig, QueryConfig};
pub use error::{PrismError, Result};
