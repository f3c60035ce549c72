//! prism-cli: Command-line front end for the Prism query console.
//!
//! Runs one Cypher statement (or projects a saved response body) and prints
//! the graph and/or table projection as JSON.

pub mod output;
