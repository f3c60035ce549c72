//! prism-results: Projections of Neo4j Query API results.
//!
//! Decodes the Query API's typed JSON (`{"$type": ..., "_value": ...}`) and
//! projects one result into two independent views:
//! - a deduplicated property graph (nodes + relationships) for rendering
//! - a table (columns + rows) for a data grid
//!
//! Nothing here performs I/O. The HTTP call lives in `prism-query`.

pub mod color;
pub mod error;
pub mod graph;
pub mod response;
pub mod table;
pub mod value;

pub use color::{Color, ColorPalette};
pub use error::DecodeError;
pub use graph::{project_graph, project_graph_with_palette, GraphNode, GraphProjection, GraphRelationship};
pub use response::{QueryOutcome, QueryResponse, ResponseData};
pub use table::{project_table, RowBuilder, TableColumn, TableProjection, TableRow};
pub use value::{Decoded, Properties, RawNode, RawRelationship, TypedValue};
