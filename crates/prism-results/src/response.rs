//! Successful Query API response bodies and their combined projection.

use serde::{Deserialize, Serialize};

use crate::color::ColorPalette;
use crate::error::Result;
use crate::graph::{project_graph_with_palette, GraphProjection};
use crate::table::{project_table, TableProjection};
use crate::value::TypedValue;

/// Body of a successful `POST .../query/v2` call.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub data: ResponseData,

    #[serde(default)]
    pub bookmarks: Vec<String>,
}

/// Returned field names and the rows aligned with them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default)]
    pub values: Vec<Vec<TypedValue>>,
}

impl QueryResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

impl ResponseData {
    /// All row values in one stream, row after row.
    pub fn into_parts(self) -> (Vec<String>, Vec<TypedValue>) {
        let values = self.values.into_iter().flatten().collect();
        (self.fields, values)
    }
}

/// Both views of one result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub graph: GraphProjection,
    pub table: TableProjection,
}

impl QueryOutcome {
    /// Run both projections over the same flattened values.
    pub fn project(fields: &[String], values: &[TypedValue]) -> Self {
        Self::project_with_palette(fields, values, &mut ColorPalette::new())
    }

    pub fn project_with_palette(
        fields: &[String],
        values: &[TypedValue],
        palette: &mut ColorPalette,
    ) -> Self {
        Self {
            graph: project_graph_with_palette(values, palette),
            table: project_table(fields, values),
        }
    }
}

impl From<ResponseData> for QueryOutcome {
    fn from(data: ResponseData) -> Self {
        let (fields, values) = data.into_parts();
        Self::project(&fields, &values)
    }
}
