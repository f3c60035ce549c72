//! Tabular projection of query results, ready for a data grid.
//!
//! The Query API returns rows as arrays aligned with the field list. Rows are
//! flattened into one value stream before projection and regrouped here into
//! fixed-width records, one cell per field, behind a synthetic `index` column.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::value::{Decoded, TypedValue};

/// Name of the synthetic 1-based row number column.
pub const INDEX_COLUMN: &str = "index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
}

/// Column metadata for a data grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub label: String,
    pub field: String,
    pub align: Align,
}

impl TableColumn {
    fn index() -> Self {
        Self {
            name: INDEX_COLUMN.to_string(),
            label: "#".to_string(),
            field: INDEX_COLUMN.to_string(),
            align: Align::Left,
        }
    }

    fn for_field(field: &str) -> Self {
        Self {
            name: field.to_string(),
            label: field.to_string(),
            field: field.to_string(),
            align: Align::Left,
        }
    }
}

/// One record: the row number followed by one cell per field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    #[serde(flatten)]
    pub cells: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableProjection {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

impl TableProjection {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}

/// Regroups a flat cell stream into rows of `field_names.len()` cells.
///
/// Invariant: `cursor < field_names.len()` between pushes. A row is emitted
/// the moment its last cell arrives; `finish` discards a row that never
/// filled up.
#[derive(Debug)]
pub struct RowBuilder<'a> {
    field_names: &'a [String],
    cursor: usize,
    current: Map<String, Value>,
    rows: Vec<TableRow>,
}

impl<'a> RowBuilder<'a> {
    /// `None` when there are no fields to build rows from.
    pub fn new(field_names: &'a [String]) -> Option<Self> {
        if field_names.is_empty() {
            return None;
        }
        Some(Self {
            field_names,
            cursor: 0,
            current: Map::new(),
            rows: Vec::new(),
        })
    }

    /// Position of the next cell within the current row.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of completed rows.
    pub fn completed(&self) -> usize {
        self.rows.len()
    }

    pub fn push(&mut self, cell: Value) {
        debug_assert!(self.cursor < self.field_names.len());
        let field = &self.field_names[self.cursor];
        self.current.insert(field.clone(), cell);
        self.cursor += 1;

        if self.cursor == self.field_names.len() {
            self.rows.push(TableRow {
                index: self.rows.len() + 1,
                cells: std::mem::take(&mut self.current),
            });
            self.cursor = 0;
        }
    }

    /// Completed rows. A trailing partial row is dropped.
    pub fn finish(self) -> Vec<TableRow> {
        if self.cursor != 0 {
            tracing::debug!(
                dropped_cells = self.cursor,
                width = self.field_names.len(),
                "Discarding incomplete trailing row"
            );
        }
        self.rows
    }
}

/// Project a flat value stream into columns and rows.
pub fn project_table(field_names: &[String], rows: &[TypedValue]) -> TableProjection {
    let Some(mut builder) = RowBuilder::new(field_names) else {
        return TableProjection::default();
    };

    let columns = std::iter::once(TableColumn::index())
        .chain(field_names.iter().map(|f| TableColumn::for_field(f)))
        .collect();

    for value in rows {
        builder.push(render_cell(value));
    }
    let rows = builder.finish();

    tracing::debug!(
        columns = field_names.len() + 1,
        rows = rows.len(),
        "Table projection built"
    );
    TableProjection { columns, rows }
}

/// Scalars stay as they are; composites become their plain JSON as text.
pub fn render_cell(value: &TypedValue) -> Value {
    match value.decode() {
        Decoded::Scalar(raw) => raw.clone(),
        composite => Value::String(composite.to_json().to_string()),
    }
}
