//! Wire types for the grid API
//!
//! Request types serialize to exactly what the service expects. Response
//! types keep every field they do not model in an `extra` map and skip the
//! modelled keys the service left out, so serializing a response again gives
//! back what the service sent. Grid metadata, whose shape varies between
//! deployments, is held as raw JSON behind typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Query,
}

impl SearchRequest {
    pub fn new(query: Query) -> Self {
        Self { query }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_filter: Option<ColumnFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_filter: Option<GlobalFilter>,
    /// Column name -> `"ASC"` / `"DESC"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_row_ids_in_response: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_column_names_in_response: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_row_ids(mut self, send: bool) -> Self {
        self.send_row_ids_in_response = Some(send);
        self
    }

    pub fn show_column_names(mut self, show: bool) -> Self {
        self.show_column_names_in_response = Some(show);
        self
    }

    pub fn column_filter(mut self, filter: Filter) -> Self {
        self.column_filter
            .get_or_insert_with(ColumnFilter::default)
            .filters
            .push(filter);
        self
    }

    pub fn global_filter(mut self, filter: Filter) -> Self {
        self.global_filter
            .get_or_insert_with(GlobalFilter::default)
            .filters
            .push(filter);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        let direction = match direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        self.sort
            .get_or_insert_with(Map::new)
            .insert(column.into(), Value::String(direction.to_string()));
        self
    }

    pub fn paginate(mut self, start_row: u64, row_count: u64) -> Self {
        self.pagination = Some(Pagination {
            start_row,
            row_count,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub filters: Vec<Filter>,
    /// `"AND"` / `"OR"`; the service defaults to `AND`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_join_operator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalFilter {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Absent for global filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// `LIKE`, `EQ`, `NEQ`, `GT`, `GTE`, `LT`, `LTE`, ...
    pub operator: String,
    pub keyword: Value,
}

impl Filter {
    pub fn column(
        column: impl Into<String>,
        operator: impl Into<String>,
        keyword: impl Into<Value>,
    ) -> Self {
        Self {
            column: Some(column.into()),
            operator: operator.into(),
            keyword: keyword.into(),
        }
    }

    pub fn global(operator: impl Into<String>, keyword: impl Into<Value>) -> Self {
        Self {
            column: None,
            operator: operator.into(),
            keyword: keyword.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub start_row: u64,
    pub row_count: u64,
}

/// Rows come back as `R`, the caller's row shape
///
/// Keys the service left out stay out when the response is serialized again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<R> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_row_count: Option<u64>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<R>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<R> SearchResponse<R> {
    /// Matching rows, empty when the service sent none
    pub fn rows(&self) -> &[R] {
        self.rows.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Response of `query_metadata`
///
/// Holds the payload exactly as the service sent it and reads fields out of
/// it on demand. Serializing a `GridMetadata` yields the original JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridMetadata(Value);

impl GridMetadata {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Id of the file backing this grid, the key `file/remove` expects
    pub fn file_id(&self) -> Option<&str> {
        self.0.get("fileId").and_then(Value::as_str)
    }

    pub fn tab_name(&self) -> Option<&str> {
        self.0.get("tabName").and_then(Value::as_str)
    }

    /// Any top-level field, modelled or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Columns in the order the service listed them
    pub fn columns(&self) -> impl Iterator<Item = ColumnMetadata<'_>> {
        self.0
            .get("columns")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(ColumnMetadata)
    }

    pub fn column(&self, name: &str) -> Option<ColumnMetadata<'_>> {
        self.columns().find(|c| c.column_name() == Some(name))
    }
}

impl From<GridMetadata> for Value {
    fn from(metadata: GridMetadata) -> Self {
        metadata.0
    }
}

/// Read-only view of one entry of [`GridMetadata::columns`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMetadata<'a>(&'a Value);

impl<'a> ColumnMetadata<'a> {
    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn as_value(&self) -> &'a Value {
        self.0
    }

    pub fn column_name(&self) -> Option<&'a str> {
        self.str_field("columnName")
    }

    pub fn column_desc(&self) -> Option<&'a str> {
        self.str_field("columnDesc")
    }

    /// Kept as sent; the service is not consistent about casing
    pub fn data_type(&self) -> Option<&'a str> {
        self.str_field("dataType")
    }

    /// Sent as a number by some deployments and as a string by others.
    /// `None` when absent or not a non-negative integer.
    pub fn column_index(&self) -> Option<u32> {
        match self.0.get("columnIndex")? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_linked_column(&self) -> bool {
        self.flag("islinkedColumn")
    }

    pub fn is_primary_link(&self) -> bool {
        self.flag("isPrimaryLink")
    }

    /// Link definition of a primary linked column; `None` if absent or malformed
    pub fn linked_column_info(&self) -> Option<LinkedColumnInfo> {
        self.0
            .get("linkedColumnInfo")
            .and_then(|v| LinkedColumnInfo::deserialize(v).ok())
    }

    /// Formula of a computed column; `None` if absent or malformed
    pub fn column_data_source(&self) -> Option<ColumnDataSource> {
        self.0
            .get("columnDataSource")
            .and_then(|v| ColumnDataSource::deserialize(v).ok())
    }

    /// Source column of a related (non-primary) linked column
    pub fn src_col_name(&self) -> Option<&'a str> {
        self.str_field("srcColName")
    }
}

// ---------------------------------------------------------------------------
// Rows and columns
// ---------------------------------------------------------------------------

/// `{ insert: { rows: [...] } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertRequest<R> {
    pub insert: RowInsertion<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowInsertion<R> {
    pub rows: Vec<R>,
}

impl<R> InsertRequest<R> {
    pub fn rows(rows: Vec<R>) -> Self {
        Self {
            insert: RowInsertion { rows },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    DateTime,
    Uri,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub column_name: String,
    pub data_type: DataType,
}

impl ColumnSpec {
    pub fn new(column_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            column_name: column_name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInsertion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_column: Option<String>,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    #[serde(rename = "columnName")]
    pub column_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDeletion {
    pub columns: Vec<ColumnRef>,
}

/// Column-level half of `rows_columns/bulk_crud`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCrudRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insert_columns: Vec<ColumnInsertion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_columns: Option<ColumnDeletion>,
    /// Row-level operations (`insert`, `update`, `delete`) passed through as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BulkCrudRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_columns(
        mut self,
        before_column: Option<&str>,
        columns: impl IntoIterator<Item = ColumnSpec>,
    ) -> Self {
        self.insert_columns.push(ColumnInsertion {
            before_column: before_column.map(str::to_string),
            columns: columns.into_iter().collect(),
        });
        self
    }

    pub fn delete_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.delete_columns
            .get_or_insert_with(ColumnDeletion::default)
            .columns
            .extend(names.into_iter().map(|name| ColumnRef {
                column_name: name.into(),
            }));
        self
    }
}

// ---------------------------------------------------------------------------
// Grid and tab creation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGridRequest {
    pub grid_name: String,
    pub grid_tabs: Vec<CreateTabRequest>,
}

impl CreateGridRequest {
    pub fn new<S: Into<String>>(
        grid_name: impl Into<String>,
        tab_names: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            grid_name: grid_name.into(),
            grid_tabs: tab_names.into_iter().map(CreateTabRequest::new).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabRequest {
    pub tab_name: String,
}

impl CreateTabRequest {
    pub fn new(tab_name: impl Into<String>) -> Self {
        Self {
            tab_name: tab_name.into(),
        }
    }
}

/// Response of `create_grid` and `create_tab`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGrid {
    pub grid_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Linked and computed columns
// ---------------------------------------------------------------------------

/// Request body of `setup_linked_column`, and the `linkedColumnInfo` of a
/// primary linked column in grid metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedColumnInfo {
    pub source_grid_id: String,
    pub source_column_name: String,
    pub destination_grid_id: String,
    pub destination_column_name: String,
    #[serde(default)]
    pub linked_related_columns: Vec<LinkedRelatedColumn>,
    /// Serialized as `null` when unset; the service requires the key
    #[serde(default)]
    pub query_in_source_grid: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRelatedColumn {
    pub src_col_name: String,
    pub dest_col_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDataSource {
    /// `SUM`, `AVG`, `CONCAT`, ...
    pub function_type: String,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDataSourceUpdate {
    pub column_name: String,
    pub column_data_source: ColumnDataSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDataSourceRequest {
    pub columns: Vec<ColumnDataSourceUpdate>,
}

impl ColumnDataSourceRequest {
    pub fn column<S: Into<String>>(
        mut self,
        column_name: impl Into<String>,
        function_type: impl Into<String>,
        source_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.columns.push(ColumnDataSourceUpdate {
            column_name: column_name.into(),
            column_data_source: ColumnDataSource {
                function_type: function_type.into(),
                column_names: source_columns.into_iter().map(Into::into).collect(),
            },
        });
        self
    }
}

// ---------------------------------------------------------------------------
// File listing and removal
// ---------------------------------------------------------------------------

/// One page of `get_grids`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridListPage {
    /// Total number of files across all pages
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub files: Vec<GridFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFile {
    /// File id, the key `file/remove` expects
    pub id: String,
    /// Grids without a backing grid (plain files) omit this
    #[serde(default)]
    pub grid_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GridFile {
    pub fn new(id: impl Into<String>, grid_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grid_id: Some(grid_id.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFileRequest {
    pub id: String,
}
