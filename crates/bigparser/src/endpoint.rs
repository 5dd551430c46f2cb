//! Endpoint catalogue and URL construction
//!
//! Grid operations live under `/api/v2`, the file listing and removal
//! endpoints under the older `/APIServices/api` prefix. Only a subset of
//! grid operations has a share (view-scoped) variant.

use std::fmt;

use crate::config::{ClientConfig, Environment};

const V2_PREFIX: &str = "/api/v2";
const LEGACY_PREFIX: &str = "/APIServices/api";

/// Number of entries requested per listing page
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    QueryMetadata { grid_id: &'a str },
    Search { grid_id: &'a str },
    BulkCrud { grid_id: &'a str },
    CreateGrid,
    CreateTab { grid_id: &'a str },
    SetupLinkedColumn,
    UpdateColumnDataSource { grid_id: &'a str },
    /// One listing page, `start_index` is 1-based and inclusive
    ListGrids { start_index: u64 },
    RemoveFile,
}

impl Endpoint<'_> {
    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::QueryMetadata { .. } | Endpoint::ListGrids { .. } => HttpMethod::Get,
            Endpoint::Search { .. }
            | Endpoint::BulkCrud { .. }
            | Endpoint::CreateGrid
            | Endpoint::CreateTab { .. } => HttpMethod::Post,
            Endpoint::SetupLinkedColumn | Endpoint::UpdateColumnDataSource { .. } => {
                HttpMethod::Put
            }
            Endpoint::RemoveFile => HttpMethod::Delete,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::QueryMetadata { .. } => "query_metadata",
            Endpoint::Search { .. } => "search",
            Endpoint::BulkCrud { .. } => "bulk_crud",
            Endpoint::CreateGrid => "create_grid",
            Endpoint::CreateTab { .. } => "create_tab",
            Endpoint::SetupLinkedColumn => "setup_linked_column",
            Endpoint::UpdateColumnDataSource { .. } => "update_column_data_source",
            Endpoint::ListGrids { .. } => "list_grids",
            Endpoint::RemoveFile => "remove_file",
        }
    }

    /// Whether a view id switches this endpoint to its `/share/` variant
    pub fn supports_view(&self) -> bool {
        matches!(
            self,
            Endpoint::QueryMetadata { .. } | Endpoint::Search { .. } | Endpoint::BulkCrud { .. }
        )
    }

    /// Path and query string, relative to the host
    ///
    /// `view_id` is ignored by endpoints without a share variant.
    pub fn path(&self, view_id: Option<&str>) -> String {
        let grid_path = |grid_id: &str, action: &str| match view_id {
            Some(view_id) => format!("{V2_PREFIX}/grid/{grid_id}/share/{view_id}/{action}"),
            None => format!("{V2_PREFIX}/grid/{grid_id}/{action}"),
        };

        match self {
            Endpoint::QueryMetadata { grid_id } => grid_path(grid_id, "query_metadata"),
            Endpoint::Search { grid_id } => grid_path(grid_id, "search"),
            Endpoint::BulkCrud { grid_id } => grid_path(grid_id, "rows_columns/bulk_crud"),
            Endpoint::CreateGrid => format!("{V2_PREFIX}/grid/create_grid"),
            Endpoint::CreateTab { grid_id } => format!("{V2_PREFIX}/grid/{grid_id}/create_tab"),
            Endpoint::SetupLinkedColumn => format!("{V2_PREFIX}/grid/setup_linked_column"),
            Endpoint::UpdateColumnDataSource { grid_id } => {
                format!("{V2_PREFIX}/grid/{grid_id}/update_column_dataSource")
            }
            Endpoint::ListGrids { start_index } => format!(
                "{LEGACY_PREFIX}/grid/get_grids?startIndex={}&endIndex={}",
                start_index,
                start_index + PAGE_SIZE - 1
            ),
            Endpoint::RemoveFile => format!("{LEGACY_PREFIX}/file/remove"),
        }
    }

    /// Absolute URL for this endpoint under the given environment
    pub fn url(
        &self,
        config: &ClientConfig,
        environment: Environment,
        view_id: Option<&str>,
    ) -> String {
        let view_id = if self.supports_view() { view_id } else { None };
        format!("{}{}", config.host(environment), self.path(view_id))
    }
}
