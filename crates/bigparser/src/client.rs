use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::{ClientConfig, RequestOptions};
use crate::endpoint::Endpoint;
use crate::error::{GridError, Result};
use crate::models::{
    ColumnDataSourceRequest, CreateGridRequest, CreateTabRequest, CreatedGrid, GridListPage,
    GridMetadata, InsertRequest, LinkedColumnInfo, RemoveFileRequest, SearchResponse,
};
use crate::outcome::Outcome;
use crate::transport::{AUTH_HEADER, HttpRequest, HttpTransport, ReqwestTransport};

/// Client for the grid API
///
/// Every operation issues exactly one HTTP request and returns an
/// [`Outcome`]; nothing here panics or returns early with `Err`. Cloning is
/// cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct GridClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl GridClient {
    /// Create a client backed by reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `BP_AUTH` and friends, see [`ClientConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the outgoing request without sending it
    pub fn build_request(
        &self,
        endpoint: &Endpoint<'_>,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> HttpRequest {
        if options.view_id.is_some() && !endpoint.supports_view() {
            debug!(
                "[GridClient] {} has no share variant, ignoring view id",
                endpoint.name()
            );
        }

        let url = endpoint.url(
            &self.config,
            options.environment(),
            options.view_id.as_deref(),
        );
        let auth_id = options.resolve_auth_id(&self.config);

        HttpRequest {
            method: endpoint.method(),
            url,
            headers: vec![(AUTH_HEADER.to_string(), auth_id.to_string())],
            body,
        }
    }

    /// Send one request and decode a 2xx body as `T`
    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint<'_>,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<T> {
        let request = self.build_request(endpoint, body, options);
        let method = request.method;
        let url = request.url.clone();

        debug!("[GridClient] {} {} ({})", method, url, endpoint.name());

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let body = serde_json::from_str::<Value>(&response.body)
                .unwrap_or_else(|_| Value::String(response.body.clone()));
            error!(
                "[GridClient] {} failed: HTTP {} from {}: {}",
                endpoint.name(),
                response.status,
                url,
                body
            );
            return Err(GridError::Api {
                status: response.status,
                body,
            });
        }

        debug!(
            "[GridClient] {} succeeded: status={}, response_length={}",
            endpoint.name(),
            response.status,
            response.body.len()
        );

        let text = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| {
            let err = GridError::Decode {
                message: format!("{} response from {}: {}", endpoint.name(), url, e),
                body: response.body.chars().take(500).collect(),
            };
            error!("[GridClient] {}", err);
            err
        })
    }

    async fn send_json<B, T>(
        &self,
        endpoint: &Endpoint<'_>,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| GridError::Encode {
                message: format!("{} request: {}", endpoint.name(), e),
            })?;
        self.dispatch(endpoint, body, options).await
    }

    /// Call any endpoint, decoding the response as `T`
    ///
    /// Use `T = serde_json::Value` to get the response exactly as sent.
    pub async fn execute<B, T>(
        &self,
        endpoint: Endpoint<'_>,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Outcome<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(&endpoint, body, options).await.into()
    }

    /// Search rows of a grid
    ///
    /// `query` is usually a [`SearchRequest`](crate::SearchRequest); any
    /// serializable value is sent as-is. Rows are decoded as `R`.
    #[tracing::instrument(name = "bigparser.search", skip(self, query, options), fields(qa = options.qa))]
    pub async fn search<R, Q>(
        &self,
        grid_id: &str,
        query: &Q,
        options: &RequestOptions,
    ) -> Outcome<SearchResponse<R>>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(Endpoint::Search { grid_id }, Some(query), options)
            .await
    }

    /// Column headers and grid-level metadata
    #[tracing::instrument(name = "bigparser.query_metadata", skip(self, options), fields(qa = options.qa))]
    pub async fn query_metadata(
        &self,
        grid_id: &str,
        options: &RequestOptions,
    ) -> Outcome<GridMetadata> {
        self.execute::<Value, _>(Endpoint::QueryMetadata { grid_id }, None, options)
            .await
    }

    /// Insert rows of shape `R`
    #[tracing::instrument(name = "bigparser.insert", skip(self, request, options), fields(rows = request.insert.rows.len(), qa = options.qa))]
    pub async fn insert<R: Serialize>(
        &self,
        grid_id: &str,
        request: &InsertRequest<R>,
        options: &RequestOptions,
    ) -> Outcome<Value> {
        self.execute(Endpoint::BulkCrud { grid_id }, Some(request), options)
            .await
    }

    /// Raw `rows_columns/bulk_crud`, typically a [`BulkCrudRequest`](crate::BulkCrudRequest)
    #[tracing::instrument(name = "bigparser.bulk_crud", skip(self, request, options), fields(qa = options.qa))]
    pub async fn bulk_crud<B: Serialize + ?Sized>(
        &self,
        grid_id: &str,
        request: &B,
        options: &RequestOptions,
    ) -> Outcome<Value> {
        self.execute(Endpoint::BulkCrud { grid_id }, Some(request), options)
            .await
    }

    #[tracing::instrument(name = "bigparser.create_grid", skip(self, request, options), fields(grid_name = %request.grid_name, qa = options.qa))]
    pub async fn create_grid(
        &self,
        request: &CreateGridRequest,
        options: &RequestOptions,
    ) -> Outcome<CreatedGrid> {
        self.execute(Endpoint::CreateGrid, Some(request), options)
            .await
    }

    /// Add a tab to the grid `grid_id`; the new tab gets its own grid id
    #[tracing::instrument(name = "bigparser.create_tab", skip(self, request, options), fields(qa = options.qa))]
    pub async fn create_tab(
        &self,
        grid_id: &str,
        request: &CreateTabRequest,
        options: &RequestOptions,
    ) -> Outcome<CreatedGrid> {
        self.execute(Endpoint::CreateTab { grid_id }, Some(request), options)
            .await
    }

    #[tracing::instrument(name = "bigparser.setup_linked_column", skip(self, request, options), fields(qa = options.qa))]
    pub async fn setup_linked_column(
        &self,
        request: &LinkedColumnInfo,
        options: &RequestOptions,
    ) -> Outcome<Value> {
        self.execute(Endpoint::SetupLinkedColumn, Some(request), options)
            .await
    }

    /// Turn columns into computed columns over other columns
    #[tracing::instrument(name = "bigparser.update_column_data_source", skip(self, request, options), fields(qa = options.qa))]
    pub async fn update_column_data_source(
        &self,
        grid_id: &str,
        request: &ColumnDataSourceRequest,
        options: &RequestOptions,
    ) -> Outcome<Value> {
        self.execute(
            Endpoint::UpdateColumnDataSource { grid_id },
            Some(request),
            options,
        )
        .await
    }

    /// Fetch one listing page of `PAGE_SIZE` files starting at `start_index` (1-based)
    ///
    /// Unlike the operations above this returns `Err` on failure.
    pub async fn list_grids(
        &self,
        start_index: u64,
        options: &RequestOptions,
    ) -> Result<GridListPage> {
        self.send_json::<Value, _>(&Endpoint::ListGrids { start_index }, None, options)
            .await
    }

    /// Delete a file by its file id (not its grid id)
    pub async fn remove_file(&self, file_id: &str, options: &RequestOptions) -> Result<Value> {
        let body = RemoveFileRequest {
            id: file_id.to_string(),
        };
        self.send_json(&Endpoint::RemoveFile, Some(&body), options)
            .await
    }
}
