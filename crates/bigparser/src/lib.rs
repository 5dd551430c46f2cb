//! Async client for the BigParser grid API
//!
//! - `client` - [`GridClient`], one typed method per endpoint, each returning
//!   an [`Outcome`] instead of raising
//! - `locator` - [`GridLocator`], pages through the file listing to find and
//!   delete the file backing a grid
//! - `config` - [`ClientConfig`] (read once, usually from `BP_AUTH`) and
//!   per-call [`RequestOptions`]
//! - `endpoint` - URL and method for every endpoint
//! - `transport` - [`HttpTransport`] seam and its reqwest implementation
//! - `models` - request and response types
//! - `fake` - [`FakeGridService`] for tests (`test-helpers` feature)
//!
//! ```no_run
//! # use bigparser::{GridClient, Query, RequestOptions, SearchRequest};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GridClient::from_env()?;
//! let query = SearchRequest::new(Query::new().show_column_names(true));
//!
//! let outcome = client
//!     .search::<serde_json::Value, _>("6243cd4ec9d082361703ea4d", &query, &RequestOptions::new())
//!     .await;
//! match outcome.error() {
//!     Some(err) => eprintln!("search failed: {err}"),
//!     None => println!("{:?}", outcome.data()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
#[cfg(any(test, feature = "test-helpers"))]
pub mod fake;
pub mod locator;
pub mod models;
pub mod outcome;
pub mod transport;

pub use client::GridClient;
pub use config::{ClientConfig, Environment, RequestOptions};
pub use endpoint::{Endpoint, HttpMethod, PAGE_SIZE};
pub use error::{GridError, Result, ServiceError, TransportErrorKind};
#[cfg(any(test, feature = "test-helpers"))]
pub use fake::FakeGridService;
pub use locator::{GridLocator, LookupSession, Removal};
pub use models::*;
pub use outcome::Outcome;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
