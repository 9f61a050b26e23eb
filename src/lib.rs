// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # billing-customers
//!
//! A paginated list of billing customers fetched from a GraphQL API, with
//! a manual "load more" control.
//!
//! ## Features
//!
//! - **Merge Controller**: appends pages only when they continue the
//!   displayed sequence; rejects stale or duplicated results
//! - **Single In-Flight Fetch**: the loading flag doubles as a mutex
//! - **GraphQL Query Client**: cursor/limit query over a retrying,
//!   rate-limited HTTP client
//! - **Plain-Text Rendering**: customer rows, relative join times, and the
//!   load-more trigger
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billing_customers::http::HttpClient;
//! use billing_customers::pagination::MergeController;
//! use billing_customers::query::GraphqlQueryClient;
//! use billing_customers::render::render_view;
//!
//! #[tokio::main]
//! async fn main() -> billing_customers::Result<()> {
//!     let client = GraphqlQueryClient::new(HttpClient::new()?, "https://billing.example.com/graphql");
//!     let controller = MergeController::builder(client).page_size(2).build();
//!
//!     controller.load_more().await;
//!     println!("{}", render_view(&controller.view().await, chrono::Utc::now()));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  load_more()   ┌──────────────────┐  fetch_page()  ┌──────────────┐
//! │ render / cli │ ─────────────▶ │ MergeController  │ ─────────────▶ │ GraphqlQuery │
//! │ (read-only)  │ ◀───────────── │ items · cursor   │ ◀───────────── │ Client       │
//! └──────────────┘ view/subscribe └──────────────────┘     Page       └──────┬───────┘
//!                                                                            │
//!                                                                     ┌──────┴───────┐
//!                                                                     │ HttpClient   │
//!                                                                     │ retry · rate │
//!                                                                     └──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document the customer wire structs field by field

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor pagination and the merge controller
pub mod pagination;

/// Page fetching from the GraphQL API
pub mod query;

/// Billing customer records
pub mod customer;

/// Plain-text presentation
pub mod render;

/// Configuration loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

pub use customer::Customer;
pub use pagination::{LoadOutcome, MergeController, Page, PageFetcher, Record};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
