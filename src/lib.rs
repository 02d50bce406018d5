//! nestkit
//!
//! Helpers for JSON-like data and the HTTP calls that fetch it.
//!
//! # Features
//!
//! - **Deep traversal**: find, search and update keys at any depth
//! - **Cloning**: recursive and iterative deep copies of nested values
//! - **Flattening**: collapse nested mappings into `parent_child` keys
//! - **Filtering**: case-insensitive key/value filters over record lists
//! - **Fetch wrapper**: JSON GET with deadline, abort signal and a structured error record
//!
//! The two halves are independent: the toolkit is synchronous and never
//! fails hard, while the fetch wrapper is async on tokio.
//!
//! # Quick Start
//!
//! ```rust
//! use nestkit::deep::{deep_get_key, filter_data, flatten_obj, Filter};
//! use serde_json::json;
//!
//! let order = json!({"id": 7, "customer": {"name": "Ada", "address": {"city": "Oslo"}}});
//! assert_eq!(deep_get_key(&order, "city"), Some(&json!("Oslo")));
//! assert_eq!(
//!     flatten_obj(&order),
//!     json!({"id": 7, "customer_name": "Ada", "customer_address_city": "Oslo"})
//! );
//!
//! let rows = vec![json!({"name": "Ada"}), json!({"name": "Grace"})];
//! assert_eq!(filter_data(&rows, &[Filter::new("name", "GRA")]), vec![json!({"name": "Grace"})]);
//! ```
//!
//! Fetching:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use nestkit::http::{AbortController, FetchClient, FetchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FetchClient::builder().timeout(Duration::from_secs(2)).build()?;
//!     let controller = AbortController::new();
//!     let options = FetchOptions::default().with_abort_signal(controller.signal());
//!
//!     match client.handle_fetch("https://api.example.com/items", "item_list", vec![], options).await {
//!         Ok(items) => println!("{}", items),
//!         Err(error) => eprintln!("{}: {}", error.status, error.message),
//!     }
//!     Ok(())
//! }
//! ```

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod types;
pub mod val;

// Structure toolkit
pub mod deep;
pub mod utils;

// Fetch wrapper
pub mod http;

pub use error::{NestKitError, Result};
pub use types::{get_type, ValueKind};

pub use deep::{
    clone_obj, deep_copy, deep_find_set, deep_get_key, deep_search, deep_search_items, filter_data,
    filter_data_fast, find_and_set_object, flatten_obj, flatten_obj_array, has, has_all,
    sanitize_obj, sanitize_obj_array, val_contains, Filter,
};

pub use http::{
    handle_fetch, AbortController, AbortSignal, FetchClient, FetchClientBuilder, FetchError,
    FetchFailure, FetchOptions, HttpMethod, StatusClass,
};
