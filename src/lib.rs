// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # ClickUp Source
//!
//! A source connector that extracts workspaces, spaces, folders, lists,
//! tasks and goals from the ClickUp REST API.
//!
//! ## Features
//!
//! - **Resilient transport**: retries with exponential backoff, `retry-after`
//!   handling and an optional client-side request quota
//! - **Memoized hierarchy**: each container is fetched at most once per run
//! - **Lazy paging**: tasks and goals are streamed page by page
//! - **Incremental sync**: task cursors are kept per list
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clickup_source::{ClickUpSource, Connector, StateManager, StreamName};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> clickup_source::Result<()> {
//!     let source = ClickUpSource::new();
//!     let config = serde_json::json!({ "token": "pk_..." });
//!
//!     let status = source.check(&config).await;
//!     assert!(status.success);
//!
//!     let mut messages = source
//!         .read(&config, &[StreamName::Tasks], StateManager::in_memory())
//!         .await?;
//!     while let Some(message) = messages.next().await {
//!         println!("{}", message?.to_json());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  check() → Status   streams() → Names   read(state) → Messages  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │          Streams (workspaces → spaces → folders → lists)        │
//! └──────────────────────────────┬──────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┴─┬────────────────┬──────────────┐
//! │   HTTP    │   ClickUp client   │   Paginate     │    State     │
//! ├───────────┼────────────────────┼────────────────┼──────────────┤
//! │ Retry     │ Lookup cache       │ Page number    │ Per-list     │
//! │ Backoff   │ Archived partitions│ Active then    │ cursors      │
//! │ Rate limit│ Error context      │ archived       │ Atomic file  │
//! └───────────┴────────────────────┴────────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Source configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Compute-once lookup cache
pub mod cache;

/// Page-number pagination
pub mod pagination;

/// ClickUp resource records
pub mod models;

/// ClickUp API client
pub mod clickup;

/// State management and checkpointing
pub mod state;

/// Stream definitions and hierarchy traversal
pub mod streams;

/// Connector trait and the ClickUp source
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use clickup::ClickUp;
pub use config::ClickUpConfig;
pub use connector::{CheckResult, ClickUpSource, Connector, Message, MessageStream};
pub use error::{Error, Result};
pub use state::StateManager;
pub use streams::StreamName;
pub use types::*;
