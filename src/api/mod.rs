//! Client for the data-loader API.
//!
//! Two endpoints matter for autosave: the storage save endpoint, whose
//! failures propagate, and the activity heartbeat, whose failures are only
//! logged.

mod activity;
mod client;
mod http;
mod storage;
mod types;

pub use client::{ApiClient, USER_AGENT};
pub use http::RetryPolicy;
pub use storage::STORAGE_TOKEN_HEADER;
pub use types::{ApiError, SaveFile};
