//! Utility modules supporting research operations.
//!
//! - [`HttpClient`]: shared HTTP client with bounded timeouts
//!
//! ```rust,no_run
//! use research_digest::utils::HttpClient;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::with_options("my-tool/1.0", Duration::from_secs(10));
//! let response = client.get("https://api.example.com").send().await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
