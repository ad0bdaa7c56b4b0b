//! HTTP side of the reelgen video API.
//!
//! This crate wires the IO-free pieces together:
//! - [`ClientConfig`] reads endpoint, credentials and poll budget from the environment
//! - [`CredentialCache`] issues bearer tokens and reuses them until they near expiry
//! - [`HttpStatusCheck`] implements [`reelgen_core::StatusCheck`] over `reqwest`
//!
//! ```no_run
//! use reelgen_client::{ClientConfig, CredentialCache, HttpStatusCheck};
//! use reelgen_core::{TaskId, TaskPoller};
//!
//! # async fn run(now: i64) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let mut credentials = CredentialCache::from_config(&config);
//! let check = HttpStatusCheck::from_config(&config)?;
//!
//! let bearer = credentials.bearer(now).clone();
//! let outcome = TaskPoller::new(check, config.poll)
//!     .poll(&TaskId::new("task-id"), bearer.as_str())
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;

pub use config::{ClientConfig, SecretKey, DEFAULT_API_BASE, DEFAULT_STATUS_PATH};
pub use credentials::CredentialCache;
pub use error::ClientError;
pub use http::HttpStatusCheck;
