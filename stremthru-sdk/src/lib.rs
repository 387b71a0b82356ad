//! StremThru SDK
//!
//! Typed client for the StremThru HTTP API.
//!
//! Architecture:
//! - `error`: structured API error plus transport failures
//! - `client`: transport client, one HTTP round trip per call
//! - `store`: typed store operations (magnets, links, user)
//!
//! # Example
//!
//! ```no_run
//! use stremthru::{Auth, ClientConfig, StremThru};
//!
//! # async fn example() -> Result<(), stremthru::Error> {
//! let client = StremThru::with_config(
//!     ClientConfig::new("http://localhost:8080").with_auth(Auth::token("root:root")),
//! )?;
//! let magnets = client.store().list_magnets(Some(10), None).await?;
//! if let Some(data) = magnets.data {
//!     println!("{} magnets", data.total_items);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod store;
pub mod types;

pub use client::{Auth, ClientConfig, RequestBody, RequestOptions, StremThru, USER_AGENT};
pub use error::{Error, ErrorCode, ErrorType, Result, StremThruError};
pub use store::{Store, StoreApi};
pub use types::*;
