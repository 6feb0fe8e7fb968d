//! # Cordial REST
//!
//! The contract between cordial and its HTTP transport.
//!
//! ## Overview
//!
//! The transport owns connection pooling, retries and rate-limit bucket
//! accounting. Cordial only depends on its verb-shaped surface:
//!
//! - [`Requester`] - `get`, `post`, `patch` and `delete` over a [`Request`]
//! - [`BucketKey`] - groups requests that share one rate-limit quota, even
//!   when their endpoint paths differ
//! - [`Response`] - status plus body; callers branch on "success",
//!   "no content" and "non-success" explicitly
//!
//! Rate limiting and network failures arrive as [`RestError`] and are passed
//! through to callers unmodified.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cordial_core::Snowflake;
//! use cordial_rest::{endpoint, BucketKey, Request, Requester};
//!
//! async fn example(rest: &dyn Requester) -> cordial_rest::Result<()> {
//!     let guild = Snowflake::new(244200618854580224);
//!     let request = Request::new(BucketKey::guild_roles(guild), endpoint::guild_roles(guild));
//!     let response = rest.get(request).await?;
//!     println!("status {}", response.status());
//!     Ok(())
//! }
//! ```

pub mod endpoint;
pub mod error;
pub mod request;
pub mod requester;

pub use error::{RestError, Result};
pub use http::StatusCode;
pub use request::{BucketKey, Method, Request, Response, ResponseMeta, JSON_CONTENT_TYPE};
pub use requester::{memory::MemoryRequester, Requester};
