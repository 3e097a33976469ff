//! HTTP client pipeline for the Projects API.
//!
//! Every outbound call targeting the configured API root is decorated with a
//! bearer credential taken from the session's token store; authorization
//! failures (401/403) are funneled into a single unauthorized-redirect hook
//! instead of being retried.

mod api;
mod error;
mod session;

pub use api::{ApiClient, UnauthorizedHandler};
pub use error::ClientError;
pub use session::{SessionStore, SessionToken, TokenProvider};
