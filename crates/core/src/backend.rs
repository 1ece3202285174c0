//! Backend contract
//!
//! The core never talks to the network directly. Every request goes through
//! a [`Backend`], which knows the account's endpoint URL and attaches
//! credentials. [`crate::retry::TokenBackend`] is the standard implementation,
//! built from a raw [`Transport`] and an [`Authenticator`].

use std::sync::Arc;

use async_trait::async_trait;
use http::{Request, Response};
use url::Url;

use crate::body::Body;
use crate::error::Result;

/// Executes requests against one Swift account.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Storage URL of the account, e.g. `https://swift.example.com/v1/AUTH_projectid`
    fn endpoint_url(&self) -> &Url;

    /// A backend for a different endpoint URL using the same credentials
    fn with_endpoint(&self, endpoint: Url) -> Arc<dyn Backend>;

    /// Execute one request with credentials attached. Implementations retry
    /// at most once, after refreshing an expired token.
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>>;
}

/// One raw HTTP exchange, without authentication.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>>;
}

/// Source of auth tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The current token, acquiring one first if necessary
    async fn token(&self) -> Result<String>;

    /// Obtain a new token after the server rejected `rejected`.
    ///
    /// If the current token already differs from `rejected` (another request
    /// refreshed it in the meantime), implementations may return it as is.
    async fn reauthenticate(&self, rejected: &str) -> Result<String>;
}
