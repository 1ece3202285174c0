//! Token attachment with a single retry after reauthentication
//!
//! A request that comes back `401 Unauthorized` is retried exactly once:
//! the rejected response body is drained, the authenticator is asked for a
//! fresh token and the original request is sent again. Whatever the second
//! attempt returns is final.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::{Request, Response, StatusCode};
use url::Url;

use crate::backend::{Authenticator, Backend, Transport};
use crate::body::Body;
use crate::error::{Error, Result};

const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// Default `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("swc/", env!("CARGO_PKG_VERSION"));

/// [`Backend`] that authenticates requests with an `X-Auth-Token` header.
#[derive(Clone)]
pub struct TokenBackend {
    endpoint: Url,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn Authenticator>,
    user_agent: String,
}

impl TokenBackend {
    pub fn new(endpoint: Url, transport: Arc<dyn Transport>, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            endpoint,
            transport,
            auth,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn send_with_token(
        &self,
        mut request: Request<Body>,
        token: &str,
    ) -> Result<Response<Body>> {
        let token = HeaderValue::from_str(token)
            .map_err(|e| Error::Auth(format!("token is not a valid header value: {e}")))?;
        let user_agent = HeaderValue::from_str(&self.user_agent).map_err(|e| Error::BadHeader {
            name: "User-Agent".to_string(),
            message: e.to_string(),
        })?;
        let headers = request.headers_mut();
        headers.insert(AUTH_TOKEN_HEADER, token);
        headers.insert(USER_AGENT, user_agent);
        self.transport.send(request).await
    }
}

/// Copy of the request for a second attempt, if its body can be replayed
fn replay_of(request: &Request<Body>) -> Option<Request<Body>> {
    let body = request.body().try_clone()?;
    let mut replay = Request::new(body);
    *replay.method_mut() = request.method().clone();
    *replay.uri_mut() = request.uri().clone();
    *replay.version_mut() = request.version();
    *replay.headers_mut() = request.headers().clone();
    Some(replay)
}

#[async_trait]
impl Backend for TokenBackend {
    fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    fn with_endpoint(&self, endpoint: Url) -> Arc<dyn Backend> {
        Arc::new(Self {
            endpoint,
            ..self.clone()
        })
    }

    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>> {
        let replay = replay_of(&request);
        let method = request.method().clone();
        let uri = request.uri().clone();

        let token = self.auth.token().await?;
        let response = self.send_with_token(request, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(replay) = replay else {
            tracing::debug!(
                method = %method,
                uri = %uri,
                "Token rejected, but streamed request body cannot be replayed"
            );
            return Ok(response);
        };

        response.into_body().drain().await?;
        tracing::info!(method = %method, uri = %uri, "Token rejected, reauthenticating");
        let token = self.auth.reauthenticate(&token).await?;
        self.send_with_token(replay, &token).await
    }
}
