//! HTTP transport over reqwest

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use http::{Method, Request, Response};
use reqwest::redirect::Policy;
use swc_core::{Body, Error, Result, Transport};

/// [`Transport`] backed by a `reqwest::Client`.
///
/// Redirects are not followed and responses are never decompressed, so
/// status codes, `Content-Length` and `Etag` reach the caller unchanged.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::ClientBuilder::new()
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .redirect(Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client. It should not follow redirects.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = request.into_parts();
        let url = reqwest::Url::parse(&parts.uri.to_string())
            .map_err(|e| Error::InvalidRequest(format!("{}: {e}", parts.uri)))?;
        let method = parts.method.clone();

        let builder = self
            .client
            .request(parts.method, url.clone())
            .headers(parts.headers);
        let builder = match body {
            // Swift wants an explicit zero length on bodiless PUTs
            Body::Empty if method == Method::PUT => builder.body(Bytes::new()),
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes),
            Body::Stream(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(method = %method, url = %url, error = %e, "HTTP request failed");
            let kind = if e.is_timeout() { "timed out" } else { "failed" };
            Error::Transport(format!("{method} {url} {kind}: {e}"))
        })?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(io::Error::other);

        let mut result = Response::new(Body::from_stream(stream));
        *result.status_mut() = status;
        *result.version_mut() = version;
        *result.headers_mut() = headers;
        Ok(result)
    }
}
