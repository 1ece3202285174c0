//! Request executor
//!
//! A [`Request`] describes one logical operation: method, optional container
//! and object, options, body and the status codes the operation accepts.
//! [`Request::execute`] turns it into an HTTP request against the backend's
//! endpoint and checks the response status.

use http::{Method, Response, StatusCode, Uri};
use url::Url;

use crate::backend::Backend;
use crate::body::Body;
use crate::error::{Error, Result, UnexpectedStatusError};
use crate::options::RequestOptions;

/// Longest body snippet kept in an [`UnexpectedStatusError`]
const MAX_ERROR_BODY: usize = 4096;

/// Percent-encode one name for use in a request path.
///
/// Only unreserved characters stay literal, so `?`, `+`, `#` and `%` are
/// always escaped.
pub fn encode_segment(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Encoded `/<container>[/<object>]` path. Slashes inside the object name
/// are kept as separators.
pub fn encode_path(container: &str, object: Option<&str>) -> String {
    let mut path = format!("/{}", encode_segment(container));
    if let Some(object) = object {
        for segment in object.split('/') {
            path.push('/');
            path.push_str(&encode_segment(segment));
        }
    }
    path
}

/// `.` and `..` would be collapsed by URL normalization and address a
/// different resource.
fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// Reject names that cannot be addressed as a path below the account.
pub(crate) fn check_names(container: &str, object: Option<&str>) -> Result<()> {
    if container.is_empty() {
        return Err(Error::InvalidRequest(
            "container name must not be empty".to_string(),
        ));
    }
    if container.contains('/') {
        return Err(Error::InvalidRequest(format!(
            "container name {container:?} must not contain a slash"
        )));
    }
    if is_dot_segment(container) {
        return Err(Error::InvalidRequest(format!(
            "container name {container:?} is not allowed"
        )));
    }
    if let Some(object) = object {
        if object.is_empty() {
            return Err(Error::InvalidRequest(
                "object name must not be empty".to_string(),
            ));
        }
        if object.split('/').any(is_dot_segment) {
            return Err(Error::InvalidRequest(format!(
                "object name {object:?} must not contain a \".\" or \"..\" path segment"
            )));
        }
    }
    Ok(())
}

/// A single Swift request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    container: Option<String>,
    object: Option<String>,
    options: RequestOptions,
    body: Body,
    expected: Vec<StatusCode>,
    drain: bool,
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            container: None,
            object: None,
            options: RequestOptions::default(),
            body: Body::Empty,
            expected: Vec::new(),
            drain: false,
        }
    }

    pub fn container(mut self, name: impl Into<String>) -> Self {
        self.container = Some(name.into());
        self
    }

    pub fn object(mut self, name: impl Into<String>) -> Self {
        self.object = Some(name.into());
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Status codes that count as success. With none given, every status
    /// is accepted.
    pub fn expect(mut self, codes: impl IntoIterator<Item = StatusCode>) -> Self {
        self.expected = codes.into_iter().collect();
        self
    }

    /// Consume and discard the response body before returning
    pub fn drain(mut self) -> Self {
        self.drain = true;
        self
    }

    /// Full request URL relative to an account endpoint
    pub fn url(&self, endpoint: &Url) -> Result<Url> {
        let mut url = endpoint.as_str().trim_end_matches('/').to_string();
        match (&self.container, &self.object) {
            (None, None) => {}
            (None, Some(_)) => {
                return Err(Error::InvalidRequest(
                    "object name given without container name".to_string(),
                ));
            }
            (Some(container), object) => {
                check_names(container, object.as_deref())?;
                url.push_str(&encode_path(container, object.as_deref()));
            }
        }

        let mut url =
            Url::parse(&url).map_err(|e| Error::InvalidRequest(format!("{url}: {e}")))?;
        if !self.options.values.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.options.values);
        }
        Ok(url)
    }

    /// Send the request and check the response status.
    pub async fn execute(self, backend: &dyn Backend) -> Result<Response<Body>> {
        let url = self.url(backend.endpoint_url())?;
        let Request {
            method,
            options,
            body,
            expected,
            drain,
            ..
        } = self;

        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("{url}: {e}")))?;
        let mut request = http::Request::new(body);
        *request.method_mut() = method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = options.headers.to_header_map()?;

        let response = backend.execute(request).await?;
        let status = response.status();
        tracing::debug!(method = %method, url = %url, status = status.as_u16(), "Swift request");

        if !expected.is_empty() && !expected.contains(&status) {
            let body = match response.into_body().into_bytes().await {
                Ok(bytes) => snippet(&bytes),
                Err(_) => String::new(),
            };
            return Err(UnexpectedStatusError {
                method,
                url: url.to_string(),
                expected,
                actual: status,
                body,
            }
            .into());
        }

        if drain {
            let (parts, body) = response.into_parts();
            body.drain().await?;
            return Ok(Response::from_parts(parts, Body::Empty));
        }
        Ok(response)
    }
}

fn snippet(body: &[u8]) -> String {
    let end = body.len().min(MAX_ERROR_BODY);
    String::from_utf8_lossy(&body[..end]).trim().to_string()
}
