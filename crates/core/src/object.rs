//! Object handle and content operations

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures::TryStreamExt;
use http::header::ETAG;
use http::{HeaderMap, Method, StatusCode};
use md5::{Digest, Md5};
use url::Url;

use crate::account::AccountRef;
use crate::body::{Body, ByteStream};
use crate::container::Container;
use crate::error::{Error, Result};
use crate::headers::{Headers, ObjectHeaders};
use crate::options::RequestOptions;
use crate::request::{Request, check_names, encode_path};

/// An object within a container.
///
/// The handle caches the object's headers after the first fetch or download.
/// Mutations through this handle invalidate its own cache only: deleting an
/// object does not refresh the container's object count, for example.
#[derive(Debug)]
pub struct Object {
    account: Arc<AccountRef>,
    container: String,
    name: String,
    headers: Option<ObjectHeaders>,
}

/// Content of a successful GET request.
///
/// Each consuming method takes the value, so the content can be read exactly once.
#[derive(Debug)]
pub struct DownloadedObject {
    headers: ObjectHeaders,
    body: Body,
}

impl DownloadedObject {
    /// Headers of the GET response
    pub fn headers(&self) -> &ObjectHeaders {
        &self.headers
    }

    /// Read the content progressively
    pub fn into_stream(self) -> ByteStream {
        self.body.into_stream()
    }

    pub async fn into_bytes(self) -> Result<Bytes> {
        self.body.into_bytes().await
    }

    pub async fn into_string(self) -> Result<String> {
        let bytes = self.body.into_bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::BadResponse(format!("object content is not valid UTF-8: {e}")))
    }
}

/// Etag reported in an upload response, without surrounding quotes
fn response_etag(headers: &HeaderMap) -> String {
    headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

impl Object {
    pub(crate) fn new(account: Arc<AccountRef>, container: String, name: String) -> Self {
        Self {
            account,
            container,
            name,
            headers: None,
        }
    }

    pub(crate) fn account_ref(&self) -> &Arc<AccountRef> {
        &self.account
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// Handle for the container holding this object
    pub fn container(&self) -> Container {
        Container::new(self.account.clone(), self.container.clone())
    }

    /// `<container>/<object>`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.container, self.name)
    }

    /// Canonical URL of this object
    pub fn url(&self) -> Result<Url> {
        self.request(Method::HEAD)
            .url(self.account.backend.endpoint_url())
    }

    fn request(&self, method: Method) -> Request {
        Request::new(method)
            .container(self.container.as_str())
            .object(self.name.as_str())
    }

    /// The object's headers, fetched with a HEAD request on first use.
    ///
    /// Returns a copy: changing it does not change the cache.
    pub async fn headers(&mut self) -> Result<ObjectHeaders> {
        if let Some(headers) = &self.headers {
            return Ok(headers.clone());
        }

        let response = self
            .request(Method::HEAD)
            .expect([StatusCode::OK])
            .drain()
            .execute(self.account.backend())
            .await?;
        let headers = ObjectHeaders::from(Headers::from_header_map(response.headers()));
        headers.validate()?;
        self.headers = Some(headers.clone());
        Ok(headers)
    }

    /// Check for existence with a HEAD request. Only a 404 maps to `false`.
    pub async fn exists(&mut self) -> Result<bool> {
        match self.headers().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Write the given headers with a POST request.
    ///
    /// Swift replaces all user metadata on POST, so metadata missing from
    /// `headers` is removed.
    pub async fn update(
        &mut self,
        headers: &ObjectHeaders,
        opts: Option<&RequestOptions>,
    ) -> Result<()> {
        self.request(Method::POST)
            .options(RequestOptions::cloned(opts, Some(headers.headers())))
            .expect([StatusCode::ACCEPTED])
            .drain()
            .execute(self.account.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Store `content` with a PUT request.
    ///
    /// For content held in memory, `Content-Length` and `Etag` are computed
    /// up front unless `opts` already carries them, and Swift rejects a
    /// mismatch with 422. Streamed content is hashed while it is sent and the
    /// digest is compared with the Etag Swift reports. On a mismatch,
    /// [`Error::ChecksumMismatch`] is returned; the object has been stored
    /// at that point.
    pub async fn upload(
        &mut self,
        content: impl Into<Body>,
        opts: Option<&RequestOptions>,
    ) -> Result<()> {
        let mut options = RequestOptions::cloned(opts, None);
        let mut headers = ObjectHeaders::from(std::mem::take(&mut options.headers));
        let body = content.into();

        if let Some(data) = body.as_bytes() {
            if !headers.size_bytes().exists() {
                headers.size_bytes_mut().set(data.len() as u64);
            }
            if !headers.etag().exists() {
                headers.etag_mut().set(hex::encode(Md5::digest(data)));
            }
        }

        let (body, hasher) = match body {
            Body::Stream(stream) if !headers.etag().exists() => {
                let hasher = Arc::new(Mutex::new(Md5::new()));
                let sink = hasher.clone();
                let stream = stream.inspect_ok(move |chunk| {
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .update(chunk);
                });
                (Body::from_stream(stream), Some(hasher))
            }
            body => (body, None),
        };
        options.headers = headers.into_headers();

        let response = self
            .request(Method::PUT)
            .options(options)
            .body(body)
            .expect([StatusCode::CREATED])
            .drain()
            .execute(self.account.backend())
            .await?;
        self.invalidate();

        if let Some(hasher) = hasher {
            let digest = hasher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
                .finalize();
            let expected = hex::encode(digest);
            let actual = response_etag(response.headers());
            if expected != actual {
                tracing::warn!(
                    object = %self.full_name(),
                    expected = %expected,
                    actual = %actual,
                    "Etag of uploaded object does not match local checksum"
                );
                return Err(Error::ChecksumMismatch { expected, actual });
            }
        }
        Ok(())
    }

    /// Fetch the content with a GET request.
    ///
    /// The response headers replace this handle's cached headers.
    pub async fn download(&mut self, opts: Option<&RequestOptions>) -> Result<DownloadedObject> {
        let response = self
            .request(Method::GET)
            .options(RequestOptions::cloned(opts, None))
            .expect([StatusCode::OK])
            .execute(self.account.backend())
            .await?;
        let (parts, body) = response.into_parts();
        let headers = ObjectHeaders::from(Headers::from_header_map(&parts.headers));
        headers.validate()?;
        self.headers = Some(headers.clone());
        Ok(DownloadedObject { headers, body })
    }

    /// Server-side copy with a COPY request.
    ///
    /// Metadata is copied along unless `opts` sets `X-Fresh-Metadata: true`;
    /// headers in `opts` override copied metadata. The target's cache is
    /// invalidated.
    pub async fn copy_to(&self, target: &mut Object, opts: Option<&RequestOptions>) -> Result<()> {
        check_names(&target.container, Some(&target.name))?;
        let mut options = RequestOptions::cloned(opts, None);
        options.headers.set(
            "Destination",
            encode_path(&target.container, Some(&target.name)),
        );
        if self.account.name != target.account.name {
            options
                .headers
                .set("Destination-Account", target.account.name.as_str());
        }

        let method =
            Method::from_bytes(b"COPY").map_err(|e| Error::InvalidRequest(e.to_string()))?;
        self.request(method)
            .options(options)
            .expect([StatusCode::CREATED])
            .drain()
            .execute(self.account.backend())
            .await?;
        target.invalidate();
        Ok(())
    }

    /// Copy to `target`, then delete this object.
    ///
    /// If the delete fails, both objects exist afterwards.
    pub async fn move_to(
        &mut self,
        target: &mut Object,
        copy_opts: Option<&RequestOptions>,
        delete_opts: Option<&RequestOptions>,
    ) -> Result<()> {
        self.copy_to(target, copy_opts).await?;
        self.delete(delete_opts).await
    }

    /// Delete the object with a DELETE request.
    ///
    /// Fails with 404 if the object does not exist.
    pub async fn delete(&mut self, opts: Option<&RequestOptions>) -> Result<()> {
        self.request(Method::DELETE)
            .options(RequestOptions::cloned(opts, None))
            .expect([StatusCode::NO_CONTENT])
            .drain()
            .execute(self.account.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Drop the cached headers
    pub fn invalidate(&mut self) {
        self.headers = None;
    }
}
