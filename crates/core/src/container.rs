//! Container handle

use std::sync::Arc;

use http::{Method, StatusCode};
use url::Url;

use crate::account::{Account, AccountRef};
use crate::error::Result;
use crate::headers::{ContainerHeaders, Headers};
use crate::iterator::ObjectIterator;
use crate::object::Object;
use crate::options::RequestOptions;
use crate::request::Request;

/// A container within an account.
///
/// Like [`Account`], the handle caches the container's headers after the
/// first fetch. Mutations through this handle invalidate the cache; changes
/// made through other handles do not.
#[derive(Debug)]
pub struct Container {
    account: Arc<AccountRef>,
    name: String,
    headers: Option<ContainerHeaders>,
}

impl Container {
    pub(crate) fn new(account: Arc<AccountRef>, name: String) -> Self {
        Self {
            account,
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

    /// Handle for the account containing this container
    pub fn account(&self) -> Account {
        Account::from_ref(self.account.clone())
    }

    /// Handle for an object in this container. No I/O is performed.
    pub fn object(&self, name: impl Into<String>) -> Object {
        Object::new(self.account.clone(), self.name.clone(), name.into())
    }

    /// Iterator over the objects in this container
    pub fn objects(&self) -> ObjectIterator {
        ObjectIterator::new(self.account.clone(), self.name.clone())
    }

    /// Canonical URL of this container
    pub fn url(&self) -> Result<Url> {
        Request::new(Method::HEAD)
            .container(self.name.as_str())
            .url(self.account.backend.endpoint_url())
    }

    /// The container's headers, fetched with a HEAD request on first use.
    ///
    /// Returns a copy: changing it does not change the cache.
    pub async fn headers(&mut self) -> Result<ContainerHeaders> {
        if let Some(headers) = &self.headers {
            return Ok(headers.clone());
        }

        let response = Request::new(Method::HEAD)
            .container(self.name.as_str())
            .expect([StatusCode::NO_CONTENT])
            .drain()
            .execute(self.account.backend())
            .await?;
        let headers = ContainerHeaders::from(Headers::from_header_map(response.headers()));
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

    /// Write the given headers with a POST request
    pub async fn update(
        &mut self,
        headers: &ContainerHeaders,
        opts: Option<&RequestOptions>,
    ) -> Result<()> {
        Request::new(Method::POST)
            .container(self.name.as_str())
            .options(RequestOptions::cloned(opts, Some(headers.headers())))
            .expect([StatusCode::NO_CONTENT])
            .drain()
            .execute(self.account.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Create the container with a PUT request. Headers in `opts` (e.g.
    /// `X-Storage-Policy`) are applied at creation.
    ///
    /// Succeeds if the container already exists.
    pub async fn create(&mut self, opts: Option<&RequestOptions>) -> Result<()> {
        Request::new(Method::PUT)
            .container(self.name.as_str())
            .options(RequestOptions::cloned(opts, None))
            .expect([StatusCode::CREATED, StatusCode::ACCEPTED])
            .drain()
            .execute(self.account.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Create the container unless it exists.
    ///
    /// A container created concurrently between the check and the PUT is
    /// accepted as well.
    pub async fn ensure_exists(&mut self) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }
        self.create(None).await
    }

    /// Delete the container with a DELETE request.
    ///
    /// Fails with 404 if the container does not exist and with 409 if it is
    /// not empty.
    pub async fn delete(&mut self, opts: Option<&RequestOptions>) -> Result<()> {
        Request::new(Method::DELETE)
            .container(self.name.as_str())
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
