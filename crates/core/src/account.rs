//! Account handle

use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use url::Url;

use crate::backend::Backend;
use crate::capabilities::Capabilities;
use crate::config::ClientSettings;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::headers::{AccountHeaders, Headers};
use crate::iterator::ContainerIterator;
use crate::options::RequestOptions;
use crate::request::Request;

/// Identity shared by an account handle and every handle derived from it
pub(crate) struct AccountRef {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) name: String,
    pub(crate) settings: ClientSettings,
}

impl AccountRef {
    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRef")
            .field("endpoint", &self.backend.endpoint_url().as_str())
            .field("name", &self.name)
            .finish()
    }
}

/// A Swift account.
///
/// Creating the handle performs no I/O. Metadata is fetched on the first call
/// to [`Account::headers`] and cached until [`Account::invalidate`] or a
/// successful mutation.
#[derive(Debug)]
pub struct Account {
    inner: Arc<AccountRef>,
    headers: Option<AccountHeaders>,
}

/// Last non-empty path segment of a storage URL, e.g. `AUTH_test` for
/// `https://swift.example.com/v1/AUTH_test/`
fn account_name(endpoint: &Url) -> Result<String> {
    endpoint
        .path_segments()
        .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
        .map(|name| {
            urlencoding::decode(name)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| name.to_string())
        })
        .ok_or_else(|| {
            Error::InvalidRequest(format!(
                "cannot determine account name from endpoint URL {endpoint}"
            ))
        })
}

/// Endpoint URL of a sibling account on the same cluster
fn sibling_endpoint(endpoint: &Url, name: &str) -> Result<Url> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidRequest(format!(
            "invalid account name {name:?}"
        )));
    }
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidRequest(format!("{endpoint} cannot be a base URL")))?
        .pop_if_empty()
        .pop()
        .push(name);
    Ok(url)
}

/// Cluster root for an endpoint like `<root>/v1/AUTH_test`
fn cluster_root(endpoint: &Url) -> Result<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidRequest(format!("{endpoint} cannot be a base URL")))?
        .pop_if_empty()
        .pop()
        .pop();
    url.set_query(None);
    Ok(url)
}

impl Account {
    /// Handle for the account behind `backend`. The account name is taken
    /// from the last path segment of the endpoint URL.
    pub fn new(backend: Arc<dyn Backend>) -> Result<Self> {
        let name = account_name(backend.endpoint_url())?;
        Ok(Self {
            inner: Arc::new(AccountRef {
                backend,
                name,
                settings: ClientSettings::default(),
            }),
            headers: None,
        })
    }

    /// Replace the settings used by this handle and every handle derived from it afterwards
    pub fn with_settings(self, settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(AccountRef {
                backend: self.inner.backend.clone(),
                name: self.inner.name.clone(),
                settings,
            }),
            headers: self.headers,
        }
    }

    pub(crate) fn from_ref(inner: Arc<AccountRef>) -> Self {
        Self {
            inner,
            headers: None,
        }
    }

    pub(crate) fn inner(&self) -> &Arc<AccountRef> {
        &self.inner
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    pub fn settings(&self) -> ClientSettings {
        self.inner.settings
    }

    /// Handle for another account on the same cluster, using the same credentials.
    ///
    /// Needed as a copy target across accounts, and by reseller admins.
    pub fn switch_account(&self, name: &str) -> Result<Account> {
        let endpoint = sibling_endpoint(self.inner.backend.endpoint_url(), name)?;
        let backend = self.inner.backend.with_endpoint(endpoint);
        Ok(Account::new(backend)?.with_settings(self.inner.settings))
    }

    /// Handle for a container in this account. No I/O is performed.
    pub fn container(&self, name: impl Into<String>) -> Container {
        Container::new(self.inner.clone(), name.into())
    }

    /// Iterator over the containers of this account
    pub fn containers(&self) -> ContainerIterator {
        ContainerIterator::new(self.inner.clone())
    }

    /// The account's headers, fetched with a GET request on first use.
    ///
    /// Returns a copy: changing it does not change the cache.
    pub async fn headers(&mut self) -> Result<AccountHeaders> {
        if let Some(headers) = &self.headers {
            return Ok(headers.clone());
        }

        let response = Request::new(Method::GET)
            .options(RequestOptions::new().with_value("limit", "1"))
            .expect([StatusCode::OK, StatusCode::NO_CONTENT])
            .drain()
            .execute(self.inner.backend())
            .await?;
        let headers = AccountHeaders::from(Headers::from_header_map(response.headers()));
        headers.validate()?;
        self.headers = Some(headers.clone());
        Ok(headers)
    }

    /// Write the given headers with a POST request
    pub async fn update(
        &mut self,
        headers: &AccountHeaders,
        opts: Option<&RequestOptions>,
    ) -> Result<()> {
        Request::new(Method::POST)
            .options(RequestOptions::cloned(opts, Some(headers.headers())))
            .expect([StatusCode::NO_CONTENT])
            .drain()
            .execute(self.inner.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Create the account with a PUT request. Only reseller admins can do this.
    pub async fn create(&mut self, opts: Option<&RequestOptions>) -> Result<()> {
        Request::new(Method::PUT)
            .options(RequestOptions::cloned(opts, None))
            .expect([StatusCode::CREATED, StatusCode::ACCEPTED])
            .drain()
            .execute(self.inner.backend())
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Drop the cached headers
    pub fn invalidate(&mut self) {
        self.headers = None;
    }

    /// Query the cluster's capabilities with `GET /info`
    pub async fn capabilities(&self) -> Result<Capabilities> {
        let root = cluster_root(self.inner.backend.endpoint_url())?;
        let backend = self.inner.backend.with_endpoint(root);
        let response = Request::new(Method::GET)
            .container("info")
            .expect([StatusCode::OK])
            .execute(backend.as_ref())
            .await?;
        let body = response.into_body().into_bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
