//! Token sources

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method, Request, StatusCode};
use swc_core::{Authenticator, Body, Error, Result, Transport};
use tokio::sync::Mutex;
use url::Url;

/// A token obtained elsewhere. It cannot be renewed.
#[derive(Debug, Clone)]
pub struct StaticTokenAuthenticator {
    token: String,
}

impl StaticTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn reauthenticate(&self, _rejected: &str) -> Result<String> {
        Err(Error::Auth(
            "token was rejected and cannot be renewed".to_string(),
        ))
    }
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    storage_url: Url,
}

/// Swift v1 authentication (TempAuth, swauth): a GET request on the auth
/// endpoint with `X-Auth-User` and `X-Auth-Key` returns the token and the
/// storage URL.
pub struct SwauthAuthenticator {
    transport: Arc<dyn Transport>,
    auth_url: Url,
    user: String,
    key: String,
    session: Mutex<Option<Session>>,
}

impl std::fmt::Debug for SwauthAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwauthAuthenticator")
            .field("auth_url", &self.auth_url.as_str())
            .field("user", &self.user)
            .finish()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

impl SwauthAuthenticator {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth_url: Url,
        user: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            auth_url,
            user: user.into(),
            key: key.into(),
            session: Mutex::new(None),
        }
    }

    /// Storage URL reported by the auth endpoint, authenticating first if needed
    pub async fn storage_url(&self) -> Result<Url> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref() {
            return Ok(current.storage_url.clone());
        }
        let fresh = self.authenticate().await?;
        let url = fresh.storage_url.clone();
        *session = Some(fresh);
        Ok(url)
    }

    async fn authenticate(&self) -> Result<Session> {
        let mut request = Request::new(Body::Empty);
        *request.method_mut() = Method::GET;
        *request.uri_mut() = self
            .auth_url
            .as_str()
            .parse()
            .map_err(|e| Error::Config(format!("invalid auth URL {}: {e}", self.auth_url)))?;
        let headers = request.headers_mut();
        headers.insert(
            "x-auth-user",
            self.user
                .parse()
                .map_err(|_| Error::Config("user is not a valid header value".to_string()))?,
        );
        headers.insert(
            "x-auth-key",
            self.key
                .parse()
                .map_err(|_| Error::Config("key is not a valid header value".to_string()))?,
        );

        tracing::debug!(auth_url = %self.auth_url, user = %self.user, "Requesting token");
        let response = self.transport.send(request).await?;
        let status = response.status();
        let (parts, body) = response.into_parts();
        body.drain().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!(
                "credentials for {} were rejected ({status})",
                self.user
            )));
        }
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "auth endpoint {} answered {status}",
                self.auth_url
            )));
        }

        let token = header(&parts.headers, "x-auth-token")
            .or_else(|| header(&parts.headers, "x-storage-token"))
            .ok_or_else(|| Error::Auth("auth response carries no X-Auth-Token".to_string()))?;
        let storage_url = header(&parts.headers, "x-storage-url")
            .ok_or_else(|| Error::Auth("auth response carries no X-Storage-Url".to_string()))?;
        let storage_url = Url::parse(storage_url)
            .map_err(|e| Error::Auth(format!("invalid storage URL {storage_url:?}: {e}")))?;

        Ok(Session {
            token: token.to_string(),
            storage_url,
        })
    }
}

#[async_trait]
impl Authenticator for SwauthAuthenticator {
    async fn token(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref() {
            return Ok(current.token.clone());
        }
        let fresh = self.authenticate().await?;
        let token = fresh.token.clone();
        *session = Some(fresh);
        Ok(token)
    }

    async fn reauthenticate(&self, rejected: &str) -> Result<String> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref()
            && current.token != rejected
        {
            // another request already renewed the token
            return Ok(current.token.clone());
        }
        let fresh = self.authenticate().await?;
        let token = fresh.token.clone();
        *session = Some(fresh);
        Ok(token)
    }
}
