//! swc-http: reqwest transport and authenticators for swc
//!
//! Implements the transport and authentication seams of `swc-core` and
//! wires them together from a [`Config`].

mod auth;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use swc_core::config::Credentials;
use swc_core::{Account, Authenticator, Config, Error, Result, TokenBackend, Transport};
use url::Url;

pub use auth::{StaticTokenAuthenticator, SwauthAuthenticator};
pub use transport::ReqwestTransport;

/// Connect to the account described by `config` over HTTP.
///
/// With user and key credentials this authenticates right away to learn
/// the storage URL.
pub async fn connect(config: &Config) -> Result<Account> {
    config.validate()?;
    let timeout = config.request_timeout_secs.map(Duration::from_secs);
    let transport = Arc::new(ReqwestTransport::new(timeout)?);
    connect_with(config, transport).await
}

/// Like [`connect`], over an arbitrary transport
pub async fn connect_with(config: &Config, transport: Arc<dyn Transport>) -> Result<Account> {
    let (endpoint, auth): (Url, Arc<dyn Authenticator>) = match config.credentials()? {
        Credentials::Token { storage_url, token } => (
            parse_url(&storage_url)?,
            Arc::new(StaticTokenAuthenticator::new(token)),
        ),
        Credentials::Swauth {
            auth_url,
            user,
            key,
        } => {
            let auth = SwauthAuthenticator::new(transport.clone(), parse_url(&auth_url)?, user, key);
            let endpoint = auth.storage_url().await?;
            (endpoint, Arc::new(auth))
        }
    };

    tracing::debug!(endpoint = %endpoint, "Connecting to Swift account");
    let mut backend = TokenBackend::new(endpoint, transport, auth);
    if let Some(user_agent) = &config.user_agent {
        backend = backend.user_agent(user_agent.as_str());
    }
    Ok(Account::new(Arc::new(backend))?.with_settings(config.settings))
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::Config(format!("invalid URL {url:?}: {e}")))
}
