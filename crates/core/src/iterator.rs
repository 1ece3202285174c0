//! Paginated listings of containers and objects
//!
//! An iterator is either active, holding the marker (the last name returned
//! so far), or exhausted. It becomes exhausted as soon as a page comes back
//! empty; from then on every call returns an empty page without a request.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use jiff::Timestamp;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::account::AccountRef;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::options::RequestOptions;
use crate::request::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageState {
    Active { marker: String },
    Exhausted,
}

/// Listing state shared by both iterator kinds
#[derive(Debug)]
struct Listing {
    account: Arc<AccountRef>,
    container: Option<String>,
    prefix: String,
    options: RequestOptions,
    state: PageState,
}

impl Listing {
    fn new(account: Arc<AccountRef>, container: Option<String>) -> Self {
        Self {
            account,
            container,
            prefix: String::new(),
            options: RequestOptions::default(),
            state: PageState::Active {
                marker: String::new(),
            },
        }
    }

    /// Raw body of the next page, or `None` once exhausted
    async fn fetch(&mut self, limit: Option<usize>, detailed: bool) -> Result<Option<Bytes>> {
        let marker = match &self.state {
            PageState::Exhausted => return Ok(None),
            PageState::Active { marker } => marker.clone(),
        };

        let mut options = self.options.clone();
        if !marker.is_empty() {
            options.values.insert("marker".to_string(), marker);
        }
        if !self.prefix.is_empty() {
            options
                .values
                .insert("prefix".to_string(), self.prefix.clone());
        }
        if let Some(limit) = limit {
            options.values.insert("limit".to_string(), limit.to_string());
        }
        if detailed {
            options.values.insert("format".to_string(), "json".to_string());
            options.headers.set("Accept", "application/json");
        }

        let mut request = Request::new(Method::GET)
            .options(options)
            .expect([StatusCode::OK, StatusCode::NO_CONTENT]);
        if let Some(container) = &self.container {
            request = request.container(container.as_str());
        }
        let response = request.execute(self.account.backend()).await?;
        if response.status() == StatusCode::NO_CONTENT {
            response.into_body().drain().await?;
            return Ok(Some(Bytes::new()));
        }
        Ok(Some(response.into_body().into_bytes().await?))
    }

    /// Move the marker to the last name of a page; an empty page exhausts
    fn advance(&mut self, last: Option<&str>) {
        self.state = match last {
            Some(name) => PageState::Active {
                marker: name.to_string(),
            },
            None => PageState::Exhausted,
        };
    }

    async fn next_names(&mut self, limit: Option<usize>) -> Result<Vec<String>> {
        let Some(body) = self.fetch(limit, false).await? else {
            return Ok(Vec::new());
        };
        // names may end in '\r', so split on '\n' only
        let names: Vec<String> = String::from_utf8_lossy(&body)
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        self.advance(names.last().map(String::as_str));
        Ok(names)
    }

    /// Records of the next detailed page, each passed through `convert`.
    /// The marker only moves once every record converted.
    async fn next_records<R, T, F>(&mut self, limit: Option<usize>, convert: F) -> Result<Vec<T>>
    where
        R: ListingRecord,
        F: FnMut((usize, R)) -> Result<T>,
    {
        let Some(body) = self.fetch(limit, true).await? else {
            return Ok(Vec::new());
        };
        let records: Vec<R> = if body.is_empty() {
            Vec::new()
        } else {
            serde_json::from_slice(&body)
                .map_err(|e| Error::BadResponse(format!("cannot parse listing: {e}")))?
        };
        let last = records.last().map(|r| r.name().to_string());
        let converted = records
            .into_iter()
            .enumerate()
            .map(convert)
            .collect::<Result<Vec<T>>>()?;
        self.advance(last.as_deref());
        Ok(converted)
    }
}

/// A record of a detailed (JSON) listing
trait ListingRecord: DeserializeOwned {
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct ObjectRecord {
    name: String,
    bytes: u64,
    content_type: String,
    hash: String,
    last_modified: String,
}

#[derive(Debug, Deserialize)]
struct ContainerRecord {
    name: String,
    count: u64,
    bytes: u64,
}

impl ListingRecord for ObjectRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ListingRecord for ContainerRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An object as reported by a detailed listing
#[derive(Debug)]
pub struct ObjectInfo {
    pub object: Object,
    pub size_bytes: u64,
    pub content_type: String,
    /// MD5 checksum of the content, hex-encoded
    pub etag: String,
    pub last_modified: Timestamp,
}

/// A container as reported by a detailed listing
#[derive(Debug)]
pub struct ContainerInfo {
    pub container: Container,
    pub object_count: u64,
    pub bytes_used: u64,
}

/// Listings report `last_modified` in UTC without a zone designator,
/// e.g. `2016-05-04T14:42:57.123456`.
fn parse_listing_timestamp(value: &str) -> std::result::Result<Timestamp, jiff::Error> {
    format!("{value}Z").parse()
}

/// Iterator over the objects in a container
#[derive(Debug)]
pub struct ObjectIterator {
    listing: Listing,
    container: String,
}

impl ObjectIterator {
    pub(crate) fn new(account: Arc<AccountRef>, container: String) -> Self {
        Self {
            listing: Listing::new(account, Some(container.clone())),
            container,
        }
    }

    /// Only list objects whose name starts with `prefix`
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.listing.prefix = prefix.into();
        self
    }

    /// Extra headers and query parameters sent with every page request
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.listing.options = options;
        self
    }

    fn object(&self, name: String) -> Object {
        Object::new(self.listing.account.clone(), self.container.clone(), name)
    }

    /// The next page of at most `limit` objects (`None`: server default)
    pub async fn next_page(&mut self, limit: Option<usize>) -> Result<Vec<Object>> {
        let names = self.listing.next_names(limit).await?;
        Ok(names.into_iter().map(|name| self.object(name)).collect())
    }

    /// Like [`ObjectIterator::next_page`], with size, checksum and
    /// modification time for each object
    pub async fn next_page_detailed(&mut self, limit: Option<usize>) -> Result<Vec<ObjectInfo>> {
        let account = self.listing.account.clone();
        let container = self.container.clone();
        self.listing
            .next_records(limit, |(idx, record): (usize, ObjectRecord)| {
                let last_modified = parse_listing_timestamp(&record.last_modified).map_err(|e| {
                    Error::BadResponse(format!(
                        "bad last_modified {:?} in listing record {idx}: {e}",
                        record.last_modified
                    ))
                })?;
                Ok(ObjectInfo {
                    object: Object::new(account.clone(), container.clone(), record.name),
                    size_bytes: record.bytes,
                    content_type: record.content_type,
                    etag: record.hash,
                    last_modified,
                })
            })
            .await
    }

    /// Call `callback` for every remaining object, stopping at the first error
    pub async fn foreach<F, Fut>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Object) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        loop {
            let page = self.next_page(None).await?;
            if page.is_empty() {
                return Ok(());
            }
            for object in page {
                callback(object).await?;
            }
        }
    }

    pub async fn foreach_detailed<F, Fut>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(ObjectInfo) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        loop {
            let page = self.next_page_detailed(None).await?;
            if page.is_empty() {
                return Ok(());
            }
            for info in page {
                callback(info).await?;
            }
        }
    }

    /// All remaining objects, in listing order
    pub async fn collect(&mut self) -> Result<Vec<Object>> {
        let mut result = Vec::new();
        loop {
            let page = self.next_page(None).await?;
            if page.is_empty() {
                return Ok(result);
            }
            result.extend(page);
        }
    }

    pub async fn collect_detailed(&mut self) -> Result<Vec<ObjectInfo>> {
        let mut result = Vec::new();
        loop {
            let page = self.next_page_detailed(None).await?;
            if page.is_empty() {
                return Ok(result);
            }
            result.extend(page);
        }
    }
}

/// Iterator over the containers in an account
#[derive(Debug)]
pub struct ContainerIterator {
    listing: Listing,
}

impl ContainerIterator {
    pub(crate) fn new(account: Arc<AccountRef>) -> Self {
        Self {
            listing: Listing::new(account, None),
        }
    }

    /// Only list containers whose name starts with `prefix`
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.listing.prefix = prefix.into();
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.listing.options = options;
        self
    }

    fn container(&self, name: String) -> Container {
        Container::new(self.listing.account.clone(), name)
    }

    /// The next page of at most `limit` containers (`None`: server default)
    pub async fn next_page(&mut self, limit: Option<usize>) -> Result<Vec<Container>> {
        let names = self.listing.next_names(limit).await?;
        Ok(names.into_iter().map(|name| self.container(name)).collect())
    }

    /// Like [`ContainerIterator::next_page`], with object count and bytes
    /// used for each container
    pub async fn next_page_detailed(
        &mut self,
        limit: Option<usize>,
    ) -> Result<Vec<ContainerInfo>> {
        let account = self.listing.account.clone();
        self.listing
            .next_records(limit, |(_, record): (usize, ContainerRecord)| {
                Ok(ContainerInfo {
                    container: Container::new(account.clone(), record.name),
                    object_count: record.count,
                    bytes_used: record.bytes,
                })
            })
            .await
    }

    pub async fn foreach<F, Fut>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Container) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        loop {
            let page = self.next_page(None).await?;
            if page.is_empty() {
                return Ok(());
            }
            for container in page {
                callback(container).await?;
            }
        }
    }

    pub async fn foreach_detailed<F, Fut>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(ContainerInfo) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        loop {
            let page = self.next_page_detailed(None).await?;
            if page.is_empty() {
                return Ok(());
            }
            for info in page {
                callback(info).await?;
            }
        }
    }

    pub async fn collect(&mut self) -> Result<Vec<Container>> {
        let mut result = Vec::new();
        loop {
            let page = self.next_page(None).await?;
            if page.is_empty() {
                return Ok(result);
            }
            result.extend(page);
        }
    }

    pub async fn collect_detailed(&mut self) -> Result<Vec<ContainerInfo>> {
        let mut result = Vec::new();
        loop {
            let page = self.next_page_detailed(None).await?;
            if page.is_empty() {
                return Ok(result);
            }
            result.extend(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_timestamp() {
        let ts = parse_listing_timestamp("2016-05-04T14:42:57.123456").unwrap();
        assert_eq!(ts.as_second(), 1462372977);
        assert_eq!(ts.subsec_microsecond(), 123456);
        assert!(parse_listing_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_object_records() {
        let json = r#"[
            {"hash": "d41d8cd98f00b204e9800998ecf8427e", "last_modified": "2018-05-02T08:37:02.000000",
             "bytes": 0, "name": "empty.txt", "content_type": "text/plain"},
            {"hash": "5d41402abc4b2a76b9719d911017c592", "last_modified": "2018-05-02T08:37:03.500000",
             "bytes": 5, "name": "hello.txt", "content_type": "text/plain", "symlink_path": null}
        ]"#;
        let records: Vec<ObjectRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "hello.txt");
        assert_eq!(records[1].bytes, 5);
    }
}
