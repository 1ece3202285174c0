//! In-memory Swift cluster used by the integration tests
//!
//! `MemorySwift` implements [`Backend`] directly, so no HTTP or token handling
//! is involved. It keeps a log of every request it served. Archive extraction
//! accepts a plain-text stand-in for tar files: one `path:content` entry per
//! line.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use http::{Method, Request, Response, StatusCode};
use jiff::Timestamp;
use md5::{Digest, Md5};
use serde_json::json;
use swc_core::{Account, Backend, Body, ClientSettings, Headers, Result};
use url::Url;

pub const ENDPOINT: &str = "http://swift.test/v1/AUTH_test";

/// Longest object name the fake cluster accepts
pub const MAX_OBJECT_NAME_LENGTH: usize = 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    etag: String,
    content_type: String,
    /// `X-Object-Meta-*` and `X-Delete-At`
    meta: Headers,
    last_modified: Timestamp,
}

#[derive(Debug)]
struct StoredContainer {
    /// `X-Container-*` and `X-Storage-Policy`
    meta: Headers,
    objects: BTreeMap<String, StoredObject>,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct StoredAccount {
    meta: Headers,
    containers: BTreeMap<String, StoredContainer>,
}

#[derive(Debug, Default)]
struct Cluster {
    accounts: BTreeMap<String, StoredAccount>,
    log: Vec<String>,
    last_headers: Headers,
    corrupt_etags: bool,
    bad_listing_dates: bool,
    forced_status: Option<StatusCode>,
}

/// Handle on a shared in-memory cluster, bound to one account endpoint
#[derive(Debug, Clone)]
pub struct MemorySwift {
    cluster: Arc<Mutex<Cluster>>,
    endpoint: Url,
}

impl MemorySwift {
    /// A cluster holding the empty account `AUTH_test`
    pub fn new() -> Self {
        let swift = Self {
            cluster: Arc::new(Mutex::new(Cluster::default())),
            endpoint: Url::parse(ENDPOINT).unwrap(),
        };
        swift.add_account("AUTH_test");
        swift
    }

    pub fn add_account(&self, name: &str) {
        self.cluster
            .lock()
            .unwrap()
            .accounts
            .entry(name.to_string())
            .or_default();
    }

    pub fn account(&self) -> Account {
        Account::new(Arc::new(self.clone())).unwrap()
    }

    pub fn account_with_settings(&self, settings: ClientSettings) -> Account {
        self.account().with_settings(settings)
    }

    /// Answer uploads with a wrong Etag
    pub fn corrupt_etags(&self, corrupt: bool) {
        self.cluster.lock().unwrap().corrupt_etags = corrupt;
    }

    /// Report `last_modified` values that do not parse in object listings
    pub fn bad_listing_dates(&self, bad: bool) {
        self.cluster.lock().unwrap().bad_listing_dates = bad;
    }

    /// Answer every request with `status` and an empty body
    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.cluster.lock().unwrap().forced_status = status;
    }

    /// Requests served so far, as `METHOD /path?query`
    pub fn requests(&self) -> Vec<String> {
        self.cluster.lock().unwrap().log.clone()
    }

    /// Headers of the most recent request
    pub fn last_request_headers(&self) -> Headers {
        self.cluster.lock().unwrap().last_headers.clone()
    }

    pub fn request_count(&self) -> usize {
        self.cluster.lock().unwrap().log.len()
    }

    pub fn clear_log(&self) {
        self.cluster.lock().unwrap().log.clear();
    }

    /// Store a container without going through a request
    pub fn seed_container(&self, account: &str, name: &str) {
        let mut cluster = self.cluster.lock().unwrap();
        let account = cluster.accounts.entry(account.to_string()).or_default();
        account
            .containers
            .entry(name.to_string())
            .or_insert_with(new_container);
    }

    /// Store an object (and its container) without going through a request
    pub fn seed_object(&self, account: &str, container: &str, name: &str, data: &[u8]) {
        self.seed_container(account, container);
        let mut cluster = self.cluster.lock().unwrap();
        let container = cluster
            .accounts
            .get_mut(account)
            .and_then(|a| a.containers.get_mut(container))
            .unwrap();
        container
            .objects
            .insert(name.to_string(), stored_object(Bytes::copy_from_slice(data)));
    }

    pub fn has_container(&self, account: &str, name: &str) -> bool {
        let cluster = self.cluster.lock().unwrap();
        cluster
            .accounts
            .get(account)
            .is_some_and(|a| a.containers.contains_key(name))
    }

    pub fn object_data(&self, account: &str, container: &str, name: &str) -> Option<Bytes> {
        let cluster = self.cluster.lock().unwrap();
        cluster
            .accounts
            .get(account)?
            .containers
            .get(container)?
            .objects
            .get(name)
            .map(|o| o.data.clone())
    }
}

#[async_trait]
impl Backend for MemorySwift {
    fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    fn with_endpoint(&self, endpoint: Url) -> Arc<dyn Backend> {
        Arc::new(MemorySwift {
            cluster: self.cluster.clone(),
            endpoint,
        })
    }

    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = request.into_parts();
        let body = body.into_bytes().await?;
        let url = Url::parse(&parts.uri.to_string()).unwrap();
        let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        let headers = Headers::from_header_map(&parts.headers);
        let mut segments: Vec<String> = url
            .path_segments()
            .map(|s| s.map(decode).collect())
            .unwrap_or_default();
        if segments.len() > 2 && segments.last().is_some_and(String::is_empty) {
            segments.pop();
        }

        let mut cluster = self.cluster.lock().unwrap();
        let logged = match url.query() {
            Some(q) => format!("{} {}?{q}", parts.method, url.path()),
            None => format!("{} {}", parts.method, url.path()),
        };
        cluster.log.push(logged);
        cluster.last_headers = headers.clone();
        if let Some(forced) = cluster.forced_status {
            return Ok(reply(forced, Vec::new(), ""));
        }

        let call = Call {
            method: parts.method,
            query,
            headers,
            body,
        };
        Ok(match segments.as_slice() {
            [info] if info == "info" => capabilities(),
            [_, account] => cluster.account_request(account, call),
            [_, account, container] => cluster.container_request(account, container, call),
            [_, account, container, rest @ ..] => {
                cluster.object_request(account, container, &rest.join("/"), call)
            }
            _ => reply(StatusCode::NOT_FOUND, Vec::new(), ""),
        })
    }
}

struct Call {
    method: Method,
    query: BTreeMap<String, String>,
    headers: Headers,
    body: Bytes,
}

impl Call {
    fn wants_json(&self) -> bool {
        self.query.get("format").is_some_and(|f| f == "json")
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment).unwrap().into_owned()
}

fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

fn new_container() -> StoredContainer {
    StoredContainer {
        meta: Headers::new(),
        objects: BTreeMap::new(),
        created_at: Timestamp::now(),
    }
}

fn stored_object(data: Bytes) -> StoredObject {
    StoredObject {
        etag: md5_hex(&data),
        data,
        content_type: "application/octet-stream".to_string(),
        meta: Headers::new(),
        last_modified: Timestamp::now(),
    }
}

fn x_timestamp(ts: Timestamp) -> String {
    format!("{}.{:05}", ts.as_second(), ts.subsec_microsecond() / 10)
}

fn http_date(ts: Timestamp) -> String {
    ts.strftime("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn listing_date(ts: Timestamp) -> String {
    format!(
        "{}.{:06}",
        ts.strftime("%Y-%m-%dT%H:%M:%S"),
        ts.subsec_microsecond()
    )
}

/// Copy `X-*-Meta-*` style headers with the given prefixes; empty values delete
fn apply_meta(target: &mut Headers, request: &Headers, prefixes: &[&str]) {
    for (key, value) in request.iter() {
        if !prefixes.iter().any(|p| key.starts_with(p)) {
            continue;
        }
        if value.is_empty() {
            target.del(key);
        } else {
            target.set(key, value);
        }
    }
}

fn reply(status: StatusCode, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Response<Body> {
    let data: Bytes = body.into();
    // several chunks, so readers see a real stream
    let chunks: Vec<io::Result<Bytes>> = (0..data.len())
        .step_by(7)
        .map(|start| Ok(data.slice(start..(start + 7).min(data.len()))))
        .collect();
    let mut response = Response::new(Body::from_stream(stream::iter(chunks)));
    *response.status_mut() = status;
    for (name, value) in headers {
        response.headers_mut().insert(
            http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
    }
    response
}

fn status(status: StatusCode) -> Response<Body> {
    reply(status, Vec::new(), "")
}

fn capabilities() -> Response<Body> {
    let body = json!({
        "swift": {
            "version": "2.17.0",
            "max_file_size": 5368709122u64,
            "max_object_name_length": MAX_OBJECT_NAME_LENGTH,
            "container_listing_limit": 10000,
            "account_listing_limit": 10000,
            "strict_cors_mode": true
        },
        "bulk_delete": {"max_deletes_per_request": 3, "max_failed_deletes": 1000},
        "bulk_upload": {"max_containers_per_extraction": 10000, "max_failed_extractions": 1000},
        "tempurl": {"methods": ["GET", "HEAD", "PUT"]}
    });
    reply(
        StatusCode::OK,
        vec![("Content-Type".into(), "application/json".into())],
        body.to_string(),
    )
}

/// Names after `marker` that start with `prefix`, at most `limit` of them
fn page<'a, T>(
    entries: &'a BTreeMap<String, T>,
    query: &BTreeMap<String, String>,
) -> Vec<(&'a String, &'a T)> {
    let marker = query.get("marker").cloned().unwrap_or_default();
    let prefix = query.get("prefix").cloned().unwrap_or_default();
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(10000);
    entries
        .iter()
        .filter(|(name, _)| name.as_str() > marker.as_str() && name.starts_with(&prefix))
        .take(limit)
        .collect()
}

fn listing_reply(
    call: &Call,
    headers: Vec<(String, String)>,
    names: Vec<&String>,
    records: Vec<serde_json::Value>,
) -> Response<Body> {
    if call.wants_json() {
        let body = serde_json::Value::Array(records).to_string();
        return reply(StatusCode::OK, headers, body);
    }
    if names.is_empty() {
        return reply(StatusCode::NO_CONTENT, headers, "");
    }
    let mut body = String::new();
    for name in names {
        body.push_str(name);
        body.push('\n');
    }
    reply(StatusCode::OK, headers, body)
}

impl StoredContainer {
    fn bytes_used(&self) -> u64 {
        self.objects.values().map(|o| o.data.len() as u64).sum()
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                "X-Container-Object-Count".to_string(),
                self.objects.len().to_string(),
            ),
            ("X-Container-Bytes-Used".to_string(), self.bytes_used().to_string()),
            ("X-Timestamp".to_string(), x_timestamp(self.created_at)),
        ];
        headers.extend(self.meta.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        headers
    }
}

impl StoredObject {
    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Content-Length".to_string(), self.data.len().to_string()),
            ("Content-Type".to_string(), self.content_type.clone()),
            ("Etag".to_string(), self.etag.clone()),
            ("Last-Modified".to_string(), http_date(self.last_modified)),
            ("X-Timestamp".to_string(), x_timestamp(self.last_modified)),
        ];
        headers.extend(self.meta.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        headers
    }
}

const CONTAINER_HEADERS: &[&str] = &[
    "X-Container-Meta-",
    "X-Container-Read",
    "X-Container-Write",
    "X-Versions-Location",
];

impl Cluster {
    fn account_request(&mut self, name: &str, call: Call) -> Response<Body> {
        if call.method == Method::PUT && !call.query.contains_key("extract-archive") {
            let created = !self.accounts.contains_key(name);
            self.accounts.entry(name.to_string()).or_default();
            return status(if created {
                StatusCode::CREATED
            } else {
                StatusCode::ACCEPTED
            });
        }
        if !self.accounts.contains_key(name) {
            return status(StatusCode::NOT_FOUND);
        }

        match call.method {
            Method::GET | Method::HEAD => {
                let account = &self.accounts[name];
                let objects: usize = account.containers.values().map(|c| c.objects.len()).sum();
                let bytes: u64 = account.containers.values().map(|c| c.bytes_used()).sum();
                let mut headers = vec![
                    (
                        "X-Account-Container-Count".to_string(),
                        account.containers.len().to_string(),
                    ),
                    ("X-Account-Object-Count".to_string(), objects.to_string()),
                    ("X-Account-Bytes-Used".to_string(), bytes.to_string()),
                ];
                headers.extend(account.meta.iter().map(|(k, v)| (k.to_string(), v.to_string())));

                let entries = page(&account.containers, &call.query);
                let records = entries
                    .iter()
                    .map(|(name, c)| {
                        json!({"name": name, "count": c.objects.len(), "bytes": c.bytes_used()})
                    })
                    .collect();
                let names = entries.into_iter().map(|(name, _)| name).collect();
                listing_reply(&call, headers, names, records)
            }
            Method::POST if call.query.contains_key("bulk-delete") => self.bulk_delete(name, &call),
            Method::POST => {
                let account = self.accounts.get_mut(name).unwrap();
                apply_meta(&mut account.meta, &call.headers, &["X-Account-Meta-"]);
                status(StatusCode::NO_CONTENT)
            }
            Method::PUT => self.extract_archive(name, None, &call),
            _ => status(StatusCode::METHOD_NOT_ALLOWED),
        }
    }

    fn container_request(&mut self, account: &str, name: &str, call: Call) -> Response<Body> {
        if call.method == Method::PUT && call.query.contains_key("extract-archive") {
            return self.extract_archive(account, Some((name.to_string(), String::new())), &call);
        }
        let bad_dates = self.bad_listing_dates;
        let Some(stored) = self.accounts.get_mut(account) else {
            return status(StatusCode::NOT_FOUND);
        };

        match call.method {
            Method::PUT => {
                let created = !stored.containers.contains_key(name);
                let container = stored
                    .containers
                    .entry(name.to_string())
                    .or_insert_with(new_container);
                apply_meta(&mut container.meta, &call.headers, CONTAINER_HEADERS);
                if created && let Some(policy) = call.headers.get("X-Storage-Policy") {
                    container.meta.set("X-Storage-Policy", policy);
                }
                status(if created {
                    StatusCode::CREATED
                } else {
                    StatusCode::ACCEPTED
                })
            }
            Method::HEAD => match stored.containers.get(name) {
                Some(container) => reply(StatusCode::NO_CONTENT, container.headers(), ""),
                None => status(StatusCode::NOT_FOUND),
            },
            Method::GET => {
                let Some(container) = stored.containers.get(name) else {
                    return status(StatusCode::NOT_FOUND);
                };
                let entries = page(&container.objects, &call.query);
                let records = entries
                    .iter()
                    .map(|(name, o)| {
                        let last_modified = if bad_dates {
                            "last tuesday".to_string()
                        } else {
                            listing_date(o.last_modified)
                        };
                        json!({
                            "name": name,
                            "bytes": o.data.len(),
                            "content_type": o.content_type,
                            "hash": o.etag,
                            "last_modified": last_modified,
                        })
                    })
                    .collect();
                let names = entries.into_iter().map(|(name, _)| name).collect();
                listing_reply(&call, container.headers(), names, records)
            }
            Method::POST => match stored.containers.get_mut(name) {
                Some(container) => {
                    apply_meta(&mut container.meta, &call.headers, CONTAINER_HEADERS);
                    status(StatusCode::NO_CONTENT)
                }
                None => status(StatusCode::NOT_FOUND),
            },
            Method::DELETE => match stored.containers.get(name) {
                None => status(StatusCode::NOT_FOUND),
                Some(container) if !container.objects.is_empty() => reply(
                    StatusCode::CONFLICT,
                    Vec::new(),
                    "<html><h1>Conflict</h1><p>There was a conflict when trying to complete your request.</p></html>",
                ),
                Some(_) => {
                    stored.containers.remove(name);
                    status(StatusCode::NO_CONTENT)
                }
            },
            _ => status(StatusCode::METHOD_NOT_ALLOWED),
        }
    }

    fn object_request(
        &mut self,
        account: &str,
        container: &str,
        name: &str,
        call: Call,
    ) -> Response<Body> {
        if call.method == Method::PUT && call.query.contains_key("extract-archive") {
            let target = Some((container.to_string(), name.to_string()));
            return self.extract_archive(account, target, &call);
        }
        if call.method.as_str() == "COPY" {
            return self.copy_object(account, container, name, &call);
        }
        let corrupt = self.corrupt_etags;
        let Some(stored) = self
            .accounts
            .get_mut(account)
            .and_then(|a| a.containers.get_mut(container))
        else {
            return status(StatusCode::NOT_FOUND);
        };

        match call.method {
            Method::PUT => {
                let etag = md5_hex(&call.body);
                if let Some(expected) = call.headers.get("Etag")
                    && expected.trim_matches('"') != etag
                {
                    return reply(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Vec::new(),
                        "<html><h1>Unprocessable Entity</h1></html>",
                    );
                }
                if let Some(length) = call.headers.get("Content-Length")
                    && length != call.body.len().to_string()
                {
                    return status(StatusCode::BAD_REQUEST);
                }
                let mut object = stored_object(call.body.clone());
                if let Some(content_type) = call.headers.get("Content-Type") {
                    object.content_type = content_type.to_string();
                }
                apply_meta(&mut object.meta, &call.headers, &["X-Object-Meta-", "X-Delete-At"]);
                stored.objects.insert(name.to_string(), object);

                let reported = if corrupt { "0".repeat(32) } else { etag };
                reply(StatusCode::CREATED, vec![("Etag".to_string(), reported)], "")
            }
            Method::HEAD => match stored.objects.get(name) {
                Some(object) => reply(StatusCode::OK, object.headers(), ""),
                None => status(StatusCode::NOT_FOUND),
            },
            Method::GET => match stored.objects.get(name) {
                Some(object) => reply(StatusCode::OK, object.headers(), object.data.clone()),
                None => status(StatusCode::NOT_FOUND),
            },
            Method::POST => match stored.objects.get_mut(name) {
                Some(object) => {
                    // POST replaces all user metadata
                    object.meta = Headers::new();
                    apply_meta(&mut object.meta, &call.headers, &["X-Object-Meta-", "X-Delete-At"]);
                    if let Some(content_type) = call.headers.get("Content-Type") {
                        object.content_type = content_type.to_string();
                    }
                    status(StatusCode::ACCEPTED)
                }
                None => status(StatusCode::NOT_FOUND),
            },
            Method::DELETE => match stored.objects.remove(name) {
                Some(_) => status(StatusCode::NO_CONTENT),
                None => status(StatusCode::NOT_FOUND),
            },
            _ => status(StatusCode::METHOD_NOT_ALLOWED),
        }
    }

    fn copy_object(&mut self, account: &str, container: &str, name: &str, call: &Call) -> Response<Body> {
        let Some(destination) = call.headers.get("Destination") else {
            return status(StatusCode::PRECONDITION_FAILED);
        };
        let destination = decode(destination);
        let Some((target_container, target_name)) =
            destination.trim_start_matches('/').split_once('/')
        else {
            return status(StatusCode::PRECONDITION_FAILED);
        };
        let target_account = call
            .headers
            .get("Destination-Account")
            .unwrap_or(account)
            .to_string();

        let Some(source) = self
            .accounts
            .get(account)
            .and_then(|a| a.containers.get(container))
            .and_then(|c| c.objects.get(name))
        else {
            return status(StatusCode::NOT_FOUND);
        };
        let mut copy = source.clone();
        copy.last_modified = Timestamp::now();
        if call
            .headers
            .get("X-Fresh-Metadata")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            copy.meta = Headers::new();
        }
        apply_meta(&mut copy.meta, &call.headers, &["X-Object-Meta-"]);
        if let Some(content_type) = call.headers.get("Content-Type") {
            copy.content_type = content_type.to_string();
        }

        let Some(target) = self
            .accounts
            .get_mut(&target_account)
            .and_then(|a| a.containers.get_mut(target_container))
        else {
            return status(StatusCode::NOT_FOUND);
        };
        target.objects.insert(target_name.to_string(), copy);
        status(StatusCode::CREATED)
    }

    fn bulk_delete(&mut self, account: &str, call: &Call) -> Response<Body> {
        let stored = self.accounts.get_mut(account).unwrap();
        let mut deleted = 0;
        let mut not_found = 0;
        let mut errors: Vec<(String, String)> = Vec::new();

        for line in String::from_utf8_lossy(&call.body).lines() {
            if line.is_empty() {
                continue;
            }
            let path = decode(line);
            let path = path.trim_start_matches('/');
            match path.split_once('/') {
                Some((container, object)) => {
                    let removed = stored
                        .containers
                        .get_mut(container)
                        .and_then(|c| c.objects.remove(object));
                    match removed {
                        Some(_) => deleted += 1,
                        None => not_found += 1,
                    }
                }
                None => match stored.containers.get(path) {
                    None => not_found += 1,
                    Some(c) if !c.objects.is_empty() => {
                        errors.push((line.to_string(), "409 Conflict".to_string()));
                    }
                    Some(_) => {
                        stored.containers.remove(path);
                        deleted += 1;
                    }
                },
            }
        }

        let response_status = if errors.is_empty() {
            "200 OK"
        } else {
            "400 Bad Request"
        };
        let body = json!({
            "Number Deleted": deleted,
            "Number Not Found": not_found,
            "Response Status": response_status,
            "Response Body": "",
            "Errors": errors,
        });
        reply(StatusCode::OK, Vec::new(), body.to_string())
    }

    /// Entries are `path:content` lines. Without a target container the
    /// first path element names the container.
    fn extract_archive(
        &mut self,
        account: &str,
        target: Option<(String, String)>,
        call: &Call,
    ) -> Response<Body> {
        let Some(stored) = self.accounts.get_mut(account) else {
            return status(StatusCode::NOT_FOUND);
        };
        let report = |created: usize, status: &str, body: &str, errors: Vec<(String, String)>| {
            let body = json!({
                "Number Files Created": created,
                "Response Status": status,
                "Response Body": body,
                "Errors": errors,
            });
            reply(StatusCode::OK, Vec::new(), body.to_string())
        };

        let content = String::from_utf8_lossy(&call.body).to_string();
        let mut entries = Vec::new();
        for line in content.lines().filter(|l| !l.is_empty()) {
            let Some((path, data)) = line.split_once(':') else {
                return report(0, "400 Bad Request", "Invalid Tar File: truncated header", Vec::new());
            };
            let (container, object) = match &target {
                Some((container, prefix)) if prefix.is_empty() => (container.clone(), path.to_string()),
                Some((container, prefix)) => (container.clone(), format!("{prefix}/{path}")),
                None => match path.split_once('/') {
                    Some((c, o)) => (c.to_string(), o.to_string()),
                    None => {
                        return report(0, "400 Bad Request", "Invalid Tar File: no container", Vec::new());
                    }
                },
            };
            entries.push((container, object, Bytes::from(data.to_string())));
        }

        let mut created = 0;
        let mut errors = Vec::new();
        for (container, object, data) in entries {
            if object.len() > MAX_OBJECT_NAME_LENGTH {
                let name = format!("/{}", urlencoding::encode(&format!("{container}/{object}")));
                errors.push((name, "400 Bad Request".to_string()));
                continue;
            }
            stored
                .containers
                .entry(container)
                .or_insert_with(new_container)
                .objects
                .insert(object, stored_object(data));
            created += 1;
        }

        if errors.is_empty() {
            report(created, "201 Created", "", errors)
        } else {
            report(created, "400 Bad Request", "", errors)
        }
    }
}
