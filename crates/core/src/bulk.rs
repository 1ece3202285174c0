//! Bulk delete and archive upload
//!
//! Both operations are served by Swift's bulk middleware, which answers with
//! a JSON report even when individual items fail. Failures are collected into
//! a [`BulkError`] next to the counts, so partial success stays visible.

use http::{Method, StatusCode};
use serde::Deserialize;

use crate::account::Account;
use crate::body::Body;
use crate::container::Container;
use crate::error::{BulkError, BulkObjectError, Error, Result};
use crate::object::Object;
use crate::options::RequestOptions;
use crate::request::{Request, check_names, encode_path};

/// Archive formats accepted by archive extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    TarGz,
    TarBz2,
}

impl ArchiveFormat {
    /// Value of the `extract-archive` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
        }
    }
}

/// Outcome of [`Account::bulk_delete`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: u64,
    pub not_found: u64,
    pub error: Option<BulkError>,
}

impl BulkDeleteReport {
    /// `(deleted, not_found)`, or the bulk error if any item failed
    pub fn into_result(self) -> Result<(u64, u64)> {
        match self.error {
            Some(e) => Err(Error::Bulk(e)),
            None => Ok((self.deleted, self.not_found)),
        }
    }
}

/// Outcome of [`Account::bulk_upload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUploadReport {
    pub created: u64,
    pub error: Option<BulkError>,
}

impl BulkUploadReport {
    /// Number of files created, or the bulk error if anything failed
    pub fn into_result(self) -> Result<u64> {
        match self.error {
            Some(e) => Err(Error::Bulk(e)),
            None => Ok(self.created),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BulkResponse {
    #[serde(rename = "Number Deleted")]
    deleted: u64,
    #[serde(rename = "Number Not Found")]
    not_found: u64,
    #[serde(rename = "Number Files Created")]
    created: u64,
    #[serde(rename = "Response Status")]
    status: String,
    #[serde(rename = "Response Body")]
    body: String,
    #[serde(rename = "Errors")]
    errors: Vec<(String, String)>,
}

/// Leading status code of a status line such as `"409 Conflict"`
fn parse_status_line(line: &str) -> Result<StatusCode> {
    line.split_whitespace()
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| Error::BadResponse(format!("cannot parse status {line:?} in bulk report")))
}

/// Split a reported `/container/object` path into its decoded parts
fn parse_item_name(name: &str) -> (String, String) {
    let decoded = urlencoding::decode(name)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| name.to_string());
    let trimmed = decoded.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((container, object)) => (container.to_string(), object.to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

impl BulkResponse {
    fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::BadResponse(format!("cannot parse bulk report: {e}")))
    }

    /// The composite error described by this report, if any
    fn error(&self) -> Result<Option<BulkError>> {
        let status_code = if self.status.is_empty() {
            StatusCode::OK
        } else {
            parse_status_line(&self.status)?
        };
        let object_errors = self
            .errors
            .iter()
            .map(|(name, status)| {
                let (container_name, object_name) = parse_item_name(name);
                Ok(BulkObjectError {
                    container_name,
                    object_name,
                    status_code: parse_status_line(status)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if status_code.is_success() && object_errors.is_empty() {
            return Ok(None);
        }
        Ok(Some(BulkError {
            status_code,
            overall_error: self.body.trim().to_string(),
            object_errors,
        }))
    }
}

impl Account {
    /// Delete many objects and containers with as few requests as possible.
    ///
    /// Paths are sent in batches of `bulk_delete_batch_size`, objects before
    /// containers, so a container emptied by the same call can be deleted.
    /// The first batch that reports a failure ends the operation; the counts
    /// in the report cover every batch sent until then.
    ///
    /// All handles must belong to this account. Their caches are not
    /// invalidated.
    pub async fn bulk_delete(
        &self,
        objects: &[Object],
        containers: &[Container],
        opts: Option<&RequestOptions>,
    ) -> Result<BulkDeleteReport> {
        let foreign = objects
            .iter()
            .map(|o| (o.full_name(), &o.account_ref().name))
            .chain(
                containers
                    .iter()
                    .map(|c| (c.name().to_string(), &c.account_ref().name)),
            )
            .find(|(_, account)| account.as_str() != self.name());
        if let Some((name, account)) = foreign {
            return Err(Error::InvalidRequest(format!(
                "cannot bulk-delete {name} in account {account} through account {}",
                self.name()
            )));
        }

        let paths = objects
            .iter()
            .map(|o| (o.container_name(), Some(o.name())))
            .chain(containers.iter().map(|c| (c.name(), None)))
            .map(|(container, object)| {
                check_names(container, object)?;
                Ok(encode_path(container, object))
            })
            .collect::<Result<Vec<String>>>()?;

        let mut report = BulkDeleteReport::default();
        let batch_size = self.settings().bulk_delete_batch_size.max(1);
        for batch in paths.chunks(batch_size) {
            let mut options = RequestOptions::cloned(opts, None);
            options
                .values
                .insert("bulk-delete".to_string(), "true".to_string());
            options.headers.set("Content-Type", "text/plain");
            options.headers.set("Accept", "application/json");

            let mut content = batch.join("\n");
            content.push('\n');
            let response = Request::new(Method::POST)
                .options(options)
                .body(content)
                .expect([StatusCode::OK])
                .execute(self.inner().backend())
                .await?;
            let body = response.into_body().into_bytes().await?;
            let result = BulkResponse::parse(&body)?;

            report.deleted += result.deleted;
            report.not_found += result.not_found;
            if let Some(error) = result.error()? {
                tracing::warn!(
                    status = %error.status_code,
                    failed = error.object_errors.len(),
                    "Bulk delete reported failures"
                );
                report.error = Some(error);
                break;
            }
        }
        Ok(report)
    }

    /// Upload an archive and let Swift extract it.
    ///
    /// `upload_path` is empty (archive entries name `container/object`), a
    /// container name, or `container/prefix`. Files that were extracted stay
    /// stored even when others in the same archive fail.
    pub async fn bulk_upload(
        &self,
        upload_path: &str,
        format: ArchiveFormat,
        archive: impl Into<Body>,
        opts: Option<&RequestOptions>,
    ) -> Result<BulkUploadReport> {
        let mut options = RequestOptions::cloned(opts, None);
        options
            .values
            .insert("extract-archive".to_string(), format.as_str().to_string());
        options.headers.set("Accept", "application/json");

        let mut request = Request::new(Method::PUT)
            .options(options)
            .body(archive)
            .expect([StatusCode::OK, StatusCode::CREATED]);
        let upload_path = upload_path.trim_matches('/');
        if !upload_path.is_empty() {
            request = match upload_path.split_once('/') {
                Some((container, prefix)) => request.container(container).object(prefix),
                None => request.container(upload_path),
            };
        }

        let response = request.execute(self.inner().backend()).await?;
        let body = response.into_body().into_bytes().await?;
        let result = BulkResponse::parse(&body)?;
        let error = result.error()?;
        if let Some(error) = &error {
            tracing::warn!(
                status = %error.status_code,
                failed = error.object_errors.len(),
                "Bulk upload reported failures"
            );
        }
        Ok(BulkUploadReport {
            created: result.created,
            error,
        })
    }
}
