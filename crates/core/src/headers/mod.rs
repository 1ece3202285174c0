//! Header sets with typed field access
//!
//! [`Headers`] is a case-insensitive map that stores names in canonical form
//! (`x-object-meta-foo` becomes `X-Object-Meta-Foo`). The typed wrappers
//! [`AccountHeaders`], [`ContainerHeaders`] and [`ObjectHeaders`] expose the
//! fields Swift knows about for each kind of resource.

mod field;

use std::collections::BTreeMap;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::options::RequestOptions;

pub use field::{
    FieldHttpTimestamp, FieldMetadata, FieldString, FieldTimestamp, FieldUint64,
    FieldUint64Readonly, FieldUnixTime, FieldValue,
};

/// Canonical form of a header name: every dash-separated word starts with an
/// uppercase letter, the rest is lowercase.
pub fn canonical_header_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = true;
    for ch in key.chars() {
        if upper {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        upper = ch == '-';
    }
    out
}

/// Case-insensitive mapping of header names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&canonical_header_key(key))
            .map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(canonical_header_key(key), value.into());
    }

    pub fn del(&mut self, key: &str) {
        self.entries.remove(&canonical_header_key(key));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&canonical_header_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every entry of `other` into this set, overwriting duplicates
    pub fn extend_from(&mut self, other: &Headers) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Read a response header map. Only the first value of a repeated header
    /// is kept; values that are not valid UTF-8 are converted lossily.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for name in map.keys() {
            if let Some(value) = map.get(name) {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                headers.set(name.as_str(), value);
            }
        }
        headers
    }

    /// Build a request header map
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (k, v) in &self.entries {
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| Error::BadHeader {
                name: k.clone(),
                message: e.to_string(),
            })?;
            let value = HeaderValue::from_str(v).map_err(|e| Error::BadHeader {
                name: k.clone(),
                message: e.to_string(),
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Request options carrying these headers and no query parameters
    pub fn to_options(&self) -> RequestOptions {
        RequestOptions {
            headers: self.clone(),
            ..RequestOptions::default()
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k.as_ref(), v);
        }
        headers
    }
}

macro_rules! rw_field {
    ($(#[$m:meta])* $get:ident, $get_mut:ident, $ty:ident, $key:literal) => {
        $(#[$m])*
        pub fn $get(&self) -> $ty<&Headers> {
            $ty::new(&self.headers, $key)
        }

        pub fn $get_mut(&mut self) -> $ty<&mut Headers> {
            $ty::new(&mut self.headers, $key)
        }
    };
}

macro_rules! ro_field {
    ($(#[$m:meta])* $get:ident, $ty:ident, $key:literal) => {
        $(#[$m])*
        pub fn $get(&self) -> $ty<&Headers> {
            $ty::new(&self.headers, $key)
        }
    };
}

macro_rules! metadata_field {
    ($prefix:literal) => {
        /// User metadata, addressed by key without the header prefix
        pub fn metadata(&self) -> FieldMetadata<&Headers> {
            FieldMetadata::new(&self.headers, $prefix)
        }

        pub fn metadata_mut(&mut self) -> FieldMetadata<&mut Headers> {
            FieldMetadata::new(&mut self.headers, $prefix)
        }
    };
}

macro_rules! header_set {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            headers: Headers,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// The underlying header map
            pub fn headers(&self) -> &Headers {
                &self.headers
            }

            pub fn headers_mut(&mut self) -> &mut Headers {
                &mut self.headers
            }

            pub fn into_headers(self) -> Headers {
                self.headers
            }

            /// Shorthand for `headers().get(key)`
            pub fn get(&self, key: &str) -> Option<&str> {
                self.headers.get(key)
            }

            /// Request options carrying these headers
            pub fn to_options(&self) -> RequestOptions {
                self.headers.to_options()
            }
        }

        impl From<Headers> for $name {
            fn from(headers: Headers) -> Self {
                Self { headers }
            }
        }
    };
}

header_set!(
    /// Headers of a Swift account
    AccountHeaders
);

impl AccountHeaders {
    ro_field!(
        /// `X-Account-Bytes-Used`
        bytes_used, FieldUint64Readonly, "X-Account-Bytes-Used"
    );
    ro_field!(container_count, FieldUint64Readonly, "X-Account-Container-Count");
    ro_field!(object_count, FieldUint64Readonly, "X-Account-Object-Count");
    rw_field!(
        /// Quota enforced by the account_quotas middleware
        bytes_used_quota,
        bytes_used_quota_mut,
        FieldUint64,
        "X-Account-Meta-Quota-Bytes"
    );
    rw_field!(temp_url_key, temp_url_key_mut, FieldString, "X-Account-Meta-Temp-Url-Key");
    rw_field!(temp_url_key2, temp_url_key2_mut, FieldString, "X-Account-Meta-Temp-Url-Key-2");
    ro_field!(created_at, FieldTimestamp, "X-Timestamp");
    metadata_field!("X-Account-Meta-");

    /// Check that every typed field parses
    pub fn validate(&self) -> Result<()> {
        self.bytes_used().validate()?;
        self.container_count().validate()?;
        self.object_count().validate()?;
        self.bytes_used_quota().validate()?;
        self.created_at().validate()
    }
}

header_set!(
    /// Headers of a Swift container
    ContainerHeaders
);

impl ContainerHeaders {
    ro_field!(bytes_used, FieldUint64Readonly, "X-Container-Bytes-Used");
    ro_field!(object_count, FieldUint64Readonly, "X-Container-Object-Count");
    rw_field!(
        bytes_used_quota,
        bytes_used_quota_mut,
        FieldUint64,
        "X-Container-Meta-Quota-Bytes"
    );
    rw_field!(
        object_count_quota,
        object_count_quota_mut,
        FieldUint64,
        "X-Container-Meta-Quota-Count"
    );
    rw_field!(read_acl, read_acl_mut, FieldString, "X-Container-Read");
    rw_field!(write_acl, write_acl_mut, FieldString, "X-Container-Write");
    rw_field!(sync_to, sync_to_mut, FieldString, "X-Container-Sync-To");
    rw_field!(sync_key, sync_key_mut, FieldString, "X-Container-Sync-Key");
    rw_field!(temp_url_key, temp_url_key_mut, FieldString, "X-Container-Meta-Temp-Url-Key");
    rw_field!(
        temp_url_key2,
        temp_url_key2_mut,
        FieldString,
        "X-Container-Meta-Temp-Url-Key-2"
    );
    rw_field!(
        /// Can only be set when the container is created
        storage_policy,
        storage_policy_mut,
        FieldString,
        "X-Storage-Policy"
    );
    rw_field!(versions_location, versions_location_mut, FieldString, "X-Versions-Location");
    rw_field!(history_location, history_location_mut, FieldString, "X-History-Location");
    ro_field!(created_at, FieldTimestamp, "X-Timestamp");
    metadata_field!("X-Container-Meta-");

    /// Check that every typed field parses
    pub fn validate(&self) -> Result<()> {
        self.bytes_used().validate()?;
        self.object_count().validate()?;
        self.bytes_used_quota().validate()?;
        self.object_count_quota().validate()?;
        self.created_at().validate()
    }
}

header_set!(
    /// Headers of a Swift object
    ObjectHeaders
);

impl ObjectHeaders {
    rw_field!(content_type, content_type_mut, FieldString, "Content-Type");
    rw_field!(
        content_disposition,
        content_disposition_mut,
        FieldString,
        "Content-Disposition"
    );
    rw_field!(content_encoding, content_encoding_mut, FieldString, "Content-Encoding");
    rw_field!(
        /// MD5 checksum of the content, hex-encoded
        etag,
        etag_mut,
        FieldString,
        "Etag"
    );
    rw_field!(size_bytes, size_bytes_mut, FieldUint64, "Content-Length");
    rw_field!(
        /// When the object is scheduled for deletion
        expires_at,
        expires_at_mut,
        FieldUnixTime,
        "X-Delete-At"
    );
    ro_field!(updated_at, FieldHttpTimestamp, "Last-Modified");
    ro_field!(created_at, FieldTimestamp, "X-Timestamp");
    metadata_field!("X-Object-Meta-");

    /// Check that every typed field parses
    pub fn validate(&self) -> Result<()> {
        self.size_bytes().validate()?;
        self.expires_at().validate()?;
        self.updated_at().validate()?;
        self.created_at().validate()
    }
}
