//! Typed accessors for individual header fields
//!
//! Every accessor is generic over how it holds the header map: `&Headers`
//! gives read access, `&mut Headers` additionally allows `set`, `clear`
//! and `del`. Read-only fields only ever hand out the shared variant.

use std::ops::{Deref, DerefMut};

use jiff::Timestamp;
use jiff::fmt::rfc2822;

use super::Headers;
use crate::error::{Error, Result};

/// Three-state view of a header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<T> {
    /// The header is not present
    Absent,
    /// The header is present with an empty value (clears the field when sent)
    Empty,
    /// The header is present with a value
    Value(T),
}

impl<T> FieldValue<T> {
    /// True only for [`FieldValue::Value`]
    pub fn exists(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldValue<U> {
        match self {
            FieldValue::Absent => FieldValue::Absent,
            FieldValue::Empty => FieldValue::Empty,
            FieldValue::Value(v) => FieldValue::Value(f(v)),
        }
    }
}

fn raw<'a>(headers: &'a Headers, key: &str) -> FieldValue<&'a str> {
    match headers.get(key) {
        None => FieldValue::Absent,
        Some("") => FieldValue::Empty,
        Some(value) => FieldValue::Value(value),
    }
}

fn parse_field<T>(
    headers: &Headers,
    key: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> Result<FieldValue<T>> {
    match raw(headers, key) {
        FieldValue::Absent => Ok(FieldValue::Absent),
        FieldValue::Empty => Ok(FieldValue::Empty),
        FieldValue::Value(value) => parse(value)
            .map(FieldValue::Value)
            .map_err(|message| Error::BadHeader {
                name: key.to_string(),
                message,
            }),
    }
}

fn parse_u64(value: &str) -> std::result::Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|e| format!("cannot parse {value:?} as unsigned integer: {e}"))
}

/// Parses the `X-Timestamp` encoding: decimal seconds since the epoch with an
/// optional fraction, e.g. `1525250222.12345`.
pub(crate) fn parse_fractional_timestamp(value: &str) -> std::result::Result<Timestamp, String> {
    let invalid = || format!("cannot parse {value:?} as fractional timestamp");
    let (secs, frac) = value.split_once('.').unwrap_or((value, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs = secs.parse::<i64>().map_err(|_| invalid())?;
    let mut nanos = 0i32;
    for (idx, digit) in frac.bytes().take(9).enumerate() {
        nanos += i32::from(digit - b'0') * 10i32.pow(8 - idx as u32);
    }
    Timestamp::new(secs, nanos).map_err(|e| format!("{}: {e}", invalid()))
}

fn parse_http_date(value: &str) -> std::result::Result<Timestamp, String> {
    static PARSER: rfc2822::DateTimeParser = rfc2822::DateTimeParser::new();
    PARSER
        .parse_timestamp(value)
        .map_err(|e| format!("cannot parse {value:?} as HTTP date: {e}"))
}

fn parse_unix_time(value: &str) -> std::result::Result<Timestamp, String> {
    let secs = value
        .parse::<i64>()
        .map_err(|e| format!("cannot parse {value:?} as Unix timestamp: {e}"))?;
    Timestamp::from_second(secs).map_err(|e| e.to_string())
}

macro_rules! field_common {
    ($name:ident) => {
        impl<H: Deref<Target = Headers>> $name<H> {
            pub(crate) fn new(headers: H, key: &'static str) -> Self {
                Self { headers, key }
            }

            /// The canonical header name
            pub fn key(&self) -> &'static str {
                self.key
            }

            /// True if the header is present with a non-empty value
            pub fn exists(&self) -> bool {
                raw(&self.headers, self.key).exists()
            }
        }
    };
}

macro_rules! field_removable {
    ($name:ident) => {
        impl<H: DerefMut<Target = Headers>> $name<H> {
            /// Set the header to an empty value. When sent in an update
            /// request, this removes the field on the server.
            pub fn clear(&mut self) {
                self.headers.set(self.key, "");
            }

            /// Remove the header from this header set
            pub fn del(&mut self) {
                self.headers.del(self.key);
            }
        }
    };
}

/// A read-write string header
#[derive(Debug)]
pub struct FieldString<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldString);
field_removable!(FieldString);

impl<H: Deref<Target = Headers>> FieldString<H> {
    pub fn get(&self) -> FieldValue<&str> {
        raw(&self.headers, self.key)
    }
}

impl<H: DerefMut<Target = Headers>> FieldString<H> {
    pub fn set(&mut self, value: impl Into<String>) {
        self.headers.set(self.key, value);
    }
}

/// A read-write unsigned integer header
#[derive(Debug)]
pub struct FieldUint64<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldUint64);
field_removable!(FieldUint64);

impl<H: Deref<Target = Headers>> FieldUint64<H> {
    pub fn get(&self) -> Result<FieldValue<u64>> {
        parse_field(&self.headers, self.key, parse_u64)
    }

    pub fn validate(&self) -> Result<()> {
        self.get().map(|_| ())
    }
}

impl<H: DerefMut<Target = Headers>> FieldUint64<H> {
    pub fn set(&mut self, value: u64) {
        self.headers.set(self.key, value.to_string());
    }
}

/// An unsigned integer header computed by the server
#[derive(Debug)]
pub struct FieldUint64Readonly<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldUint64Readonly);

impl<H: Deref<Target = Headers>> FieldUint64Readonly<H> {
    pub fn get(&self) -> Result<FieldValue<u64>> {
        parse_field(&self.headers, self.key, parse_u64)
    }

    pub fn validate(&self) -> Result<()> {
        self.get().map(|_| ())
    }
}

/// A timestamp in the `X-Timestamp` encoding (fractional seconds)
#[derive(Debug)]
pub struct FieldTimestamp<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldTimestamp);

impl<H: Deref<Target = Headers>> FieldTimestamp<H> {
    pub fn get(&self) -> Result<FieldValue<Timestamp>> {
        parse_field(&self.headers, self.key, parse_fractional_timestamp)
    }

    pub fn validate(&self) -> Result<()> {
        self.get().map(|_| ())
    }
}

/// A timestamp in HTTP-date encoding, e.g. `Last-Modified`
#[derive(Debug)]
pub struct FieldHttpTimestamp<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldHttpTimestamp);

impl<H: Deref<Target = Headers>> FieldHttpTimestamp<H> {
    pub fn get(&self) -> Result<FieldValue<Timestamp>> {
        parse_field(&self.headers, self.key, parse_http_date)
    }

    pub fn validate(&self) -> Result<()> {
        self.get().map(|_| ())
    }
}

/// A read-write timestamp in whole seconds since the epoch, e.g. `X-Delete-At`
#[derive(Debug)]
pub struct FieldUnixTime<H> {
    headers: H,
    key: &'static str,
}

field_common!(FieldUnixTime);
field_removable!(FieldUnixTime);

impl<H: Deref<Target = Headers>> FieldUnixTime<H> {
    pub fn get(&self) -> Result<FieldValue<Timestamp>> {
        parse_field(&self.headers, self.key, parse_unix_time)
    }

    pub fn validate(&self) -> Result<()> {
        self.get().map(|_| ())
    }
}

impl<H: DerefMut<Target = Headers>> FieldUnixTime<H> {
    pub fn set(&mut self, value: Timestamp) {
        self.headers.set(self.key, value.as_second().to_string());
    }
}

/// User metadata: headers named `<prefix><key>`, e.g. `X-Object-Meta-Color`.
///
/// Keys are case-insensitive.
#[derive(Debug)]
pub struct FieldMetadata<H> {
    headers: H,
    prefix: &'static str,
}

impl<H: Deref<Target = Headers>> FieldMetadata<H> {
    pub(crate) fn new(headers: H, prefix: &'static str) -> Self {
        Self { headers, prefix }
    }

    pub fn get(&self, key: &str) -> FieldValue<&str> {
        raw(&self.headers, &format!("{}{key}", self.prefix))
    }
}

impl<'a> FieldMetadata<&'a Headers> {
    /// All metadata entries, keyed without the prefix. The iterator borrows
    /// the headers, not this accessor.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        let headers: &'a Headers = self.headers;
        let prefix = super::canonical_header_key(self.prefix);
        headers
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix.as_str()).map(|rest| (rest, v)))
            .filter(|(k, _)| !k.is_empty())
    }
}

impl<H: DerefMut<Target = Headers>> FieldMetadata<H> {
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.headers.set(&format!("{}{key}", self.prefix), value);
    }

    /// Set the entry to an empty value, which deletes it on the server
    pub fn clear(&mut self, key: &str) {
        self.headers.set(&format!("{}{key}", self.prefix), "");
    }

    pub fn del(&mut self, key: &str) {
        self.headers.del(&format!("{}{key}", self.prefix));
    }
}
