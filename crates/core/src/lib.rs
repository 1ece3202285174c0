//! swc-core: Core library for the swc OpenStack Swift client
//!
//! This crate provides:
//! - Account, container and object handles with per-handle header caches
//! - Typed header access with a three-state field contract
//! - Uploads with precomputed or streaming MD5 verification, downloads,
//!   server-side copy and move
//! - Paginated container and object listings
//! - Bulk delete and archive upload with partial-failure reporting
//! - Configuration management
//!
//! This crate never talks to the network itself. All requests go through the
//! [`Backend`] trait; `swc-http` provides the implementation over `reqwest`.

pub mod account;
pub mod backend;
pub mod body;
pub mod bulk;
pub mod capabilities;
pub mod config;
pub mod container;
pub mod error;
pub mod headers;
pub mod iterator;
pub mod object;
pub mod options;
pub mod request;
pub mod retry;
pub mod writer;

pub use account::Account;
pub use backend::{Authenticator, Backend, Transport};
pub use body::{Body, ByteStream};
pub use bulk::{ArchiveFormat, BulkDeleteReport, BulkUploadReport};
pub use capabilities::Capabilities;
pub use config::{ClientSettings, Config, ConfigManager, Credentials};
pub use container::Container;
pub use error::{BulkError, BulkObjectError, Error, Result, UnexpectedStatusError};
pub use headers::{AccountHeaders, ContainerHeaders, FieldValue, Headers, ObjectHeaders};
pub use iterator::{ContainerInfo, ContainerIterator, ObjectInfo, ObjectIterator};
pub use object::{DownloadedObject, Object};
pub use options::RequestOptions;
pub use request::Request;
pub use retry::TokenBackend;
pub use writer::BodyWriter;
