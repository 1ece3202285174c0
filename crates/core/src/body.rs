//! Request and response bodies
//!
//! A [`Body`] is either absent, held in memory, or streamed. Only the first
//! two can be sent more than once, which matters for the auth-retry step in
//! [`crate::retry`] and for precomputing upload checksums.

use std::fmt;
use std::io;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};

use crate::error::Result;

/// Stream of body chunks
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Body of a request or response
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Bytes),
    Stream(ByteStream),
}

impl Body {
    /// Wrap an arbitrary chunk stream. The length of such a body is unknown
    /// until it has been read.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Body::Stream(stream.boxed())
    }

    /// The full content, if it is held in memory
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Empty => Some(&[][..]),
            Body::Bytes(bytes) => Some(&bytes[..]),
            Body::Stream(_) => None,
        }
    }

    /// Duplicate the body if it can be replayed.
    pub fn try_clone(&self) -> Option<Body> {
        match self {
            Body::Empty => Some(Body::Empty),
            Body::Bytes(bytes) => Some(Body::Bytes(bytes.clone())),
            Body::Stream(_) => None,
        }
    }

    /// Convert into a chunk stream
    pub fn into_stream(self) -> ByteStream {
        match self {
            Body::Empty => stream::empty().boxed(),
            Body::Bytes(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            Body::Stream(stream) => stream,
        }
    }

    /// Read the whole body into memory
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Bytes(bytes) => Ok(bytes),
            Body::Stream(stream) => {
                let buf = stream
                    .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                        buf.extend_from_slice(&chunk);
                        Ok(buf)
                    })
                    .await?;
                Ok(buf.freeze())
            }
        }
    }

    /// Read and discard the rest of the body so the connection can be reused
    pub async fn drain(self) -> Result<()> {
        if let Body::Stream(mut stream) = self {
            while let Some(chunk) = stream.next().await {
                chunk?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(bytes) => write!(f, "Body::Bytes({} bytes)", bytes.len()),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(data: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(data))
    }
}

impl From<&'static [u8]> for Body {
    fn from(data: &'static [u8]) -> Self {
        Body::Bytes(Bytes::from_static(data))
    }
}

impl From<String> for Body {
    fn from(data: String) -> Self {
        Body::Bytes(Bytes::from(data))
    }
}

impl From<&'static str> for Body {
    fn from(data: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(data.as_bytes()))
    }
}
