//! Uploads fed by a writer callback
//!
//! The producer callback and the PUT request run concurrently, joined by a
//! bounded channel. Either side failing closes the channel for the other:
//! a producer error is pushed into the request body, and a failed request
//! drops the receiver so the next write fails.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures::stream;
use tokio::sync::mpsc;

use crate::body::Body;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::options::RequestOptions;

/// Write half of a streaming upload.
#[derive(Debug)]
pub struct BodyWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    closed: Arc<AtomicBool>,
}

impl BodyWriter {
    /// Append a chunk to the object content. Waits while the channel is full.
    ///
    /// Fails once the upload has stopped reading, usually because the
    /// server rejected the request.
    pub async fn write(&self, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        if data.is_empty() {
            return Ok(());
        }
        self.tx.send(Ok(data)).await.map_err(|_| {
            self.closed.store(true, Ordering::SeqCst);
            Error::Transport("upload stopped reading object content".to_string())
        })
    }
}

impl Object {
    /// Upload content generated by `producer`, which receives a
    /// [`BodyWriter`]. Prefer [`Object::upload`] when the content is already
    /// available as a body or stream.
    ///
    /// ```ignore
    /// object
    ///     .upload_with_writer(None, |w| async move {
    ///         w.write("Hello ").await?;
    ///         w.write("world\n").await
    ///     })
    ///     .await?;
    /// ```
    ///
    /// If the producer fails, its error is returned, unless it failed
    /// because the upload had already stopped, in which case the upload's
    /// error is returned.
    pub async fn upload_with_writer<F, Fut>(
        &mut self,
        opts: Option<&RequestOptions>,
        producer: F,
    ) -> Result<()>
    where
        F: FnOnce(BodyWriter) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let capacity = self.account_ref().settings.writer_channel_capacity.max(1);
        let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(capacity);
        let failure_tx = tx.clone();
        let closed = Arc::new(AtomicBool::new(false));
        let writer = BodyWriter {
            tx,
            closed: closed.clone(),
        };

        let body = Body::from_stream(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));

        let produce = async move {
            let result = producer(writer).await;
            if let Err(e) = &result {
                // the receiver may already be gone
                let _ = failure_tx.send(Err(io::Error::other(e.to_string()))).await;
            }
            result
        };

        let (produced, uploaded) = tokio::join!(produce, self.upload(body, opts));
        match produced {
            Ok(()) => uploaded,
            Err(e) if closed.load(Ordering::SeqCst) => Err(uploaded.err().unwrap_or(e)),
            Err(e) => Err(e),
        }
    }
}
