//! Strictly ordered execution of index mutations.

use futures::FutureExt;
use futures::future::BoxFuture;
use gacha_error::{GachaResult, StorageError, StorageErrorKind};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Single-worker FIFO queue for read-modify-write cycles on the index.
///
/// Tasks run one at a time in submission order, each seeing the committed
/// result of the previous one. A task that fails or panics does not stop the
/// worker. Once submitted, a task runs to completion even if the caller stops
/// waiting for it.
///
/// The queue is unbounded.
///
/// # Example
///
/// ```
/// use gacha_storage::{GachaError, WriteSerializer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let serializer = WriteSerializer::new();
/// let value = serializer.enqueue(|| async { Ok::<_, GachaError>(41 + 1) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WriteSerializer {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteSerializer {
    /// Spawn the worker task.
    ///
    /// Must be called from within a Tokio runtime. The worker stops once every
    /// handle has been dropped and the queue is drained.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::run(rx));
        Self { tx }
    }

    async fn run(mut rx: mpsc::UnboundedReceiver<Job>) {
        tracing::debug!("Write serializer started");
        while let Some(job) = rx.recv().await {
            if AssertUnwindSafe(job()).catch_unwind().await.is_err() {
                tracing::error!("Serialized task panicked");
            }
        }
        tracing::debug!("Write serializer stopped");
    }

    /// Queue `task` behind every previously queued task and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns the task's own error, or `SerializerClosed` if the worker is gone
    /// or the task panicked.
    pub async fn enqueue<F, Fut, T>(&self, task: F) -> GachaResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = GachaResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            async move {
                // Receiver may be gone if the caller gave up waiting
                let _ = done_tx.send(task().await);
            }
            .boxed()
        });

        self.tx.send(job).map_err(|_| {
            StorageError::new(StorageErrorKind::SerializerClosed(
                "worker is not running".to_string(),
            ))
        })?;

        done_rx.await.map_err(|_| {
            StorageError::new(StorageErrorKind::SerializerClosed(
                "task ended without a result".to_string(),
            ))
        })?
    }
}

impl Default for WriteSerializer {
    fn default() -> Self {
        Self::new()
    }
}
