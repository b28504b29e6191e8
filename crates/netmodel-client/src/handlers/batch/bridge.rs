//! Bridges a transport response stream to the task awaiting the exchange.
//!
//! A worker task pumps the response stream into a bounded channel and then
//! reports how the exchange ended through a one-shot completion. The calling
//! side only ever reads; it never shares a collection with the worker.
//! Dropping the awaiting side aborts the worker along with the transport
//! stream it holds.

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use netmodel_domain::{DomainError, DomainResult};

use crate::transport::{status_to_error, ResponseStream};

/// How an exchange ended, as seen by the worker task.
#[derive(Debug)]
pub enum Completion {
    /// The server closed the stream normally.
    Completed { received: usize },
    /// The stream ended with an error status.
    Failed(DomainError),
    /// The awaiting side went away before the stream ended.
    Abandoned,
}

/// Responses of one exchange, delivered to the awaiting task.
pub struct AwaitableResponses<T> {
    operation: &'static str,
    receiver: mpsc::Receiver<T>,
    completion: oneshot::Receiver<Completion>,
    _worker: AbortOnDrop,
}

/// Aborts the pump task when the awaiting side is dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T: Send + 'static> AwaitableResponses<T> {
    /// Starts pumping `responses` on a worker task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(operation: &'static str, responses: ResponseStream<T>, buffer: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let (done, completion) = oneshot::channel();
        let worker = tokio::spawn(pump(operation, responses, sender, done));

        Self {
            operation,
            receiver,
            completion,
            _worker: AbortOnDrop(worker.abort_handle()),
        }
    }

    /// Yields every response, then the terminal error if the exchange failed.
    pub fn into_stream(self) -> BoxStream<'static, DomainResult<T>> {
        stream::unfold(Some(self), |state| async move {
            let mut bridge = state?;
            if let Some(item) = bridge.receiver.recv().await {
                return Some((Ok(item), Some(bridge)));
            }

            match bridge.completion.await {
                Ok(Completion::Completed { .. }) => None,
                Ok(Completion::Failed(error)) => Some((Err(error), None)),
                Ok(Completion::Abandoned) | Err(_) => Some((
                    Err(DomainError::ChannelClosed {
                        operation: bridge.operation.to_string(),
                    }),
                    None,
                )),
            }
        })
        .boxed()
    }
}

async fn pump<T>(
    operation: &'static str,
    mut responses: ResponseStream<T>,
    sender: mpsc::Sender<T>,
    done: oneshot::Sender<Completion>,
) {
    let mut received = 0usize;
    let completion = loop {
        match responses.next().await {
            Some(Ok(item)) => {
                if sender.send(item).await.is_err() {
                    break Completion::Abandoned;
                }
                received += 1;
            }
            Some(Err(status)) => {
                debug!(operation, code = ?status.code(), "exchange failed");
                break Completion::Failed(status_to_error(status));
            }
            None => break Completion::Completed { received },
        }
    };

    trace!(operation, ?completion, "exchange finished");
    // The receiver may already be gone.
    let _ = done.send(completion);
}
