//! Batched identifier exchanges.
//!
//! An exchange is driven in two steps:
//!
//! 1. **Planning**: the full set of identifiers is split into batches of at
//!    most [`MAX_BATCH_SIZE`] before anything is sent. The plan owns its
//!    batches, so nothing the response side does can change what is sent.
//! 2. **Bridging**: the transport's response stream is pumped on a worker
//!    task into a bounded channel; the calling task decodes and folds items
//!    and finally observes how the exchange completed.

mod bridge;
mod dispatcher;
mod types;

pub use bridge::{AwaitableResponses, Completion};
pub use dispatcher::{batch_send, BatchPlan, BatchSink};
pub use types::{IdentifierBatch, MAX_BATCH_SIZE};
