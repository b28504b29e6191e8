//! Splitting identifier sets into bounded outgoing batches.

use std::collections::HashSet;
use std::mem;

use futures::stream::{self, StreamExt};
use tracing::debug;

use netmodel_domain::Mrid;

use super::types::{IdentifierBatch, MAX_BATCH_SIZE};
use crate::transport::RequestStream;

/// Receiver of [`batch_send`] callbacks.
pub trait BatchSink {
    /// Adds one identifier to the batch being built.
    fn append(&mut self, mrid: Mrid);

    /// Ends the batch being built. May be called with nothing appended.
    fn flush(&mut self);
}

/// Feeds `mrids` to `sink`, flushing after every `batch_size` identifiers
/// and once more at the end for any trailing partial batch.
///
/// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
pub fn batch_send<I, S>(mrids: I, batch_size: usize, sink: &mut S)
where
    I: IntoIterator<Item = Mrid>,
    S: BatchSink + ?Sized,
{
    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    let mut pending = 0;

    for mrid in mrids {
        sink.append(mrid);
        pending += 1;
        if pending == batch_size {
            sink.flush();
            pending = 0;
        }
    }

    sink.flush();
}

/// The complete list of batches for one exchange, computed before sending.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    batches: Vec<IdentifierBatch>,
    current: Vec<Mrid>,
}

impl BatchPlan {
    /// Plans `mrids` in order, dropping repeated identifiers.
    pub fn new<I>(mrids: I, batch_size: usize) -> Self
    where
        I: IntoIterator<Item = Mrid>,
    {
        let mut seen = HashSet::new();
        let mut plan = Self::default();
        batch_send(
            mrids.into_iter().filter(|mrid| seen.insert(mrid.clone())),
            batch_size,
            &mut plan,
        );

        debug!(
            batches = plan.batches.len(),
            mrids = plan.total_mrids(),
            "planned identifier batches"
        );
        plan
    }

    pub fn batches(&self) -> &[IdentifierBatch] {
        &self.batches
    }

    /// Sizes of the planned batches, in send order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(IdentifierBatch::len).collect()
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of identifiers across all batches.
    pub fn total_mrids(&self) -> usize {
        self.batches.iter().map(IdentifierBatch::len).sum()
    }

    /// Every planned identifier, in send order.
    pub fn mrids(&self) -> impl Iterator<Item = &Mrid> + '_ {
        self.batches.iter().flat_map(|batch| batch.mrids.iter())
    }

    /// Turns the plan into the outgoing side of an exchange.
    pub fn into_request_stream(self) -> RequestStream {
        stream::iter(self.batches).boxed()
    }
}

impl BatchSink for BatchPlan {
    fn append(&mut self, mrid: Mrid) {
        self.current.push(mrid);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let mrids = mem::take(&mut self.current);
            self.batches.push(IdentifierBatch::new(mrids));
        }
    }
}
