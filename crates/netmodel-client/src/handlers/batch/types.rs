//! Data types for batched exchanges.

use netmodel_domain::Mrid;

/// Largest number of identifiers carried by one outgoing message.
pub const MAX_BATCH_SIZE: usize = 1000;

/// One outgoing request message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierBatch {
    pub mrids: Vec<Mrid>,
}

impl IdentifierBatch {
    pub fn new(mrids: Vec<Mrid>) -> Self {
        Self { mrids }
    }

    pub fn len(&self) -> usize {
        self.mrids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mrids.is_empty()
    }
}
