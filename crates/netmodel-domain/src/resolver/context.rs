//! Internal pass state for the reference resolver.

use std::collections::HashSet;

use crate::model::{Mrid, UnresolvedReference};

/// Which pass the resolver is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The first pass follows every outstanding reference.
    Initial,
    /// Later passes skip container references.
    Subsequent,
}

/// State carried across resolution passes.
#[derive(Debug)]
pub(crate) struct ResolutionContext {
    /// Number of fetch passes performed so far.
    pub(crate) passes: u32,
    /// Every identifier already requested during this resolution.
    requested: HashSet<Mrid>,
}

impl ResolutionContext {
    pub(crate) fn new() -> Self {
        Self {
            passes: 0,
            requested: HashSet::new(),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        if self.passes == 0 {
            Phase::Initial
        } else {
            Phase::Subsequent
        }
    }

    /// Whether a reference should be followed on the current pass.
    pub(crate) fn admits(&self, reference: &UnresolvedReference) -> bool {
        match self.phase() {
            Phase::Initial => true,
            Phase::Subsequent => {
                !reference.from_type.is_container() && !reference.role.targets_container()
            }
        }
    }

    pub(crate) fn was_requested(&self, mrid: &Mrid) -> bool {
        self.requested.contains(mrid)
    }

    /// Records the identifiers about to be fetched and moves to the next pass.
    pub(crate) fn advance(&mut self, targets: &[Mrid]) {
        self.requested.extend(targets.iter().cloned());
        self.passes += 1;
    }
}
