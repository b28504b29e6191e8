//! Fixed-point reference resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{DomainError, DomainResult};
use crate::extraction::MultiObjectResult;
use crate::model::Mrid;

use super::config::ResolverConfig;
use super::context::ResolutionContext;
use super::traits::{LocalStore, ObjectFetcher};

/// Closes a partially fetched subgraph by fetching every outstanding
/// reference target until no new identifiers appear.
pub struct ReferenceResolver<S, F> {
    store: Arc<S>,
    fetcher: Arc<F>,
    config: ResolverConfig,
}

impl<S, F> ReferenceResolver<S, F>
where
    S: LocalStore + 'static,
    F: ObjectFetcher + 'static,
{
    /// Creates a new resolver with the default configuration.
    pub fn new(store: Arc<S>, fetcher: Arc<F>) -> Self {
        Self::with_config(store, fetcher, ResolverConfig::default())
    }

    /// Creates a new resolver with custom configuration.
    pub fn with_config(store: Arc<S>, fetcher: Arc<F>, config: ResolverConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every reference reachable from `seed`.
    ///
    /// Returns the seed merged with everything fetched along the way. Any
    /// fetch failure aborts the whole resolution.
    #[instrument(skip(self, seed), fields(seed = seed.len()))]
    pub async fn resolve(&self, seed: MultiObjectResult) -> DomainResult<MultiObjectResult> {
        let mut ctx = ResolutionContext::new();
        let mut frontier: Vec<Mrid> = seed.objects.keys().cloned().collect();
        let mut result = seed;

        loop {
            let targets = self.pending_targets(&frontier, &ctx);
            if targets.is_empty() {
                debug!(passes = ctx.passes, objects = result.len(), "reached fixed point");
                return Ok(result);
            }

            if ctx.passes >= self.config.max_passes {
                return Err(DomainError::PassLimitExceeded {
                    max_passes: self.config.max_passes,
                });
            }

            debug!(
                pass = ctx.passes + 1,
                phase = ?ctx.phase(),
                targets = targets.len(),
                "fetching unresolved references"
            );
            ctx.advance(&targets);

            let fetched = self.fetcher.fetch_objects(targets).await?;
            frontier = fetched
                .objects
                .keys()
                .filter(|mrid| !result.contains(mrid))
                .cloned()
                .collect();
            result.merge(fetched);
        }
    }

    /// Deduplicated targets of the outstanding references made by `frontier`
    /// that the current pass admits and that have not been tried yet.
    fn pending_targets(&self, frontier: &[Mrid], ctx: &ResolutionContext) -> Vec<Mrid> {
        let targets: BTreeSet<Mrid> = frontier
            .iter()
            .flat_map(|mrid| self.store.unresolved_references_from(mrid))
            .filter(|reference| ctx.admits(reference))
            .map(|reference| reference.to)
            .filter(|to| !ctx.was_requested(to))
            .collect();
        targets.into_iter().collect()
    }
}
