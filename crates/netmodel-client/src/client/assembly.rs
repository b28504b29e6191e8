//! Container assembly.
//!
//! Assembling a container means fetching it, checking it is the type the
//! caller asked for, fetching what it holds, and then letting the resolver
//! close every reference the new objects make. A type mismatch fails before
//! any equipment is requested.

use tracing::debug;

use netmodel_domain::model::loop_containers;
use netmodel_domain::resolver::LocalStore;
use netmodel_domain::{DomainError, DomainResult, EntityType, Mrid, MultiObjectResult};

use super::NetworkConsumerClient;
use crate::transport::NetworkTransport;

impl<T, S> NetworkConsumerClient<T, S>
where
    T: NetworkTransport,
    S: LocalStore + 'static,
{
    /// Assembles the given containers, all of which must be `expected`.
    pub(crate) async fn get_with_references(
        &self,
        mrids: &[Mrid],
        expected: EntityType,
    ) -> DomainResult<MultiObjectResult> {
        self.hierarchy(self.selection).await?;

        let containers = self.fetcher.identified_objects(mrids.to_vec()).await?;

        let offenders: Vec<_> = containers
            .objects
            .values()
            .filter(|object| object.entity_type() != expected)
            .collect();
        if !offenders.is_empty() {
            return Err(DomainError::type_mismatch(
                expected,
                offenders
                    .iter()
                    .map(|object| (object.mrid(), object.entity_type())),
            ));
        }

        let additional = self.additional_for(expected, &containers).await?;
        debug!(
            containers = containers.len(),
            additional = additional.len(),
            "assembling containers"
        );

        let mut result = containers;
        result.merge(additional);
        self.resolver.resolve(result).await
    }

    /// Single-container form; an empty result is reported as not found.
    pub(crate) async fn get_single_with_references(
        &self,
        mrid: &Mrid,
        expected: EntityType,
    ) -> DomainResult<MultiObjectResult> {
        let result = self
            .get_with_references(std::slice::from_ref(mrid), expected)
            .await?;
        if result.is_empty() {
            return Err(DomainError::NotFound { mrid: mrid.clone() });
        }
        Ok(result)
    }

    /// Type-specific fetch of what the containers hold.
    async fn additional_for(
        &self,
        expected: EntityType,
        containers: &MultiObjectResult,
    ) -> DomainResult<MultiObjectResult> {
        let mrids: Vec<Mrid> = containers.objects.keys().cloned().collect();

        match expected {
            EntityType::Loop => {
                let held: Vec<Mrid> = containers
                    .objects
                    .values()
                    .flat_map(|lp| loop_containers(lp))
                    .collect();
                let mut additional = self.fetcher.identified_objects(held.clone()).await?;
                additional.merge(self.fetcher.equipment_for_containers(held).await?);
                Ok(additional)
            }
            EntityType::OperationalRestriction => {
                let mut additional = MultiObjectResult::new();
                for mrid in mrids {
                    additional.merge(self.fetcher.equipment_for_restriction(mrid).await?);
                }
                Ok(additional)
            }
            // The hierarchy already holds everything below a region.
            EntityType::GeographicalRegion | EntityType::SubGeographicalRegion => {
                Ok(MultiObjectResult::new())
            }
            other if other.is_container() => self.fetcher.equipment_for_containers(mrids).await,
            _ => Ok(MultiObjectResult::new()),
        }
    }
}
