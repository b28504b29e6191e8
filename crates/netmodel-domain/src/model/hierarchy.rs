//! Snapshot of the top-level organisational hierarchy.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::object::NetworkObject;
use super::types::{EntityType, Mrid, Role};

/// Which optional hierarchy levels to request.
///
/// Regions, sub-regions, substations and feeders are always included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySelection {
    #[serde(default = "default_true")]
    pub include_circuits: bool,
    #[serde(default = "default_true")]
    pub include_loops: bool,
    #[serde(default)]
    pub include_lv_feeders: bool,
}

impl Default for HierarchySelection {
    fn default() -> Self {
        Self {
            include_circuits: true,
            include_loops: true,
            include_lv_feeders: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl HierarchySelection {
    pub fn with_lv_feeders(mut self, include: bool) -> Self {
        self.include_lv_feeders = include;
        self
    }

    pub fn with_circuits(mut self, include: bool) -> Self {
        self.include_circuits = include;
        self
    }

    pub fn with_loops(mut self, include: bool) -> Self {
        self.include_loops = include;
        self
    }
}

type Level = BTreeMap<Mrid, Arc<NetworkObject>>;

/// Circuits and substations a loop declares, sorted and deduplicated.
pub fn loop_containers(lp: &NetworkObject) -> Vec<Mrid> {
    let mut containers: Vec<Mrid> = lp
        .references()
        .iter()
        .filter(|(role, _)| matches!(role, Role::Circuits | Role::LoopSubstations))
        .map(|(_, mrid)| mrid.clone())
        .collect();
    containers.sort();
    containers.dedup();
    containers
}

/// Top-level organisational snapshot: regions, sub-regions, substations,
/// feeders, circuits, loops and (optionally) low-voltage feeders.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct NetworkHierarchy {
    pub geographical_regions: Level,
    pub sub_geographical_regions: Level,
    pub substations: Level,
    pub feeders: Level,
    pub circuits: Level,
    pub loops: Level,
    pub lv_feeders: Level,
    pub selection: HierarchySelection,
    pub fetched_at: DateTime<Utc>,
}

impl NetworkHierarchy {
    /// Creates an empty hierarchy stamped with the current time.
    pub fn new(selection: HierarchySelection) -> Self {
        Self {
            geographical_regions: Level::new(),
            sub_geographical_regions: Level::new(),
            substations: Level::new(),
            feeders: Level::new(),
            circuits: Level::new(),
            loops: Level::new(),
            lv_feeders: Level::new(),
            selection,
            fetched_at: Utc::now(),
        }
    }

    /// Files an object under the level matching its type.
    ///
    /// Returns false when the type is not a hierarchy level.
    pub fn insert(&mut self, object: Arc<NetworkObject>) -> bool {
        let level = match object.entity_type() {
            EntityType::GeographicalRegion => &mut self.geographical_regions,
            EntityType::SubGeographicalRegion => &mut self.sub_geographical_regions,
            EntityType::Substation => &mut self.substations,
            EntityType::Feeder => &mut self.feeders,
            EntityType::Circuit => &mut self.circuits,
            EntityType::Loop => &mut self.loops,
            EntityType::LvFeeder => &mut self.lv_feeders,
            _ => return false,
        };
        level.insert(object.mrid().clone(), object);
        true
    }

    /// Looks an identifier up across every level.
    pub fn get(&self, mrid: &Mrid) -> Option<&Arc<NetworkObject>> {
        self.levels().find_map(|level| level.get(mrid))
    }

    /// Total number of objects across all levels.
    pub fn len(&self) -> usize {
        self.levels().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Containers (circuits and substations) that make up a cached loop.
    pub fn loop_containers(&self, loop_mrid: &Mrid) -> Option<Vec<Mrid>> {
        self.loops.get(loop_mrid).map(|lp| loop_containers(lp))
    }

    fn levels(&self) -> impl Iterator<Item = &Level> {
        [
            &self.geographical_regions,
            &self.sub_geographical_regions,
            &self.substations,
            &self.feeders,
            &self.circuits,
            &self.loops,
            &self.lv_feeders,
        ]
        .into_iter()
    }
}
