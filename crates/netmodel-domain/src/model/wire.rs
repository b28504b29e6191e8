//! Wire payloads and their decoding into [`NetworkObject`]s.
//!
//! Each payload variant carries the references its message declares. Decoding
//! is an exhaustive match; payloads this client does not understand arrive as
//! [`WirePayload::Unsupported`] and fail explicitly.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::object::NetworkObject;
use super::types::{EntityType, Mrid, Role};

/// Kinds of conducting equipment carried by [`WirePayload::ConductingEquipment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    Breaker,
    Fuse,
    Junction,
    AcLineSegment,
    PowerTransformer,
    EnergyConsumer,
    EnergySource,
}

impl From<EquipmentKind> for EntityType {
    fn from(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Breaker => EntityType::Breaker,
            EquipmentKind::Fuse => EntityType::Fuse,
            EquipmentKind::Junction => EntityType::Junction,
            EquipmentKind::AcLineSegment => EntityType::AcLineSegment,
            EquipmentKind::PowerTransformer => EntityType::PowerTransformer,
            EquipmentKind::EnergyConsumer => EntityType::EnergyConsumer,
            EquipmentKind::EnergySource => EntityType::EnergySource,
        }
    }
}

/// Type-specific content of a wire object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WirePayload {
    GeographicalRegion {
        sub_geographical_regions: Vec<Mrid>,
    },
    SubGeographicalRegion {
        geographical_region: Option<Mrid>,
        substations: Vec<Mrid>,
    },
    Substation {
        sub_geographical_region: Option<Mrid>,
        normal_energized_feeders: Vec<Mrid>,
        loops: Vec<Mrid>,
    },
    Site,
    Feeder {
        normal_head_terminal: Option<Mrid>,
        normal_energizing_substation: Option<Mrid>,
    },
    LvFeeder {
        normal_head_terminal: Option<Mrid>,
    },
    Circuit {
        loop_: Option<Mrid>,
        end_terminals: Vec<Mrid>,
    },
    Loop {
        circuits: Vec<Mrid>,
        substations: Vec<Mrid>,
    },
    OperationalRestriction,
    Terminal {
        conducting_equipment: Option<Mrid>,
        connectivity_node: Option<Mrid>,
    },
    ConnectivityNode,
    ConductingEquipment {
        kind: EquipmentKind,
        terminals: Vec<Mrid>,
        equipment_containers: Vec<Mrid>,
    },
    /// A payload variant this client has no decoder for.
    Unsupported { type_name: String },
}

/// One identified object as delivered by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireObject {
    pub mrid: Mrid,
    pub name: String,
    pub payload: WirePayload,
}

impl WireObject {
    pub fn new(mrid: impl Into<Mrid>, name: impl Into<String>, payload: WirePayload) -> Self {
        Self {
            mrid: mrid.into(),
            name: name.into(),
            payload,
        }
    }
}

impl TryFrom<WireObject> for NetworkObject {
    type Error = DomainError;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        let WireObject {
            mrid,
            name,
            payload,
        } = wire;

        let object = match payload {
            WirePayload::GeographicalRegion {
                sub_geographical_regions,
            } => NetworkObject::new(mrid, EntityType::GeographicalRegion, name)
                .with_references(Role::SubGeographicalRegions, sub_geographical_regions),
            WirePayload::SubGeographicalRegion {
                geographical_region,
                substations,
            } => NetworkObject::new(mrid, EntityType::SubGeographicalRegion, name)
                .with_references(Role::GeographicalRegion, geographical_region)
                .with_references(Role::Substations, substations),
            WirePayload::Substation {
                sub_geographical_region,
                normal_energized_feeders,
                loops,
            } => NetworkObject::new(mrid, EntityType::Substation, name)
                .with_references(Role::SubGeographicalRegion, sub_geographical_region)
                .with_references(Role::NormalEnergizedFeeders, normal_energized_feeders)
                .with_references(Role::SubstationLoops, loops),
            WirePayload::Site => NetworkObject::new(mrid, EntityType::Site, name),
            WirePayload::Feeder {
                normal_head_terminal,
                normal_energizing_substation,
            } => NetworkObject::new(mrid, EntityType::Feeder, name)
                .with_references(Role::NormalHeadTerminal, normal_head_terminal)
                .with_references(Role::NormalEnergizingSubstation, normal_energizing_substation),
            WirePayload::LvFeeder {
                normal_head_terminal,
            } => NetworkObject::new(mrid, EntityType::LvFeeder, name)
                .with_references(Role::NormalHeadTerminal, normal_head_terminal),
            WirePayload::Circuit {
                loop_,
                end_terminals,
            } => NetworkObject::new(mrid, EntityType::Circuit, name)
                .with_references(Role::Loop, loop_)
                .with_references(Role::EndTerminals, end_terminals),
            WirePayload::Loop {
                circuits,
                substations,
            } => NetworkObject::new(mrid, EntityType::Loop, name)
                .with_references(Role::Circuits, circuits)
                .with_references(Role::LoopSubstations, substations),
            WirePayload::OperationalRestriction => {
                NetworkObject::new(mrid, EntityType::OperationalRestriction, name)
            }
            WirePayload::Terminal {
                conducting_equipment,
                connectivity_node,
            } => NetworkObject::new(mrid, EntityType::Terminal, name)
                .with_references(Role::ConductingEquipment, conducting_equipment)
                .with_references(Role::ConnectivityNode, connectivity_node),
            WirePayload::ConnectivityNode => {
                NetworkObject::new(mrid, EntityType::ConnectivityNode, name)
            }
            WirePayload::ConductingEquipment {
                kind,
                terminals,
                equipment_containers,
            } => NetworkObject::new(mrid, EntityType::from(kind), name)
                .with_references(Role::Terminals, terminals)
                .with_references(Role::EquipmentContainers, equipment_containers),
            WirePayload::Unsupported { type_name } => {
                return Err(DomainError::UnsupportedPayload { mrid, type_name });
            }
        };

        Ok(object)
    }
}

/// One message of the network hierarchy exchange, one list per level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyResponse {
    pub geographical_regions: Vec<WireObject>,
    pub sub_geographical_regions: Vec<WireObject>,
    pub substations: Vec<WireObject>,
    pub feeders: Vec<WireObject>,
    pub circuits: Vec<WireObject>,
    pub loops: Vec<WireObject>,
    pub lv_feeders: Vec<WireObject>,
}

impl HierarchyResponse {
    /// Every object in the message, top level first.
    pub fn into_objects(self) -> impl Iterator<Item = WireObject> {
        self.geographical_regions
            .into_iter()
            .chain(self.sub_geographical_regions)
            .chain(self.substations)
            .chain(self.feeders)
            .chain(self.circuits)
            .chain(self.loops)
            .chain(self.lv_feeders)
    }
}
