//! Core identifier and classification types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique reference to an entity (an "mRID").
///
/// Stable for the lifetime of the entity; used as the local store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mrid(String);

impl Mrid {
    /// Creates a new identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Mrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mrid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Mrid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Mrid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Mrid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The concrete type of a network entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    GeographicalRegion,
    SubGeographicalRegion,
    Substation,
    Site,
    Feeder,
    LvFeeder,
    Circuit,
    Loop,
    OperationalRestriction,
    Terminal,
    ConnectivityNode,
    Breaker,
    Fuse,
    Junction,
    AcLineSegment,
    PowerTransformer,
    EnergyConsumer,
    EnergySource,
}

impl EntityType {
    /// Returns the type name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::GeographicalRegion => "GeographicalRegion",
            EntityType::SubGeographicalRegion => "SubGeographicalRegion",
            EntityType::Substation => "Substation",
            EntityType::Site => "Site",
            EntityType::Feeder => "Feeder",
            EntityType::LvFeeder => "LvFeeder",
            EntityType::Circuit => "Circuit",
            EntityType::Loop => "Loop",
            EntityType::OperationalRestriction => "OperationalRestriction",
            EntityType::Terminal => "Terminal",
            EntityType::ConnectivityNode => "ConnectivityNode",
            EntityType::Breaker => "Breaker",
            EntityType::Fuse => "Fuse",
            EntityType::Junction => "Junction",
            EntityType::AcLineSegment => "AcLineSegment",
            EntityType::PowerTransformer => "PowerTransformer",
            EntityType::EnergyConsumer => "EnergyConsumer",
            EntityType::EnergySource => "EnergySource",
        }
    }

    /// Whether this type logically owns or groups other entities.
    ///
    /// References made by containers are only followed on the first
    /// resolution pass.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            EntityType::GeographicalRegion
                | EntityType::SubGeographicalRegion
                | EntityType::Substation
                | EntityType::Site
                | EntityType::Feeder
                | EntityType::LvFeeder
                | EntityType::Circuit
                | EntityType::Loop
                | EntityType::OperationalRestriction
        )
    }

    /// Whether this type is conducting equipment (has terminals).
    pub fn is_conducting_equipment(&self) -> bool {
        matches!(
            self,
            EntityType::Breaker
                | EntityType::Fuse
                | EntityType::Junction
                | EntityType::AcLineSegment
                | EntityType::PowerTransformer
                | EntityType::EnergyConsumer
                | EntityType::EnergySource
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named association from one entity to another.
///
/// Roles are paired: wiring `from --role--> to` also wires
/// `to --role.inverse()--> from` when the role has an inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Region -> its sub-regions.
    SubGeographicalRegions,
    /// Sub-region -> its parent region.
    GeographicalRegion,
    /// Sub-region -> its substations.
    Substations,
    /// Substation -> its sub-region.
    SubGeographicalRegion,
    /// Feeder -> the substation energising it.
    NormalEnergizingSubstation,
    /// Substation -> the feeders it energises.
    NormalEnergizedFeeders,
    /// Feeder or LV feeder -> its head terminal (no inverse).
    NormalHeadTerminal,
    /// Circuit -> its loop.
    Loop,
    /// Loop -> its circuits.
    Circuits,
    /// Loop -> the substations it passes through.
    LoopSubstations,
    /// Substation -> the loops passing through it.
    SubstationLoops,
    /// Circuit -> its end terminals (no inverse).
    EndTerminals,
    /// Equipment -> its terminals.
    Terminals,
    /// Terminal -> its equipment.
    ConductingEquipment,
    /// Terminal -> its connectivity node.
    ConnectivityNode,
    /// Connectivity node -> the terminals attached to it.
    NodeTerminals,
    /// Equipment -> the containers it belongs to.
    EquipmentContainers,
    /// Container -> the equipment it holds.
    Equipment,
}

impl Role {
    /// Returns the role wired on the target when this role is wired on the source.
    pub fn inverse(&self) -> Option<Role> {
        match self {
            Role::SubGeographicalRegions => Some(Role::GeographicalRegion),
            Role::GeographicalRegion => Some(Role::SubGeographicalRegions),
            Role::Substations => Some(Role::SubGeographicalRegion),
            Role::SubGeographicalRegion => Some(Role::Substations),
            Role::NormalEnergizingSubstation => Some(Role::NormalEnergizedFeeders),
            Role::NormalEnergizedFeeders => Some(Role::NormalEnergizingSubstation),
            Role::Loop => Some(Role::Circuits),
            Role::Circuits => Some(Role::Loop),
            Role::LoopSubstations => Some(Role::SubstationLoops),
            Role::SubstationLoops => Some(Role::LoopSubstations),
            Role::Terminals => Some(Role::ConductingEquipment),
            Role::ConductingEquipment => Some(Role::Terminals),
            Role::ConnectivityNode => Some(Role::NodeTerminals),
            Role::NodeTerminals => Some(Role::ConnectivityNode),
            Role::EquipmentContainers => Some(Role::Equipment),
            Role::Equipment => Some(Role::EquipmentContainers),
            Role::NormalHeadTerminal | Role::EndTerminals => None,
        }
    }

    /// Whether the entity on the far side of this role is a container.
    pub fn targets_container(&self) -> bool {
        matches!(
            self,
            Role::SubGeographicalRegions
                | Role::GeographicalRegion
                | Role::Substations
                | Role::SubGeographicalRegion
                | Role::NormalEnergizingSubstation
                | Role::NormalEnergizedFeeders
                | Role::Loop
                | Role::Circuits
                | Role::LoopSubstations
                | Role::SubstationLoops
                | Role::EquipmentContainers
        )
    }
}
