//! Dynamic world entities the AI queries every tick
//!
//! Each kind is a variant with its own required fields. Entities carry a
//! stable id so targets can be re-validated by identity as well as by
//! position.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, Vec2, VillagerId};
use crate::world::resources::ResourceType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Well {
        water: f32,
    },
    Fireplace {
        wood: f32,
        burning: bool,
    },
    Resource {
        kind: ResourceType,
        collected: bool,
    },
    SleepingBag {
        occupant: Option<VillagerId>,
    },
}

/// Coarse kind tag used for proximity re-validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    Well,
    Fireplace,
    Resource(ResourceType),
    SleepingBag,
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Well { .. } => EntityTag::Well,
            EntityKind::Fireplace { .. } => EntityTag::Fireplace,
            EntityKind::Resource { kind, .. } => EntityTag::Resource(*kind),
            EntityKind::SleepingBag { .. } => EntityTag::SleepingBag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub kind: EntityKind,
}

impl Entity {
    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    /// An entity that can still serve the purpose it would be targeted for
    pub fn is_available(&self) -> bool {
        match &self.kind {
            EntityKind::Well { water } => *water >= 1.0,
            EntityKind::Fireplace { .. } => true,
            EntityKind::Resource { collected, .. } => !collected,
            EntityKind::SleepingBag { .. } => true,
        }
    }

    pub fn fire_wood(&self) -> Option<f32> {
        match self.kind {
            EntityKind::Fireplace { wood, .. } => Some(wood),
            _ => None,
        }
    }
}

/// Entity collection in insertion order, with an id index
#[derive(Debug, Clone, Default)]
pub struct Entities {
    items: Vec<Entity>,
    index: AHashMap<EntityId, usize>,
    next_id: u32,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: Vec2, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.items.len());
        self.items.push(Entity { id, position, kind });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&i| &mut self.items[i])
    }

    /// Lookup for references that must exist (owned fireplace, bed)
    pub fn require(&self, id: EntityId) -> Result<&Entity> {
        self.get(id).ok_or(SimError::EntityNotFound(id))
    }

    pub fn require_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.get_mut(id).ok_or(SimError::EntityNotFound(id))
    }

    /// Wood level of a fireplace that must exist
    pub fn fire_wood(&self, id: EntityId) -> Result<f32> {
        self.require(id)?.fire_wood().ok_or(SimError::WrongEntityKind {
            id,
            expected: "fireplace",
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First available entity with the given tag within `tolerance` of `position`
    pub fn find_near(&self, tag: EntityTag, position: Vec2, tolerance: f32) -> Option<&Entity> {
        self.items.iter().find(|e| {
            e.tag() == tag && e.is_available() && e.position.distance(&position) <= tolerance
        })
    }

    pub fn uncollected_resources(&self) -> impl Iterator<Item = (&Entity, ResourceType)> {
        self.items.iter().filter_map(|e| match e.kind {
            EntityKind::Resource { kind, collected: false } => Some((e, kind)),
            _ => None,
        })
    }
}
