//! Fixed-capacity slot arrays: villager inventories and storages

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{StorageId, Vec2, VillagerId};
use crate::world::resources::{ResourceCategory, ResourceType};

/// One typed stack occupying a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub kind: ResourceType,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slots {
    slots: Vec<Option<Stack>>,
    stack_limit: u32,
}

impl Slots {
    pub fn new(capacity: usize, stack_limit: u32) -> Self {
        Self {
            slots: vec![None; capacity],
            stack_limit,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Nothing at all can be added
    pub fn is_full(&self) -> bool {
        self.slots
            .iter()
            .all(|s| matches!(s, Some(stack) if stack.count >= self.stack_limit))
    }

    pub fn can_accept(&self, kind: ResourceType) -> bool {
        self.slots.iter().any(|s| match s {
            None => true,
            Some(stack) => stack.kind == kind && stack.count < self.stack_limit,
        })
    }

    pub fn can_accept_category(&self, category: ResourceCategory) -> bool {
        ResourceType::of_category(category).any(|kind| self.can_accept(kind))
    }

    pub fn count(&self, kind: ResourceType) -> u32 {
        self.stacks().filter(|s| s.kind == kind).map(|s| s.count).sum()
    }

    pub fn count_category(&self, category: ResourceCategory) -> u32 {
        self.stacks()
            .filter(|s| s.kind.category() == category)
            .map(|s| s.count)
            .sum()
    }

    pub fn first_of_category(&self, category: ResourceCategory) -> Option<ResourceType> {
        self.stacks()
            .find(|s| s.kind.category() == category)
            .map(|s| s.kind)
    }

    pub fn holds_category(&self, category: ResourceCategory) -> bool {
        self.first_of_category(category).is_some()
    }

    /// Adds up to `count` units, topping up matching stacks before opening
    /// empty slots. Returns how many were added.
    pub fn add(&mut self, kind: ResourceType, count: u32) -> u32 {
        let mut remaining = count;
        for stack in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if stack.kind == kind && stack.count < self.stack_limit {
                let moved = remaining.min(self.stack_limit - stack.count);
                stack.count += moved;
                remaining -= moved;
            }
        }
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let moved = remaining.min(self.stack_limit);
                *slot = Some(Stack { kind, count: moved });
                remaining -= moved;
            }
        }
        count - remaining
    }

    /// Removes up to `max` units of `kind`. Returns how many were removed.
    pub fn take(&mut self, kind: ResourceType, max: u32) -> u32 {
        let mut taken = 0;
        for slot in self.slots.iter_mut() {
            if taken == max {
                break;
            }
            if let Some(stack) = slot {
                if stack.kind == kind {
                    let moved = (max - taken).min(stack.count);
                    stack.count -= moved;
                    taken += moved;
                    if stack.count == 0 {
                        *slot = None;
                    }
                }
            }
        }
        taken
    }

    /// Moves everything that fits into `other`. Returns units moved.
    pub fn transfer_into(&mut self, other: &mut Slots) -> u32 {
        let kinds: Vec<ResourceType> = self.stacks().map(|s| s.kind).collect();
        let mut moved = 0;
        for kind in kinds {
            let available = self.count(kind);
            let added = other.add(kind, available);
            self.take(kind, added);
            moved += added;
        }
        moved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub id: StorageId,
    pub position: Vec2,
    /// `None` for the communal storage
    pub owner: Option<VillagerId>,
    pub slots: Slots,
}

impl Storage {
    pub fn is_communal(&self) -> bool {
        self.owner.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Storages {
    items: Vec<Storage>,
}

impl Storages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: Vec2, owner: Option<VillagerId>, slots: Slots) -> StorageId {
        let id = StorageId(self.items.len() as u32);
        self.items.push(Storage {
            id,
            position,
            owner,
            slots,
        });
        id
    }

    pub fn get(&self, id: StorageId) -> Option<&Storage> {
        self.items.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: StorageId) -> Option<&mut Storage> {
        self.items.get_mut(id.0 as usize)
    }

    pub fn require(&self, id: StorageId) -> Result<&Storage> {
        self.get(id).ok_or(SimError::StorageNotFound(id))
    }

    pub fn require_mut(&mut self, id: StorageId) -> Result<&mut Storage> {
        self.get_mut(id).ok_or(SimError::StorageNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Storage> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
