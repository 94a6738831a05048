//! Task tokens, action states and the action transition table
//!
//! The sub-action machine is data: `TRANSITIONS` lists rules in priority
//! order and the first rule whose source state matches and whose guard
//! holds decides the next state.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, StorageId, Vec2};
use crate::world::entities::EntityTag;
use crate::world::resources::{ResourceCategory, ResourceType};

/// What the active goal wants done right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Task {
    Drink,
    Eat,
    Warmup,
    FireRefill,
    ForageFood,
    ForageBurnable,
    Sleep,
    StoreItems,
}

impl Task {
    /// Item category the task gathers or consumes
    pub fn needed_category(&self) -> Option<ResourceCategory> {
        match self {
            Task::Eat | Task::ForageFood => Some(ResourceCategory::Food),
            Task::FireRefill | Task::ForageBurnable => Some(ResourceCategory::Burnable),
            _ => None,
        }
    }

    /// Collected items go straight to a facility instead of storage
    pub fn needs_immediate_use(&self) -> bool {
        matches!(self, Task::Eat | Task::FireRefill)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Wait,
    FindResources,
    MoveToResource,
    CollectResource,
    StoreItems,
    UseFacility,
    Sleep,
}

/// A concrete thing the villager is heading for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Entity {
        id: EntityId,
        tag: EntityTag,
        position: Vec2,
    },
    Storage {
        id: StorageId,
        /// Item to withdraw; `None` when depositing
        kind: Option<ResourceType>,
        position: Vec2,
    },
}

impl Target {
    pub fn position(&self) -> Vec2 {
        match self {
            Target::Entity { position, .. } | Target::Storage { position, .. } => *position,
        }
    }
}

/// Per-villager state of the current action
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub action: Action,
    pub started_at: f64,
    /// Zero or one entries
    pub targets: Vec<Target>,
    /// In `[0, 1]`
    pub progress: f32,
    pub failed: bool,
    pub batch_size: u32,
    pub may_steal: bool,
}

impl Default for ActionContext {
    fn default() -> Self {
        Self {
            action: Action::Wait,
            started_at: 0.0,
            targets: Vec::new(),
            progress: 0.0,
            failed: false,
            batch_size: 1,
            may_steal: false,
        }
    }
}

impl ActionContext {
    /// Back to `Wait` with no targets and no progress
    pub fn reset(&mut self, now: f64) {
        self.action = Action::Wait;
        self.started_at = now;
        self.targets.clear();
        self.progress = 0.0;
        self.failed = false;
    }

    /// Enter a new state; targets carry over, progress does not
    pub fn set_action(&mut self, action: Action, now: f64) {
        self.action = action;
        self.started_at = now;
        self.progress = 0.0;
    }

    pub fn target(&self) -> Option<&Target> {
        self.targets.first()
    }

    pub fn set_target(&mut self, target: Target) {
        self.targets.clear();
        self.targets.push(target);
    }

    pub fn advance_progress(&mut self, amount: f32) -> bool {
        self.progress = (self.progress + amount).min(1.0);
        self.progress >= 1.0
    }
}

/// Observations made while executing the current state this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facts {
    pub holds_needed_item: bool,
    pub target_found: bool,
    pub within_reach: bool,
    pub targets_empty: bool,
    pub progress_done: bool,
    /// The facility interaction finished (performed or abandoned)
    pub interacted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ClearTargets,
    MarkFailed,
    /// Replace targets with the villager's own fireplace
    RetargetFire,
}

pub struct Rule {
    pub from: Action,
    pub guard: fn(Task, &Facts) -> bool,
    pub to: Action,
    pub effect: Effect,
}

fn is_sleep(task: Task, _: &Facts) -> bool {
    task == Task::Sleep
}

fn is_direct_facility(task: Task, _: &Facts) -> bool {
    matches!(task, Task::Drink | Task::Warmup)
}

fn holds_item_for_use(task: Task, facts: &Facts) -> bool {
    task.needs_immediate_use() && facts.holds_needed_item
}

fn is_store(task: Task, _: &Facts) -> bool {
    task == Task::StoreItems
}

fn always(_: Task, _: &Facts) -> bool {
    true
}

fn found(_: Task, facts: &Facts) -> bool {
    facts.target_found
}

fn not_found(_: Task, facts: &Facts) -> bool {
    !facts.target_found
}

fn targets_empty(_: Task, facts: &Facts) -> bool {
    facts.targets_empty
}

fn within_reach(_: Task, facts: &Facts) -> bool {
    facts.within_reach
}

fn lost_before_done(_: Task, facts: &Facts) -> bool {
    facts.targets_empty && !facts.progress_done
}

fn done_for_use(task: Task, facts: &Facts) -> bool {
    facts.progress_done && task.needs_immediate_use()
}

fn done(_: Task, facts: &Facts) -> bool {
    facts.progress_done
}

fn interacted(_: Task, facts: &Facts) -> bool {
    facts.interacted
}

/// Rules in priority order. `Sleep` has no outgoing rule; it ends when the
/// goal changes.
pub static TRANSITIONS: &[Rule] = &[
    Rule { from: Action::Wait, guard: is_sleep, to: Action::Sleep, effect: Effect::None },
    Rule { from: Action::Wait, guard: is_direct_facility, to: Action::UseFacility, effect: Effect::ClearTargets },
    Rule { from: Action::Wait, guard: holds_item_for_use, to: Action::UseFacility, effect: Effect::None },
    Rule { from: Action::Wait, guard: is_store, to: Action::StoreItems, effect: Effect::None },
    Rule { from: Action::Wait, guard: always, to: Action::FindResources, effect: Effect::None },
    Rule { from: Action::FindResources, guard: found, to: Action::MoveToResource, effect: Effect::None },
    Rule { from: Action::FindResources, guard: not_found, to: Action::FindResources, effect: Effect::MarkFailed },
    Rule { from: Action::MoveToResource, guard: holds_item_for_use, to: Action::UseFacility, effect: Effect::None },
    Rule { from: Action::MoveToResource, guard: targets_empty, to: Action::FindResources, effect: Effect::None },
    Rule { from: Action::MoveToResource, guard: within_reach, to: Action::CollectResource, effect: Effect::None },
    Rule { from: Action::CollectResource, guard: lost_before_done, to: Action::FindResources, effect: Effect::None },
    Rule { from: Action::CollectResource, guard: done_for_use, to: Action::UseFacility, effect: Effect::RetargetFire },
    Rule { from: Action::CollectResource, guard: done, to: Action::StoreItems, effect: Effect::ClearTargets },
    Rule { from: Action::StoreItems, guard: done, to: Action::Wait, effect: Effect::None },
    Rule { from: Action::UseFacility, guard: interacted, to: Action::Wait, effect: Effect::None },
];

/// First matching rule for `from`, or `None` to stay put with no effect
pub fn transition(from: Action, task: Task, facts: &Facts) -> Option<(Action, Effect)> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && (rule.guard)(task, facts))
        .map(|rule| (rule.to, rule.effect))
}
