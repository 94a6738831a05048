//! Per-villager AI update: goal arbitration, task dispatch and the action
//! machine step

use crate::ai::action::{transition, Action, ActionContext, Effect, Facts, Task};
use crate::ai::collection::CollectionManager;
use crate::ai::executor::{self, own_fire_target, release_sleeping_bag};
use crate::ai::goal::{Goal, GoalEvaluator, Thresholds};
use crate::ai::AiContext;
use crate::core::error::Result;
use crate::entity::villager::Villager;
use crate::pathfinding::Navigator;
use crate::simulation::events::SimulationEvent;
use crate::world::resources::ResourceCategory;

/// AI state carried by each villager
#[derive(Debug, Clone, Default)]
pub struct Brain {
    pub goal: Option<Goal>,
    pub task: Option<Task>,
    pub action: ActionContext,
    /// Seconds to stay idle after spawning
    pub startup_delay: f32,
    pub awake_for: f32,
    pub navigator: Navigator,
}

impl Brain {
    pub fn new(startup_delay: f32) -> Self {
        Self {
            startup_delay,
            ..Self::default()
        }
    }

    pub fn started(&self) -> bool {
        self.awake_for >= self.startup_delay
    }
}

/// Run one AI tick for `villager`
pub fn update(villager: &mut Villager, ctx: &mut AiContext) -> Result<()> {
    if !villager.brain.started() {
        villager.brain.awake_for += ctx.dt;
        return Ok(());
    }

    let goal = GoalEvaluator::new(ctx.config).evaluate(
        villager,
        ctx.hour,
        ctx.entities,
        ctx.storages,
    )?;
    if villager.brain.goal != Some(goal) {
        change_goal(villager, goal, ctx);
    }

    let task = select_task(villager, goal, ctx)?;
    if villager.brain.task != Some(task) {
        if villager.brain.task.is_some() {
            villager.brain.action.reset(ctx.now);
            villager.brain.navigator.clear();
        }
        tracing::debug!("{:?} task {:?} -> {:?}", villager.id, villager.brain.task, task);
        villager.brain.task = Some(task);
    }

    execute_action_sequence(villager, task, goal == Goal::Survive, ctx)
}

fn change_goal(villager: &mut Villager, goal: Goal, ctx: &mut AiContext) {
    let previous = villager.brain.goal;
    // Exit hook
    if previous == Some(Goal::Rest) && release_sleeping_bag(villager, ctx.entities) {
        ctx.events.push(SimulationEvent::WokeUp {
            villager: villager.id,
        });
    }
    // Enter hook
    villager.brain.goal = Some(goal);
    villager.brain.task = None;
    villager.brain.action.reset(ctx.now);
    villager.brain.navigator.clear();

    tracing::debug!("{:?} goal {:?} -> {:?}", villager.id, previous, goal);
    ctx.events.push(SimulationEvent::GoalChanged {
        villager: villager.id,
        from: previous,
        to: goal,
    });
}

/// First unmet need under `thresholds`, in water, fire, temperature,
/// calories order
fn need_task(
    villager: &Villager,
    thresholds: &Thresholds,
    emergency: bool,
    ctx: &AiContext,
) -> Result<Option<Task>> {
    let manager = CollectionManager::new(ctx.config);
    if villager.needs.water < thresholds.water {
        return Ok(Some(Task::Drink));
    }
    if manager.should_refill_fire(villager, emergency, ctx.entities)? {
        return Ok(Some(Task::FireRefill));
    }
    if villager.needs.temperature < thresholds.temperature {
        return Ok(Some(Task::Warmup));
    }
    if villager.needs.calories < thresholds.calories {
        return Ok(Some(Task::Eat));
    }
    Ok(None)
}

/// Goal dispatcher: map the active goal to a task token
pub fn select_task(villager: &Villager, goal: Goal, ctx: &AiContext) -> Result<Task> {
    let regular = Thresholds::regular(ctx.config);
    match goal {
        Goal::Survive => {
            let emergency = Thresholds::emergency(ctx.config);
            let task = match need_task(villager, &emergency, true, ctx)? {
                Some(task) => Some(task),
                None => need_task(villager, &regular, false, ctx)?,
            };
            Ok(task.unwrap_or(Task::Drink))
        }
        Goal::Rest => Ok(Task::Sleep),
        Goal::Maintain => Ok(need_task(villager, &regular, false, ctx)?.unwrap_or(Task::StoreItems)),
        Goal::Contribute => contribute_task(villager, ctx),
    }
}

/// Forage whichever category the communal store has less of
fn contribute_task(villager: &Villager, ctx: &AiContext) -> Result<Task> {
    let manager = CollectionManager::new(ctx.config);
    let food = manager.should_forage_food(villager, ctx.storages)?;
    let burnable = manager.should_forage_burnable(villager, ctx.storages)?;

    let task = match (food, burnable) {
        (false, false) => Task::StoreItems,
        (true, false) => Task::ForageFood,
        (false, true) => Task::ForageBurnable,
        (true, true) => {
            let communal = &ctx.storages.require(villager.communal_storage)?.slots;
            if communal.count_category(ResourceCategory::Burnable)
                < communal.count_category(ResourceCategory::Food)
            {
                Task::ForageBurnable
            } else {
                Task::ForageFood
            }
        }
    };
    Ok(task)
}

/// Advance the action machine one step for `task`.
///
/// A villager whose goal is Survive is always treated as an emergency,
/// whatever the caller passes.
pub fn execute_action_sequence(
    villager: &mut Villager,
    task: Task,
    emergency: bool,
    ctx: &mut AiContext,
) -> Result<()> {
    let emergency = emergency || villager.brain.goal == Some(Goal::Survive);
    CollectionManager::new(ctx.config).update(
        &mut villager.brain.action,
        emergency,
        ctx.entities,
        ctx.storages,
    )?;

    let current = villager.brain.action.action;
    let facts: Facts = match current {
        Action::Wait => executor::base_facts(villager, task),
        Action::FindResources => executor::execute_find(villager, task, ctx),
        Action::MoveToResource => executor::execute_move(villager, task, ctx),
        Action::CollectResource => executor::execute_collect(villager, task, ctx)?,
        Action::StoreItems => executor::execute_store(villager, task, ctx)?,
        Action::UseFacility => executor::execute_use_facility(villager, task, ctx)?,
        Action::Sleep => executor::execute_sleep(villager, ctx)?,
    };

    let Some((next, effect)) = transition(current, task, &facts) else {
        return Ok(());
    };
    match effect {
        Effect::None => {}
        Effect::ClearTargets => villager.brain.action.targets.clear(),
        Effect::MarkFailed => villager.brain.action.failed = true,
        Effect::RetargetFire => {
            let fire = own_fire_target(villager, ctx.entities)?;
            villager.brain.action.set_target(fire);
        }
    }

    if next != current {
        villager.brain.action.set_action(next, ctx.now);
        villager.brain.navigator.clear();
        tracing::debug!("{:?} [{:?}] {:?} -> {:?}", villager.id, task, current, next);
        ctx.events.push(SimulationEvent::ActionChanged {
            villager: villager.id,
            task,
            from: current,
            to: next,
        });
    }
    Ok(())
}
