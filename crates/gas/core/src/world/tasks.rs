//! Ability tasks: targeting sessions, delays and next-frame waits.
//!
//! Tasks belong to one activation of one ability. They are destroyed
//! without callbacks when the ability ends, and a task whose activation is
//! no longer current is dropped silently when it would fire.

use vek::Vec3;

use crate::ability::{AbilitySpecHandle, AbilityTaskHandle, AbilityTaskKind};
use crate::actor::ActorId;
use crate::targeting::{TargetActor, TargetingOutcome, TargetingSession};

use super::{GameplayWorld, WorldError};

#[derive(Debug)]
pub(crate) enum TaskState {
    Targeting(TargetingSession),
    Delay { remaining: f32 },
    NextFrame,
}

#[derive(Debug)]
pub(crate) struct PendingTask {
    pub(crate) owner: ActorId,
    pub(crate) ability: AbilitySpecHandle,
    pub(crate) activation: u64,
    pub(crate) state: TaskState,
}

impl PendingTask {
    pub(crate) fn kind(&self) -> AbilityTaskKind {
        match self.state {
            TaskState::Targeting(_) => AbilityTaskKind::WaitTargetData,
            TaskState::Delay { .. } => AbilityTaskKind::WaitDelay,
            TaskState::NextFrame => AbilityTaskKind::WaitNextFrame,
        }
    }
}

impl GameplayWorld {
    pub(crate) fn register_task(
        &mut self,
        owner: ActorId,
        ability: AbilitySpecHandle,
        activation: u64,
        state: TaskState,
    ) -> AbilityTaskHandle {
        let handle = AbilityTaskHandle(self.next_task);
        self.next_task += 1;
        tracing::trace!(%owner, %ability, %handle, "ability task registered");
        self.tasks.insert(
            handle,
            PendingTask {
                owner,
                ability,
                activation,
                state,
            },
        );
        handle
    }

    pub(crate) fn new_targeting_state(owner: ActorId, actor: Box<dyn TargetActor>) -> TaskState {
        TaskState::Targeting(TargetingSession::new(actor, owner))
    }

    /// Starts tasks created during a callback. Targeting strategies that
    /// resolve immediately deliver their outcome right away.
    pub(crate) fn start_tasks(&mut self, handles: Vec<AbilityTaskHandle>) {
        for handle in handles {
            let Some(mut task) = self.tasks.remove(&handle) else {
                continue;
            };
            let outcome = match &mut task.state {
                TaskState::Targeting(session) => session.start(&*self),
                TaskState::Delay { .. } | TaskState::NextFrame => None,
            };
            match outcome {
                Some(outcome) => self.deliver_targeting_outcome(handle, task, outcome),
                None => {
                    self.tasks.insert(handle, task);
                }
            }
        }
    }

    fn deliver_targeting_outcome(&mut self, handle: AbilityTaskHandle, task: PendingTask, outcome: TargetingOutcome) {
        let PendingTask {
            owner,
            ability,
            activation,
            state,
        } = task;
        if let TaskState::Targeting(mut session) = state {
            session.destroy();
        }

        match outcome {
            TargetingOutcome::Ready(data) => {
                tracing::debug!(%owner, %ability, task = %handle, "target data ready");
                self.invoke_ability(owner, ability, activation, |runner, ctx| {
                    runner.on_target_data_ready(ctx, handle, data);
                });
            }
            TargetingOutcome::Cancelled => {
                tracing::debug!(%owner, %ability, task = %handle, "targeting cancelled");
                self.invoke_ability(owner, ability, activation, |runner, ctx| {
                    runner.on_targeting_cancelled(ctx, handle);
                });
                if self.is_current_activation(owner, ability, activation) {
                    self.end_ability_internal(owner, ability, true);
                }
            }
        }
    }

    /// Advances delay and next-frame tasks that existed when the tick began.
    pub(crate) fn tick_tasks(&mut self, delta: f32) {
        let due: Vec<AbilityTaskHandle> = self
            .tasks
            .iter_mut()
            .filter_map(|(handle, task)| match &mut task.state {
                TaskState::Delay { remaining } => {
                    *remaining -= delta;
                    (*remaining <= 0.0).then_some(*handle)
                }
                TaskState::NextFrame => Some(*handle),
                TaskState::Targeting(_) => None,
            })
            .collect();

        for handle in due {
            // An earlier callback this tick may have ended the ability.
            let Some(task) = self.tasks.remove(&handle) else {
                continue;
            };
            self.invoke_ability(task.owner, task.ability, task.activation, |runner, ctx| {
                runner.on_wait_finished(ctx, handle);
            });
        }
    }

    /// Destroys matching tasks without running callbacks.
    pub(crate) fn destroy_tasks_where(&mut self, mut predicate: impl FnMut(&PendingTask) -> bool) {
        let doomed: Vec<AbilityTaskHandle> = self
            .tasks
            .iter()
            .filter(|(_, task)| predicate(task))
            .map(|(handle, _)| *handle)
            .collect();
        for handle in doomed {
            if let Some(PendingTask {
                state: TaskState::Targeting(mut session),
                ..
            }) = self.tasks.remove(&handle)
            {
                session.destroy();
            }
        }
    }

    fn targeting_tasks_of(&self, actor: ActorId) -> Vec<AbilityTaskHandle> {
        self.tasks
            .iter()
            .filter(|(_, task)| task.owner == actor && matches!(task.state, TaskState::Targeting(_)))
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Confirms every pending targeting session of `actor`.
    ///
    /// Returns the number of sessions that produced an outcome.
    pub fn confirm_targeting(&mut self, actor: ActorId) -> Result<usize, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            let mut resolved = 0;
            for handle in world.targeting_tasks_of(actor) {
                let Some(mut task) = world.tasks.remove(&handle) else {
                    continue;
                };
                let outcome = match &mut task.state {
                    TaskState::Targeting(session) => session.confirm(&*world),
                    TaskState::Delay { .. } | TaskState::NextFrame => None,
                };
                match outcome {
                    Some(outcome) => {
                        resolved += 1;
                        world.deliver_targeting_outcome(handle, task, outcome);
                    }
                    None => {
                        world.tasks.insert(handle, task);
                    }
                }
            }
            resolved
        }))
    }

    /// Cancels every pending targeting session of `actor`. Each owning
    /// ability gets `on_targeting_cancelled` and is then ended as cancelled.
    pub fn cancel_targeting(&mut self, actor: ActorId) -> Result<usize, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            let mut cancelled = 0;
            for handle in world.targeting_tasks_of(actor) {
                let Some(mut task) = world.tasks.remove(&handle) else {
                    continue;
                };
                let outcome = match &mut task.state {
                    TaskState::Targeting(session) => session.cancel(),
                    TaskState::Delay { .. } | TaskState::NextFrame => None,
                };
                if let Some(outcome) = outcome {
                    cancelled += 1;
                    world.deliver_targeting_outcome(handle, task, outcome);
                }
            }
            cancelled
        }))
    }

    /// Forwards an aim point to `actor`'s pending targeting sessions.
    pub fn update_targeting_aim(&mut self, actor: ActorId, point: Vec3<f32>) -> Result<(), WorldError> {
        self.require_asc(actor)?;
        for task in self.tasks.values_mut().filter(|task| task.owner == actor) {
            if let TaskState::Targeting(session) = &mut task.state {
                session.set_aim_point(point);
            }
        }
        Ok(())
    }
}
