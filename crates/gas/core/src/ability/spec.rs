use core::fmt;
use std::sync::Arc;

use super::{AbilityConfig, GameplayAbility, InstancingPolicy};

/// Handle of a granted ability, unique within its owning component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpecHandle(pub u32);

impl fmt::Display for AbilitySpecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationState {
    #[default]
    Idle,
    Activating,
    Active,
    Ending,
}

/// Which object of a spec is currently running a callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunnerSlot {
    Template,
    Instance,
}

/// A granted ability: template, level, instance and activation state.
#[derive(Debug)]
pub struct GameplayAbilitySpec {
    handle: AbilitySpecHandle,
    config: Arc<AbilityConfig>,
    level: i32,
    template: Option<Box<dyn GameplayAbility>>,
    instance: Option<Box<dyn GameplayAbility>>,
    pub(crate) state: ActivationState,
    /// Bumped on every activation; tasks from older activations are stale.
    pub(crate) activation_id: u64,
    pub(crate) checked_out: Option<RunnerSlot>,
    /// End requested while a callback held the runner: `Some(was_cancelled)`.
    pub(crate) pending_end: Option<bool>,
}

impl GameplayAbilitySpec {
    pub(crate) fn new(handle: AbilitySpecHandle, template: Box<dyn GameplayAbility>, level: i32) -> Self {
        Self {
            handle,
            config: Arc::clone(template.config()),
            level,
            template: Some(template),
            instance: None,
            state: ActivationState::Idle,
            activation_id: 0,
            checked_out: None,
            pending_end: None,
        }
    }

    pub fn handle(&self) -> AbilitySpecHandle {
        self.handle
    }

    pub fn config(&self) -> &Arc<AbilityConfig> {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    /// Anything but `Idle`.
    pub fn is_active(&self) -> bool {
        self.state != ActivationState::Idle
    }

    pub fn activation_id(&self) -> u64 {
        self.activation_id
    }

    /// The granted template, unless a callback is currently running on it.
    pub fn template(&self) -> Option<&dyn GameplayAbility> {
        self.template.as_deref()
    }

    pub fn instance(&self) -> Option<&dyn GameplayAbility> {
        self.instance.as_deref()
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    /// Slot that runs activations under this spec's instancing policy.
    pub(crate) fn runner_slot(&self) -> RunnerSlot {
        match self.config.instancing {
            InstancingPolicy::NonInstanced => RunnerSlot::Template,
            InstancingPolicy::InstancedPerActor | InstancingPolicy::InstancedPerExecution => {
                RunnerSlot::Instance
            }
        }
    }

    pub(crate) fn set_instance(&mut self, instance: Box<dyn GameplayAbility>) {
        self.instance = Some(instance);
    }

    pub(crate) fn take_instance(&mut self) -> Option<Box<dyn GameplayAbility>> {
        self.instance.take()
    }

    /// Moves the runner out for a callback. `None` if it is already out.
    pub(crate) fn check_out(&mut self) -> Option<(Box<dyn GameplayAbility>, RunnerSlot)> {
        if self.checked_out.is_some() {
            return None;
        }
        let slot = self.runner_slot();
        let runner = match slot {
            RunnerSlot::Template => self.template.take(),
            RunnerSlot::Instance => self.instance.take(),
        }?;
        self.checked_out = Some(slot);
        Some((runner, slot))
    }

    pub(crate) fn check_in(&mut self, runner: Box<dyn GameplayAbility>, slot: RunnerSlot) {
        match slot {
            RunnerSlot::Template => self.template = Some(runner),
            RunnerSlot::Instance => self.instance = Some(runner),
        }
        self.checked_out = None;
    }
}
