//! Active effect bookkeeping.

use core::fmt;

use super::{DurationPolicy, GameplayEffectSpec};

/// Handle of an active effect, unique within its owning component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectHandle(pub u64);

impl fmt::Display for ActiveEffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// Result of advancing one active effect by a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectTick {
    /// Periodic executions due this frame.
    pub executions: u32,
    pub expired: bool,
}

/// A spec currently applied to a component.
#[derive(Clone, Debug)]
pub struct ActiveGameplayEffect {
    pub(crate) handle: ActiveEffectHandle,
    pub(crate) spec: GameplayEffectSpec,
    pub(crate) time_remaining: f32,
    pub(crate) stack_count: u32,
    /// Seconds until the next periodic execution. Starts at zero so the
    /// first execution happens on the first non-zero tick after application.
    pub(crate) period_timer: f32,
    pub(crate) inhibited: bool,
}

impl ActiveGameplayEffect {
    pub(crate) fn new(handle: ActiveEffectHandle, spec: GameplayEffectSpec) -> Self {
        let time_remaining = spec.duration();
        Self {
            handle,
            spec,
            time_remaining,
            stack_count: 1,
            period_timer: 0.0,
            inhibited: false,
        }
    }

    pub fn handle(&self) -> ActiveEffectHandle {
        self.handle
    }

    pub fn spec(&self) -> &GameplayEffectSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.def().name
    }

    /// Remaining seconds; meaningful only for `HasDuration` effects.
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    pub fn is_inhibited(&self) -> bool {
        self.inhibited
    }

    pub fn is_periodic(&self) -> bool {
        self.spec.def().is_periodic()
    }

    /// Advances timers by `delta` seconds.
    pub(crate) fn tick(&mut self, delta: f32) -> EffectTick {
        let mut outcome = EffectTick::default();

        let period = self.spec.def().period;
        if self.is_periodic() && !self.inhibited {
            self.period_timer -= delta;
            while self.period_timer < 0.0 {
                outcome.executions += 1;
                self.period_timer += period;
            }
        }

        if let DurationPolicy::HasDuration(_) = self.spec.def().duration {
            self.time_remaining -= delta;
            outcome.expired = self.time_remaining <= 0.0;
        }

        outcome
    }
}
