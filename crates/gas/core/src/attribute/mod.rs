//! Attribute model: named float channels with base/current separation.
//!
//! An [`AttributeSet`] implementation owns an [`AttributeStorage`] and
//! overrides the hooks it cares about. Attributes are addressed by
//! [`GameplayAttribute`], a stable index into the set's schema, so hook
//! dispatch is a `match` on an id rather than a reference comparison.
//!
//! Write paths:
//! - `set_base_value` → `pre_attribute_base_change` → base committed, marked dirty
//! - `set_current_value` → `pre_attribute_change` → current committed
//!
//! The owning component recomputes the current value of dirty attributes from
//! base plus active modifiers after every effect application and tick.

mod hooks;
mod storage;

pub use hooks::{HookContext, ModCallbackData};
pub use storage::{AttributeStorage, AttributeValue};

use core::fmt;

/// Key identifying one attribute within a set. Holds no value itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayAttribute(pub u16);

impl GameplayAttribute {
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Attribute container with overridable change hooks.
///
/// Implementations provide storage access and override hooks as needed.
/// Hooks run synchronously on the simulation thread. `pre_attribute_change`
/// and `pre_attribute_base_change` may only clamp the proposed value.
pub trait AttributeSet: fmt::Debug + Send {
    fn storage(&self) -> &AttributeStorage;

    fn storage_mut(&mut self) -> &mut AttributeStorage;

    /// Clamp hook for current-value commits.
    fn pre_attribute_change(&self, _attribute: GameplayAttribute, _new_value: &mut f32) {}

    /// Clamp hook for base-value commits.
    fn pre_attribute_base_change(&self, _attribute: GameplayAttribute, _new_value: &mut f32) {}

    /// Intercepts an instant modifier before default application.
    ///
    /// Returning true means the modifier was fully handled and the generic
    /// `base = op(base, magnitude)` write is skipped. Meta attributes such as
    /// Damage use this to run their own mitigation math.
    fn pre_process_instant_effect(
        &mut self,
        _data: &ModCallbackData<'_>,
        _ctx: &mut HookContext<'_>,
    ) -> bool {
        false
    }

    /// Runs after default application of an instant modifier (not when handled).
    fn post_process_instant_effect(&mut self, _data: &ModCallbackData<'_>, _ctx: &mut HookContext<'_>) {}

    /// Runs after every instant modifier, handled or not.
    fn post_gameplay_effect_execute(&mut self, _data: &ModCallbackData<'_>, _ctx: &mut HookContext<'_>) {}

    // ===== provided accessors =====

    /// Resolves an attribute by schema name.
    fn attribute(&self, name: &str) -> Option<GameplayAttribute> {
        self.storage().find(name)
    }

    fn attribute_name(&self, attribute: GameplayAttribute) -> Option<&'static str> {
        self.storage().name(attribute)
    }

    fn base_value(&self, attribute: GameplayAttribute) -> f32 {
        self.storage().base(attribute)
    }

    fn current_value(&self, attribute: GameplayAttribute) -> f32 {
        self.storage().current(attribute)
    }

    fn set_base_value(&mut self, attribute: GameplayAttribute, value: f32) {
        let mut value = value;
        self.pre_attribute_base_change(attribute, &mut value);
        self.storage_mut().set_base(attribute, value);
    }

    fn set_current_value(&mut self, attribute: GameplayAttribute, value: f32) {
        let mut value = value;
        self.pre_attribute_change(attribute, &mut value);
        self.storage_mut().set_current(attribute, value);
    }

    /// Sets base and current together, as used when seeding a fresh set.
    fn init_value(&mut self, attribute: GameplayAttribute, value: f32) {
        self.set_base_value(attribute, value);
        let base = self.base_value(attribute);
        self.set_current_value(attribute, base);
    }
}

/// Schema-only attribute set with no hook overrides.
#[derive(Clone, Debug)]
pub struct PlainAttributeSet {
    storage: AttributeStorage,
}

impl PlainAttributeSet {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            storage: AttributeStorage::new(names),
        }
    }
}

impl AttributeSet for PlainAttributeSet {
    fn storage(&self) -> &AttributeStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut AttributeStorage {
        &mut self.storage
    }
}
