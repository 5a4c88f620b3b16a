//! Character attribute set used by every sample actor.
//!
//! Damage and Experience are meta attributes: instant effects write to them
//! and the hooks here turn the write into health loss or a progression
//! event instead of storing a value.

use std::sync::Arc;

use gas_core::{
    AttributeSet, AttributeStorage, GameplayAttribute, GameplayEventData, HookContext, ModCallbackData, TagSource,
};

use crate::tags::SampleTags;

/// Schema of [`CharacterAttributeSet`].
///
/// Bounds come before the values they clamp so that recalculation sees an
/// updated MaxHealth before it clamps Health in the same pass.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::FromRepr,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum CharacterAttribute {
    Level,
    Experience,
    Attack,
    Defense,
    Speed,
    MaxHealth,
    Health,
    MaxMana,
    Mana,
    BonusDamageMultiplier,
    Damage,
}

impl CharacterAttribute {
    /// Attribute names in schema order.
    pub const NAMES: &'static [&'static str] = &[
        "Level",
        "Experience",
        "Attack",
        "Defense",
        "Speed",
        "MaxHealth",
        "Health",
        "MaxMana",
        "Mana",
        "BonusDamageMultiplier",
        "Damage",
    ];

    pub const fn id(self) -> GameplayAttribute {
        GameplayAttribute::new(self as u16)
    }

    pub fn from_attribute(attribute: GameplayAttribute) -> Option<Self> {
        Self::from_repr(attribute.0)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

use CharacterAttribute as Attr;

/// Flat mitigation constant: `defense / (defense + 100)` of the hit is absorbed.
pub const DEFENSE_MITIGATION_BASE: f32 = 100.0;

#[derive(Debug)]
pub struct CharacterAttributeSet {
    storage: AttributeStorage,
    tags: Arc<SampleTags>,
}

impl CharacterAttributeSet {
    /// Empty set: every attribute starts at 0 except Level (1) and the
    /// damage multiplier (1).
    pub fn new(tags: Arc<SampleTags>) -> Self {
        let mut set = Self {
            storage: AttributeStorage::new(Attr::NAMES),
            tags,
        };
        set.init_value(Attr::Level.id(), 1.0);
        set.init_value(Attr::BonusDamageMultiplier.id(), 1.0);
        set
    }

    pub fn get(&self, attribute: CharacterAttribute) -> f32 {
        self.current_value(attribute.id())
    }

    /// Seeds base and current of one attribute.
    pub fn init(&mut self, attribute: CharacterAttribute, value: f32) {
        self.init_value(attribute.id(), value);
    }

    fn clamp_resource(&self, attribute: GameplayAttribute, value: &mut f32) {
        match Attr::from_attribute(attribute) {
            Some(Attr::Health) => *value = value.clamp(0.0, self.get(Attr::MaxHealth).max(0.0)),
            Some(Attr::Mana) => *value = value.clamp(0.0, self.get(Attr::MaxMana).max(0.0)),
            _ => {}
        }
    }

    /// Runs incoming damage through mitigation and commits the new health.
    ///
    /// Returns the health lost. A hit that takes health from above zero to
    /// zero tags the owner dead and queues the death event.
    fn apply_damage(&mut self, data: &ModCallbackData<'_>, ctx: &mut HookContext<'_>) -> f32 {
        let mut incoming = data.evaluated_magnitude();
        if incoming <= 0.0 {
            return 0.0;
        }

        let multiplier = data
            .spec
            .get_set_by_caller_magnitude(self.tags.data_damage_multiplier, false, 1.0);
        if multiplier > 0.0 {
            incoming *= multiplier;
        }

        let health = self.get(Attr::Health);
        let defense = self.get(Attr::Defense).max(0.0);
        let mitigated = (incoming * (1.0 - defense / (defense + DEFENSE_MITIGATION_BASE))).max(0.0);
        let new_health = (health - mitigated).max(0.0);

        // Base excludes active Health modifiers; recalculation adds them back.
        let base_health = self.base_value(Attr::Health.id()) - mitigated;
        self.set_base_value(Attr::Health.id(), base_health);
        self.set_current_value(Attr::Health.id(), new_health);
        tracing::debug!(
            target_actor = %data.target,
            effect = %data.spec.def().name,
            incoming,
            mitigated,
            health = new_health,
            "damage applied"
        );

        if new_health <= 0.0 && health > 0.0 && !ctx.has_tag(self.tags.state_dead) {
            ctx.add_loose_tag(self.tags.state_dead);
            tracing::info!(actor = %ctx.owner(), killer = ?data.instigator(), "character died");
            ctx.send_event(
                GameplayEventData::new(self.tags.event_character_death, ctx.owner())
                    .with_instigator(data.instigator())
                    .with_magnitude(mitigated),
            );
        }
        mitigated
    }
}

impl AttributeSet for CharacterAttributeSet {
    fn storage(&self) -> &AttributeStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut AttributeStorage {
        &mut self.storage
    }

    fn pre_attribute_change(&self, attribute: GameplayAttribute, new_value: &mut f32) {
        self.clamp_resource(attribute, new_value);
    }

    fn pre_attribute_base_change(&self, attribute: GameplayAttribute, new_value: &mut f32) {
        self.clamp_resource(attribute, new_value);
    }

    fn pre_process_instant_effect(&mut self, data: &ModCallbackData<'_>, ctx: &mut HookContext<'_>) -> bool {
        if Attr::from_attribute(data.attribute()) != Some(Attr::Damage) {
            return false;
        }
        self.apply_damage(data, ctx);
        true
    }

    fn post_gameplay_effect_execute(&mut self, data: &ModCallbackData<'_>, ctx: &mut HookContext<'_>) {
        if Attr::from_attribute(data.attribute()) != Some(Attr::Experience) {
            return;
        }
        if !data.spec.def().asset_tags.has_tag(self.tags.event_experience_gain) {
            return;
        }
        ctx.send_event(
            GameplayEventData::new(self.tags.event_experience_gain, ctx.owner())
                .with_instigator(data.instigator())
                .with_magnitude(data.evaluated_magnitude()),
        );
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn set() -> CharacterAttributeSet {
        let tags = Arc::new(SampleTags::register().expect("sample tags"));
        CharacterAttributeSet::new(tags)
    }

    #[test]
    fn names_follow_enum_order() {
        let names: Vec<&'static str> = CharacterAttribute::iter().map(CharacterAttribute::name).collect();
        assert_eq!(names, CharacterAttribute::NAMES);
        for attribute in CharacterAttribute::iter() {
            assert_eq!(CharacterAttribute::from_attribute(attribute.id()), Some(attribute));
        }
    }

    #[test]
    fn defaults_seed_level_and_multiplier() {
        let set = set();
        assert_eq!(set.get(Attr::Level), 1.0);
        assert_eq!(set.get(Attr::BonusDamageMultiplier), 1.0);
        assert_eq!(set.get(Attr::Health), 0.0);
    }

    #[test]
    fn health_and_mana_clamp_to_their_maximum() {
        let mut set = set();
        set.init(Attr::MaxHealth, 100.0);
        set.init(Attr::MaxMana, 40.0);
        set.init(Attr::Health, 150.0);
        set.init(Attr::Mana, -3.0);

        assert_eq!(set.get(Attr::Health), 100.0);
        assert_eq!(set.get(Attr::Mana), 0.0);
    }

    #[test]
    fn base_writes_clamp_health_and_mana() {
        let mut set = set();
        set.init(Attr::MaxHealth, 100.0);
        set.init(Attr::MaxMana, 40.0);
        set.set_base_value(Attr::Health.id(), 130.0);
        set.set_base_value(Attr::Mana.id(), -5.0);

        assert_eq!(set.base_value(Attr::Health.id()), 100.0);
        assert_eq!(set.base_value(Attr::Mana.id()), 0.0);
    }
}
