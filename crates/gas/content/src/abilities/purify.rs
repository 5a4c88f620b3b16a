use std::collections::BTreeSet;
use std::sync::Arc;

use gas_core::{
    AbilityConfig, AbilityContext, AbilityTaskHandle, ActiveEffectHandle, ActorId, GameplayAbility,
    GameplayTagContainer, SphereOverlapTargetActor, TagSource, TargetData, TargetingQuery,
};

use crate::tags::SampleTags;

/// Cleanses poison from the caster and allies around them.
///
/// Only poison effects whose level does not exceed the ability level are
/// removed. An empty overlap still purifies the caster.
#[derive(Clone, Debug)]
pub struct PurifyAbility {
    config: Arc<AbilityConfig>,
    tags: Arc<SampleTags>,
    radius: f32,
    required_factions: GameplayTagContainer,
    forbidden_factions: GameplayTagContainer,
}

impl PurifyAbility {
    pub fn new(config: Arc<AbilityConfig>, tags: Arc<SampleTags>, radius: f32) -> Self {
        Self {
            config,
            tags,
            radius,
            required_factions: GameplayTagContainer::new(),
            forbidden_factions: GameplayTagContainer::new(),
        }
    }

    #[must_use]
    pub fn with_factions(mut self, required: GameplayTagContainer, forbidden: GameplayTagContainer) -> Self {
        self.required_factions = required;
        self.forbidden_factions = forbidden;
        self
    }

    /// Poison effects on `target` that a cast at `dispel_level` can remove.
    fn dispellable(&self, ctx: &AbilityContext<'_>, target: ActorId, dispel_level: i32) -> Vec<ActiveEffectHandle> {
        let Some(asc) = ctx.world().asc(target) else {
            return Vec::new();
        };
        let poison = self.tags.poison();
        asc.active_effects()
            .iter()
            .filter(|effect| {
                let def = effect.spec().def();
                def.granted_tags.has_any(&poison) || def.asset_tags.has_any(&poison)
            })
            .filter(|effect| effect.spec().level() <= dispel_level)
            .map(|effect| effect.handle())
            .collect()
    }

    fn purify(&self, ctx: &mut AbilityContext<'_>, found: Vec<ActorId>) {
        if !ctx.commit_ability() {
            tracing::debug!(caster = %ctx.owner(), "purify commit failed");
            ctx.cancel_ability();
            return;
        }

        let dispel_level = ctx.level();
        let targets: BTreeSet<ActorId> = core::iter::once(ctx.owner()).chain(found).collect();
        let mut purified = 0usize;

        for target in targets {
            let handles = self.dispellable(ctx, target, dispel_level);
            if handles.is_empty() {
                continue;
            }
            let removed = handles
                .into_iter()
                .filter(|handle| matches!(ctx.world_mut().remove_active_effect(target, *handle), Ok(true)))
                .count();
            if removed > 0 {
                purified += 1;
                tracing::info!(caster = %ctx.owner(), %target, removed, "purified");
            }
        }

        if purified == 0 {
            tracing::info!(caster = %ctx.owner(), "purify found no cleansable poison");
        }
        ctx.end_ability();
    }
}

impl GameplayAbility for PurifyAbility {
    fn config(&self) -> &Arc<AbilityConfig> {
        &self.config
    }

    fn create_poolable_instance(&self) -> Box<dyn GameplayAbility> {
        Box::new(self.clone())
    }

    fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>) {
        let query = TargetingQuery::default()
            .including_caster()
            .with_required(self.required_factions.clone())
            .with_forbidden(self.forbidden_factions.clone());
        ctx.wait_target_data(Box::new(SphereOverlapTargetActor::new(self.radius).with_query(query)));
    }

    fn on_target_data_ready(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle, data: TargetData) {
        self.purify(ctx, data.actors());
    }

    fn on_targeting_cancelled(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        self.purify(ctx, Vec::new());
    }
}
