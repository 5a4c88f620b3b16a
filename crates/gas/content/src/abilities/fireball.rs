use std::sync::Arc;

use gas_core::{
    AbilityConfig, AbilityContext, AbilityTaskHandle, ActorId, GameplayAbility, GameplayEffect, LineTraceTargetActor,
    TargetData, TargetingQuery,
};

use crate::attributes::CharacterAttribute;
use crate::tags::SampleTags;

/// Commits, traces forward and hits the first valid target with damage
/// and a burn debuff.
///
/// The caster's BonusDamageMultiplier is snapshotted into the damage spec
/// as SetByCaller, so buffs that expire mid-flight do not change the hit.
#[derive(Clone, Debug)]
pub struct FireballAbility {
    config: Arc<AbilityConfig>,
    tags: Arc<SampleTags>,
    damage: Arc<GameplayEffect>,
    burn: Option<Arc<GameplayEffect>>,
    /// `None` traces with the world's `default_trace_range`.
    range: Option<f32>,
    query: TargetingQuery,
}

impl FireballAbility {
    pub fn new(
        config: Arc<AbilityConfig>,
        tags: Arc<SampleTags>,
        damage: Arc<GameplayEffect>,
        burn: Option<Arc<GameplayEffect>>,
        range: impl Into<Option<f32>>,
    ) -> Self {
        Self {
            config,
            tags,
            damage,
            burn,
            range: range.into(),
            query: TargetingQuery::default(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: TargetingQuery) -> Self {
        self.query = query;
        self
    }

    fn hit(&self, ctx: &mut AbilityContext<'_>, target: ActorId, data: &TargetData) {
        let multiplier = ctx
            .asc()
            .map_or(1.0, |asc| asc.current_value(CharacterAttribute::BonusDamageMultiplier.id()));

        let Some(mut damage) = ctx.make_outgoing_spec(Arc::clone(&self.damage)) else {
            return;
        };
        if let Err(err) = damage.set_set_by_caller_magnitude(self.tags.data_damage_multiplier, multiplier) {
            tracing::warn!(%err, "damage multiplier already set");
        }
        if let Some(point) = data.hit_point() {
            damage = damage.with_hit_location(point);
        }
        tracing::info!(caster = %ctx.owner(), %target, multiplier, "fireball hit");
        if let Err(err) = ctx.apply_effect_spec_to_target(target, damage) {
            tracing::warn!(%target, %err, "fireball damage not applied");
            return;
        }

        if let Some(burn) = &self.burn
            && let Some(spec) = ctx.make_outgoing_spec(Arc::clone(burn))
            && let Err(err) = ctx.apply_effect_spec_to_target(target, spec)
        {
            tracing::warn!(%target, %err, "burn not applied");
        }
    }
}

impl GameplayAbility for FireballAbility {
    fn config(&self) -> &Arc<AbilityConfig> {
        &self.config
    }

    fn create_poolable_instance(&self) -> Box<dyn GameplayAbility> {
        Box::new(self.clone())
    }

    fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>) {
        if !ctx.commit_ability() {
            tracing::debug!(caster = %ctx.owner(), "fireball commit failed");
            ctx.cancel_ability();
            return;
        }
        let trace = match self.range {
            Some(range) => LineTraceTargetActor::new(range),
            None => LineTraceTargetActor::from_config(ctx.world().config()),
        };
        let trace = trace.with_query(self.query.clone());
        ctx.wait_target_data(Box::new(trace));
    }

    fn on_target_data_ready(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle, data: TargetData) {
        for target in data.actors() {
            self.hit(ctx, target, &data);
        }
        ctx.end_ability();
    }

    fn on_targeting_cancelled(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        tracing::info!(caster = %ctx.owner(), "fireball found no valid target");
    }
}
