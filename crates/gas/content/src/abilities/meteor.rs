use std::sync::Arc;

use gas_core::{
    AbilityConfig, AbilityContext, AbilityTaskHandle, ActorId, GameplayAbility, GameplayEffect,
    GroundSelectTargetActor, TargetData, TargetingQuery, TargetingSpace,
};
use vek::Vec3;

/// Ground-targeted area strike.
///
/// Waits for the player to confirm a ground point, commits, then waits
/// `impact_delay` seconds before damaging everything within `radius` of the
/// point. Cancelling the selection ends the ability without paying.
#[derive(Clone, Debug)]
pub struct MeteorAbility {
    config: Arc<AbilityConfig>,
    damage: Arc<GameplayEffect>,
    max_range: f32,
    radius: f32,
    impact_delay: f32,
    query: TargetingQuery,
    impact_point: Option<Vec3<f32>>,
}

impl MeteorAbility {
    pub fn new(
        config: Arc<AbilityConfig>,
        damage: Arc<GameplayEffect>,
        max_range: f32,
        radius: f32,
        impact_delay: f32,
    ) -> Self {
        Self {
            config,
            damage,
            max_range,
            radius,
            impact_delay,
            query: TargetingQuery::default(),
            impact_point: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: TargetingQuery) -> Self {
        self.query = query;
        self
    }

    pub fn impact_point(&self) -> Option<Vec3<f32>> {
        self.impact_point
    }

    fn targets_at(&self, ctx: &AbilityContext<'_>, point: Vec3<f32>) -> Vec<ActorId> {
        let world = ctx.world();
        world
            .avatars()
            .filter(|(actor, avatar)| {
                avatar.distance_to(point) - avatar.radius <= self.radius
                    && self.query.is_valid_target(ctx.owner(), *actor, world)
            })
            .map(|(actor, _)| actor)
            .collect()
    }
}

impl GameplayAbility for MeteorAbility {
    fn config(&self) -> &Arc<AbilityConfig> {
        &self.config
    }

    fn create_poolable_instance(&self) -> Box<dyn GameplayAbility> {
        let mut instance = self.clone();
        instance.impact_point = None;
        Box::new(instance)
    }

    fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>) {
        ctx.wait_target_data(Box::new(GroundSelectTargetActor::new(self.max_range)));
    }

    fn on_target_data_ready(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle, data: TargetData) {
        let Some(point) = data.hit_point() else {
            tracing::warn!(caster = %ctx.owner(), "meteor target data has no ground point");
            ctx.cancel_ability();
            return;
        };
        if !ctx.commit_ability() {
            tracing::debug!(caster = %ctx.owner(), "meteor commit failed");
            ctx.cancel_ability();
            return;
        }
        tracing::info!(caster = %ctx.owner(), ?point, delay = self.impact_delay, "meteor incoming");
        self.impact_point = Some(point);
        ctx.wait_delay(self.impact_delay);
    }

    fn on_targeting_cancelled(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        tracing::info!(caster = %ctx.owner(), "meteor cast was cancelled");
    }

    fn on_wait_finished(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        let Some(point) = self.impact_point else {
            ctx.end_ability();
            return;
        };
        let targets = self.targets_at(ctx, point);
        tracing::info!(caster = %ctx.owner(), ?point, hits = targets.len(), "meteor impact");
        for target in targets {
            let Some(spec) = ctx.make_outgoing_spec(Arc::clone(&self.damage)) else {
                break;
            };
            if let Err(err) = ctx.apply_effect_spec_to_target(target, spec.with_hit_location(point)) {
                tracing::warn!(%target, %err, "meteor damage not applied");
            }
        }
        ctx.end_ability();
    }

    fn reset(&mut self) {
        self.impact_point = None;
    }
}
