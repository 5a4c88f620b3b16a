//! Built-in targeting strategies.

use vek::Vec3;

use crate::actor::{ActorId, Avatar};
use crate::config::GasConfig;

use super::{TargetActor, TargetData, TargetingOutcome, TargetingQuery, TargetingSpace};

/// Caster avatar or a logged cancellation.
fn caster_avatar(caster: Option<ActorId>, space: &dyn TargetingSpace, strategy: &str) -> Option<Avatar> {
    let Some(caster) = caster else {
        tracing::error!(strategy, "targeting started before configure");
        return None;
    };
    let avatar = space.avatar(caster).copied();
    if avatar.is_none() {
        tracing::error!(strategy, %caster, "caster has no avatar");
    }
    avatar
}

/// Valid candidates within `range` of `origin` (surface distance), nearest first.
fn candidates_in_range(
    caster: ActorId,
    origin: Vec3<f32>,
    range: f32,
    query: &TargetingQuery,
    space: &dyn TargetingSpace,
) -> Vec<(f32, ActorId, Avatar)> {
    let mut found: Vec<(f32, ActorId, Avatar)> = space
        .avatars()
        .filter(|(id, _)| query.is_valid_target(caster, *id, space))
        .map(|(id, avatar)| (avatar.distance_to(origin), id, *avatar))
        .filter(|(distance, _, avatar)| *distance - avatar.radius <= range)
        .collect();
    found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    found
}

fn multi_target(found: Vec<(f32, ActorId, Avatar)>) -> TargetingOutcome {
    if found.is_empty() {
        return TargetingOutcome::Cancelled;
    }
    TargetingOutcome::Ready(TargetData::MultiTarget {
        actors: found.into_iter().map(|(_, id, _)| id).collect(),
    })
}

// ============================================================================
// Line trace
// ============================================================================

/// Nearest valid actor whose body intersects the caster's forward ray.
#[derive(Clone, Debug)]
pub struct LineTraceTargetActor {
    caster: Option<ActorId>,
    pub range: f32,
    pub query: TargetingQuery,
}

impl LineTraceTargetActor {
    pub fn new(range: f32) -> Self {
        Self {
            caster: None,
            range,
            query: TargetingQuery::default(),
        }
    }

    /// Trace with the world's configured default range.
    pub fn from_config(config: &GasConfig) -> Self {
        Self::new(config.default_trace_range)
    }

    #[must_use]
    pub fn with_query(mut self, query: TargetingQuery) -> Self {
        self.query = query;
        self
    }

    fn trace(&self, caster: ActorId, origin: &Avatar, space: &dyn TargetingSpace) -> Option<(f32, ActorId)> {
        let direction = origin.facing();
        space
            .avatars()
            .filter(|(id, _)| self.query.is_valid_target(caster, *id, space))
            .filter_map(|(id, avatar)| {
                let offset = avatar.position - origin.position;
                let along = offset.dot(direction);
                if !(0.0..=self.range).contains(&along) {
                    return None;
                }
                let closest = origin.position + direction * along;
                (closest.distance(avatar.position) <= avatar.radius).then_some((along, id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
    }
}

impl Default for LineTraceTargetActor {
    fn default() -> Self {
        Self::from_config(&GasConfig::default())
    }
}

impl TargetActor for LineTraceTargetActor {
    fn configure(&mut self, caster: ActorId) {
        self.caster = Some(caster);
    }

    fn start_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        let Some(origin) = caster_avatar(self.caster, space, "line_trace") else {
            return Some(TargetingOutcome::Cancelled);
        };
        let caster = self.caster?;

        let outcome = match self.trace(caster, &origin, space) {
            Some((along, actor)) => TargetingOutcome::Ready(TargetData::SingleTargetHit {
                hit_point: origin.position + origin.facing() * along,
                actor: Some(actor),
            }),
            None => {
                tracing::debug!(%caster, range = self.range, "line trace found no target");
                TargetingOutcome::Cancelled
            }
        };
        Some(outcome)
    }
}

// ============================================================================
// Sphere overlap
// ============================================================================

/// Every valid actor within `radius` of the caster.
#[derive(Clone, Debug)]
pub struct SphereOverlapTargetActor {
    caster: Option<ActorId>,
    pub radius: f32,
    pub query: TargetingQuery,
}

impl SphereOverlapTargetActor {
    pub fn new(radius: f32) -> Self {
        Self {
            caster: None,
            radius,
            query: TargetingQuery::default(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: TargetingQuery) -> Self {
        self.query = query;
        self
    }
}

impl TargetActor for SphereOverlapTargetActor {
    fn configure(&mut self, caster: ActorId) {
        self.caster = Some(caster);
    }

    fn start_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        let Some(origin) = caster_avatar(self.caster, space, "sphere_overlap") else {
            return Some(TargetingOutcome::Cancelled);
        };
        let caster = self.caster?;
        let found = candidates_in_range(caster, origin.position, self.radius, &self.query, space);
        Some(multi_target(found))
    }
}

// ============================================================================
// Cone trace
// ============================================================================

/// Valid actors within `range` whose direction is inside the caster's cone.
#[derive(Clone, Debug)]
pub struct ConeTraceTargetActor {
    caster: Option<ActorId>,
    pub range: f32,
    /// Full cone angle in degrees.
    pub cone_angle: f32,
    pub query: TargetingQuery,
}

impl ConeTraceTargetActor {
    pub fn new(range: f32, cone_angle: f32) -> Self {
        Self {
            caster: None,
            range,
            cone_angle,
            query: TargetingQuery::default(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: TargetingQuery) -> Self {
        self.query = query;
        self
    }
}

impl TargetActor for ConeTraceTargetActor {
    fn configure(&mut self, caster: ActorId) {
        self.caster = Some(caster);
    }

    fn start_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        let Some(origin) = caster_avatar(self.caster, space, "cone_trace") else {
            return Some(TargetingOutcome::Cancelled);
        };
        let caster = self.caster?;
        let facing = origin.facing();
        let half_angle = (self.cone_angle * 0.5).to_radians();

        let found = candidates_in_range(caster, origin.position, self.range, &self.query, space)
            .into_iter()
            .filter(|(_, _, avatar)| {
                let offset = avatar.position - origin.position;
                if offset.magnitude_squared() <= f32::EPSILON {
                    return false;
                }
                let cos = offset.normalized().dot(facing).clamp(-1.0, 1.0);
                cos.acos() < half_angle
            })
            .collect();
        Some(multi_target(found))
    }
}

// ============================================================================
// Ground select
// ============================================================================

/// Player-aimed ground point, resolved on confirm and clamped to `max_range`.
#[derive(Clone, Debug)]
pub struct GroundSelectTargetActor {
    caster: Option<ActorId>,
    pub max_range: f32,
    aim: Option<Vec3<f32>>,
}

impl GroundSelectTargetActor {
    pub fn new(max_range: f32) -> Self {
        Self {
            caster: None,
            max_range,
            aim: None,
        }
    }
}

impl TargetActor for GroundSelectTargetActor {
    fn configure(&mut self, caster: ActorId) {
        self.caster = Some(caster);
        self.aim = None;
    }

    fn start_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        let Some(origin) = caster_avatar(self.caster, space, "ground_select") else {
            return Some(TargetingOutcome::Cancelled);
        };
        if self.aim.is_none() {
            self.aim = Some(origin.position + origin.facing() * self.max_range);
        }
        None
    }

    fn confirm_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        let Some(origin) = caster_avatar(self.caster, space, "ground_select") else {
            return Some(TargetingOutcome::Cancelled);
        };
        let aim = self.aim.unwrap_or(origin.position);
        let offset = aim - origin.position;
        let distance = offset.magnitude();
        let hit_point = if distance > self.max_range {
            origin.position + offset * (self.max_range / distance)
        } else {
            aim
        };
        Some(TargetingOutcome::Ready(TargetData::SingleTargetHit { hit_point, actor: None }))
    }

    fn set_aim_point(&mut self, point: Vec3<f32>) {
        self.aim = Some(point);
    }

    fn destroy(&mut self) {
        self.aim = None;
    }
}
