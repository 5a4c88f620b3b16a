//! Actor identity and the minimal avatar contract consumed by targeting.
//!
//! The ability system never inspects engine objects. An actor is an opaque
//! id; when it has a body in the world it carries an [`Avatar`] with a
//! position, a facing direction and a collision radius. Whether the actor
//! owns an ability system component is answered by the world.

use core::fmt;

use vek::Vec3;

/// Unique identifier of an actor hosted by a [`crate::GameplayWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl ActorId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Spatial body of an actor: identity and transform source for traces.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Avatar {
    pub position: Vec3<f32>,
    /// Facing direction. Not required to be normalized.
    pub forward: Vec3<f32>,
    /// Collision radius used by line traces.
    pub radius: f32,
}

impl Avatar {
    pub const DEFAULT_RADIUS: f32 = 0.5;

    pub fn new(position: Vec3<f32>) -> Self {
        Self {
            position,
            forward: Vec3::unit_z(),
            radius: Self::DEFAULT_RADIUS,
        }
    }

    #[must_use]
    pub fn with_forward(mut self, forward: Vec3<f32>) -> Self {
        self.forward = forward;
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Normalized facing direction, or +Z when the stored vector is degenerate.
    pub fn facing(&self) -> Vec3<f32> {
        if self.forward.magnitude_squared() <= f32::EPSILON {
            Vec3::unit_z()
        } else {
            self.forward.normalized()
        }
    }

    pub fn distance_to(&self, point: Vec3<f32>) -> f32 {
        self.position.distance(point)
    }
}
