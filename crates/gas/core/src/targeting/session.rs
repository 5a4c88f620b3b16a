use vek::Vec3;

use crate::actor::ActorId;

use super::{TargetActor, TargetingOutcome, TargetingSpace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Configured,
    Targeting,
    Resolved,
    Destroyed,
}

/// One run of a targeting strategy on behalf of a caster.
///
/// Yields at most one [`TargetingOutcome`]. Once resolved or destroyed every
/// further call returns `None`, so late confirmations never reach the ability.
#[derive(Debug)]
pub struct TargetingSession {
    actor: Box<dyn TargetActor>,
    state: SessionState,
}

impl TargetingSession {
    pub fn new(mut actor: Box<dyn TargetActor>, caster: ActorId) -> Self {
        actor.configure(caster);
        Self {
            actor,
            state: SessionState::Configured,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Resolved | SessionState::Destroyed)
    }

    pub fn start(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        if self.state != SessionState::Configured {
            return None;
        }
        self.state = SessionState::Targeting;
        let outcome = self.actor.start_targeting(space);
        self.resolve(outcome)
    }

    pub fn confirm(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        if self.state != SessionState::Targeting {
            return None;
        }
        let outcome = self.actor.confirm_targeting(space);
        self.resolve(outcome)
    }

    pub fn cancel(&mut self) -> Option<TargetingOutcome> {
        if self.is_finished() {
            return None;
        }
        self.actor.cancel_targeting();
        self.resolve(Some(TargetingOutcome::Cancelled))
    }

    pub fn set_aim_point(&mut self, point: Vec3<f32>) {
        if self.state == SessionState::Targeting {
            self.actor.set_aim_point(point);
        }
    }

    /// Tears the strategy down. Any result still pending is discarded.
    pub fn destroy(&mut self) {
        if self.state != SessionState::Destroyed {
            self.actor.destroy();
            self.state = SessionState::Destroyed;
        }
    }

    fn resolve(&mut self, outcome: Option<TargetingOutcome>) -> Option<TargetingOutcome> {
        if outcome.is_some() {
            self.state = SessionState::Resolved;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use vek::Vec3;

    use super::*;
    use crate::actor::Avatar;
    use crate::targeting::test_space::FlatSpace;
    use crate::targeting::{GroundSelectTargetActor, TargetData};

    fn ground_session() -> (TargetingSession, FlatSpace) {
        let space = FlatSpace::default().with_actor(1, Avatar::new(Vec3::zero()));
        let session = TargetingSession::new(Box::new(GroundSelectTargetActor::new(10.0)), ActorId(1));
        (session, space)
    }

    #[test]
    fn pending_session_resolves_once_on_confirm() {
        let (mut session, space) = ground_session();
        assert!(session.start(&space).is_none());
        assert_eq!(session.state(), SessionState::Targeting);

        session.set_aim_point(Vec3::new(3.0, 0.0, 4.0));
        let outcome = session.confirm(&space);
        assert_eq!(
            outcome,
            Some(TargetingOutcome::Ready(TargetData::SingleTargetHit {
                hit_point: Vec3::new(3.0, 0.0, 4.0),
                actor: None,
            }))
        );
        assert!(session.confirm(&space).is_none());
        assert!(session.cancel().is_none());
    }

    #[test]
    fn cancel_yields_cancelled_once() {
        let (mut session, space) = ground_session();
        session.start(&space);
        assert_eq!(session.cancel(), Some(TargetingOutcome::Cancelled));
        assert!(session.cancel().is_none());
        assert!(session.confirm(&space).is_none());
    }

    #[test]
    fn destroyed_session_discards_late_results() {
        let (mut session, space) = ground_session();
        session.start(&space);
        session.destroy();
        assert!(session.confirm(&space).is_none());
        assert!(session.cancel().is_none());
    }
}
