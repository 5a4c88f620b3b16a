use core::fmt;

/// Handle of a pending ability task, unique within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityTaskHandle(pub u64);

impl fmt::Display for AbilityTaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Suspension points an ability can wait on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum AbilityTaskKind {
    WaitTargetData,
    WaitDelay,
    WaitNextFrame,
}
