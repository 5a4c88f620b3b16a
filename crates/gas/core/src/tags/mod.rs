//! Hierarchical gameplay tags.
//!
//! A [`GameplayTag`] is an interned handle over a dot-separated name such as
//! `"State.Dead"`. Handles are cheap to copy and compare; the name lives in a
//! process-wide registry that only grows. Hierarchy queries are segment-based:
//! `"State.Dead"` matches `"State"`, while `"StateX"` matches neither.
//!
//! Containers come in two flavours:
//! - [`GameplayTagContainer`]: an explicit set of tags (definitions, queries)
//! - [`GameplayTagCountContainer`]: reference-counted tags (owned actor state)

mod container;
mod registry;
mod requirements;

pub use container::{GameplayTagContainer, GameplayTagCountContainer, TagSource};
pub use requirements::TagRequirements;

use core::fmt;
use std::sync::Arc;

use crate::error::{ErrorSeverity, GasError};

/// Interned hierarchical tag handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameplayTag(u32);

impl GameplayTag {
    /// Interns `name` and returns its handle.
    ///
    /// Idempotent: the same name always yields the same handle. Parent tags
    /// ("A" and "A.B" for "A.B.C") are registered along the way.
    pub fn request(name: &str) -> Result<Self, TagError> {
        registry::request(name)
    }

    /// Returns the handle for an already registered name without interning.
    pub fn find(name: &str) -> Option<Self> {
        registry::find(name)
    }

    pub fn name(self) -> Arc<str> {
        registry::name(self)
    }

    /// Direct parent ("A.B" for "A.B.C"), or `None` for a root tag.
    pub fn parent(self) -> Option<Self> {
        registry::parent(self)
    }

    /// Number of segments in the tag name.
    pub fn depth(self) -> usize {
        registry::depth(self)
    }

    /// Returns true when `self` equals `other` or is a descendant of it.
    ///
    /// `State.Dead`.matches(`State`) is true; the reverse is false.
    pub fn matches(self, other: GameplayTag) -> bool {
        self == other || registry::is_descendant(self, other)
    }

    pub(crate) const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameplayTag({})", self.name())
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl TryFrom<&str> for GameplayTag {
    type Error = TagError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::request(name)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for GameplayTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for GameplayTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
        Self::request(&name).map_err(serde::de::Error::custom)
    }
}

/// Errors raised when interning a malformed tag name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag name is empty")]
    Empty,

    /// Leading, trailing or doubled '.' separator.
    #[error("tag '{name}' has an empty segment")]
    EmptySegment { name: String },

    #[error("tag '{name}' contains whitespace")]
    Whitespace { name: String },

    #[error("tag '{name}' is {depth} segments deep (max {max})")]
    TooDeep {
        name: String,
        depth: usize,
        max: usize,
    },
}

impl GasError for TagError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "TAG_EMPTY",
            Self::EmptySegment { .. } => "TAG_EMPTY_SEGMENT",
            Self::Whitespace { .. } => "TAG_WHITESPACE",
            Self::TooDeep { .. } => "TAG_TOO_DEEP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_idempotent() {
        let a = GameplayTag::request("Test.Idempotent.Leaf").unwrap();
        let b = GameplayTag::request("Test.Idempotent.Leaf").unwrap();
        assert_eq!(a, b);
        assert_eq!(&*a.name(), "Test.Idempotent.Leaf");
    }

    #[test]
    fn request_registers_parents() {
        let leaf = GameplayTag::request("Test.Parents.A.B").unwrap();
        let parent = GameplayTag::find("Test.Parents.A").expect("parent interned");
        assert_eq!(leaf.parent(), Some(parent));
        assert_eq!(leaf.depth(), 4);
        assert_eq!(GameplayTag::find("Test").unwrap().parent(), None);
    }

    #[test]
    fn matching_is_segment_based() {
        let dead = GameplayTag::request("State.Dead").unwrap();
        let state = GameplayTag::request("State").unwrap();
        let state_x = GameplayTag::request("StateX").unwrap();

        assert!(dead.matches(state));
        assert!(dead.matches(dead));
        assert!(!state.matches(dead));
        assert!(!dead.matches(state_x));
        assert!(!state_x.matches(state));
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert_eq!(GameplayTag::request(""), Err(TagError::Empty));
        assert!(matches!(
            GameplayTag::request("A..B"),
            Err(TagError::EmptySegment { .. })
        ));
        assert!(matches!(
            GameplayTag::request(".A"),
            Err(TagError::EmptySegment { .. })
        ));
        assert!(matches!(
            GameplayTag::request("A.B."),
            Err(TagError::EmptySegment { .. })
        ));
        assert!(matches!(
            GameplayTag::request("A B"),
            Err(TagError::Whitespace { .. })
        ));
        assert!(matches!(
            GameplayTag::request("A.B.C.D.E.F.G.H.I"),
            Err(TagError::TooDeep { depth: 9, .. })
        ));
    }

    #[test]
    fn failed_request_does_not_register_prefix() {
        let _ = GameplayTag::request("Unregistered.Prefix..Bad");
        assert!(GameplayTag::find("Unregistered.Prefix").is_none());
    }
}
