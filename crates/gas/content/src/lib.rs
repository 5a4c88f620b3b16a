//! Sample game content for the ability system.
//!
//! Provides the pieces a game supplies on top of `gas-core`:
//! - [`tags::SampleTags`]: the registered tag vocabulary
//! - [`attributes::CharacterAttributeSet`]: health, mana, damage and experience rules
//! - [`abilities`]: Fireball, Meteor and Purify
//! - [`executions::BurnExecution`]: attack-scaled damage over time
//! - [`character`]: spawning, level progression and kill bounties
//!
//! With the `loaders` feature (default), the same content can be read from
//! RON/TOML files through [`loaders::ContentFactory`].
pub mod abilities;
pub mod attributes;
pub mod character;
pub mod error;
pub mod executions;
pub mod tags;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use abilities::{FireballAbility, MeteorAbility, PurifyAbility};
pub use attributes::{CharacterAttribute, CharacterAttributeSet};
pub use character::{
    BountyObserver, CharacterStats, LevelData, LevelTable, LevelUp, LevelUpObserver, install_observers,
    spawn_character,
};
pub use error::LoadError;
pub use executions::BurnExecution;
pub use tags::SampleTags;

#[cfg(feature = "loaders")]
pub use loaders::{ContentFactory, LoadResult, SampleContent};
