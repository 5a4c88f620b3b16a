//! Sample abilities.
//!
//! | Ability  | Targeting        | Tasks                   | Commit            |
//! |----------|------------------|-------------------------|-------------------|
//! | Fireball | line trace       | target data             | on activation     |
//! | Meteor   | ground select    | target data, then delay | on confirmed aim  |
//! | Purify   | sphere overlap   | target data             | on target data    |

mod fireball;
mod meteor;
mod purify;

pub use fireball::FireballAbility;
pub use meteor::MeteorAbility;
pub use purify::PurifyAbility;
