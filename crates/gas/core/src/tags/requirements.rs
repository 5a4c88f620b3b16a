use super::{GameplayTagContainer, TagSource};

/// Tag gate: every `require` tag present and no `ignore` tag present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TagRequirements {
    pub require: GameplayTagContainer,
    pub ignore: GameplayTagContainer,
}

impl TagRequirements {
    pub const fn new() -> Self {
        Self {
            require: GameplayTagContainer::new(),
            ignore: GameplayTagContainer::new(),
        }
    }

    #[must_use]
    pub fn with_required(mut self, tags: GameplayTagContainer) -> Self {
        self.require = tags;
        self
    }

    #[must_use]
    pub fn with_ignored(mut self, tags: GameplayTagContainer) -> Self {
        self.ignore = tags;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.require.is_empty() && self.ignore.is_empty()
    }

    /// Both checks are evaluated independently; neither short-circuits the other.
    pub fn requirements_met(&self, tags: &impl TagSource) -> bool {
        let has_required = tags.has_all(&self.require);
        let has_ignored = tags.has_any(&self.ignore);
        has_required && !has_ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::GameplayTag;

    fn tag(name: &str) -> GameplayTag {
        GameplayTag::request(name).unwrap()
    }

    #[test]
    fn empty_requirements_always_pass() {
        let held = GameplayTagContainer::new();
        assert!(TagRequirements::new().requirements_met(&held));
    }

    #[test]
    fn forbidden_tag_fails_even_when_required_present() {
        let requirements = TagRequirements::new()
            .with_required(GameplayTagContainer::single(tag("Faction.NPC")))
            .with_ignored(GameplayTagContainer::single(tag("State.Dead")));

        let alive: GameplayTagContainer = [tag("Faction.NPC.Enemy")].into_iter().collect();
        let dead = alive.clone().with(tag("State.Dead"));
        let neutral = GameplayTagContainer::single(tag("Faction.Neutral"));

        assert!(requirements.requirements_met(&alive));
        assert!(!requirements.requirements_met(&dead));
        assert!(!requirements.requirements_met(&neutral));
    }
}
