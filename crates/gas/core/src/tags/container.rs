//! Tag containers and hierarchical queries.

use std::collections::BTreeMap;

use super::GameplayTag;

/// Read-side tag queries shared by explicit and counted containers.
///
/// Every query respects hierarchy: a source holding `Debuff.Burn` satisfies
/// `has_tag(Debuff)`.
pub trait TagSource {
    /// Returns true if any held tag equals `tag` or descends from it.
    fn has_tag(&self, tag: GameplayTag) -> bool;

    /// Returns true if `tag` itself is held (no hierarchy expansion).
    fn has_tag_exact(&self, tag: GameplayTag) -> bool;

    /// Every tag in `tags` is satisfied. Vacuously true for an empty query.
    fn has_all(&self, tags: &GameplayTagContainer) -> bool {
        tags.iter().all(|tag| self.has_tag(tag))
    }

    /// At least one tag in `tags` is satisfied. False for an empty query.
    fn has_any(&self, tags: &GameplayTagContainer) -> bool {
        tags.iter().any(|tag| self.has_tag(tag))
    }
}

/// Explicit, ordered set of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameplayTagContainer {
    tags: Vec<GameplayTag>,
}

impl GameplayTagContainer {
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    pub fn single(tag: GameplayTag) -> Self {
        Self { tags: vec![tag] }
    }

    /// Adds `tag`, returning false if it was already present.
    pub fn add(&mut self, tag: GameplayTag) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(index) => {
                self.tags.insert(index, tag);
                true
            }
        }
    }

    /// Removes `tag`, returning false if it was not present.
    pub fn remove(&mut self, tag: GameplayTag) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(index) => {
                self.tags.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn extend_from(&mut self, other: &GameplayTagContainer) {
        for tag in other.iter() {
            self.add(tag);
        }
    }

    #[must_use]
    pub fn with(mut self, tag: GameplayTag) -> Self {
        self.add(tag);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = GameplayTag> + '_ {
        self.tags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagSource for GameplayTagContainer {
    fn has_tag(&self, tag: GameplayTag) -> bool {
        self.tags.iter().any(|held| held.matches(tag))
    }

    fn has_tag_exact(&self, tag: GameplayTag) -> bool {
        self.tags.binary_search(&tag).is_ok()
    }
}

impl FromIterator<GameplayTag> for GameplayTagContainer {
    fn from_iter<I: IntoIterator<Item = GameplayTag>>(iter: I) -> Self {
        let mut container = Self::new();
        for tag in iter {
            container.add(tag);
        }
        container
    }
}

impl<'a> IntoIterator for &'a GameplayTagContainer {
    type Item = GameplayTag;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, GameplayTag>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter().copied()
    }
}

/// Reference-counted tags.
///
/// A tag stays present while at least one source holds it, so revoking the
/// tags of one effect never strips a tag another effect (or a loose add)
/// still grants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayTagCountContainer {
    counts: BTreeMap<GameplayTag, u32>,
}

impl GameplayTagCountContainer {
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Increments the count of `tag`. Returns true when the tag became present.
    pub fn add(&mut self, tag: GameplayTag) -> bool {
        let count = self.counts.entry(tag).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrements the count of `tag`. Returns true when the tag disappeared.
    ///
    /// Removing an absent tag is a no-op.
    pub fn remove(&mut self, tag: GameplayTag) -> bool {
        let Some(count) = self.counts.get_mut(&tag) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&tag);
            true
        } else {
            false
        }
    }

    pub fn add_all(&mut self, tags: &GameplayTagContainer) {
        for tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_all(&mut self, tags: &GameplayTagContainer) {
        for tag in tags {
            self.remove(tag);
        }
    }

    pub fn count(&self, tag: GameplayTag) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Snapshot of the currently present tags.
    pub fn explicit_tags(&self) -> GameplayTagContainer {
        self.counts.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameplayTag, u32)> + '_ {
        self.counts.iter().map(|(tag, count)| (*tag, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl TagSource for GameplayTagCountContainer {
    fn has_tag(&self, tag: GameplayTag) -> bool {
        self.counts.keys().any(|held| held.matches(tag))
    }

    fn has_tag_exact(&self, tag: GameplayTag) -> bool {
        self.counts.contains_key(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> GameplayTag {
        GameplayTag::request(name).unwrap()
    }

    #[test]
    fn container_hierarchy_queries() {
        let tags = GameplayTagContainer::single(tag("State.Dead"));

        assert!(tags.has_tag(tag("State")));
        assert!(tags.has_tag(tag("State.Dead")));
        assert!(!tags.has_tag(tag("StateX")));
        assert!(!tags.has_tag_exact(tag("State")));
    }

    #[test]
    fn has_all_and_has_any_edge_cases() {
        let held: GameplayTagContainer = [tag("Debuff.Burn"), tag("Faction.Player")]
            .into_iter()
            .collect();
        let empty = GameplayTagContainer::new();

        assert!(held.has_all(&empty));
        assert!(!held.has_any(&empty));

        let query: GameplayTagContainer = [tag("Debuff"), tag("Faction")].into_iter().collect();
        assert!(held.has_all(&query));

        let mixed = query.clone().with(tag("State.Stunned"));
        assert!(!held.has_all(&mixed));
        assert!(held.has_any(&mixed));
    }

    #[test]
    fn container_add_remove_deduplicates() {
        let mut tags = GameplayTagContainer::new();
        assert!(tags.add(tag("Container.A")));
        assert!(!tags.add(tag("Container.A")));
        assert_eq!(tags.len(), 1);
        assert!(tags.remove(tag("Container.A")));
        assert!(!tags.remove(tag("Container.A")));
        assert!(tags.is_empty());
    }

    #[test]
    fn count_container_keeps_tag_until_last_source_releases() {
        let burning = tag("State.Burning");
        let mut counts = GameplayTagCountContainer::new();

        assert!(counts.add(burning));
        assert!(!counts.add(burning));
        assert_eq!(counts.count(burning), 2);

        assert!(!counts.remove(burning));
        assert!(counts.has_tag(tag("State")));
        assert!(counts.remove(burning));
        assert!(!counts.has_tag(burning));

        // Removing again is a no-op
        assert!(!counts.remove(burning));
        assert_eq!(counts.count(burning), 0);
    }
}
