use crate::tags::{GameplayTag, GameplayTagContainer, GameplayTagCountContainer, TagSource};

/// Tag state owned by one component.
///
/// `combined` counts every grant (loose adds and active effects). `loose`
/// tracks which of those came from direct adds so removal of a loose tag
/// never eats a grant owned by an effect.
#[derive(Clone, Debug, Default)]
pub(crate) struct OwnedTags {
    loose: GameplayTagCountContainer,
    combined: GameplayTagCountContainer,
    /// Presence transitions since the last drain: `(tag, now_present)`.
    changes: Vec<(GameplayTag, bool)>,
}

impl OwnedTags {
    pub(crate) fn combined(&self) -> &GameplayTagCountContainer {
        &self.combined
    }

    pub(crate) fn loose(&self) -> &GameplayTagCountContainer {
        &self.loose
    }

    pub(crate) fn add_loose(&mut self, tag: GameplayTag) {
        self.loose.add(tag);
        self.grant(tag);
    }

    /// Returns false (and changes nothing) if `tag` was never added loosely.
    pub(crate) fn remove_loose(&mut self, tag: GameplayTag) -> bool {
        if !self.loose.has_tag_exact(tag) {
            return false;
        }
        self.loose.remove(tag);
        self.revoke(tag);
        true
    }

    pub(crate) fn grant(&mut self, tag: GameplayTag) {
        if self.combined.add(tag) {
            self.changes.push((tag, true));
        }
    }

    pub(crate) fn revoke(&mut self, tag: GameplayTag) {
        if self.combined.remove(tag) {
            self.changes.push((tag, false));
        }
    }

    pub(crate) fn grant_all(&mut self, tags: &GameplayTagContainer) {
        for tag in tags {
            self.grant(tag);
        }
    }

    pub(crate) fn revoke_all(&mut self, tags: &GameplayTagContainer) {
        for tag in tags {
            self.revoke(tag);
        }
    }

    pub(crate) fn take_changes(&mut self) -> Vec<(GameplayTag, bool)> {
        core::mem::take(&mut self.changes)
    }

    /// Drops every loose tag, keeping grants that belong to effects.
    pub(crate) fn clear_loose(&mut self) {
        let loose: Vec<(GameplayTag, u32)> = self.loose.iter().collect();
        for (tag, count) in loose {
            for _ in 0..count {
                self.remove_loose(tag);
            }
        }
    }
}
