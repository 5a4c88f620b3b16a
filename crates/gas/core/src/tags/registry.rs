//! Process-wide tag table.
//!
//! Tags are never removed, so handles stay valid for the process lifetime and
//! independent simulations (tests, sessions) can share one table safely.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use arrayvec::ArrayVec;

use super::{GameplayTag, TagError};
use crate::config::GasConfig;

type Lineage = ArrayVec<GameplayTag, { GasConfig::MAX_TAG_DEPTH }>;

struct TagEntry {
    name: Arc<str>,
    /// Root-first chain of ancestors, including the tag itself.
    lineage: Lineage,
}

#[derive(Default)]
struct TagTable {
    entries: Vec<TagEntry>,
    lookup: HashMap<Arc<str>, GameplayTag>,
}

impl TagTable {
    fn intern(&mut self, name: &str) -> Result<GameplayTag, TagError> {
        if let Some(tag) = self.lookup.get(name) {
            return Ok(*tag);
        }
        validate(name)?;

        let mut lineage = Lineage::new();
        let mut end = 0;
        for segment in name.split('.') {
            end += segment.len();
            let prefix = &name[..end];
            let tag = match self.lookup.get(prefix) {
                Some(tag) => *tag,
                None => self.insert(prefix, &lineage),
            };
            lineage.push(tag);
            end += 1;
        }

        lineage.last().copied().ok_or(TagError::Empty)
    }

    fn insert(&mut self, name: &str, parents: &Lineage) -> GameplayTag {
        let tag = GameplayTag(self.entries.len() as u32);
        let name: Arc<str> = Arc::from(name);
        let mut lineage = parents.clone();
        lineage.push(tag);

        tracing::trace!(tag = %name, id = tag.0, "registered gameplay tag");
        self.lookup.insert(Arc::clone(&name), tag);
        self.entries.push(TagEntry { name, lineage });
        tag
    }

    fn entry(&self, tag: GameplayTag) -> Option<&TagEntry> {
        self.entries.get(tag.index() as usize)
    }
}

fn validate(name: &str) -> Result<(), TagError> {
    if name.is_empty() {
        return Err(TagError::Empty);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(TagError::Whitespace {
            name: name.to_owned(),
        });
    }
    let mut depth = 0;
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(TagError::EmptySegment {
                name: name.to_owned(),
            });
        }
        depth += 1;
    }
    if depth > GasConfig::MAX_TAG_DEPTH {
        return Err(TagError::TooDeep {
            name: name.to_owned(),
            depth,
            max: GasConfig::MAX_TAG_DEPTH,
        });
    }
    Ok(())
}

fn table() -> &'static RwLock<TagTable> {
    static TABLE: OnceLock<RwLock<TagTable>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(TagTable::default()))
}

fn read<R>(f: impl FnOnce(&TagTable) -> R) -> R {
    let guard = table().read().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

pub(super) fn request(name: &str) -> Result<GameplayTag, TagError> {
    if let Some(tag) = find(name) {
        return Ok(tag);
    }
    let mut guard = table().write().unwrap_or_else(PoisonError::into_inner);
    guard.intern(name)
}

pub(super) fn find(name: &str) -> Option<GameplayTag> {
    read(|table| table.lookup.get(name).copied())
}

pub(super) fn name(tag: GameplayTag) -> Arc<str> {
    read(|table| {
        table
            .entry(tag)
            .map_or_else(|| Arc::from("<unknown>"), |entry| Arc::clone(&entry.name))
    })
}

pub(super) fn parent(tag: GameplayTag) -> Option<GameplayTag> {
    read(|table| {
        let lineage = &table.entry(tag)?.lineage;
        lineage.len().checked_sub(2).map(|index| lineage[index])
    })
}

pub(super) fn depth(tag: GameplayTag) -> usize {
    read(|table| table.entry(tag).map_or(0, |entry| entry.lineage.len()))
}

/// True when `ancestor` appears strictly above `tag` in its lineage.
pub(super) fn is_descendant(tag: GameplayTag, ancestor: GameplayTag) -> bool {
    read(|table| {
        table.entry(tag).is_some_and(|entry| {
            let parents = &entry.lineage[..entry.lineage.len().saturating_sub(1)];
            parents.contains(&ancestor)
        })
    })
}
