use super::GameplayAttribute;

/// Base and current value of one attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    pub base: f32,
    pub current: f32,
}

/// Value table backing an attribute set.
///
/// Out-of-range attributes read as 0.0 and ignore writes; ids only come from
/// the schema that built the storage, so that path is logged, not fatal.
#[derive(Clone, Debug)]
pub struct AttributeStorage {
    names: &'static [&'static str],
    values: Vec<AttributeValue>,
    dirty: Vec<bool>,
}

impl AttributeStorage {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            values: vec![AttributeValue::default(); names.len()],
            dirty: vec![false; names.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<GameplayAttribute> {
        self.names
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| GameplayAttribute::new(index as u16))
    }

    pub fn name(&self, attribute: GameplayAttribute) -> Option<&'static str> {
        self.names.get(attribute.index()).copied()
    }

    pub fn attributes(&self) -> impl Iterator<Item = GameplayAttribute> + use<> {
        (0..self.values.len() as u16).map(GameplayAttribute::new)
    }

    pub fn value(&self, attribute: GameplayAttribute) -> Option<AttributeValue> {
        self.values.get(attribute.index()).copied()
    }

    pub fn base(&self, attribute: GameplayAttribute) -> f32 {
        self.value(attribute).map_or(0.0, |value| value.base)
    }

    pub fn current(&self, attribute: GameplayAttribute) -> f32 {
        self.value(attribute).map_or(0.0, |value| value.current)
    }

    /// Commits a base value and marks the attribute for recalculation.
    pub fn set_base(&mut self, attribute: GameplayAttribute, value: f32) {
        let index = attribute.index();
        match self.values.get_mut(index) {
            Some(slot) => {
                slot.base = value;
                self.dirty[index] = true;
            }
            None => tracing::warn!(index, "base write to unknown attribute ignored"),
        }
    }

    pub fn set_current(&mut self, attribute: GameplayAttribute, value: f32) {
        match self.values.get_mut(attribute.index()) {
            Some(slot) => slot.current = value,
            None => tracing::warn!(
                index = attribute.index(),
                "current write to unknown attribute ignored"
            ),
        }
    }

    pub fn mark_dirty(&mut self, attribute: GameplayAttribute) {
        if let Some(flag) = self.dirty.get_mut(attribute.index()) {
            *flag = true;
        }
    }

    /// Drains the dirty set in schema order.
    pub fn take_dirty(&mut self) -> Vec<GameplayAttribute> {
        let mut dirty = Vec::new();
        for (index, flag) in self.dirty.iter_mut().enumerate() {
            if core::mem::take(flag) {
                dirty.push(GameplayAttribute::new(index as u16));
            }
        }
        dirty
    }

    /// `(name, value)` pairs in schema order.
    pub fn snapshot(&self) -> Vec<(&'static str, AttributeValue)> {
        self.names.iter().copied().zip(self.values.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_writes_mark_dirty_once() {
        let mut storage = AttributeStorage::new(&["A", "B", "C"]);
        storage.set_base(GameplayAttribute::new(2), 5.0);
        storage.set_base(GameplayAttribute::new(0), 1.0);
        storage.set_current(GameplayAttribute::new(1), 9.0);

        assert_eq!(
            storage.take_dirty(),
            vec![GameplayAttribute::new(0), GameplayAttribute::new(2)]
        );
        assert!(storage.take_dirty().is_empty());
    }

    #[test]
    fn unknown_attribute_reads_zero() {
        let mut storage = AttributeStorage::new(&["A"]);
        storage.set_base(GameplayAttribute::new(7), 3.0);
        assert_eq!(storage.base(GameplayAttribute::new(7)), 0.0);
        assert!(storage.take_dirty().is_empty());
    }
}
