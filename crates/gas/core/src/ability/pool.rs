use std::collections::BTreeMap;

use super::GameplayAbility;

/// Free lists of per-execution ability instances, keyed by ability name.
///
/// Owned by the world. Instances are reset on release; anything beyond the
/// per-kind capacity is dropped.
#[derive(Debug)]
pub struct AbilityPool {
    capacity: usize,
    free: BTreeMap<String, Vec<Box<dyn GameplayAbility>>>,
    created: u64,
    reused: u64,
}

impl AbilityPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: BTreeMap::new(),
            created: 0,
            reused: 0,
        }
    }

    /// Takes a pooled instance of `template`'s kind, or creates one.
    pub fn acquire(&mut self, template: &dyn GameplayAbility) -> Box<dyn GameplayAbility> {
        let name = &template.config().name;
        if let Some(instance) = self.free.get_mut(name).and_then(Vec::pop) {
            self.reused += 1;
            return instance;
        }
        self.created += 1;
        tracing::trace!(ability = %name, "creating pooled ability instance");
        template.create_poolable_instance()
    }

    pub fn release(&mut self, mut instance: Box<dyn GameplayAbility>) {
        instance.reset();
        let free = self.free.entry(instance.config().name.clone()).or_default();
        if free.len() < self.capacity {
            free.push(instance);
        }
    }

    /// Free instances currently held for `name`.
    pub fn available(&self, name: &str) -> usize {
        self.free.get(name).map_or(0, Vec::len)
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn reused(&self) -> u64 {
        self.reused
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ability::{AbilityConfig, AbilityContext, InstancingPolicy};

    #[derive(Debug)]
    struct Counter {
        config: Arc<AbilityConfig>,
        hits: u32,
    }

    impl GameplayAbility for Counter {
        fn config(&self) -> &Arc<AbilityConfig> {
            &self.config
        }

        fn create_poolable_instance(&self) -> Box<dyn GameplayAbility> {
            Box::new(Counter {
                config: Arc::clone(&self.config),
                hits: 0,
            })
        }

        fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>) {
            self.hits += 1;
            ctx.end_ability();
        }

        fn reset(&mut self) {
            self.hits = 0;
        }
    }

    fn template() -> Counter {
        Counter {
            config: AbilityConfig::new("Counter", InstancingPolicy::InstancedPerExecution).into_shared(),
            hits: 7,
        }
    }

    #[test]
    fn released_instances_are_reused() {
        let template = template();
        let mut pool = AbilityPool::new(2);

        let first = pool.acquire(&template);
        pool.release(first);
        assert_eq!(pool.available("Counter"), 1);

        let _again = pool.acquire(&template);
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.reused(), 1);
        assert_eq!(pool.available("Counter"), 0);
    }

    #[test]
    fn capacity_bounds_free_list() {
        let template = template();
        let mut pool = AbilityPool::new(1);

        let a = pool.acquire(&template);
        let b = pool.acquire(&template);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available("Counter"), 1);
    }
}
