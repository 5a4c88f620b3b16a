/// Ability-system configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GasConfig {
    /// Free instances kept per ability kind once they return from an execution.
    pub ability_pool_capacity: usize,

    /// Upper bound on gameplay events processed by a single world flush.
    /// Observers that keep re-emitting events past this bound are cut off.
    pub max_events_per_flush: usize,

    /// World events retained for consumers before the oldest are dropped.
    pub journal_capacity: usize,

    /// Range used by trace strategies that are not given one explicitly.
    pub default_trace_range: f32,
}

impl GasConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of segments in a tag ("A.B.C" has depth 3).
    pub const MAX_TAG_DEPTH: usize = 8;
    /// Hard cap applied to every stacking limit.
    pub const MAX_STACK_LIMIT: u32 = 99;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ABILITY_POOL_CAPACITY: usize = 8;
    pub const DEFAULT_MAX_EVENTS_PER_FLUSH: usize = 256;
    pub const DEFAULT_JOURNAL_CAPACITY: usize = 1024;
    pub const DEFAULT_TRACE_RANGE: f32 = 20.0;

    pub fn new() -> Self {
        Self {
            ability_pool_capacity: Self::DEFAULT_ABILITY_POOL_CAPACITY,
            max_events_per_flush: Self::DEFAULT_MAX_EVENTS_PER_FLUSH,
            journal_capacity: Self::DEFAULT_JOURNAL_CAPACITY,
            default_trace_range: Self::DEFAULT_TRACE_RANGE,
        }
    }

    /// Overrides the per-ability pool capacity (builder pattern).
    #[must_use]
    pub const fn with_ability_pool_capacity(mut self, capacity: usize) -> Self {
        self.ability_pool_capacity = capacity;
        self
    }

    /// Overrides the per-flush event bound (builder pattern).
    #[must_use]
    pub const fn with_max_events_per_flush(mut self, max_events: usize) -> Self {
        self.max_events_per_flush = max_events;
        self
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self::new()
    }
}
