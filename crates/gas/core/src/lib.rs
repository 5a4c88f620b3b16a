//! Gameplay ability system core: tags, attributes, effects, abilities,
//! targeting and cue routing.
//!
//! `gas-core` is synchronous and free of I/O. All cross-actor mutation flows
//! through [`world::GameplayWorld`]; per-actor state lives in
//! [`component::AbilitySystemComponent`]. Content crates supply attribute
//! sets, abilities and effect definitions through the traits re-exported here.
pub mod ability;
pub mod actor;
pub mod attribute;
pub mod component;
pub mod config;
pub mod cue;
pub mod effect;
pub mod error;
pub mod event;
pub mod tags;
pub mod targeting;
pub mod world;
pub use ability::{
    AbilityConfig, AbilityContext, AbilityPool, AbilitySpecHandle, AbilityTaskHandle, AbilityTaskKind,
    ActivationFailure, ActivationState, GameplayAbility, GameplayAbilitySpec, InstancingPolicy,
};
pub use actor::{ActorId, Avatar};
pub use attribute::{
    AttributeSet, AttributeStorage, AttributeValue, GameplayAttribute, HookContext, ModCallbackData,
    PlainAttributeSet,
};
pub use component::AbilitySystemComponent;
pub use config::GasConfig;
pub use cue::{
    CueDispatcher, CueError, GameplayCueEvent, GameplayCueHandler, GameplayCueManager, GameplayCueNotify,
    GameplayCueParameters,
};
pub use effect::{
    ActiveEffectHandle, ActiveGameplayEffect, Aggregator, DurationPolicy, EffectApplication, EffectContext,
    EvaluatedModifier, ExecutionCalculation, ExecutionParams, GameplayEffect, GameplayEffectSpec, LevelCurve,
    MagnitudeCalculation, MagnitudeSource, ModifierInfo, ModifierOp, ScalableFloat, SpecError,
    StackDurationPolicy, StackingPolicy, StackingType,
};
pub use error::{ErrorSeverity, GasError};
pub use event::{GameplayEventData, GameplayEventObserver, WorldEvent};
pub use tags::{
    GameplayTag, GameplayTagContainer, GameplayTagCountContainer, TagError, TagRequirements, TagSource,
};
pub use targeting::{
    ConeTraceTargetActor, GroundSelectTargetActor, LineTraceTargetActor, SphereOverlapTargetActor, TargetActor,
    TargetData, TargetingOutcome, TargetingQuery, TargetingSession, TargetingSpace,
};
pub use world::{GameplayWorld, WorldError};
