mod common;

use std::sync::{Arc, Mutex};

use common::{ATTACK, HEALTH, MANA, MAX_HEALTH, spawn, tag};
use gas_core::{
    AttributeSet, CueError, EffectApplication, GameplayCueEvent, GameplayCueHandler, GameplayCueNotify,
    GameplayEffect, GameplayEffectSpec, GameplayTagContainer, GameplayWorld, MagnitudeCalculation,
    MagnitudeSource, ModifierInfo, ModifierOp, StackDurationPolicy, StackingPolicy, TagRequirements,
    TagSource, WorldEvent,
};
use vek::Vec3;

fn add(attribute: &str, magnitude: f32) -> ModifierInfo {
    ModifierInfo::new(attribute, ModifierOp::Add, MagnitudeSource::constant(magnitude))
}

#[test]
fn health_stays_within_max_health_after_every_commit() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);

    let heal = GameplayEffect::instant("Heal").with_modifier(add("Health", 50.0)).into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(heal, 1))
        .expect("actor exists");
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.current_value(HEALTH), 100.0);

    let weaken = GameplayEffect::has_duration("Weaken", 5.0)
        .with_modifier(ModifierInfo::new(
            "MaxHealth",
            ModifierOp::Override,
            MagnitudeSource::constant(40.0),
        ))
        .into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(weaken, 1))
        .expect("actor exists");

    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.current_value(MAX_HEALTH), 40.0);
    assert!(asc.current_value(HEALTH) <= asc.current_value(MAX_HEALTH));

    let wound = GameplayEffect::instant("Wound").with_modifier(add("Health", -500.0)).into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(wound, 1))
        .expect("actor exists");
    assert_eq!(world.asc(actor).expect("asc").current_value(HEALTH), 0.0);
}

#[test]
fn stacking_by_target_merges_into_one_entry() {
    let mut world = GameplayWorld::default();
    let target = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let first = spawn(&mut world, Vec3::unit_x(), 100.0, 0.0);
    let second = spawn(&mut world, Vec3::unit_y(), 100.0, 0.0);

    let poison = GameplayEffect::has_duration("Poison", 10.0)
        .with_modifier(add("Attack", -2.0))
        .with_stacking(StackingPolicy::by_target(5))
        .into_shared();

    let spec_from = |world: &GameplayWorld, source| {
        world
            .asc(source)
            .expect("source asc")
            .make_outgoing_spec(Arc::clone(&poison), 1)
    };

    let spec = spec_from(&world, first);
    let applied = world.apply_effect_spec(target, spec).expect("target exists");
    let handle = applied.handle().expect("duration effect has a handle");

    let spec = spec_from(&world, second);
    let stacked = world.apply_effect_spec(target, spec).expect("target exists");
    assert_eq!(stacked, EffectApplication::Stacked { handle, stack_count: 2 });

    let asc = world.asc(target).expect("asc");
    assert_eq!(asc.active_effects().len(), 1);
    assert_eq!(asc.active_effect(handle).map(|effect| effect.stack_count()), Some(2));
    assert_eq!(asc.current_value(ATTACK), 6.0);
    assert_eq!(asc.base_value(ATTACK), 10.0);
}

#[test]
fn stacking_by_source_keeps_one_entry_per_source() {
    let mut world = GameplayWorld::default();
    let target = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let first = spawn(&mut world, Vec3::unit_x(), 100.0, 0.0);
    let second = spawn(&mut world, Vec3::unit_y(), 100.0, 0.0);

    let mark = GameplayEffect::infinite("Mark")
        .with_stacking(StackingPolicy::by_source(3))
        .into_shared();
    for source in [first, second, first] {
        let spec = world.asc(source).expect("asc").make_outgoing_spec(Arc::clone(&mark), 1);
        world.apply_effect_spec(target, spec).expect("target exists");
    }

    let counts: Vec<u32> = world
        .asc(target)
        .expect("asc")
        .active_effects()
        .iter()
        .map(|effect| effect.stack_count())
        .collect();
    assert_eq!(counts, vec![2, 1]);
}

#[test]
fn extend_duration_stops_at_the_stack_limit() {
    let mut world = GameplayWorld::default();
    let target = spawn(&mut world, Vec3::zero(), 100.0, 0.0);

    let haste = GameplayEffect::has_duration("Haste", 4.0)
        .with_stacking(StackingPolicy::by_target(2).with_duration_policy(StackDurationPolicy::ExtendDuration))
        .into_shared();
    for _ in 0..2 {
        world
            .apply_effect_spec(target, GameplayEffectSpec::new(Arc::clone(&haste), 1))
            .expect("target exists");
    }
    let effect = &world.asc(target).expect("asc").active_effects()[0];
    assert_eq!(effect.stack_count(), 2);
    assert_eq!(effect.time_remaining(), 8.0);

    for _ in 0..3 {
        world
            .apply_effect_spec(target, GameplayEffectSpec::new(Arc::clone(&haste), 1))
            .expect("target exists");
    }
    let effect = &world.asc(target).expect("asc").active_effects()[0];
    assert_eq!(effect.stack_count(), 2);
    assert_eq!(effect.time_remaining(), 8.0);
}

#[derive(Debug)]
struct SourceAttack;

impl MagnitudeCalculation for SourceAttack {
    fn calculate_magnitude(&self, _spec: &GameplayEffectSpec, source: Option<&dyn AttributeSet>) -> f32 {
        source.map_or(0.0, |set| -set.current_value(ATTACK))
    }
}

#[test]
fn spec_magnitudes_are_snapshotted_at_creation() {
    let mut world = GameplayWorld::default();
    let caster = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let target = spawn(&mut world, Vec3::unit_z(), 100.0, 0.0);
    let amount = tag("Data.Amount");

    let strike = GameplayEffect::instant("Strike")
        .with_modifier(ModifierInfo::new(
            "Health",
            ModifierOp::Add,
            MagnitudeSource::Custom(Arc::new(SourceAttack)),
        ))
        .with_modifier(ModifierInfo::new(
            "Health",
            ModifierOp::Add,
            MagnitudeSource::set_by_caller(amount, 0.0),
        ))
        .into_shared();

    let mut spec = world.asc(caster).expect("asc").make_outgoing_spec(Arc::clone(&strike), 1);
    spec.set_set_by_caller_magnitude(amount, -5.0).expect("first write");
    assert!(spec.set_set_by_caller_magnitude(amount, -50.0).is_err());

    // Buffing the caster after the spec exists changes nothing.
    world
        .asc_mut(caster)
        .expect("asc")
        .set_base_value(ATTACK, 90.0);

    world.apply_effect_spec(target, spec).expect("target exists");
    assert_eq!(world.asc(target).expect("asc").current_value(HEALTH), 85.0);
}

#[test]
fn granted_tags_are_reference_counted() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let slowed = tag("State.Slowed");

    let chill = GameplayEffect::infinite("Chill").with_granted_tag(slowed).into_shared();
    let frost = GameplayEffect::infinite("Frost").with_granted_tag(slowed).into_shared();

    let chill_handle = world
        .apply_effect_spec(actor, GameplayEffectSpec::new(chill, 1))
        .expect("actor exists")
        .handle()
        .expect("handle");
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(frost, 1))
        .expect("actor exists");
    world.add_loose_tag(actor, slowed).expect("actor exists");

    assert_eq!(world.asc(actor).expect("asc").owned_tags().count(slowed), 3);
    assert!(world.remove_active_effect(actor, chill_handle).expect("actor exists"));
    assert!(world.remove_loose_tag(actor, slowed).expect("actor exists"));
    assert!(world.asc(actor).expect("asc").has_tag(slowed));
    assert!(world.asc(actor).expect("asc").has_tag(tag("State")));

    // Second loose removal is a no-op; the effect grant stays.
    assert!(!world.remove_loose_tag(actor, slowed).expect("actor exists"));
    assert!(world.asc(actor).expect("asc").has_tag(slowed));
}

#[test]
fn ongoing_requirements_inhibit_and_restore_modifiers() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let enraged = tag("State.Enraged");
    let fury = tag("State.Fury");

    let rage = GameplayEffect::infinite("Rage")
        .with_modifier(ModifierInfo::new("Attack", ModifierOp::Multiply, MagnitudeSource::constant(2.0)))
        .with_granted_tag(fury)
        .with_ongoing_requirements(TagRequirements::new().with_required(GameplayTagContainer::single(enraged)))
        .into_shared();
    let handle = world
        .apply_effect_spec(actor, GameplayEffectSpec::new(rage, 1))
        .expect("actor exists")
        .handle()
        .expect("handle");

    let asc = world.asc(actor).expect("asc");
    assert!(asc.active_effect(handle).expect("active").is_inhibited());
    assert_eq!(asc.current_value(ATTACK), 10.0);
    assert!(!asc.has_tag(fury));

    world.add_loose_tag(actor, enraged).expect("actor exists");
    let asc = world.asc(actor).expect("asc");
    assert!(!asc.active_effect(handle).expect("active").is_inhibited());
    assert_eq!(asc.current_value(ATTACK), 20.0);
    assert!(asc.has_tag(fury));

    world.remove_loose_tag(actor, enraged).expect("actor exists");
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.current_value(ATTACK), 10.0);
    assert!(!asc.has_tag(fury));
}

#[test]
fn application_requirements_block_without_side_effects() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let immune = tag("State.Immune");
    world.add_loose_tag(actor, immune).expect("actor exists");

    let curse = GameplayEffect::instant("Curse")
        .with_modifier(add("Health", -10.0))
        .with_application_requirements(TagRequirements::new().with_ignored(GameplayTagContainer::single(immune)))
        .into_shared();

    let result = world
        .apply_effect_spec(actor, GameplayEffectSpec::new(curse, 1))
        .expect("actor exists");
    assert_eq!(result, EffectApplication::Blocked);
    assert_eq!(world.asc(actor).expect("asc").current_value(HEALTH), 100.0);
}

#[test]
fn remove_effects_with_tags_clears_matching_debuffs() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let poison_tag = tag("Debuff.Poison");

    let poison = GameplayEffect::infinite("Poison")
        .with_asset_tag(poison_tag)
        .with_modifier(add("Attack", -4.0))
        .into_shared();
    let cleanse = GameplayEffect::instant("Cleanse")
        .with_remove_effects_with_tag(tag("Debuff"))
        .into_shared();

    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(poison, 1))
        .expect("actor exists");
    assert_eq!(world.asc(actor).expect("asc").current_value(ATTACK), 6.0);

    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(cleanse, 1))
        .expect("actor exists");
    let asc = world.asc(actor).expect("asc");
    assert!(asc.active_effects().is_empty());
    assert_eq!(asc.current_value(ATTACK), 10.0);
}

#[test]
fn periodic_effect_executes_each_period_until_expiry() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 50.0);

    let drain = GameplayEffect::has_duration("ManaDrain", 3.0)
        .with_period(1.0)
        .with_modifier(add("Mana", -5.0))
        .into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(drain, 1))
        .expect("actor exists");

    // Periodic modifiers never aggregate into the current value.
    assert_eq!(world.asc(actor).expect("asc").current_value(MANA), 50.0);

    for _ in 0..5 {
        world.tick(1.0);
    }
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.base_value(MANA), 35.0);
    assert_eq!(asc.current_value(MANA), 35.0);
    assert!(asc.active_effects().is_empty());
}

#[derive(Debug, Default)]
struct CueRecorder {
    seen: Arc<Mutex<Vec<(GameplayCueEvent, Option<Vec3<f32>>)>>>,
}

impl GameplayCueHandler for CueRecorder {
    fn handle_cue(&self, notify: &GameplayCueNotify) -> Result<(), CueError> {
        self.seen
            .lock()
            .expect("cue lock")
            .push((notify.event, notify.params.location));
        Ok(())
    }
}

#[test]
fn cues_follow_effect_lifecycle_with_avatar_location() {
    let mut world = GameplayWorld::default();
    let position = Vec3::new(1.0, 2.0, 3.0);
    let actor = spawn(&mut world, position, 100.0, 0.0);
    let burning = tag("GameplayCue.Burning");

    let recorder = CueRecorder::default();
    let seen = Arc::clone(&recorder.seen);
    world.register_cue_handler(tag("GameplayCue"), Box::new(recorder));

    let burn = GameplayEffect::has_duration("Burn", 1.0).with_cue(burning).into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(burn, 1))
        .expect("actor exists");
    world.tick(1.0);

    let events: Vec<GameplayCueEvent> = seen.lock().expect("cue lock").iter().map(|(event, _)| *event).collect();
    assert_eq!(
        events,
        vec![GameplayCueEvent::OnActive, GameplayCueEvent::WhileActive, GameplayCueEvent::Removed]
    );
    assert!(seen.lock().expect("cue lock").iter().all(|(_, location)| *location == Some(position)));
    assert_eq!(world.cue_manager().dispatched(), 3);
}

#[test]
fn journal_records_tag_transitions_once() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let stunned = tag("State.Stunned");
    world.take_journal();

    world.add_loose_tag(actor, stunned).expect("actor exists");
    world.add_loose_tag(actor, stunned).expect("actor exists");
    world.remove_loose_tag(actor, stunned).expect("actor exists");
    world.remove_loose_tag(actor, stunned).expect("actor exists");

    let transitions: Vec<WorldEvent> = world
        .take_journal()
        .into_iter()
        .filter(|event| matches!(event, WorldEvent::TagAdded { .. } | WorldEvent::TagRemoved { .. }))
        .collect();
    assert_eq!(
        transitions,
        vec![
            WorldEvent::TagAdded { actor, tag: stunned },
            WorldEvent::TagRemoved { actor, tag: stunned },
        ]
    );
    assert!(!world.asc(actor).expect("asc").owned_tags().has_tag(stunned));
}
