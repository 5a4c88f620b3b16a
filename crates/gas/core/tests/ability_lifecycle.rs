mod common;

use std::sync::Arc;

use common::{MANA, Script, ScriptedAbility, entries, log, spawn, tag};
use gas_core::{
    AbilityConfig, AbilityTaskKind, ActivationFailure, ActivationState, GameplayEffect, GameplayEffectSpec,
    GameplayEventData, GameplayEventObserver, GameplayWorld, InstancingPolicy, MagnitudeSource, ModifierInfo,
    ModifierOp, WorldEvent,
};
use vek::Vec3;

fn config(name: &str, instancing: InstancingPolicy) -> AbilityConfig {
    AbilityConfig::new(name, instancing)
}

fn ended_events(world: &mut GameplayWorld) -> Vec<bool> {
    world
        .take_journal()
        .into_iter()
        .filter_map(|event| match event {
            WorldEvent::AbilityEnded { was_cancelled, .. } => Some(was_cancelled),
            _ => None,
        })
        .collect()
}

#[test]
fn grant_is_idempotent_per_config() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let shared = config("Dash", InstancingPolicy::NonInstanced).into_shared();
    let log = log();

    let first = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(Arc::clone(&shared), Script::Hold, log.clone())), 1)
        .expect("actor has asc");
    let second = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(shared, Script::Hold, log)), 3)
        .expect("actor has asc");

    assert_eq!(first, second);
    assert_eq!(world.asc(actor).expect("asc").ability_specs().len(), 1);
}

#[test]
fn per_execution_instances_come_from_the_pool() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let ability = ScriptedAbility::new(
        config("Bolt", InstancingPolicy::InstancedPerExecution).into_shared(),
        Script::EndImmediately,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(ability), 1).expect("actor has asc");

    assert!(world.try_activate_ability(actor, handle));
    assert!(world.try_activate_ability(actor, handle));

    // Each run starts from a reset instance.
    assert_eq!(entries(&log), vec!["activate:1", "end:false", "activate:1", "end:false"]);
    assert_eq!(world.pool().created(), 1);
    assert_eq!(world.pool().reused(), 1);
    assert_eq!(world.pool().available("Bolt"), 1);
    let spec = world.asc(actor).expect("asc").ability_spec(handle).expect("spec");
    assert!(!spec.has_instance());
    assert_eq!(spec.state(), ActivationState::Idle);
}

#[test]
fn per_actor_instance_survives_between_activations() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let ability = ScriptedAbility::new(
        config("Stance", InstancingPolicy::InstancedPerActor).into_shared(),
        Script::EndImmediately,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(ability), 1).expect("actor has asc");

    assert!(world.try_activate_ability(actor, handle));
    assert!(world.try_activate_ability(actor, handle));
    assert_eq!(entries(&log), vec!["activate:1", "end:false", "activate:2", "end:false"]);
    assert!(world.asc(actor).expect("asc").ability_spec(handle).expect("spec").has_instance());
}

#[test]
fn cancelling_targeting_ends_the_ability_exactly_once() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let channel = tag("State.Channeling");
    let ability = ScriptedAbility::new(
        config("Meteor", InstancingPolicy::InstancedPerExecution)
            .with_activation_owned_tag(channel)
            .into_shared(),
        Script::WaitGround,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(ability), 1).expect("actor has asc");

    assert!(world.try_activate_ability(actor, handle));
    assert!(world.asc(actor).expect("asc").has_tag(channel));
    assert_eq!(
        world.pending_tasks(actor).into_iter().map(|(_, kind)| kind).collect::<Vec<_>>(),
        vec![AbilityTaskKind::WaitTargetData]
    );
    world.take_journal();

    assert_eq!(world.cancel_targeting(actor).expect("actor exists"), 1);
    assert_eq!(world.cancel_targeting(actor).expect("actor exists"), 0);
    world.cancel_ability(actor, handle);
    world.end_ability(actor, handle);

    assert_eq!(entries(&log), vec!["activate:1", "targeting_cancelled", "end:true"]);
    assert_eq!(ended_events(&mut world), vec![true]);
    assert!(!world.asc(actor).expect("asc").has_tag(channel));
    assert!(world.pending_tasks(actor).is_empty());
}

#[test]
fn confirmed_ground_target_is_delivered_once() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let ability = ScriptedAbility::new(
        config("Meteor", InstancingPolicy::InstancedPerActor).into_shared(),
        Script::WaitGround,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(ability), 1).expect("actor has asc");

    assert!(world.try_activate_ability(actor, handle));
    world
        .update_targeting_aim(actor, Vec3::new(0.0, 0.0, 5.0))
        .expect("actor exists");
    assert_eq!(world.confirm_targeting(actor).expect("actor exists"), 1);
    assert_eq!(world.confirm_targeting(actor).expect("actor exists"), 0);

    assert_eq!(entries(&log), vec!["activate:1", "target:[]", "end:false"]);
}

#[test]
fn immediate_trace_resolves_after_activation_returns() {
    let mut world = GameplayWorld::default();
    let caster = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let victim = spawn(&mut world, Vec3::new(0.0, 0.0, 6.0), 100.0, 0.0);
    let log = log();
    let ability = ScriptedAbility::new(
        config("Fireball", InstancingPolicy::InstancedPerExecution).into_shared(),
        Script::Trace,
        log.clone(),
    );
    let handle = world.grant_ability(caster, Box::new(ability), 1).expect("actor has asc");

    assert!(world.try_activate_ability(caster, handle));
    assert_eq!(
        entries(&log),
        vec!["activate:1".to_owned(), format!("target:{:?}", vec![victim]), "end:false".to_owned()]
    );
    assert!(world.pending_tasks(caster).is_empty());
}

#[test]
fn wait_tasks_complete_on_later_ticks() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();

    let delayed = ScriptedAbility::new(
        config("Charge", InstancingPolicy::InstancedPerActor).into_shared(),
        Script::Delay(1.0),
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(delayed), 1).expect("actor has asc");
    assert!(world.try_activate_ability(actor, handle));

    world.tick(0.5);
    assert_eq!(entries(&log), vec!["activate:1"]);
    world.tick(0.5);
    assert_eq!(entries(&log), vec!["activate:1", "wait_finished", "end:false"]);

    let log = common::log();
    let next = ScriptedAbility::new(
        config("Blink", InstancingPolicy::NonInstanced).into_shared(),
        Script::NextFrame,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(next), 1).expect("actor has asc");
    assert!(world.try_activate_ability(actor, handle));
    assert_eq!(entries(&log), vec!["activate:1"]);
    world.tick(0.016);
    assert_eq!(entries(&log), vec!["activate:1", "wait_finished", "end:false"]);
}

#[test]
fn activation_gates_report_reasons() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let stunned = tag("State.Stunned");
    let armed = tag("State.Armed");

    let strike = config("Strike", InstancingPolicy::NonInstanced)
        .with_activation_blocked_tag(stunned)
        .with_activation_required_tag(armed)
        .into_shared();
    let handle = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(strike, Script::Hold, log)), 1)
        .expect("actor has asc");

    assert_eq!(world.activate_ability(actor, handle), Err(ActivationFailure::MissingRequiredTags));
    world.add_loose_tag(actor, armed).expect("actor exists");
    world.add_loose_tag(actor, stunned).expect("actor exists");
    assert_eq!(world.activate_ability(actor, handle), Err(ActivationFailure::BlockedByTags));
    world.remove_loose_tag(actor, stunned).expect("actor exists");
    assert_eq!(world.activate_ability(actor, handle), Ok(()));
    assert_eq!(world.activate_ability(actor, handle), Err(ActivationFailure::AlreadyActive));
}

#[test]
fn block_and_cancel_tags_between_abilities() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let attack = tag("Ability.Attack");
    let movement = tag("Ability.Movement");

    let channel = config("Channel", InstancingPolicy::InstancedPerActor)
        .with_ability_tag(tag("Ability.Channel"))
        .with_block_abilities_with_tag(attack)
        .into_shared();
    let slash = config("Slash", InstancingPolicy::InstancedPerActor)
        .with_ability_tag(tag("Ability.Attack.Melee"))
        .into_shared();
    let sprint = config("Sprint", InstancingPolicy::InstancedPerActor)
        .with_ability_tag(movement)
        .with_cancel_abilities_with_tag(tag("Ability.Channel"))
        .into_shared();

    let channel = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(channel, Script::Hold, log.clone())), 1)
        .expect("actor has asc");
    let slash = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(slash, Script::Hold, log.clone())), 1)
        .expect("actor has asc");
    let sprint = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(sprint, Script::Hold, log.clone())), 1)
        .expect("actor has asc");

    assert!(world.try_activate_ability(actor, channel));
    assert_eq!(world.activate_ability(actor, slash), Err(ActivationFailure::BlockedByAbility));

    assert!(world.try_activate_ability(actor, sprint));
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.active_abilities(), vec![sprint]);
    assert!(asc.blocked_ability_tags().is_empty());
    assert!(world.try_activate_ability(actor, slash));
}

#[test]
fn commit_pays_cost_and_cooldown_together_or_not_at_all() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 20.0);
    let log = log();
    let cooling = tag("Cooldown.Nova");

    let cost = GameplayEffect::instant("NovaCost")
        .with_modifier(ModifierInfo::new("Mana", ModifierOp::Add, MagnitudeSource::constant(-30.0)))
        .into_shared();
    let cooldown = GameplayEffect::has_duration("NovaCooldown", 2.0)
        .with_granted_tag(cooling)
        .into_shared();
    let nova = config("Nova", InstancingPolicy::InstancedPerActor)
        .with_cost(cost)
        .with_cooldown(cooldown)
        .into_shared();
    let handle = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(Arc::clone(&nova), Script::Hold, log)), 1)
        .expect("actor has asc");

    assert_eq!(world.activate_ability(actor, handle), Err(ActivationFailure::InsufficientCost));
    assert!(!world.commit_ability(actor, handle));
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.current_value(MANA), 20.0);
    assert!(!asc.has_tag(cooling));

    let refill = GameplayEffect::instant("Refill")
        .with_modifier(ModifierInfo::new("Mana", ModifierOp::Add, MagnitudeSource::constant(40.0)))
        .into_shared();
    world
        .apply_effect_spec(actor, GameplayEffectSpec::new(refill, 1))
        .expect("actor exists");

    assert!(world.commit_ability(actor, handle));
    let asc = world.asc(actor).expect("asc");
    assert_eq!(asc.current_value(MANA), 30.0);
    assert!(asc.is_on_cooldown(&nova));
    assert_eq!(asc.cooldown_remaining(&nova), Some(2.0));

    // Cooldown blocks a second commit without paying again.
    assert!(!world.commit_ability(actor, handle));
    assert_eq!(world.asc(actor).expect("asc").current_value(MANA), 30.0);

    world.tick(2.0);
    assert!(!world.asc(actor).expect("asc").is_on_cooldown(&nova));
}

#[test]
fn remove_abilities_with_tag_cancels_then_removes() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let aura = config("Aura", InstancingPolicy::InstancedPerActor)
        .with_ability_tag(tag("Ability.Passive.Aura"))
        .into_shared();
    let handle = world
        .grant_ability(actor, Box::new(ScriptedAbility::new(aura, Script::Delay(5.0), log.clone())), 1)
        .expect("actor has asc");
    assert!(world.try_activate_ability(actor, handle));

    assert_eq!(world.remove_abilities_with_tag(actor, tag("Ability.Passive")).expect("actor exists"), 1);
    assert_eq!(entries(&log), vec!["activate:1", "end:true"]);
    assert!(world.asc(actor).expect("asc").ability_specs().is_empty());
    assert!(world.pending_tasks(actor).is_empty());
}

#[derive(Debug)]
struct ChainObserver {
    follow_up: gas_core::GameplayTag,
}

impl GameplayEventObserver for ChainObserver {
    fn on_gameplay_event(&self, world: &mut GameplayWorld, event: &GameplayEventData) {
        world.send_gameplay_event(GameplayEventData::new(self.follow_up, event.target));
    }
}

#[test]
fn gameplay_events_are_delivered_fifo_within_one_flush() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let first = tag("Event.Test.First");
    let second = tag("Event.Test.Second");
    world.add_event_observer(first, Box::new(ChainObserver { follow_up: second }));
    world.take_journal();

    world.send_gameplay_event(GameplayEventData::new(first, actor));
    let tags: Vec<_> = world
        .take_journal()
        .into_iter()
        .filter_map(|event| match event {
            WorldEvent::Gameplay(data) => Some(data.tag),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec![first, second]);
}

#[test]
fn despawn_cancels_running_abilities() {
    let mut world = GameplayWorld::default();
    let actor = spawn(&mut world, Vec3::zero(), 100.0, 0.0);
    let log = log();
    let ability = ScriptedAbility::new(
        config("Meteor", InstancingPolicy::InstancedPerExecution).into_shared(),
        Script::WaitGround,
        log.clone(),
    );
    let handle = world.grant_ability(actor, Box::new(ability), 1).expect("actor has asc");
    assert!(world.try_activate_ability(actor, handle));

    world.despawn_actor(actor).expect("actor exists");
    assert_eq!(entries(&log), vec!["activate:1", "end:true"]);
    assert!(world.asc(actor).is_none());
    assert_eq!(world.pool().available("Meteor"), 1);
}
