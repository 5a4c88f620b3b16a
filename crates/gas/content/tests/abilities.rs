mod common;

use std::sync::Arc;

use common::{damage_effect, has_tag, spawn, tags, value, world};
use gas_content::{CharacterAttribute as Attr, CharacterStats, MeteorAbility, PurifyAbility, SampleTags};
use gas_core::{
    AbilityConfig, AbilityTaskKind, ActorId, GameplayEffect, GameplayEffectSpec, GameplayTagContainer, GameplayWorld,
    InstancingPolicy, MagnitudeSource, ModifierInfo, ModifierOp, TargetingQuery, WorldEvent,
};
use vek::Vec3;

fn meteor_config(tags: &SampleTags) -> Arc<AbilityConfig> {
    let cost = GameplayEffect::instant("GE_Meteor_Cost")
        .with_modifier(ModifierInfo::new(
            Attr::Mana.name(),
            ModifierOp::Add,
            MagnitudeSource::constant(-25.0),
        ))
        .into_shared();
    let cooldown = GameplayEffect::has_duration("GE_Meteor_Cooldown", 8.0)
        .with_granted_tag(tags.cooldown_meteor)
        .into_shared();
    Arc::new(
        AbilityConfig::new("Meteor", InstancingPolicy::InstancedPerExecution)
            .with_cost(cost)
            .with_cooldown(cooldown)
            .with_ability_tag(tags.ability_meteor),
    )
}

fn enemy_at(world: &mut GameplayWorld, tags: &Arc<SampleTags>, position: Vec3<f32>) -> ActorId {
    spawn(world, tags, position, tags.faction_enemy, CharacterStats::default())
}

#[test]
fn meteor_hits_everything_in_radius_after_delay() {
    let tags = tags();
    let mut world = world(&tags, None);
    let mage = spawn(&mut world, &tags, Vec3::zero(), tags.faction_player, CharacterStats::default());
    let near = enemy_at(&mut world, &tags, Vec3::new(0.0, 0.0, 10.0));
    let edge = enemy_at(&mut world, &tags, Vec3::new(3.0, 0.0, 10.0));
    let far = enemy_at(&mut world, &tags, Vec3::new(0.0, 0.0, 18.0));
    let ally = spawn(
        &mut world,
        &tags,
        Vec3::new(0.0, 0.0, 11.0),
        tags.faction_player,
        CharacterStats::default(),
    );

    let query = TargetingQuery::default().with_forbidden(GameplayTagContainer::from_iter([tags.faction_player]));
    let meteor = MeteorAbility::new(meteor_config(&tags), damage_effect("GE_Meteor_Damage", 30.0), 25.0, 4.0, 1.0)
        .with_query(query);
    let handle = world.grant_ability(mage, Box::new(meteor), 1).expect("grant");

    assert!(world.try_activate_ability(mage, handle));
    let pending = world.pending_tasks(mage);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].1, AbilityTaskKind::WaitTargetData);
    assert_eq!(value(&world, mage, Attr::Mana), 50.0, "nothing is paid before the aim is confirmed");

    world.update_targeting_aim(mage, Vec3::new(0.0, 0.0, 10.0)).expect("aim");
    assert_eq!(world.confirm_targeting(mage).expect("confirm"), 1);
    assert_eq!(value(&world, mage, Attr::Mana), 25.0);
    assert!(has_tag(&world, mage, tags.cooldown_meteor));

    world.tick(0.5);
    assert_eq!(value(&world, near, Attr::Health), 100.0);

    world.tick(0.6);
    assert_eq!(value(&world, near, Attr::Health), 70.0);
    assert_eq!(value(&world, edge, Attr::Health), 70.0);
    assert_eq!(value(&world, far, Attr::Health), 100.0);
    assert_eq!(value(&world, ally, Attr::Health), 100.0);
    assert!(world.pending_tasks(mage).is_empty());
    assert!(!world.asc(mage).expect("asc").ability_spec(handle).expect("spec").is_active());
}

#[test]
fn cancelled_meteor_costs_nothing() {
    let tags = tags();
    let mut world = world(&tags, None);
    let mage = spawn(&mut world, &tags, Vec3::zero(), tags.faction_player, CharacterStats::default());
    let target = enemy_at(&mut world, &tags, Vec3::new(0.0, 0.0, 10.0));

    let meteor = MeteorAbility::new(meteor_config(&tags), damage_effect("GE_Meteor_Damage", 30.0), 25.0, 4.0, 1.0);
    let handle = world.grant_ability(mage, Box::new(meteor), 1).expect("grant");

    assert!(world.try_activate_ability(mage, handle));
    assert_eq!(world.cancel_targeting(mage).expect("cancel"), 1);

    assert_eq!(value(&world, mage, Attr::Mana), 50.0);
    assert!(!has_tag(&world, mage, tags.cooldown_meteor));
    assert!(world.pending_tasks(mage).is_empty());
    assert!(world.journal().iter().any(|event| matches!(
        event,
        WorldEvent::AbilityEnded { actor, was_cancelled: true, .. } if *actor == mage
    )));

    world.tick(2.0);
    assert_eq!(value(&world, target, Attr::Health), 100.0);
    assert!(world.try_activate_ability(mage, handle), "can be recast after cancelling");
}

#[test]
fn meteor_aim_is_clamped_to_max_range() {
    let tags = tags();
    let mut world = world(&tags, None);
    let mage = spawn(&mut world, &tags, Vec3::zero(), tags.faction_player, CharacterStats::default());
    let in_range = enemy_at(&mut world, &tags, Vec3::new(0.0, 0.0, 10.0));

    let meteor = MeteorAbility::new(meteor_config(&tags), damage_effect("GE_Meteor_Damage", 30.0), 10.0, 2.0, 0.0);
    let handle = world.grant_ability(mage, Box::new(meteor), 1).expect("grant");

    assert!(world.try_activate_ability(mage, handle));
    world.update_targeting_aim(mage, Vec3::new(0.0, 0.0, 40.0)).expect("aim");
    world.confirm_targeting(mage).expect("confirm");
    world.tick(0.1);

    assert_eq!(value(&world, in_range, Attr::Health), 70.0);
}

fn poison(tags: &SampleTags) -> Arc<GameplayEffect> {
    GameplayEffect::has_duration("GE_Poison", 10.0)
        .with_period(1.0)
        .with_modifier(ModifierInfo::new(
            Attr::Damage.name(),
            ModifierOp::Add,
            MagnitudeSource::constant(2.0),
        ))
        .with_asset_tag(tags.debuff_poison)
        .with_granted_tag(tags.state_poisoned)
        .into_shared()
}

fn poison_levels(world: &GameplayWorld, actor: ActorId) -> Vec<i32> {
    world
        .asc(actor)
        .expect("asc")
        .active_effects()
        .iter()
        .filter(|effect| effect.name() == "GE_Poison")
        .map(|effect| effect.spec().level())
        .collect()
}

fn purify(tags: &Arc<SampleTags>) -> PurifyAbility {
    let config = Arc::new(
        AbilityConfig::new("Purify", InstancingPolicy::InstancedPerActor).with_ability_tag(tags.ability_purify),
    );
    PurifyAbility::new(config, Arc::clone(tags), 6.0).with_factions(
        GameplayTagContainer::from_iter([tags.faction_player]),
        GameplayTagContainer::new(),
    )
}

#[test]
fn purify_removes_poison_up_to_its_level_from_allies() {
    let tags = tags();
    let mut world = world(&tags, None);
    let cleric = spawn(&mut world, &tags, Vec3::zero(), tags.faction_player, CharacterStats::default());
    let ally = spawn(
        &mut world,
        &tags,
        Vec3::new(2.0, 0.0, 0.0),
        tags.faction_player,
        CharacterStats::default(),
    );
    let enemy = enemy_at(&mut world, &tags, Vec3::new(-2.0, 0.0, 0.0));

    let poison = poison(&tags);
    for (actor, level) in [(cleric, 1), (ally, 1), (ally, 3), (enemy, 1)] {
        world
            .apply_effect_spec(actor, GameplayEffectSpec::new(Arc::clone(&poison), level))
            .expect("apply");
    }

    let handle = world.grant_ability(cleric, Box::new(purify(&tags)), 2).expect("grant");
    assert!(world.try_activate_ability(cleric, handle));

    assert!(poison_levels(&world, cleric).is_empty());
    assert!(!has_tag(&world, cleric, tags.state_poisoned));
    assert_eq!(poison_levels(&world, ally), vec![3]);
    assert!(has_tag(&world, ally, tags.state_poisoned));
    assert_eq!(poison_levels(&world, enemy), vec![1]);
}

#[test]
fn purify_alone_still_cleanses_caster() {
    let tags = tags();
    let mut world = world(&tags, None);
    let cleric = spawn(&mut world, &tags, Vec3::zero(), tags.faction_player, CharacterStats::default());
    world
        .apply_effect_spec(cleric, GameplayEffectSpec::new(poison(&tags), 1))
        .expect("apply");

    let handle = world.grant_ability(cleric, Box::new(purify(&tags)), 1).expect("grant");
    assert!(world.try_activate_ability(cleric, handle));

    assert!(poison_levels(&world, cleric).is_empty());
    assert!(!world.asc(cleric).expect("asc").ability_spec(handle).expect("spec").is_active());
}
