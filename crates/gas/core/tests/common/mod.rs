#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gas_core::{
    AbilityConfig, AbilityContext, AbilityTaskHandle, ActorId, AttributeSet, AttributeStorage, Avatar,
    GameplayAbility, GameplayAttribute, GameplayTag, GameplayWorld, TargetActor, TargetData,
};
use vek::Vec3;

pub const NAMES: &[&str] = &["Health", "MaxHealth", "Mana", "Attack"];
pub const HEALTH: GameplayAttribute = GameplayAttribute(0);
pub const MAX_HEALTH: GameplayAttribute = GameplayAttribute(1);
pub const MANA: GameplayAttribute = GameplayAttribute(2);
pub const ATTACK: GameplayAttribute = GameplayAttribute(3);

/// Health clamped to [0, MaxHealth]; Mana clamped at 0.
#[derive(Debug)]
pub struct TestAttributes {
    storage: AttributeStorage,
}

impl TestAttributes {
    pub fn new(health: f32, mana: f32) -> Self {
        let mut set = Self {
            storage: AttributeStorage::new(NAMES),
        };
        set.init_value(MAX_HEALTH, health);
        set.init_value(HEALTH, health);
        set.init_value(MANA, mana);
        set.init_value(ATTACK, 10.0);
        set
    }
}

impl AttributeSet for TestAttributes {
    fn storage(&self) -> &AttributeStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut AttributeStorage {
        &mut self.storage
    }

    fn pre_attribute_change(&self, attribute: GameplayAttribute, new_value: &mut f32) {
        match attribute {
            HEALTH => *new_value = new_value.clamp(0.0, self.current_value(MAX_HEALTH).max(0.0)),
            MANA => *new_value = new_value.max(0.0),
            _ => {}
        }
    }
}

pub fn tag(name: &str) -> GameplayTag {
    GameplayTag::request(name).expect("valid tag name")
}

/// Spawns an actor with a [`TestAttributes`] ability system.
pub fn spawn(world: &mut GameplayWorld, position: Vec3<f32>, health: f32, mana: f32) -> ActorId {
    let actor = world.spawn_actor(Avatar::new(position));
    world
        .add_ability_system(actor, Box::new(TestAttributes::new(health, mana)))
        .expect("fresh actor accepts an ability system");
    actor
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

/// How a [`ScriptedAbility`] behaves once activated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Script {
    /// Ends inside `activate_ability`.
    EndImmediately,
    /// Waits for ground-select target data.
    WaitGround,
    /// Line-traces and ends when target data arrives.
    Trace,
    /// Waits `seconds`, then ends.
    Delay(f32),
    /// Waits a frame, then ends.
    NextFrame,
    /// Stays active until ended from outside.
    Hold,
}

/// Ability that records every callback into a shared log.
#[derive(Debug)]
pub struct ScriptedAbility {
    pub config: Arc<AbilityConfig>,
    pub script: Script,
    pub log: Log,
    pub runs: u32,
}

impl ScriptedAbility {
    pub fn new(config: Arc<AbilityConfig>, script: Script, log: Log) -> Self {
        Self {
            config,
            script,
            log,
            runs: 0,
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().expect("log lock").push(entry.into());
    }
}

impl GameplayAbility for ScriptedAbility {
    fn config(&self) -> &Arc<AbilityConfig> {
        &self.config
    }

    fn create_poolable_instance(&self) -> Box<dyn GameplayAbility> {
        Box::new(Self::new(Arc::clone(&self.config), self.script, Arc::clone(&self.log)))
    }

    fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>) {
        self.runs += 1;
        self.record(format!("activate:{}", self.runs));
        match self.script {
            Script::EndImmediately => ctx.end_ability(),
            Script::WaitGround => {
                let actor: Box<dyn TargetActor> = Box::new(gas_core::GroundSelectTargetActor::new(10.0));
                ctx.wait_target_data(actor);
            }
            Script::Trace => {
                ctx.wait_target_data(Box::new(gas_core::LineTraceTargetActor::new(20.0)));
            }
            Script::Delay(seconds) => {
                ctx.wait_delay(seconds);
            }
            Script::NextFrame => {
                ctx.wait_next_frame();
            }
            Script::Hold => {}
        }
    }

    fn on_target_data_ready(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle, data: TargetData) {
        self.record(format!("target:{:?}", data.actors()));
        ctx.end_ability();
    }

    fn on_targeting_cancelled(&mut self, _ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        self.record("targeting_cancelled");
    }

    fn on_wait_finished(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        self.record("wait_finished");
        ctx.end_ability();
    }

    fn on_end_ability(&mut self, was_cancelled: bool) {
        self.record(format!("end:{was_cancelled}"));
    }

    fn reset(&mut self) {
        self.runs = 0;
    }
}
