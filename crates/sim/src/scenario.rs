//! Scripted encounter driven through the runtime handle.
//!
//! A mage and a cleric face a goblin and an ogre. The mage opens with a
//! fireball, drops a meteor on the ogre, gets poisoned, and the cleric
//! cleanses. The mage keeps fireballing once per second afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use gas_content::SampleContent;
use gas_core::{ActorId, GameplayEffectSpec};
use gas_runtime::{
    CueAssetRegistry, CuePoolManager, InMemoryCuePool, Runtime, RuntimeConfig, RuntimeHandle, Topic, WorldSnapshot,
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use vek::Vec3;

use crate::config::SimConfig;

const POISON_EFFECT: &str = "GE_Poison";

#[derive(Debug, Serialize)]
pub struct Summary {
    pub frames: u64,
    pub actors: BTreeMap<String, ActorId>,
    pub casts: Vec<CastRecord>,
    /// Events observed per bus topic.
    pub events: BTreeMap<String, u64>,
    pub cue_pool: CuePoolSummary,
    pub snapshot: WorldSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CastRecord {
    pub frame: u64,
    pub caster: String,
    pub ability: String,
    pub outcome: String,
}

#[derive(Debug, Serialize)]
pub struct CuePoolSummary {
    pub live: usize,
    pub created: u64,
    pub reused: u64,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Cast { caster: &'static str, ability: &'static str },
    Aimed { caster: &'static str, ability: &'static str, aim: Vec3<f32> },
    Poison { target: &'static str, level: i32 },
}

struct Cast {
    actors: BTreeMap<String, ActorId>,
    records: Vec<CastRecord>,
}

impl Cast {
    fn actor(&self, name: &str) -> Result<ActorId> {
        self.actors
            .get(name)
            .copied()
            .with_context(|| format!("scenario actor '{name}' was not spawned"))
    }

    fn record(&mut self, frame: u64, caster: &str, ability: &str, outcome: String) {
        tracing::info!(frame, caster, ability, %outcome, "cast");
        self.records.push(CastRecord {
            frame,
            caster: caster.to_owned(),
            ability: ability.to_owned(),
            outcome,
        });
    }
}

fn cue_assets(content: &SampleContent) -> CueAssetRegistry {
    let tags = &content.tags;
    CueAssetRegistry::new()
        .with(tags.cue_fireball_impact, "fx/fireball_impact")
        .with(tags.cue_meteor_impact, "fx/meteor_impact")
        .with(tags.cue_burn_loop, "fx/burn_loop")
        .with(tags.cue_purify_effect, "fx/purify")
        .with(tags.cue_level_up, "fx/level_up")
}

fn schedule(config: &SimConfig) -> Vec<(u64, Step)> {
    let at = |seconds: f32| (seconds * config.tick_rate_hz as f32).round() as u64;
    let ogre_position = Vec3::new(1.0, 0.0, 12.0);

    let mut steps = vec![
        (at(0.0), Step::Cast {
            caster: "Mage",
            ability: "Fireball",
        }),
        (at(0.5), Step::Aimed {
            caster: "Mage",
            ability: "Meteor",
            aim: ogre_position,
        }),
        (at(1.0), Step::Poison {
            target: "Mage",
            level: 1,
        }),
        (at(2.0), Step::Cast {
            caster: "Cleric",
            ability: "Purify",
        }),
    ];
    let mut second = 2.0;
    while second < config.duration_secs {
        steps.push((at(second), Step::Cast {
            caster: "Mage",
            ability: "Fireball",
        }));
        second += 1.0;
    }
    steps.sort_by_key(|(frame, _)| *frame);
    steps
}

/// Counts events per topic until the bus closes.
fn spawn_collector(handle: &RuntimeHandle) -> JoinHandle<BTreeMap<String, u64>> {
    let counters: Vec<JoinHandle<(String, u64)>> = handle
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, mut rx)| {
            tokio::spawn(async move {
                let mut count = 0;
                loop {
                    match rx.recv().await {
                        Ok(_) => count += 1,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(?topic, skipped, "event collector lagged");
                            count += skipped;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                (format!("{topic:?}"), count)
            })
        })
        .collect();

    tokio::spawn(async move {
        let mut counts = BTreeMap::new();
        for counter in counters {
            match counter.await {
                Ok((topic, count)) => {
                    counts.insert(topic, count);
                }
                Err(err) => tracing::error!(%err, "event collector failed"),
            }
        }
        counts
    })
}

async fn perform(handle: &RuntimeHandle, content: &SampleContent, cast: &mut Cast, frame: u64, step: Step) -> Result<()> {
    match step {
        Step::Cast { caster, ability } => {
            let actor = cast.actor(caster)?;
            let outcome = match handle.activate_ability_by_name(actor, ability).await {
                Ok(()) => "activated".to_owned(),
                Err(err) => err.to_string(),
            };
            cast.record(frame, caster, ability, outcome);
        }
        Step::Aimed { caster, ability, aim } => {
            let actor = cast.actor(caster)?;
            let outcome = match handle.activate_ability_by_name(actor, ability).await {
                Ok(()) => {
                    handle.update_aim(actor, aim).await?;
                    let confirmed = handle.confirm_targeting(actor).await?;
                    format!("activated, {confirmed} target session(s) confirmed")
                }
                Err(err) => err.to_string(),
            };
            cast.record(frame, caster, ability, outcome);
        }
        Step::Poison { target, level } => {
            let actor = cast.actor(target)?;
            let poison = content.effects.get("scenario", POISON_EFFECT)?;
            let application = handle.apply_effect(actor, GameplayEffectSpec::new(poison, level)).await?;
            tracing::info!(frame, target, ?application, "poison applied");
        }
    }
    Ok(())
}

pub async fn run(config: &SimConfig, content: &SampleContent) -> Result<Summary> {
    let mut world = content.create_world();
    let mut cast = Cast {
        actors: BTreeMap::new(),
        records: Vec::new(),
    };
    for (name, position) in [
        ("Mage", Vec3::zero()),
        ("Cleric", Vec3::new(-2.0, 0.0, 0.0)),
        ("Goblin", Vec3::new(0.0, 0.0, 6.0)),
        ("Ogre", Vec3::new(1.0, 0.0, 12.0)),
    ] {
        let actor = content.spawn(&mut world, name, position)?;
        cast.actors.insert(name.to_owned(), actor);
    }

    let pool = Arc::new(InMemoryCuePool::new());
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            tick_rate_hz: config.tick_rate_hz,
            ..RuntimeConfig::default()
        })
        .world(world)
        .cue_assets(cue_assets(content))
        .cue_pool(Arc::clone(&pool) as Arc<dyn CuePoolManager>)
        .build()
        .await?;

    let handle = runtime.handle();
    let collector = spawn_collector(&handle);

    let total_frames = config.total_frames();
    let delta = config.frame_delta();
    let mut steps = schedule(config).into_iter().peekable();
    for frame in 0..total_frames {
        while let Some((_, step)) = steps.next_if(|(at, _)| *at <= frame) {
            perform(&handle, content, &mut cast, frame, step).await?;
        }
        handle.tick(delta).await?;
    }

    let snapshot = handle.snapshot().await?;
    drop(handle);
    runtime.shutdown().await?;

    let events = collector.await.context("event collector panicked")?;
    let stats = pool.stats().await;
    tracing::info!(frames = total_frames, casts = cast.records.len(), "scenario finished");

    Ok(Summary {
        frames: total_frames,
        actors: cast.actors,
        casts: cast.records,
        events,
        cue_pool: CuePoolSummary {
            live: stats.live,
            created: stats.created,
            reused: stats.reused,
        },
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use gas_content::ContentFactory;

    use super::*;

    #[test]
    fn schedule_is_ordered_and_spans_the_run() {
        let config = SimConfig {
            tick_rate_hz: 10,
            duration_secs: 4.0,
            ..SimConfig::default()
        };
        let steps = schedule(&config);
        assert!(steps.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert_eq!(steps.first().map(|(frame, _)| *frame), Some(0));
        // Fireballs at 2s and 3s on top of the four opening steps.
        assert_eq!(steps.len(), 6);
    }

    #[tokio::test]
    async fn bundled_scenario_runs_to_completion() {
        let content = ContentFactory::bundled().load().expect("bundled content");
        let config = SimConfig {
            tick_rate_hz: 10,
            duration_secs: 4.0,
            ..SimConfig::default()
        };

        let summary = run(&config, &content).await.expect("scenario");

        assert_eq!(summary.frames, 40);
        assert_eq!(summary.snapshot.frame, 40);
        assert_eq!(summary.actors.len(), 4);
        assert_eq!(summary.casts[0].outcome, "activated");
        assert!(summary.events.get("Ability").is_some_and(|count| *count > 0));
        assert!(summary.cue_pool.created > 0);
        assert_eq!(summary.cue_pool.live, 0);

        let mage = summary.actors["Mage"];
        let mage_state = summary.snapshot.actor(mage).expect("mage");
        let effects = &mage_state.abilities_state.as_ref().expect("asc").effects;
        assert!(effects.iter().all(|effect| effect.name != POISON_EFFECT));
        assert!(effects.iter().any(|effect| effect.name == "GE_ManaRegen"));
    }
}
