//! Cue presentation worker and the channel sink that feeds it.

use std::collections::HashMap;
use std::sync::Arc;

use gas_core::{ActorId, CueDispatcher, CueError, GameplayCueEvent, GameplayCueNotify, GameplayTag};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};
use vek::{Quaternion, Vec3};

use crate::cue::{CueAssetRegistry, CueInstance, CuePoolManager};
use crate::events::{CuePresentationEvent, Event, EventBus};

/// [`CueDispatcher`] that forwards notifications to a [`CueWorker`].
///
/// Never blocks: a full channel drops the cue and reports `SinkFull`.
#[derive(Debug, Clone)]
pub struct ChannelCueDispatcher {
    tx: mpsc::Sender<GameplayCueNotify>,
}

impl ChannelCueDispatcher {
    pub fn new(tx: mpsc::Sender<GameplayCueNotify>) -> Self {
        Self { tx }
    }
}

impl CueDispatcher for ChannelCueDispatcher {
    fn dispatch(&self, notify: GameplayCueNotify) -> Result<(), CueError> {
        self.tx.try_send(notify).map_err(|err| match err {
            TrySendError::Full(_) => CueError::SinkFull,
            TrySendError::Closed(_) => CueError::SinkClosed,
        })
    }
}

/// Presents cues through a [`CuePoolManager`].
///
/// `OnActive` acquires an instance that lives until the matching `Removed`;
/// `Executed` is a burst that is released right after acquisition.
pub struct CueWorker {
    cue_rx: mpsc::Receiver<GameplayCueNotify>,
    assets: CueAssetRegistry,
    pool: Arc<dyn CuePoolManager>,
    event_bus: EventBus,
    persistent: HashMap<(ActorId, GameplayTag), Vec<CueInstance>>,
}

impl CueWorker {
    pub fn new(
        cue_rx: mpsc::Receiver<GameplayCueNotify>,
        assets: CueAssetRegistry,
        pool: Arc<dyn CuePoolManager>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            cue_rx,
            assets,
            pool,
            event_bus,
            persistent: HashMap::new(),
        }
    }

    /// Runs until the dispatcher side is dropped, then releases every
    /// persistent instance.
    pub async fn run(mut self) {
        while let Some(notify) = self.cue_rx.recv().await {
            self.present(notify).await;
        }

        let remaining: Vec<CueInstance> = self.persistent.drain().flat_map(|(_, instances)| instances).collect();
        for instance in remaining {
            self.pool.release(instance).await;
        }
        debug!("CueWorker stopped");
    }

    async fn present(&mut self, notify: GameplayCueNotify) {
        let tag = notify.tag;
        let key = (notify.params.target, tag);

        match notify.event {
            GameplayCueEvent::WhileActive => {
                trace!(cue = %tag, "WhileActive folded into OnActive");
            }
            GameplayCueEvent::OnActive => {
                if let Some(instance) = self.acquire(&notify).await {
                    self.persistent.entry(key).or_default().push(instance);
                }
            }
            GameplayCueEvent::Executed => {
                if let Some(instance) = self.acquire(&notify).await {
                    self.release(tag, instance).await;
                }
            }
            GameplayCueEvent::Removed => {
                let instance = self.persistent.get_mut(&key).and_then(Vec::pop);
                if self.persistent.get(&key).is_some_and(Vec::is_empty) {
                    self.persistent.remove(&key);
                }
                match instance {
                    Some(instance) => self.release(tag, instance).await,
                    None => debug!(cue = %tag, target = %key.0, "Removed without a live instance"),
                }
            }
        }
    }

    async fn acquire(&self, notify: &GameplayCueNotify) -> Option<CueInstance> {
        let result = match self.assets.resolve(notify.tag) {
            Ok(asset) => {
                let position = notify.params.location.unwrap_or_else(Vec3::zero);
                self.pool.get(asset, position, Quaternion::identity()).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(instance) => {
                self.event_bus.publish(Event::CuePresentation(CuePresentationEvent::Spawned {
                    tag: notify.tag,
                    event: notify.event,
                    asset: instance.asset.clone(),
                    instance: instance.id,
                }));
                Some(instance)
            }
            Err(err) => {
                warn!(cue = %notify.tag, event = %notify.event, %err, "cue presentation failed");
                self.event_bus.publish(Event::CuePresentation(CuePresentationEvent::Failed {
                    tag: notify.tag,
                    event: notify.event,
                    error: err.to_string(),
                }));
                None
            }
        }
    }

    async fn release(&self, tag: GameplayTag, instance: CueInstance) {
        let id = instance.id;
        self.pool.release(instance).await;
        self.event_bus
            .publish(Event::CuePresentation(CuePresentationEvent::Released { tag, instance: id }));
    }
}
