//! Fixed-rate frame driver.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::simulation::Command;
use crate::events::{Event, EventBus, FrameEvent};

/// Sends a `Tick` to the simulation worker at a fixed rate and publishes a
/// [`FrameEvent`] for each one.
pub struct FrameDriver {
    period: Duration,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    shutdown_rx: watch::Receiver<bool>,
}

impl FrameDriver {
    pub fn new(
        period: Duration,
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            period,
            command_tx,
            event_bus,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        let delta = self.period.as_secs_f32();
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
                    let tick = Command::Tick { delta, reply: Some(reply_tx) };
                    if self.command_tx.send(tick).await.is_err() {
                        break;
                    }
                    match reply_rx.await {
                        Ok(frame) => self.event_bus.publish(Event::Frame(FrameEvent { frame, delta })),
                        Err(_) => break,
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("FrameDriver stopped");
    }
}
