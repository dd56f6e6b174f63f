//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides the channel plumbing: every request is an mpsc
//! command carrying a oneshot reply.
use tokio::sync::{broadcast, mpsc, oneshot};

use defense::{Reaction, SoulOutcome};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, DefenseStats};

#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Runs one defense tick immediately instead of waiting for the interval.
    pub async fn evaluate_now(&self) -> Result<Reaction> {
        self.request(|reply| Command::Evaluate { reply }).await
    }

    /// Runs one soul-evasion step immediately.
    pub async fn soul_step(&self) -> Result<SoulOutcome> {
        self.request(|reply| Command::SoulStep { reply }).await
    }

    /// Moves away from nearby monsters before buffing; true when safe to buff.
    pub async fn prepare_buff_position(&self) -> Result<bool> {
        self.request(|reply| Command::PrepareBuff { reply }).await
    }

    pub async fn stats(&self) -> Result<DefenseStats> {
        self.request(|reply| Command::QueryStats { reply }).await
    }

    /// Subscribe to events from a specific topic.
    ///
    /// - `Topic::Defense` - reactions and soul outcomes
    /// - `Topic::Emergency` - HP damage spikes
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
