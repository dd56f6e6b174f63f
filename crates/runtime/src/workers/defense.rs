//! Defense worker that owns the [`DefenseManager`].
//!
//! Ticks on a fixed interval, answers handle commands between ticks and
//! publishes every reaction that did something to the event bus.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinError;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use defense::{DefenseManager, Reaction, SoulEvasion, SoulOutcome};

use crate::events::{DefenseEvent, Event, EventBus};

/// Commands that can be sent to the defense worker
pub enum Command {
    /// Run one defense tick now.
    Evaluate { reply: oneshot::Sender<Reaction> },
    /// Run one soul-evasion step now.
    SoulStep { reply: oneshot::Sender<SoulOutcome> },
    PrepareBuff { reply: oneshot::Sender<bool> },
    QueryStats { reply: oneshot::Sender<DefenseStats> },
}

/// Counters maintained by the worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefenseStats {
    pub ticks: u64,
    /// Reactions that sent a command to the client.
    pub reactions: u64,
    pub cooldown_skips: u64,
    pub failures: u64,
    pub soul_engagements: u64,
}

/// Synchronous defense state. Its methods poll and sleep on the game
/// client, so they only ever run on the blocking pool.
struct Engine {
    manager: DefenseManager,
    souls: Option<SoulEvasion>,
}

impl Engine {
    /// Soul step with the HP sample the policy would otherwise have taken.
    fn soul_step(&self) -> SoulOutcome {
        let Some(souls) = self.souls.as_ref() else {
            return SoulOutcome::NoSouls;
        };
        let outcome = souls.step();
        if outcome != SoulOutcome::NoSouls {
            self.manager.record_hp();
        }
        outcome
    }
}

pub struct DefenseWorker {
    engine: Arc<Mutex<Engine>>,
    souls_enabled: bool,
    tick_interval: Duration,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: watch::Receiver<bool>,
    event_bus: EventBus,
    stats: DefenseStats,
}

impl DefenseWorker {
    pub fn new(
        manager: DefenseManager,
        souls: Option<SoulEvasion>,
        tick_interval: Duration,
        command_rx: mpsc::Receiver<Command>,
        shutdown_rx: watch::Receiver<bool>,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            tick_ms = tick_interval.as_millis() as u64,
            souls = souls.is_some(),
            "DefenseWorker initialized"
        );

        Self {
            souls_enabled: souls.is_some(),
            engine: Arc::new(Mutex::new(Engine { manager, souls })),
            tick_interval,
            command_rx,
            shutdown_rx,
            event_bus,
            stats: DefenseStats::default(),
        }
    }

    /// Main worker loop. Returns once shutdown is signalled.
    pub async fn run(mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                Some(cmd) = self.command_rx.recv() => self.handle_command(cmd).await,
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(ticks = self.stats.ticks, reactions = self.stats.reactions, "DefenseWorker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Evaluate { reply } => {
                let Some(reaction) = self.evaluate().await else {
                    return;
                };
                if reply.send(reaction).is_err() {
                    debug!("Evaluate reply channel closed (caller dropped)");
                }
            }
            Command::SoulStep { reply } => {
                let Some(outcome) = self.soul_step().await else {
                    return;
                };
                if reply.send(outcome).is_err() {
                    debug!("SoulStep reply channel closed (caller dropped)");
                }
            }
            Command::PrepareBuff { reply } => {
                let prepared = self
                    .run_blocking(|engine| engine.manager.prepare_buff_position())
                    .await;
                let Some(prepared) = self.joined(prepared) else {
                    return;
                };
                if reply.send(prepared).is_err() {
                    debug!("PrepareBuff reply channel closed (caller dropped)");
                }
            }
            Command::QueryStats { reply } => {
                if reply.send(self.stats).is_err() {
                    debug!("QueryStats reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Soul evasion takes precedence over the reaction policy while souls
    /// are present. Either way the tick feeds the HP history.
    async fn tick(&mut self) {
        if self.souls_enabled {
            match self.soul_step().await {
                Some(SoulOutcome::NoSouls) => {}
                Some(_) => {
                    self.stats.ticks += 1;
                    return;
                }
                None => return,
            }
        }
        self.evaluate().await;
    }

    async fn evaluate(&mut self) -> Option<Reaction> {
        let reaction = self.run_blocking(|engine| engine.manager.evaluate()).await;
        let reaction = self.joined(reaction)?;
        self.stats.ticks += 1;

        match reaction {
            Reaction::Idle => return Some(reaction),
            Reaction::CoolingDown(_) => self.stats.cooldown_skips += 1,
            Reaction::Failed { .. } => {
                self.stats.reactions += 1;
                self.stats.failures += 1;
            }
            _ => self.stats.reactions += 1,
        }

        self.event_bus.publish(Event::Defense(DefenseEvent::Reaction {
            tick: self.stats.ticks,
            reaction,
        }));
        Some(reaction)
    }

    async fn soul_step(&mut self) -> Option<SoulOutcome> {
        let outcome = self.run_blocking(|engine| engine.soul_step()).await;
        let outcome = self.joined(outcome)?;

        match outcome {
            SoulOutcome::NoSouls => return Some(outcome),
            SoulOutcome::Engaged(_) => self.stats.soul_engagements += 1,
            SoulOutcome::Failed(_) => self.stats.failures += 1,
        }

        self.event_bus.publish(Event::Defense(DefenseEvent::Souls {
            tick: self.stats.ticks,
            outcome,
        }));
        Some(outcome)
    }

    /// Runs `f` on the blocking pool so client polling never stalls the
    /// executor.
    async fn run_blocking<R, F>(&self, f: F) -> Result<R, JoinError>
    where
        F: FnOnce(&mut Engine) -> R + Send + 'static,
        R: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut engine)
        })
        .await
    }

    fn joined<R>(&self, result: Result<R, JoinError>) -> Option<R> {
        result
            .inspect_err(|error| tracing::error!(%error, "defense task failed"))
            .ok()
    }
}
