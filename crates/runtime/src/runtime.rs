//! High-level runtime orchestrator.
//!
//! The runtime owns the background workers, wires up the command, event and
//! shutdown channels, and exposes a builder-based API.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use defense::config::read_env;
use defense::{DefenseConfig, DefenseManager, EmergencyMonitor, SoulEvasion};
use game_core::BotEnv;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, DefenseWorker, EmergencyWatcher};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub tick_interval_ms: u64,
    pub emergency_poll_ms: u64,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Run soul evasion before the reaction policy on every tick.
    pub souls_enabled: bool,
    pub defense: DefenseConfig,
}

impl RuntimeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn emergency_poll(&self) -> Duration {
        Duration::from_millis(self.emergency_poll_ms)
    }

    /// Default configuration with overrides from process environment variables.
    ///
    /// Environment variables:
    /// - `RUNTIME_TICK_MS` - Defense tick interval (default: 200)
    /// - `RUNTIME_EMERGENCY_POLL_MS` - Spike watcher interval (default: 100)
    /// - `RUNTIME_EVENT_BUFFER` - Broadcast capacity per topic (default: 100)
    /// - `SOULS_ENABLED` - Run soul evasion each tick (default: false)
    ///
    /// plus every `DEFENSE_*` variable read by [`DefenseConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            defense: DefenseConfig::from_env(),
            ..Self::default()
        };

        if let Some(ms) = read_env::<u64>("RUNTIME_TICK_MS") {
            config.tick_interval_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("RUNTIME_EMERGENCY_POLL_MS") {
            config.emergency_poll_ms = ms;
        }
        if let Some(size) = read_env::<usize>("RUNTIME_EVENT_BUFFER") {
            config.event_buffer_size = size;
        }
        if let Some(enabled) = read_env::<bool>("SOULS_ENABLED") {
            config.souls_enabled = enabled;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(RuntimeError::NonPositive("tick_interval_ms"));
        }
        if self.emergency_poll_ms == 0 {
            return Err(RuntimeError::NonPositive("emergency_poll_ms"));
        }
        if self.command_buffer_size == 0 {
            return Err(RuntimeError::NonPositive("command_buffer_size"));
        }
        self.defense.validate()?;
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            emergency_poll_ms: 100,
            event_buffer_size: 100,
            command_buffer_size: 32,
            souls_enabled: false,
            defense: DefenseConfig::default(),
        }
    }
}

/// Running defense loop.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients; dropping the
/// runtime without [`Runtime::shutdown`] leaves the workers running until
/// the tokio runtime stops.
pub struct Runtime {
    handle: RuntimeHandle,
    monitor: Arc<EmergencyMonitor>,
    shutdown_tx: watch::Sender<bool>,
    defense_worker: JoinHandle<()>,
    emergency_worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder(env: BotEnv) -> RuntimeBuilder {
        RuntimeBuilder::new(env)
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shared HP history the emergency watcher reads.
    pub fn monitor(&self) -> Arc<EmergencyMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Signals both workers and waits for them to finish.
    pub async fn shutdown(self) -> Result<()> {
        // Receivers only go away when the workers already stopped.
        let _ = self.shutdown_tx.send(true);

        self.defense_worker.await.map_err(RuntimeError::WorkerJoin)?;
        self.emergency_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        tracing::info!("runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    env: BotEnv,
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    fn new(env: BotEnv) -> Self {
        Self {
            env,
            config: RuntimeConfig::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn souls_enabled(mut self, enabled: bool) -> Self {
        self.config.souls_enabled = enabled;
        self
    }

    /// Validates the configuration and spawns the workers.
    pub async fn build(self) -> Result<Runtime> {
        self.config.validate()?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let manager = DefenseManager::new(self.env.clone(), self.config.defense.clone());
        let monitor = manager.monitor();
        let souls = self
            .config
            .souls_enabled
            .then(|| SoulEvasion::new(self.env.clone(), self.config.defense.nova.clone()));

        let defense_worker = DefenseWorker::new(
            manager,
            souls,
            self.config.tick_interval(),
            command_rx,
            shutdown_rx.clone(),
            event_bus.clone(),
        );
        let defense_worker = tokio::spawn(async move {
            defense_worker.run().await;
        });

        let watcher = EmergencyWatcher::new(
            Arc::clone(&monitor),
            self.config.emergency_poll(),
            shutdown_rx,
            event_bus.clone(),
        );
        let emergency_worker = tokio::spawn(async move {
            watcher.run().await;
        });

        tracing::info!(
            tick_ms = self.config.tick_interval_ms,
            souls = self.config.souls_enabled,
            "runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            monitor,
            shutdown_tx,
            defense_worker,
            emergency_worker,
        })
    }
}
