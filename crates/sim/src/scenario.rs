//! Scripted encounters replayed against a [`MockWorld`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tokio::sync::broadcast;

use defense::geometry::any_living_within;
use game_core::mock::{self, ManualClock, MockWorld};
use game_core::{GameView, Monster, MonsterFlags, PotionKind, Position, UnitId};
use runtime::{DefenseStats, Event, Runtime, RuntimeConfig, Topic};

/// Real time granted to the emergency watcher after each simulated tick.
const WATCHER_GRACE: Duration = Duration::from_millis(15);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Standing in a pack while it chews through HP
    Stationary,
    /// Hitting an immune target
    Ineffective,
    /// Baal throne soul waves
    Souls,
    /// Sudden burst damage down to low HP
    Spike,
    /// Clearing space before a buff sequence
    Buff,
}

pub struct Report {
    scenario: Scenario,
    ticks: u32,
    stats: DefenseStats,
    events: Vec<Event>,
    final_position: Position,
    final_hp: i32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {:?} ({} ticks)", self.scenario, self.ticks)?;
        writeln!(
            f,
            "reactions: {}, cooldown skips: {}, failures: {}, soul engagements: {}",
            self.stats.reactions,
            self.stats.cooldown_skips,
            self.stats.failures,
            self.stats.soul_engagements
        )?;
        writeln!(f, "final: {} at {}% hp", self.final_position, self.final_hp)?;
        for event in &self.events {
            writeln!(f, "  {event:?}")?;
        }
        Ok(())
    }
}

pub async fn run(scenario: Scenario, ticks: u32, tick_ms: u64) -> Result<Report> {
    let world = Arc::new(setup(scenario));
    let clock = ManualClock::new();

    let mut config = RuntimeConfig::from_env();
    // Ticks are driven explicitly so simulated time stays deterministic.
    config.tick_interval_ms = u64::from(u32::MAX);
    config.emergency_poll_ms = 5;
    config.souls_enabled = scenario == Scenario::Souls;

    let runtime = Runtime::builder(mock::env(&world, &clock))
        .config(config)
        .build()
        .await
        .context("starting defense runtime")?;
    let handle = runtime.handle();
    let mut defense_rx = handle.subscribe(Topic::Defense);
    let mut emergency_rx = handle.subscribe(Topic::Emergency);

    tracing::info!(?scenario, ticks, tick_ms, "scenario started");

    if scenario == Scenario::Buff {
        let safe = handle.prepare_buff_position().await?;
        tracing::info!(safe, position = %world.player_position(), "buff position prepared");
    }

    for tick in 0..ticks {
        script(scenario, &world, tick);
        if scenario == Scenario::Souls {
            handle.soul_step().await?;
        }
        handle.evaluate_now().await?;

        clock.advance(Duration::from_millis(tick_ms));
        tokio::time::sleep(WATCHER_GRACE).await;
    }

    let mut events = drain(&mut defense_rx);
    events.extend(drain(&mut emergency_rx));
    let stats = handle.stats().await?;
    runtime.shutdown().await?;

    Ok(Report {
        scenario,
        ticks,
        stats,
        events,
        final_position: world.player_position(),
        final_hp: world.hp_percent(),
    })
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event receiver lagged");
            }
            Err(_) => break,
        }
    }
    events
}

fn pack(center: Position, count: u32, flags: MonsterFlags, first_id: u32) -> Vec<Monster> {
    const OFFSETS: [(i32, i32); 6] = [(0, 0), (2, 1), (-2, -1), (1, -2), (-1, 2), (3, -1)];
    OFFSETS
        .iter()
        .cycle()
        .take(count as usize)
        .enumerate()
        .map(|(i, (dx, dy))| {
            Monster::new(UnitId(first_id + i as u32), center.offset(*dx, *dy), 200)
                .with_flags(flags)
        })
        .collect()
}

fn setup(scenario: Scenario) -> MockWorld {
    match scenario {
        Scenario::Stationary => {
            let world = MockWorld::new(Position::new(50, 50)).with_teleport(true);
            world.set_monsters(pack(Position::new(47, 50), 3, MonsterFlags::empty(), 1));
            world
        }
        Scenario::Ineffective => {
            let world = MockWorld::new(Position::new(20, 10)).with_leveling_range(6);
            world.set_monsters(vec![Monster::new(UnitId(1), Position::new(16, 10), 5000)]);
            world
        }
        Scenario::Souls => MockWorld::new(Position::new(140, 140)).with_teleport(true),
        Scenario::Spike => {
            let world = MockWorld::new(Position::new(30, 30));
            world.set_monsters(vec![Monster::new(UnitId(1), Position::new(32, 30), 800)
                .with_flags(MonsterFlags::UNIQUE)]);
            world.add_potions(PotionKind::Rejuvenation, 2);
            world
        }
        Scenario::Buff => {
            let world = MockWorld::new(Position::new(50, 50));
            world.set_monsters(pack(Position::new(46, 50), 4, MonsterFlags::empty(), 1));
            world
        }
    }
}

/// Mutates the world before tick `tick` is evaluated.
fn script(scenario: Scenario, world: &MockWorld, tick: u32) {
    let hp = world.hp_percent();
    match scenario {
        Scenario::Stationary => {
            let player = world.player_position();
            let next = if any_living_within(player, &world.living_monsters(), 6) {
                hp - 4
            } else {
                hp + 2
            };
            world.set_hp(next.clamp(0, 100));
        }
        Scenario::Souls => match tick {
            0 => world.set_monsters(pack(Position::new(100, 100), 6, MonsterFlags::SOUL, 1)),
            10 => world.set_monsters(pack(Position::new(130, 90), 4, MonsterFlags::SOUL, 100)),
            _ => {}
        },
        Scenario::Spike => {
            let next = match tick {
                0..5 => 90,
                5 => 65,
                6 => 40,
                _ => hp - 3,
            };
            world.set_hp(next.clamp(0, 100));
        }
        Scenario::Ineffective | Scenario::Buff => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stationary_scenario_teleports_out() {
        let report = run(Scenario::Stationary, 12, 250).await.unwrap();
        assert!(report.stats.reactions >= 1);
        assert!(
            !any_living_within(
                report.final_position,
                &pack(Position::new(47, 50), 3, MonsterFlags::empty(), 1),
                6
            ),
            "still in the pack at {}",
            report.final_position
        );
    }

    #[tokio::test]
    async fn souls_scenario_clears_both_waves() {
        let report = run(Scenario::Souls, 12, 250).await.unwrap();
        assert_eq!(report.stats.soul_engagements, 2);
    }
}
