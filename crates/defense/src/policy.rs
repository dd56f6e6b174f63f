//! Reaction policy: turns fired danger signals into exactly one mitigation
//! per tick.
//!
//! Priority order is stationary damage first, ineffective attacks second.
//! Within either, HP at or below the low threshold forces the aggressive
//! branch:
//!
//! ```text
//! rejuvenation potion ─▶ teleport to safe tile ─▶ escape dodge
//! ```
//!
//! Otherwise an ineffective attack repositions to a tile in attack range.
//! Collaborator failures are logged and the tick ends; nothing here returns
//! an error.
use std::sync::Arc;
use std::time::Instant;

use game_core::{BotEnv, Monster, PotionKind, Position};
use strum::Display;

use crate::config::DefenseConfig;
use crate::geometry::{any_living_within, nearest_living};
use crate::search::SafePositionSearch;
use crate::tracker::{EmergencyMonitor, IneffectiveAttackDetector, StationaryDamageDetector};

/// Danger signal that caused a reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    StationaryDamage,
    IneffectiveAttack,
}

/// Outcome of one [`DefenseManager::evaluate`] tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reaction {
    /// No detector fired, or there was nothing worth doing.
    Idle,
    /// A detector fired inside the action cooldown.
    CoolingDown(Trigger),
    Teleported { trigger: Trigger, to: Position },
    Escaped { trigger: Trigger },
    DrankPotion { trigger: Trigger, kind: PotionKind },
    Repositioned { trigger: Trigger, to: Position },
    /// Every option of the chosen branch failed.
    Failed { trigger: Trigger },
}

impl Reaction {
    pub const fn trigger(&self) -> Option<Trigger> {
        match self {
            Self::Idle => None,
            Self::CoolingDown(trigger)
            | Self::Teleported { trigger, .. }
            | Self::Escaped { trigger }
            | Self::DrankPotion { trigger, .. }
            | Self::Repositioned { trigger, .. }
            | Self::Failed { trigger } => Some(*trigger),
        }
    }

    /// True when a command was sent to the game client.
    pub const fn is_attempt(&self) -> bool {
        !matches!(self, Self::Idle | Self::CoolingDown(_))
    }
}

/// Owns the detectors and executes reactions against the injected
/// collaborators.
///
/// Single-owner: [`Self::evaluate`] takes `&mut self` and must be driven from
/// one control loop. Only the [`EmergencyMonitor`] is shared.
#[derive(Debug)]
pub struct DefenseManager {
    env: BotEnv,
    config: DefenseConfig,
    stationary: StationaryDamageDetector,
    ineffective: IneffectiveAttackDetector,
    monitor: Arc<EmergencyMonitor>,
    last_reaction_at: Option<Instant>,
}

impl DefenseManager {
    pub fn new(env: BotEnv, config: DefenseConfig) -> Self {
        let monitor = Arc::new(EmergencyMonitor::new(
            env.clock_handle(),
            config.history.clone(),
        ));
        Self {
            stationary: StationaryDamageDetector::new(&config),
            ineffective: IneffectiveAttackDetector::new(&config),
            monitor,
            last_reaction_at: None,
            env,
            config,
        }
    }

    pub fn config(&self) -> &DefenseConfig {
        &self.config
    }

    /// Shared HP history, fed by every [`Self::evaluate`] call.
    pub fn monitor(&self) -> Arc<EmergencyMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Samples HP into the shared history without running the detectors, for
    /// ticks spent on something other than [`Self::evaluate`].
    pub fn record_hp(&self) -> i32 {
        let game = self.env.game();
        game.refresh();
        let hp = game.hp_percent();
        self.monitor.record(hp);
        hp
    }

    /// Runs one tick: reads the snapshot, feeds the detectors and performs at
    /// most one reaction.
    pub fn evaluate(&mut self) -> Reaction {
        if !self.config.enabled {
            return Reaction::Idle;
        }

        let game = self.env.game();
        game.refresh();
        let position = game.player_position();
        let hp = game.hp_percent();
        let poisoned = game.is_poisoned();
        let monsters = game.living_monsters();
        let now = self.env.clock().now();

        self.monitor.record(hp);

        let trigger = if self
            .stationary
            .is_stationary_and_taking_damage(position, hp, poisoned, now)
        {
            Some(Trigger::StationaryDamage)
        } else if self
            .ineffective
            .is_attacking_ineffectively(position, &monsters, now)
        {
            Some(Trigger::IneffectiveAttack)
        } else {
            None
        };

        let Some(trigger) = trigger else {
            self.stationary.reset_tracking_if_normalized(position, hp);
            return Reaction::Idle;
        };

        if self.cooling_down(now) {
            tracing::debug!(%trigger, "danger detected during action cooldown");
            return Reaction::CoolingDown(trigger);
        }

        let low_hp = hp <= self.config.low_hp_threshold;
        tracing::info!(%trigger, hp, %position, low_hp, "danger detected");

        let reaction = match trigger {
            Trigger::StationaryDamage => self.aggressive(trigger, position, hp, &monsters),
            Trigger::IneffectiveAttack if low_hp => {
                self.aggressive(trigger, position, hp, &monsters)
            }
            Trigger::IneffectiveAttack => self.reposition(trigger, position, &monsters),
        };

        if reaction.is_attempt() {
            self.last_reaction_at = Some(now);
        }
        tracing::info!(?reaction, "defense reaction finished");
        reaction
    }

    /// Moves away from nearby monsters before a buff sequence.
    ///
    /// Returns true when the player is safe to buff: either nothing is within
    /// the danger distance or the move to a buff position succeeded.
    pub fn prepare_buff_position(&self) -> bool {
        let game = self.env.game();
        let position = game.player_position();
        let monsters = game.living_monsters();

        if !any_living_within(position, &monsters, self.config.danger_distance) {
            return true;
        }

        let search = SafePositionSearch::new(&self.env, &self.config.search);
        let Some(candidate) = search.find_safe_position_for_buff(position, &monsters) else {
            tracing::debug!(%position, "no safe buff position found");
            return false;
        };

        let moved = if self.env.character().can_teleport() {
            self.env.actions().teleport_to(candidate.position)
        } else {
            self.env.actions().move_to(candidate.position)
        };
        match moved {
            Ok(()) => {
                tracing::debug!(to = %candidate.position, "moved to buff position");
                true
            }
            Err(error) => {
                tracing::warn!(%error, to = %candidate.position, "failed to reach buff position");
                false
            }
        }
    }

    fn cooling_down(&self, now: Instant) -> bool {
        self.last_reaction_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.config.action_cooldown())
    }

    fn aggressive(
        &self,
        trigger: Trigger,
        position: Position,
        hp: i32,
        monsters: &[Monster],
    ) -> Reaction {
        if hp <= self.config.low_hp_threshold
            && self.env.belt().drink_potion(PotionKind::Rejuvenation, false)
        {
            return Reaction::DrankPotion {
                trigger,
                kind: PotionKind::Rejuvenation,
            };
        }

        if self.env.character().can_teleport() {
            let search = SafePositionSearch::new(&self.env, &self.config.search);
            match search.find_safe_position(position, monsters) {
                Some(candidate) => match self.env.actions().teleport_to(candidate.position) {
                    Ok(()) => {
                        return Reaction::Teleported {
                            trigger,
                            to: candidate.position,
                        };
                    }
                    Err(error) => {
                        tracing::warn!(%error, to = %candidate.position, "teleport to safety failed");
                    }
                },
                None => tracing::debug!(%position, "no safe teleport destination"),
            }
        }

        match self.env.actions().escape() {
            Ok(()) => Reaction::Escaped { trigger },
            Err(error) => {
                tracing::warn!(%error, severity = error.severity().as_str(), "escape failed");
                Reaction::Failed { trigger }
            }
        }
    }

    fn reposition(&self, trigger: Trigger, position: Position, monsters: &[Monster]) -> Reaction {
        let danger = i64::from(self.config.danger_distance).pow(2);
        let Some((target, _)) =
            nearest_living(position, monsters).filter(|(_, distance)| *distance <= danger)
        else {
            tracing::debug!(%position, "no monster close enough to reposition against");
            return Reaction::Idle;
        };

        let attack_range = self
            .env
            .character()
            .leveling()
            .map_or(self.config.attack_range, |leveling| leveling.attack_range());

        let search = SafePositionSearch::new(&self.env, &self.config.search);
        let Some(candidate) = search.find_attack_position(position, target, monsters, attack_range)
        else {
            tracing::debug!(target = %target.id, attack_range, "no attack position found");
            return Reaction::Failed { trigger };
        };

        match self.env.actions().move_to(candidate.position) {
            Ok(()) => Reaction::Repositioned {
                trigger,
                to: candidate.position,
            },
            Err(error) => {
                tracing::warn!(%error, to = %candidate.position, "reposition failed");
                Reaction::Failed { trigger }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_core::mock::{self, Command, ManualClock, MockWorld};
    use game_core::{GameView, Monster, UnitId};

    use super::*;

    fn config() -> DefenseConfig {
        DefenseConfig {
            stationary_threshold_ms: 500,
            damage_threshold_ms: 200,
            ineffective_attack_threshold_ms: 1000,
            action_cooldown_ms: 1000,
            ..DefenseConfig::default()
        }
    }

    fn setup(world: MockWorld) -> (Arc<MockWorld>, ManualClock, DefenseManager) {
        let world = Arc::new(world);
        let clock = ManualClock::new();
        let manager = DefenseManager::new(mock::env(&world, &clock), config());
        (world, clock, manager)
    }

    /// Drives the 0 / 300 / 600 ms stationary scenario and returns the last
    /// reaction.
    fn bleed(world: &MockWorld, clock: &ManualClock, manager: &mut DefenseManager, hps: [i32; 3]) -> Reaction {
        let mut last = Reaction::Idle;
        for (i, hp) in hps.into_iter().enumerate() {
            if i > 0 {
                clock.advance(Duration::from_millis(300));
            }
            world.set_hp(hp);
            last = manager.evaluate();
        }
        last
    }

    #[test]
    fn stationary_damage_teleports_to_safety() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(50, 50)).with_teleport(true));
        world.set_monsters(vec![Monster::new(UnitId(1), Position::new(47, 50), 100)]);

        let reaction = bleed(&world, &clock, &mut manager, [100, 95, 90]);

        let Reaction::Teleported { trigger, to } = reaction else {
            panic!("expected teleport, got {reaction:?}");
        };
        assert_eq!(trigger, Trigger::StationaryDamage);
        assert!(to.distance(Position::new(47, 50)) >= 8.0);
        assert_eq!(world.commands(), vec![Command::Teleport(to)]);
    }

    #[test]
    fn without_teleport_falls_back_to_escape() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(50, 50)));
        world.set_monsters(vec![Monster::new(UnitId(1), Position::new(47, 50), 100)]);

        let reaction = bleed(&world, &clock, &mut manager, [100, 95, 90]);

        assert_eq!(
            reaction,
            Reaction::Escaped {
                trigger: Trigger::StationaryDamage
            }
        );
    }

    #[test]
    fn low_hp_drinks_rejuvenation_first() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(50, 50)).with_teleport(true));
        world.add_potions(PotionKind::Rejuvenation, 1);

        let reaction = bleed(&world, &clock, &mut manager, [40, 35, 30]);

        assert_eq!(
            reaction,
            Reaction::DrankPotion {
                trigger: Trigger::StationaryDamage,
                kind: PotionKind::Rejuvenation,
            }
        );
        assert_eq!(world.hp_percent(), 100);
    }

    #[test]
    fn failed_escape_is_swallowed() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(50, 50)));
        world.fail_commands(true);

        let reaction = bleed(&world, &clock, &mut manager, [100, 95, 90]);

        assert_eq!(
            reaction,
            Reaction::Failed {
                trigger: Trigger::StationaryDamage
            }
        );
    }

    #[test]
    fn cooldown_blocks_back_to_back_reactions() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(50, 50)));
        assert!(bleed(&world, &clock, &mut manager, [100, 95, 90]).is_attempt());

        let reaction = bleed(&world, &clock, &mut manager, [85, 80, 75]);
        assert_eq!(reaction, Reaction::CoolingDown(Trigger::StationaryDamage));
        assert_eq!(world.commands(), vec![Command::Escape]);
    }

    #[test]
    fn ineffective_attack_repositions_within_range() {
        let (world, clock, mut manager) =
            setup(MockWorld::new(Position::new(20, 10)).with_leveling_range(6));
        let target = Monster::new(UnitId(9), Position::new(10, 10), 500);
        world.set_monsters(vec![target]);

        let mut reaction = Reaction::Idle;
        for _ in 0..6 {
            // Alternate positions so the stationary detector never engages.
            let here = world.player_position();
            world.set_player(if here.x == 20 { Position::new(14, 10) } else { Position::new(20, 10) });
            reaction = manager.evaluate();
            if reaction.is_attempt() {
                break;
            }
            clock.advance(Duration::from_millis(250));
        }

        let Reaction::Repositioned { trigger, to } = reaction else {
            panic!("expected reposition, got {reaction:?}");
        };
        assert_eq!(trigger, Trigger::IneffectiveAttack);
        assert!(to.within(target.position, 6));
    }

    #[test]
    fn calm_ticks_stay_idle() {
        let (world, clock, mut manager) = setup(MockWorld::new(Position::new(0, 0)));
        for _ in 0..10 {
            assert_eq!(manager.evaluate(), Reaction::Idle);
            clock.advance(Duration::from_millis(300));
        }
        assert!(world.commands().is_empty());
        assert_eq!(manager.monitor().samples().len(), 10);
    }

    #[test]
    fn recorded_hp_reaches_history_without_reacting() {
        let (world, clock, manager) = setup(MockWorld::new(Position::new(50, 50)));
        world.set_monsters(vec![Monster::new(UnitId(1), Position::new(47, 50), 100)]);

        world.set_hp(80);
        assert_eq!(manager.record_hp(), 80);
        clock.advance(Duration::from_millis(500));
        world.set_hp(60);
        manager.record_hp();

        assert!(manager.monitor().has_damage_spike());
        assert!(world.commands().is_empty());
    }

    #[test]
    fn disabled_manager_does_nothing() {
        let world = Arc::new(MockWorld::new(Position::ORIGIN));
        let clock = ManualClock::new();
        let config = DefenseConfig {
            enabled: false,
            ..config()
        };
        let mut manager = DefenseManager::new(mock::env(&world, &clock), config);

        assert_eq!(manager.evaluate(), Reaction::Idle);
        assert!(manager.monitor().samples().is_empty());
    }

    #[test]
    fn buff_preparation_moves_away_from_pack() {
        let (world, _clock, manager) = setup(MockWorld::new(Position::new(50, 50)));
        world.set_monsters(vec![Monster::new(UnitId(1), Position::new(46, 50), 100)]);

        assert!(manager.prepare_buff_position());
        let here = world.player_position();
        assert!(here.distance(Position::new(46, 50)) >= 15.0);
    }

    #[test]
    fn buff_preparation_is_noop_when_clear() {
        let (world, _clock, manager) = setup(MockWorld::new(Position::new(50, 50)));
        assert!(manager.prepare_buff_position());
        assert!(world.commands().is_empty());
    }
}
