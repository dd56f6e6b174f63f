//! Soul handling for the Baal throne waves.
//!
//! Souls fire lightning that kills in a few hits, so each step picks a Nova
//! tile under the search budget, gets there as fast as the character can and
//! clears the area around it with a soul-only filter.
use std::time::Duration;

use game_core::{
    ActionError, BotEnv, MonsterFilter, MonsterFlags, Position, PollTimeout, poll_until,
};

use crate::config::NovaConfig;
use crate::search::{NovaPlacement, NovaSearch};

const ARRIVAL_POLL_INTERVAL: Duration = Duration::from_millis(50);
const ARRIVAL_TOLERANCE: i32 = 2;
const PATH_STEP_DELAY: Duration = Duration::from_millis(100);

/// Result of one [`SoulEvasion::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoulOutcome {
    NoSouls,
    /// Reached the placement and cleared around it.
    Engaged(NovaPlacement),
    /// Travel or clearing failed; the next step searches again.
    Failed(NovaPlacement),
}

#[derive(Debug, thiserror::Error)]
enum TravelError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("did not arrive: {0}")]
    Arrival(#[from] PollTimeout),
}

#[derive(Debug)]
pub struct SoulEvasion {
    env: BotEnv,
    config: NovaConfig,
    arrival_timeout: Duration,
}

impl SoulEvasion {
    pub fn new(env: BotEnv, config: NovaConfig) -> Self {
        Self {
            env,
            config,
            arrival_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_arrival_timeout(mut self, timeout: Duration) -> Self {
        self.arrival_timeout = timeout;
        self
    }

    pub fn step(&self) -> SoulOutcome {
        let game = self.env.game();
        game.refresh();
        let player = game.player_position();
        let souls: Vec<Position> = game
            .living_monsters()
            .iter()
            .filter(|monster| monster.is_soul())
            .map(|monster| monster.position)
            .collect();

        let search = NovaSearch::new(game, self.env.clock(), &self.config);
        let Some(placement) = search.find_best_nova_position(player, &souls) else {
            return SoulOutcome::NoSouls;
        };
        tracing::debug!(
            souls = souls.len(),
            to = %placement.position,
            hits = placement.hits,
            timed_out = placement.timed_out,
            "nova placement chosen"
        );

        if placement.position != player {
            if let Err(error) = self.travel(placement.position) {
                tracing::warn!(%error, to = %placement.position, "failed to reach nova position");
                return SoulOutcome::Failed(placement);
            }
        }

        let cleared = self.env.actions().clear_area(
            placement.position,
            self.config.nova_radius,
            MonsterFilter::Flags(MonsterFlags::SOUL),
        );
        match cleared {
            Ok(()) => SoulOutcome::Engaged(placement),
            Err(error) => {
                tracing::warn!(%error, "clearing souls failed");
                SoulOutcome::Failed(placement)
            }
        }
    }

    fn travel(&self, to: Position) -> Result<(), TravelError> {
        if self.env.character().can_teleport() {
            self.env.actions().teleport_to(to)?;
        } else {
            let paths = self.env.paths();
            let path = paths
                .path_ignoring_monsters(to)
                .ok_or(ActionError::NoPath { to })?;
            paths.move_through_path(&path, PATH_STEP_DELAY)?;
        }

        let game = self.env.game();
        poll_until(
            self.env.clock(),
            self.arrival_timeout,
            ARRIVAL_POLL_INTERVAL,
            || {
                game.refresh();
                game.player_position().within(to, ARRIVAL_TOLERANCE).then_some(())
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use game_core::mock::{self, Command, ManualClock, MockWorld};
    use game_core::{GameView, Monster, UnitId};

    use super::*;

    fn souls_around(center: Position) -> Vec<Monster> {
        [(0, 0), (2, 1), (-2, -1), (1, -2), (-1, 2)]
            .into_iter()
            .enumerate()
            .map(|(i, (dx, dy))| {
                Monster::new(UnitId(i as u32 + 1), center.offset(dx, dy), 40)
                    .with_flags(MonsterFlags::SOUL)
            })
            .collect()
    }

    fn evasion(world: &Arc<MockWorld>) -> SoulEvasion {
        SoulEvasion::new(mock::env(world, &ManualClock::new()), NovaConfig::default())
    }

    #[test]
    fn walks_to_cluster_and_clears_it() {
        let world = Arc::new(MockWorld::new(Position::new(140, 140)));
        world.set_monsters(souls_around(Position::new(100, 100)));

        let outcome = evasion(&world).step();

        let SoulOutcome::Engaged(placement) = outcome else {
            panic!("expected engagement, got {outcome:?}");
        };
        assert_eq!(placement.hits, 5);
        assert_eq!(world.player_position(), placement.position);
        assert!(world.living_monsters().is_empty());
        assert!(matches!(world.commands()[0], Command::FollowPath(_)));
    }

    #[test]
    fn teleports_when_available() {
        let world = Arc::new(MockWorld::new(Position::new(140, 140)).with_teleport(true));
        world.set_monsters(souls_around(Position::new(100, 100)));

        evasion(&world).step();

        assert_eq!(world.commands()[0], Command::Teleport(Position::new(100, 100)));
    }

    #[test]
    fn stays_put_when_already_in_range() {
        let world = Arc::new(MockWorld::new(Position::new(100, 100)));
        world.set_monsters(souls_around(Position::new(100, 100)));

        let outcome = evasion(&world).step();

        assert!(matches!(outcome, SoulOutcome::Engaged(p) if p.position == Position::new(100, 100)));
        assert!(matches!(world.commands().as_slice(), [Command::ClearArea { .. }]));
    }

    #[test]
    fn ignores_non_soul_monsters() {
        let world = Arc::new(MockWorld::new(Position::ORIGIN));
        world.set_monsters(vec![Monster::new(UnitId(1), Position::new(3, 3), 100)]);

        assert_eq!(evasion(&world).step(), SoulOutcome::NoSouls);
        assert!(world.commands().is_empty());
    }

    #[test]
    fn unreachable_placement_fails_without_clearing() {
        let world = Arc::new(MockWorld::new(Position::new(140, 140)));
        world.set_monsters(souls_around(Position::new(100, 100)));
        world.mark_unreachable([Position::new(100, 100)]);

        let outcome = evasion(&world).step();

        assert!(matches!(outcome, SoulOutcome::Failed(_)));
        assert_eq!(world.living_monsters().len(), 5);
    }
}
