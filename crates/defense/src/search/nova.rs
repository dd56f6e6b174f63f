use game_core::{Clock, GameView, Position};

use crate::config::NovaConfig;
use crate::geometry::{centroid, count_within};

/// Result of a Nova placement search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NovaPlacement {
    pub position: Position,
    /// Souls inside the Nova radius at `position`.
    pub hits: usize,
    /// The wall-clock budget ran out before the scan finished.
    pub timed_out: bool,
}

/// Time-budgeted search for a tile where a Nova hits as many souls as possible.
///
/// Soul lightning kills in a few hits, so a fast mediocre answer beats a slow
/// optimal one: the scan walks outward from the soul centroid, stops as soon
/// as a tile is good enough, and stops unconditionally at the deadline.
pub struct NovaSearch<'a> {
    game: &'a dyn GameView,
    clock: &'a dyn Clock,
    config: &'a NovaConfig,
}

impl<'a> NovaSearch<'a> {
    pub fn new(game: &'a dyn GameView, clock: &'a dyn Clock, config: &'a NovaConfig) -> Self {
        Self {
            game,
            clock,
            config,
        }
    }

    /// Returns `None` only when `souls` is empty.
    pub fn find_best_nova_position(
        &self,
        player: Position,
        souls: &[Position],
    ) -> Option<NovaPlacement> {
        let radius = self.config.nova_radius;

        let hits_here = count_within(player, souls, radius);
        if hits_here >= self.config.min_hits {
            return Some(NovaPlacement {
                position: player,
                hits: hits_here,
                timed_out: false,
            });
        }

        let center = centroid(souls.iter().copied())?;
        let good_enough = souls.len().min(self.config.good_enough_cap);
        let deadline = self.clock.now() + self.config.budget();

        let mut best: Option<(Position, usize)> = None;
        let mut timed_out = false;
        let mut evaluated = 0usize;

        for position in spiral(center, self.config.search_radius, self.config.grid_step) {
            if self.clock.now() >= deadline {
                timed_out = true;
                break;
            }
            evaluated += 1;
            if !self.game.is_walkable(position) {
                continue;
            }
            let hits = count_within(position, souls, radius);
            if hits > best.map_or(0, |(_, best_hits)| best_hits) {
                best = Some((position, hits));
                if hits >= good_enough {
                    break;
                }
            }
        }

        tracing::debug!(
            souls = souls.len(),
            evaluated,
            timed_out,
            best = ?best,
            "nova placement scan finished"
        );

        let (position, hits) =
            best.unwrap_or_else(|| (center, count_within(center, souls, radius)));
        Some(NovaPlacement {
            position,
            hits,
            timed_out,
        })
    }
}

/// Grid tiles around `center`, ring by ring outward, `center` first.
fn spiral(center: Position, search_radius: i32, step: i32) -> impl Iterator<Item = Position> {
    let step = step.max(1);
    let rings = search_radius.max(0) / step;
    (0..=rings).flat_map(move |k| {
        let edge: Vec<(i32, i32)> = if k == 0 {
            vec![(0, 0)]
        } else {
            let horizontal = (-k..=k).flat_map(move |dx| [(dx, -k), (dx, k)]);
            let vertical = (-k + 1..k).flat_map(move |dy| [(-k, dy), (k, dy)]);
            horizontal.chain(vertical).collect()
        };
        edge.into_iter()
            .map(move |(dx, dy)| center.offset(dx * step, dy * step))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use game_core::SystemClock;
    use game_core::mock::{ManualClock, MockWorld};

    use super::*;

    /// Advances one millisecond every time it is read.
    struct TickingClock(Mutex<Instant>);

    impl Clock for TickingClock {
        fn now(&self) -> Instant {
            let mut now = self.0.lock().unwrap();
            *now += Duration::from_millis(1);
            *now
        }

        fn sleep(&self, duration: Duration) {
            *self.0.lock().unwrap() += duration;
        }
    }

    fn cluster() -> Vec<Position> {
        vec![
            Position::new(100, 100),
            Position::new(102, 101),
            Position::new(98, 99),
            Position::new(101, 98),
            Position::new(99, 102),
        ]
    }

    #[test]
    fn stays_put_when_already_hitting_two() {
        let world = MockWorld::new(Position::new(100, 100));
        let clock = ManualClock::new();
        let config = NovaConfig::default();
        let search = NovaSearch::new(&world, &clock, &config);

        let placement = search
            .find_best_nova_position(Position::new(100, 100), &cluster())
            .unwrap();

        assert_eq!(placement.position, Position::new(100, 100));
        assert_eq!(placement.hits, 5);
    }

    #[test]
    fn clustered_souls_are_all_hit_from_centroid() {
        let world = MockWorld::new(Position::new(140, 140));
        let clock = ManualClock::new();
        let config = NovaConfig::default();
        let search = NovaSearch::new(&world, &clock, &config);

        let placement = search
            .find_best_nova_position(Position::new(140, 140), &cluster())
            .unwrap();

        assert_eq!(placement.hits, 5);
        assert_eq!(placement.position, Position::new(100, 100));
        assert!(!placement.timed_out);
    }

    #[test]
    fn blocked_centroid_falls_through_to_neighbors() {
        let world = MockWorld::new(Position::new(140, 140));
        world.block([Position::new(100, 100)]);
        let clock = ManualClock::new();
        let config = NovaConfig::default();
        let search = NovaSearch::new(&world, &clock, &config);

        let placement = search
            .find_best_nova_position(Position::new(140, 140), &cluster())
            .unwrap();

        assert_ne!(placement.position, Position::new(100, 100));
        assert_eq!(placement.hits, 5);
    }

    #[test]
    fn unwalkable_area_falls_back_to_centroid() {
        let world = MockWorld::new(Position::new(0, 0))
            .with_bounds(Position::new(0, 0), Position::new(5, 5));
        let clock = ManualClock::new();
        let config = NovaConfig::default();
        let search = NovaSearch::new(&world, &clock, &config);

        let placement = search
            .find_best_nova_position(Position::new(0, 0), &cluster())
            .unwrap();

        assert_eq!(placement.position, Position::new(100, 100));
        assert!(!placement.timed_out);
    }

    #[test]
    fn empty_soul_list_is_not_found() {
        let world = MockWorld::new(Position::ORIGIN);
        let clock = ManualClock::new();
        let config = NovaConfig::default();
        let search = NovaSearch::new(&world, &clock, &config);

        assert_eq!(search.find_best_nova_position(Position::ORIGIN, &[]), None);
    }

    #[test]
    fn deadline_bounds_the_scan() {
        // Souls spread so that no tile is ever good enough.
        let souls: Vec<_> = (0..200)
            .map(|i| Position::new((i % 20) * 30, (i / 20) * 30))
            .collect();
        let world = MockWorld::new(Position::new(-500, -500));
        let clock = TickingClock(Mutex::new(Instant::now()));
        let config = NovaConfig {
            search_radius: 200,
            grid_step: 1,
            budget_ms: 10,
            ..NovaConfig::default()
        };
        let search = NovaSearch::new(&world, &clock, &config);

        let placement = search
            .find_best_nova_position(Position::new(-500, -500), &souls)
            .unwrap();

        assert!(placement.timed_out);
    }

    #[test]
    fn wall_clock_budget_holds_for_large_inputs() {
        let souls: Vec<_> = (0..5_000)
            .map(|i| Position::new((i % 100) * 17, (i / 100) * 17))
            .collect();
        let world = MockWorld::new(Position::new(-500, -500));
        let config = NovaConfig {
            search_radius: 400,
            grid_step: 1,
            budget_ms: 20,
            ..NovaConfig::default()
        };
        let search = NovaSearch::new(&world, &SystemClock, &config);

        let started = Instant::now();
        let placement = search.find_best_nova_position(Position::new(-500, -500), &souls);
        let elapsed = started.elapsed();

        assert!(placement.is_some());
        // Budget plus generous slack for one iteration and a slow CI runner.
        assert!(elapsed < Duration::from_millis(20 + 200), "took {elapsed:?}");
    }

    #[test]
    fn spiral_starts_at_center_and_covers_square() {
        let tiles: Vec<_> = spiral(Position::new(0, 0), 4, 2).collect();
        assert_eq!(tiles[0], Position::new(0, 0));
        assert_eq!(tiles.len(), 25);
        assert!(tiles.contains(&Position::new(-4, 4)));
    }
}
