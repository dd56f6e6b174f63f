//! Pure geometry helpers shared by the searches and the detectors.
//!
//! Radius tests use exact squared distances; only the linear scoring in
//! [`crate::search`] converts to Euclidean tiles.

use std::collections::HashSet;

use game_core::{GameView, Monster, Position};

/// Nearest living monster and its squared distance from `from`.
pub fn nearest_living(from: Position, monsters: &[Monster]) -> Option<(&Monster, i64)> {
    monsters
        .iter()
        .filter(|monster| monster.is_alive())
        .map(|monster| (monster, monster.position.distance_squared(from)))
        .min_by_key(|(_, distance)| *distance)
}

/// Euclidean distance from `from` to the nearest living monster.
///
/// Returns `None` when no living monster exists.
pub fn nearest_distance(from: Position, monsters: &[Monster]) -> Option<f64> {
    nearest_living(from, monsters).map(|(_, squared)| (squared as f64).sqrt())
}

/// True when any living monster stands within `radius` tiles of `from`.
pub fn any_living_within(from: Position, monsters: &[Monster], radius: i32) -> bool {
    monsters
        .iter()
        .any(|monster| monster.is_alive() && monster.position.within(from, radius))
}

/// Rounded arithmetic mean of the given positions.
pub fn centroid(positions: impl IntoIterator<Item = Position>) -> Option<Position> {
    let (mut sum_x, mut sum_y, mut count) = (0i64, 0i64, 0i64);
    for position in positions {
        sum_x += i64::from(position.x);
        sum_y += i64::from(position.y);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let x = (sum_x as f64 / count as f64).round() as i32;
    let y = (sum_y as f64 / count as f64).round() as i32;
    Some(Position::new(x, y))
}

/// Number of `targets` within `radius` tiles of `center` (inclusive).
pub fn count_within(center: Position, targets: &[Position], radius: i32) -> usize {
    targets
        .iter()
        .filter(|target| target.within(center, radius))
        .count()
}

/// Tile reached by walking `radius` tiles from `center` at `angle_degrees`.
pub fn point_at(center: Position, angle_degrees: f64, radius: f64) -> Position {
    let radians = angle_degrees.to_radians();
    Position::new(
        center.x + (radians.cos() * radius).round() as i32,
        center.y + (radians.sin() * radius).round() as i32,
    )
}

/// Direction in degrees pointing from `threat` through `from`.
pub fn escape_heading(threat: Position, from: Position) -> f64 {
    let dx = f64::from(from.x - threat.x);
    let dy = f64::from(from.y - threat.y);
    if dx == 0.0 && dy == 0.0 {
        0.0
    } else {
        dy.atan2(dx).to_degrees()
    }
}

/// Tiles on one ring around `center`, in angle order, without duplicates.
pub fn ring(center: Position, radius: i32, angle_step_degrees: u32) -> Vec<Position> {
    let step = angle_step_degrees.max(1);
    let mut seen = HashSet::new();
    (0..360)
        .step_by(step as usize)
        .map(|angle| point_at(center, f64::from(angle), f64::from(radius)))
        .filter(|position| seen.insert(*position))
        .collect()
}

/// Walkable tiles on concentric rings from `radius_step` out to `max_radius`.
///
/// Inner rings come first; a tile shared by two rings is only yielded once.
pub fn walkable_rings(
    game: &dyn GameView,
    center: Position,
    max_radius: i32,
    radius_step: i32,
    angle_step_degrees: u32,
) -> Vec<Position> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut radius = radius_step.max(1);
    while radius <= max_radius {
        for position in ring(center, radius, angle_step_degrees) {
            if seen.insert(position) && game.is_walkable(position) {
                candidates.push(position);
            }
        }
        radius += radius_step.max(1);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::UnitId;
    use game_core::mock::MockWorld;

    fn monster(id: u32, x: i32, y: i32, life: i32) -> Monster {
        Monster::new(UnitId(id), Position::new(x, y), life)
    }

    #[test]
    fn nearest_living_skips_corpses() {
        let monsters = [monster(1, 1, 0, 0), monster(2, 3, 4, 10)];
        let (nearest, squared) = nearest_living(Position::ORIGIN, &monsters).unwrap();
        assert_eq!(nearest.id, UnitId(2));
        assert_eq!(squared, 25);
        assert_eq!(nearest_distance(Position::ORIGIN, &monsters), Some(5.0));
    }

    #[test]
    fn nearest_distance_without_monsters_is_none() {
        assert_eq!(nearest_distance(Position::ORIGIN, &[]), None);
    }

    #[test]
    fn centroid_rounds_to_nearest_tile() {
        let center = centroid([
            Position::new(0, 0),
            Position::new(3, 0),
            Position::new(0, 4),
        ]);
        assert_eq!(center, Some(Position::new(1, 1)));
        assert_eq!(centroid(std::iter::empty()), None);
    }

    #[test]
    fn escape_heading_points_away_from_threat() {
        let heading = escape_heading(Position::new(0, 0), Position::new(5, 0));
        let landing = point_at(Position::new(5, 0), heading, 10.0);
        assert_eq!(landing, Position::new(15, 0));
    }

    #[test]
    fn ring_has_no_duplicates() {
        let tiles = ring(Position::ORIGIN, 1, 5);
        let unique: HashSet<_> = tiles.iter().copied().collect();
        assert_eq!(tiles.len(), unique.len());
        assert!(tiles.iter().all(|tile| tile.distance_squared(Position::ORIGIN) <= 2));
    }

    #[test]
    fn walkable_rings_filter_blocked_tiles() {
        let world = MockWorld::new(Position::ORIGIN);
        world.block([Position::new(2, 0)]);
        let tiles = walkable_rings(&world, Position::ORIGIN, 4, 2, 90);
        assert!(!tiles.contains(&Position::new(2, 0)));
        assert!(tiles.contains(&Position::new(0, 2)));
        assert!(tiles.contains(&Position::new(4, 0)));
    }
}
