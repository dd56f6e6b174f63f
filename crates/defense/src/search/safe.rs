use std::collections::HashSet;

use game_core::{BotEnv, GameView, Monster, PathFinder, Position};

use super::{Candidate, radii, rank};
use crate::config::SearchConfig;
use crate::geometry::{escape_heading, nearest_distance, nearest_living, point_at, ring, walkable_rings};

/// Scoring profile for one search flavor.
#[derive(Clone, Copy, Debug)]
struct Profile {
    angle_step_degrees: u32,
    /// Bonus granted once the safety distance reaches the comfortable target.
    safe_bonus: f64,
}

/// Weighted safe-position search around the player.
///
/// Every candidate that survives the hard filters is scored as
///
/// ```text
/// nearest_monster_distance * safety_weight - travel_distance * travel_weight [+ bonus]
/// ```
///
/// and the highest score wins. Reachability is checked last, walking the
/// ranking from the top until the pathfinder accepts a tile.
pub struct SafePositionSearch<'a> {
    game: &'a dyn GameView,
    paths: &'a dyn PathFinder,
    config: &'a SearchConfig,
}

impl<'a> SafePositionSearch<'a> {
    pub fn new(env: &'a BotEnv, config: &'a SearchConfig) -> Self {
        Self {
            game: env.game(),
            paths: env.paths(),
            config,
        }
    }

    /// Finds a position to escape to from `from`.
    ///
    /// Returns `None` when no walkable, reachable tile keeps at least
    /// `min_safe_distance` from every living monster.
    pub fn find_safe_position(&self, from: Position, monsters: &[Monster]) -> Option<Candidate> {
        let profile = Profile {
            angle_step_degrees: self.config.angle_step_degrees,
            safe_bonus: 0.0,
        };
        self.search(from, monsters, profile)
    }

    /// Like [`Self::find_safe_position`], but scans finer rings and rewards
    /// tiles that reach the comfortable `safe_distance`, since buffing takes
    /// several uninterrupted casts.
    pub fn find_safe_position_for_buff(
        &self,
        from: Position,
        monsters: &[Monster],
    ) -> Option<Candidate> {
        let profile = Profile {
            angle_step_degrees: self.config.buff_angle_step_degrees,
            safe_bonus: self.config.buff_safe_bonus,
        };
        self.search(from, monsters, profile)
    }

    /// Finds a tile from which `target` can be attacked.
    ///
    /// Candidates lie on rings around the target within `attack_range`, need
    /// line of sight to it, and keep `min(min_safe_distance, attack_range)`
    /// from every living monster (the target included). Tiles near
    /// three quarters of the attack range score best.
    pub fn find_attack_position(
        &self,
        from: Position,
        target: &Monster,
        monsters: &[Monster],
        attack_range: i32,
    ) -> Option<Candidate> {
        let keep_away = self.config.min_safe_distance.min(attack_range);
        let ideal_range = f64::from(attack_range) * 0.75;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for radius in radii(attack_range, self.config.radius_step) {
            for position in ring(target.position, radius, self.config.angle_step_degrees) {
                if position == from || !seen.insert(position) {
                    continue;
                }
                // Rounded ring points can land just outside the range.
                if !position.within(target.position, attack_range) || !self.game.is_walkable(position)
                {
                    continue;
                }
                let Some(safety) = nearest_distance(position, monsters) else {
                    continue;
                };
                if safety < f64::from(keep_away) {
                    continue;
                }
                if !self.paths.line_of_sight(position, target.position) {
                    continue;
                }
                let range_error = (position.distance(target.position) - ideal_range).abs();
                let score = safety * self.config.safety_weight
                    - from.distance(position) * self.config.travel_weight
                    - range_error * self.config.range_weight;
                candidates.push(Candidate::new(position, score));
            }
        }

        tracing::debug!(
            target = %target.id,
            attack_range,
            generated = candidates.len(),
            "attack position candidates scored"
        );
        self.best_reachable(candidates)
    }

    fn search(&self, from: Position, monsters: &[Monster], profile: Profile) -> Option<Candidate> {
        let min_safe = f64::from(self.config.min_safe_distance);
        // With nobody around every tile is as safe as it needs to be.
        let no_threat_distance = f64::from(self.config.safe_distance);

        let mut candidates = Vec::new();
        for position in self.generate(from, monsters, profile.angle_step_degrees) {
            let safety = nearest_distance(position, monsters).unwrap_or(no_threat_distance);
            if safety < min_safe {
                continue;
            }
            let mut score = safety * self.config.safety_weight
                - from.distance(position) * self.config.travel_weight;
            if safety >= f64::from(self.config.safe_distance) {
                score += profile.safe_bonus;
            }
            candidates.push(Candidate::new(position, score));
        }

        tracing::debug!(
            %from,
            generated = candidates.len(),
            "safe position candidates scored"
        );
        self.best_reachable(candidates)
    }

    /// Threat-opposite tiles first, then concentric rings, all walkable and
    /// unique.
    fn generate(&self, from: Position, monsters: &[Monster], angle_step: u32) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut generated = Vec::new();

        if let Some((threat, _)) = nearest_living(from, monsters) {
            let heading = escape_heading(threat.position, from);
            let jitter = f64::from(self.config.jitter_degrees);
            let rotations = [0.0, jitter, -jitter, 2.0 * jitter, -2.0 * jitter];
            for radius in radii(self.config.max_radius, self.config.radius_step) {
                for rotation in rotations {
                    let position = point_at(from, heading + rotation, f64::from(radius));
                    if seen.insert(position) && self.game.is_walkable(position) {
                        generated.push(position);
                    }
                }
            }
        }

        for position in walkable_rings(
            self.game,
            from,
            self.config.max_radius,
            self.config.radius_step,
            angle_step,
        ) {
            if seen.insert(position) {
                generated.push(position);
            }
        }

        generated
    }

    fn best_reachable(&self, mut candidates: Vec<Candidate>) -> Option<Candidate> {
        rank(&mut candidates);
        let best = candidates
            .into_iter()
            .find(|candidate| self.paths.path_ignoring_monsters(candidate.position).is_some());

        if best.is_none() {
            tracing::debug!("no reachable candidate passed the filters");
        }
        best
    }
}
