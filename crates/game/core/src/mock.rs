//! In-memory collaborators for tests and the scenario simulator.
//!
//! [`MockWorld`] implements every collaborator trait over a single mutable
//! world and records the commands it receives. [`ManualClock`] only moves when
//! told to, which makes debounce timings deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::env::{
    ActionLayer, BeltManager, BotEnv, Character, Clock, GameView, LevelingBehavior, Path,
    PathFinder,
};
use crate::error::ActionError;
use crate::state::{GameObject, Monster, MonsterFilter, PotionKind, Position, UnitId};

/// Manually advanced clock shared between clones.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            start,
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    /// Time advanced since construction.
    pub fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap() - self.start
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Command recorded by [`MockWorld`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    MoveTo(Position),
    Teleport(Position),
    Escape,
    Interact(UnitId),
    ClearArea {
        center: Position,
        radius: i32,
        filter: MonsterFilter,
    },
    FollowPath(Position),
    Drink {
        kind: PotionKind,
        for_mercenary: bool,
    },
}

#[derive(Debug)]
struct WorldState {
    player: Position,
    hp: i32,
    mana: i32,
    poisoned: bool,
    monsters: Vec<Monster>,
    objects: Vec<GameObject>,
    bounds: Option<(Position, Position)>,
    blocked: HashSet<Position>,
    unreachable: HashSet<Position>,
    potions: HashMap<PotionKind, u32>,
    fail_commands: bool,
    commands: Vec<Command>,
}

/// Mutable in-memory world implementing every collaborator trait.
#[derive(Debug)]
pub struct MockWorld {
    state: Mutex<WorldState>,
    can_teleport: bool,
    leveling: Option<FixedRange>,
}

#[derive(Debug)]
struct FixedRange(i32);

impl LevelingBehavior for FixedRange {
    fn attack_range(&self) -> i32 {
        self.0
    }
}

impl MockWorld {
    pub fn new(player: Position) -> Self {
        Self {
            state: Mutex::new(WorldState {
                player,
                hp: 100,
                mana: 100,
                poisoned: false,
                monsters: Vec::new(),
                objects: Vec::new(),
                bounds: None,
                blocked: HashSet::new(),
                unreachable: HashSet::new(),
                potions: HashMap::new(),
                fail_commands: false,
                commands: Vec::new(),
            }),
            can_teleport: false,
            leveling: None,
        }
    }

    pub fn with_teleport(mut self, can_teleport: bool) -> Self {
        self.can_teleport = can_teleport;
        self
    }

    pub fn with_leveling_range(mut self, attack_range: i32) -> Self {
        self.leveling = Some(FixedRange(attack_range));
        self
    }

    /// Restricts walkable tiles to the inclusive rectangle `min..=max`.
    pub fn with_bounds(self, min: Position, max: Position) -> Self {
        self.state.lock().unwrap().bounds = Some((min, max));
        self
    }

    pub fn set_player(&self, position: Position) {
        self.state.lock().unwrap().player = position;
    }

    pub fn set_hp(&self, hp: i32) {
        self.state.lock().unwrap().hp = hp;
    }

    pub fn set_poisoned(&self, poisoned: bool) {
        self.state.lock().unwrap().poisoned = poisoned;
    }

    pub fn set_monsters(&self, monsters: Vec<Monster>) {
        self.state.lock().unwrap().monsters = monsters;
    }

    pub fn set_objects(&self, objects: Vec<GameObject>) {
        self.state.lock().unwrap().objects = objects;
    }

    /// Updates the life of the monster with the given id, if present.
    pub fn set_monster_life(&self, id: UnitId, life: i32) {
        let mut state = self.state.lock().unwrap();
        if let Some(monster) = state.monsters.iter_mut().find(|m| m.id == id) {
            monster.life = life;
        }
    }

    pub fn block(&self, tiles: impl IntoIterator<Item = Position>) {
        self.state.lock().unwrap().blocked.extend(tiles);
    }

    /// Marks tiles as walkable but without any path from the player.
    pub fn mark_unreachable(&self, tiles: impl IntoIterator<Item = Position>) {
        self.state.lock().unwrap().unreachable.extend(tiles);
    }

    pub fn add_potions(&self, kind: PotionKind, count: u32) {
        *self.state.lock().unwrap().potions.entry(kind).or_default() += count;
    }

    /// Makes every movement command fail until reset.
    pub fn fail_commands(&self, fail: bool) {
        self.state.lock().unwrap().fail_commands = fail;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.lock().unwrap().commands.clear();
    }

    fn walkable(state: &WorldState, position: Position) -> bool {
        if state.blocked.contains(&position) {
            return false;
        }
        match state.bounds {
            Some((min, max)) => {
                position.x >= min.x && position.y >= min.y && position.x <= max.x && position.y <= max.y
            }
            None => true,
        }
    }

    fn relocate(&self, to: Position, command: Command) -> Result<(), ActionError> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(command);
        if state.fail_commands {
            return Err(ActionError::MoveFailed { to });
        }
        if !Self::walkable(&state, to) {
            return Err(ActionError::NotWalkable { to });
        }
        state.player = to;
        Ok(())
    }
}

impl GameView for MockWorld {
    fn player_position(&self) -> Position {
        self.state.lock().unwrap().player
    }

    fn hp_percent(&self) -> i32 {
        self.state.lock().unwrap().hp
    }

    fn mana_percent(&self) -> i32 {
        self.state.lock().unwrap().mana
    }

    fn is_poisoned(&self) -> bool {
        self.state.lock().unwrap().poisoned
    }

    fn monsters(&self) -> Vec<Monster> {
        self.state.lock().unwrap().monsters.clone()
    }

    fn is_walkable(&self, position: Position) -> bool {
        Self::walkable(&self.state.lock().unwrap(), position)
    }

    fn objects(&self) -> Vec<GameObject> {
        self.state.lock().unwrap().objects.clone()
    }
}

impl PathFinder for MockWorld {
    fn distance_from_me(&self, to: Position) -> f64 {
        self.player_position().distance(to)
    }

    /// Samples the straight segment; any blocked tile on it breaks sight.
    fn line_of_sight(&self, from: Position, to: Position) -> bool {
        let state = self.state.lock().unwrap();
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs());
        (0..=steps).all(|i| {
            let t = if steps == 0 { 0.0 } else { f64::from(i) / f64::from(steps) };
            let x = f64::from(from.x) + f64::from(to.x - from.x) * t;
            let y = f64::from(from.y) + f64::from(to.y - from.y) * t;
            !state
                .blocked
                .contains(&Position::new(x.round() as i32, y.round() as i32))
        })
    }

    fn path_ignoring_monsters(&self, to: Position) -> Option<Path> {
        let state = self.state.lock().unwrap();
        if !Self::walkable(&state, to) || state.unreachable.contains(&to) {
            return None;
        }
        let cost = state.player.distance(to).ceil() as u32;
        Some(Path::new(vec![state.player, to], cost))
    }

    fn move_through_path(&self, path: &Path, _step_delay: Duration) -> Result<(), ActionError> {
        let Some(to) = path.destination() else {
            return Ok(());
        };
        self.relocate(to, Command::FollowPath(to))
    }
}

impl ActionLayer for MockWorld {
    fn move_to(&self, to: Position) -> Result<(), ActionError> {
        self.relocate(to, Command::MoveTo(to))
    }

    fn teleport_to(&self, to: Position) -> Result<(), ActionError> {
        if !self.can_teleport {
            return Err(ActionError::SkillUnavailable { skill: "teleport" });
        }
        self.relocate(to, Command::Teleport(to))
    }

    fn escape(&self) -> Result<(), ActionError> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(Command::Escape);
        if state.fail_commands {
            return Err(ActionError::Interrupted);
        }
        Ok(())
    }

    /// Succeeds once `is_done` holds after the interaction.
    fn interact_object(
        &self,
        object: UnitId,
        is_done: &dyn Fn() -> bool,
    ) -> Result<(), ActionError> {
        {
            let mut state = self.state.lock().unwrap();
            state.commands.push(Command::Interact(object));
            if state.fail_commands {
                return Err(ActionError::Interrupted);
            }
        }
        if is_done() {
            Ok(())
        } else {
            Err(ActionError::Interrupted)
        }
    }

    fn clear_area(
        &self,
        center: Position,
        radius: i32,
        filter: MonsterFilter,
    ) -> Result<(), ActionError> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(Command::ClearArea {
            center,
            radius,
            filter,
        });
        if state.fail_commands {
            return Err(ActionError::Interrupted);
        }
        for monster in state.monsters.iter_mut() {
            if filter.matches(monster) && monster.position.within(center, radius) {
                monster.life = 0;
            }
        }
        Ok(())
    }
}

impl BeltManager for MockWorld {
    fn drink_potion(&self, kind: PotionKind, for_mercenary: bool) -> bool {
        let mut state = self.state.lock().unwrap();
        let Some(count) = state.potions.get_mut(&kind).filter(|count| **count > 0) else {
            return false;
        };
        *count -= 1;
        state.commands.push(Command::Drink {
            kind,
            for_mercenary,
        });
        if !for_mercenary && kind == PotionKind::Rejuvenation {
            state.hp = 100;
        }
        true
    }
}

impl Character for MockWorld {
    fn can_teleport(&self) -> bool {
        self.can_teleport
    }

    fn leveling(&self) -> Option<&dyn LevelingBehavior> {
        self.leveling.as_ref().map(|range| range as &dyn LevelingBehavior)
    }
}

/// Bundles a mock world and clock into a [`BotEnv`].
pub fn env(world: &Arc<MockWorld>, clock: &ManualClock) -> BotEnv {
    BotEnv::with_all(
        world.clone(),
        world.clone(),
        world.clone(),
        world.clone(),
        world.clone(),
        Arc::new(clock.clone()),
    )
}
