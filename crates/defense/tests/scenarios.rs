//! End-to-end detector and policy scenarios against the in-memory world.

use std::sync::Arc;
use std::time::Duration;

use defense::{
    DefenseConfig, DefenseManager, NovaConfig, NovaSearch, Reaction, SafePositionSearch,
    SearchConfig, Trigger, geometry::nearest_distance,
};
use game_core::mock::{self, Command, ManualClock, MockWorld};
use game_core::{GameView, Monster, PotionKind, Position, UnitId};

fn manager(world: &Arc<MockWorld>, clock: &ManualClock, config: DefenseConfig) -> DefenseManager {
    DefenseManager::new(mock::env(world, clock), config)
}

/// Standing still for 0.6 s while HP goes 100 -> 95 -> 90 fires on the
/// third tick with 0.5 s / 0.2 s thresholds.
#[test]
fn bleeding_in_place_fires_on_third_tick() {
    let world = Arc::new(MockWorld::new(Position::new(10, 10)));
    let clock = ManualClock::new();
    let config = DefenseConfig {
        stationary_threshold_ms: 500,
        damage_threshold_ms: 200,
        ..DefenseConfig::default()
    };
    let mut manager = manager(&world, &clock, config);

    let mut reactions = Vec::new();
    for (i, hp) in [100, 95, 90].into_iter().enumerate() {
        if i > 0 {
            clock.advance(Duration::from_millis(300));
        }
        world.set_hp(hp);
        reactions.push(manager.evaluate());
    }

    assert_eq!(reactions[..2], [Reaction::Idle, Reaction::Idle]);
    assert_eq!(reactions[2].trigger(), Some(Trigger::StationaryDamage));
}

/// 80 % then 60 % one second later is a spike with a 15-point threshold.
#[test]
fn hp_drop_registers_as_spike() {
    let world = Arc::new(MockWorld::new(Position::ORIGIN));
    let clock = ManualClock::new();
    let mut manager = manager(&world, &clock, DefenseConfig::default());
    let monitor = manager.monitor();

    world.set_hp(80);
    manager.evaluate();
    clock.advance(Duration::from_secs(1));
    world.set_hp(60);
    manager.evaluate();

    assert!(monitor.has_damage_spike());
}

/// Poisoned bleeding never counts as stationary damage.
#[test]
fn poison_never_triggers_a_reaction() {
    let world = Arc::new(MockWorld::new(Position::new(10, 10)));
    world.set_poisoned(true);
    let clock = ManualClock::new();
    let mut manager = manager(&world, &clock, DefenseConfig::default());

    for i in 0..40 {
        world.set_hp(100 - i * 2);
        assert_eq!(manager.evaluate(), Reaction::Idle);
        clock.advance(Duration::from_millis(250));
    }
    assert!(world.commands().is_empty());
}

/// The first window of stillness never fires, however hard HP drops.
#[test]
fn first_window_is_silent() {
    let world = Arc::new(MockWorld::new(Position::new(10, 10)));
    let clock = ManualClock::new();
    let config = DefenseConfig::default();
    let window = config.stationary_threshold();
    let mut manager = manager(&world, &clock, config);

    let mut elapsed = Duration::ZERO;
    let mut hp = 100;
    while elapsed < window {
        world.set_hp(hp);
        assert_eq!(manager.evaluate(), Reaction::Idle, "fired at {elapsed:?}");
        hp -= 5;
        clock.advance(Duration::from_millis(150));
        elapsed += Duration::from_millis(150);
    }
}

#[test]
fn low_hp_ineffective_attack_takes_aggressive_branch() {
    let world = Arc::new(MockWorld::new(Position::new(20, 10)).with_teleport(true));
    world.set_monsters(vec![Monster::new(UnitId(3), Position::new(16, 10), 900)]);
    world.set_hp(20);
    let clock = ManualClock::new();
    let config = DefenseConfig {
        ineffective_attack_threshold_ms: 600,
        ..DefenseConfig::default()
    };
    let mut manager = manager(&world, &clock, config);

    let mut reaction = Reaction::Idle;
    for step in 0..8 {
        // Alternate between two tiles so the stationary detector stays idle.
        let x = if step % 2 == 0 { 20 } else { 26 };
        world.set_player(Position::new(x, 10));
        reaction = manager.evaluate();
        if reaction.is_attempt() {
            break;
        }
        clock.advance(Duration::from_millis(250));
    }

    assert!(
        matches!(
            reaction,
            Reaction::Teleported {
                trigger: Trigger::IneffectiveAttack,
                ..
            }
        ),
        "got {reaction:?}"
    );
    assert!(!world.commands().contains(&Command::Drink {
        kind: PotionKind::Rejuvenation,
        for_mercenary: false
    }));
}

#[test]
fn safe_search_respects_minimum_in_a_crowd() {
    let world = Arc::new(MockWorld::new(Position::new(50, 50)));
    let env = mock::env(&world, &ManualClock::new());
    let config = SearchConfig::default();
    let search = SafePositionSearch::new(&env, &config);
    let crowd: Vec<_> = (0..12)
        .map(|i| Monster::new(UnitId(i), Position::new(44 + (i as i32 % 4) * 4, 44 + (i as i32 / 4) * 6), 50))
        .collect();

    let best = search.find_safe_position(Position::new(50, 50), &crowd);

    if let Some(best) = best {
        let nearest = nearest_distance(best.position, &crowd).unwrap();
        assert!(nearest >= f64::from(config.min_safe_distance), "{nearest}");
        assert!(world.is_walkable(best.position));
    }
}

#[test]
fn nova_search_finds_the_cluster() {
    let world = MockWorld::new(Position::new(140, 140));
    let clock = ManualClock::new();
    let config = NovaConfig::default();
    let souls: Vec<_> = [(100, 100), (102, 101), (98, 99), (101, 98), (99, 102)]
        .into_iter()
        .map(|(x, y)| Position::new(x, y))
        .collect();

    let placement = NovaSearch::new(&world, &clock, &config)
        .find_best_nova_position(Position::new(140, 140), &souls)
        .unwrap();

    assert_eq!(placement.hits, 5);
    assert!(!placement.timed_out);
}
