//! Traits describing the live game and the commands the bot may issue.
//!
//! Each collaborator is a narrow trait so the decision crates can be driven by
//! the real client integration or by the in-memory [`crate::mock`] world. The
//! [`BotEnv`] aggregate bundles them and is passed explicitly into every
//! component constructor; there is no process-wide context.
mod actions;
mod belt;
mod character;
mod clock;
mod game;
mod paths;

use std::sync::Arc;

pub use actions::ActionLayer;
pub use belt::BeltManager;
pub use character::{Character, LevelingBehavior};
pub use clock::{Clock, SystemClock};
pub use game::GameView;
pub use paths::{Path, PathFinder};

/// Aggregates the collaborators a decision component needs.
///
/// Cloning is cheap (reference-counted handles), so each component can own a
/// copy without lifetimes leaking into its type.
#[derive(Clone)]
pub struct BotEnv {
    game: Arc<dyn GameView>,
    paths: Arc<dyn PathFinder>,
    actions: Arc<dyn ActionLayer>,
    belt: Arc<dyn BeltManager>,
    character: Arc<dyn Character>,
    clock: Arc<dyn Clock>,
}

impl BotEnv {
    pub fn with_all(
        game: Arc<dyn GameView>,
        paths: Arc<dyn PathFinder>,
        actions: Arc<dyn ActionLayer>,
        belt: Arc<dyn BeltManager>,
        character: Arc<dyn Character>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            game,
            paths,
            actions,
            belt,
            character,
            clock,
        }
    }

    pub fn game(&self) -> &dyn GameView {
        self.game.as_ref()
    }

    pub fn paths(&self) -> &dyn PathFinder {
        self.paths.as_ref()
    }

    pub fn actions(&self) -> &dyn ActionLayer {
        self.actions.as_ref()
    }

    pub fn belt(&self) -> &dyn BeltManager {
        self.belt.as_ref()
    }

    pub fn character(&self) -> &dyn Character {
        self.character.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Shared handle to the clock, for components that outlive a borrow.
    pub fn clock_handle(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

impl std::fmt::Debug for BotEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotEnv").finish_non_exhaustive()
    }
}
