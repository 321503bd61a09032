//! Snake with six rule sets: Classic, Timed, Obstacles, Moving Fruit,
//! Multi-Fruit and Chaos.
//!
//! This crate is the simulation only. It has no terminal I/O and no global
//! state: a [`Session`] holds the snake, the active mode and the score, takes
//! randomness as an [`rand::Rng`] and time as a [`std::time::Duration`] on the
//! caller's game clock.

pub mod food;
pub mod grid;
pub mod mode;
pub mod placement;
pub mod session;
pub mod settings;
pub mod snake;

/// A grid cell, `(x, y)`. Signed so a head that left the grid is representable.
pub type Coords = (i16, i16);

pub use food::{Food, FoodKind};
pub use grid::Grid;
pub use mode::{GameMode, GameModeConfig, ModeRules};
pub use placement::PlacementError;
pub use session::{Eaten, Phase, Session, StepOutcome};
pub use settings::{Settings, SettingsError};
pub use snake::{DeathCause, Direction, MoveResult, Snake, MAX_SNAKE_LENGTH};
