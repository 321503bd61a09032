//! The simulation context: one snake, one active mode, one score.
//!
//! A front end owns a [`Session`], feeds it input between ticks and calls
//! [`Session::step`] once per tick with the current game-clock time.

use std::time::Duration;

use crate::Coords;
use crate::food::{Food, FoodKind};
use crate::grid::Grid;
use crate::mode::{GameMode, GameModeConfig};
use crate::placement::PlacementError;
use crate::snake::{DeathCause, Direction, MoveResult, Snake};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

pub const MIN_INITIAL_LENGTH: usize = 3;
pub const MAX_INITIAL_LENGTH: usize = 5;

/// Which screen the game is on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

/// A food eaten during a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Eaten {
    pub slot: usize,
    pub value: u32,
    pub kind: FoodKind,
}

/// What a single step did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub score: u32,
    pub alive: bool,
    pub eaten: Option<Eaten>,
    pub death: Option<DeathCause>,
}

pub struct Session<R: Rng = StdRng> {
    grid: Grid,
    initial_length: usize,
    rng: R,
    phase: Phase,
    snake: Snake,
    config: GameModeConfig,
    score: u32,
}

impl<R: Rng> Session<R> {
    /// Prepares a Classic game and parks it on the menu.
    ///
    /// `initial_length` is clamped to 3..=5 and then to what fits left of the
    /// start column, so the starting snake is always on the grid.
    pub fn new(grid: Grid, initial_length: usize, mut rng: R) -> Result<Self, PlacementError> {
        let initial_length = initial_length
            .clamp(MIN_INITIAL_LENGTH, MAX_INITIAL_LENGTH)
            .min(max_fitting_length(&grid));
        let snake = starting_snake(&grid, initial_length);
        let config = GameModeConfig::new(GameMode::Classic, &grid, &snake, Duration::ZERO, &mut rng)?;

        Ok(Session { grid, initial_length, rng, phase: Phase::Menu, snake, config, score: 0 })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode()
    }

    pub fn config(&self) -> &GameModeConfig {
        &self.config
    }

    pub fn foods(&self) -> &[Food] {
        self.config.foods()
    }

    pub fn obstacles(&self) -> &[Coords] {
        self.config.obstacles()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.config.time_remaining()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.snake.is_alive()
    }

    /// Starts a fresh game in `mode`. `now` is the game-clock time the mode's
    /// timers start from.
    pub fn select_mode(&mut self, mode: GameMode, now: Duration) -> Result<(), PlacementError> {
        let snake = starting_snake(&self.grid, self.initial_length);
        let config = GameModeConfig::new(mode, &self.grid, &snake, now, &mut self.rng)?;

        self.snake = snake;
        self.config = config;
        self.score = 0;
        self.phase = Phase::Playing;

        info!(mode = mode.slug(), "game started");
        Ok(())
    }

    /// Plays the current mode again from scratch.
    pub fn reset_game(&mut self, now: Duration) -> Result<(), PlacementError> {
        self.select_mode(self.config.mode(), now)
    }

    /// Leaves the board as it is for display behind the menu.
    pub fn return_to_menu(&mut self) {
        self.phase = Phase::Menu;
    }

    /// Ignored unless a game is running.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.phase == Phase::Playing {
            self.snake.set_direction(direction);
        }
    }

    /// Runs one tick.
    ///
    /// Order: move the snake, die on walls/self/obstacles, eat at most one
    /// food, drift moving fruit, run the mode clock. A head on an obstacle
    /// dies before it can eat. A placement failure while respawning food ends
    /// the game and is returned to the caller; it means the board is full.
    pub fn step(&mut self, now: Duration) -> Result<StepOutcome, PlacementError> {
        if self.phase != Phase::Playing {
            return Ok(self.outcome(None));
        }

        if !self.snake.is_alive() {
            self.phase = Phase::GameOver;
            return Ok(self.outcome(None));
        }

        if let MoveResult::Crashed(cause) = self.snake.advance(&self.grid) {
            return Ok(self.end(cause));
        }

        let head = self.snake.head();
        if self.config.obstacle_at(head) {
            self.snake.kill(DeathCause::ObstacleCollision);
            return Ok(self.end(DeathCause::ObstacleCollision));
        }

        let eaten = match self.config.food_at(head) {
            Some(slot) => Some(self.eat(slot)?),
            None => None,
        };

        if self.config.drift_foods_if_due(now, &self.grid, &mut self.rng) {
            debug!("moving fruit drifted");
        }

        if self.config.tick_timer(now) {
            self.snake.kill(DeathCause::TimeUp);
            let mut outcome = self.end(DeathCause::TimeUp);
            outcome.eaten = eaten;
            return Ok(outcome);
        }

        Ok(self.outcome(eaten))
    }

    fn eat(&mut self, slot: usize) -> Result<Eaten, PlacementError> {
        let food = &self.config.foods()[slot];
        let eaten = Eaten { slot, value: food.value, kind: food.kind };

        self.score += eaten.value;
        self.snake.grow();
        if let Err(err) = self.config.respawn_food(slot, &self.grid, &self.snake, &mut self.rng) {
            info!(score = self.score, length = self.snake.len(), "board full");
            self.phase = Phase::GameOver;
            return Err(err);
        }
        self.config.add_time_bonus();

        debug!(slot, value = eaten.value, score = self.score, "food eaten");
        Ok(eaten)
    }

    fn end(&mut self, cause: DeathCause) -> StepOutcome {
        self.phase = Phase::GameOver;
        info!(?cause, score = self.score, length = self.snake.len(), "game over");
        self.outcome(None)
    }

    fn outcome(&self, eaten: Option<Eaten>) -> StepOutcome {
        StepOutcome {
            score: self.score,
            alive: self.snake.is_alive(),
            eaten,
            death: self.snake.death(),
        }
    }
}

/// Longest snake that fits between the left wall and the start column.
pub fn max_fitting_length(grid: &Grid) -> usize {
    (grid.width() / 4) as usize + 1
}

/// Snake used at every reset: a quarter of the way in, half way down, heading right.
fn starting_snake(grid: &Grid, length: usize) -> Snake {
    Snake::new((grid.width() / 4, grid.height() / 2), length, Direction::Right)
}
