//! Game modes and the per-mode runtime configuration.
//!
//! Every mode is a row in a small rules table; [`GameModeConfig::new`] is the
//! one routine that turns a row into obstacles, foods and timers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::Coords;
use crate::food::{Food, drift_foods};
use crate::grid::Grid;
use crate::placement::{self, PlacementError};
use crate::snake::Snake;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_OBSTACLES: usize = 30;
pub const MAX_FOODS: usize = 5;

/// Seconds added to the clock for each food eaten in a timed mode.
pub const TIME_BONUS_SECS: u32 = 5;

const TIMER_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Classic,
    Timed,
    Obstacles,
    MovingFruit,
    MultiFruit,
    Chaos,
}

/// The knobs a mode turns on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModeRules {
    pub time_limit_secs: Option<u32>,
    pub obstacle_count: usize,
    pub fruit_move_interval: Option<Duration>,
    pub food_slots: usize,
}

const NO_RULES: ModeRules = ModeRules {
    time_limit_secs: None,
    obstacle_count: 0,
    fruit_move_interval: None,
    food_slots: 1,
};

// Indexed by `GameMode as usize`
const MODE_RULES: [ModeRules; 6] = [
    // Classic
    NO_RULES,
    // Timed
    ModeRules { time_limit_secs: Some(60), ..NO_RULES },
    // Obstacles
    ModeRules { obstacle_count: MAX_OBSTACLES / 3, ..NO_RULES },
    // MovingFruit
    ModeRules { fruit_move_interval: Some(Duration::from_millis(500)), ..NO_RULES },
    // MultiFruit
    ModeRules { food_slots: 3, ..NO_RULES },
    // Chaos
    ModeRules {
        time_limit_secs: Some(90),
        obstacle_count: MAX_OBSTACLES / 2,
        fruit_move_interval: Some(Duration::from_millis(300)),
        food_slots: MAX_FOODS,
    },
];

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Classic,
        GameMode::Timed,
        GameMode::Obstacles,
        GameMode::MovingFruit,
        GameMode::MultiFruit,
        GameMode::Chaos,
    ];

    pub fn rules(self) -> ModeRules {
        MODE_RULES[self as usize]
    }

    /// Clamps out-of-range indices to `Classic`.
    pub fn from_index(index: usize) -> GameMode {
        GameMode::ALL.get(index).copied().unwrap_or(GameMode::Classic)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Timed => "Timed",
            GameMode::Obstacles => "Obstacles",
            GameMode::MovingFruit => "Moving Fruit",
            GameMode::MultiFruit => "Multi-Fruit",
            GameMode::Chaos => "Chaos",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Timed => "timed",
            GameMode::Obstacles => "obstacles",
            GameMode::MovingFruit => "moving-fruit",
            GameMode::MultiFruit => "multi-fruit",
            GameMode::Chaos => "chaos",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameMode::Classic => "Eat, grow, avoid the walls",
            GameMode::Timed => "60 seconds on the clock, food buys time",
            GameMode::Obstacles => "Rocks are scattered across the field",
            GameMode::MovingFruit => "The fruit wanders off",
            GameMode::MultiFruit => "Three fruits worth different points",
            GameMode::Chaos => "Everything at once, and faster",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        GameMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = GameMode::ALL.iter().map(|m| m.slug()).collect();
                format!("unknown game mode '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Countdown {
    remaining: u32,
    max: u32,
    last_tick: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FruitMotion {
    interval: Duration,
    last_move: Duration,
}

/// Runtime state of the active mode. Everything here is derived from the
/// mode when it is entered; the session mutates it only through the
/// crate-private methods below.
#[derive(Debug, Clone)]
pub struct GameModeConfig {
    mode: GameMode,
    countdown: Option<Countdown>,
    obstacles: Vec<Coords>,
    fruit_motion: Option<FruitMotion>,
    foods: Vec<Food>,
}

impl GameModeConfig {
    /// Enters `mode` for a freshly reset `snake`: obstacles first, then each
    /// food slot in turn. `now` starts the mode's timers.
    pub fn new<R: Rng + ?Sized>(
        mode: GameMode,
        grid: &Grid,
        snake: &Snake,
        now: Duration,
        rng: &mut R,
    ) -> Result<Self, PlacementError> {
        let rules = mode.rules();
        let moving = rules.fruit_move_interval.is_some();

        let obstacles = placement::place_obstacles(rng, grid, rules.obstacle_count, snake, &[])?;

        let mut foods: Vec<Food> = Vec::with_capacity(rules.food_slots);
        for slot in 0..rules.food_slots {
            let pos = placement::food_cell(rng, grid, snake, &obstacles, &foods)?;
            foods.push(Food::for_slot(slot, pos, moving, rng));
        }

        debug!(
            mode = mode.slug(),
            obstacles = obstacles.len(),
            foods = foods.len(),
            "initialized game mode"
        );

        Ok(GameModeConfig {
            mode,
            countdown: rules
                .time_limit_secs
                .map(|secs| Countdown { remaining: secs, max: secs, last_tick: now }),
            obstacles,
            fruit_motion: rules
                .fruit_move_interval
                .map(|interval| FruitMotion { interval, last_move: now }),
            foods,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_timed(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(|c| c.remaining)
    }

    pub fn max_time(&self) -> Option<u32> {
        self.countdown.as_ref().map(|c| c.max)
    }

    pub fn has_obstacles(&self) -> bool {
        !self.obstacles.is_empty()
    }

    pub fn obstacles(&self) -> &[Coords] {
        &self.obstacles
    }

    pub fn is_moving_fruit(&self) -> bool {
        self.fruit_motion.is_some()
    }

    pub fn fruit_move_interval(&self) -> Option<Duration> {
        self.fruit_motion.as_ref().map(|m| m.interval)
    }

    pub fn is_multi_fruit(&self) -> bool {
        self.foods.len() > 1
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn food_count(&self) -> usize {
        self.foods.len()
    }

    pub fn obstacle_at(&self, pos: Coords) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Index of the first food slot at `pos`.
    pub fn food_at(&self, pos: Coords) -> Option<usize> {
        self.foods.iter().position(|food| food.position == pos)
    }

    pub(crate) fn respawn_food<R: Rng + ?Sized>(
        &mut self,
        slot: usize,
        grid: &Grid,
        snake: &Snake,
        rng: &mut R,
    ) -> Result<(), PlacementError> {
        let pos = placement::food_cell(rng, grid, snake, &self.obstacles, &self.foods)?;
        self.foods[slot].relocate(pos, rng);
        Ok(())
    }

    /// No-op outside timed modes.
    pub(crate) fn add_time_bonus(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.remaining = (countdown.remaining + TIME_BONUS_SECS).min(countdown.max);
        }
    }

    /// Drops a second once a full second has passed since the last drop.
    /// Time past the second boundary carries over to the next one. Returns
    /// true when the clock has run out.
    pub(crate) fn tick_timer(&mut self, now: Duration) -> bool {
        match self.countdown.as_mut() {
            Some(countdown) => {
                if now.saturating_sub(countdown.last_tick) >= TIMER_TICK {
                    countdown.remaining = countdown.remaining.saturating_sub(1);
                    countdown.last_tick += TIMER_TICK;
                }
                countdown.remaining == 0
            }
            None => false,
        }
    }

    /// Drifts the moving foods if their interval has elapsed. Returns true if
    /// a drift happened.
    pub(crate) fn drift_foods_if_due<R: Rng + ?Sized>(&mut self, now: Duration, grid: &Grid, rng: &mut R) -> bool {
        let due = match self.fruit_motion.as_mut() {
            Some(motion) if now.saturating_sub(motion.last_move) >= motion.interval => {
                motion.last_move = now;
                true
            }
            _ => false,
        };

        if due {
            drift_foods(&mut self.foods, &self.obstacles, grid, rng);
        }
        due
    }

    #[cfg(test)]
    pub(crate) fn foods_mut(&mut self) -> &mut Vec<Food> {
        &mut self.foods
    }

    #[cfg(test)]
    pub(crate) fn obstacles_mut(&mut self) -> &mut Vec<Coords> {
        &mut self.obstacles
    }

    #[cfg(test)]
    pub(crate) fn set_time_remaining(&mut self, secs: u32) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.remaining = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodKind;
    use crate::grid::manhattan;
    use crate::snake::Direction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn start_snake() -> Snake {
        Snake::new((8, 12), 3, Direction::Right)
    }

    fn enter(mode: GameMode, seed: u64) -> GameModeConfig {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        GameModeConfig::new(mode, &Grid::default(), &start_snake(), Duration::ZERO, &mut rng).unwrap()
    }

    #[test]
    fn test_rules_table() {
        assert_eq!(GameMode::Classic.rules(), NO_RULES);
        assert_eq!(GameMode::Timed.rules().time_limit_secs, Some(60));
        assert_eq!(GameMode::Obstacles.rules().obstacle_count, 10);
        assert_eq!(GameMode::MovingFruit.rules().fruit_move_interval, Some(Duration::from_millis(500)));
        assert_eq!(GameMode::MultiFruit.rules().food_slots, 3);

        let chaos = GameMode::Chaos.rules();
        assert_eq!(chaos.time_limit_secs, Some(90));
        assert_eq!(chaos.obstacle_count, 15);
        assert_eq!(chaos.fruit_move_interval, Some(Duration::from_millis(300)));
        assert_eq!(chaos.food_slots, MAX_FOODS);
    }

    #[test]
    fn test_mode_flags() {
        let flags = |mode| {
            let config = enter(mode, 1);
            (config.is_timed(), config.has_obstacles(), config.is_moving_fruit(), config.is_multi_fruit())
        };

        assert_eq!(flags(GameMode::Classic), (false, false, false, false));
        assert_eq!(flags(GameMode::Timed), (true, false, false, false));
        assert_eq!(flags(GameMode::Obstacles), (false, true, false, false));
        assert_eq!(flags(GameMode::MovingFruit), (false, false, true, false));
        assert_eq!(flags(GameMode::MultiFruit), (false, false, false, true));
        assert_eq!(flags(GameMode::Chaos), (true, true, true, true));
    }

    #[test]
    fn test_classic_single_regular_food() {
        let config = enter(GameMode::Classic, 2);
        assert_eq!(config.food_count(), 1);
        assert_eq!(config.foods()[0].value, 10);
        assert_eq!(config.foods()[0].kind, FoodKind::Regular);
        assert!(!config.foods()[0].is_moving());
        assert_eq!(config.time_remaining(), None);
    }

    #[test]
    fn test_multi_fruit_tiers() {
        let config = enter(GameMode::MultiFruit, 3);
        let values: Vec<u32> = config.foods().iter().map(|f| f.value).collect();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn test_chaos_initialization() {
        for seed in 0..100 {
            let config = enter(GameMode::Chaos, seed);
            let snake = start_snake();

            assert_eq!(config.obstacles().len(), MAX_OBSTACLES / 2);
            assert_eq!(config.food_count(), MAX_FOODS);
            assert_eq!(config.time_remaining(), Some(90));
            assert!(config.foods().iter().all(|f| f.is_moving()));

            let values: Vec<u32> = config.foods().iter().map(|f| f.value).collect();
            assert_eq!(values, vec![10, 20, 30, 50, 50]);

            for (i, food) in config.foods().iter().enumerate() {
                assert!(!snake.occupies(food.position));
                assert!(!config.obstacle_at(food.position));
                assert_eq!(config.food_at(food.position), Some(i));
            }
            for &obstacle in config.obstacles() {
                assert!(!snake.occupies(obstacle));
                assert!(manhattan(obstacle, snake.head()) >= 3);
            }
        }
    }

    #[test]
    fn test_time_bonus_clamped() {
        let mut config = enter(GameMode::Timed, 4);
        config.add_time_bonus();
        assert_eq!(config.time_remaining(), Some(60));

        config.set_time_remaining(50);
        config.add_time_bonus();
        assert_eq!(config.time_remaining(), Some(55));

        config.set_time_remaining(58);
        config.add_time_bonus();
        assert_eq!(config.time_remaining(), Some(60));
    }

    #[test]
    fn test_time_bonus_ignored_when_untimed() {
        let mut config = enter(GameMode::Classic, 5);
        config.add_time_bonus();
        assert_eq!(config.time_remaining(), None);
    }

    #[test]
    fn test_timer_ticks_once_per_second() {
        let mut config = enter(GameMode::Timed, 6);
        assert!(!config.tick_timer(Duration::from_millis(999)));
        assert_eq!(config.time_remaining(), Some(60));

        assert!(!config.tick_timer(Duration::from_millis(1000)));
        assert_eq!(config.time_remaining(), Some(59));

        // The next second is counted from the last tick
        assert!(!config.tick_timer(Duration::from_millis(1900)));
        assert_eq!(config.time_remaining(), Some(59));
        assert!(!config.tick_timer(Duration::from_millis(2000)));
        assert_eq!(config.time_remaining(), Some(58));
    }

    #[test]
    fn test_timer_keeps_leftover_time() {
        let mut config = enter(GameMode::Timed, 6);
        config.tick_timer(Duration::from_millis(1200));
        assert_eq!(config.time_remaining(), Some(59));

        // 800ms after the late tick is still a full second after the first boundary
        config.tick_timer(Duration::from_millis(2000));
        assert_eq!(config.time_remaining(), Some(58));
    }

    #[test]
    fn test_timer_expires() {
        let mut config = enter(GameMode::Timed, 7);
        config.set_time_remaining(1);
        assert!(config.tick_timer(Duration::from_secs(1)));
        assert_eq!(config.time_remaining(), Some(0));
    }

    #[test]
    fn test_drift_waits_for_interval() {
        let grid = Grid::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut config = enter(GameMode::MovingFruit, 8);
        let start = config.foods()[0].position;

        assert!(!config.drift_foods_if_due(Duration::from_millis(499), &grid, &mut rng));
        assert_eq!(config.foods()[0].position, start);

        assert!(config.drift_foods_if_due(Duration::from_millis(500), &grid, &mut rng));
        assert_eq!(manhattan(config.foods()[0].position, start), 1);

        assert!(!config.drift_foods_if_due(Duration::from_millis(900), &grid, &mut rng));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("classic".parse::<GameMode>(), Ok(GameMode::Classic));
        assert_eq!("Moving-Fruit".parse::<GameMode>(), Ok(GameMode::MovingFruit));
        assert_eq!("multi_fruit".parse::<GameMode>(), Ok(GameMode::MultiFruit));
        assert!("zen".parse::<GameMode>().is_err());
    }

    #[test]
    fn test_from_index() {
        assert_eq!(GameMode::from_index(0), GameMode::Classic);
        assert_eq!(GameMode::from_index(5), GameMode::Chaos);
        assert_eq!(GameMode::from_index(99), GameMode::Classic);
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_index(mode.index()), mode);
        }
    }
}
