//! Random placement of food and obstacles onto free cells.
//!
//! Cells are found by rejection sampling with a bounded number of draws. If
//! the board is so crowded that every draw misses, the remaining free cells
//! are enumerated and one is chosen directly, so placement either succeeds or
//! reports [`PlacementError::Exhausted`]; it never spins.

use crate::Coords;
use crate::food::Food;
use crate::grid::{Grid, manhattan};
use crate::snake::Snake;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, warn};

/// Random draws before falling back to enumerating free cells.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1024;

/// Obstacles stay at least this Manhattan distance away from the snake head.
pub const OBSTACLE_HEAD_CLEARANCE: i16 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no free cell left for {what} on the {width}x{height} grid")]
    Exhausted { what: &'static str, width: i16, height: i16 },
}

/// Picks a uniformly random cell for which `is_blocked` is false.
pub fn find_free_cell<R, F>(rng: &mut R, grid: &Grid, what: &'static str, is_blocked: F) -> Result<Coords, PlacementError>
where
    R: Rng + ?Sized,
    F: Fn(Coords) -> bool,
{
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = grid.random_cell(rng);
        if !is_blocked(pos) {
            return Ok(pos);
        }
    }

    let choices: Vec<Coords> = grid.cells().filter(|pos| !is_blocked(*pos)).collect();
    warn!(what, free = choices.len(), "random placement missed, choosing from free cells");

    choices.choose(rng).copied().ok_or(PlacementError::Exhausted {
        what,
        width: grid.width(),
        height: grid.height(),
    })
}

/// A cell clear of the snake, every obstacle and every food in `foods`.
pub fn food_cell<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    snake: &Snake,
    obstacles: &[Coords],
    foods: &[Food],
) -> Result<Coords, PlacementError> {
    let pos = find_free_cell(rng, grid, "food", |pos| {
        snake.occupies(pos)
            || obstacles.contains(&pos)
            || foods.iter().any(|food| food.position == pos)
    })?;

    debug!(x = pos.0, y = pos.1, "placed food");
    Ok(pos)
}

/// Places `count` obstacles clear of the snake, the zone around its head,
/// each other and every food in `foods`.
pub fn place_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    count: usize,
    snake: &Snake,
    foods: &[Food],
) -> Result<Vec<Coords>, PlacementError> {
    let head = snake.head();
    let mut obstacles = Vec::with_capacity(count);

    for _ in 0..count {
        let pos = find_free_cell(rng, grid, "obstacle", |pos| {
            snake.occupies(pos)
                || manhattan(pos, head) < OBSTACLE_HEAD_CLEARANCE
                || obstacles.contains(&pos)
                || foods.iter().any(|food| food.position == pos)
        })?;
        obstacles.push(pos);
    }

    debug!(count, "placed obstacles");
    Ok(obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodKind;
    use crate::snake::Direction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn food_at(position: Coords) -> Food {
        Food { position, value: 10, kind: FoodKind::Regular, heading: None }
    }

    #[test]
    fn test_food_cell_avoids_everything() {
        let grid = Grid::new(12, 10);
        let snake = Snake::new((6, 5), 5, Direction::Right);
        let obstacles = vec![(0, 0), (11, 9), (3, 3), (8, 8)];
        let foods = vec![food_at((1, 1)), food_at((10, 2))];

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pos = food_cell(&mut rng, &grid, &snake, &obstacles, &foods).unwrap();
            assert!(grid.contains(pos));
            assert!(!snake.occupies(pos));
            assert!(!obstacles.contains(&pos));
            assert!(foods.iter().all(|f| f.position != pos));
        }
    }

    #[test]
    fn test_obstacles_keep_clear_of_head() {
        let grid = Grid::new(32, 24);
        let snake = Snake::new((8, 12), 3, Direction::Right);
        let foods = vec![food_at((20, 20))];

        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let obstacles = place_obstacles(&mut rng, &grid, 15, &snake, &foods).unwrap();
            assert_eq!(obstacles.len(), 15);
            for (i, &pos) in obstacles.iter().enumerate() {
                assert!(grid.contains(pos));
                assert!(!snake.occupies(pos));
                assert!(manhattan(pos, snake.head()) >= OBSTACLE_HEAD_CLEARANCE);
                assert_ne!(pos, (20, 20));
                assert!(!obstacles[i + 1..].contains(&pos));
            }
        }
    }

    #[test]
    fn test_dense_board_falls_back_to_last_free_cell() {
        // 3x1 grid, snake covers two cells: only (2, 0) is free
        let grid = Grid::new(3, 1);
        let snake = Snake::from_body(vec![(0, 0), (1, 0)], Direction::Left);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let pos = food_cell(&mut rng, &grid, &snake, &[], &[]).unwrap();
        assert_eq!(pos, (2, 0));
    }

    #[test]
    fn test_full_board_is_exhausted() {
        let grid = Grid::new(2, 2);
        let snake = Snake::from_body(vec![(0, 0), (1, 0), (1, 1), (0, 1)], Direction::Left);
        let mut rng = ChaCha8Rng::seed_from_u64(10);

        let err = food_cell(&mut rng, &grid, &snake, &[], &[]).unwrap_err();
        assert_eq!(err, PlacementError::Exhausted { what: "food", width: 2, height: 2 });
        assert_eq!(err.to_string(), "no free cell left for food on the 2x2 grid");
    }

    #[test]
    fn test_too_many_obstacles_is_exhausted() {
        let grid = Grid::new(5, 5);
        let snake = Snake::new((2, 2), 1, Direction::Right);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        // Clearance removes 13 cells around the head, leaving 12
        assert!(place_obstacles(&mut rng, &grid, 12, &snake, &[]).is_ok());
        let err = place_obstacles(&mut rng, &grid, 13, &snake, &[]).unwrap_err();
        assert!(matches!(err, PlacementError::Exhausted { what: "obstacle", .. }));
    }
}
