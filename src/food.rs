//! Food items, the per-slot value table, and the drift rule for moving fruit.

use crate::Coords;
use crate::grid::Grid;
use crate::snake::Direction;

use rand::Rng;
use rand::seq::SliceRandom;

/// Visual category of a food item. Higher categories are worth more.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Regular,
    Bonus,
    Special,
    Rare,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [FoodKind::Regular, FoodKind::Bonus, FoodKind::Special, FoodKind::Rare];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FoodKind::Regular => "Regular",
            FoodKind::Bonus => "Bonus",
            FoodKind::Special => "Special",
            FoodKind::Rare => "Rare",
        }
    }
}

/// Point value and category for a food slot.
///
/// The first four slots use fixed tiers; anything past that is worth
/// `10 * (slot + 1)` and cycles through the categories.
pub fn slot_reward(slot: usize) -> (u32, FoodKind) {
    match slot {
        0 => (10, FoodKind::Regular),
        1 => (20, FoodKind::Bonus),
        2 => (30, FoodKind::Special),
        3 => (50, FoodKind::Rare),
        i => (10 * (i as u32 + 1), FoodKind::ALL[i % 4]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Food {
    pub position: Coords,
    pub value: u32,
    pub kind: FoodKind,
    /// `Some` for moving fruit.
    pub heading: Option<Direction>,
}

impl Food {
    /// Creates the food for `slot` at `position`, with a random heading when it moves.
    pub fn for_slot<R: Rng + ?Sized>(slot: usize, position: Coords, moving: bool, rng: &mut R) -> Self {
        let (value, kind) = slot_reward(slot);
        let heading = if moving { Some(random_direction(rng)) } else { None };
        Food { position, value, kind, heading }
    }

    pub fn is_moving(&self) -> bool {
        self.heading.is_some()
    }

    /// Puts the food on a fresh cell. Moving fruit also gets a fresh heading.
    pub fn relocate<R: Rng + ?Sized>(&mut self, position: Coords, rng: &mut R) {
        self.position = position;
        if self.heading.is_some() {
            self.heading = Some(random_direction(rng));
        }
    }
}

pub(crate) fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

/// Moves every moving food one cell along its heading.
///
/// A food about to leave the grid first turns to a random heading that keeps it
/// on the grid. A food whose target holds an obstacle or another food stays
/// put and picks any new heading; it retries on the next drift. The snake is
/// not an obstacle here.
pub fn drift_foods<R: Rng + ?Sized>(foods: &mut [Food], obstacles: &[Coords], grid: &Grid, rng: &mut R) {
    for i in 0..foods.len() {
        let (pos, mut heading) = match foods[i].heading {
            Some(heading) => (foods[i].position, heading),
            None => continue,
        };

        let mut target = heading.step(pos);
        if !grid.contains(target) {
            let in_bounds: Vec<Direction> = Direction::ALL
                .iter()
                .copied()
                .filter(|d| grid.contains(d.step(pos)))
                .collect();

            match in_bounds.choose(rng) {
                Some(&d) => {
                    heading = d;
                    target = d.step(pos);
                }
                // 1x1 grid, nowhere to go
                None => continue,
            }
        }

        let blocked = obstacles.contains(&target)
            || foods.iter().enumerate().any(|(j, other)| j != i && other.position == target);

        if blocked {
            foods[i].heading = Some(random_direction(rng));
        } else {
            foods[i].position = target;
            foods[i].heading = Some(heading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn moving(position: Coords, heading: Direction) -> Food {
        Food { position, value: 10, kind: FoodKind::Regular, heading: Some(heading) }
    }

    #[test]
    fn test_slot_rewards() {
        assert_eq!(slot_reward(0), (10, FoodKind::Regular));
        assert_eq!(slot_reward(1), (20, FoodKind::Bonus));
        assert_eq!(slot_reward(2), (30, FoodKind::Special));
        assert_eq!(slot_reward(3), (50, FoodKind::Rare));
        // Fifth slot falls back to the formula
        assert_eq!(slot_reward(4), (50, FoodKind::Regular));
        assert_eq!(slot_reward(6), (70, FoodKind::Special));
    }

    #[test]
    fn test_for_slot_heading_only_when_moving() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let still = Food::for_slot(0, (1, 1), false, &mut rng);
        assert!(!still.is_moving());
        assert_eq!(still.value, 10);

        let mover = Food::for_slot(3, (1, 1), true, &mut rng);
        assert!(mover.is_moving());
        assert_eq!(mover.kind, FoodKind::Rare);
    }

    #[test]
    fn test_relocate_keeps_still_food_still() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut food = Food::for_slot(0, (1, 1), false, &mut rng);
        food.relocate((4, 4), &mut rng);
        assert_eq!(food.position, (4, 4));
        assert_eq!(food.heading, None);
    }

    #[test]
    fn test_drift_moves_one_cell() {
        let grid = Grid::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut foods = vec![moving((4, 4), Direction::Right)];

        drift_foods(&mut foods, &[], &grid, &mut rng);
        assert_eq!(foods[0].position, (5, 4));
        assert_eq!(foods[0].heading, Some(Direction::Right));
    }

    #[test]
    fn test_drift_ignores_still_food() {
        let grid = Grid::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut foods = vec![Food::for_slot(0, (4, 4), false, &mut rng)];

        drift_foods(&mut foods, &[], &grid, &mut rng);
        assert_eq!(foods[0].position, (4, 4));
    }

    #[test]
    fn test_drift_turns_at_wall() {
        let grid = Grid::new(10, 10);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut foods = vec![moving((9, 0), Direction::Right)];

            drift_foods(&mut foods, &[], &grid, &mut rng);
            let food = &foods[0];
            assert!(grid.contains(food.position));
            assert_eq!(food.position, food.heading.unwrap().step((9, 0)));
            assert!(matches!(food.heading, Some(Direction::Left) | Some(Direction::Down)));
        }
    }

    #[test]
    fn test_drift_blocked_by_obstacle() {
        let grid = Grid::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut foods = vec![moving((4, 4), Direction::Up)];

        drift_foods(&mut foods, &[(4, 3)], &grid, &mut rng);
        assert_eq!(foods[0].position, (4, 4));
        assert!(foods[0].is_moving());
    }

    #[test]
    fn test_drift_blocked_by_other_food() {
        let grid = Grid::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut foods = vec![
            moving((2, 2), Direction::Right),
            Food { position: (3, 2), value: 20, kind: FoodKind::Bonus, heading: None },
        ];

        drift_foods(&mut foods, &[], &grid, &mut rng);
        assert_eq!(foods[0].position, (2, 2));
        assert_eq!(foods[1].position, (3, 2));
    }

    #[test]
    fn test_drift_single_cell_grid() {
        let grid = Grid::new(1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut foods = vec![moving((0, 0), Direction::Left)];

        drift_foods(&mut foods, &[], &grid, &mut rng);
        assert_eq!(foods[0].position, (0, 0));
    }
}
