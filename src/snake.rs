use crate::Coords;
use crate::grid::Grid;
use Direction::*;
use MoveResult::*;

/// Hard cap on the number of body segments.
pub const MAX_SNAKE_LENGTH: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Right, Down, Left];

    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    /// Only unit cardinal vectors map to a direction.
    pub fn from_delta(dx: i16, dy: i16) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Up),
            (0, 1) => Some(Down),
            (-1, 0) => Some(Left),
            (1, 0) => Some(Right),
            _ => None,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Left, Right) | (Right, Left))
    }

    pub fn step(self, pos: Coords) -> Coords {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }
}

/// Why a run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeathCause {
    OutOfBounds,
    SelfCollision,
    ObstacleCollision,
    TimeUp,
}

impl DeathCause {
    pub fn describe(self) -> &'static str {
        match self {
            DeathCause::OutOfBounds => "Hit the wall",
            DeathCause::SelfCollision => "Bit your own tail",
            DeathCause::ObstacleCollision => "Crashed into an obstacle",
            DeathCause::TimeUp => "Out of time",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coords },
    Crashed(DeathCause)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Coords>,
    direction: Direction,
    next_direction: Direction,
    death: Option<DeathCause>,
}

impl Snake {
    /// Builds a straight snake with its head at `head`, trailing away from `direction`.
    pub fn new(head: Coords, size: usize, direction: Direction) -> Self {
        let size = size.clamp(1, MAX_SNAKE_LENGTH);
        let (dx, dy) = direction.delta();

        let body = (0..size as i16)
            .map(|i| (head.0 - dx * i, head.1 - dy * i))
            .collect();
        Snake::from_body(body, direction)
    }

    /// Takes an explicit body, head first. Extra segments past the cap are dropped.
    pub fn from_body(mut body: Vec<Coords>, direction: Direction) -> Self {
        body.truncate(MAX_SNAKE_LENGTH);
        if body.is_empty() {
            body.push((0, 0));
        }
        let mut segments = Vec::with_capacity(MAX_SNAKE_LENGTH);
        segments.extend(body);

        Snake { body: segments, direction, next_direction: direction, death: None }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn death(&self) -> Option<DeathCause> {
        self.death
    }

    /// The direction the snake moved on its last step.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The direction the next `advance` will use.
    pub fn pending_direction(&self) -> Direction {
        self.next_direction
    }

    /// Shifts the trail one cell and moves the head. The snake dies if the head
    /// leaves `grid` or lands on its own body.
    pub fn advance(&mut self, grid: &Grid) -> MoveResult {
        if let Some(cause) = self.death {
            return Crashed(cause);
        }

        self.direction = self.next_direction;

        let new_head = self.direction.step(self.head());

        // body[i] takes body[i - 1]; the old tail wraps to the front and is overwritten
        self.body.rotate_right(1);
        self.body[0] = new_head;

        if !grid.contains(new_head) {
            self.kill(DeathCause::OutOfBounds);
            return Crashed(DeathCause::OutOfBounds);
        }

        if self.body[1..].contains(&new_head) {
            self.kill(DeathCause::SelfCollision);
            return Crashed(DeathCause::SelfCollision);
        }

        Moved { new_head }
    }

    /// Buffers a turn for the next step. Reversing onto the current axis is ignored.
    pub fn set_direction(&mut self, new_direction: Direction) {
        if !new_direction.is_opposite(self.direction) {
            self.next_direction = new_direction;
        }
    }

    /// Duplicates the tail segment; the copy is pulled into the trail on the next step.
    pub fn grow(&mut self) {
        if self.body.len() < MAX_SNAKE_LENGTH {
            let tail = self.body[self.body.len() - 1];
            self.body.push(tail);
        }
    }

    /// The first recorded cause sticks.
    pub fn kill(&mut self, cause: DeathCause) {
        if self.death.is_none() {
            self.death = Some(cause);
        }
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
