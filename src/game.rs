use std::{thread::sleep, time::{Duration, Instant}};

use crate::{TermCoords, TermInt};
use crate::term::TermManager;

use anyhow::{bail, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use crossterm::style::Color;
use rand::SeedableRng;
use rand::rngs::StdRng;
use snake_challenge::{FoodKind, GameMode, Phase, Session, Settings};
use snake_challenge::Direction::*;
use tracing::{info, warn};

const POLL_INTERVAL_MS: u64 = 5;

const SNAKE_BODY_CHAR: char = '█';
const OBSTACLE_CHAR: char = '▓';
const DEAD_SNAKE_CHAR: char = 'X';

// A grid cell is two terminal columns wide so the board comes out roughly square
const CELL_WIDTH: TermInt = 2;
// Row 0 holds the status line, the board border starts below it
const BOARD_TOP: TermInt = 1;

type Glyph = (char, Option<Color>);

const EMPTY: Glyph = (' ', None);

/// Where to go when a game is left.
enum Flow {
    PlayAgain,
    Menu,
    Quit,
}

pub struct SnakeGame {
    settings: Settings,
    paused: bool,
    term: TermManager,
    session: Session,
    /// Game clock; stands still while paused.
    clock: Duration,
}

impl SnakeGame {
    pub fn new(settings: Settings) -> Result<Self> {
        let term = TermManager::new()?;
        let session = Session::new(settings.grid(), settings.initial_length, StdRng::from_entropy())?;

        Ok(SnakeGame { settings, paused: false, term, session, clock: Duration::ZERO })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size();
        let (need_w, need_h) = self.board_size();
        if w < need_w || h < need_h + BOARD_TOP {
            bail!(
                "terminal is {}x{}, the {}x{} grid needs at least {}x{}",
                w, h, self.settings.grid_width, self.settings.grid_height, need_w, need_h + BOARD_TOP
            );
        }

        self.term.setup()?;
        Ok(())
    }

    pub fn restore(&mut self) {
        self.term.restore();
    }

    pub fn run(&mut self) -> Result<()> {
        let mut selected = self.settings.start_mode;

        loop {
            selected = match self.show_menu(selected)? {
                Some(mode) => mode,
                None => return Ok(()),
            };
            self.session.select_mode(selected, self.clock)?;

            loop {
                match self.play()? {
                    Flow::PlayAgain => self.session.reset_game(self.clock)?,
                    Flow::Menu => {
                        self.session.return_to_menu();
                        break;
                    },
                    Flow::Quit => return Ok(()),
                }
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_menu(&mut self, mut selected: GameMode) -> Result<Option<GameMode>> {
        self.term.clear()?;

        loop {
            let mut lines = vec![
                "SNAKE CHALLENGE".to_string(),
                String::new(),
                "Select a game mode:".to_string(),
                String::new(),
            ];
            for mode in GameMode::ALL {
                let marker = if mode == selected {'>'} else {' '};
                lines.push(format!(
                    "{} {}. {:<13} {:<40}",
                    marker, mode.index() + 1, mode.name(), mode.description()
                ));
            }
            lines.extend([
                String::new(),
                "Arrows + Enter or 1-6 to choose".to_string(),
                "In game: arrow keys or WASD to move, Esc to pause, M for the menu".to_string(),
                "CTRL+C to quit".to_string(),
            ]);

            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            self.term.show_message(&refs)?;

            let key_ev = self.term.read_key_blocking()?;
            if is_ctrl_c(&key_ev) {
                return Ok(None);
            }

            match key_ev.code {
                KeyCode::Char(c @ '1'..='6') => {
                    return Ok(Some(GameMode::from_index(c as usize - '1' as usize)));
                },
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(Some(selected)),
                KeyCode::Up | KeyCode::Char('w') => {
                    selected = GameMode::from_index((selected.index() + GameMode::ALL.len() - 1) % GameMode::ALL.len());
                },
                KeyCode::Down | KeyCode::Char('s') => {
                    selected = GameMode::from_index((selected.index() + 1) % GameMode::ALL.len());
                },
                _ => {}
            }
        }
    }

    fn play(&mut self) -> Result<Flow> {
        self.term.clear()?;
        let (board_w, board_h) = self.board_size();
        self.term.draw_borders((0, BOARD_TOP), (board_w, board_h))?;
        self.draw_board()?;

        let tick_interval = self.settings.tick_interval();
        let mut last_step = self.clock;
        let mut last_frame = Instant::now();
        self.paused = false;

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                match &key_ev {
                    ev if is_ctrl_c(ev) => return Ok(Flow::Quit),
                    KeyEvent { code, modifiers: _ } => match code {
                        KeyCode::Char('w') | KeyCode::Up => self.session.set_direction(Up),
                        KeyCode::Char('a') | KeyCode::Left => self.session.set_direction(Left),
                        KeyCode::Char('s') | KeyCode::Down => self.session.set_direction(Down),
                        KeyCode::Char('d') | KeyCode::Right => self.session.set_direction(Right),
                        KeyCode::Esc => self.toggle_pause()?,
                        KeyCode::Char('m') | KeyCode::Char('M') => return Ok(Flow::Menu),
                        _ => {}
                    }
                }
            }

            let frame = last_frame.elapsed();
            last_frame = Instant::now();
            if self.paused { continue; }

            // Not paused, run the clock til the next game step
            self.clock += frame;
            if self.clock - last_step < tick_interval {
                continue;
            }
            last_step = self.clock;

            let board_full = match self.session.step(self.clock) {
                Ok(_) => false,
                Err(err) => {
                    warn!(%err, "ending game");
                    true
                },
            };
            self.draw_board()?;

            if self.session.phase() == Phase::GameOver {
                return self.game_over(board_full);
            }
        } // Game loop
    }

    fn game_over(&mut self, board_full: bool) -> Result<Flow> {
        let score = self.session.score();
        info!(score, mode = self.session.mode().slug(), board_full, "game finished");

        let (headline, reason) = match self.session.snake().death() {
            Some(cause) if !board_full => ("Game over!", cause.describe()),
            _ => ("You won!", "The board is full"),
        };

        if !board_full {
            let body = self.session.snake().body().to_vec();
            for pos in body {
                if let Some(term_pos) = self.cell_origin(pos) {
                    self.term.print_colored_at(term_pos, DEAD_SNAKE_CHAR, Some(Color::Red))?;
                    self.term.print_colored_at((term_pos.0 + 1, term_pos.1), DEAD_SNAKE_CHAR, Some(Color::Red))?;
                }
            }
        }

        self.term.show_message(&[
            headline,
            reason,
            "",
            &*format!("Score: {}", score),
            "",
            "Press R or Enter to play again,",
            "M for the menu,",
            "or CTRL+C to quit."
        ])?;

        loop {
            let key_ev = self.term.read_key_blocking()?;
            if is_ctrl_c(&key_ev) {
                return Ok(Flow::Quit);
            }
            match key_ev.code {
                KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => return Ok(Flow::PlayAgain),
                KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Esc => return Ok(Flow::Menu),
                _ => {}
            }
        }
    }

    fn draw_board(&mut self) -> Result<()> {
        let grid = *self.session.grid();
        let width = grid.width() as usize;
        let mut cells = vec![EMPTY; grid.cell_count()];
        let mut put = |pos: (i16, i16), glyph: Glyph| {
            if grid.contains(pos) {
                cells[pos.1 as usize * width + pos.0 as usize] = glyph;
            }
        };

        for &obstacle in self.session.obstacles() {
            put(obstacle, (OBSTACLE_CHAR, Some(Color::DarkGrey)));
        }
        for food in self.session.foods() {
            put(food.position, ('●', Some(food_color(food.kind))));
        }

        let snake = self.session.snake();
        for &pos in snake.body().iter().skip(1) {
            put(pos, (SNAKE_BODY_CHAR, Some(Color::DarkGreen)));
        }
        put(snake.head(), (snake.head_char(), Some(Color::Green)));

        for (pos, &(ch, color)) in grid.cells().zip(cells.iter()) {
            if let Some(term_pos) = self.cell_origin(pos) {
                let second = if ch == SNAKE_BODY_CHAR || ch == OBSTACLE_CHAR {ch} else {' '};
                self.term.print_colored_at(term_pos, ch, color)?;
                self.term.print_colored_at((term_pos.0 + 1, term_pos.1), second, color)?;
            }
        }

        self.draw_status()?;
        self.term.flush()?;
        Ok(())
    }

    fn draw_status(&mut self) -> Result<()> {
        let mut status = format!(
            " SCORE: {}   {} MODE",
            self.session.score(),
            self.session.mode().name().to_uppercase()
        );
        if let (Some(secs), Some(max)) = (self.session.time_remaining(), self.session.config().max_time()) {
            status.push_str(&format!("   TIME: {}/{}s", secs, max));
        }

        let (board_w, _) = self.board_size();
        let padded = format!("{:<width$}", status, width = board_w as usize);
        self.term.print_str_at((0, 0), &padded)?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume,", "M for the menu,", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }

    /// Board size in terminal cells, border included.
    fn board_size(&self) -> TermCoords {
        let grid = self.settings.grid();
        (grid.width() as TermInt * CELL_WIDTH + 2, grid.height() as TermInt + 2)
    }

    /// Terminal position of the left column of a grid cell, if it is on the grid.
    fn cell_origin(&self, pos: (i16, i16)) -> Option<TermCoords> {
        if !self.session.grid().contains(pos) {
            return None;
        }
        Some((1 + pos.0 as TermInt * CELL_WIDTH, BOARD_TOP + 1 + pos.1 as TermInt))
    }
}

fn food_color(kind: FoodKind) -> Color {
    match kind {
        FoodKind::Regular => Color::Red,
        FoodKind::Bonus => Color::Yellow,
        FoodKind::Special => Color::Magenta,
        FoodKind::Rare => Color::Blue,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
