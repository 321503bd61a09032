mod game;
mod term;

use std::{fs::File, path::{Path, PathBuf}, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use snake_challenge::{GameMode, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub type TermInt = u16;
pub type TermCoords = (u16, u16);

#[derive(Parser, Debug)]
#[command(name = "snake_challenge")]
#[command(version, about = "Terminal Snake with six game modes", long_about = None)]
struct Cli {
    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mode highlighted in the menu: classic, timed, obstacles, moving-fruit, multi-fruit or chaos
    #[arg(long)]
    mode: Option<GameMode>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<i16>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<i16>,

    /// Milliseconds between snake moves
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Write logs to this file. Nothing is logged otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Settings file (or defaults) with the command line flags layered on top.
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(mode) = self.mode {
            settings.start_mode = mode;
        }
        if let Some(width) = self.width {
            settings.grid_width = width;
        }
        if let Some(height) = self.height {
            settings.grid_height = height;
        }
        if let Some(tick_ms) = self.tick_ms {
            settings.tick_interval_ms = tick_ms;
        }
        if let Some(log_file) = &self.log_file {
            settings.log_file = Some(log_file.clone());
        }

        settings.validate()?;
        Ok(settings)
    }
}

// The terminal belongs to the game, so logs can only go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snake_challenge=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    if let Some(path) = &settings.log_file {
        init_logging(path)?;
    }
    info!(?settings, "starting");

    let mut game = game::SnakeGame::new(settings)?;
    let result = game.initialize().and_then(|_| game.run());

    // Leave the terminal usable whatever happened in the game
    game.restore();
    result
}
