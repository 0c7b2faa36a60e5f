//! Command-line configuration.
//!
//! This module contains the [`Cli`] parser and the [`Difficulty`] presets. Values are validated at
//! parse time, so the rest of the game can take them as given.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::movement::MovementConfig;

/// Maze size presets.
///
/// This enumeration holds the three difficulty levels offered to the player. Each maps to the
/// playable size handed to the maze generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    /// 10 × 10 maze.
    #[default]
    Easy,
    /// 15 × 15 maze.
    Medium,
    /// 20 × 20 maze.
    Hard,
}

impl Difficulty {
    /// Every difficulty, from easiest to hardest.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Returns the playable maze size for this difficulty.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Easy => 10,
            Self::Medium => 15,
            Self::Hard => 20,
        }
    }

    /// Returns the menu label for this difficulty.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy (10x10)",
            Self::Medium => "Medium (15x15)",
            Self::Hard => "Hard (20x20)",
        }
    }

    /// Returns the next harder difficulty, staying at the hardest.
    #[must_use]
    pub const fn harder(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium | Self::Hard => Self::Hard,
        }
    }

    /// Returns the next easier difficulty, staying at the easiest.
    #[must_use]
    pub const fn easier(self) -> Self {
        match self {
            Self::Easy | Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
        }
    }
}

/// Command-line interface of the game.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Difficulty preselected in the difficulty menu.
    #[arg(short, long, value_enum, default_value_t = Difficulty::Easy)]
    pub difficulty: Difficulty,

    /// Seed for the maze generator. Mazes are random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scheduler tick period in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub tick_ms: u64,

    /// Movement speed in maze cells per second.
    #[arg(long, default_value_t = 3.125, value_parser = parse_rate)]
    pub speed: f32,

    /// Turning speed in degrees per second.
    #[arg(long, default_value_t = 187.5, value_parser = parse_rate)]
    pub turn_rate: f32,

    /// Write logs to this file. Logging is disabled when omitted.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print one generated maze for the chosen difficulty and exit.
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    /// Returns the game configuration described by the parsed arguments.
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            difficulty: self.difficulty,
            seed: self.seed,
            tick: Duration::from_millis(self.tick_ms),
            movement: MovementConfig {
                speed: self.speed,
                turn_rate: self.turn_rate,
            },
        }
    }
}

/// Settings the application needs to start and run sessions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    /// Difficulty preselected in the difficulty menu.
    pub difficulty: Difficulty,
    /// Optional generator seed.
    pub seed: Option<u64>,
    /// Scheduler tick period.
    pub tick: Duration,
    /// Per-second movement rates.
    pub movement: MovementConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: None,
            tick: Duration::from_millis(16),
            movement: MovementConfig::default(),
        }
    }
}

/// Parses a strictly positive, finite rate.
fn parse_rate(input: &str) -> Result<f32, String> {
    let value: f32 = input
        .parse()
        .map_err(|err| format!("`{input}` is not a number: {err}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("`{input}` must be a positive number"))
    }
}
