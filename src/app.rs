//! Core application state and logic for the maze game.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use ratatui::DefaultTerminal;
use tracing::info;

use crate::{
    config::{Difficulty, GameConfig},
    events::{self, KeyHold},
    generator,
    intent::IntentSet,
    session::Session,
    types::{MainMenuItem, Screen},
    ui,
};

/// Application state container for the maze game.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui will render the game and Crossterm events will help writing to. It owns the running
/// [`Session`], if any, and drives it at the configured tick rate.
pub struct App {
    /// Application exit flag.
    ///
    /// This field indicates whether the application should exit. It is set to `true` when the user
    /// wants to quit the game but it starts off `false`.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    ///
    /// This field holds the current screen of the game. It is used to determine which screen to
    /// render and what actions to take based on user input.
    pub(crate) screen: Screen,
    /// Settings given on the command line.
    ///
    /// This field holds the preselected difficulty, the generator seed, the tick period and the
    /// movement rates handed to every new session.
    pub(crate) config: GameConfig,
    /// Currently running maze session.
    ///
    /// This field is `Some` exactly while the in-game screen is shown. Leaving the game drops the
    /// session along with its maze.
    pub(crate) session: Option<Session>,
    /// Intents asserted by the input layer.
    ///
    /// This field is filled by the event handlers and consumed by [`Session::tick`].
    pub(crate) intents: IntentSet,
    /// Tracker for held directional keys.
    ///
    /// This field releases directional intents on terminals that do not report key releases.
    pub(crate) key_hold: KeyHold,
}

impl Default for App {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl App {
    /// Creates a new instance of the App structure showing the main menu.
    ///
    /// The terminal is assumed not to report key releases. Use
    /// [`with_release_events`](App::with_release_events) when the keyboard enhancement protocol
    /// has been enabled.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            exit: false,
            screen: Screen::MainMenu(MainMenuItem::StartGame),
            config,
            session: None,
            intents: IntentSet::new(),
            key_hold: KeyHold::new(false),
        }
    }

    /// Sets whether the terminal reports key release events.
    ///
    /// When it does, held keys are released by their release events alone. Otherwise they expire
    /// shortly after the last press or repeat.
    #[must_use]
    pub fn with_release_events(mut self, reported: bool) -> Self {
        self.key_hold = KeyHold::new(reported);
        self
    }

    /// Runs the main loop of the application.
    ///
    /// This function redraws the interface, waits for input until the next tick is due and then
    /// advances the running session by the real time elapsed since the previous tick. The loop
    /// continues until the exit condition is `true`, after which the function returns to the call
    /// site.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut last_tick = Instant::now();

        while !self.exit {
            let _ = terminal
                .try_draw(|frame| ui::draw(self, frame).map_err(std::io::Error::other))?;

            let timeout = self.config.tick.saturating_sub(last_tick.elapsed());
            events::handle_events(self, timeout)?;

            let since = last_tick.elapsed();
            if since >= self.config.tick {
                last_tick = Instant::now();
                self.tick(since, last_tick);
            }
        }

        Ok(())
    }

    /// Advances the application by one scheduler tick of length `dt` ending at `now`.
    pub(crate) fn tick(&mut self, dt: Duration, now: Instant) {
        events::expire_held_keys(self, now);

        if let Some(session) = self.session.as_mut() {
            session.tick(&mut self.intents, dt);
        }
    }

    /// Generates a maze for `difficulty` and switches to the in-game screen.
    pub(crate) fn start_session(&mut self, difficulty: Difficulty) {
        let grid = generator::generate_seeded(difficulty.size(), self.config.seed);
        info!(
            ?difficulty,
            size = grid.size(),
            seed = self.config.seed,
            "starting session"
        );

        self.intents.clear();
        self.key_hold.clear();
        self.session = Some(Session::new(grid, self.config.movement));
        self.screen = Screen::InGame;
    }

    /// Drops the running session and returns to the main menu.
    pub(crate) fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                completed = session.is_complete(),
                ticks = session.ticks(),
                "leaving session"
            );
        }

        self.intents.clear();
        self.key_hold.clear();
        self.screen = Screen::MainMenu(MainMenuItem::StartGame);
    }
}
