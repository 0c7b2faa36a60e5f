//! Event handling functions for user input and application state updates.

use std::{
    collections::HashMap,
    io::Write,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result;
use ratatui::crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    ExecutableCommand as _,
};
use tracing::warn;

use crate::{
    intent::Intent,
    types::{MainMenuItem, Screen},
    App,
};

/// Time a freshly pressed directional key counts as held when releases are not reported.
///
/// Terminals without the keyboard enhancement protocol only send repeated presses while a key is
/// down, and the first repeat follows the press after the keyboard's initial auto-repeat delay.
/// This window outlasts the usual delays of 250 to 660 ms.
pub(crate) const INITIAL_HOLD_WINDOW: Duration = Duration::from_millis(700);

/// Time a repeating directional key counts as held after its last repeat.
///
/// Once repeats arrive they come every few tens of milliseconds, so a short window releases the
/// key soon after it is let go.
pub(crate) const REPEAT_HOLD_WINDOW: Duration = Duration::from_millis(150);

/// Keyboard enhancement that makes the terminal report key releases while it is alive.
///
/// Dropping the guard pops the flags again, including while a panic unwinds out of the game loop,
/// so the shell is never left with enhanced key reporting.
#[derive(Debug)]
pub struct ReleaseReporting<W: Write> {
    /// Terminal output the flags were pushed to.
    writer: W,
}

impl<W: Write> ReleaseReporting<W> {
    /// Pushes the flag reporting key event types to `writer`.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn enable(mut writer: W) -> Result<Self> {
        let _ = writer.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        Ok(Self { writer })
    }
}

impl<W: Write> Drop for ReleaseReporting<W> {
    fn drop(&mut self) {
        if let Err(error) = self.writer.execute(PopKeyboardEnhancementFlags) {
            warn!(%error, "failed to pop keyboard enhancement flags");
        }
    }
}

/// Press history of one held directional key.
#[derive(Clone, Copy, Debug)]
struct Held {
    /// Instant of the most recent press or repeat.
    last_seen: Instant,
    /// Whether a second event arrived while the key was still held.
    repeating: bool,
}

impl Held {
    /// Returns how long the key stays held after its last event.
    const fn window(self) -> Duration {
        if self.repeating {
            REPEAT_HOLD_WINDOW
        } else {
            INITIAL_HOLD_WINDOW
        }
    }

    /// Returns whether the hold ran out at `now`.
    fn expired(self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) >= self.window()
    }
}

/// Bookkeeping for held directional keys.
///
/// This structure remembers when each directional intent was last pressed so that it can be
/// released on terminals that never send key release events. A key is first held for
/// [`INITIAL_HOLD_WINDOW`] to bridge the auto-repeat delay, then for [`REPEAT_HOLD_WINDOW`] after
/// each repeat.
#[derive(Debug, Default)]
pub(crate) struct KeyHold {
    /// Press history of each held intent.
    held: HashMap<Intent, Held>,
    /// Whether the terminal reports key releases.
    releases_reported: bool,
}

impl KeyHold {
    /// Creates an empty tracker.
    pub(crate) fn new(releases_reported: bool) -> Self {
        Self {
            held: HashMap::new(),
            releases_reported,
        }
    }

    /// Records a press or repeat of `intent` at `now`.
    ///
    /// An event arriving while the intent is still held switches it to the short repeat window.
    pub(crate) fn press(&mut self, intent: Intent, now: Instant) {
        let repeating = self
            .held
            .get(&intent)
            .is_some_and(|held| !held.expired(now));
        let _ = self.held.insert(
            intent,
            Held {
                last_seen: now,
                repeating,
            },
        );
    }

    /// Forgets `intent` after its key was released.
    pub(crate) fn release(&mut self, intent: Intent) {
        let _ = self.held.remove(&intent);
    }

    /// Forgets every held key.
    pub(crate) fn clear(&mut self) {
        self.held.clear();
    }

    /// Removes and returns the intents whose hold window ran out at `now`.
    ///
    /// Nothing ever expires when the terminal reports releases, since the release event is then
    /// authoritative.
    pub(crate) fn expire(&mut self, now: Instant) -> Vec<Intent> {
        if self.releases_reported {
            return Vec::new();
        }

        let expired: Vec<Intent> = self
            .held
            .iter()
            .filter(|(_, held)| held.expired(now))
            .map(|(intent, _)| *intent)
            .collect();
        for intent in &expired {
            let _ = self.held.remove(intent);
        }
        expired
    }
}

/// Handles input events and updates the application state accordingly.
///
/// This function waits up to `timeout` for a terminal event and then drains every event that is
/// already queued, dispatching each key to [`handle_key`]. Waiting with a timeout keeps the caller
/// free to run the fixed-rate simulation tick.
pub(crate) fn handle_events(app: &mut App, timeout: Duration) -> Result<()> {
    let mut wait = timeout;
    while event::poll(wait)? {
        if let Event::Key(key) = event::read()? {
            handle_key(app, key, Instant::now());
        }
        wait = Duration::ZERO;
    }

    Ok(())
}

/// Dispatches a single key event.
///
/// Menus react to presses only. The in-game screen also listens to repeats and releases so
/// directional keys can be held down.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if matches!(app.screen, Screen::InGame) {
        handle_game_key(app, key, now);
        return;
    }

    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.exit = true,
        KeyCode::Char('j') => handle_j_events(app),
        KeyCode::Char('k') => handle_k_events(app),
        KeyCode::Char('l') => handle_l_events(app),
        KeyCode::Char('h') => handle_h_events(app),
        _ => {}
    }
}

/// Maps arrow keys to the directional intent they drive.
const fn directional_intent(code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Up => Some(Intent::Advance),
        KeyCode::Down => Some(Intent::Retreat),
        KeyCode::Left => Some(Intent::TurnLeft),
        KeyCode::Right => Some(Intent::TurnRight),
        _ => None,
    }
}

/// Handles key events while a session is running.
///
/// Arrow keys assert and release directional intents. `m` toggles the minimap, space dismisses
/// the completion message, `h` leaves the session for the main menu and `q` or escape quits.
fn handle_game_key(app: &mut App, key: KeyEvent, now: Instant) {
    if let Some(intent) = directional_intent(key.code) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                app.intents.assert(intent);
                app.key_hold.press(intent, now);
            }
            KeyEventKind::Release => {
                app.intents.release(intent);
                app.key_hold.release(intent);
            }
        }
        return;
    }

    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('m') => app.intents.assert(Intent::ToggleMinimap),
        KeyCode::Char(' ') => app.intents.assert(Intent::DismissOverlay),
        KeyCode::Char('h') => handle_h_events(app),
        KeyCode::Char('q') | KeyCode::Esc => app.exit = true,
        _ => {}
    }
}

/// Releases directional intents whose hold window ran out at `now`.
pub(crate) fn expire_held_keys(app: &mut App, now: Instant) {
    for intent in app.key_hold.expire(now) {
        app.intents.release(intent);
    }
}

/// Handles 'j' key press events for downward navigation.
///
/// This function moves the cursor down in the main menu and towards harder mazes in the
/// difficulty menu.
pub(crate) fn handle_j_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::StartGame) => {
            app.screen = Screen::MainMenu(MainMenuItem::Quit);
        }
        Screen::DifficultyMenu(difficulty) => {
            app.screen = Screen::DifficultyMenu(difficulty.harder());
        }
        _ => {}
    }
}

/// Handles 'k' key press events for upward navigation.
///
/// This function moves the cursor up in the main menu and towards easier mazes in the difficulty
/// menu.
pub(crate) fn handle_k_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::Quit) => {
            app.screen = Screen::MainMenu(MainMenuItem::StartGame);
        }
        Screen::DifficultyMenu(difficulty) => {
            app.screen = Screen::DifficultyMenu(difficulty.easier());
        }
        _ => {}
    }
}

/// Handles 'l' key press events for selection and forward navigation.
///
/// This function confirms the highlighted item. Starting the game opens the difficulty menu with
/// the configured difficulty preselected, and confirming a difficulty generates a fresh maze.
pub(crate) fn handle_l_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::StartGame) => {
            app.screen = Screen::DifficultyMenu(app.config.difficulty);
        }
        Screen::MainMenu(MainMenuItem::Quit) => {
            app.exit = true;
        }
        Screen::DifficultyMenu(difficulty) => {
            app.start_session(difficulty);
        }
        Screen::InGame => {}
    }
}

/// Handles 'h' key press events for backward navigation.
///
/// This function returns from the difficulty menu to the main menu, and abandons a running session
/// when pressed in game.
pub(crate) fn handle_h_events(app: &mut App) {
    match app.screen {
        Screen::InGame => app.end_session(),
        Screen::DifficultyMenu(_) => {
            app.screen = Screen::MainMenu(MainMenuItem::StartGame);
        }
        Screen::MainMenu(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, GameConfig};
    use ratatui::crossterm::event::KeyModifiers;

    /// Escape sequence popping one entry off the keyboard enhancement stack.
    const POP_FLAGS: &[u8] = b"\x1b[<1u";

    #[test]
    fn test_release_reporting_pushes_and_pops_flags() {
        let mut output = Vec::new();

        let reporting = ReleaseReporting::enable(&mut output);
        assert!(reporting.is_ok(), "pushing the flags should succeed");
        drop(reporting);

        assert!(output.starts_with(b"\x1b[>"));
        assert!(output.ends_with(POP_FLAGS));
    }

    #[test]
    fn test_release_reporting_pops_flags_when_unwinding() {
        let mut output = Vec::new();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _reporting =
                ReleaseReporting::enable(&mut output).expect("pushing the flags should succeed");
            panic!("game loop failed");
        }));

        assert!(outcome.is_err());
        assert!(output.ends_with(POP_FLAGS));
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        let mut event = KeyEvent::new(code, KeyModifiers::NONE);
        event.kind = kind;
        event
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, key(code, KeyEventKind::Press), Instant::now());
    }

    fn seeded_app() -> App {
        App::new(GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_main_menu_navigation() {
        let mut app = App::default();

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::Quit));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::Quit));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::StartGame));
    }

    #[test]
    fn test_quit_from_menu_item() {
        let mut app = App::default();

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('l'));

        assert!(app.exit);
    }

    #[test]
    fn test_start_game_preselects_configured_difficulty() {
        let mut app = App::new(GameConfig {
            difficulty: Difficulty::Medium,
            ..GameConfig::default()
        });

        press(&mut app, KeyCode::Char('l'));

        assert_eq!(app.screen, Screen::DifficultyMenu(Difficulty::Medium));
    }

    #[test]
    fn test_difficulty_menu_flow() {
        let mut app = seeded_app();

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.screen, Screen::DifficultyMenu(Difficulty::Hard));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.screen, Screen::DifficultyMenu(Difficulty::Medium));

        press(&mut app, KeyCode::Char('l'));

        assert_eq!(app.screen, Screen::InGame);
        let session = app.session.as_ref().expect("session should be running");
        assert_eq!(session.grid().size(), Difficulty::Medium.size());
    }

    #[test]
    fn test_back_from_difficulty_menu() {
        let mut app = App::default();

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('h'));

        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::StartGame));
        assert!(app.session.is_none());
    }

    #[test]
    fn test_menus_ignore_releases() {
        let mut app = App::default();

        handle_key(
            &mut app,
            key(KeyCode::Char('j'), KeyEventKind::Release),
            Instant::now(),
        );

        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::StartGame));
    }

    #[test]
    fn test_arrow_keys_hold_and_release() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);

        press(&mut app, KeyCode::Up);
        assert!(app.intents.is_active(Intent::Advance));

        handle_key(
            &mut app,
            key(KeyCode::Up, KeyEventKind::Release),
            Instant::now(),
        );
        assert!(!app.intents.is_active(Intent::Advance));
    }

    #[test]
    fn test_first_press_outlasts_auto_repeat_delay() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);
        let pressed_at = Instant::now();

        handle_key(&mut app, key(KeyCode::Up, KeyEventKind::Press), pressed_at);
        expire_held_keys(&mut app, pressed_at + Duration::from_millis(300));
        assert!(app.intents.is_active(Intent::Advance));
        expire_held_keys(&mut app, pressed_at + Duration::from_millis(660));
        assert!(app.intents.is_active(Intent::Advance));

        expire_held_keys(&mut app, pressed_at + INITIAL_HOLD_WINDOW);
        assert!(!app.intents.is_active(Intent::Advance));
    }

    #[test]
    fn test_repeats_switch_to_short_hold_window() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);
        let pressed_at = Instant::now();
        let repeated_at = pressed_at + Duration::from_millis(500);

        handle_key(&mut app, key(KeyCode::Left, KeyEventKind::Press), pressed_at);
        handle_key(&mut app, key(KeyCode::Left, KeyEventKind::Press), repeated_at);
        expire_held_keys(&mut app, repeated_at + REPEAT_HOLD_WINDOW / 2);
        assert!(app.intents.is_active(Intent::TurnLeft));

        expire_held_keys(&mut app, repeated_at + REPEAT_HOLD_WINDOW);
        assert!(!app.intents.is_active(Intent::TurnLeft));
    }

    #[test]
    fn test_press_after_expiry_starts_a_new_hold() {
        let mut hold = KeyHold::new(false);
        let first = Instant::now();
        let second = first + INITIAL_HOLD_WINDOW * 2;

        hold.press(Intent::Retreat, first);
        hold.press(Intent::Retreat, second);

        assert!(hold.expire(second + REPEAT_HOLD_WINDOW).is_empty());
        assert_eq!(hold.expire(second + INITIAL_HOLD_WINDOW), vec![Intent::Retreat]);
    }

    #[test]
    fn test_held_keys_do_not_expire_when_releases_are_reported() {
        let mut hold = KeyHold::new(true);
        let now = Instant::now();

        hold.press(Intent::Advance, now);

        assert!(hold.expire(now + INITIAL_HOLD_WINDOW * 10).is_empty());
    }

    #[test]
    fn test_in_game_commands() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);

        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(
            app.intents.drain_commands(),
            vec![Intent::ToggleMinimap, Intent::DismissOverlay]
        );
    }

    #[test]
    fn test_leaving_a_session() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);
        press(&mut app, KeyCode::Right);

        press(&mut app, KeyCode::Char('h'));

        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::StartGame));
        assert!(app.session.is_none());
        assert!(!app.intents.is_active(Intent::TurnRight));
    }

    #[test]
    fn test_quit_in_game() {
        let mut app = seeded_app();
        app.start_session(Difficulty::Easy);

        press(&mut app, KeyCode::Esc);

        assert!(app.exit);
    }
}
