//! User interface rendering functions for all application screens.

use std::rc::Rc;

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::{
    config::Difficulty,
    grid::{Cell, Grid},
    movement,
    session::{format_clock, Session},
    types::{MainMenuItem, MenuType, Screen},
    view::FirstPersonView,
    App,
};

/// Colour of minimap walls.
const MINIMAP_WALL_COLOR: Color = Color::Rgb(153, 153, 204);

/// Length of the heading indicator drawn from the player on the minimap, in cells.
const HEADING_LINE_LENGTH: f64 = 1.5;

/// Width of the completion message box in terminal cells.
const OVERLAY_WIDTH: u16 = 44;

/// Height of the completion message box in terminal cells.
const OVERLAY_HEIGHT: u16 = 7;

/// Updates the application UI based on the persistent state.
///
/// This function renders different screens based on the current state stored in the [`App`]
/// structure, dispatching to the appropriate rendering function for each screen type.
///
/// # Errors
///
/// This function may return errors from drawing operations or data conversion failures.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => main_menu(frame, item),
        Screen::DifficultyMenu(difficulty) => difficulty_menu(frame, difficulty),
        Screen::InGame => in_game(app, frame)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function renders a clear widget over the entire area of the frame to prepare for
/// rendering new content without artifacts from previous buffers rendered on the same frame.
pub(crate) fn clear(frame: &mut Frame) {
    let clear = Clear;
    frame.render_widget(clear, frame.area());
}

/// Renders the generic layout structure for the main and difficulty menus.
///
/// This function creates the common layout and block structure used by both menus. The generic
/// part includes the centered positioning and border styling, while the specific menu content is
/// handled by the caller using the [`MenuType`] parameter.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn init_menu(frame: &mut Frame, menu: MenuType) -> Rc<[Rect]> {
    let space = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(40),
    ])
    .split(frame.area())[1];
    let space = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
    ])
    .split(space)[1];

    let layout = Layout::vertical([Constraint::Max(u16::from(menu.value() + 2))])
        .flex(Flex::Center)
        .split(space)[0];

    let block = Block::bordered()
        .title(menu.repr())
        .title_bottom(menu.hint())
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);

    frame.render_widget(block, layout);

    Layout::vertical(vec![Constraint::Max(1); menu.value().into()]).split(inner_space)
}

/// Renders a list of menu entries, highlighting the active one.
fn render_entries<'label, I>(frame: &mut Frame, areas: &[Rect], entries: I)
where
    I: IntoIterator<Item = (&'label str, bool)>,
{
    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    for (area, (label, active)) in areas.iter().zip(entries) {
        let style = if active {
            active_content_style
        } else {
            content_style
        };
        frame.render_widget(Line::raw(label).centered().style(style), *area);
    }
}

/// Renders the main menu screen with navigation options.
///
/// This function displays the main menu with options for "Start Game" and "Quit". It highlights
/// the currently selected option and provides visual feedback for user navigation.
pub(crate) fn main_menu(frame: &mut Frame, item: MainMenuItem) {
    clear(frame);

    let inner_layout = init_menu(frame, MenuType::MainMenu(2));

    render_entries(
        frame,
        &inner_layout,
        [
            ("Start Game", item == MainMenuItem::StartGame),
            ("Quit", item == MainMenuItem::Quit),
        ],
    );
}

/// Renders the difficulty menu screen.
///
/// This function displays one entry per [`Difficulty`] with its maze size and highlights the one
/// that will be generated when the player confirms.
pub(crate) fn difficulty_menu(frame: &mut Frame, selected: Difficulty) {
    clear(frame);

    let inner_layout = init_menu(frame, MenuType::DifficultyMenu(3));

    render_entries(
        frame,
        &inner_layout,
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| (difficulty.label(), difficulty == selected)),
    );
}

/// Renders the in-game screen.
///
/// This function draws the first-person view over the whole play area with the elapsed time on
/// top and the key help at the bottom. The minimap and the completion message are drawn over the
/// view when the session asks for them.
///
/// # Errors
///
/// This function may return errors if no session is running or if the maze is too large to be
/// laid out on a terminal.
pub(crate) fn in_game(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let session = app
        .session
        .as_ref()
        .ok_or_eyre("failed to retrieve running session")?;

    let overall_layout = Layout::vertical([
        Constraint::Length(1), // Status line
        Constraint::Min(1),    // First-person view
        Constraint::Length(1), // Tooltip line
    ])
    .split(frame.area());

    let status_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get status area from layout")?;
    let view_area = *overall_layout
        .get(1)
        .ok_or_eyre("failed to get view area from layout")?;
    let tooltip_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get tooltip area from layout")?;

    let grid = session.grid();
    let clock = format!("Time: {}", format_clock(session.elapsed()));
    let size = format!("Maze: {0}x{0}", grid.size());
    frame.render_widget(
        Line::raw(clock).left_aligned().style(Color::Green),
        status_area,
    );
    frame.render_widget(
        Line::raw(size).right_aligned().style(Color::Green),
        status_area,
    );

    frame.render_widget(FirstPersonView::new(grid, session.player()), view_area);

    if session.minimap_visible() {
        minimap(session, frame, view_area)?;
    }

    let tooltip_block = Block::bordered()
        .title("(arrows) move / (m) minimap / (h) return to menu / (q) quit")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);
    frame.render_widget(tooltip_block, tooltip_area);

    if session.overlay_visible() {
        completion_overlay(session, frame, view_area);
    }

    Ok(())
}

/// Converts a grid cell to minimap canvas coordinates, centred on the middle of the grid.
///
/// # Errors
///
/// This function may return errors if the grid is too large for the conversion.
pub(crate) fn to_canvas_coords(grid: &Grid, col: usize, row: usize) -> Result<(f64, f64)> {
    let (width, height) = grid.dimensions();
    let x = f64::from(u32::try_from(col)?) - (f64::from(u32::try_from(width)?) - 1.0) / 2.0;
    let y = (f64::from(u32::try_from(height)?) - 1.0) / 2.0 - f64::from(u32::try_from(row)?);
    Ok((x, y))
}

/// Returns the canvas bounds giving every terminal cell of `inner` one unit of width and two half
/// blocks of height.
fn minimap_bounds(inner: Rect) -> ([f64; 2], [f64; 2]) {
    let x_half = f64::from(inner.width) / 2.0;
    let y_half = f64::from(inner.height);
    ([-x_half, x_half], [-y_half, y_half])
}

/// Renders the minimap in the top-right corner of `area`.
///
/// Each grid cell takes one half-block, so the map keeps its square proportions. Walls, the
/// entrance and the exit are drawn as points; the player is a yellow point with a short line
/// along its heading. Nothing is drawn when the terminal is too small to hold the whole map.
fn minimap(session: &Session, frame: &mut Frame, area: Rect) -> Result<()> {
    let grid = session.grid();
    let (width, height) = grid.dimensions();
    let width = u16::try_from(width)?;
    let height = u16::try_from(rounded_div::i32(i32::try_from(height)?, 2))?;

    let map_area = Rect::new(
        area.right().saturating_sub(width + 2),
        area.y,
        width + 2,
        height + 2,
    );
    if map_area.intersection(area) != map_area {
        return Ok(());
    }

    let mut walls = Vec::new();
    for row in 0..grid.dimensions().1 {
        for col in 0..grid.dimensions().0 {
            if grid.cell_state(col, row) == Cell::Wall {
                walls.push(to_canvas_coords(grid, col, row)?);
            }
        }
    }
    let entrance = {
        let (col, row) = grid.entrance();
        to_canvas_coords(grid, col, row)?
    };
    let exit = {
        let (col, row) = grid.exit();
        to_canvas_coords(grid, col, row)?
    };

    let player = session.player();
    let (origin_x, origin_y) = to_canvas_coords(grid, 0, 0)?;
    let player_x = origin_x + f64::from(player.x);
    let player_y = origin_y - f64::from(player.z);
    let (forward_x, forward_z) = movement::forward_vector(player.heading);
    let tip_x = player_x + f64::from(forward_x) * HEADING_LINE_LENGTH;
    let tip_y = player_y - f64::from(forward_z) * HEADING_LINE_LENGTH;

    let block = Block::bordered()
        .title("MAZE MAP")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).bg(Color::Black))
        .border_type(BorderType::Rounded);
    let inner = block.inner(map_area);

    let (x_bounds, y_bounds) = minimap_bounds(inner);
    let map = Canvas::default()
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .marker(Marker::HalfBlock)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &walls,
                color: MINIMAP_WALL_COLOR,
            });
            ctx.draw(&Points {
                coords: &[entrance],
                color: Color::Green,
            });
            ctx.draw(&Points {
                coords: &[exit],
                color: Color::Red,
            });
            ctx.layer();
            ctx.draw(&CanvasLine {
                x1: player_x,
                y1: player_y,
                x2: tip_x,
                y2: tip_y,
                color: Color::Yellow,
            });
            ctx.draw(&Points {
                coords: &[(player_x, player_y)],
                color: Color::Yellow,
            });
        });

    frame.render_widget(Clear, map_area);
    frame.render_widget(block, map_area);
    frame.render_widget(map, inner);

    Ok(())
}

/// Renders the completion message centred in `area`.
fn completion_overlay(session: &Session, frame: &mut Frame, area: Rect) {
    let [vertical] = Layout::vertical([Constraint::Length(OVERLAY_HEIGHT)])
        .flex(Flex::Center)
        .areas(area);
    let [space] = Layout::horizontal([Constraint::Length(OVERLAY_WIDTH)])
        .flex(Flex::Center)
        .areas(vertical);

    let time = session
        .final_duration()
        .map_or_else(String::new, |duration| {
            format!("Time: {}", format_clock(duration))
        });
    let text = vec![
        Line::styled(
            "CONGRATULATIONS!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw("You successfully completed the maze!"),
        Line::raw(time),
        Line::raw(""),
        Line::raw("Press SPACE to continue"),
    ];

    let message = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::bordered()
            .style(Style::default().fg(Color::Yellow).bg(Color::Black))
            .border_type(BorderType::Double),
    );

    frame.render_widget(Clear, space);
    frame.render_widget(message, space);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        generator,
        intent::{Intent, IntentSet},
        movement::MovementConfig,
    };
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::Duration;

    /// Creates a minimal test app for UI testing.
    fn create_test_app() -> App {
        App::new(GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        })
    }

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 24);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Collects the rendered symbols of a buffer into one string.
    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    /// Creates a session on a one-cell maze, which is complete after its first tick.
    fn completed_session() -> Session {
        let mut session = Session::new(
            generator::generate_seeded(1, Some(0)),
            MovementConfig::default(),
        );
        session.tick(&mut IntentSet::new(), Duration::from_millis(16));
        assert!(session.overlay_visible());
        session
    }

    #[test]
    fn test_draw_main_menu() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.screen = Screen::MainMenu(MainMenuItem::StartGame);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing main menu should succeed");
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Start Game"));
        assert!(text.contains("Quit"));
    }

    #[test]
    fn test_draw_difficulty_menu() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.screen = Screen::DifficultyMenu(Difficulty::Medium);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing difficulty menu should succeed");
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Easy (10x10)"));
        assert!(text.contains("Medium (15x15)"));
        assert!(text.contains("Hard (20x20)"));
    }

    #[test]
    fn test_draw_in_game() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.start_session(Difficulty::Easy);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing in-game screen should succeed");
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Time: 00:00"));
        assert!(text.contains("Maze: 10x10"));
        assert!(text.contains("MAZE MAP"));
        assert!(!text.contains("CONGRATULATIONS!"));
    }

    #[test]
    fn test_in_game_without_session_error() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.screen = Screen::InGame;

        let result = terminal.draw(|frame| {
            let game_result = in_game(&app, frame);
            assert!(
                game_result.is_err(),
                "in-game should fail without a running session"
            );
        });

        assert!(
            result.is_ok(),
            "terminal drawing should succeed even if in_game fails"
        );
    }

    #[test]
    fn test_minimap_bounds_keep_one_unit_per_column() {
        let ([left, right], [bottom, top]) = minimap_bounds(Rect::new(3, 1, 17, 11));

        assert!((left + 8.5).abs() < f64::EPSILON);
        assert!((right - 8.5).abs() < f64::EPSILON);
        assert!((bottom + 11.0).abs() < f64::EPSILON);
        assert!((top - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hidden_minimap_is_not_drawn() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.start_session(Difficulty::Easy);
        app.intents.assert(Intent::ToggleMinimap);
        app.session
            .as_mut()
            .expect("session should be running")
            .tick(&mut app.intents, Duration::from_millis(16));

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok());
        assert!(!buffer_text(terminal.backend().buffer()).contains("MAZE MAP"));
    }

    #[test]
    fn test_minimap_skipped_on_tiny_terminal() {
        let mut app = create_test_app();
        let mut terminal =
            Terminal::new(TestBackend::new(12, 8)).expect("failed to create test terminal");
        app.start_session(Difficulty::Hard);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok());
        assert!(!buffer_text(terminal.backend().buffer()).contains("MAZE MAP"));
    }

    #[test]
    fn test_completion_overlay_is_drawn() {
        let mut app = create_test_app();
        let mut terminal = create_test_terminal();
        app.session = Some(completed_session());
        app.screen = Screen::InGame;

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok());
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("CONGRATULATIONS!"));
        assert!(text.contains("You successfully completed the maze!"));
        assert!(text.contains("Press SPACE to continue"));
    }

    #[test]
    fn test_clear_function() {
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            clear(frame);
        });

        assert!(result.is_ok(), "clearing screen should succeed");
    }

    #[test]
    fn test_init_menu_item_counts() {
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            let layout = init_menu(frame, MenuType::MainMenu(2));
            assert_eq!(layout.len(), 2, "main menu should have 2 items");
            let layout = init_menu(frame, MenuType::DifficultyMenu(3));
            assert_eq!(layout.len(), 3, "difficulty menu should have 3 items");
        });

        assert!(result.is_ok(), "initializing menus should succeed");
    }

    #[test]
    fn test_main_menu_quit_selected() {
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            main_menu(frame, MainMenuItem::Quit);
        });

        assert!(
            result.is_ok(),
            "rendering main menu with quit selected should succeed"
        );
    }

    #[test]
    fn test_canvas_coords_are_centred() {
        let grid = Grid::filled(3);

        assert_eq!(
            to_canvas_coords(&grid, 0, 0).expect("conversion should succeed"),
            (-2.0, 2.0)
        );
        assert_eq!(
            to_canvas_coords(&grid, 2, 2).expect("conversion should succeed"),
            (0.0, 0.0)
        );
        assert_eq!(
            to_canvas_coords(&grid, 4, 4).expect("conversion should succeed"),
            (2.0, -2.0)
        );
    }
}
