//! This crate contains the library behind the mazerun game.
//!
//! The game core is terminal independent: [`generator`] produces braided mazes on a [`grid::Grid`],
//! [`movement`] resolves one tick of motion with grid collision and [`session::Session`] ties both
//! to a clock and the goal latch. The terminal shell around it ([`App`]) renders menus, a
//! raycast first-person view and a minimap with Ratatui.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod app;
pub mod config;
mod events;
pub mod generator;
pub mod grid;
pub mod intent;
pub mod logging;
pub mod movement;
pub mod pathfinding;
pub mod session;
mod types;
mod ui;
mod view;

pub use app::App;
pub use events::ReleaseReporting;
