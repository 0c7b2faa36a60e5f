//! This crate contains the source code for the binary for the game mazerun.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use std::io::stdout;

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use mazerun::{config::Cli, generator, logging, App, ReleaseReporting};
use ratatui::crossterm::terminal::supports_keyboard_enhancement;

fn main() -> Result<()> {
    install()?;

    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        logging::init(path)?;
    }

    if cli.print {
        let grid = generator::generate_seeded(cli.difficulty.size(), cli.seed);
        println!("{grid}");
        return Ok(());
    }

    let mut terminal = ratatui::init();
    let reporting = matches!(supports_keyboard_enhancement(), Ok(true))
        .then(|| ReleaseReporting::enable(stdout()).ok())
        .flatten();
    let releases = reporting.is_some();
    tracing::debug!(releases, "key release reporting");

    let result = App::new(cli.game_config())
        .with_release_events(releases)
        .run(&mut terminal);

    drop(reporting);
    ratatui::restore();

    result
}
