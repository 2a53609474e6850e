mod app;
mod cli;
mod clock;
mod color;
mod config;
mod error;
mod event;
mod export;
mod format;
mod logging;
mod report;
mod storage;
mod store;
mod tui;
mod types;
mod ui;

use std::rc::Rc;

use anyhow::Result;
use clap::Parser;

use crate::clock::SystemClock;
use crate::storage::KeyValueStore;
use crate::store::Tracker;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let (mut config, config_error) = match config::read_config() {
        Ok(config) => (config, None),
        Err(err) => (config::Config::default(), Some(err)),
    };
    if let Err(err) = logging::enable_logging(
        &logging::application_data_path(),
        config.log_level.as_deref(),
    ) {
        eprintln!("Logging disabled: {err}");
    }
    if let Some(err) = config_error {
        tracing::warn!("ignoring config file, using defaults: {err:#}");
    }

    let db_path = config::resolve_db_path(cli_opts.db);
    tracing::info!(db = %db_path.display(), "opening database");
    let kv: Rc<dyn KeyValueStore> = Rc::new(storage::init(&db_path)?);
    let mut tracker = Tracker::new(kv, Rc::new(SystemClock), config.report_options());

    if let Some(command) = cli_opts.command {
        return cli::run(command, &mut tracker, &mut config);
    }

    let mut app = app::App::new(tracker, config);
    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore(&mut terminal)?;

    result
}
