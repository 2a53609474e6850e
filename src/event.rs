use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use crate::app::{App, AppEvent};

/// Waits up to `timeout` for a key press; anything else counts as a tick.
pub fn poll(timeout: Duration) -> Result<AppEvent> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(AppEvent::KeyPress(key.code));
            }
        }
    }
    Ok(AppEvent::Tick)
}

/// Runs the draw/poll loop until the app asks to quit.
pub fn run(app: &mut App, terminal: &mut crate::tui::Terminal) -> Result<()> {
    let tick_rate = Duration::from_millis(app.config.tick_millis);
    tracing::info!(tick_millis = app.config.tick_millis, "tui started");

    while app.running {
        terminal.draw(|frame| crate::ui::draw(frame, app))?;
        app.update(poll(tick_rate)?);
    }

    tracing::info!(state = app.tracker.timer.state().label(), "tui closed");
    Ok(())
}
