mod state;

use crossterm::event::KeyCode;

pub use state::{App, ConfirmPopup, NewProjectPopup, ProjectField};

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Timer,
    Projects,
    Reports,
    Sessions,
    Help,
}

pub const TABS: [AppView; 5] = [
    AppView::Timer,
    AppView::Projects,
    AppView::Reports,
    AppView::Sessions,
    AppView::Help,
];

impl AppView {
    pub fn title(self) -> &'static str {
        match self {
            AppView::Timer => "Timer",
            AppView::Projects => "Projects",
            AppView::Reports => "Reports",
            AppView::Sessions => "Sessions",
            AppView::Help => "Help",
        }
    }
}
