use ratatui::style::Color;

/// Colors shared by every view
pub struct Theme;

impl Theme {
    /// Primary branding color
    pub fn primary() -> Color {
        Color::Magenta
    }

    /// Secondary/border color
    pub fn secondary() -> Color {
        Color::Cyan
    }

    /// Earnings
    pub fn success() -> Color {
        Color::Green
    }

    /// Running timer
    pub fn active() -> Color {
        Color::LightGreen
    }

    /// Paused timer and status messages
    pub fn warn() -> Color {
        Color::Yellow
    }

    /// Selection/highlight
    pub fn highlight() -> Color {
        Color::Cyan
    }

    /// Selection marker/arrow
    pub fn selection_marker() -> Color {
        Color::Green
    }

    /// Dimmed/inactive text
    pub fn dim() -> Color {
        Color::DarkGray
    }

    /// Normal text
    pub fn text() -> Color {
        Color::White
    }

    /// Accent for numbers/counts
    pub fn accent() -> Color {
        Color::LightBlue
    }
}
