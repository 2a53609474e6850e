//! Display helpers shared by the command line and the TUI.

/// `HH:MM:SS`, used for the live timer.
pub fn format_clock(seconds: i64) -> String {
    let total_seconds = seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `1h 30m`, used in reports.
pub fn format_hours_minutes(seconds: i64) -> String {
    let total_seconds = seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Money rounded to cents. The stored value is never rounded.
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{currency}{amount:.2}")
}

pub fn format_rate(rate: f64, currency: &str) -> String {
    format!("{currency}{rate:.2}/h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_each_part() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3661), "01:01:01");
        assert_eq!(format_clock(-5), "00:00:00");
        assert_eq!(format_clock(100 * 3600), "100:00:00");
    }

    #[test]
    fn hours_minutes_drops_seconds() {
        assert_eq!(format_hours_minutes(5399), "1h 29m");
        assert_eq!(format_hours_minutes(59), "0h 0m");
    }

    #[test]
    fn money_rounds_to_cents() {
        assert_eq!(format_money(75.0, "$"), "$75.00");
        assert_eq!(format_money(1.0 / 3.0, "€"), "€0.33");
        assert_eq!(format_rate(62.5, "$"), "$62.50/h");
    }
}
