use chrono::{DateTime, Local};

/// Source of wall-clock time for the timer, swappable in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::cell::Cell;

    use chrono::{DateTime, Duration, Local, TimeZone};

    use super::Clock;

    /// Clock that only moves when told to.
    pub struct ManualClock {
        now: Cell<DateTime<Local>>,
    }

    impl ManualClock {
        pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
            let now = Local
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .earliest()
                .expect("test timestamp must exist in the local timezone");
            Self {
                now: Cell::new(now),
            }
        }

        pub fn advance(&self, seconds: i64) {
            self.now.set(self.now.get() + Duration::seconds(seconds));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            self.now.get()
        }
    }
}
