//! Wall-clock time for the shell, backed by `chrono::Local`.

use chrono::{Datelike, Local, Timelike};
use fat32_sim::clock::{Clock, ClockTime};

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ClockTime {
        let now = Local::now();
        ClockTime {
            year: now.year() as u16,
            month: now.month() as u8,
            day: now.day() as u8,
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            second: now.second() as u8,
        }
    }
}
