//! BCD time-of-day values for the clock engine.
//!
//! A [`Time`] stores a wall-clock time as six decimal digits, one per field, exactly as they
//! are shown on a seven-segment screen: hours tens/units, minutes tens/units and seconds
//! tens/units. All arithmetic works digit by digit so that the value never has to be converted
//! to a binary representation and back on every refresh.
//!
//! # Validity
//!
//! A time is valid when every digit is in `0..=9` and the two-digit fields satisfy
//! `00 <= HH <= 23`, `00 <= MM <= 59` and `00 <= SS <= 59`. The clock engine only ever stores
//! valid values; the adjustment helpers below assume a valid input and keep it valid.
//!
//! # Error Handling
//!
//! Validation failures are reported via [`TimeError`].

use core::fmt;

use chrono::{NaiveTime, Timelike};

/// A time of day in BCD form (one decimal digit per field).
///
/// Fields are declared from the most significant digit down, so the derived ordering of two
/// valid times is chronological.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// Tens of hours (0-2)
    pub hours_tens: u8,
    /// Units of hours (0-9, 0-3 when the tens are 2)
    pub hours_units: u8,
    /// Tens of minutes (0-5)
    pub minutes_tens: u8,
    /// Units of minutes (0-9)
    pub minutes_units: u8,
    /// Tens of seconds (0-5)
    pub seconds_tens: u8,
    /// Units of seconds (0-9)
    pub seconds_units: u8,
}

/// Errors reported when a [`Time`] fails validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// One of the six digits is not a decimal digit (greater than 9)
    InvalidDigit,
    /// Hours are not in 00-23
    HoursOutOfRange,
    /// Minutes are not in 00-59
    MinutesOutOfRange,
    /// Seconds are not in 00-59
    SecondsOutOfRange,
}

impl Time {
    /// 00:00:00, the value a freshly created clock starts from.
    pub const MIDNIGHT: Time = Time::from_bcd([0; 6]);

    /// Builds a time from six BCD digits in display order (`[H, H, M, M, S, S]`).
    ///
    /// No validation is performed; use [`Time::check`] before storing the value.
    pub const fn from_bcd(digits: [u8; 6]) -> Self {
        Time {
            hours_tens: digits[0],
            hours_units: digits[1],
            minutes_tens: digits[2],
            minutes_units: digits[3],
            seconds_tens: digits[4],
            seconds_units: digits[5],
        }
    }

    /// Returns the six digits in display order (`[H, H, M, M, S, S]`).
    pub const fn to_bcd(&self) -> [u8; 6] {
        [
            self.hours_tens,
            self.hours_units,
            self.minutes_tens,
            self.minutes_units,
            self.seconds_tens,
            self.seconds_units,
        ]
    }

    /// Returns the `HHMM` digits shown on a four-digit screen.
    pub const fn display_digits(&self) -> [u8; 4] {
        [
            self.hours_tens,
            self.hours_units,
            self.minutes_tens,
            self.minutes_units,
        ]
    }

    /// Builds a time from numeric hours, minutes and seconds.
    ///
    /// # Returns
    /// * `Ok(Time)` when every field is in range
    /// * `Err(TimeError)` naming the first field that is out of range
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, TimeError> {
        let (hours_tens, hours_units) = make_bcd(hours, 23, TimeError::HoursOutOfRange)?;
        let (minutes_tens, minutes_units) = make_bcd(minutes, 59, TimeError::MinutesOutOfRange)?;
        let (seconds_tens, seconds_units) = make_bcd(seconds, 59, TimeError::SecondsOutOfRange)?;
        Ok(Time {
            hours_tens,
            hours_units,
            minutes_tens,
            minutes_units,
            seconds_tens,
            seconds_units,
        })
    }

    /// Numeric value of the hours field.
    pub const fn hours(&self) -> u8 {
        self.hours_tens * 10 + self.hours_units
    }

    /// Numeric value of the minutes field.
    pub const fn minutes(&self) -> u8 {
        self.minutes_tens * 10 + self.minutes_units
    }

    /// Numeric value of the seconds field.
    pub const fn seconds(&self) -> u8 {
        self.seconds_tens * 10 + self.seconds_units
    }

    /// Checks that the value is a canonical time of day.
    pub fn check(&self) -> Result<(), TimeError> {
        if self.to_bcd().iter().any(|&digit| digit > 9) {
            return Err(TimeError::InvalidDigit);
        }
        if self.hours() > 23 {
            return Err(TimeError::HoursOutOfRange);
        }
        if self.minutes() > 59 {
            return Err(TimeError::MinutesOutOfRange);
        }
        if self.seconds() > 59 {
            return Err(TimeError::SecondsOutOfRange);
        }
        Ok(())
    }

    /// Returns `true` when [`Time::check`] passes.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Adds one minute without touching the hours: 59 wraps to 00.
    pub fn increment_minutes(&mut self) {
        if self.minutes_units < 9 {
            self.minutes_units += 1;
        } else {
            self.minutes_units = 0;
            if self.minutes_tens < 5 {
                self.minutes_tens += 1;
            } else {
                self.minutes_tens = 0;
            }
        }
    }

    /// Subtracts one minute without touching the hours: 00 wraps to 59.
    pub fn decrement_minutes(&mut self) {
        if self.minutes_units > 0 {
            self.minutes_units -= 1;
        } else {
            self.minutes_units = 9;
            if self.minutes_tens > 0 {
                self.minutes_tens -= 1;
            } else {
                self.minutes_tens = 5;
            }
        }
    }

    /// Adds one hour: 09 -> 10, 19 -> 20, 23 -> 00.
    pub fn increment_hours(&mut self) {
        if self.hours_tens < 2 {
            if self.hours_units < 9 {
                self.hours_units += 1;
            } else {
                self.hours_units = 0;
                self.hours_tens += 1;
            }
        } else if self.hours_units < 3 {
            self.hours_units += 1;
        } else {
            self.hours_tens = 0;
            self.hours_units = 0;
        }
    }

    /// Subtracts one hour: 10 -> 09, 20 -> 19, 00 -> 23.
    pub fn decrement_hours(&mut self) {
        if self.hours_tens > 0 {
            if self.hours_units > 0 {
                self.hours_units -= 1;
            } else {
                self.hours_units = 9;
                self.hours_tens -= 1;
            }
        } else if self.hours_units > 0 {
            self.hours_units -= 1;
        } else {
            self.hours_tens = 2;
            self.hours_units = 3;
        }
    }

    /// Advances the time by exactly one second, carrying into minutes and hours.
    ///
    /// 23:59:59 becomes 00:00:00.
    pub fn tick_increment(&mut self) {
        if self.seconds_units < 9 {
            self.seconds_units += 1;
            return;
        }
        self.seconds_units = 0;
        if self.seconds_tens < 5 {
            self.seconds_tens += 1;
            return;
        }
        self.seconds_tens = 0;
        if self.minutes_units < 9 {
            self.minutes_units += 1;
            return;
        }
        self.minutes_units = 0;
        if self.minutes_tens < 5 {
            self.minutes_tens += 1;
            return;
        }
        self.minutes_tens = 0;
        if self.hours_units < 9 {
            self.hours_units += 1;
        } else {
            self.hours_units = 0;
            self.hours_tens += 1;
        }
        if self.hours_tens == 2 && self.hours_units == 4 {
            *self = Time::MIDNIGHT;
        }
    }
}

/// Splits `value` into (tens, units), rejecting anything above `max_value`.
fn make_bcd(value: u8, max_value: u8, error: TimeError) -> Result<(u8, u8), TimeError> {
    if value > max_value {
        return Err(error);
    }
    Ok((value / 10, value % 10))
}

impl From<[u8; 6]> for Time {
    fn from(digits: [u8; 6]) -> Self {
        Time::from_bcd(digits)
    }
}

impl From<&Time> for [u8; 6] {
    fn from(time: &Time) -> [u8; 6] {
        time.to_bcd()
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        // Timelike fields are already range checked, leap seconds fold into :59
        let digits = |v: u32| ((v / 10) as u8, (v % 10) as u8);
        let (hours_tens, hours_units) = digits(time.hour());
        let (minutes_tens, minutes_units) = digits(time.minute());
        let (seconds_tens, seconds_units) = digits(time.second().min(59));
        Time {
            hours_tens,
            hours_units,
            minutes_tens,
            minutes_units,
            seconds_tens,
            seconds_units,
        }
    }
}

impl TryFrom<Time> for NaiveTime {
    type Error = TimeError;

    fn try_from(time: Time) -> Result<Self, Self::Error> {
        time.check()?;
        NaiveTime::from_hms_opt(
            u32::from(time.hours()),
            u32::from(time.minutes()),
            u32::from(time.seconds()),
        )
        .ok_or(TimeError::InvalidDigit)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}:{}{}",
            self.hours_tens,
            self.hours_units,
            self.minutes_tens,
            self.minutes_units,
            self.seconds_tens,
            self.seconds_units
        )
    }
}
