//! The clock engine: time keeping and the alarm.
//!
//! [`Clock`] counts calls to [`Clock::tick`] and advances its [`Time`] by one second every
//! `ticks_per_second` calls. On every second it also evaluates the alarm, which is a small state
//! machine layered on a handful of flags:
//!
//! | State               | Armed | Ringing | Snoozed | Leaves when                        |
//! |---------------------|-------|---------|---------|------------------------------------|
//! | `Armed`             | yes   | no      | no      | current time equals the alarm time |
//! | `Ringing`           | yes   | yes     | no      | snooze or cancel                   |
//! | `Snoozed`           | yes   | no      | yes     | the snooze target is reached       |
//! | `CancelledForDay`   | yes   | no      | yes     | the alarm time is reached again    |
//!
//! Snoozing and cancelling differ only in the target that re-enables ringing: snoozing pushes
//! the target `snooze_seconds` past the previous target, cancelling anchors it back on the alarm
//! time, which recurs 24 hours later.
//!
//! Ringing is reported through an [`AlarmDriver`], which turns the physical indicator on and off.

use crate::time::{Time, TimeError};
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::{debug, info, trace, warn};

/// Side effects for the alarm sound or indicator.
pub trait AlarmDriver {
    /// Called when the alarm starts ringing.
    fn alarm_on(&mut self);
    /// Called when the alarm is snoozed or cancelled.
    fn alarm_off(&mut self);
}

impl<T: AlarmDriver + ?Sized> AlarmDriver for &mut T {
    fn alarm_on(&mut self) {
        (**self).alarm_on();
    }

    fn alarm_off(&mut self) {
        (**self).alarm_off();
    }
}

/// Clock engine configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Number of [`Clock::tick`] calls that make up one second (0 is treated as 1)
    pub ticks_per_second: u16,
    /// Seconds added to the ring time by [`Clock::snooze_alarm`]
    pub snooze_seconds: u16,
}

impl Default for Config {
    /// A 1 ms tick and a five minute snooze.
    fn default() -> Self {
        Config {
            ticks_per_second: 1000,
            snooze_seconds: 300,
        }
    }
}

/// The alarm state as derived from the engine flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    /// No alarm is set
    Disarmed,
    /// The alarm will ring when the current time reaches the alarm time
    Armed,
    /// The alarm is ringing
    Ringing,
    /// Ringing is suppressed until the snooze target is reached
    Snoozed,
    /// Ringing is suppressed until the alarm time comes round again
    CancelledForDay,
}

// Generates the increment/decrement pairs used by the adjustment screens.
macro_rules! adjust_field {
    ($(($name:ident, $field:ident, $unit:ident, $what:literal)),+ $(,)?) => {
        $(
            paste::paste! {
                #[doc = "Adds one to the " $what ", wrapping without carry."]
                pub fn [< increment_ $name >](&mut self) {
                    self.$field.[< increment_ $unit >]();
                }

                #[doc = "Subtracts one from the " $what ", wrapping without carry."]
                pub fn [< decrement_ $name >](&mut self) {
                    self.$field.[< decrement_ $unit >]();
                }
            }
        )+
    };
}

/// Clock engine with a single daily alarm.
pub struct Clock<D: AlarmDriver> {
    current: Time,
    time_valid: bool,
    ticks_per_second: u16,
    tick_count: u16,
    alarm: Time,
    alarm_armed: bool,
    ringing: bool,
    ringing_enabled: bool,
    snoozed: bool,
    cancelled: bool,
    snooze_seconds: u16,
    snooze_target: Time,
    driver: D,
}

impl<D: AlarmDriver> Clock<D> {
    /// Creates a clock with an invalid 00:00:00 time and a disarmed alarm.
    ///
    /// # Arguments
    /// * `config` - Tick rate and snooze length
    /// * `driver` - Receives the alarm on/off notifications
    pub const fn new(config: Config, driver: D) -> Self {
        Clock {
            current: Time::MIDNIGHT,
            time_valid: false,
            ticks_per_second: if config.ticks_per_second == 0 {
                1
            } else {
                config.ticks_per_second
            },
            tick_count: 0,
            alarm: Time::MIDNIGHT,
            alarm_armed: false,
            ringing: false,
            ringing_enabled: true,
            snoozed: false,
            cancelled: false,
            snooze_seconds: config.snooze_seconds,
            snooze_target: Time::MIDNIGHT,
            driver,
        }
    }

    /// The current time, whether or not it has ever been set.
    pub fn time(&self) -> Time {
        self.current
    }

    /// Returns `true` once a time has been set successfully.
    pub fn has_valid_time(&self) -> bool {
        self.time_valid
    }

    /// The current time if it has been set, `None` otherwise.
    pub fn valid_time(&self) -> Option<Time> {
        self.time_valid.then_some(self.current)
    }

    /// Sets the current time.
    ///
    /// # Returns
    /// * `Ok(())` when the time is valid; the clock is then marked valid
    /// * `Err(TimeError)` when the time is rejected; nothing changes
    pub fn set_time(&mut self, time: &Time) -> Result<(), TimeError> {
        if let Err(e) = time.check() {
            #[cfg(any(feature = "log", feature = "defmt"))]
            warn!("clock: rejected time {:?}: {:?}", time, e);
            return Err(e);
        }
        self.current = *time;
        self.time_valid = true;
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("clock: time set to {:?}", self.current);
        Ok(())
    }

    /// Counts one tick; every `ticks_per_second` ticks the alarm is evaluated and the time
    /// advances by one second.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        if self.tick_count < self.ticks_per_second {
            return;
        }
        self.tick_count = 0;

        if !self.snoozed {
            if self.ringing_enabled {
                if self.current == self.alarm && self.ring_alarm() {
                    #[cfg(any(feature = "log", feature = "defmt"))]
                    info!("clock: alarm ringing at {:?}", self.current);
                }
            } else {
                self.ringing = false;
            }
            self.snooze_target = self.alarm;
        } else if self.current == self.snooze_target {
            #[cfg(any(feature = "log", feature = "defmt"))]
            info!("clock: alarm ringing again at {:?}", self.current);
            self.ringing_enabled = true;
            self.ringing = true;
            self.snoozed = false;
            self.cancelled = false;
            self.driver.alarm_on();
        }

        self.current.tick_increment();
        #[cfg(any(feature = "log", feature = "defmt"))]
        trace!("clock: {:?}", self.current);
    }

    adjust_field!(
        (minutes, current, minutes, "minutes of the current time"),
        (hours, current, hours, "hours of the current time"),
        (alarm_minutes, alarm, minutes, "minutes of the alarm time"),
        (alarm_hours, alarm, hours, "hours of the alarm time"),
    );

    /// Sets and arms the alarm.
    ///
    /// The alarm is disarmed before validation, so a rejected time leaves it disarmed even if
    /// it was armed before.
    pub fn set_alarm(&mut self, time: &Time) -> Result<(), TimeError> {
        self.alarm_armed = false;
        if let Err(e) = time.check() {
            #[cfg(any(feature = "log", feature = "defmt"))]
            warn!("clock: rejected alarm {:?}: {:?}", time, e);
            return Err(e);
        }
        self.alarm = *time;
        self.snooze_target = self.alarm;
        self.alarm_armed = true;
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("clock: alarm armed for {:?}", self.alarm);
        Ok(())
    }

    /// The alarm time while the alarm is armed.
    pub fn alarm(&self) -> Option<Time> {
        self.alarm_armed.then_some(self.alarm)
    }

    /// The stored alarm time, armed or not.
    pub fn alarm_time(&self) -> Time {
        self.alarm
    }

    /// Returns `true` while the alarm is armed.
    pub fn is_alarm_activated(&self) -> bool {
        self.alarm_armed
    }

    /// Disarms the alarm, keeping the alarm time for a later re-arm.
    pub fn disable_alarm(&mut self) {
        self.alarm_armed = false;
    }

    /// Starts ringing if the alarm is armed.
    ///
    /// # Returns
    /// * `true` if the alarm is armed and now ringing
    /// * `false` otherwise, with no effect
    pub fn ring_alarm(&mut self) -> bool {
        if !self.alarm_armed {
            return false;
        }
        self.ringing = true;
        self.driver.alarm_on();
        true
    }

    /// Returns `true` while the alarm is ringing.
    pub fn is_alarm_ringing(&self) -> bool {
        self.ringing
    }

    /// Allows the alarm to ring on the next match.
    pub fn enable_ringing(&mut self) {
        self.ringing_enabled = true;
    }

    /// Forbids ringing; a ringing alarm is silenced on the next second.
    pub fn disable_ringing(&mut self) {
        self.ringing_enabled = false;
    }

    /// Returns `true` when the alarm may ring on a match.
    pub fn is_ringing_enabled(&self) -> bool {
        self.ringing_enabled
    }

    /// Silences the alarm for `snooze_seconds`.
    pub fn snooze_alarm(&mut self) {
        for _ in 0..self.snooze_seconds {
            self.snooze_target.tick_increment();
        }
        self.snoozed = true;
        self.cancelled = false;
        self.ringing_enabled = false;
        self.ringing = false;
        self.driver.alarm_off();
        #[cfg(any(feature = "log", feature = "defmt"))]
        info!("clock: alarm snoozed until {:?}", self.snooze_target);
    }

    /// Silences the alarm until the alarm time comes round again.
    pub fn cancel_alarm(&mut self) {
        self.snooze_target = self.alarm;
        self.snoozed = true;
        self.cancelled = true;
        self.ringing_enabled = false;
        self.ringing = false;
        self.driver.alarm_off();
        #[cfg(any(feature = "log", feature = "defmt"))]
        info!("clock: alarm cancelled until {:?}", self.snooze_target);
    }

    /// The time at which a snoozed or cancelled alarm rings again.
    pub fn snooze_target(&self) -> Time {
        self.snooze_target
    }

    /// The current alarm state.
    pub fn alarm_state(&self) -> AlarmState {
        if self.ringing {
            AlarmState::Ringing
        } else if !self.alarm_armed {
            AlarmState::Disarmed
        } else if self.snoozed && self.cancelled {
            AlarmState::CancelledForDay
        } else if self.snoozed {
            AlarmState::Snoozed
        } else {
            AlarmState::Armed
        }
    }

    /// Shared access to the alarm driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Exclusive access to the alarm driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Destroys the clock and returns the alarm driver.
    pub fn release(self) -> D {
        self.driver
    }
}
