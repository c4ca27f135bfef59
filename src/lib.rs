//! A platform-agnostic alarm clock core for seven-segment clocks.
//!
//! The crate holds everything an alarm clock with a four-digit seven-segment screen, six keys
//! and an alarm indicator needs besides the hardware plumbing:
//!
//! - [`time`]: BCD time-of-day values with validation and digit arithmetic
//! - [`clock`]: the clock engine, keeping time from a periodic tick and running the alarm
//!   (armed, ringing, snoozed, cancelled for the day)
//! - [`button`]: edge and hold detection on `embedded-hal` input pins
//! - [`keys`]: the six-key pad and the key event set consumed by the application
//! - [`app`]: the application state machine that turns key presses into time and alarm
//!   adjustments and drives the screen
//! - [`indicator`]: an [`clock::AlarmDriver`] for an `embedded-hal` output pin
//! - [`shared`]: `critical-section` wrappers for running the clock and the keys in separate
//!   tasks or interrupts
//!
//! Hardware is only reached through `embedded-hal` 1.0 traits and the [`screen::Screen`] trait,
//! so the core runs unchanged on any HAL and in host tests.
//!
//! # Execution models
//!
//! With a single cooperative loop, call [`app::AlarmClock::poll`] once per period. With separate
//! tasks, let key tasks post into a [`keys::KeyEvents`], tick a [`shared::SharedClock`] from a
//! timer, and call [`app::App::step`] with the taken events.
//!
//! # Features
//!
//! - `log`: logging through the `log` crate
//! - `defmt`: logging through `defmt` and `defmt::Format` for the public data types
//! - `async`: key watcher tasks built on `embedded-hal-async` (see `asynch`)
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_clock::app::{self, AlarmClock};
//! use alarm_clock::clock::{self, Clock};
//! use alarm_clock::indicator::AlarmIndicator;
//! use alarm_clock::keys::Keypad;
//!
//! let clock = Clock::new(clock::Config::default(), AlarmIndicator::new(led));
//! let keypad = Keypad::new(pins, true)?;
//! let mut alarm_clock = AlarmClock::new(app::Config::default(), clock, keypad, screen);
//!
//! loop {
//!     wait_for_next_millisecond();
//!     alarm_clock.poll()?;
//! }
//! ```

#![no_std]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        #[allow(unused_imports)]
        pub(crate) use defmt::{debug, info, trace, warn};
    } else if #[cfg(feature = "log")] {
        #[allow(unused_imports)]
        pub(crate) use log::{debug, info, trace, warn};
    }
}

pub mod app;
#[cfg(feature = "async")]
pub mod asynch;
pub mod button;
pub mod clock;
pub mod indicator;
pub mod keys;
pub mod screen;
pub mod shared;
pub mod time;

pub use app::{AlarmClock, AlarmGate, App, AppState};
pub use clock::{AlarmDriver, AlarmState, Clock};
pub use keys::{Key, KeyEvents, KeyInputs, Keypad};
pub use screen::{Screen, ScreenError};
pub use time::{Time, TimeError};
