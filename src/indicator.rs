//! Alarm indicator on an `embedded-hal` output pin.
//!
//! [`AlarmIndicator`] drives an LED or buzzer from the clock's [`AlarmDriver`] notifications.
//! While the user is adjusting the alarm time the preview value may match the current time for
//! a moment; the indicator keeps the output off until the adjustment session is over.

use embedded_hal::digital::OutputPin;

use crate::app::AlarmGate;
use crate::clock::AlarmDriver;
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::{debug, warn};

/// An [`AlarmDriver`] that switches an output pin.
pub struct AlarmIndicator<O: OutputPin> {
    output: O,
    adjusting_alarm: bool,
}

impl<O: OutputPin> AlarmIndicator<O> {
    /// Creates the indicator; the output is not touched until the first notification.
    pub const fn new(output: O) -> Self {
        AlarmIndicator {
            output,
            adjusting_alarm: false,
        }
    }

    /// Returns `true` while turn-on notifications are suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.adjusting_alarm
    }

    /// Destroys the indicator and returns the output pin.
    pub fn release(self) -> O {
        self.output
    }
}

impl<O: OutputPin> AlarmDriver for AlarmIndicator<O> {
    fn alarm_on(&mut self) {
        if self.adjusting_alarm {
            #[cfg(any(feature = "log", feature = "defmt"))]
            debug!("indicator: alarm on suppressed while adjusting");
            return;
        }
        if self.output.set_high().is_err() {
            #[cfg(any(feature = "log", feature = "defmt"))]
            warn!("indicator: failed to switch on");
        }
    }

    fn alarm_off(&mut self) {
        if self.output.set_low().is_err() {
            #[cfg(any(feature = "log", feature = "defmt"))]
            warn!("indicator: failed to switch off");
        }
    }
}

impl<O: OutputPin> AlarmGate for AlarmIndicator<O> {
    fn set_adjusting_alarm(&mut self, adjusting: bool) {
        self.adjusting_alarm = adjusting;
    }
}
