//! Edge and hold detection for push-button keys.
//!
//! [`DigitalInput`] wraps an `embedded-hal` input pin, normalises inverted (active-low) wiring
//! and reports transitions between two samples. [`Button`] adds a hold timer on top of it.
//!
//! Neither type debounces: they are meant to be sampled from a periodic task, and the sampling
//! period already filters contact bounce for the keys of a clock.

use embedded_hal::digital::InputPin;
use fugit::MillisDurationU32;

/// Transition seen between two samples of a [`DigitalInput`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Change {
    /// The input went from inactive to active
    Activated,
    /// The input went from active to inactive
    Deactivated,
    /// The input kept its state
    None,
}

/// A digital input with edge detection.
pub struct DigitalInput<P: InputPin> {
    pin: P,
    inverted: bool,
    last_state: bool,
}

impl<P: InputPin> DigitalInput<P> {
    /// Creates the input and samples its current state as the baseline.
    ///
    /// # Arguments
    /// * `pin` - The input pin
    /// * `inverted` - `true` when the pin reads low while the key is pressed
    pub fn new(mut pin: P, inverted: bool) -> Result<Self, P::Error> {
        let last_state = pin.is_high()? != inverted;
        Ok(DigitalInput {
            pin,
            inverted,
            last_state,
        })
    }

    /// Reads the pin, `true` meaning pressed.
    pub fn is_active(&mut self) -> Result<bool, P::Error> {
        Ok(self.pin.is_high()? != self.inverted)
    }

    /// Samples the pin and compares it with the previous sample.
    ///
    /// The sample becomes the new baseline, so calling this again without a real change
    /// returns [`Change::None`].
    pub fn has_changed(&mut self) -> Result<Change, P::Error> {
        let current = self.is_active()?;
        let change = match (self.last_state, current) {
            (false, true) => Change::Activated,
            (true, false) => Change::Deactivated,
            _ => Change::None,
        };
        self.last_state = current;
        Ok(change)
    }

    /// Returns `true` if the input became active since the last sample.
    pub fn was_activated(&mut self) -> Result<bool, P::Error> {
        Ok(self.has_changed()? == Change::Activated)
    }

    /// Returns `true` if the input became inactive since the last sample.
    pub fn was_deactivated(&mut self) -> Result<bool, P::Error> {
        Ok(self.has_changed()? == Change::Deactivated)
    }

    /// Destroys the input and returns the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

/// A push button with press and hold detection.
pub struct Button<P: InputPin> {
    input: DigitalInput<P>,
    held_ms: u32,
    hold_reported: bool,
}

impl<P: InputPin> Button<P> {
    /// Creates a button on `pin`; `inverted` is `true` for active-low wiring.
    pub fn new(pin: P, inverted: bool) -> Result<Self, P::Error> {
        Ok(Self::from_input(DigitalInput::new(pin, inverted)?))
    }

    /// Wraps an existing [`DigitalInput`].
    pub fn from_input(input: DigitalInput<P>) -> Self {
        Button {
            input,
            held_ms: 0,
            hold_reported: false,
        }
    }

    /// Returns `true` once per press, on the sample where the button goes down.
    pub fn was_pressed(&mut self) -> Result<bool, P::Error> {
        self.input.was_activated()
    }

    /// Accumulates hold time and reports a hold of at least `threshold`.
    ///
    /// Must be called once per period with the time elapsed since the previous call. Releasing
    /// the button resets the timer. A single hold is reported once, on the call that reaches the
    /// threshold; the button has to be released before it can report again.
    pub fn held_for(
        &mut self,
        elapsed: MillisDurationU32,
        threshold: MillisDurationU32,
    ) -> Result<bool, P::Error> {
        if !self.input.is_active()? {
            self.held_ms = 0;
            self.hold_reported = false;
            return Ok(false);
        }
        self.held_ms = self.held_ms.saturating_add(elapsed.ticks());
        if !self.hold_reported && self.held_ms >= threshold.ticks() {
            self.hold_reported = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// How long the button has been held so far.
    pub fn held_time(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.held_ms)
    }

    /// Destroys the button and returns the pin.
    pub fn release(self) -> P {
        self.input.release()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::iter::repeat;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    fn reads(levels: &[PinState]) -> Vec<PinTransaction> {
        levels
            .iter()
            .map(|level| PinTransaction::get(level.clone()))
            .collect()
    }

    #[test]
    fn test_inverted_input_is_active_when_low() {
        let pin = PinMock::new(&reads(&[PinState::High, PinState::Low, PinState::High]));
        let mut input = DigitalInput::new(pin, true).unwrap();
        assert!(input.is_active().unwrap());
        assert!(!input.is_active().unwrap());
        input.release().done();
    }

    #[test]
    fn test_has_changed_reports_each_transition_once() {
        let pin = PinMock::new(&reads(&[
            PinState::Low,  // baseline, inactive
            PinState::High, // activated
            PinState::High, // unchanged
            PinState::Low,  // deactivated
            PinState::Low,  // unchanged
        ]));
        let mut input = DigitalInput::new(pin, false).unwrap();
        assert_eq!(input.has_changed().unwrap(), Change::Activated);
        assert_eq!(input.has_changed().unwrap(), Change::None);
        assert_eq!(input.has_changed().unwrap(), Change::Deactivated);
        assert_eq!(input.has_changed().unwrap(), Change::None);
        input.release().done();
    }

    #[test]
    fn test_was_activated_and_deactivated() {
        let pin = PinMock::new(&reads(&[
            PinState::High, // baseline, inactive (inverted)
            PinState::Low,
            PinState::High,
        ]));
        let mut input = DigitalInput::new(pin, true).unwrap();
        assert!(input.was_activated().unwrap());
        assert!(input.was_deactivated().unwrap());
        input.release().done();
    }

    #[test]
    fn test_press_held_from_start_is_not_an_edge() {
        let pin = PinMock::new(&reads(&[PinState::High, PinState::High]));
        let mut button = Button::new(pin, false).unwrap();
        assert!(!button.was_pressed().unwrap());
        button.release().done();
    }

    #[test]
    fn test_was_pressed_is_one_shot() {
        let pin = PinMock::new(&reads(&[
            PinState::Low,
            PinState::High,
            PinState::High,
            PinState::High,
        ]));
        let mut button = Button::new(pin, false).unwrap();
        assert!(button.was_pressed().unwrap());
        assert!(!button.was_pressed().unwrap());
        assert!(!button.was_pressed().unwrap());
        button.release().done();
    }

    #[test]
    fn test_hold_reported_once_per_hold() {
        let period = MillisDurationU32::millis(1000);
        let threshold = MillisDurationU32::millis(3000);
        let mut levels = vec![PinState::Low]; // baseline
        levels.extend(repeat(PinState::High).take(5)); // held for five periods
        levels.push(PinState::Low); // released
        levels.extend(repeat(PinState::High).take(3)); // held again
        let pin = PinMock::new(&reads(&levels));
        let mut button = Button::new(pin, false).unwrap();

        let first: Vec<bool> = (0..5)
            .map(|_| button.held_for(period, threshold).unwrap())
            .collect();
        assert_eq!(first, [false, false, true, false, false]);
        assert_eq!(button.held_time(), MillisDurationU32::millis(5000));

        assert!(!button.held_for(period, threshold).unwrap());
        assert_eq!(button.held_time(), MillisDurationU32::millis(0));

        let second: Vec<bool> = (0..3)
            .map(|_| button.held_for(period, threshold).unwrap())
            .collect();
        assert_eq!(second, [false, false, true]);
        button.release().done();
    }

    #[test]
    fn test_short_press_never_reports_hold() {
        let period = MillisDurationU32::millis(1000);
        let threshold = MillisDurationU32::millis(3000);
        let pin = PinMock::new(&reads(&[
            PinState::Low,
            PinState::High,
            PinState::High,
            PinState::Low,
            PinState::High,
        ]));
        let mut button = Button::new(pin, false).unwrap();
        for _ in 0..4 {
            assert!(!button.held_for(period, threshold).unwrap());
        }
        button.release().done();
    }
}
