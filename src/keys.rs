//! The six keys of the clock and the key events fed to the application.
//!
//! Two keys open the adjustment screens and must be held; the other four act on a press:
//!
//! | Key           | Event                                       |
//! |---------------|---------------------------------------------|
//! | `AdjustTime`  | held for the hold duration (3 s by default) |
//! | `AdjustAlarm` | held for the hold duration                  |
//! | `Increment`   | pressed                                     |
//! | `Decrement`   | pressed                                     |
//! | `Accept`      | pressed                                     |
//! | `Cancel`      | pressed                                     |
//!
//! Events are collected in a [`KeyInputs`] bit set. [`Keypad`] produces one per sampling
//! period in a single loop; [`KeyEvents`] collects them from separate tasks or interrupts.

use core::cell::Cell;

use bitfield::bitfield;
use critical_section::Mutex;
use embedded_hal::digital::InputPin;
use fugit::MillisDurationU32;

use crate::button::Button;
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::debug;

/// The keys of the clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Opens the time adjustment when held
    AdjustTime = 0,
    /// Opens the alarm adjustment when held
    AdjustAlarm = 1,
    /// Increments the flashing field
    Increment = 2,
    /// Decrements the flashing field
    Decrement = 3,
    /// Accepts the flashing field; arms or snoozes the alarm on the time screen
    Accept = 4,
    /// Abandons the adjustment; disarms or cancels the alarm on the time screen
    Cancel = 5,
}

impl Key {
    /// All keys in bit order.
    pub const ALL: [Key; 6] = [
        Key::AdjustTime,
        Key::AdjustAlarm,
        Key::Increment,
        Key::Decrement,
        Key::Accept,
        Key::Cancel,
    ];

    /// The bit of this key in a [`KeyInputs`].
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

bitfield! {
    /// Key events of one application step.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct KeyInputs(u8);
    impl Debug;
    /// The set time key has been held
    pub adjust_time, set_adjust_time: 0;
    /// The set alarm key has been held
    pub adjust_alarm, set_adjust_alarm: 1;
    /// The increment key has been pressed
    pub increment, set_increment: 2;
    /// The decrement key has been pressed
    pub decrement, set_decrement: 3;
    /// The accept key has been pressed
    pub accept, set_accept: 4;
    /// The cancel key has been pressed
    pub cancel, set_cancel: 5;
}

impl KeyInputs {
    const MASK: u8 = 0b0011_1111;

    /// No events.
    pub const NONE: KeyInputs = KeyInputs(0);

    /// Builds a set from raw bits; bits above the six keys are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        KeyInputs(bits & Self::MASK)
    }

    /// The raw bits of the set.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns this set with `key` added.
    pub const fn with(self, key: Key) -> Self {
        KeyInputs(self.0 | key.mask())
    }

    /// Adds `key` to the set.
    pub fn insert(&mut self, key: Key) {
        self.0 |= key.mask();
    }

    /// Returns `true` if `key` is in the set.
    pub const fn contains(&self, key: Key) -> bool {
        self.0 & key.mask() != 0
    }

    /// Returns `true` if no key event is set.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<Key> for KeyInputs {
    fn from(key: Key) -> Self {
        KeyInputs::NONE.with(key)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyInputs {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "KeyInputs({=u8:b})", self.0);
    }
}

/// The pins of the six keys.
pub struct KeypadPins<P> {
    pub adjust_time: P,
    pub adjust_alarm: P,
    pub increment: P,
    pub decrement: P,
    pub accept: P,
    pub cancel: P,
}

/// The six keys sampled from a periodic loop.
pub struct Keypad<P: InputPin> {
    adjust_time: Button<P>,
    adjust_alarm: Button<P>,
    increment: Button<P>,
    decrement: Button<P>,
    accept: Button<P>,
    cancel: Button<P>,
}

impl<P: InputPin> Keypad<P> {
    /// Creates the keypad, sampling every pin once as the baseline.
    ///
    /// # Arguments
    /// * `pins` - The key pins
    /// * `inverted` - `true` when the keys pull their pins low while pressed
    pub fn new(pins: KeypadPins<P>, inverted: bool) -> Result<Self, P::Error> {
        Ok(Keypad {
            adjust_time: Button::new(pins.adjust_time, inverted)?,
            adjust_alarm: Button::new(pins.adjust_alarm, inverted)?,
            increment: Button::new(pins.increment, inverted)?,
            decrement: Button::new(pins.decrement, inverted)?,
            accept: Button::new(pins.accept, inverted)?,
            cancel: Button::new(pins.cancel, inverted)?,
        })
    }

    /// Samples all keys once.
    ///
    /// # Arguments
    /// * `elapsed` - Time since the previous sample
    /// * `hold` - How long the adjustment keys must be held
    pub fn sample(
        &mut self,
        elapsed: MillisDurationU32,
        hold: MillisDurationU32,
    ) -> Result<KeyInputs, P::Error> {
        let mut inputs = KeyInputs::NONE;
        inputs.set_adjust_time(self.adjust_time.held_for(elapsed, hold)?);
        inputs.set_adjust_alarm(self.adjust_alarm.held_for(elapsed, hold)?);
        inputs.set_increment(self.increment.was_pressed()?);
        inputs.set_decrement(self.decrement.was_pressed()?);
        inputs.set_accept(self.accept.was_pressed()?);
        inputs.set_cancel(self.cancel.was_pressed()?);
        #[cfg(any(feature = "log", feature = "defmt"))]
        {
            if !inputs.is_empty() {
                debug!("keys: {:?}", inputs);
            }
        }
        Ok(inputs)
    }

    /// Destroys the keypad and returns the pins.
    pub fn release(self) -> KeypadPins<P> {
        KeypadPins {
            adjust_time: self.adjust_time.release(),
            adjust_alarm: self.adjust_alarm.release(),
            increment: self.increment.release(),
            decrement: self.decrement.release(),
            accept: self.accept.release(),
            cancel: self.cancel.release(),
        }
    }
}

/// Key events posted from interrupts or tasks and taken by the application step.
///
/// Every event stays set until taken, so a press seen between two steps is never lost, and a
/// press seen twice before a step is delivered once.
pub struct KeyEvents {
    flags: Mutex<Cell<u8>>,
}

impl KeyEvents {
    /// Creates an empty event set; usable in a `static`.
    pub const fn new() -> Self {
        KeyEvents {
            flags: Mutex::new(Cell::new(0)),
        }
    }

    /// Posts one key event.
    pub fn post(&self, key: Key) {
        self.post_inputs(key.into());
    }

    /// Posts every event of `inputs`.
    pub fn post_inputs(&self, inputs: KeyInputs) {
        critical_section::with(|cs| {
            let flags = self.flags.borrow(cs);
            flags.set(flags.get() | inputs.bits());
        });
    }

    /// Takes all pending events, leaving the set empty.
    pub fn take(&self) -> KeyInputs {
        critical_section::with(|cs| KeyInputs::from_bits(self.flags.borrow(cs).replace(0)))
    }

    /// The pending events, left in place.
    pub fn peek(&self) -> KeyInputs {
        critical_section::with(|cs| KeyInputs::from_bits(self.flags.borrow(cs).get()))
    }
}

impl Default for KeyEvents {
    fn default() -> Self {
        Self::new()
    }
}
