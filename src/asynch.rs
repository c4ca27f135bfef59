//! Async key watchers for the multi-task model.
//!
//! Each key gets its own task that sleeps on the pin with `embedded-hal-async` and posts into a
//! shared [`KeyEvents`]; the application task takes the events once per step. It is only
//! available when the `async` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_clock::asynch::KeyWatcher;
//! use alarm_clock::{Key, KeyEvents};
//!
//! static KEYS: KeyEvents = KeyEvents::new();
//!
//! #[embassy_executor::task]
//! async fn accept_task(pin: Input<'static>) {
//!     let mut watcher = KeyWatcher::new(pin, Delay, true, Key::Accept, &KEYS);
//!     let _ = watcher.run_press().await;
//! }
//!
//! #[embassy_executor::task]
//! async fn set_time_task(pin: Input<'static>) {
//!     let mut watcher = KeyWatcher::new(pin, Delay, true, Key::AdjustTime, &KEYS);
//!     let _ = watcher.run_hold(MillisDurationU32::millis(3000)).await;
//! }
//! ```

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use fugit::MillisDurationU32;

use crate::keys::{Key, KeyEvents};
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::trace;

/// Polling period while a key is held.
const HOLD_POLL_MS: u32 = 10;

/// Watches one key pin and posts its events.
pub struct KeyWatcher<'a, P, D>
where
    P: InputPin + Wait,
    D: DelayNs,
{
    pin: P,
    delay: D,
    inverted: bool,
    key: Key,
    events: &'a KeyEvents,
}

impl<'a, P, D> KeyWatcher<'a, P, D>
where
    P: InputPin + Wait,
    D: DelayNs,
{
    /// Creates a watcher.
    ///
    /// # Arguments
    /// * `pin` - The key pin
    /// * `delay` - Timer used while measuring holds
    /// * `inverted` - `true` when the key pulls the pin low while pressed
    /// * `key` - The event to post
    /// * `events` - Where events are posted
    pub fn new(pin: P, delay: D, inverted: bool, key: Key, events: &'a KeyEvents) -> Self {
        Self {
            pin,
            delay,
            inverted,
            key,
            events,
        }
    }

    async fn wait_for_active(&mut self) -> Result<(), P::Error> {
        if self.inverted {
            self.pin.wait_for_low().await
        } else {
            self.pin.wait_for_high().await
        }
    }

    async fn wait_for_inactive(&mut self) -> Result<(), P::Error> {
        if self.inverted {
            self.pin.wait_for_high().await
        } else {
            self.pin.wait_for_low().await
        }
    }

    fn is_active(&mut self) -> Result<bool, P::Error> {
        Ok(self.pin.is_high()? != self.inverted)
    }

    /// Waits for one press, posts it and waits for the release.
    pub async fn next_press(&mut self) -> Result<(), P::Error> {
        self.wait_for_active().await?;
        #[cfg(any(feature = "log", feature = "defmt"))]
        trace!("key {:?} pressed", self.key);
        self.events.post(self.key);
        self.wait_for_inactive().await
    }

    /// Waits for the key to go down and measures the hold.
    ///
    /// # Returns
    /// * `Ok(true)` if the key was held for `hold`; the event was posted once and the key has
    ///   been released since
    /// * `Ok(false)` if the key was released earlier; nothing was posted
    pub async fn next_hold(&mut self, hold: MillisDurationU32) -> Result<bool, P::Error> {
        self.wait_for_active().await?;
        let mut held_ms = 0u32;
        loop {
            self.delay.delay_ms(HOLD_POLL_MS).await;
            if !self.is_active()? {
                return Ok(false);
            }
            held_ms = held_ms.saturating_add(HOLD_POLL_MS);
            if held_ms >= hold.ticks() {
                break;
            }
        }
        #[cfg(any(feature = "log", feature = "defmt"))]
        trace!("key {:?} held", self.key);
        self.events.post(self.key);
        self.wait_for_inactive().await?;
        Ok(true)
    }

    /// Posts every press; only returns on a pin error.
    pub async fn run_press(&mut self) -> Result<Infallible, P::Error> {
        loop {
            self.next_press().await?;
        }
    }

    /// Posts every hold of at least `hold`; only returns on a pin error.
    pub async fn run_hold(&mut self, hold: MillisDurationU32) -> Result<Infallible, P::Error> {
        loop {
            self.next_hold(hold).await?;
        }
    }

    /// Destroys the watcher and returns the pin and the delay.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
