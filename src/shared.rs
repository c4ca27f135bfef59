//! Sharing the clock between a timer interrupt and the application task.
//!
//! In the multi-task model the tick runs from a timer interrupt or a high-priority task while the
//! application steps elsewhere. [`SharedClock`] keeps the [`Clock`] behind a
//! `critical_section::Mutex`, so every access, including a whole application step, observes a
//! consistent clock. Key events travel through [`crate::keys::KeyEvents`].
//!
//! ```rust,ignore
//! static CLOCK: SharedClock<Indicator> = SharedClock::new(Clock::new(CONFIG, Indicator::new()));
//! static KEYS: KeyEvents = KeyEvents::new();
//!
//! // timer interrupt, every tick
//! CLOCK.tick();
//!
//! // application task, every step
//! CLOCK.with(|clock| app.step(clock, &mut screen, KEYS.take()));
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::clock::{AlarmDriver, AlarmState, Clock};
use crate::time::Time;

/// A [`Clock`] shared between interrupt and thread contexts.
pub struct SharedClock<D: AlarmDriver> {
    clock: Mutex<RefCell<Clock<D>>>,
}

impl<D: AlarmDriver> SharedClock<D> {
    /// Wraps a clock; usable in a `static`.
    pub const fn new(clock: Clock<D>) -> Self {
        SharedClock {
            clock: Mutex::new(RefCell::new(clock)),
        }
    }

    /// Runs `f` with exclusive access to the clock inside a critical section.
    ///
    /// # Panics
    /// Panics if called from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut Clock<D>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.clock.borrow_ref_mut(cs)))
    }

    /// Counts one tick.
    pub fn tick(&self) {
        self.with(|clock| clock.tick());
    }

    /// The current time.
    pub fn time(&self) -> Time {
        self.with(|clock| clock.time())
    }

    /// The current alarm state.
    pub fn alarm_state(&self) -> AlarmState {
        self.with(|clock| clock.alarm_state())
    }

    /// Destroys the wrapper and returns the clock.
    pub fn into_inner(self) -> Clock<D> {
        self.clock.into_inner().into_inner()
    }
}
