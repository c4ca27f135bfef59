//! The application state machine.
//!
//! [`App`] owns the state of the user interface and nothing else: the clock, the screen and the
//! key events are handed to [`App::step`] on every call, so the same machine runs in a single
//! cooperative loop ([`AlarmClock`]) or against a [`crate::shared::SharedClock`] with key events
//! posted by separate tasks.
//!
//! | From                 | Event                   | To                                  |
//! |----------------------|-------------------------|-------------------------------------|
//! | `ShowingTime`        | time never set          | `InvalidTime`                       |
//! | `InvalidTime`        | set time held           | `AdjustTimeMinutes`                 |
//! | `ShowingTime`        | set time held           | `AdjustTimeMinutes`                 |
//! | `ShowingTime`        | set alarm held          | `AdjustAlarmMinutes`                |
//! | `AdjustTimeMinutes`  | accept                  | `AdjustTimeHours`                   |
//! | `AdjustTimeHours`    | accept                  | `ShowingTime`                       |
//! | `AdjustTime*`        | cancel or idle timeout  | `ShowingTime` or `InvalidTime`      |
//! | `AdjustAlarmMinutes` | accept                  | `AdjustAlarmHours`                  |
//! | `AdjustAlarmHours`   | accept                  | `ShowingTime`, alarm armed          |
//! | `AdjustAlarm*`       | cancel or idle timeout  | `ShowingTime`, alarm restored       |
//!
//! On the time screen `accept` and `cancel` arm and disarm the alarm, or snooze and cancel it
//! while it rings. Adjustment screens exit as if cancelled after `idle_timeout` without a key.

use embedded_hal::digital::InputPin;
use fugit::MillisDurationU32;

use crate::clock::{AlarmDriver, Clock};
use crate::keys::{KeyInputs, Keypad};
use crate::screen::{Screen, ScreenError};
use crate::time::Time;
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::{debug, info, warn};

const SECONDS_DOT: u8 = 2;
const ALARM_DOT: u8 = 0;
const ALL_DIGITS: (u8, u8) = (0, 3);

/// Receives the start and end of alarm adjustment sessions.
///
/// While a session is open the preview alarm time is stored in the clock and may match the
/// current time; implementors must not turn the alarm on in that window.
pub trait AlarmGate {
    /// `true` while the user is adjusting the alarm, `false` once the session is over.
    fn set_adjusting_alarm(&mut self, adjusting: bool);
}

impl<T: AlarmGate + ?Sized> AlarmGate for &mut T {
    fn set_adjusting_alarm(&mut self, adjusting: bool) {
        (**self).set_adjusting_alarm(adjusting);
    }
}

/// The screens of the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    /// The time has never been set; the digits flash
    InvalidTime,
    /// The current time, with the alarm dot when the alarm is armed
    ShowingTime,
    /// Adjusting the minutes of the time
    AdjustTimeMinutes,
    /// Adjusting the hours of the time
    AdjustTimeHours,
    /// Adjusting the minutes of the alarm
    AdjustAlarmMinutes,
    /// Adjusting the hours of the alarm
    AdjustAlarmHours,
}

/// Application configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time between two calls to [`App::step`]
    pub step_period: MillisDurationU32,
    /// How long the set time and set alarm keys must be held
    pub hold_duration: MillisDurationU32,
    /// Time without a key after which an adjustment screen is cancelled
    pub idle_timeout: MillisDurationU32,
    /// Half period of flashing digits and dots, in screen refresh cycles
    pub flash_half_period: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            step_period: MillisDurationU32::millis(1),
            hold_duration: MillisDurationU32::millis(3000),
            idle_timeout: MillisDurationU32::millis(30_000),
            flash_half_period: 125,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Field {
    Minutes,
    Hours,
}

impl Field {
    fn digits(self) -> (u8, u8) {
        match self {
            Field::Hours => (0, 1),
            Field::Minutes => (2, 3),
        }
    }
}

fn report(result: Result<(), ScreenError>) {
    if let Err(_e) = result {
        #[cfg(any(feature = "log", feature = "defmt"))]
        warn!("app: screen error {:?}", _e);
    }
}

/// The application state machine.
pub struct App {
    config: Config,
    state: AppState,
    current_time: Time,
    valid_time: bool,
    adjusted_time: Time,
    alarm_time: Time,
    adjusted_alarm_time: Time,
    alarm_is_activated: bool,
    idle_ms: u32,
}

impl App {
    /// Creates the application on the time screen with a disarmed 00:00 alarm.
    pub fn new(config: Config) -> Self {
        App {
            config,
            state: AppState::ShowingTime,
            current_time: Time::MIDNIGHT,
            valid_time: false,
            adjusted_time: Time::MIDNIGHT,
            alarm_time: Time::MIDNIGHT,
            adjusted_alarm_time: Time::MIDNIGHT,
            alarm_is_activated: false,
            idle_ms: 0,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current screen.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// The alarm time the user last accepted.
    pub fn alarm_time(&self) -> Time {
        self.alarm_time
    }

    /// Returns `true` if the user left the alarm armed.
    pub fn is_alarm_activated(&self) -> bool {
        self.alarm_is_activated
    }

    /// The working copy of the time adjustment screens.
    pub fn adjusted_time(&self) -> Time {
        self.adjusted_time
    }

    /// The working copy of the alarm adjustment screens.
    pub fn adjusted_alarm_time(&self) -> Time {
        self.adjusted_alarm_time
    }

    /// Runs one step of the state machine.
    ///
    /// # Arguments
    /// * `clock` - The clock engine
    /// * `screen` - The screen to draw on
    /// * `keys` - Key events since the previous step
    pub fn step<D, S>(&mut self, clock: &mut Clock<D>, screen: &mut S, keys: KeyInputs)
    where
        D: AlarmDriver + AlarmGate,
        S: Screen + ?Sized,
    {
        match self.state {
            AppState::InvalidTime => self.invalid_time(clock, screen, keys),
            AppState::ShowingTime => self.showing_time(clock, screen, keys),
            AppState::AdjustTimeMinutes => self.adjust_time(clock, screen, keys, Field::Minutes),
            AppState::AdjustTimeHours => self.adjust_time(clock, screen, keys, Field::Hours),
            AppState::AdjustAlarmMinutes => self.adjust_alarm(clock, screen, keys, Field::Minutes),
            AppState::AdjustAlarmHours => self.adjust_alarm(clock, screen, keys, Field::Hours),
        }
    }

    fn enter(&mut self, next: AppState) {
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("app: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn idle_expired(&mut self) -> bool {
        self.idle_ms = self.idle_ms.saturating_add(self.config.step_period.ticks());
        self.idle_ms >= self.config.idle_timeout.ticks()
    }

    fn start_time_adjustment(&mut self) {
        self.adjusted_time = self.current_time;
        self.idle_ms = 0;
        self.enter(AppState::AdjustTimeMinutes);
    }

    fn invalid_time<D, S>(&mut self, clock: &mut Clock<D>, screen: &mut S, keys: KeyInputs)
    where
        D: AlarmDriver,
        S: Screen + ?Sized,
    {
        self.current_time = clock.time();
        screen.write_bcd(&self.current_time.display_digits());
        report(screen.flash_digits(
            ALL_DIGITS.0,
            ALL_DIGITS.1,
            self.config.flash_half_period,
        ));
        screen.set_dot(SECONDS_DOT, true);
        report(screen.flash_dot(SECONDS_DOT, self.config.flash_half_period));

        if keys.adjust_time() {
            self.start_time_adjustment();
        }
    }

    fn showing_time<D, S>(&mut self, clock: &mut Clock<D>, screen: &mut S, keys: KeyInputs)
    where
        D: AlarmDriver + AlarmGate,
        S: Screen + ?Sized,
    {
        self.current_time = clock.time();
        self.valid_time = clock.has_valid_time();
        if self.valid_time {
            screen.write_bcd(&self.current_time.display_digits());
            report(screen.flash_digits(ALL_DIGITS.0, ALL_DIGITS.1, 0));
            screen.set_dot(SECONDS_DOT, true);
            report(screen.flash_dot(SECONDS_DOT, self.config.flash_half_period));
            screen.set_dot(ALARM_DOT, clock.is_alarm_activated());
        } else {
            self.enter(AppState::InvalidTime);
        }

        if keys.adjust_time() {
            self.start_time_adjustment();
        }
        if keys.adjust_alarm() {
            self.adjusted_alarm_time = self.alarm_time;
            self.idle_ms = 0;
            clock.driver_mut().set_adjusting_alarm(true);
            self.enter(AppState::AdjustAlarmMinutes);
        }

        if clock.is_alarm_ringing() {
            if keys.accept() {
                clock.snooze_alarm();
            }
            if keys.cancel() {
                clock.cancel_alarm();
            }
        } else {
            if keys.accept() {
                self.alarm_is_activated = clock.set_alarm(&self.alarm_time).is_ok();
                #[cfg(any(feature = "log", feature = "defmt"))]
                info!("app: alarm armed for {:?}", self.alarm_time);
            }
            if keys.cancel() {
                self.alarm_is_activated = false;
                clock.disable_alarm();
                #[cfg(any(feature = "log", feature = "defmt"))]
                info!("app: alarm disarmed");
            }
        }
    }

    fn adjust_time<D, S>(
        &mut self,
        clock: &mut Clock<D>,
        screen: &mut S,
        keys: KeyInputs,
        field: Field,
    ) where
        D: AlarmDriver,
        S: Screen + ?Sized,
    {
        let idle = self.idle_expired();
        report(screen.flash_dot(SECONDS_DOT, 0));
        let (from, to) = field.digits();
        report(screen.flash_digits(from, to, self.config.flash_half_period));

        if keys.cancel() || idle {
            // Restores the time shown when the adjustment started
            let _ = clock.set_time(&self.current_time);
            self.idle_ms = 0;
            self.enter(if self.valid_time {
                AppState::ShowingTime
            } else {
                AppState::InvalidTime
            });
            return;
        }

        if keys.increment() {
            self.preview_time(
                clock,
                match field {
                    Field::Minutes => Clock::increment_minutes,
                    Field::Hours => Clock::increment_hours,
                },
            );
        }
        if keys.decrement() {
            self.preview_time(
                clock,
                match field {
                    Field::Minutes => Clock::decrement_minutes,
                    Field::Hours => Clock::decrement_hours,
                },
            );
        }
        screen.write_bcd(&self.adjusted_time.display_digits());
        screen.set_dot(SECONDS_DOT, true);

        if keys.accept() {
            self.idle_ms = 0;
            self.enter(match field {
                Field::Minutes => AppState::AdjustTimeHours,
                Field::Hours => AppState::ShowingTime,
            });
        }
    }

    // The preview runs on the clock itself, so it keeps ticking from the adjusted value.
    fn preview_time<D: AlarmDriver>(&mut self, clock: &mut Clock<D>, adjust: fn(&mut Clock<D>)) {
        self.idle_ms = 0;
        if clock.set_time(&self.adjusted_time).is_ok() {
            adjust(clock);
        }
        self.adjusted_time = clock.time();
    }

    fn adjust_alarm<D, S>(
        &mut self,
        clock: &mut Clock<D>,
        screen: &mut S,
        keys: KeyInputs,
        field: Field,
    ) where
        D: AlarmDriver + AlarmGate,
        S: Screen + ?Sized,
    {
        let idle = self.idle_expired();
        if field == Field::Minutes {
            if let Some(alarm) = clock.alarm() {
                self.adjusted_alarm_time = alarm;
            }
        }

        if keys.cancel() || idle {
            if self.alarm_is_activated {
                self.alarm_is_activated = clock.set_alarm(&self.alarm_time).is_ok();
            } else {
                clock.disable_alarm();
            }
            self.finish_alarm_adjustment(clock);
            return;
        }

        if keys.increment() {
            self.preview_alarm(
                clock,
                match field {
                    Field::Minutes => Clock::increment_alarm_minutes,
                    Field::Hours => Clock::increment_alarm_hours,
                },
            );
        }
        if keys.decrement() {
            self.preview_alarm(
                clock,
                match field {
                    Field::Minutes => Clock::decrement_alarm_minutes,
                    Field::Hours => Clock::decrement_alarm_hours,
                },
            );
        }

        screen.write_bcd(&self.adjusted_alarm_time.display_digits());
        let (from, to) = field.digits();
        report(screen.flash_digits(from, to, self.config.flash_half_period));
        report(screen.flash_dot(SECONDS_DOT, 0));
        for dot in 0..4 {
            screen.set_dot(dot, true);
        }

        if keys.accept() {
            self.idle_ms = 0;
            match field {
                Field::Minutes => {
                    clock.driver_mut().set_adjusting_alarm(true);
                    self.enter(AppState::AdjustAlarmHours);
                }
                Field::Hours => {
                    self.alarm_time = self.adjusted_alarm_time;
                    self.alarm_is_activated = clock.set_alarm(&self.alarm_time).is_ok();
                    #[cfg(any(feature = "log", feature = "defmt"))]
                    info!("app: alarm set to {:?}", self.alarm_time);
                    self.finish_alarm_adjustment(clock);
                }
            }
        }
    }

    // Previews are stored in the clock but stay disarmed until accepted.
    fn preview_alarm<D>(&mut self, clock: &mut Clock<D>, adjust: fn(&mut Clock<D>))
    where
        D: AlarmDriver + AlarmGate,
    {
        self.idle_ms = 0;
        clock.driver_mut().set_adjusting_alarm(true);
        if clock.set_alarm(&self.adjusted_alarm_time).is_ok() {
            adjust(clock);
        }
        self.adjusted_alarm_time = clock.alarm_time();
        clock.disable_alarm();
    }

    fn finish_alarm_adjustment<D>(&mut self, clock: &mut Clock<D>)
    where
        D: AlarmDriver + AlarmGate,
    {
        self.idle_ms = 0;
        clock.driver_mut().set_adjusting_alarm(false);
        self.enter(AppState::ShowingTime);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Errors of the cooperative loop.
#[derive(Debug)]
pub enum Error<PinE> {
    /// A key pin could not be read
    Pin(PinE),
}

impl<PinE> From<PinE> for Error<PinE> {
    fn from(e: PinE) -> Self {
        Error::Pin(e)
    }
}

/// The complete alarm clock for a single cooperative loop.
///
/// Owns the clock engine, the keypad, the screen and the application; [`AlarmClock::poll`]
/// must be called once per `step_period`, and the clock engine must be configured with the
/// matching number of ticks per second.
pub struct AlarmClock<D, P, S>
where
    D: AlarmDriver + AlarmGate,
    P: InputPin,
    S: Screen,
{
    app: App,
    clock: Clock<D>,
    keypad: Keypad<P>,
    screen: S,
}

impl<D, P, S> AlarmClock<D, P, S>
where
    D: AlarmDriver + AlarmGate,
    P: InputPin,
    S: Screen,
{
    /// Assembles the alarm clock.
    pub fn new(config: Config, clock: Clock<D>, keypad: Keypad<P>, screen: S) -> Self {
        AlarmClock {
            app: App::new(config),
            clock,
            keypad,
            screen,
        }
    }

    /// Samples the keys, ticks the clock and steps the application once.
    ///
    /// A key read error is returned after the clock has ticked and the application has stepped
    /// without key events, so time keeping and the screen carry on.
    pub fn poll(&mut self) -> Result<(), Error<P::Error>> {
        let config = self.app.config;
        let sampled = self
            .keypad
            .sample(config.step_period, config.hold_duration);
        self.clock.tick();
        let keys = match &sampled {
            Ok(keys) => *keys,
            Err(_) => {
                #[cfg(any(feature = "log", feature = "defmt"))]
                warn!("app: failed to read keys");
                KeyInputs::NONE
            }
        };
        self.app.step(&mut self.clock, &mut self.screen, keys);
        sampled?;
        Ok(())
    }

    /// The application.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The clock engine.
    pub fn clock(&self) -> &Clock<D> {
        &self.clock
    }

    /// Exclusive access to the clock engine.
    pub fn clock_mut(&mut self) -> &mut Clock<D> {
        &mut self.clock
    }

    /// The screen.
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Destroys the alarm clock and returns its parts.
    pub fn release(self) -> (Clock<D>, Keypad<P>, S) {
        (self.clock, self.keypad, self.screen)
    }
}
