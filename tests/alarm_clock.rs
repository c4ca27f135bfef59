//! End-to-end tests of the cooperative alarm clock: keypad, clock engine, application and
//! alarm indicator driven one millisecond at a time.

use std::cell::Cell;
use std::rc::Rc;

use alarm_clock::app::{self, AlarmClock, AppState, Error};
use alarm_clock::clock::{self, AlarmState, Clock};
use alarm_clock::indicator::AlarmIndicator;
use alarm_clock::keys::{Keypad, KeypadPins};
use alarm_clock::screen::{Screen, ScreenError};
use alarm_clock::time::Time;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

#[derive(Clone, Default)]
struct FakePin {
    level: Rc<Cell<bool>>,
    broken: Rc<Cell<bool>>,
}

impl FakePin {
    fn set(&self, pressed: bool) {
        self.level.set(pressed);
    }
}

impl ErrorType for FakePin {
    type Error = ErrorKind;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.broken.get() {
            return Err(ErrorKind::Other);
        }
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}

#[derive(Clone, Default)]
struct FakeLed(Rc<Cell<bool>>);

impl FakeLed {
    fn is_on(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for FakeLed {
    type Error = ErrorKind;
}

impl OutputPin for FakeLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingScreen {
    digits: [u8; 4],
}

impl Screen for RecordingScreen {
    fn write_bcd(&mut self, digits: &[u8]) {
        for (slot, digit) in self.digits.iter_mut().zip(digits) {
            *slot = *digit;
        }
    }

    fn set_dot(&mut self, _dot: u8, _on: bool) {}

    fn flash_digits(&mut self, from: u8, to: u8, _half_period: u16) -> Result<(), ScreenError> {
        alarm_clock::screen::check_digit_range(from, to, 4)
    }

    fn flash_dot(&mut self, _dot: u8, _half_period: u16) -> Result<(), ScreenError> {
        Ok(())
    }
}

type TestClock = AlarmClock<AlarmIndicator<FakeLed>, FakePin, RecordingScreen>;

struct Bench {
    clock: TestClock,
    keys: KeypadPins<FakePin>,
    led: FakeLed,
}

const SECOND: u32 = 1000;

impl Bench {
    fn new() -> Self {
        let keys = KeypadPins {
            adjust_time: FakePin::default(),
            adjust_alarm: FakePin::default(),
            increment: FakePin::default(),
            decrement: FakePin::default(),
            accept: FakePin::default(),
            cancel: FakePin::default(),
        };
        let pins = keys.clone_handles();
        let led = FakeLed::default();
        let clock = Clock::new(
            clock::Config::default(),
            AlarmIndicator::new(led.clone()),
        );
        let keypad = Keypad::new(pins, false).unwrap();
        Bench {
            clock: AlarmClock::new(
                app::Config::default(),
                clock,
                keypad,
                RecordingScreen::default(),
            ),
            keys,
            led,
        }
    }

    fn at(hours: u8, minutes: u8, seconds: u8) -> Self {
        let mut bench = Self::new();
        bench
            .clock
            .clock_mut()
            .set_time(&hms(hours, minutes, seconds))
            .unwrap();
        bench
    }

    fn run(&mut self, millis: u32) {
        for _ in 0..millis {
            self.clock.poll().unwrap();
        }
    }

    fn tap(&mut self, pin: &FakePin) {
        pin.set(true);
        self.run(1);
        pin.set(false);
        self.run(1);
    }

    fn hold(&mut self, pin: &FakePin) {
        pin.set(true);
        self.run(3 * SECOND);
        pin.set(false);
        self.run(1);
    }

    fn state(&self) -> AppState {
        self.clock.app().state()
    }

    fn time(&self) -> Time {
        self.clock.clock().time()
    }
}

fn hms(hours: u8, minutes: u8, seconds: u8) -> Time {
    Time::new(hours, minutes, seconds).unwrap()
}

#[test]
fn test_unset_clock_flashes_until_time_is_set() {
    let mut bench = Bench::new();
    bench.run(5);
    assert_eq!(bench.state(), AppState::InvalidTime);

    let keys = bench.keys.clone_handles();
    bench.hold(&keys.adjust_time);
    assert_eq!(bench.state(), AppState::AdjustTimeMinutes);
    for _ in 0..45 {
        bench.tap(&keys.increment);
    }
    bench.tap(&keys.accept);
    for _ in 0..6 {
        bench.tap(&keys.increment);
    }
    bench.tap(&keys.accept);
    assert_eq!(bench.state(), AppState::ShowingTime);
    assert!(bench.clock.clock().has_valid_time());
    assert_eq!(bench.clock.screen().digits, [0, 6, 4, 5]);
}

#[test]
fn test_hold_enters_time_adjustment_once_per_hold() {
    let mut bench = Bench::at(6, 0, 0);
    let keys = bench.keys.clone_handles();
    keys.adjust_time.set(true);
    bench.run(3 * SECOND - 1);
    assert_eq!(bench.state(), AppState::ShowingTime);
    bench.run(1);
    assert_eq!(bench.state(), AppState::AdjustTimeMinutes);

    // Leave the adjustment while still holding the key
    bench.tap(&keys.cancel);
    assert_eq!(bench.state(), AppState::ShowingTime);
    bench.run(10 * SECOND);
    assert_eq!(bench.state(), AppState::ShowingTime);

    keys.adjust_time.set(false);
    bench.run(1);
    bench.hold(&keys.adjust_time);
    assert_eq!(bench.state(), AppState::AdjustTimeMinutes);
}

#[test]
fn test_idle_adjustment_is_cancelled_after_thirty_seconds() {
    let mut bench = Bench::at(6, 0, 0);
    let keys = bench.keys.clone_handles();
    keys.adjust_time.set(true);
    bench.run(3 * SECOND);
    keys.adjust_time.set(false);
    assert_eq!(bench.state(), AppState::AdjustTimeMinutes);

    bench.tap(&keys.increment);
    assert_eq!(bench.clock.app().adjusted_time(), hms(6, 1, 3));
    bench.run(30 * SECOND - 2);
    assert_eq!(bench.state(), AppState::AdjustTimeMinutes);
    bench.run(1);
    assert_eq!(bench.state(), AppState::ShowingTime);
    // Same outcome as cancel: the time shown when the adjustment started
    assert_eq!(bench.time(), hms(6, 0, 3));
}

fn set_alarm_to_seven(bench: &mut Bench) {
    let keys = bench.keys.clone_handles();
    bench.hold(&keys.adjust_alarm);
    assert_eq!(bench.state(), AppState::AdjustAlarmMinutes);
    bench.tap(&keys.accept);
    assert_eq!(bench.state(), AppState::AdjustAlarmHours);
    for _ in 0..7 {
        bench.tap(&keys.increment);
    }
    bench.tap(&keys.accept);
    assert_eq!(bench.state(), AppState::ShowingTime);
    assert_eq!(bench.clock.clock().alarm(), Some(hms(7, 0, 0)));
}

#[test]
fn test_alarm_rings_snoozes_and_cancels() {
    let mut bench = Bench::at(6, 59, 0);
    let keys = bench.keys.clone_handles();
    set_alarm_to_seven(&mut bench);
    assert!(!bench.led.is_on());

    bench.run(60 * SECOND);
    assert_eq!(bench.clock.clock().alarm_state(), AlarmState::Ringing);
    assert!(bench.led.is_on());

    bench.tap(&keys.accept);
    assert_eq!(bench.clock.clock().alarm_state(), AlarmState::Snoozed);
    assert!(!bench.led.is_on());

    bench.run(300 * SECOND);
    assert_eq!(bench.clock.clock().alarm_state(), AlarmState::Ringing);
    assert!(bench.led.is_on());

    bench.tap(&keys.cancel);
    assert_eq!(bench.clock.clock().alarm_state(), AlarmState::CancelledForDay);
    assert!(!bench.led.is_on());
    assert!(bench.clock.clock().is_alarm_activated());
}

#[test]
fn test_indicator_stays_off_while_adjusting_alarm() {
    let mut bench = Bench::at(6, 59, 0);
    let keys = bench.keys.clone_handles();
    set_alarm_to_seven(&mut bench);
    bench.run(60 * SECOND);
    bench.tap(&keys.accept);
    assert_eq!(bench.clock.clock().alarm_state(), AlarmState::Snoozed);

    bench.hold(&keys.adjust_alarm);
    assert_eq!(bench.state(), AppState::AdjustAlarmMinutes);
    // The 07:01 preview becomes the snooze target and is reached while still adjusting
    bench.tap(&keys.increment);
    for _ in 0..3 {
        bench.tap(&keys.increment);
        bench.tap(&keys.decrement);
        bench.run(20 * SECOND);
    }
    assert_eq!(bench.state(), AppState::AdjustAlarmMinutes);
    assert!(bench.time() > hms(7, 1, 0));
    assert!(bench.clock.clock().is_alarm_ringing());
    assert!(!bench.led.is_on());

    bench.tap(&keys.cancel);
    assert_eq!(bench.state(), AppState::ShowingTime);
    assert!(!bench.led.is_on());
    assert_eq!(bench.clock.clock().alarm(), Some(hms(7, 0, 0)));
}

#[test]
fn test_key_errors_do_not_stop_the_clock() {
    let mut bench = Bench::at(12, 0, 0);
    bench.keys.accept.broken.set(true);
    let mut errors = 0;
    for _ in 0..SECOND {
        if let Err(e) = bench.clock.poll() {
            assert!(matches!(e, Error::Pin(ErrorKind::Other)));
            errors += 1;
        }
    }
    assert_eq!(errors, SECOND);
    assert_eq!(bench.time(), hms(12, 0, 1));
    assert_eq!(bench.state(), AppState::ShowingTime);
}

trait CloneHandles {
    fn clone_handles(&self) -> Self;
}

impl CloneHandles for KeypadPins<FakePin> {
    fn clone_handles(&self) -> Self {
        KeypadPins {
            adjust_time: self.adjust_time.clone(),
            adjust_alarm: self.adjust_alarm.clone(),
            increment: self.increment.clone(),
            decrement: self.decrement.clone(),
            accept: self.accept.clone(),
            cancel: self.cancel.clone(),
        }
    }
}
