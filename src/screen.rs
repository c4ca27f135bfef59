//! The seven-segment screen as seen by the application.
//!
//! The multiplexed refresh, segment encoding and digit drivers live outside this crate; the
//! application only needs the operations of [`Screen`]. Digits are numbered from the left
//! (digit 0 shows the tens of hours), dots from the right (dot 0 sits on the last digit).

/// Errors reported by [`Screen`] implementations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenError {
    /// A digit or dot index is outside the screen, or the range is reversed
    DigitOutOfRange,
}

/// Operations the application performs on the screen.
pub trait Screen {
    /// Shows one BCD digit per position, starting from the left.
    ///
    /// Extra digits are ignored. Dots on the written positions are cleared.
    fn write_bcd(&mut self, digits: &[u8]);

    /// Turns the dot of a digit on or off.
    fn set_dot(&mut self, dot: u8, on: bool);

    /// Flashes the digits `from..=to` with the given half period in refresh cycles.
    ///
    /// A half period of 0 stops flashing.
    fn flash_digits(&mut self, from: u8, to: u8, half_period: u16) -> Result<(), ScreenError>;

    /// Flashes a dot with the given half period in refresh cycles; 0 stops flashing.
    fn flash_dot(&mut self, dot: u8, half_period: u16) -> Result<(), ScreenError>;
}

impl<T: Screen + ?Sized> Screen for &mut T {
    fn write_bcd(&mut self, digits: &[u8]) {
        (**self).write_bcd(digits);
    }

    fn set_dot(&mut self, dot: u8, on: bool) {
        (**self).set_dot(dot, on);
    }

    fn flash_digits(&mut self, from: u8, to: u8, half_period: u16) -> Result<(), ScreenError> {
        (**self).flash_digits(from, to, half_period)
    }

    fn flash_dot(&mut self, dot: u8, half_period: u16) -> Result<(), ScreenError> {
        (**self).flash_dot(dot, half_period)
    }
}

/// Range check shared by screen implementations for [`Screen::flash_digits`].
///
/// # Arguments
/// * `from` - First flashing digit
/// * `to` - Last flashing digit (inclusive)
/// * `digits` - Number of digits on the screen
pub fn check_digit_range(from: u8, to: u8, digits: u8) -> Result<(), ScreenError> {
    if from > to || to >= digits {
        return Err(ScreenError::DigitOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit_range() {
        assert_eq!(check_digit_range(0, 3, 4), Ok(()));
        assert_eq!(check_digit_range(2, 2, 4), Ok(()));
        assert_eq!(
            check_digit_range(3, 2, 4),
            Err(ScreenError::DigitOutOfRange)
        );
        assert_eq!(
            check_digit_range(0, 4, 4),
            Err(ScreenError::DigitOutOfRange)
        );
        assert_eq!(
            check_digit_range(0, 0, 0),
            Err(ScreenError::DigitOutOfRange)
        );
    }
}
