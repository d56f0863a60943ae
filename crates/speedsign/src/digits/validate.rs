//! Turning an ordered digit sequence into a speed value.

/// Pass-level failure of digit recognition. Triggers the dilated retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// No glyph survived filtering and classification.
    NoDigitsFound,
    /// More glyphs than a speed limit can have; almost always clutter.
    TooManyDigits {
        /// The spurious sequence, left to right.
        digits: Vec<u8>,
    },
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDigitsFound => write!(f, "no digits found"),
            Self::TooManyDigits { digits } => {
                write!(f, "too many digits: {} ({:?})", digits.len(), digits)
            }
        }
    }
}

impl std::error::Error for RecognitionError {}

/// Reason a reading looks unlike a posted speed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implausibility {
    /// Single digit other than 5.
    SingleDigitNotFive,
    /// Two digits below 20 other than 15.
    BelowTwentyNotFifteen,
    /// Two digits above 20 not ending in 0.
    NotMultipleOfTen,
    /// Three digits not ending in 0.
    LastDigitNotZero,
    /// Three digits above the configured maximum.
    AboveMaximum,
}

impl Implausibility {
    pub const fn code(self) -> &'static str {
        match self {
            Self::SingleDigitNotFive => "single_digit_not_five",
            Self::BelowTwentyNotFifteen => "below_twenty_not_fifteen",
            Self::NotMultipleOfTen => "not_multiple_of_ten",
            Self::LastDigitNotZero => "last_digit_not_zero",
            Self::AboveMaximum => "above_maximum",
        }
    }
}

impl std::fmt::Display for Implausibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Validated speed value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SpeedReading {
    /// Digits left to right.
    pub digits: Vec<u8>,
    pub speed: u32,
    /// Advisory flags; empty when the value looks like a real limit.
    pub implausible: Vec<Implausibility>,
}

impl SpeedReading {
    #[inline]
    pub fn is_plausible(&self) -> bool {
        self.implausible.is_empty()
    }
}

/// Assemble `digits` (left to right) into a speed and flag odd values.
///
/// One to three digits always succeed; plausibility problems are reported on
/// the returned reading and logged, never as an error.
pub fn validate_digits(digits: &[u8], max_speed: u32) -> Result<SpeedReading, RecognitionError> {
    let mut implausible = Vec::new();
    let speed = match *digits {
        [] => return Err(RecognitionError::NoDigitsFound),
        [d0] => {
            if d0 != 5 {
                implausible.push(Implausibility::SingleDigitNotFive);
            }
            d0 as u32
        }
        [d0, d1] => {
            let speed = 10 * d0 as u32 + d1 as u32;
            if speed < 20 && speed != 15 {
                implausible.push(Implausibility::BelowTwentyNotFifteen);
            }
            if speed > 20 && speed % 10 != 0 {
                implausible.push(Implausibility::NotMultipleOfTen);
            }
            speed
        }
        [d0, d1, d2] => {
            let speed = 100 * d0 as u32 + 10 * d1 as u32 + d2 as u32;
            if d2 != 0 {
                implausible.push(Implausibility::LastDigitNotZero);
            }
            if speed > max_speed {
                implausible.push(Implausibility::AboveMaximum);
            }
            speed
        }
        _ => {
            tracing::warn!(digits = ?digits, "too many digits for a speed limit");
            return Err(RecognitionError::TooManyDigits {
                digits: digits.to_vec(),
            });
        }
    };

    if !implausible.is_empty() {
        tracing::warn!(speed, flags = ?implausible, "implausible speed reading");
    }
    Ok(SpeedReading {
        digits: digits.to_vec(),
        speed,
        implausible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(d: &[u8]) -> SpeedReading {
        validate_digits(d, 130).unwrap()
    }

    #[test]
    fn single_digit() {
        let r = read(&[5]);
        assert_eq!(r.speed, 5);
        assert!(r.is_plausible());
        assert_eq!(read(&[7]).implausible, vec![Implausibility::SingleDigitNotFive]);
    }

    #[test]
    fn two_digits() {
        assert!(read(&[3, 0]).is_plausible());
        assert_eq!(read(&[3, 0]).speed, 30);
        assert!(read(&[1, 5]).is_plausible());
        assert!(read(&[2, 0]).is_plausible());

        let r = read(&[2, 2]);
        assert_eq!(r.speed, 22);
        assert_eq!(r.implausible, vec![Implausibility::NotMultipleOfTen]);
        assert_eq!(read(&[1, 2]).implausible, vec![Implausibility::BelowTwentyNotFifteen]);
    }

    #[test]
    fn three_digits() {
        let r = read(&[1, 3, 0]);
        assert_eq!(r.speed, 130);
        assert!(r.is_plausible());

        assert_eq!(read(&[1, 3, 5]).implausible, vec![Implausibility::LastDigitNotZero]);
        assert_eq!(read(&[1, 4, 0]).implausible, vec![Implausibility::AboveMaximum]);
        assert_eq!(
            read(&[1, 4, 5]).implausible,
            vec![Implausibility::LastDigitNotZero, Implausibility::AboveMaximum]
        );
    }

    #[test]
    fn maximum_is_configurable() {
        assert!(validate_digits(&[1, 5, 0], 160).unwrap().is_plausible());
    }

    #[test]
    fn empty_and_long_sequences_fail() {
        assert_eq!(validate_digits(&[], 130), Err(RecognitionError::NoDigitsFound));
        assert_eq!(
            validate_digits(&[1, 2, 3, 4], 130),
            Err(RecognitionError::TooManyDigits {
                digits: vec![1, 2, 3, 4]
            })
        );
    }
}
