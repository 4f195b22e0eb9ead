//! Form parameters and their validation rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failure for a single form value.
///
/// The display strings are the messages shown next to the offending field.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    /// No value was submitted.
    #[error("This field is required.")]
    Missing,
    /// The value is not a finite decimal number.
    #[error("Not a valid decimal value.")]
    NotANumber,
    /// The percentage lies outside 0..=100.
    #[error("The value must be in the range from 0 to 100")]
    OutOfRange,
    /// The value is not one of the offered choices.
    #[error("Not a valid choice.")]
    InvalidChoice,
}

/// Orientation of the long beam of the cross.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossPosition {
    /// Long beam lies along the x axis.
    #[default]
    Horizontal,
    /// Long beam stands along the y axis.
    Vertical,
}

impl CrossPosition {
    /// All positions in the order they are offered on the form.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Form value, also used in derived file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
        }
    }
}

impl fmt::Display for CrossPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrossPosition {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ParamError::Missing),
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            _ => Err(ParamError::InvalidChoice),
        }
    }
}

/// A percentage in the closed range 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    /// Smallest accepted value.
    pub const MIN: f64 = 0.0;
    /// Largest accepted value.
    pub const MAX: f64 = 100.0;

    /// Validates a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::NotANumber`] for NaN or infinities and
    /// [`ParamError::OutOfRange`] outside 0..=100.
    pub fn new(value: f64) -> Result<Self, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotANumber);
        }
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParamError::OutOfRange)
        }
    }

    /// The percentage as entered.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The percentage as a fraction in 0.0..=1.0.
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl FromStr for Percent {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParamError::Missing);
        }
        let value: f64 = s.parse().map_err(|_| ParamError::NotANumber)?;
        Self::new(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Percentile per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelPercents {
    /// Red channel percentile.
    pub red: Percent,
    /// Green channel percentile.
    pub green: Percent,
    /// Blue channel percentile.
    pub blue: Percent,
}

impl ChannelPercents {
    /// Fractions in RGB order.
    #[must_use]
    pub fn fractions(&self) -> [f64; 3] {
        [
            self.red.fraction(),
            self.green.fraction(),
            self.blue.fraction(),
        ]
    }
}

/// Which color distribution charts to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Chart the uploaded image.
    pub original_colors: bool,
    /// Chart the marked image.
    pub processed_colors: bool,
}

/// A validated form submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Cross orientation.
    pub position: CrossPosition,
    /// Channel percentiles.
    pub percents: ChannelPercents,
    /// Chart toggles.
    pub display: DisplayOptions,
    /// File name as sent by the client.
    pub file_name: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_bounds_inclusive() {
        assert_eq!(Percent::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Percent::new(100.0).unwrap().value(), 100.0);
        assert_eq!(Percent::new(-0.01), Err(ParamError::OutOfRange));
        assert_eq!(Percent::new(100.5), Err(ParamError::OutOfRange));
    }

    #[test]
    fn test_percent_rejects_non_finite() {
        assert_eq!(Percent::new(f64::NAN), Err(ParamError::NotANumber));
        assert_eq!(Percent::new(f64::INFINITY), Err(ParamError::NotANumber));
        assert_eq!("inf".parse::<Percent>(), Err(ParamError::NotANumber));
    }

    #[test]
    fn test_percent_parse() {
        assert_eq!("42.5".parse::<Percent>().unwrap().value(), 42.5);
        assert_eq!(" 7 ".parse::<Percent>().unwrap().value(), 7.0);
        assert_eq!("".parse::<Percent>(), Err(ParamError::Missing));
        assert_eq!("  ".parse::<Percent>(), Err(ParamError::Missing));
        assert_eq!("abc".parse::<Percent>(), Err(ParamError::NotANumber));
        assert_eq!("101".parse::<Percent>(), Err(ParamError::OutOfRange));
    }

    #[test]
    fn test_fraction() {
        let percents = ChannelPercents {
            red: Percent::new(50.0).unwrap(),
            green: Percent::new(0.0).unwrap(),
            blue: Percent::new(100.0).unwrap(),
        };
        assert_eq!(percents.fractions(), [0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_cross_position_parse() {
        assert_eq!(
            "horizontal".parse::<CrossPosition>(),
            Ok(CrossPosition::Horizontal)
        );
        assert_eq!(
            "vertical".parse::<CrossPosition>(),
            Ok(CrossPosition::Vertical)
        );
        assert_eq!(
            "diagonal".parse::<CrossPosition>(),
            Err(ParamError::InvalidChoice)
        );
        assert_eq!("".parse::<CrossPosition>(), Err(ParamError::Missing));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParamError::OutOfRange.to_string(),
            "The value must be in the range from 0 to 100"
        );
        assert_eq!(ParamError::Missing.to_string(), "This field is required.");
    }
}
