//! Intrinsic properties of a source video.
//!
//! Frame rates are kept as exact rationals (`30000/1001`, not `29.97`) so
//! frame-index to timestamp conversion never drifts.

use num_rational::Rational64;
use serde::Serialize;

use std::fmt;

/// Frames per second as an exact, strictly positive rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate(Rational64);

impl FrameRate {
    /// Creates a frame rate from a numerator and denominator.
    ///
    /// Returns `None` unless both parts are strictly positive.
    #[must_use]
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if numerator <= 0 || denominator <= 0 {
            return None;
        }
        Some(Self(Rational64::new(numerator, denominator)))
    }

    /// Parses an ffprobe rate string such as `"30000/1001"` or `"25"`.
    ///
    /// ```rust
    /// use clipcrop_core::FrameRate;
    ///
    /// let rate = FrameRate::parse("30000/1001").unwrap();
    /// assert_eq!((rate.numerator(), rate.denominator()), (30000, 1001));
    /// assert!(FrameRate::parse("0/0").is_none());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.split_once('/') {
            Some((num, den)) => {
                let num = num.trim().parse::<i64>().ok()?;
                let den = den.trim().parse::<i64>().ok()?;
                Self::new(num, den)
            }
            None => Self::new(value.parse::<i64>().ok()?, 1),
        }
    }

    #[must_use]
    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    #[must_use]
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// The rate as an exact rational.
    #[must_use]
    pub fn as_rational(&self) -> Rational64 {
        self.0
    }

    /// The rate as a float, for display only.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.numerator() as f64 / self.denominator() as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

impl Serialize for FrameRate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Properties of the first video stream of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaIntrinsics {
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction_is_reduced_and_exact() {
        let rate = FrameRate::parse("60/2").unwrap();
        assert_eq!(rate.numerator(), 30);
        assert_eq!(rate.denominator(), 1);

        let ntsc = FrameRate::parse(" 24000/1001 ").unwrap();
        assert_eq!(ntsc.as_rational(), Rational64::new(24000, 1001));
        assert_eq!(ntsc.to_string(), "24000/1001");
    }

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(FrameRate::parse("25"), FrameRate::new(25, 1));
    }

    #[test]
    fn test_parse_rejects_invalid_rates() {
        assert!(FrameRate::parse("0/0").is_none());
        assert!(FrameRate::parse("30/0").is_none());
        assert!(FrameRate::parse("-30/1").is_none());
        assert!(FrameRate::parse("29.97").is_none());
        assert!(FrameRate::parse("30/1/2").is_none());
        assert!(FrameRate::parse("__import__('os')").is_none());
        assert!(FrameRate::parse("").is_none());
    }
}
