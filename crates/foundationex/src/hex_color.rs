//! Hex color parsing
//!
//! Accepts `RRGGBB` or `RRGGBBAA`, optionally prefixed with `#`. Channels are
//! scaled to `0.0..=1.0`.

use std::str::FromStr;

use nom::{bytes::complete::take_while_m_n, combinator::map_res, IResult};
use serde::{Deserialize, Serialize};

/// Minimum input length, counted before any `#` is stripped
const MIN_LEN: usize = 6;

const CHANNELS: [&str; 4] = ["red", "green", "blue", "alpha"];

/// Color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    /// Alpha (opacity)
    pub a: f64,
}

/// Reasons a hex color string is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexColorError {
    /// Input shorter than six characters
    #[error("hex color too short: {len} characters")]
    TooShort {
        /// Input length in characters
        len: usize,
    },

    /// Digit count other than 6 or 8
    #[error("hex color must have 6 or 8 digits, found {digits}")]
    InvalidLength {
        /// Digits after the optional `#`
        digits: usize,
    },

    /// A channel holds a character that is not a hex digit
    #[error("invalid hex digit in {component} component")]
    InvalidDigit {
        /// Channel name
        component: &'static str,
    },
}

fn channel(input: &str) -> IResult<&str, f64> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |hex: &str| u8::from_str_radix(hex, 16).map(|v| f64::from(v) / 255.0),
    )(input)
}

/// Parse `#RRGGBB`, `#RRGGBBAA`, `RRGGBB` or `RRGGBBAA`.
///
/// Alpha defaults to `1.0` when only three channels are given.
pub fn parse_hex_color(input: &str) -> Result<Rgba, HexColorError> {
    let len = input.chars().count();
    if len < MIN_LEN {
        return Err(HexColorError::TooShort { len });
    }

    let digits = input.strip_prefix('#').unwrap_or(input);
    let count = digits.chars().count();
    if count != 6 && count != 8 {
        return Err(HexColorError::InvalidLength { digits: count });
    }

    let mut values = [1.0; 4];
    let mut rest = digits;
    for (slot, component) in values.iter_mut().zip(CHANNELS).take(count / 2) {
        let (next, value) =
            channel(rest).map_err(|_| HexColorError::InvalidDigit { component })?;
        *slot = value;
        rest = next;
    }

    let [r, g, b, a] = values;
    Ok(Rgba { r, g, b, a })
}

impl FromStr for Rgba {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}
