#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
extern crate log;

pub mod compact;
pub mod emit;
pub mod params;
pub mod track;
pub mod wave;

use core::fmt;

pub use compact::{Run, RunCompactor, RunLabel, Runs};
pub use emit::{write_table, TableFormat, TableStats};
pub use params::WaveParams;
pub use track::{Gauge, Player, PortFrame, Switch, Track, TrackSelector, SENTINEL};
pub use wave::{bar_height, thermometer, Sample, Samples};

pub const DEFAULT_LED_COUNT: i32 = 10;
pub const DEFAULT_PERIOD: f64 = 2.0;
pub const DEFAULT_RESOLUTION: f64 = 50.0;

/// Widest gauge whose all-on pattern still differs from [`SENTINEL`].
pub const MAX_LED_COUNT: u32 = 15;

/// Longest table generated in one go, in samples.
pub const MAX_SLICES: u32 = 1 << 20;

pub const MAX_TOKENS_PER_LINE: usize = 8;
const TOKEN_WIDTH: usize = 5;
const COMMENT_COLUMN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    LedCount,
    Period,
    Resolution,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::LedCount => f.write_str("led count"),
            Param::Period => f.write_str("period"),
            Param::Resolution => f.write_str("resolution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NonPositive(Param),
    TooManyLeds(u32),
    TooManySamples,
    InvalidName,
    RunOverflow,
    Format,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NonPositive(p) => write!(f, "{} must be a positive number", p),
            Error::TooManyLeds(n) => write!(
                f,
                "{} leds do not fit a uint16_t table (at most {})",
                n, MAX_LED_COUNT
            ),
            Error::TooManySamples => write!(
                f,
                "period x resolution exceeds {} samples",
                MAX_SLICES
            ),
            Error::InvalidName => f.write_str("array name is not a valid C identifier"),
            Error::RunOverflow => f.write_str("pending line overflowed"),
            Error::Format => f.write_str("failed to write table"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Error {}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::Format
    }
}
