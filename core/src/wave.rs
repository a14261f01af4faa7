use libm::{cos, round};

use crate::WaveParams;

/// Unary "thermometer" code: the lowest `height` bits set, everything above clear.
pub fn thermometer(height: u32) -> u16 {
    match height {
        0 => 0,
        h if h >= 16 => u16::MAX,
        h => (1 << h) - 1,
    }
}

/// Number of lit bars in a thermometer coded value.
pub fn bar_height(value: u16) -> u32 {
    value.trailing_ones()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: u32,
    pub theta: f64,
    pub height: u32,
    pub value: u16,
}

impl WaveParams {
    /// Sample the wave at index `t`. The height is rounded half away from zero.
    pub fn sample(&self, t: u32) -> Sample {
        let theta = self.omega() * (t as f64 / self.resolution());
        let scale = self.scale();
        let height = round(scale * cos(theta) + scale) as u32;
        debug_assert!(height <= self.led_count());
        let value = thermometer(height);
        trace!("t={},h={},value={} ({:b})", t, height, value, value);
        Sample {
            t,
            theta,
            height,
            value,
        }
    }

    /// Every sample of one period, `t` running over `1..=total_slices`.
    pub fn samples(&self) -> Samples {
        Samples {
            params: *self,
            t: 1,
            end: self.total_slices(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Samples {
    params: WaveParams,
    t: u32,
    end: u32,
}

impl Iterator for Samples {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.t > self.end {
            return None;
        }
        let sample = self.params.sample(self.t);
        self.t = self.t.saturating_add(1);
        if sample.t == u32::MAX {
            self.end = 0;
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.t > self.end {
            0
        } else {
            (self.end - self.t) as usize + 1
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for Samples {}
