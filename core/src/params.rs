use core::f64::consts::PI;

use libm::round;

use crate::{
    Error, Param, DEFAULT_LED_COUNT, DEFAULT_PERIOD, DEFAULT_RESOLUTION, MAX_LED_COUNT,
    MAX_SLICES,
};

/// Shape of the generated wave. Only constructible through [`WaveParams::new`], so every
/// instance has already been validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    led_count: u32,
    period: f64,
    resolution: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        WaveParams {
            led_count: DEFAULT_LED_COUNT as u32,
            period: DEFAULT_PERIOD,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

fn positive(value: f64, param: Param) -> Result<f64, Error> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::NonPositive(param))
    }
}

impl WaveParams {
    pub fn new(led_count: i32, period: f64, resolution: f64) -> Result<Self, Error> {
        if led_count <= 0 {
            return Err(Error::NonPositive(Param::LedCount));
        }
        let led_count = led_count as u32;
        if led_count > MAX_LED_COUNT {
            return Err(Error::TooManyLeds(led_count));
        }
        let params = WaveParams {
            led_count,
            period: positive(period, Param::Period)?,
            resolution: positive(resolution, Param::Resolution)?,
        };
        let slices = round(params.period * params.resolution);
        if !slices.is_finite() || slices > MAX_SLICES as f64 {
            return Err(Error::TooManySamples);
        }
        debug!("{:?}", params);
        Ok(params)
    }

    pub fn led_count(&self) -> u32 {
        self.led_count
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn frequency(&self) -> f64 {
        1.0 / self.period
    }

    /// Half the gauge; the wave swings `scale` bars either side of the midpoint.
    pub fn scale(&self) -> f64 {
        self.led_count as f64 / 2.0
    }

    pub fn omega(&self) -> f64 {
        2.0 * PI * self.frequency()
    }

    /// Number of samples in one period. Zero is allowed and yields an empty table.
    pub fn total_slices(&self) -> u32 {
        round(self.period * self.resolution) as u32
    }
}
