//! Playback of generated tables on the proton pack gauge.
//!
//! Tables are `u16` words terminated by [`SENTINEL`]. The ten gauge LEDs are wired as
//!
//! ```text
//! B7  B6  B5  B4  B3  B2  B1  B0  D6  D5
//! 512 256 128 64  32  16  8   4   2   1
//! ```
//!
//! and the four accelerator LEDs (A1 A0 D1 D0) show an oversampled copy of the same value.
//!
//! The host tool only steps [`Player`] to draw previews; [`Switch`] and [`Player::poll`] are
//! for firmware that feeds in a real button.

use core::fmt;

use itertools::Itertools;

pub const SENTINEL: u16 = 0xFFFF;

/// Values of one table, stopping at the sentinel.
#[derive(Debug, Clone)]
pub struct Track<'a> {
    values: core::slice::Iter<'a, u16>,
}

impl<'a> Track<'a> {
    pub fn new(table: &'a [u16]) -> Self {
        Track {
            values: table.iter(),
        }
    }
}

impl<'a> Iterator for Track<'a> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        match self.values.next() {
            Some(&SENTINEL) => {
                let rest: &'a [u16] = &[];
                self.values = rest.iter();
                None
            }
            Some(&value) => Some(value),
            None => None,
        }
    }
}

/// Output register contents for one step of a track.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PortFrame {
    pub pa: u8,
    pub pb: u8,
    pub pd: u8,
}

impl PortFrame {
    pub fn from_value(value: u16) -> Self {
        let lit = |mask: u16, bit: u8| if value & mask != 0 { bit } else { 0 };

        let pb = ((value >> 2) & 0xff) as u8;
        let mut pd = ((value & 0x3) as u8) << 5;
        let pa = lit(0x300, 0b10) | lit(0x0c0, 0b01);
        pd |= lit(0x038, 0b10) | lit(0x007, 0b01);
        PortFrame { pa, pb, pd }
    }

    /// Reassemble the gauge value from ports B and D.
    pub fn gauge_value(&self) -> u16 {
        ((self.pb as u16) << 2) | ((self.pd as u16 >> 5) & 0x3)
    }
}

/// Renders a value as a row of lit (`#`) and dark (`.`) LEDs, most significant first.
#[derive(Debug, Clone, Copy)]
pub struct Gauge {
    pub value: u16,
    pub leds: u32,
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value as u32;
        let bars = (0..self.leds)
            .rev()
            .map(|bit| if value & (1 << bit) != 0 { '#' } else { '.' });
        write!(f, "{}", bars.format(""))
    }
}

/// Which of the stored tracks is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSelector {
    current: u16,
    count: u16,
}

impl TrackSelector {
    /// Resume from a persisted index. Erased storage (`0xFFFF`) or an index past the end
    /// starts over at the first track.
    pub fn restore(stored: u16, count: u16) -> Self {
        let current = if stored == SENTINEL || stored >= count {
            warn!("stored track {} invalid, starting at 0", stored);
            0
        } else {
            stored
        };
        TrackSelector { current, count }
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn advance(&mut self) -> u16 {
        self.current += 1;
        if self.current >= self.count {
            self.current = 0;
        }
        info!("track {}", self.current);
        self.current
    }
}

/// Shift-register debouncer for an active-low push button.
pub struct Switch {
    switch_state: u8,
}

impl Default for Switch {
    fn default() -> Self {
        Switch { switch_state: 0xff }
    }
}

impl Switch {
    pub fn sample(&mut self, level: bool) {
        self.switch_state = (self.switch_state << 1) | (level as u8);
    }

    pub fn released(&self) -> bool {
        self.switch_state == 0x7f
    }

    pub fn just_pressed(&self) -> bool {
        self.switch_state == 0x80
    }

    pub fn pressed(&self) -> bool {
        self.switch_state == 0x00
    }

    pub fn changed(&self) -> bool {
        self.just_pressed() || self.released()
    }
}

/// Steps through a set of tracks forever, restarting the current one at its sentinel.
pub struct Player<'a> {
    tracks: &'a [&'a [u16]],
    selector: TrackSelector,
    position: usize,
}

impl<'a> Player<'a> {
    pub fn new(tracks: &'a [&'a [u16]], stored: u16) -> Self {
        Player {
            tracks,
            selector: TrackSelector::restore(stored, tracks.len() as u16),
            position: 0,
        }
    }

    pub fn track(&self) -> u16 {
        self.selector.current()
    }

    /// Switch to the next track and start it from the top.
    pub fn skip(&mut self) -> u16 {
        self.position = 0;
        self.selector.advance()
    }

    /// Advance the player by one step. Pass the debounced button so a fresh press skips.
    pub fn poll(&mut self, button: &Switch) -> Option<PortFrame> {
        if button.just_pressed() {
            self.skip();
        }
        self.next_frame()
    }

    pub fn next_frame(&mut self) -> Option<PortFrame> {
        self.next_value().map(PortFrame::from_value)
    }

    /// The raw table word behind the next frame.
    pub fn next_value(&mut self) -> Option<u16> {
        let table = self.tracks.get(self.selector.current() as usize)?;
        let value = match table.get(self.position) {
            Some(&value) if value != SENTINEL => value,
            _ => {
                self.position = 0;
                match table.first() {
                    Some(&value) if value != SENTINEL => value,
                    _ => return None,
                }
            }
        };
        self.position += 1;
        Some(value)
    }
}
