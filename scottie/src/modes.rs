//! Mode specifications
//!
//! Only Scottie S1 is transmitted, but the timing, geometry and channel order
//! all live in [`ModeSpecification`] so the sequencer never hard-codes them.
//!
//! Timing adapted from [here][1]. [Vis codes][2]
//!
//! [1]: https://github.com/windytan/slowrx/blob/master/modespec.c
//! [2]: https://web.archive.org/web/20050306193820/http://www.tima.com/~djones/vis.txt

use std::time::Duration;

use crate::raster::Channel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VisCode(u8);

impl VisCode {
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        if value & 0x80 == 0 {
            Some(Self(value))
        }
        else {
            None
        }
    }

    #[inline]
    pub fn get(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn get_bit(&self, bit: u8) -> bool {
        assert!(bit < 7);
        (self.0 >> bit) & 1 != 0
    }

    /// Even parity bit sent after the 7 data bits.
    #[inline]
    pub fn parity(&self) -> bool {
        self.0.count_ones() & 1 != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeSpecification {
    pub name: &'static str,
    pub short_name: &'static str,
    pub sync_time: Duration,
    pub porch_time: Duration,
    pub sep_time: Duration,
    /// Nominal pixel dwell time. The pixel clock may run on a shorter,
    /// calibrated period (see
    /// [`TransmitConfig::pixel_period`](crate::sequencer::TransmitConfig)).
    pub pixel_time: Duration,
    pub pixels_per_line: usize,
    pub num_lines: usize,
    /// Order in which the color channels of a line are scanned. The last
    /// channel is preceded by the line sync and scanned from the evacuation
    /// buffer while the next line is prefetched.
    pub channel_order: [Channel; 3],
    pub vis_code: VisCode,
}

impl ModeSpecification {
    /// N7CXI, 2000
    pub const S1: Self = Self {
        name: "Scottie S1",
        short_name: "S1",
        sync_time: Duration::from_micros(9000),
        porch_time: Duration::from_micros(1500),
        sep_time: Duration::from_micros(1500),
        pixel_time: Duration::from_micros(432),
        pixels_per_line: 320,
        num_lines: 256,
        channel_order: [Channel::Green, Channel::Blue, Channel::Red],
        vis_code: VisCode(60),
    };

    /// Time to scan one color channel of a line at the nominal dwell.
    #[inline]
    pub fn scan_time(&self) -> Duration {
        self.pixel_time * self.pixels_per_line as u32
    }

    /// Nominal time for a whole line, from its first separator to the end of
    /// its last scan.
    pub fn line_time(&self) -> Duration {
        2 * self.sep_time + self.sync_time + self.porch_time + 3 * self.scan_time()
    }

    /// Bytes of one interleaved RGB scanline in the storage layout.
    #[inline]
    pub fn line_bytes(&self) -> usize {
        self.pixels_per_line * 3
    }

    #[inline]
    pub fn last_channel(&self) -> Channel {
        self.channel_order[2]
    }

    /// Position of `channel` in the scan order.
    pub fn channel_position(&self, channel: Channel) -> usize {
        self.channel_order
            .iter()
            .position(|c| *c == channel)
            .unwrap_or_else(|| panic!("{channel:?} not in channel order of {}", self.name))
    }
}

impl Default for ModeSpecification {
    fn default() -> Self {
        Self::S1
    }
}
