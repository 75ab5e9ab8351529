//! Scanline storage shared between the sequencer and the pixel clock.
//!
//! The sequencer is the only writer and the pixel clock the only reader.
//! Which arrays either side may touch is decided by the pixel clock state (see
//! [`clock`]). The arrays themselves are byte atomics accessed with relaxed
//! ordering, so the handoff never needs a lock and a misbehaving producer can
//! at worst garble a line, never cause a data race.

pub mod clock;

use std::sync::atomic::{
    AtomicU8,
    Ordering,
};

use crate::raster::{
    BYTES_PER_PIXEL,
    Channel,
};

/// Where the pixel clock reads a scan from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanSource {
    /// The line in the current arrays.
    Current,
    /// The shadow copy taken by [`ScanlineBuffer::evacuate`], while the current
    /// arrays are refilled with the next line.
    Evacuated,
}

/// Current R, G and B arrays of one line, plus the evacuation array.
#[derive(Debug)]
pub struct ScanlineBuffer {
    current: [Box<[AtomicU8]>; 3],
    evacuated: Box<[AtomicU8]>,
}

impl ScanlineBuffer {
    /// Allocates all arrays. Nothing is allocated after this.
    pub fn new(width: usize) -> Self {
        Self {
            current: std::array::from_fn(|_| zeroed(width)),
            evacuated: zeroed(width),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.evacuated.len()
    }

    /// Splits an interleaved RGB line into the current arrays.
    pub fn load_line(&self, line: &[u8]) {
        assert_eq!(line.len(), self.width() * BYTES_PER_PIXEL);

        for (x, rgb) in line.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            for (offset, value) in rgb.iter().enumerate() {
                self.current[offset][x].store(*value, Ordering::Relaxed);
            }
        }
    }

    /// Copies the current array of `channel` into the evacuation array.
    pub fn evacuate(&self, channel: Channel) {
        for (shadow, value) in self.evacuated.iter().zip(self.current(channel)) {
            shadow.store(value.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn sample(&self, channel: Channel, source: ScanSource, x: usize) -> u8 {
        let array = match source {
            ScanSource::Current => self.current(channel),
            ScanSource::Evacuated => &self.evacuated,
        };
        array[x].load(Ordering::Relaxed)
    }

    /// Snapshot of one array, for inspection.
    pub fn to_vec(&self, channel: Channel, source: ScanSource) -> Vec<u8> {
        (0..self.width())
            .map(|x| self.sample(channel, source, x))
            .collect()
    }

    #[inline]
    fn current(&self, channel: Channel) -> &[AtomicU8] {
        &self.current[channel.rgb_offset()]
    }
}

fn zeroed(width: usize) -> Box<[AtomicU8]> {
    (0..width).map(|_| AtomicU8::new(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_line_deinterleaves() {
        let buffer = ScanlineBuffer::new(4);
        let line = [0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32];
        buffer.load_line(&line);

        assert_eq!(buffer.to_vec(Channel::Red, ScanSource::Current), [0, 10, 20, 30]);
        assert_eq!(buffer.to_vec(Channel::Green, ScanSource::Current), [1, 11, 21, 31]);
        assert_eq!(buffer.to_vec(Channel::Blue, ScanSource::Current), [2, 12, 22, 32]);
    }

    #[test]
    fn evacuated_copy_survives_refill() {
        let buffer = ScanlineBuffer::new(2);
        buffer.load_line(&[1, 2, 3, 4, 5, 6]);
        buffer.evacuate(Channel::Red);
        buffer.load_line(&[7, 8, 9, 10, 11, 12]);

        assert_eq!(buffer.to_vec(Channel::Red, ScanSource::Evacuated), [1, 4]);
        assert_eq!(buffer.to_vec(Channel::Red, ScanSource::Current), [7, 10]);
        assert_eq!(buffer.sample(Channel::Green, ScanSource::Evacuated, 1), 4);
    }

    #[test]
    #[should_panic]
    fn rejects_short_lines() {
        ScanlineBuffer::new(320).load_line(&[0; 959]);
    }
}
