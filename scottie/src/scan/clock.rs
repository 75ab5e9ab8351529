//! The pixel clock: a fixed-period task that emits one pixel tone per tick.
//!
//! [`pixel_clock`] splits the shared state into a [`ScanProducer`], owned by
//! the sequencer, and a [`PixelClockTask`], owned by the tick source. The
//! handoff between them is a single atomic state:
//!
//! - `IDLE`/`COMPLETE`: the producer owns every array and the oscillator.
//! - `EMITTING`: the task owns the oscillator and the array it scans. When it
//!   scans the evacuation array the producer may refill the current arrays.
//!
//! The producer publishes a scan with a release store of `EMITTING`; the task
//! hands it back with a release compare-exchange to `COMPLETE`.

use std::{
    hint::spin_loop,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            AtomicU8,
            AtomicU32,
            AtomicU64,
            AtomicUsize,
            Ordering,
        },
    },
    time::Duration,
};

use crate::{
    oscillator::Oscillator,
    raster::Channel,
    scan::{
        ScanSource,
        ScanlineBuffer,
    },
    tone::tone_for,
};

const IDLE: u8 = 0;
const EMITTING: u8 = 1;
const COMPLETE: u8 = 2;

const NO_BOUNDARY_TONE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Emitting,
    /// A scan finished. Only "not emitting" is meaningful to the producer.
    Complete,
}

/// One color scan of the current line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanRequest {
    pub channel: Channel,
    pub source: ScanSource,
    /// Emitted on the tick after the last pixel, so the next protocol tone
    /// starts exactly when the scan ends.
    pub boundary_tone: Option<f32>,
    /// The first pixel is emitted on the first tick at or after this time.
    /// Lets a scan be armed while the protocol tone before it is still held.
    pub start: Duration,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Pixel,
    Completed,
}

#[derive(Debug)]
struct Shared {
    lines: ScanlineBuffer,
    state: AtomicU8,
    channel: AtomicU8,
    evacuated: AtomicBool,
    boundary_tone: AtomicU32,
    index: AtomicUsize,
    start_at: AtomicU64,
    boundary_at: AtomicU64,
    in_tick: AtomicBool,
}

pub fn pixel_clock<O>(oscillator: Arc<O>, width: usize) -> (ScanProducer<O>, PixelClockTask<O>)
where
    O: Oscillator,
{
    let shared = Arc::new(Shared {
        lines: ScanlineBuffer::new(width),
        state: AtomicU8::new(IDLE),
        channel: AtomicU8::new(Channel::default().rgb_offset() as u8),
        evacuated: AtomicBool::new(false),
        boundary_tone: AtomicU32::new(NO_BOUNDARY_TONE),
        index: AtomicUsize::new(0),
        start_at: AtomicU64::new(0),
        boundary_at: AtomicU64::new(0),
        in_tick: AtomicBool::new(false),
    });

    (
        ScanProducer {
            shared: shared.clone(),
            oscillator: oscillator.clone(),
        },
        PixelClockTask { shared, oscillator },
    )
}

/// Sequencer side of the pixel clock.
#[derive(derive_more::Debug)]
pub struct ScanProducer<O> {
    shared: Arc<Shared>,
    #[debug(skip)]
    oscillator: Arc<O>,
}

impl<O> ScanProducer<O>
where
    O: Oscillator,
{
    pub fn state(&self) -> ClockState {
        match self.shared.state.load(Ordering::Acquire) {
            IDLE => ClockState::Idle,
            EMITTING => ClockState::Emitting,
            _ => ClockState::Complete,
        }
    }

    #[inline]
    pub fn is_emitting(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) == EMITTING
    }

    #[inline]
    pub fn lines(&self) -> &ScanlineBuffer {
        &self.shared.lines
    }

    /// Refills the current arrays. Allowed while the clock is not emitting, or
    /// while it scans the evacuation array.
    pub fn load_line(&mut self, line: &[u8]) {
        assert!(
            !self.reads_current(),
            "current arrays are being scanned by the pixel clock"
        );
        self.shared.lines.load_line(line);
    }

    pub fn evacuate(&mut self, channel: Channel) {
        assert!(!self.is_emitting(), "evacuating during a scan");
        self.shared.lines.evacuate(channel);
    }

    /// Starts a scan. The first pixel tone is emitted on the first tick at or
    /// after `request.start`.
    pub fn arm(&mut self, request: ScanRequest) {
        assert!(!self.is_emitting(), "armed while a scan is running");

        let shared = &*self.shared;
        shared
            .channel
            .store(request.channel.rgb_offset() as u8, Ordering::Relaxed);
        shared
            .evacuated
            .store(request.source == ScanSource::Evacuated, Ordering::Relaxed);
        shared.boundary_tone.store(
            request.boundary_tone.map_or(NO_BOUNDARY_TONE, f32::to_bits),
            Ordering::Relaxed,
        );
        shared.index.store(0, Ordering::Relaxed);
        shared
            .start_at
            .store(request.start.as_nanos() as u64, Ordering::Relaxed);
        shared.state.store(EMITTING, Ordering::Release);
    }

    /// Pixels emitted so far in the current scan.
    #[inline]
    pub fn progress(&self) -> usize {
        self.shared.index.load(Ordering::Relaxed)
    }

    /// When the last scan ended, i.e. when its boundary tone started. Only
    /// meaningful once the clock stopped emitting.
    pub fn boundary_time(&self) -> Duration {
        Duration::from_nanos(self.shared.boundary_at.load(Ordering::Acquire))
    }

    /// Forces the clock idle and parks the oscillator. Idempotent. Waits out a
    /// tick that is in flight, so `park_frequency` is always the last frequency
    /// written. Must not be called from the tick context.
    pub fn cancel(&mut self, park_frequency: f32) {
        let shared = &*self.shared;
        shared.state.store(IDLE, Ordering::SeqCst);
        while shared.in_tick.load(Ordering::SeqCst) {
            spin_loop();
        }
        self.oscillator.set_frequency(park_frequency);
    }

    fn reads_current(&self) -> bool {
        self.is_emitting() && !self.shared.evacuated.load(Ordering::Relaxed)
    }
}

/// Tick side of the pixel clock. Never blocks and never allocates.
#[derive(derive_more::Debug)]
pub struct PixelClockTask<O> {
    shared: Arc<Shared>,
    #[debug(skip)]
    oscillator: Arc<O>,
}

impl<O> PixelClockTask<O>
where
    O: Oscillator,
{
    /// Called by the tick source once per pixel period. `now` is the time of
    /// the tick on the sequencer's clock.
    pub fn tick(&mut self, now: Duration) -> Tick {
        let shared = &*self.shared;

        // pairs with the state store in `ScanProducer::cancel`: either this tick
        // sees the cancellation, or the cancellation waits for this tick.
        shared.in_tick.store(true, Ordering::SeqCst);
        let tick = if shared.state.load(Ordering::SeqCst) == EMITTING {
            self.emit(now)
        }
        else {
            Tick::Idle
        };
        shared.in_tick.store(false, Ordering::Release);

        tick
    }

    fn emit(&self, now: Duration) -> Tick {
        let shared = &*self.shared;
        let index = shared.index.load(Ordering::Relaxed);

        if index == 0 && (now.as_nanos() as u64) < shared.start_at.load(Ordering::Relaxed) {
            Tick::Idle
        }
        else if index < shared.lines.width() {
            let channel = Channel::from_rgb_offset(shared.channel.load(Ordering::Relaxed).into())
                .unwrap_or_default();
            let source = if shared.evacuated.load(Ordering::Relaxed) {
                ScanSource::Evacuated
            }
            else {
                ScanSource::Current
            };

            let value = shared.lines.sample(channel, source, index);
            self.oscillator.set_frequency(tone_for(value));
            shared.index.store(index + 1, Ordering::Relaxed);
            Tick::Pixel
        }
        else {
            let boundary_tone = shared.boundary_tone.load(Ordering::Relaxed);
            if boundary_tone != NO_BOUNDARY_TONE {
                self.oscillator.set_frequency(f32::from_bits(boundary_tone));
            }
            shared
                .boundary_at
                .store(now.as_nanos() as u64, Ordering::Relaxed);

            // fails if the scan was cancelled meanwhile, which leaves it idle
            let _ = shared.state.compare_exchange(
                EMITTING,
                COMPLETE,
                Ordering::Release,
                Ordering::Relaxed,
            );
            Tick::Completed
        }
    }
}
