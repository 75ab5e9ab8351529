//! Drives a whole Scottie transmission: VOX, calibration header, first sync
//! and all lines.
//!
//! Fixed protocol tones are held by the sequencer itself. Pixel tones are
//! handed to the pixel clock one color scan at a time; while the last channel
//! of a line is scanned from the evacuation array, the next line is read into
//! the current arrays.

pub mod state;

use std::{
    io::Read,
    path::Path,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::Duration,
};

use crate::{
    modes::ModeSpecification,
    oscillator::Oscillator,
    raster::Channel,
    scan::{
        ScanSource,
        clock::{
            ScanProducer,
            ScanRequest,
            pixel_clock,
        },
    },
    sequencer::state::{
        HeaderState,
        LineState,
        State,
    },
    source::raster::{
        LineRead,
        RasterReader,
    },
    timebase::Timebase,
    tone::PARK_FREQUENCY,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transmit resource unavailable")]
    ResourceUnavailable(#[source] std::io::Error),

    #[error("could not open image stream")]
    StreamOpen(#[source] std::io::Error),

    #[error("image stream failed at line {line}")]
    Stream {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("transmission cancelled before it started")]
    Cancelled,

    #[error("transmission aborted at line {line}")]
    Aborted { line: usize },
}

/// Operational settings of a transmitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransmitConfig {
    /// Send the VOX tone burst before the calibration header.
    pub vox: bool,
    /// Period of the pixel clock. Slightly shorter than the nominal pixel
    /// time, to make up for dispatch overhead.
    pub pixel_period: Duration,
    /// Fixed tones are held until their nominal duration minus this.
    pub guard: Duration,
    /// Frequency the oscillator is left at when the transmission ends.
    pub park_frequency: f32,
}

impl TransmitConfig {
    pub const DEFAULT_PIXEL_PERIOD: Duration = Duration::from_micros(430);
    pub const DEFAULT_GUARD: Duration = Duration::from_micros(10);
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            vox: true,
            pixel_period: Self::DEFAULT_PIXEL_PERIOD,
            guard: Self::DEFAULT_GUARD,
            park_frequency: PARK_FREQUENCY,
        }
    }
}

/// Requests a running transmission to stop. Clones share the request.
///
/// A request made while no transmission runs cancels the next one. Every
/// transmission consumes the request, so the transmitter can be reused.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    #[inline]
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    fn clear(&self) -> bool {
        self.aborted.swap(false, Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransmitSummary {
    /// Lines sent completely.
    pub lines: usize,
    /// Lines that were partly or entirely missing from the stream.
    pub short_lines: usize,
    pub elapsed: Duration,
}

#[derive(derive_more::Debug)]
pub struct Transmitter<O, T> {
    mode: ModeSpecification,
    config: TransmitConfig,
    #[debug(skip)]
    oscillator: Arc<O>,
    #[debug(skip)]
    timebase: T,
    abort: AbortHandle,
}

impl<O, T> Transmitter<O, T>
where
    O: Oscillator,
    T: Timebase<O>,
{
    pub fn new(oscillator: Arc<O>, timebase: T) -> Self {
        Self {
            mode: ModeSpecification::S1,
            config: TransmitConfig::default(),
            oscillator,
            timebase,
            abort: AbortHandle::default(),
        }
    }

    pub fn with_config(mut self, config: TransmitConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares `abort` with this transmitter instead of its own handle.
    pub fn with_abort_handle(mut self, abort: AbortHandle) -> Self {
        self.abort = abort;
        self
    }

    pub fn with_mode(mut self, mode: ModeSpecification) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn mode(&self) -> &ModeSpecification {
        &self.mode
    }

    #[inline]
    pub fn config(&self) -> &TransmitConfig {
        &self.config
    }

    #[inline]
    pub fn timebase(&self) -> &T {
        &self.timebase
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Transmits a raster file. Nothing is emitted if it can't be opened.
    pub fn transmit_file(&mut self, path: impl AsRef<Path>) -> Result<TransmitSummary, Error> {
        let path = path.as_ref();
        let reader = RasterReader::open(path, self.mode.line_bytes()).map_err(|error| {
            tracing::warn!(?path, %error, "could not open image stream");
            Error::StreamOpen(error)
        })?;
        self.transmit(reader)
    }

    /// Transmits a raster stream. Blocks until the transmission ends.
    ///
    /// The stream is read one line ahead of the scan. If it ends early the
    /// missing pixels are sent as white; any other read error aborts the
    /// transmission. Either way the oscillator is left idle.
    pub fn transmit<R>(&mut self, mut reader: RasterReader<R>) -> Result<TransmitSummary, Error>
    where
        R: Read,
    {
        let mut summary = TransmitSummary::default();
        let started = self.timebase.now();
        tracing::debug!(mode = self.mode.name, config = ?self.config);

        if self.abort.clear() {
            tracing::warn!("transmission cancelled before it started");
            return Err(Error::Cancelled);
        }

        let mut line = vec![0; self.mode.line_bytes()];
        read_line(&mut reader, &mut line, 0, &mut summary)
            .map_err(|source| Error::Stream { line: 0, source })?;

        let (mut producer, task) = pixel_clock(self.oscillator.clone(), self.mode.pixels_per_line);
        producer.load_line(&line);
        self.timebase
            .start_ticks(task, self.config.pixel_period)
            .map_err(Error::ResourceUnavailable)?;

        let result = self.run(&mut producer, &mut reader, &mut line, &mut summary);

        producer.cancel(self.config.park_frequency);
        self.timebase.stop_ticks();
        self.oscillator.shutdown();
        self.abort.clear();
        summary.elapsed = self.timebase.now().saturating_sub(started);

        match &result {
            Ok(()) => {
                tracing::info!(
                    lines = summary.lines,
                    short_lines = summary.short_lines,
                    elapsed = ?summary.elapsed,
                    "transmission complete"
                );
            }
            Err(error) => {
                tracing::warn!(%error, lines = summary.lines, "transmission aborted");
            }
        }

        result.map(|()| summary)
    }

    fn run<R>(
        &mut self,
        producer: &mut ScanProducer<O>,
        reader: &mut RasterReader<R>,
        line: &mut [u8],
        summary: &mut TransmitSummary,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        let mode = self.mode;
        let mut state = State::initial(self.config.vox);
        // start of a fixed tone the pixel clock already switched to
        let mut boundary = None;
        // the scan of the current state was armed while the tone before it was held
        let mut armed = false;

        loop {
            let y = match state {
                State::Line { y, .. } => y,
                _ => 0,
            };
            if self.abort.is_aborted() {
                return Err(Error::Aborted { line: y });
            }
            log_state(&state, &mode);

            match state {
                State::Line {
                    y,
                    line_state: LineState::Scan { channel },
                } => {
                    let request = scan_request(&mode, &state, self.timebase.now());
                    if let Some(request) = request.filter(|_| !armed) {
                        producer.arm(request);
                    }
                    armed = false;

                    if prefetches(&mode, y, channel) {
                        read_line(reader, line, y + 1, summary)
                            .map_err(|source| Error::Stream { line: y + 1, source })?;
                        producer.load_line(line);
                    }

                    self.wait_scan(producer, y)?;

                    let next = state.next(&mode);
                    boundary = next
                        .and_then(|next| next.tone(&mode))
                        .map(|_| producer.boundary_time());

                    if channel == mode.last_channel() {
                        summary.lines += 1;
                    }
                    match next {
                        Some(next) => state = next,
                        None => return Ok(()),
                    }
                }
                _ => {
                    if let Some(tone) = state.tone(&mode) {
                        let start = match boundary.take() {
                            Some(start) => start,
                            None => {
                                self.oscillator.set_frequency(tone.frequency);
                                self.timebase.now()
                            }
                        };

                        if state == (State::Line { y, line_state: LineState::Sync })
                            && y + 1 < mode.num_lines
                        {
                            producer.evacuate(mode.last_channel());
                        }

                        let deadline = (start + tone.duration).saturating_sub(self.config.guard);

                        // the first pixel of the next scan ends this tone
                        if let Some(request) = state
                            .next(&mode)
                            .and_then(|next| scan_request(&mode, &next, deadline))
                        {
                            producer.arm(request);
                            self.timebase.align_ticks(deadline);
                            armed = true;
                        }

                        self.hold(deadline, y)?;
                    }

                    match state.next(&mode) {
                        Some(next) => state = next,
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    /// Polls the pixel clock until the armed scan is complete.
    fn wait_scan(&mut self, producer: &ScanProducer<O>, y: usize) -> Result<(), Error> {
        while producer.is_emitting() {
            if self.abort.is_aborted() {
                return Err(Error::Aborted { line: y });
            }
            self.timebase.relax();
        }
        Ok(())
    }

    /// Holds the current tone until `deadline`. Checks for an abort at least
    /// once per pixel period.
    fn hold(&mut self, deadline: Duration, y: usize) -> Result<(), Error> {
        loop {
            let now = self.timebase.now();
            if now >= deadline {
                return Ok(());
            }
            if self.abort.is_aborted() {
                return Err(Error::Aborted { line: y });
            }
            self.timebase
                .wait_until(deadline.min(now + self.config.pixel_period));
        }
    }
}

fn prefetches(mode: &ModeSpecification, y: usize, channel: Channel) -> bool {
    channel == mode.last_channel() && y + 1 < mode.num_lines
}

/// The scan a state sends, if it is a scan. The next line is prefetched while
/// the last channel is scanned from the evacuation array.
fn scan_request(mode: &ModeSpecification, state: &State, start: Duration) -> Option<ScanRequest> {
    let State::Line {
        y,
        line_state: LineState::Scan { channel },
    } = *state
    else {
        return None;
    };

    let boundary_tone = state
        .next(mode)
        .and_then(|next| next.tone(mode))
        .map(|tone| tone.frequency);

    Some(ScanRequest {
        channel,
        source: if prefetches(mode, y, channel) {
            ScanSource::Evacuated
        }
        else {
            ScanSource::Current
        },
        boundary_tone,
        start,
    })
}

fn read_line<R>(
    reader: &mut RasterReader<R>,
    line: &mut [u8],
    y: usize,
    summary: &mut TransmitSummary,
) -> std::io::Result<()>
where
    R: Read,
{
    if let LineRead::Short { bytes } = reader.read_line(line)? {
        tracing::warn!(y, bytes, "short read, filling line with sentinel");
        summary.short_lines += 1;
    }
    Ok(())
}

fn log_state(state: &State, mode: &ModeSpecification) {
    match state {
        State::Vox { index: 0 } => tracing::info!("sending vox tones"),
        State::Header {
            header_state: HeaderState::Leader1,
        } => {
            tracing::info!(
                mode = mode.short_name,
                vis_code = mode.vis_code.get(),
                "sending calibration header"
            );
        }
        State::FirstSync => tracing::info!("sending first sync"),
        State::Line {
            y,
            line_state: LineState::Separator { channel },
        } if *channel == mode.channel_order[0] && y % 32 == 0 => {
            tracing::debug!(y, "sending line");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        io::Cursor,
        rc::Rc,
        sync::Arc,
    };

    use super::*;
    use crate::{
        oscillator::ToneRecorder,
        raster::Raster,
        scan::clock::PixelClockTask,
        timebase::{
            SimClock,
            SimulatedTimebase,
        },
        tone::ToneEvent,
    };

    fn transmitter(
        config: TransmitConfig,
    ) -> (
        Arc<ToneRecorder<SimClock>>,
        Transmitter<ToneRecorder<SimClock>, SimulatedTimebase<ToneRecorder<SimClock>>>,
    ) {
        let clock = SimClock::default();
        let recorder = Arc::new(ToneRecorder::new(clock.clone()));
        let transmitter =
            Transmitter::new(recorder.clone(), SimulatedTimebase::new(clock)).with_config(config);
        (recorder, transmitter)
    }

    fn reader(raster: &Raster) -> RasterReader<Cursor<Vec<u8>>> {
        RasterReader::new(Cursor::new(raster.as_bytes().to_vec()), raster.line_bytes())
    }

    #[test]
    fn sends_every_tone() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig::default());
        let raster = Raster::for_mode(&ModeSpecification::S1);
        let summary = transmitter.transmit(reader(&raster)).unwrap();

        assert_eq!(summary.lines, 256);
        assert_eq!(summary.short_lines, 0);
        // vox, header, first sync, then per line 3 scans and 4 fixed tones
        assert_eq!(recorder.tones().len(), 8 + 13 + 1 + 256 * (3 * 320 + 4));
        assert!(recorder.is_idle());
    }

    #[test]
    fn elapsed_time_follows_pixel_period() {
        let (_recorder, mut transmitter) = transmitter(TransmitConfig {
            vox: false,
            ..Default::default()
        });
        let raster = Raster::for_mode(&ModeSpecification::S1);
        let summary = transmitter.transmit(reader(&raster)).unwrap();

        // every fixed tone is cut short by the guard, scans are exact
        let scans = 256.0 * 3.0 * 320.0 * 430e-6;
        let fixed = 256.0 * (3.0 * 1.5e-3 + 9e-3);
        let header = 0.3 + 0.01 + 0.3 + 10.0 * 0.03 + 0.009;
        let guards = (256.0 * 4.0 + 14.0) * 10e-6;
        let expected = scans + fixed + header - guards;

        let elapsed = summary.elapsed.as_secs_f64();
        assert!((elapsed - expected).abs() < 1e-4, "{elapsed} vs {expected}");
    }

    #[test]
    fn short_stream_is_padded() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig {
            vox: false,
            ..Default::default()
        });
        let bytes = vec![0u8; 10 * 960 + 100];
        let summary = transmitter
            .transmit(RasterReader::new(Cursor::new(bytes), 960))
            .unwrap();

        assert_eq!(summary.lines, 256);
        assert_eq!(summary.short_lines, 246);
        assert!(recorder.is_idle());
    }

    #[test]
    fn cancel_before_start_emits_nothing() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig::default());
        transmitter.abort_handle().abort();

        let raster = Raster::for_mode(&ModeSpecification::S1);
        let error = transmitter.transmit(reader(&raster)).unwrap_err();
        assert!(matches!(error, Error::Cancelled));
        assert!(recorder.records().is_empty());
        assert!(recorder.is_idle());
    }

    #[test]
    fn missing_file_emits_nothing() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig::default());
        let error = transmitter
            .transmit_file("/nonexistent/raster.rgb")
            .unwrap_err();
        assert!(matches!(error, Error::StreamOpen(_)));
        assert!(recorder.records().is_empty());
    }

    #[test]
    fn read_error_aborts_mid_stream() {
        struct FailAfter(usize);
        impl Read for FailAfter {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0 == 0 {
                    return Err(std::io::ErrorKind::ConnectionReset.into());
                }
                let n = buf.len().min(self.0);
                buf[..n].fill(0x80);
                self.0 -= n;
                Ok(n)
            }
        }

        let (recorder, mut transmitter) = transmitter(TransmitConfig::default());
        let error = transmitter
            .transmit(RasterReader::new(FailAfter(3 * 960), 960))
            .unwrap_err();

        assert!(matches!(error, Error::Stream { line: 3, .. }), "{error:?}");
        assert!(recorder.is_idle());
        assert!(!recorder.is_powered());
    }

    #[test]
    fn transmitter_is_reusable_after_abort() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig {
            vox: false,
            ..Default::default()
        });
        let raster = Raster::for_mode(&ModeSpecification::S1);

        transmitter.abort_handle().abort();
        assert!(matches!(
            transmitter.transmit(reader(&raster)),
            Err(Error::Cancelled)
        ));
        assert!(!transmitter.abort_handle().is_aborted());

        let summary = transmitter.transmit(reader(&raster)).unwrap();
        assert_eq!(summary.lines, 256);
        assert!(recorder.is_idle());
    }

    /// Black raster stream that aborts the transmission when `line` is read.
    struct AbortOnLine {
        line: usize,
        offset: usize,
        abort: AbortHandle,
        recorder: Arc<ToneRecorder<SimClock>>,
        records_at_abort: Rc<Cell<Option<usize>>>,
    }

    impl Read for AbortOnLine {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.offset == self.line * 960 && self.records_at_abort.get().is_none() {
                self.abort.abort();
                self.records_at_abort
                    .set(Some(self.recorder.records().len()));
            }
            buf.fill(0);
            self.offset += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn abort_mid_stream_stops_at_the_line_being_sent() {
        let (recorder, mut transmitter) = transmitter(TransmitConfig::default());
        let records_at_abort = Rc::new(Cell::new(None));
        let stream = AbortOnLine {
            line: 5,
            offset: 0,
            abort: transmitter.abort_handle(),
            recorder: recorder.clone(),
            records_at_abort: records_at_abort.clone(),
        };

        let error = transmitter
            .transmit(RasterReader::new(stream, 960))
            .unwrap_err();

        // line 5 is prefetched while the red of line 4 is sent
        assert!(matches!(error, Error::Aborted { line: 4 }), "{error:?}");
        assert!(recorder.is_idle());
        assert!(!recorder.is_powered());

        let records = recorder.records();
        let at_abort = records_at_abort.get().unwrap();
        assert!(at_abort > 0);
        assert!(
            records[at_abort..]
                .iter()
                .all(|record| ToneEvent::new(record.frequency, Duration::ZERO).is_inert())
        );
    }

    /// Simulated timebase that raises an abort once its clock passes `at`.
    struct AbortAt {
        inner: SimulatedTimebase<ToneRecorder<SimClock>>,
        at: Duration,
        abort: AbortHandle,
    }

    impl Timebase<ToneRecorder<SimClock>> for AbortAt {
        fn now(&self) -> Duration {
            self.inner.now()
        }

        fn wait_until(&mut self, deadline: Duration) {
            self.inner.wait_until(deadline);
            if self.inner.now() >= self.at {
                self.abort.abort();
            }
        }

        fn relax(&mut self) {
            self.inner.relax();
        }

        fn start_ticks(
            &mut self,
            task: PixelClockTask<ToneRecorder<SimClock>>,
            period: Duration,
        ) -> std::io::Result<()> {
            self.inner.start_ticks(task, period)
        }

        fn align_ticks(&mut self, at: Duration) {
            self.inner.align_ticks(at);
        }

        fn stop_ticks(&mut self) {
            self.inner.stop_ticks();
        }
    }

    #[test]
    fn abort_during_a_long_tone_is_noticed_within_a_period() {
        let clock = SimClock::default();
        let recorder = Arc::new(ToneRecorder::new(clock.clone()));
        let abort = AbortHandle::default();
        let at = Duration::from_millis(150);
        let timebase = AbortAt {
            inner: SimulatedTimebase::new(clock),
            at,
            abort: abort.clone(),
        };
        let mut transmitter = Transmitter::new(recorder.clone(), timebase).with_abort_handle(abort);

        let raster = Raster::for_mode(&ModeSpecification::S1);
        let error = transmitter.transmit(reader(&raster)).unwrap_err();
        assert!(matches!(error, Error::Aborted { line: 0 }), "{error:?}");

        // aborted in the second vox tone, well before its 100 ms are up
        assert_eq!(recorder.tones().len(), 2);
        let parked = *recorder.records().last().unwrap();
        assert!(parked.at >= at);
        assert!(parked.at <= at + TransmitConfig::DEFAULT_PIXEL_PERIOD);
        assert!(recorder.is_idle());
    }
}
