//! Clocks and tick sources.
//!
//! The sequencer never touches [`Instant`] directly. It waits, reads the time
//! and hands the pixel clock task to a [`Timebase`], which either runs it on a
//! real tick thread ([`RealtimeTimebase`]) or steps it on a virtual clock
//! ([`SimulatedTimebase`]).

use std::{
    io::ErrorKind,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            AtomicU64,
            Ordering,
        },
    },
    thread::{
        self,
        JoinHandle,
    },
    time::{
        Duration,
        Instant,
    },
};

use spin_sleep::SpinSleeper;

use crate::{
    oscillator::Oscillator,
    scan::clock::{
        PixelClockTask,
        Tick,
    },
};

pub trait Clock: Send + Sync {
    /// Time since the clock's origin. Monotonic.
    fn now(&self) -> Duration;
}

impl<C> Clock for &C
where
    C: Clock,
{
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock,
{
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant that is `at` after the origin.
    #[inline]
    pub fn instant(&self, at: Duration) -> Instant {
        self.origin + at
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    nanos: Arc<AtomicU64>,
}

impl SimClock {
    /// Moves the clock to `at`. The clock never goes backwards.
    #[inline]
    pub fn set(&self, at: Duration) {
        self.nanos.fetch_max(at.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl Clock for SimClock {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

/// Time source and tick source of a transmission.
pub trait Timebase<O> {
    fn now(&self) -> Duration;

    /// Blocks until `deadline`. Ticks that fall before it are delivered.
    fn wait_until(&mut self, deadline: Duration);

    /// Gives way while polling the pixel clock. Returns after at most one
    /// tick period.
    fn relax(&mut self);

    /// Starts delivering ticks to `task` every `period`. A zero period is
    /// rejected with [`ErrorKind::InvalidInput`].
    fn start_ticks(&mut self, task: PixelClockTask<O>, period: Duration) -> std::io::Result<()>;

    /// Moves the tick grid so that a tick falls on `at`. Ticks between now and
    /// `at` are skipped. Must be requested at least one period ahead.
    fn align_ticks(&mut self, at: Duration);

    /// Stops the tick source and drops the task. Idempotent.
    fn stop_ticks(&mut self);
}

#[derive(derive_more::Debug)]
struct SimulatedTicks<O> {
    #[debug(skip)]
    task: PixelClockTask<O>,
    period: Duration,
    next: Duration,
}

/// Discrete-event timebase. Waiting advances the virtual clock instantly and
/// runs every tick that falls in between, so a whole transmission is
/// simulated in a fraction of its real duration.
#[derive(derive_more::Debug)]
pub struct SimulatedTimebase<O> {
    clock: SimClock,
    ticks: Option<SimulatedTicks<O>>,
}

impl<O> SimulatedTimebase<O>
where
    O: Oscillator,
{
    pub fn new(clock: SimClock) -> Self {
        Self { clock, ticks: None }
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    fn tick(&mut self) {
        if let Some(ticks) = &mut self.ticks {
            self.clock.set(ticks.next);
            ticks.task.tick(ticks.next);
            ticks.next += ticks.period;
        }
    }
}

impl<O> Timebase<O> for SimulatedTimebase<O>
where
    O: Oscillator,
{
    #[inline]
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn wait_until(&mut self, deadline: Duration) {
        while self.ticks.as_ref().is_some_and(|ticks| ticks.next < deadline) {
            self.tick();
        }
        self.clock.set(deadline);
    }

    fn relax(&mut self) {
        self.tick();
    }

    fn start_ticks(&mut self, task: PixelClockTask<O>, period: Duration) -> std::io::Result<()> {
        check_period(period)?;
        self.ticks = Some(SimulatedTicks {
            task,
            period,
            next: self.clock.now() + period,
        });
        Ok(())
    }

    fn align_ticks(&mut self, at: Duration) {
        if let Some(ticks) = &mut self.ticks {
            ticks.next = at;
        }
    }

    fn stop_ticks(&mut self) {
        self.ticks = None;
    }
}

const NOT_ALIGNED: u64 = u64::MAX;

#[derive(Debug)]
struct Ticker {
    running: Arc<AtomicBool>,
    align: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

/// Wall-clock timebase. Ticks run on a dedicated `pixel-clock` thread that
/// unparks the sequencer whenever a scan completes.
#[derive(derive_more::Debug)]
pub struct RealtimeTimebase<O> {
    clock: MonotonicClock,
    #[debug(skip)]
    sleeper: SpinSleeper,
    ticker: Option<Ticker>,
    period: Duration,
    _oscillator: PhantomData<fn(O)>,
}

impl<O> RealtimeTimebase<O> {
    pub fn new() -> Self {
        Self {
            clock: MonotonicClock::new(),
            sleeper: SpinSleeper::default(),
            ticker: None,
            period: Duration::ZERO,
            _oscillator: PhantomData,
        }
    }

    #[inline]
    pub fn clock(&self) -> &MonotonicClock {
        &self.clock
    }
}

impl<O> Default for RealtimeTimebase<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Timebase<O> for RealtimeTimebase<O>
where
    O: Oscillator + 'static,
{
    #[inline]
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn wait_until(&mut self, deadline: Duration) {
        let deadline = self.clock.instant(deadline);
        self.sleeper
            .sleep(deadline.saturating_duration_since(Instant::now()));
    }

    fn relax(&mut self) {
        thread::park_timeout(self.period);
    }

    fn start_ticks(
        &mut self,
        mut task: PixelClockTask<O>,
        period: Duration,
    ) -> std::io::Result<()> {
        check_period(period)?;
        self.stop_ticks();

        let running = Arc::new(AtomicBool::new(true));
        let align = Arc::new(AtomicU64::new(NOT_ALIGNED));
        let producer = thread::current();
        let clock = self.clock;
        let sleeper = self.sleeper;
        let mut next = clock.now() + period;

        let handle = thread::Builder::new().name("pixel-clock".to_owned()).spawn({
            let running = running.clone();
            let align = align.clone();
            move || {
                while running.load(Ordering::Acquire) {
                    let at = align.swap(NOT_ALIGNED, Ordering::Acquire);
                    if at != NOT_ALIGNED {
                        next = Duration::from_nanos(at);
                    }
                    sleeper.sleep(clock.instant(next).saturating_duration_since(Instant::now()));
                    if task.tick(next) == Tick::Completed {
                        producer.unpark();
                    }
                    next += period;
                }
            }
        })?;

        tracing::debug!(?period, "pixel clock thread started");
        self.period = period;
        self.ticker = Some(Ticker {
            running,
            align,
            handle,
        });
        Ok(())
    }

    fn align_ticks(&mut self, at: Duration) {
        if let Some(ticker) = &self.ticker {
            ticker
                .align
                .store(at.as_nanos() as u64, Ordering::Release);
        }
    }

    fn stop_ticks(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.running.store(false, Ordering::Release);
            if ticker.handle.join().is_err() {
                tracing::warn!("pixel clock thread panicked");
            }
        }
    }
}

fn check_period(period: Duration) -> std::io::Result<()> {
    if period.is_zero() {
        Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            "pixel period must be greater than 0",
        ))
    }
    else {
        Ok(())
    }
}

impl<O> Drop for RealtimeTimebase<O> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.running.store(false, Ordering::Release);
            let _ = ticker.handle.join();
        }
    }
}
