//! Output oscillators.
//!
//! An [`Oscillator`] is written from two contexts: the sequencer holds protocol
//! tones and the pixel clock writes pixel tones from its tick context. The
//! two never write at the same time, but both only hold a shared reference,
//! so implementations use interior mutability. Writes must not block.

use std::{
    sync::atomic::{
        AtomicBool,
        AtomicU32,
        Ordering,
    },
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    timebase::Clock,
    tone::{
        PARK_FREQUENCY,
        ToneEvent,
    },
};

pub trait Oscillator: Send + Sync {
    /// Takes effect before the next sample boundary.
    fn set_frequency(&self, frequency: f32);

    /// Makes the oscillator fully inert until the next
    /// [`set_frequency`](Self::set_frequency).
    fn shutdown(&self);
}

impl<T> Oscillator for &T
where
    T: Oscillator,
{
    #[inline]
    fn set_frequency(&self, frequency: f32) {
        (**self).set_frequency(frequency);
    }

    #[inline]
    fn shutdown(&self) {
        (**self).shutdown();
    }
}

/// Numerically controlled oscillator. The frequency word is an atomic that a
/// synthesizer (e.g. [`NcoSource`](crate::audio::NcoSource)) reads every
/// sample.
#[derive(Debug, Default)]
pub struct Nco {
    frequency: AtomicU32,
    powered: AtomicBool,
}

impl Nco {
    #[inline]
    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Relaxed)
    }
}

impl Oscillator for Nco {
    #[inline]
    fn set_frequency(&self, frequency: f32) {
        self.frequency.store(frequency.to_bits(), Ordering::Relaxed);
        self.powered.store(true, Ordering::Relaxed);
    }

    #[inline]
    fn shutdown(&self) {
        self.frequency.store(PARK_FREQUENCY.to_bits(), Ordering::Relaxed);
        self.powered.store(false, Ordering::Relaxed);
    }
}

/// A single `set_frequency` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub at: Duration,
    pub frequency: f32,
}

/// Oscillator that logs every frequency change with its time.
///
/// Used to render transmissions offline and to check them in tests. Logging
/// takes a lock, so this is not meant for a real tick interrupt.
#[derive(derive_more::Debug)]
pub struct ToneRecorder<C> {
    clock: C,
    #[debug(skip)]
    records: Mutex<Vec<Record>>,
    powered: AtomicBool,
}

impl<C> ToneRecorder<C>
where
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            records: Mutex::new(Vec::new()),
            powered: AtomicBool::new(false),
        }
    }

    /// All frequency changes, including parking and shutdown.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Frequencies of all audible tones, in emission order.
    pub fn tones(&self) -> Vec<f32> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.frequency > PARK_FREQUENCY)
            .map(|record| record.frequency)
            .collect()
    }

    /// The log as tones with durations. Each record lasts until the next one;
    /// the last record gets a zero duration.
    pub fn tone_events(&self) -> Vec<ToneEvent> {
        let records = self.records.lock();
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let end = records.get(index + 1).map_or(record.at, |next| next.at);
                ToneEvent::new(record.frequency, end.saturating_sub(record.at))
            })
            .collect()
    }

    /// Whether the last thing written was the park frequency or a shutdown.
    pub fn is_idle(&self) -> bool {
        !self.powered.load(Ordering::Relaxed)
            || self
                .records
                .lock()
                .last()
                .is_none_or(|record| record.frequency <= PARK_FREQUENCY)
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Relaxed)
    }
}

impl<C> Oscillator for ToneRecorder<C>
where
    C: Clock,
{
    fn set_frequency(&self, frequency: f32) {
        let at = self.clock.now();
        self.records.lock().push(Record { at, frequency });
        self.powered.store(true, Ordering::Relaxed);
    }

    fn shutdown(&self) {
        let at = self.clock.now();
        let mut records = self.records.lock();
        if records
            .last()
            .is_some_and(|record| record.frequency > PARK_FREQUENCY)
        {
            records.push(Record {
                at,
                frequency: PARK_FREQUENCY,
            });
        }
        self.powered.store(false, Ordering::Relaxed);
    }
}
