use std::{
    fs::File,
    io::{
        BufWriter,
        Seek,
        Write,
    },
    path::Path,
    time::Duration,
};

use crate::{
    source::sine::SineWave,
    tone::{
        PARK_FREQUENCY,
        ToneEvent,
    },
};

pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

#[derive(Debug, thiserror::Error)]
#[error("wav sink error")]
pub enum Error {
    Hound(#[from] hound::Error),
}

/// Synthesizes tone events into a mono 16 bit WAV stream.
///
/// Sample counts are derived from the total elapsed time, so rounding never
/// accumulates into drift over a long transmission.
#[derive(derive_more::Debug)]
pub struct WavSink<W>
where
    W: Write + Seek,
{
    #[debug(skip)]
    inner: hound::WavWriter<W>,
    sine: SineWave,
    amplitude: f32,
    elapsed: Duration,
    samples: u64,
}

impl<W> WavSink<W>
where
    W: Write + Seek,
{
    pub fn new(inner: hound::WavWriter<W>) -> Self {
        let sample_rate = inner.spec().sample_rate as f32;
        Self {
            inner,
            sine: SineWave::new(PARK_FREQUENCY, sample_rate),
            amplitude: 0.8,
            elapsed: Duration::ZERO,
            samples: 0,
        }
    }

    #[inline]
    pub fn from_writer(writer: W, sample_rate: u32) -> Result<Self, Error> {
        Ok(Self::new(hound::WavWriter::new(writer, spec(sample_rate))?))
    }

    /// Samples written so far.
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn write_tone(&mut self, tone: &ToneEvent) -> Result<(), Error> {
        self.elapsed += tone.duration;
        let sample_rate = u128::from(self.inner.spec().sample_rate);
        let target = (self.elapsed.as_nanos() * sample_rate / 1_000_000_000) as u64;

        self.sine.set_frequency(tone.frequency);
        while self.samples < target {
            let sample = self.sine.next() * self.amplitude * f32::from(i16::MAX);
            self.inner.write_sample(sample as i16)?;
            self.samples += 1;
        }
        Ok(())
    }

    pub fn write_tones<'a>(
        &mut self,
        tones: impl IntoIterator<Item = &'a ToneEvent>,
    ) -> Result<(), Error> {
        for tone in tones {
            self.write_tone(tone)?;
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<(), Error> {
        tracing::debug!(samples = self.samples, "finalizing wav file");
        self.inner.finalize()?;
        Ok(())
    }
}

impl WavSink<BufWriter<File>> {
    #[inline]
    pub fn from_path(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, Error> {
        Ok(Self::new(hound::WavWriter::create(path, spec(sample_rate))?))
    }
}

fn spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}
