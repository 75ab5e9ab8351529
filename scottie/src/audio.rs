//! Live playback of an [`Nco`] through the default audio output.

use std::sync::{
    Arc,
    Weak,
};

use parking_lot::Mutex;
use rodio::Source as _;

use crate::{
    oscillator::Nco,
    source::sine::SineWave,
    tone::PARK_FREQUENCY,
};

/// Synthesizes whatever frequency the oscillator is set to, sample by sample.
/// Ends once the oscillator is dropped.
#[derive(Clone, Debug)]
pub struct NcoSource {
    nco: Weak<Nco>,
    sine: SineWave,
}

impl NcoSource {
    pub fn new(nco: &Arc<Nco>, sample_rate: u32) -> Self {
        Self {
            nco: Arc::downgrade(nco),
            sine: SineWave::new(PARK_FREQUENCY, sample_rate as f32),
        }
    }
}

impl rodio::Source for NcoSource {
    #[inline]
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn channels(&self) -> rodio::ChannelCount {
        1
    }

    #[inline]
    fn sample_rate(&self) -> rodio::SampleRate {
        self.sine.sample_rate() as u32
    }

    #[inline]
    fn total_duration(&self) -> Option<std::time::Duration> {
        None
    }
}

impl Iterator for NcoSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let nco = self.nco.upgrade()?;
        let frequency = if nco.is_powered() {
            nco.frequency()
        }
        else {
            PARK_FREQUENCY
        };
        self.sine.set_frequency(frequency);
        Some(self.sine.next())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("audio error")]
pub enum Error {
    Stream(#[from] rodio::StreamError),
}

/// Starts playing `nco` on the default output device.
pub fn play(nco: &Arc<Nco>, sample_rate: u32, volume: f32) -> Result<(), Error> {
    let source = NcoSource::new(nco, sample_rate);
    global_output_stream()?
        .mixer()
        .add(source.amplify_normalized(volume));
    tracing::debug!(sample_rate, volume, "playing oscillator");
    Ok(())
}

fn global_output_stream() -> Result<&'static rodio::OutputStream, Error> {
    static OUTPUT_STREAM: Mutex<Option<&'static rodio::OutputStream>> = Mutex::new(None);

    let mut output_stream = OUTPUT_STREAM.lock();

    let stream = match *output_stream {
        Some(stream) => stream,
        None => {
            let stream: &'static rodio::OutputStream =
                Box::leak(Box::new(rodio::OutputStreamBuilder::open_default_stream()?));
            *output_stream = Some(stream);
            stream
        }
    };

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::oscillator::Oscillator;

    #[test]
    fn follows_the_oscillator() {
        let nco = Arc::new(Nco::default());
        let mut source = NcoSource::new(&nco, 8000);

        // unpowered is silent
        assert_eq!(source.next(), Some(0.0));

        nco.set_frequency(2000.0);
        let samples = source.by_ref().take(4).collect::<Vec<_>>();
        for (sample, expected) in samples.iter().zip([0.0, 1.0, 0.0, -1.0]) {
            assert_abs_diff_eq!(*sample, expected, epsilon = 1e-5);
        }

        nco.shutdown();
        assert_eq!(source.next(), Some(0.0));

        drop(nco);
        assert_eq!(source.next(), None);
    }
}
