use std::f32::consts::TAU;

use crate::tone::PARK_FREQUENCY;

#[inline]
fn step_from_frequency_and_sample_rate(frequency: f32, sample_rate: f32) -> f32 {
    (TAU * frequency / sample_rate).rem_euclid(TAU)
}

/// Phase-continuous sine generator. Changing the frequency keeps the phase,
/// so tone changes don't click. Parked at or below [`PARK_FREQUENCY`] it
/// outputs silence.
#[derive(Clone, Copy, Debug)]
pub struct SineWave {
    frequency: f32,
    sample_rate: f32,
    phase: f32,
    step: f32,
}

impl SineWave {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            frequency,
            sample_rate,
            phase: 0.0,
            step: step_from_frequency_and_sample_rate(frequency, sample_rate),
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.step = step_from_frequency_and_sample_rate(frequency, self.sample_rate);
        }
    }

    pub fn next(&mut self) -> f32 {
        if self.frequency <= PARK_FREQUENCY {
            return 0.0;
        }

        let output = self.phase.sin();
        self.phase += self.step;
        if self.phase > TAU {
            self.phase -= TAU;
        }
        output
    }
}
