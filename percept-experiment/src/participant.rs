use percept_core::{Pointer, ResponseAxis, ResponseCapture, TrialSpec, Viewport};
use rand::Rng;

use crate::config::{ConfigError, SessionConfig};

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

/// Synthetic responder that produces captures the way the presentation
/// runtime would: a jittered fixation entry, then the trial entry.
pub struct SimulatedParticipant<R: Rng> {
    pub rng: R,
    /// Probability of answering correctly, clamped to `[0, 1]`.
    pub accuracy: f64,
    pub mean_rt_ms: f64,
    /// Probability of answering with a click instead of a key.
    pub pointer_rate: f64,
    pub fixation_range_ms: (u64, u64),
    pub viewport: Viewport,
    clock_ms: f64,
    timeline: Vec<f64>,
}

impl<R: Rng> SimulatedParticipant<R> {
    pub fn new(
        config: &SessionConfig,
        rng: R,
        accuracy: f64,
        mean_rt_ms: f64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            rng,
            accuracy: finite("accuracy", accuracy)?.clamp(0.0, 1.0),
            mean_rt_ms: finite("mean reaction time", mean_rt_ms)?.max(1.0),
            pointer_rate: 0.0,
            fixation_range_ms: config.fixation_range_ms,
            viewport: config.viewport,
            clock_ms: 0.0,
            // instructions screen
            timeline: vec![0.0],
        })
    }

    pub fn with_pointer_rate(mut self, rate: f64) -> Result<Self, ConfigError> {
        self.pointer_rate = finite("pointer rate", rate)?.clamp(0.0, 1.0);
        Ok(self)
    }

    /// Elapsed time of the last timeline entry.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn respond(&mut self, spec: &TrialSpec) -> ResponseCapture {
        let (lo, hi) = self.fixation_range_ms;
        let fixation_ms = self.rng.random_range(lo..=hi);
        self.stamp(fixation_ms as f64);

        let reaction_time_ms = (self.mean_rt_ms * self.rng.random_range(0.5..1.5)).round();
        self.stamp(reaction_time_ms);

        let axis = spec.axis();
        let response = if self.rng.random_bool(self.accuracy) {
            spec.correct_response
        } else {
            let (lower, upper) = axis.labels();
            if spec.correct_response == lower { upper } else { lower }
        };

        let mut capture = if self.rng.random_bool(self.pointer_rate) {
            let pointer = self.pointer_for(axis, response == axis.labels().0);
            ResponseCapture::from_pointer(pointer, self.viewport, reaction_time_ms)
        } else {
            let mut capture = ResponseCapture::from_key(response.key_name(), reaction_time_ms);
            capture.viewport = self.viewport;
            capture
        };
        capture.timeline_timestamps = self.timeline.clone();
        capture
    }

    fn stamp(&mut self, duration_ms: f64) {
        self.clock_ms += duration_ms;
        self.timeline.push(self.clock_ms);
    }

    fn pointer_for(&mut self, axis: ResponseAxis, lower_half: bool) -> Pointer {
        let fraction = if lower_half {
            self.rng.random_range(0.05..0.45)
        } else {
            self.rng.random_range(0.55..0.95)
        };
        let other = self.rng.random_range(0.0..1.0);
        match axis {
            ResponseAxis::Vertical => Pointer {
                x: other * self.viewport.width,
                y: fraction * self.viewport.height,
            },
            ResponseAxis::Horizontal => Pointer {
                x: fraction * self.viewport.width,
                y: other * self.viewport.height,
            },
        }
    }
}
