use serde::{Deserialize, Serialize};

use crate::phase::SessionPhase;
use crate::stimulus::{ArrowDirection, IllusionType, ResponseAxis};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn coordinate(&self, axis: ResponseAxis) -> f64 {
        match axis {
            ResponseAxis::Vertical => self.y,
            ResponseAxis::Horizontal => self.x,
        }
    }
}

/// Inner window size, in the same units as pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn midpoint(&self, axis: ResponseAxis) -> f64 {
        match axis {
            ResponseAxis::Vertical => self.height / 2.0,
            ResponseAxis::Horizontal => self.width / 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Raw input captured by the presentation runtime for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCapture {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub pointer: Option<Pointer>,
    pub reaction_time_ms: f64,
    /// Elapsed-time stamps of the timeline entries so far, oldest first,
    /// ending with the trial being finished.
    #[serde(default)]
    pub timeline_timestamps: Vec<f64>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl ResponseCapture {
    pub fn from_key(key: impl Into<String>, reaction_time_ms: f64) -> Self {
        Self {
            key: Some(key.into()),
            pointer: None,
            reaction_time_ms,
            timeline_timestamps: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn from_pointer(pointer: Pointer, viewport: Viewport, reaction_time_ms: f64) -> Self {
        Self {
            key: None,
            pointer: Some(pointer),
            reaction_time_ms,
            timeline_timestamps: Vec::new(),
            viewport,
        }
    }

    pub fn with_timestamps(mut self, timestamps: Vec<f64>) -> Self {
        self.timeline_timestamps = timestamps;
        self
    }

    /// Fixation time preceding the trial: second-most-recent timeline stamp
    /// minus the third-most-recent one.
    pub fn pre_stimulus_duration(&self) -> Option<f64> {
        let n = self.timeline_timestamps.len();
        if n < 3 {
            return None;
        }
        Some(self.timeline_timestamps[n - 2] - self.timeline_timestamps[n - 3])
    }
}

/// Recorded result per trial. Appended once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub illusion: IllusionType,
    pub illusion_strength: f64,
    pub difference: f64,
    pub stimulus: String,
    pub correct_response: ArrowDirection,
    pub phase: SessionPhase,

    pub key: Option<String>,
    pub pointer: Option<Pointer>,
    pub reaction_time_ms: f64,

    pub response: ArrowDirection,
    pub correct: bool,
    pub pre_stimulus_duration: Option<f64>,
    pub block_number: u32,
    pub trial_number: u32,
    pub scorable: bool,
}
