use serde::{Deserialize, Serialize};
use std::fmt;

/// Perceptual illusion families presented in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IllusionType {
    MullerLyer,
    Ebbinghaus,
    VerticalHorizontal,
}

impl IllusionType {
    pub const ALL: [IllusionType; 3] = [
        IllusionType::MullerLyer,
        IllusionType::Ebbinghaus,
        IllusionType::VerticalHorizontal,
    ];

    /// Direction pair the participant answers with for this illusion.
    pub fn axis(&self) -> ResponseAxis {
        match self {
            IllusionType::MullerLyer => ResponseAxis::Vertical,
            IllusionType::Ebbinghaus | IllusionType::VerticalHorizontal => {
                ResponseAxis::Horizontal
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IllusionType::MullerLyer => "MullerLyer",
            IllusionType::Ebbinghaus => "Ebbinghaus",
            IllusionType::VerticalHorizontal => "VerticalHorizontal",
        }
    }
}

impl fmt::Display for IllusionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAxis {
    Vertical,
    Horizontal,
}

impl ResponseAxis {
    /// `(lower, upper)`: the label for a pointer coordinate below the midpoint
    /// of the axis dimension, then the label for one at or above it.
    pub fn labels(&self) -> (ArrowDirection, ArrowDirection) {
        match self {
            ResponseAxis::Vertical => (ArrowDirection::Down, ArrowDirection::Up),
            ResponseAxis::Horizontal => (ArrowDirection::Left, ArrowDirection::Right),
        }
    }

    pub fn contains(&self, direction: ArrowDirection) -> bool {
        let (lower, upper) = self.labels();
        direction == lower || direction == upper
    }
}

impl fmt::Display for ResponseAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseAxis::Vertical => f.write_str("vertical"),
            ResponseAxis::Horizontal => f.write_str("horizontal"),
        }
    }
}

/// Arrow-key response labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowDirection {
    #[serde(rename = "arrowup")]
    Up,
    #[serde(rename = "arrowdown")]
    Down,
    #[serde(rename = "arrowleft")]
    Left,
    #[serde(rename = "arrowright")]
    Right,
}

impl ArrowDirection {
    /// Maps a key name as reported by the browser/runtime (`"ArrowUp"`,
    /// `"arrowup"`, ...) onto a label. Anything else is not an arrow key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "arrowup" => Some(ArrowDirection::Up),
            "arrowdown" => Some(ArrowDirection::Down),
            "arrowleft" => Some(ArrowDirection::Left),
            "arrowright" => Some(ArrowDirection::Right),
            _ => None,
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ArrowDirection::Up => "arrowup",
            ArrowDirection::Down => "arrowdown",
            ArrowDirection::Left => "arrowleft",
            ArrowDirection::Right => "arrowright",
        }
    }
}

impl fmt::Display for ArrowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// One pre-generated stimulus and the answer it expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub illusion: IllusionType,
    pub illusion_strength: f64,
    /// Signed size difference between the two targets.
    pub difference: f64,
    pub stimulus: String,
    pub correct_response: ArrowDirection,
    /// False for entries that are shown but kept out of every score.
    #[serde(default = "scorable_by_default")]
    pub scorable: bool,
}

fn scorable_by_default() -> bool {
    true
}

impl TrialSpec {
    pub fn axis(&self) -> ResponseAxis {
        self.illusion.axis()
    }
}
