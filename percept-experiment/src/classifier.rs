use percept_core::{ArrowDirection, EngineError, ResponseAxis, ResponseCapture, TrialSpec};

/// Response label and verdict for one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub response: ArrowDirection,
    pub correct: bool,
}

pub struct ResponseClassifier;

impl ResponseClassifier {
    /// Labels a captured response and scores it against the expected answer.
    ///
    /// A key press always wins over a pointer position captured alongside it.
    /// Pointer-only responses are split at the midpoint of the viewport
    /// dimension matching `axis`: below it selects the axis's lower label
    /// (`arrowdown` / `arrowleft`), at or above selects the other one.
    pub fn classify(
        capture: &ResponseCapture,
        spec: &TrialSpec,
        axis: ResponseAxis,
    ) -> Result<Classification, EngineError> {
        let response = match (&capture.key, &capture.pointer) {
            (Some(key), _) => Self::label_for_key(key, axis)?,
            (None, Some(pointer)) => {
                let (lower, upper) = axis.labels();
                if pointer.coordinate(axis) < capture.viewport.midpoint(axis) {
                    lower
                } else {
                    upper
                }
            }
            (None, None) => return Err(EngineError::MissingResponse),
        };

        Ok(Classification {
            response,
            correct: response == spec.correct_response,
        })
    }

    fn label_for_key(key: &str, axis: ResponseAxis) -> Result<ArrowDirection, EngineError> {
        ArrowDirection::from_key(key)
            .filter(|direction| axis.contains(*direction))
            .ok_or_else(|| EngineError::InvalidKey {
                key: key.to_string(),
                axis,
            })
    }
}
