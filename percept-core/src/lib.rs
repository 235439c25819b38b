pub mod error;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use error::EngineError;
pub use phase::{Phase, SessionPhase};
pub use stimulus::{ArrowDirection, IllusionType, ResponseAxis, TrialSpec};
pub use trial::{Pointer, ResponseCapture, TrialRecord, Viewport};
