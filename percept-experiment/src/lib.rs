pub mod classifier;
pub mod config;
pub mod counters;
pub mod debrief;
pub mod manifest;
pub mod participant;
pub mod recorder;
pub mod scoring;
pub mod session;

pub use classifier::{Classification, ResponseClassifier};
pub use config::{ConfigError, Norms, SessionConfig};
pub use counters::SessionCounters;
pub use debrief::{Debrief, DebriefFormatter, DebriefKind};
pub use manifest::Manifest;
pub use participant::SimulatedParticipant;
pub use recorder::{TrialRecorder, TrialStore};
pub use scoring::{BlockSummary, ScoringEngine, normal_cdf};
pub use session::{BlockOutcome, Session, SessionEvent, SessionUpdate};
