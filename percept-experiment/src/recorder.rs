use percept_core::{EngineError, IllusionType, ResponseCapture, SessionPhase, TrialRecord, TrialSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::ResponseClassifier;
use crate::counters::SessionCounters;

/// Append-only store of finished trials for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialStore {
    records: Vec<TrialRecord>,
}

impl TrialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TrialRecord) -> &TrialRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TrialRecord> {
        self.records.last()
    }

    pub fn by_illusion(&self, illusion: IllusionType) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(move |r| r.illusion == illusion)
    }

    pub fn scorable(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| r.scorable)
    }

    /// Scorable records of one illusion type, or all of them for `None`.
    pub fn scorable_for(
        &self,
        illusion: Option<IllusionType>,
    ) -> impl Iterator<Item = &TrialRecord> {
        self.scorable()
            .filter(move |r| illusion.is_none_or(|wanted| r.illusion == wanted))
    }
}

pub struct TrialRecorder;

impl TrialRecorder {
    /// Builds the record for a finished trial and advances the trial counter.
    ///
    /// Counters are left untouched when the response cannot be classified.
    pub fn finalize(
        capture: &ResponseCapture,
        spec: &TrialSpec,
        phase: SessionPhase,
        counters: &mut SessionCounters,
    ) -> Result<TrialRecord, EngineError> {
        let classification = ResponseClassifier::classify(capture, spec, spec.axis())?;

        let record = TrialRecord {
            illusion: spec.illusion,
            illusion_strength: spec.illusion_strength,
            difference: spec.difference,
            stimulus: spec.stimulus.clone(),
            correct_response: spec.correct_response,
            phase,
            key: capture.key.clone(),
            pointer: capture.pointer,
            reaction_time_ms: capture.reaction_time_ms,
            response: classification.response,
            correct: classification.correct,
            pre_stimulus_duration: capture.pre_stimulus_duration(),
            block_number: counters.block_number,
            trial_number: counters.trial_number,
            scorable: spec.scorable,
        };
        counters.advance_trial();

        debug!(
            illusion = %record.illusion,
            block = record.block_number,
            trial = record.trial_number,
            response = %record.response,
            correct = record.correct,
            rt_ms = record.reaction_time_ms,
            "trial recorded"
        );
        Ok(record)
    }

    /// Finalizes the trial and appends it to `store`.
    pub fn record<'s>(
        capture: &ResponseCapture,
        spec: &TrialSpec,
        phase: SessionPhase,
        counters: &mut SessionCounters,
        store: &'s mut TrialStore,
    ) -> Result<&'s TrialRecord, EngineError> {
        let record = Self::finalize(capture, spec, phase, counters)?;
        Ok(store.push(record))
    }
}
