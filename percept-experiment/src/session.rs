use percept_core::{
    EngineError, IllusionType, Phase, ResponseCapture, SessionPhase, TrialRecord, TrialSpec,
};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::counters::SessionCounters;
use crate::debrief::{Debrief, DebriefFormatter, DebriefKind};
use crate::recorder::{TrialRecorder, TrialStore};
use crate::scoring::{BlockSummary, ScoringEngine};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    BlockStarted(IllusionType),
    TrialFinished {
        spec: TrialSpec,
        capture: ResponseCapture,
    },
    BlockFinished,
    PhaseComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    BlockOpened(IllusionType),
    TrialRecorded(TrialRecord),
    BlockClosed(BlockOutcome),
    PhaseAdvanced(SessionPhase),
    SessionComplete,
}

/// What a finished block produced. Unscored phases carry no summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    pub illusion: IllusionType,
    pub phase: SessionPhase,
    pub block_number: u32,
    pub summary: Option<BlockSummary>,
    pub debrief: Option<Debrief>,
}

/// Trial and block bookkeeping for one participant session
pub struct Session {
    pub phase: SessionPhase,
    pub config: SessionConfig,
    pub counters: SessionCounters,
    pub store: TrialStore,
    current_block: Option<IllusionType>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            phase: SessionPhase::default(),
            config,
            counters: SessionCounters::new(),
            store: TrialStore::new(),
            current_block: None,
        }
    }

    pub fn starting_at(mut self, phase: SessionPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn current_block(&self) -> Option<IllusionType> {
        self.current_block
    }

    /// Opens a block. The previous block has to be closed first.
    pub fn begin_block(&mut self, illusion: IllusionType) -> Result<(), EngineError> {
        if let Some(open) = self.current_block {
            warn!(%open, next = %illusion, "previous block was never closed");
            return Err(EngineError::BlockStillOpen { open });
        }
        debug!(%illusion, phase = ?self.phase, block = self.counters.block_number, "block opened");
        self.current_block = Some(illusion);
        Ok(())
    }

    pub fn complete_trial(
        &mut self,
        spec: &TrialSpec,
        capture: &ResponseCapture,
    ) -> Result<&TrialRecord, EngineError> {
        let expected = self.current_block.ok_or(EngineError::NoActiveBlock)?;
        if spec.illusion != expected {
            return Err(EngineError::BlockMismatch {
                expected,
                got: spec.illusion,
            });
        }

        TrialRecorder::record(
            capture,
            spec,
            self.phase,
            &mut self.counters,
            &mut self.store,
        )
        .inspect_err(|e| warn!(stimulus = %spec.stimulus, error = %e, "trial rejected"))
    }

    /// Closes the open block: scores it when the phase is scored, then starts
    /// the trial numbering over. The block number only moves on when the
    /// phase numbers its blocks.
    ///
    /// On error the block stays open and the counters are untouched.
    pub fn complete_block(&mut self) -> Result<BlockOutcome, EngineError> {
        let illusion = self.current_block.ok_or(EngineError::NoActiveBlock)?;
        let block_number = self.counters.block_number;

        let (summary, debrief) = if self.phase.is_scored() {
            let norms = self.config.norms_for(illusion);
            let summary = ScoringEngine::score_block(&self.store, illusion, norms)?;
            info!(
                %illusion,
                block = block_number,
                trials = summary.trials,
                accuracy = summary.accuracy,
                ies = ?summary.inverse_efficiency,
                percentile = summary.percentile,
                score = summary.score,
                "block scored"
            );
            let debrief = DebriefFormatter::format(&summary, DebriefKind::Block);
            (Some(summary), Some(debrief))
        } else {
            (None, None)
        };

        self.current_block = None;
        if self.phase.advances_block() {
            self.counters.complete_block();
        } else {
            self.counters.restart_block();
        }

        Ok(BlockOutcome {
            illusion,
            phase: self.phase,
            block_number,
            summary,
            debrief,
        })
    }

    pub fn advance_phase(&mut self) -> bool {
        match self.phase.next() {
            Some(next) => {
                info!(from = ?self.phase, to = ?next, "phase advanced");
                self.phase = next;
                true
            }
            None => false,
        }
    }

    /// Session-wide summary over every scorable record.
    pub fn final_debrief(&self) -> Result<(BlockSummary, Debrief), EngineError> {
        let summary = ScoringEngine::score_session(&self.store, self.config.default_norms)?;
        let debrief = DebriefFormatter::format(&summary, DebriefKind::Final);
        Ok((summary, debrief))
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Result<SessionUpdate, EngineError> {
        match event {
            SessionEvent::BlockStarted(illusion) => {
                self.begin_block(illusion)?;
                Ok(SessionUpdate::BlockOpened(illusion))
            }
            SessionEvent::TrialFinished { spec, capture } => self
                .complete_trial(&spec, &capture)
                .map(|record| SessionUpdate::TrialRecorded(record.clone())),
            SessionEvent::BlockFinished => self.complete_block().map(SessionUpdate::BlockClosed),
            SessionEvent::PhaseComplete => {
                if self.advance_phase() {
                    Ok(SessionUpdate::PhaseAdvanced(self.phase))
                } else {
                    Ok(SessionUpdate::SessionComplete)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Norms;
    use crate::scoring::normal_cdf;
    use percept_core::ArrowDirection;

    fn spec(illusion: IllusionType, correct_response: ArrowDirection) -> TrialSpec {
        TrialSpec {
            illusion,
            illusion_strength: 0.0,
            difference: 0.2,
            stimulus: format!("stimuli/{illusion}.png"),
            correct_response,
            scorable: true,
        }
    }

    fn run_block(session: &mut Session, illusion: IllusionType, keys: &[(&str, f64)]) -> BlockOutcome {
        let (_, upper) = illusion.axis().labels();
        session.begin_block(illusion).unwrap();
        for (key, rt) in keys {
            let capture = ResponseCapture::from_key(*key, *rt);
            session.complete_trial(&spec(illusion, upper), &capture).unwrap();
        }
        session.complete_block().unwrap()
    }

    #[test]
    fn trial_outside_block_is_rejected() {
        let mut session = Session::new(SessionConfig::default());
        let capture = ResponseCapture::from_key("arrowup", 500.0);
        let err = session
            .complete_trial(&spec(IllusionType::MullerLyer, ArrowDirection::Up), &capture)
            .unwrap_err();
        assert_eq!(err, EngineError::NoActiveBlock);
        assert!(session.store.is_empty());
    }

    #[test]
    fn trial_from_other_illusion_is_rejected() {
        let mut session = Session::new(SessionConfig::default());
        session.begin_block(IllusionType::MullerLyer).unwrap();
        let capture = ResponseCapture::from_key("arrowleft", 500.0);
        let err = session
            .complete_trial(&spec(IllusionType::Ebbinghaus, ArrowDirection::Left), &capture)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::BlockMismatch {
                expected: IllusionType::MullerLyer,
                got: IllusionType::Ebbinghaus,
            }
        );
    }

    #[test]
    fn scored_block_reports_and_resets_counters() {
        let mut session = Session::new(SessionConfig::default()).starting_at(SessionPhase::Part1);
        let outcome = run_block(
            &mut session,
            IllusionType::MullerLyer,
            &[("arrowup", 500.0), ("arrowup", 700.0), ("arrowdown", 600.0)],
        );

        let summary = outcome.summary.unwrap();
        assert_eq!(summary.trials, 3);
        assert!((summary.inverse_efficiency.unwrap() - 900.0).abs() < 1e-9);
        assert!(outcome.debrief.is_some());
        assert_eq!(outcome.block_number, 1);
        assert_eq!(session.counters, SessionCounters { block_number: 2, trial_number: 1 });

        let numbers: Vec<_> = session.store.records().iter().map(|r| r.trial_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn training_block_is_unscored_and_keeps_block_number() {
        let mut session = Session::new(SessionConfig::default());
        let outcome = run_block(
            &mut session,
            IllusionType::Ebbinghaus,
            &[("arrowright", 800.0), ("arrowleft", 900.0)],
        );
        assert!(outcome.summary.is_none());
        assert_eq!(session.counters, SessionCounters { block_number: 1, trial_number: 1 });
    }

    #[test]
    fn first_main_trial_after_training_is_numbered_from_one() {
        let mut session = Session::new(SessionConfig::default());
        run_block(&mut session, IllusionType::MullerLyer, &[("arrowup", 700.0), ("arrowdown", 650.0)]);
        run_block(&mut session, IllusionType::Ebbinghaus, &[("arrowleft", 720.0), ("arrowright", 610.0)]);
        assert!(session.advance_phase());
        run_block(&mut session, IllusionType::MullerLyer, &[("arrowup", 540.0)]);

        let numbers: Vec<_> = session
            .store
            .records()
            .iter()
            .map(|r| (r.phase, r.block_number, r.trial_number))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (SessionPhase::Training, 1, 1),
                (SessionPhase::Training, 1, 2),
                (SessionPhase::Training, 1, 1),
                (SessionPhase::Training, 1, 2),
                (SessionPhase::Part1, 1, 1),
            ]
        );
    }

    #[test]
    fn opening_a_second_block_is_rejected() {
        let mut session = Session::new(SessionConfig::default()).starting_at(SessionPhase::Part1);
        session.begin_block(IllusionType::MullerLyer).unwrap();
        session
            .complete_trial(
                &spec(IllusionType::MullerLyer, ArrowDirection::Up),
                &ResponseCapture::from_key("arrowup", 520.0),
            )
            .unwrap();

        assert_eq!(
            session.begin_block(IllusionType::Ebbinghaus),
            Err(EngineError::BlockStillOpen { open: IllusionType::MullerLyer })
        );
        assert_eq!(session.current_block(), Some(IllusionType::MullerLyer));
        assert_eq!(session.counters, SessionCounters { block_number: 1, trial_number: 2 });

        session.complete_block().unwrap();
        let outcome = run_block(&mut session, IllusionType::Ebbinghaus, &[("arrowleft", 480.0)]);
        assert_eq!(outcome.block_number, 2);
        let last = session.store.last().unwrap();
        assert_eq!((last.block_number, last.trial_number), (2, 1));
    }

    #[test]
    fn block_started_event_reports_open_block() {
        let mut session = Session::new(SessionConfig::default());
        session
            .handle_event(SessionEvent::BlockStarted(IllusionType::VerticalHorizontal))
            .unwrap();
        assert_eq!(
            session.handle_event(SessionEvent::BlockStarted(IllusionType::MullerLyer)),
            Err(EngineError::BlockStillOpen { open: IllusionType::VerticalHorizontal })
        );
    }

    #[test]
    fn per_illusion_norms_drive_block_percentile() {
        let keys = [("arrowup", 500.0), ("arrowup", 700.0), ("arrowdown", 600.0)];
        let mut baseline = Session::new(SessionConfig::default()).starting_at(SessionPhase::Part1);
        let default_summary = run_block(&mut baseline, IllusionType::MullerLyer, &keys)
            .summary
            .unwrap();

        let mut config = SessionConfig::default();
        config.norms.insert(IllusionType::MullerLyer, Norms { mean: 600.0, sd: 100.0 });
        let mut session = Session::new(config).starting_at(SessionPhase::Part1);
        let summary = run_block(&mut session, IllusionType::MullerLyer, &keys)
            .summary
            .unwrap();

        // IES is 900 either way; only the normative comparison moves
        assert_eq!(summary.inverse_efficiency, default_summary.inverse_efficiency);
        assert_eq!(summary.score, default_summary.score);
        let expected = 100.0 - normal_cdf(900.0, 600.0, 100.0) * 100.0;
        assert!((summary.percentile - expected).abs() < 1e-9);
        assert!(summary.percentile < 1.0);
        assert!(default_summary.percentile > 59.0);
    }

    #[test]
    fn perceptual_block_advances_without_scoring() {
        let mut session =
            Session::new(SessionConfig::default()).starting_at(SessionPhase::Perceptual);
        let outcome = run_block(&mut session, IllusionType::VerticalHorizontal, &[("arrowright", 650.0)]);
        assert!(outcome.debrief.is_none());
        assert_eq!(session.counters.block_number, 2);
    }

    #[test]
    fn empty_scored_block_keeps_block_open() {
        let mut session = Session::new(SessionConfig::default()).starting_at(SessionPhase::Part2);
        session.begin_block(IllusionType::Ebbinghaus).unwrap();
        assert_eq!(session.complete_block(), Err(EngineError::InsufficientData));
        assert_eq!(session.current_block(), Some(IllusionType::Ebbinghaus));
        assert_eq!(session.counters, SessionCounters::new());
    }

    #[test]
    fn events_drive_a_whole_session() {
        let mut session = Session::new(SessionConfig::default());
        assert_eq!(
            session.handle_event(SessionEvent::PhaseComplete),
            Ok(SessionUpdate::PhaseAdvanced(SessionPhase::Part1))
        );

        session
            .handle_event(SessionEvent::BlockStarted(IllusionType::MullerLyer))
            .unwrap();
        let update = session
            .handle_event(SessionEvent::TrialFinished {
                spec: spec(IllusionType::MullerLyer, ArrowDirection::Down),
                capture: ResponseCapture::from_key("arrowdown", 450.0),
            })
            .unwrap();
        match update {
            SessionUpdate::TrialRecorded(record) => assert!(record.correct),
            other => panic!("unexpected update {other:?}"),
        }
        assert!(matches!(
            session.handle_event(SessionEvent::BlockFinished),
            Ok(SessionUpdate::BlockClosed(_))
        ));

        while let Ok(SessionUpdate::PhaseAdvanced(_)) =
            session.handle_event(SessionEvent::PhaseComplete)
        {}
        assert_eq!(session.phase, SessionPhase::Perceptual);

        let (summary, debrief) = session.final_debrief().unwrap();
        assert_eq!(summary.trials, 1);
        assert_eq!(debrief.kind, DebriefKind::Final);
    }
}
