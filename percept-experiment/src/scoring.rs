use percept_core::{EngineError, IllusionType, TrialRecord};
use serde::{Deserialize, Serialize};

use crate::config::Norms;
use crate::recorder::TrialStore;

/// Performance summary for a block (or the whole session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub trials: usize,
    pub correct_trials: usize,
    /// Proportion correct, in `[0, 1]`.
    pub accuracy: f64,
    pub mean_reaction_time: f64,
    pub mean_reaction_time_correct: Option<f64>,
    /// Mean correct RT divided by accuracy. Lower is better.
    pub inverse_efficiency: Option<f64>,
    /// Share of the reference population with a worse IES.
    pub percentile: f64,
    /// `100 - IES / 50`, floored at zero.
    pub score: f64,
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Scores the records in scope against the reference IES distribution.
    ///
    /// `norms.sd` must be positive; `SessionConfig::validate` enforces this for
    /// configured norms.
    pub fn score<'a, I>(records: I, norms: Norms) -> Result<BlockSummary, EngineError>
    where
        I: IntoIterator<Item = &'a TrialRecord>,
    {
        let mut trials = 0usize;
        let mut correct_trials = 0usize;
        let mut rt_sum = 0.0;
        let mut rt_sum_correct = 0.0;

        for record in records {
            trials += 1;
            rt_sum += record.reaction_time_ms;
            if record.correct {
                correct_trials += 1;
                rt_sum_correct += record.reaction_time_ms;
            }
        }

        if trials == 0 {
            return Err(EngineError::InsufficientData);
        }

        let accuracy = correct_trials as f64 / trials as f64;
        let mean_reaction_time = rt_sum / trials as f64;

        if correct_trials == 0 {
            return Ok(BlockSummary {
                trials,
                correct_trials,
                accuracy,
                mean_reaction_time,
                mean_reaction_time_correct: None,
                inverse_efficiency: None,
                percentile: 0.0,
                score: 0.0,
            });
        }

        let mean_correct = rt_sum_correct / correct_trials as f64;
        let ies = mean_correct / accuracy;
        let score = (100.0 - ies / 50.0).max(0.0);
        let percentile = 100.0 - normal_cdf(ies, norms.mean, norms.sd) * 100.0;

        Ok(BlockSummary {
            trials,
            correct_trials,
            accuracy,
            mean_reaction_time,
            mean_reaction_time_correct: Some(mean_correct),
            inverse_efficiency: Some(ies),
            percentile,
            score,
        })
    }

    /// Scores every scorable record of one illusion type.
    pub fn score_block(
        store: &TrialStore,
        illusion: IllusionType,
        norms: Norms,
    ) -> Result<BlockSummary, EngineError> {
        Self::score(store.scorable_for(Some(illusion)), norms)
    }

    /// Scores every scorable record in the session.
    pub fn score_session(store: &TrialStore, norms: Norms) -> Result<BlockSummary, EngineError> {
        Self::score(store.scorable_for(None), norms)
    }
}

/// Normal cumulative distribution function at `x`.
pub fn normal_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

// Chebyshev fit, fractional error below 1.2e-7 everywhere.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}
