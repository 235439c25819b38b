use std::fmt;

use crate::scoring::BlockSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebriefKind {
    /// After each scored illusion block.
    Block,
    /// Once, at the end of the session.
    Final,
}

/// Participant-facing text for a summary. Display-only rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Debrief {
    pub kind: DebriefKind,
    pub score: String,
    pub accuracy: String,
    pub reaction_time: String,
    pub comparison: String,
}

pub struct DebriefFormatter;

impl DebriefFormatter {
    pub fn format(summary: &BlockSummary, kind: DebriefKind) -> Debrief {
        let score = match kind {
            DebriefKind::Block => format!(
                "Your score for this illusion is {} %",
                round_digits(summary.score, 1)
            ),
            DebriefKind::Final => format!("Your final score is {}", summary.score.round()),
        };

        Debrief {
            kind,
            score,
            accuracy: format!(
                "You responded correctly on {}% of the trials.",
                round_digits(summary.accuracy * 100.0, 2)
            ),
            reaction_time: format!(
                "Your average response time was {} ms.",
                round_digits(summary.mean_reaction_time, 2)
            ),
            comparison: format!(
                "You performed better than {}% of the population.",
                round_digits(summary.percentile, 2)
            ),
        }
    }
}

impl fmt::Display for Debrief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.score)?;
        writeln!(f, "{}", self.accuracy)?;
        writeln!(f, "{}", self.reaction_time)?;
        write!(f, "{}", self.comparison)?;
        if self.kind == DebriefKind::Block {
            write!(f, "\nCan you do better in the next illusion?")?;
        }
        Ok(())
    }
}

fn round_digits(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
