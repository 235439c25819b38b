use serde::{Deserialize, Serialize};

/// Defines session phases and what happens at their block boundaries
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    /// Block debrief shows a score computed from the records.
    fn is_scored(&self) -> bool;
    /// Finishing a block advances the block counter and resets the trial counter.
    fn advances_block(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_training(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Training,
    Part1,
    Part2,
    Perceptual,
}

impl Phase for SessionPhase {
    fn is_scored(&self) -> bool {
        matches!(self, Self::Part1 | Self::Part2)
    }

    fn advances_block(&self) -> bool {
        !matches!(self, Self::Training)
    }

    fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Training => Part1,
            Part1 => Part2,
            Part2 => Perceptual,
            Perceptual => return None,
        })
    }

    fn is_training(&self) -> bool {
        matches!(self, SessionPhase::Training)
    }
}

impl std::str::FromStr for SessionPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "training" => Ok(Self::Training),
            "part1" => Ok(Self::Part1),
            "part2" => Ok(Self::Part2),
            "perceptual" => Ok(Self::Perceptual),
            other => Err(format!("unknown session phase `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_in_order_and_terminate() {
        let mut phase = SessionPhase::default();
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                SessionPhase::Training,
                SessionPhase::Part1,
                SessionPhase::Part2,
                SessionPhase::Perceptual
            ]
        );
    }

    #[test]
    fn only_main_parts_are_scored() {
        assert!(!SessionPhase::Training.is_scored());
        assert!(SessionPhase::Part1.is_scored());
        assert!(SessionPhase::Part2.is_scored());
        assert!(!SessionPhase::Perceptual.is_scored());
    }

    #[test]
    fn training_keeps_block_counter() {
        assert!(!SessionPhase::Training.advances_block());
        assert!(SessionPhase::Perceptual.advances_block());
    }

    #[test]
    fn parses_phase_names() {
        assert_eq!("Part2".parse::<SessionPhase>(), Ok(SessionPhase::Part2));
        assert!("break".parse::<SessionPhase>().is_err());
    }
}
