use std::path::Path;

use percept_core::{ArrowDirection, IllusionType, SessionPhase, TrialSpec};
use serde::{Deserialize, Deserializer};

use crate::config::ConfigError;

/// Ordered stimulus list for one session phase
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub phase: SessionPhase,
    pub trials: Vec<TrialSpec>,
}

// Entry layout produced by the stimulus generator.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Illusion_Type")]
    illusion: IllusionType,
    #[serde(rename = "Illusion_Strength", deserialize_with = "number_or_string")]
    strength: f64,
    #[serde(rename = "Difference", deserialize_with = "number_or_string")]
    difference: f64,
    stimulus: String,
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    correct_response: ArrowDirection,
    // Only "Trial" entries count towards scores
    #[serde(default)]
    screen: Option<String>,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Manifest {
    /// Parses a JSON array of stimulus entries. A leading `var name =`
    /// assignment and a trailing `;` are accepted and ignored.
    pub fn parse(src: &str, phase: SessionPhase) -> Result<Self, ConfigError> {
        let body = strip_assignment(src);
        let raw: Vec<RawEntry> = serde_json::from_str(body)?;
        let trials = raw
            .into_iter()
            .map(|entry| TrialSpec {
                illusion: entry.illusion,
                illusion_strength: entry.strength,
                difference: entry.difference,
                stimulus: entry.stimulus,
                correct_response: entry.data.correct_response,
                scorable: entry.data.screen.as_deref().is_none_or(|s| s == "Trial"),
            })
            .collect();
        Ok(Self { phase, trials })
    }

    pub fn from_path(path: impl AsRef<Path>, phase: SessionPhase) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&src, phase)
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn by_illusion(&self, illusion: IllusionType) -> impl Iterator<Item = &TrialSpec> {
        self.trials.iter().filter(move |t| t.illusion == illusion)
    }

    /// Illusion types in order of first appearance.
    pub fn illusion_types(&self) -> Vec<IllusionType> {
        let mut seen = Vec::new();
        for trial in &self.trials {
            if !seen.contains(&trial.illusion) {
                seen.push(trial.illusion);
            }
        }
        seen
    }

    pub fn find(&self, stimulus: &str) -> Option<&TrialSpec> {
        self.trials.iter().find(|t| t.stimulus == stimulus)
    }
}

fn strip_assignment(src: &str) -> &str {
    let mut body = src.trim();
    for keyword in ["var ", "let ", "const "] {
        if let Some(rest) = body.strip_prefix(keyword) {
            if let Some((_, value)) = rest.split_once('=') {
                body = value.trim();
            }
            break;
        }
    }
    body.strip_suffix(';').unwrap_or(body).trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"var stimuli_perceptual1 = [
        {"Illusion_Type": "VerticalHorizontal", "Illusion_Strength": "000000000000", "Difference": "-0.225000000",
         "stimulus": "stimuli/VerticalHorizontal_0000000_-0.2250.png",
         "data": {"screen": "Trial", "block": "VerticalHorizontal", "correct_response": "arrowright"}},
        {"Illusion_Type": "MullerLyer", "Illusion_Strength": 15, "Difference": 0.35,
         "stimulus": "stimuli/MullerLyer_15_0.35.png",
         "data": {"screen": "Trial", "block": "MullerLyer", "correct_response": "arrowup"}},
        {"Illusion_Type": "VerticalHorizontal", "Illusion_Strength": "-8", "Difference": "0.1812",
         "stimulus": "stimuli/VerticalHorizontal_-8_0.1812.png",
         "data": {"screen": "Trial", "block": "VerticalHorizontal", "correct_response": "arrowleft"}}
    ];"#;

    #[test]
    fn parses_generator_output() {
        let manifest = Manifest::parse(SAMPLE, SessionPhase::Perceptual).unwrap();
        assert_eq!(manifest.len(), 3);

        let first = &manifest.trials[0];
        assert_eq!(first.illusion, IllusionType::VerticalHorizontal);
        assert_eq!(first.illusion_strength, 0.0);
        assert_eq!(first.difference, -0.225);
        assert_eq!(first.correct_response, ArrowDirection::Right);

        let second = &manifest.trials[1];
        assert_eq!(second.illusion_strength, 15.0);
        assert_eq!(second.correct_response, ArrowDirection::Up);
        assert!(manifest.trials.iter().all(|t| t.scorable));
    }

    #[test]
    fn screen_marks_entries_outside_scoring() {
        let src = r#"[
            {"Illusion_Type": "Ebbinghaus", "Illusion_Strength": 0, "Difference": 0.2,
             "stimulus": "demo.png", "data": {"screen": "example", "correct_response": "arrowleft"}},
            {"Illusion_Type": "Ebbinghaus", "Illusion_Strength": 0, "Difference": 0.3,
             "stimulus": "trial.png", "data": {"screen": "Trial", "correct_response": "arrowleft"}},
            {"Illusion_Type": "Ebbinghaus", "Illusion_Strength": 0, "Difference": 0.4,
             "stimulus": "bare.png", "data": {"correct_response": "arrowright"}}
        ]"#;
        let manifest = Manifest::parse(src, SessionPhase::Part1).unwrap();
        let flags: Vec<_> = manifest.trials.iter().map(|t| t.scorable).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn groups_by_illusion_in_first_seen_order() {
        let manifest = Manifest::parse(SAMPLE, SessionPhase::Part1).unwrap();
        assert_eq!(
            manifest.illusion_types(),
            vec![IllusionType::VerticalHorizontal, IllusionType::MullerLyer]
        );
        assert_eq!(manifest.by_illusion(IllusionType::VerticalHorizontal).count(), 2);
        assert!(manifest.find("stimuli/MullerLyer_15_0.35.png").is_some());
        assert!(manifest.find("stimuli/missing.png").is_none());
    }

    #[test]
    fn plain_json_array_is_accepted() {
        let manifest = Manifest::parse("[]", SessionPhase::Training).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn unparsable_number_is_an_error() {
        let src = r#"[{"Illusion_Type": "Ebbinghaus", "Illusion_Strength": "strong", "Difference": "0.1",
            "stimulus": "x.png", "data": {"correct_response": "arrowleft"}}]"#;
        assert!(matches!(
            Manifest::parse(src, SessionPhase::Part1),
            Err(ConfigError::Parse(_))
        ));
    }
}
