use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percept_core::{IllusionType, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_IES_MEAN: f64 = 1000.0;
pub const DEFAULT_IES_SD: f64 = 400.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid norms for {scope}: {reason}")]
    InvalidNorms { scope: String, reason: String },

    #[error("invalid fixation range {0}..={1} ms")]
    InvalidFixationRange(u64, u64),

    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Reference distribution of inverse efficiency scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Norms {
    pub mean: f64,
    pub sd: f64,
}

impl Norms {
    fn check(&self, scope: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidNorms {
            scope: scope.to_string(),
            reason: reason.to_string(),
        };
        if !self.mean.is_finite() || !self.sd.is_finite() {
            return Err(invalid("mean and sd must be finite"));
        }
        if self.sd <= 0.0 {
            return Err(invalid("sd must be positive"));
        }
        Ok(())
    }
}

impl Default for Norms {
    fn default() -> Self {
        Self {
            mean: DEFAULT_IES_MEAN,
            sd: DEFAULT_IES_SD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-illusion reference norms; illusions without an entry use `default_norms`.
    pub norms: BTreeMap<IllusionType, Norms>,
    pub default_norms: Norms,
    pub fixation_range_ms: (u64, u64),
    pub viewport: Viewport,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            norms: BTreeMap::new(),
            default_norms: Norms::default(),
            fixation_range_ms: (500, 1000),
            viewport: Viewport::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_norms.check("default")?;
        for (illusion, norms) in &self.norms {
            norms.check(illusion.name())?;
        }
        let (lo, hi) = self.fixation_range_ms;
        if lo > hi {
            return Err(ConfigError::InvalidFixationRange(lo, hi));
        }
        Ok(())
    }

    pub fn norms_for(&self, illusion: IllusionType) -> Norms {
        self.norms
            .get(&illusion)
            .copied()
            .unwrap_or(self.default_norms)
    }
}
