//! Unified configuration for the integration engine.
//!
//! Configuration is loaded with precedence: CLI overrides > Env vars >
//! Config file > Defaults, and the extracted [`EngineConfig`] is immutable —
//! each stage receives it by reference.
//!
//! # Example config file (bgcrank.toml)
//! ```toml
//! [unify]
//! overlap_threshold = 0.5
//!
//! [linking]
//! alpha = 0.4
//! beta = 0.2
//! gamma = 0.7
//! delta = 0.5
//! ppm_tolerance = 10.0
//! intensity_floor = 0.01
//!
//! [ranking]
//! weight_evidence = 0.6
//! weight_admet = 0.3
//! weight_novelty = 0.1
//! top_n = 5
//! ```

mod defaults;

pub use defaults::*;

use crate::error::EngineError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Full engine configuration, one section per stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub unify: UnifyConfig,
    pub linking: LinkingConfig,
    pub ranking: RankingConfig,
}

impl EngineConfig {
    /// Load configuration with precedence: CLI overrides > Env > File >
    /// Defaults.
    ///
    /// Environment variables use the `BGCRANK_` prefix with `_`-separated
    /// section paths, e.g. `BGCRANK_LINKING_GAMMA=0.8`.
    pub fn load(
        config_path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<Self, EngineError> {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("BGCRANK_").split("_"));
        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract().map_err(EngineError::from)
    }

    /// Load from environment and optional config file only.
    pub fn from_env(config_path: Option<&str>) -> Result<Self, EngineError> {
        Self::load(config_path, ConfigOverrides::default())
    }
}

/// BGC unification parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyConfig {
    /// Minimum reciprocal overlap for merging two loci.
    pub overlap_threshold: f64,
}

impl Default for UnifyConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// Evidence-linking weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Base score for a cluster-type vs compound-source match.
    pub alpha: f64,
    /// MIBiG cross-reference bonus added on top of alpha.
    pub beta: f64,
    /// Score for an m/z match within the ppm window.
    pub gamma: f64,
    /// Multiplier on normalized intensity for same-sample co-occurrence.
    pub delta: f64,
    /// Mass-match window in parts per million.
    pub ppm_tolerance: f64,
    /// Normalized-intensity floor for co-occurrence scoring.
    pub intensity_floor: f64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
            delta: DEFAULT_DELTA,
            ppm_tolerance: DEFAULT_PPM_TOLERANCE,
            intensity_floor: DEFAULT_INTENSITY_FLOOR,
        }
    }
}

/// Composite-score weights and output sizing. The weights are applied as
/// given; they are not required to sum to 1.0 and are never renormalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weight_evidence: f64,
    pub weight_admet: f64,
    pub weight_novelty: f64,
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weight_evidence: DEFAULT_WEIGHT_EVIDENCE,
            weight_admet: DEFAULT_WEIGHT_ADMET,
            weight_novelty: DEFAULT_WEIGHT_NOVELTY,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// CLI overrides that take precedence over file and env config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unify: Option<UnifyOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<RankingOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}
