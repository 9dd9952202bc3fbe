//! Engine tuning and host configuration.
//!
//! Every knob of the drill engine lives in [`EngineConfig`]; the defaults
//! reproduce the classic Fusion Fast Math game.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DrillError;

/// Largest factor a configuration may ask for at its start stage.
pub const MAX_FACTOR: u32 = 1000;

/// Tuning constants for pair selection, timing and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stage a run starts at; also the base of the advancement rule.
    #[serde(default = "default_start_stage")]
    pub start_stage: u32,
    /// Nominal time budget per question in seconds.
    #[serde(default = "default_timer_seconds")]
    pub timer_seconds: f64,
    /// Capacity of the recent-answers list.
    #[serde(default = "default_duplicate_protection")]
    pub duplicate_protection: usize,
    /// Multiplicative decay applied to every product weight per correct answer.
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,
    /// How strongly a product's weight inflates its selection distance.
    #[serde(default = "default_weight_strength")]
    pub weight_strength: f64,
    /// Weights below this value are dropped.
    #[serde(default = "default_weight_floor")]
    pub weight_floor: f64,
    /// Product range divided by this gives the target standard deviation.
    #[serde(default = "default_sigma_scale")]
    pub sigma_scale: f64,
    /// Factors may stretch to `stage * (1 + stretch_mult)`.
    #[serde(default = "default_stretch_mult")]
    pub stretch_mult: f64,
    /// Base of the per-question penalty escalation.
    #[serde(default = "default_penalty_mult")]
    pub penalty_mult: f64,
    /// Average seconds per answer assumed before the first correct answer.
    #[serde(default = "default_penalty_seconds")]
    pub default_penalty_seconds: f64,
    /// Rejection-sampling draws before the target falls back to the mean.
    #[serde(default = "default_max_target_draws")]
    pub max_target_draws: u32,
    /// Evictions of recent answers tried before ignoring them entirely.
    #[serde(default = "default_selection_safety")]
    pub selection_safety: u32,
    /// Outer retries while a chosen product is still in the recent list.
    #[serde(default = "default_duplicate_retry_limit")]
    pub duplicate_retry_limit: u32,
    /// Fixed RNG seed; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_start_stage() -> u32 {
    8
}
fn default_timer_seconds() -> f64 {
    10.0
}
fn default_duplicate_protection() -> usize {
    25
}
fn default_weight_decay() -> f64 {
    0.88
}
fn default_weight_strength() -> f64 {
    4.0
}
fn default_weight_floor() -> f64 {
    1e-4
}
fn default_sigma_scale() -> f64 {
    6.0
}
fn default_stretch_mult() -> f64 {
    0.5
}
fn default_penalty_mult() -> f64 {
    2.0
}
fn default_penalty_seconds() -> f64 {
    2.0
}
fn default_max_target_draws() -> u32 {
    40
}
fn default_selection_safety() -> u32 {
    500
}
fn default_duplicate_retry_limit() -> u32 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_stage: default_start_stage(),
            timer_seconds: default_timer_seconds(),
            duplicate_protection: default_duplicate_protection(),
            weight_decay: default_weight_decay(),
            weight_strength: default_weight_strength(),
            weight_floor: default_weight_floor(),
            sigma_scale: default_sigma_scale(),
            stretch_mult: default_stretch_mult(),
            penalty_mult: default_penalty_mult(),
            default_penalty_seconds: default_penalty_seconds(),
            max_target_draws: default_max_target_draws(),
            selection_safety: default_selection_safety(),
            duplicate_retry_limit: default_duplicate_retry_limit(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), DrillError> {
        let invalid = |msg: &str| Err(DrillError::InvalidConfig(msg.to_string()));

        if self.start_stage == 0 {
            return invalid("start_stage must be at least 1");
        }
        if !(self.timer_seconds.is_finite() && self.timer_seconds > 0.0) {
            return invalid("timer_seconds must be positive");
        }
        if !(self.weight_decay > 0.0 && self.weight_decay < 1.0) {
            return invalid("weight_decay must be in (0, 1)");
        }
        if !(self.weight_strength.is_finite() && self.weight_strength >= 0.0) {
            return invalid("weight_strength must be non-negative");
        }
        if !(self.weight_floor.is_finite() && self.weight_floor >= 0.0) {
            return invalid("weight_floor must be non-negative");
        }
        if !(self.sigma_scale.is_finite() && self.sigma_scale > 0.0) {
            return invalid("sigma_scale must be positive");
        }
        if !(self.stretch_mult.is_finite() && self.stretch_mult >= 0.0) {
            return invalid("stretch_mult must be non-negative");
        }
        if (self.start_stage as f64 * (1.0 + self.stretch_mult)).floor() > MAX_FACTOR as f64 {
            return invalid(&format!(
                "start_stage * (1 + stretch_mult) must not exceed {MAX_FACTOR}"
            ));
        }
        if !(self.penalty_mult.is_finite() && self.penalty_mult >= 1.0) {
            return invalid("penalty_mult must be at least 1");
        }
        if !(self.default_penalty_seconds.is_finite() && self.default_penalty_seconds > 0.0) {
            return invalid("default_penalty_seconds must be positive");
        }
        Ok(())
    }
}

/// Top-level `fastmath.toml` contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastmathConfig {
    /// Player name used when none is given on the command line.
    #[serde(default = "default_player")]
    pub player: String,
    /// Directory run records are written to.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_player() -> String {
    "Player".to_string()
}
fn default_records_dir() -> PathBuf {
    PathBuf::from("./fastmath-records")
}

impl Default for FastmathConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            records_dir: default_records_dir(),
            engine: EngineConfig::default(),
        }
    }
}

/// Load config from an explicit path, or search the default location.
///
/// `FASTMATH_SEED` overrides the engine seed when set to an integer.
pub fn load_config_from(path: Option<&Path>) -> Result<FastmathConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("fastmath.toml");
            local.exists().then_some(local)
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FastmathConfig::default(),
    };

    if let Ok(seed) = std::env::var("FASTMATH_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("FASTMATH_SEED is not an integer: {seed}"))?;
        config.engine.seed = Some(seed);
    }

    config.engine.validate()?;
    Ok(config)
}

/// Parse a TOML string into a config (useful for testing).
pub fn parse_config_str(content: &str) -> Result<FastmathConfig> {
    let config: FastmathConfig = toml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_game() {
        let config = EngineConfig::default();
        assert_eq!(config.start_stage, 8);
        assert_eq!(config.timer_seconds, 10.0);
        assert_eq!(config.duplicate_protection, 25);
        assert_eq!(config.weight_decay, 0.88);
        assert_eq!(config.selection_safety, 500);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = parse_config_str(
            r#"
player = "Ada Lovelace"

[engine]
start_stage = 10
seed = 42
"#,
        )
        .unwrap();
        assert_eq!(config.player, "Ada Lovelace");
        assert_eq!(config.engine.start_stage, 10);
        assert_eq!(config.engine.seed, Some(42));
        assert_eq!(config.engine.timer_seconds, 10.0);
        assert_eq!(config.records_dir, PathBuf::from("./fastmath-records"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = EngineConfig {
            start_stage: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        config.start_stage = 8;
        config.weight_decay = 1.0;
        assert!(config.validate().is_err());

        config.weight_decay = 0.88;
        config.timer_seconds = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_factor_range() {
        let huge_stage = EngineConfig {
            start_stage: 50_000,
            ..EngineConfig::default()
        };
        let err = huge_stage.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed 1000"));

        let huge_stretch = EngineConfig {
            stretch_mult: 1e9,
            ..EngineConfig::default()
        };
        assert!(huge_stretch.validate().is_err());

        // 666 * 1.5 = 999 is still allowed.
        let edge = EngineConfig {
            start_stage: 666,
            ..EngineConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn oversized_stage_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastmath.toml");
        std::fs::write(&path, "[engine]\nstart_stage = 44000\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("start_stage"));
    }

    #[test]
    fn load_from_missing_path_fails() {
        let err = load_config_from(Some(Path::new("definitely-missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastmath.toml");
        std::fs::write(&path, "[engine]\ntimer_seconds = 12.5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.engine.timer_seconds, 12.5);
    }

    #[test]
    fn load_rejects_invalid_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastmath.toml");
        std::fs::write(&path, "[engine]\nsigma_scale = 0.0\n").unwrap();

        assert!(load_config_from(Some(&path)).is_err());
    }
}
