//! Error taxonomy for the build calculator and optimizers

use thiserror::Error;

/// Errors surfaced by the core. Domain-invalid input fails immediately
/// instead of being clamped; an empty optimizer result is an error rather
/// than a silently-wrong default.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("target armor must be positive, got {0}")]
    InvalidArmor(f64),

    #[error("weapon strength must be positive, got {0}")]
    InvalidWeaponStrength(f64),

    #[error("skill coefficient must not be negative, got {0}")]
    NegativeCoefficient(f64),

    #[error("heal coefficient must not be negative, got {0}")]
    NegativeHealCoefficient(f64),

    #[error("condition duration must not be negative, got {0}")]
    NegativeDuration(f64),

    #[error("unknown stat preset '{0}'")]
    UnknownPreset(String),

    #[error("unknown condition kind '{0}'")]
    UnknownConditionKind(String),

    #[error("unknown weapon type '{0}'")]
    UnknownWeaponType(String),

    #[error("unknown game mode '{0}'")]
    UnknownGameMode(String),

    #[error("unknown experience level '{0}'")]
    UnknownExperience(String),

    #[error("rotation contains no skills")]
    EmptyRotation,

    #[error("no viable equipment candidates ({excluded} excluded during search)")]
    NoViableCandidates { excluded: usize },

    #[error("no stat presets available for gear optimization")]
    EmptyPresetTable,

    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML request: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON request: {0}")]
    Json(#[from] serde_json::Error),
}
