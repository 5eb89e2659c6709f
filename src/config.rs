//! Tunable simulation thresholds.
//!
//! Every field defaults to the matching value in [`crate::constants`], so an
//! empty TOML document yields the stock behaviour. Tables mirror the
//! subsystems:
//!
//! ```toml
//! [burning]
//! burn_ticks = 200
//!
//! [void]
//! boundary = -46.0
//!
//! [damage]
//! drowning_armor_protected = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BURN_DAMAGE, BURN_TICKS, BURN_TICKS_PER_DAMAGE, DROWNING_DAMAGE, DROWNING_TICKS, FIRE_DAMAGE,
    FIRE_TICKS_PER_DAMAGE, LAVA_DAMAGE, LAVA_TICKS_PER_DAMAGE, MAX_AIR_LEVEL,
    REL_MOVE_INTERVAL_TICKS, REL_MOVE_THRESHOLD, TELEPORT_INTERVAL_TICKS, VELOCITY_INTERVAL_TICKS,
    VOID_BOUNDARY, VOID_DAMAGE, VOID_TICKS_PER_DAMAGE,
};

/// Failure to obtain a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or has unexpected keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but makes no sense.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Burning thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BurnConfig {
    /// Ticks an entity keeps burning after leaving fire or lava.
    pub burn_ticks: u32,
    /// Ticks between on-fire damage applications.
    pub ticks_per_burn_damage: u32,
    /// Damage of each on-fire application.
    pub burn_damage: i32,
    /// Ticks between fire-contact damage applications.
    pub ticks_per_fire_damage: u32,
    /// Damage of each fire-contact application.
    pub fire_damage: i32,
    /// Ticks between lava-contact damage applications.
    pub ticks_per_lava_damage: u32,
    /// Damage of each lava-contact application.
    pub lava_damage: i32,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            burn_ticks: BURN_TICKS,
            ticks_per_burn_damage: BURN_TICKS_PER_DAMAGE,
            burn_damage: BURN_DAMAGE,
            ticks_per_fire_damage: FIRE_TICKS_PER_DAMAGE,
            fire_damage: FIRE_DAMAGE,
            ticks_per_lava_damage: LAVA_TICKS_PER_DAMAGE,
            lava_damage: LAVA_DAMAGE,
        }
    }
}

/// Void-fall thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoidConfig {
    /// Height below which the void hurts.
    pub boundary: f64,
    /// Ticks below the boundary between damage applications.
    pub ticks_per_damage: u32,
    /// Damage of each application.
    pub damage: i32,
}

impl Default for VoidConfig {
    fn default() -> Self {
        Self {
            boundary: VOID_BOUNDARY,
            ticks_per_damage: VOID_TICKS_PER_DAMAGE,
            damage: VOID_DAMAGE,
        }
    }
}

/// Air and drowning thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirConfig {
    /// Air reserve of a surfaced entity.
    pub max_air: i32,
    /// Ticks between drowning damage applications once out of air.
    pub drowning_ticks: i32,
    /// Damage of each drowning application.
    pub drowning_damage: i32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            max_air: MAX_AIR_LEVEL,
            drowning_ticks: DROWNING_TICKS,
            drowning_damage: DROWNING_DAMAGE,
        }
    }
}

/// Replication cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplicationConfig {
    /// Ticks between forced absolute position updates.
    pub teleport_interval: u64,
    /// Ticks after which a dirty position is sent regardless of drift.
    pub rel_move_interval: u64,
    /// Fixed-point drift that triggers a relative move.
    pub rel_move_threshold: i64,
    /// Minimum ticks between velocity packets.
    pub velocity_interval: u64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            teleport_interval: TELEPORT_INTERVAL_TICKS,
            rel_move_interval: REL_MOVE_INTERVAL_TICKS,
            rel_move_threshold: REL_MOVE_THRESHOLD,
            velocity_interval: VELOCITY_INTERVAL_TICKS,
        }
    }
}

/// Damage pipeline switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DamageConfig {
    /// Whether worn armor reduces drowning damage.
    pub drowning_armor_protected: bool,
}

/// All tunable thresholds of the simulation core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Burning.
    pub burning: BurnConfig,
    /// Void fall.
    pub void: VoidConfig,
    /// Air and drowning.
    pub air: AirConfig,
    /// Replication cadence.
    pub replication: ReplicationConfig,
    /// Damage pipeline.
    pub damage: DamageConfig,
}

impl SimConfig {
    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when a cadence is zero or the air reserve is
    /// negative.
    ///
    /// # Examples
    /// ```
    /// use voxsim::SimConfig;
    /// let config = SimConfig::from_toml_str("[void]\nboundary = -64.0\n").unwrap();
    /// assert_eq!(config.void.boundary, -64.0);
    /// assert_eq!(config.burning.burn_ticks, 200);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the TOML file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`SimConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let source = fs::read_to_string(file).map_err(|source| ConfigError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let cadences = [
            ("burning.ticks_per_burn_damage", self.burning.ticks_per_burn_damage),
            ("burning.ticks_per_fire_damage", self.burning.ticks_per_fire_damage),
            ("burning.ticks_per_lava_damage", self.burning.ticks_per_lava_damage),
            ("void.ticks_per_damage", self.void.ticks_per_damage),
        ];
        if let Some((field, _)) = cadences.into_iter().find(|(_, ticks)| *ticks == 0) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be at least one tick",
            });
        }
        if self.air.drowning_ticks < 1 {
            return Err(ConfigError::Invalid {
                field: "air.drowning_ticks",
                reason: "must be at least one tick",
            });
        }
        if self.air.max_air < 0 {
            return Err(ConfigError::Invalid {
                field: "air.max_air",
                reason: "must not be negative",
            });
        }
        if !self.void.boundary.is_finite() {
            return Err(ConfigError::Invalid {
                field: "void.boundary",
                reason: "must be finite",
            });
        }
        Ok(())
    }
}
