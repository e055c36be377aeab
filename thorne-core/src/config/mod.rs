//! Tunable numbers for the whole combat core.
//!
//! [`CombatConfig::default`] is the Journey reference set. Alternate sets
//! are RON files loaded through [`CombatConfig::load`]; every group is
//! `#[serde(default)]`, so a preset only lists what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance::{Chapter, ScalingTable};
use crate::combat::status::AfflictionConfig;
use crate::combat::{AttacksConfig, ComboConfig, ParryConfig};
use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH, LAST_CHAPTER};
use crate::gameflow::ProgressionConfig;
use crate::monster::boss::BossesConfig;
use crate::monster::EnemiesConfig;
use crate::physics::Aabb;
use crate::player::{PlayerConfig, StaminaConfig};

const BOSS_EDITION_RON: &str = include_str!("../../presets/boss_edition.ron");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config RON")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize config")]
    Serialize(#[from] ron::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Built-in constant sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Preset {
    /// Story edition reference numbers
    #[default]
    Journey,
    /// Enemy/boss edition: narrower player swing, contact cooldown, patrol
    /// turning
    BossEdition,
}

impl Preset {
    pub fn config(self) -> Result<CombatConfig, ConfigError> {
        match self {
            Self::Journey => Ok(CombatConfig::default()),
            Self::BossEdition => CombatConfig::from_ron_str(BOSS_EDITION_RON),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journey => "journey",
            Self::BossEdition => "boss_edition",
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "journey" => Ok(Self::Journey),
            "boss_edition" | "boss" => Ok(Self::BossEdition),
            other => Err(ConfigError::invalid("preset", format!("unknown preset `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Pixels per reference frame squared
    pub gravity: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Level geometry, landable from above only
    pub platforms: Vec<Aabb>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            platforms: vec![
                Aabb::new(0.0, CANVAS_HEIGHT - 30.0, CANVAS_WIDTH, 30.0),
                Aabb::new(200.0, 350.0, 200.0, 20.0),
                Aabb::new(500.0, 300.0, 150.0, 20.0),
                Aabb::new(100.0, 200.0, 100.0, 20.0),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub stamina: StaminaConfig,
    pub parry: ParryConfig,
    pub scaling: ScalingTable,
    pub attacks: AttacksConfig,
    pub combo: ComboConfig,
    pub enemies: EnemiesConfig,
    pub afflictions: AfflictionConfig,
    pub bosses: BossesConfig,
    pub progression: ProgressionConfig,
    /// Seed of the world RNG (patrol turns, combo rolls, roster top-up)
    pub seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            stamina: StaminaConfig::default(),
            parry: ParryConfig::default(),
            scaling: ScalingTable::default(),
            attacks: AttacksConfig::default(),
            combo: ComboConfig::default(),
            enemies: EnemiesConfig::default(),
            afflictions: AfflictionConfig::default(),
            bosses: BossesConfig::default(),
            progression: ProgressionConfig::default(),
            seed: 42,
        }
    }
}

impl CombatConfig {
    /// Parse and validate a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron_str(&source)?;
        tracing::info!(target: "thorne_core::config", path = %path.display(), seed = config.seed, "config loaded");
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Reject tables the combat core cannot run on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(err) = &result {
            tracing::warn!(target: "thorne_core::config", error = %err, "config rejected");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.parry.windows.len() != usize::from(LAST_CHAPTER) {
            return Err(ConfigError::invalid(
                "parry.windows",
                format!("expected {} chapters, found {}", LAST_CHAPTER, self.parry.windows.len()),
            ));
        }
        for (chapter, window) in Chapter::all().zip(&self.parry.windows) {
            if !window.is_consistent() {
                return Err(ConfigError::invalid(
                    "parry.windows",
                    format!(
                        "{chapter}: need total >= good >= perfect, got {}/{}/{}",
                        window.perfect, window.good, window.total
                    ),
                ));
            }
        }

        positive("parry.active_time", self.parry.active_time)?;
        non_negative("parry.recovery_time", self.parry.recovery_time)?;
        non_negative("parry.cooldown_time", self.parry.cooldown_time)?;
        if self.parry.perfect.stagger <= self.parry.good.stagger {
            return Err(ConfigError::invalid(
                "parry.perfect.stagger",
                "must exceed the good-parry stagger",
            ));
        }

        for (kind, spec) in self.attacks.specs() {
            if !spec.timings.all_positive() {
                return Err(ConfigError::invalid(
                    format!("attacks.{kind}.timings"),
                    "every phase duration must be positive",
                ));
            }
            if spec.base_damage < 0 {
                return Err(ConfigError::invalid(format!("attacks.{kind}.base_damage"), "must not be negative"));
            }
        }
        positive("attacks.charge_speed", self.attacks.charge_speed)?;
        positive("attacks.shockwave_speed", self.attacks.shockwave_speed)?;

        for (chapter, row) in Chapter::all().zip(&self.scaling.chapters) {
            if !(row.telegraph_time > 0.0 && row.damage >= 0.0 && row.speed >= 0.0) {
                return Err(ConfigError::invalid("scaling.chapters", format!("{chapter}: bad multipliers")));
            }
        }

        if self.combo.min_length == 0 || self.combo.min_length > self.combo.max_length {
            return Err(ConfigError::invalid("combo", "need 1 <= min_length <= max_length"));
        }
        if !(0.0..=1.0).contains(&self.combo.chance) {
            return Err(ConfigError::invalid("combo.chance", "must be a probability"));
        }
        if !(0.0..=1.0).contains(&self.enemies.patrol_turn_chance) {
            return Err(ConfigError::invalid("enemies.patrol_turn_chance", "must be a probability"));
        }
        if let Some(margin) = self.enemies.patrol_edge_margin {
            if !(margin >= 0.0 && margin.is_finite()) {
                return Err(ConfigError::invalid("enemies.patrol_edge_margin", "must be a finite distance"));
            }
        }

        positive("stamina.max", self.stamina.max)?;
        if self.player.max_health <= 0 {
            return Err(ConfigError::invalid("player.max_health", "must be positive"));
        }
        positive("physics.canvas_width", self.physics.canvas_width)?;
        positive("physics.canvas_height", self.physics.canvas_height)?;
        if !self.physics.gravity.is_finite() {
            return Err(ConfigError::invalid("physics.gravity", "must be finite"));
        }
        if self.physics.platforms.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::invalid("physics.platforms", "coordinates must be finite"));
        }

        for chapter in Chapter::all().skip(1) {
            if self.progression.requirement(chapter).is_none() {
                return Err(ConfigError::invalid(
                    "progression.requirements",
                    format!("missing requirement for {chapter}"),
                ));
            }
        }
        if self.progression.roster_max == 0 {
            return Err(ConfigError::invalid("progression.roster_max", "must be positive"));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must not be negative, got {value}")))
    }
}
