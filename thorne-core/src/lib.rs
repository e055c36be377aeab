//! Thorne's Journey - Combat Core Library
//!
//! Deterministic combat resolution for a 2D action platformer:
//! - Attack state machine (telegraph, windup, execute, recovery) with six variants
//! - Frame-windowed parry with quality tiers, rewards and riposte
//! - Enemy AI, chapter-gated combos and difficulty scaling
//! - Boss encounters with arena walls and two phases
//! - Player stamina, swing and timed effects
//! - Chapter progression and session state
//! - Bevy plugin host (`engine`)

pub mod balance;
pub mod combat;
pub mod config;
pub mod constants;
pub mod engine;
pub mod events;
pub mod gameflow;
pub mod logging;
pub mod monster;
pub mod physics;
pub mod player;
pub mod tutorial;
pub mod visualization;
pub mod world;

pub use config::{CombatConfig, ConfigError, Preset};
pub use world::CombatWorld;
