//! Centralized constants for the combat core.
//!
//! Tunable gameplay numbers live in [`crate::config::CombatConfig`]; this file
//! only holds the fixed reference values the tables are expressed against.

// =====================================================
// Time
// =====================================================

/// Reference simulation rate. Frame-denominated values (physics velocities,
/// parry windows) are expressed against this rate.
pub const REFERENCE_FPS: f32 = 60.0;

/// Duration of one reference frame in seconds.
pub const FRAME_TIME: f32 = 1.0 / REFERENCE_FPS;

/// Upper bound for a single tick's delta (host clamps to >= 30 fps).
pub const MAX_FRAME_DELTA: f32 = 1.0 / 30.0;

// =====================================================
// Playfield
// =====================================================

/// Width of the playfield in pixels
pub const CANVAS_WIDTH: f32 = 800.0;

/// Height of the playfield in pixels
pub const CANVAS_HEIGHT: f32 = 450.0;

// =====================================================
// Chapters
// =====================================================

/// First chapter of the story
pub const FIRST_CHAPTER: u8 = 1;

/// Final chapter of the story
pub const LAST_CHAPTER: u8 = 5;

/// Chapter from which enemies may chain attacks into combos
pub const COMBO_MIN_CHAPTER: u8 = 4;

/// Roster cap when topping up enemies on chapter advance
pub const MAX_ROSTER: usize = 5;
