//! Bevy integration layer.
//!
//! The combat core is plain data driven by [`CombatWorld::tick`]. This
//! module wraps it for a bevy host:
//!
//!   keyboard / host input -> PendingInput -> CombatWorld::tick -> CombatCue
//!
//! Rendering, audio and UI stay with the host, which reads `CombatCue`
//! events and the world resource.
//!
//! [`CombatWorld::tick`]: crate::world::CombatWorld::tick

pub mod input;
pub mod plugin;

pub use input::{keyboard_input, PendingInput};
pub use plugin::{CombatCorePlugin, CombatCue, CombatResource};

// =====================================================
// Tests
// =====================================================
