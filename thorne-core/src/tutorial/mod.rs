//! One-shot tutorial prompts.
//!
//! Each tag is announced at most once per session. The tracker outlives
//! `CombatWorld::reset`, so restarting after a game over does not replay
//! prompts the player has already seen.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// First-occurrence hooks the UI can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TutorialTag {
    Parry,
    Stamina,
    Aoe,
    Combo,
    PerfectParry,
    Charge,
    GroundSlam,
    Riposte,
}

impl TutorialTag {
    pub const ALL: [TutorialTag; 8] = [
        Self::Parry,
        Self::Stamina,
        Self::Aoe,
        Self::Combo,
        Self::PerfectParry,
        Self::Charge,
        Self::GroundSlam,
        Self::Riposte,
    ];

    /// Default prompt text. Hosts are free to localise by tag instead.
    pub fn message(self) -> &'static str {
        match self {
            Self::Parry => "Press Q to parry incoming attacks. Time it right for maximum rewards.",
            Self::Stamina => "Watch your stamina! Actions consume it. Rest to regenerate.",
            Self::Aoe => "Red attacks cannot be parried. Move away from the danger zone.",
            Self::Combo => "Enemy combo attack! Parry each strike in sequence for bonus rewards.",
            Self::PerfectParry => "Perfect parry! Frame-perfect timing grants maximum souls and a damage boost.",
            Self::Charge => "Enemy charge attack! Get out of its path before it reaches you.",
            Self::GroundSlam => "Ground slam incoming! The shockwave cannot be parried.",
            Self::Riposte => "Riposte window open! Attack now for double damage and enemy stagger.",
        }
    }
}

/// Remembers which prompts were already shown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialTracker {
    shown: HashSet<TutorialTag>,
}

impl TutorialTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `tag` shown. Returns true only the first time.
    pub fn first_time(&mut self, tag: TutorialTag) -> bool {
        self.shown.insert(tag)
    }

    pub fn has_shown(&self, tag: TutorialTag) -> bool {
        self.shown.contains(&tag)
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }
}
