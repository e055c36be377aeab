//! Multi-attack enemy turns.
//!
//! A combo is a short list of attack kinds rolled from the enemy's pool.
//! The first attack starts immediately; each following one waits for the
//! previous attack to reach IDLE plus a fixed gap.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::AttackKind;
use crate::balance::Chapter;
use crate::constants::COMBO_MIN_CHAPTER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Combos are rolled from this chapter on
    pub min_chapter: u8,
    pub chance: f64,
    pub min_length: usize,
    pub max_length: usize,
    /// Seconds between one attack finishing and the next starting
    pub gap: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            min_chapter: COMBO_MIN_CHAPTER,
            chance: 0.3,
            min_length: 2,
            max_length: 3,
            gap: 0.3,
        }
    }
}

impl ComboConfig {
    pub fn unlocked(&self, chapter: Chapter) -> bool {
        chapter.number() >= self.min_chapter
    }

    /// `random() < chance`, only in unlocked chapters
    pub fn roll<R: Rng + ?Sized>(&self, chapter: Chapter, rng: &mut R) -> bool {
        self.unlocked(chapter) && rng.gen::<f64>() < self.chance
    }
}

/// Ordered attacks of one combo plus the cursor into them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboSequence {
    attacks: Vec<AttackKind>,
    index: usize,
    gap_timer: f32,
}

impl ComboSequence {
    pub fn new(attacks: Vec<AttackKind>) -> Self {
        Self {
            attacks,
            index: 0,
            gap_timer: 0.0,
        }
    }

    /// Random sequence of `min_length..=max_length` kinds drawn from `pool`.
    /// An empty pool yields an empty (already exhausted) sequence.
    pub fn random<R: Rng + ?Sized>(pool: &[AttackKind], config: &ComboConfig, rng: &mut R) -> Self {
        if pool.is_empty() {
            return Self::new(Vec::new());
        }
        let max = config.max_length.max(config.min_length);
        let length = rng.gen_range(config.min_length..=max);
        let attacks = (0..length)
            .map(|_| pool[rng.gen_range(0..pool.len())])
            .collect();
        Self::new(attacks)
    }

    /// Take the next attack kind and move the cursor past it.
    pub fn next_attack(&mut self) -> Option<AttackKind> {
        let kind = self.attacks.get(self.index).copied()?;
        self.index += 1;
        self.gap_timer = 0.0;
        Some(kind)
    }

    /// Count down the gap while the owner has no attack in flight. True
    /// once the gap has elapsed and the next attack may start.
    pub fn tick_gap(&mut self, dt: f32, gap: f32) -> bool {
        if dt > 0.0 {
            self.gap_timer += dt;
        }
        self.gap_timer >= gap
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.attacks.len()
    }

    pub fn attacks(&self) -> &[AttackKind] {
        &self.attacks
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }
}
