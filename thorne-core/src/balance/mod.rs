//! Difficulty scaling per chapter.
//!
//! Later chapters shorten telegraphs and raise damage and speed. A scaling
//! row is copied into every attack when it is built, so a chapter change
//! never reaches an attack that is already in flight.

use serde::{Deserialize, Serialize};

use crate::combat::AttackKind;
use crate::constants::{FIRST_CHAPTER, LAST_CHAPTER};

/// Story chapter, always within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Chapter(u8);

impl Chapter {
    pub const FIRST: Chapter = Chapter(FIRST_CHAPTER);
    pub const LAST: Chapter = Chapter(LAST_CHAPTER);

    /// `None` outside `1..=5`
    pub fn new(number: u8) -> Option<Self> {
        (FIRST_CHAPTER..=LAST_CHAPTER)
            .contains(&number)
            .then_some(Self(number))
    }

    /// Out-of-range numbers fall back to chapter 1, like an unknown table key.
    pub fn or_first(number: u8) -> Self {
        Self::new(number).unwrap_or(Self::FIRST)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based index into per-chapter tables
    pub fn index(self) -> usize {
        usize::from(self.0 - FIRST_CHAPTER)
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn all() -> impl Iterator<Item = Chapter> {
        (FIRST_CHAPTER..=LAST_CHAPTER).map(Chapter)
    }
}

impl Default for Chapter {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Chapter {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("chapter {value} outside 1..=5"))
    }
}

impl From<Chapter> for u8 {
    fn from(chapter: Chapter) -> u8 {
        chapter.0
    }
}

impl std::fmt::Display for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chapter {}", self.0)
    }
}

/// Multipliers applied to an attack built in a given chapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChapterScaling {
    /// Multiplies the telegraph phase only
    pub telegraph_time: f32,
    pub damage: f32,
    /// Multiplies enemy patrol speed
    pub speed: f32,
}

impl ChapterScaling {
    pub const fn new(telegraph_time: f32, damage: f32, speed: f32) -> Self {
        Self {
            telegraph_time,
            damage,
            speed,
        }
    }

    /// No scaling at all, used by tests and tools
    pub const IDENTITY: ChapterScaling = ChapterScaling::new(1.0, 1.0, 1.0);
}

/// Chapter-keyed scaling table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingTable {
    pub chapters: [ChapterScaling; 5],
}

impl Default for ScalingTable {
    fn default() -> Self {
        Self {
            chapters: [
                ChapterScaling::new(1.5, 1.0, 1.0),
                ChapterScaling::new(1.25, 1.1, 1.1),
                ChapterScaling::new(1.0, 1.25, 1.2),
                ChapterScaling::new(0.8, 1.4, 1.3),
                ChapterScaling::new(0.6, 1.75, 1.5),
            ],
        }
    }
}

impl ScalingTable {
    pub fn for_chapter(&self, chapter: Chapter) -> ChapterScaling {
        self.chapters[chapter.index()]
    }
}

/// Attack kinds an ordinary enemy may use in `chapter`. Grows monotonically.
pub fn attack_pool(chapter: Chapter) -> &'static [AttackKind] {
    use AttackKind::*;
    const POOLS: [&[AttackKind]; 5] = [
        &[Slash],
        &[Slash, Thrust],
        &[Slash, Thrust, AoeCircle],
        &[Slash, Thrust, AoeCircle, AoeCone, Charge],
        &[Slash, Thrust, AoeCircle, AoeCone, Charge, GroundSlam],
    ];
    POOLS[chapter.index()]
}
