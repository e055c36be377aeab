//! Outbound cues for the collaborators the core does not own.
//!
//! Audio, particles and tutorial prompts live outside the combat core. The
//! core pushes fire-and-forget [`GameEvent`]s into an [`Outbox`] during a
//! tick and the host drains them afterwards. Nothing the host does with a
//! cue flows back into the simulation.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::balance::Chapter;
use crate::combat::{AttackKind, ParryResult};
use crate::monster::EnemyId;
use crate::monster::boss::BossKind;
use crate::tutorial::{TutorialTag, TutorialTracker};

/// Sounds the audio collaborator knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    Slash,
    Thrust,
    Aoe,
    Cone,
    Charge,
    GroundSlam,
    Riposte,
    ParryAttempt,
    ParryPerfect,
    ParryGood,
    ParryFail,
}

impl SoundKind {
    /// Execute cue for an attack variant
    pub fn for_attack(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Slash => Self::Slash,
            AttackKind::Thrust => Self::Thrust,
            AttackKind::AoeCircle => Self::Aoe,
            AttackKind::AoeCone => Self::Cone,
            AttackKind::Charge => Self::Charge,
            AttackKind::GroundSlam => Self::GroundSlam,
        }
    }
}

/// Background music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    Normal,
    Boss,
}

/// Decorative effects; the particle collaborator owns their lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Telegraph(AttackKind),
    AttackTrail(AttackKind),
    Damage,
    PlayerSwing,
    ParrySpark { perfect: bool },
    ParryFail,
    Riposte,
    Shockwave,
    ChargeDust,
    EnemyDeath,
    Affliction,
}

/// Where and how much of an effect to spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectCue {
    pub kind: EffectKind,
    pub position: Vec2,
    pub count: u32,
}

/// What dealt damage to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Attack(AttackKind),
    Contact,
    Fall,
    Affliction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundKind),
    SwitchTrack(Track),
    Effect(EffectCue),
    Tutorial(TutorialTag),
    PlayerDamaged {
        amount: i32,
        source: DamageSource,
    },
    PlayerDied,
    EnemyDamaged {
        enemy: EnemyId,
        amount: i32,
        riposte: bool,
    },
    EnemyDefeated {
        enemy: EnemyId,
        souls: u32,
    },
    ParryResolved {
        result: ParryResult,
        souls: u32,
    },
    ChapterAdvanced {
        from: Chapter,
        to: Chapter,
    },
    BossSpawned(BossKind),
    BossDefeated(BossKind),
    Victory,
}

/// Per-session cue queue. Tutorial tags are deduplicated here so callers
/// can fire them freely.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<GameEvent>,
    tutorials: TutorialTracker,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, kind: SoundKind) {
        self.push(GameEvent::Sound(kind));
    }

    pub fn effect(&mut self, kind: EffectKind, position: Vec2, count: u32) {
        self.push(GameEvent::Effect(EffectCue {
            kind,
            position,
            count,
        }));
    }

    /// Queue `tag` unless it was already shown this session.
    pub fn tutorial(&mut self, tag: TutorialTag) -> bool {
        let first = self.tutorials.first_time(tag);
        if first {
            self.push(GameEvent::Tutorial(tag));
        }
        first
    }

    pub fn tutorials(&self) -> &TutorialTracker {
        &self.tutorials
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every queued cue to the host. The tutorial memory is kept.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
