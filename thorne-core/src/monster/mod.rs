//! Enemies: kinds, per-kind stats, and the enemy entity.
//!
//! An enemy exclusively owns its in-flight [`Attack`] and its combo cursor.
//! The attack refers back to it only through an [`EnemyId`] handle.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::balance::{attack_pool, Chapter};
use crate::combat::{Attack, AttackKind, ComboSequence};
use crate::events::{EffectKind, Outbox};
use crate::physics::{Body, Facing};

pub mod ai;
pub mod boss;

use boss::BossState;

/// Stable enemy handle, unique for the lifetime of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

impl std::fmt::Display for EnemyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Ordinary enemy kinds of the story chapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Basic,
    Verge,
    Memory,
    Voice,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [Self::Basic, Self::Verge, Self::Memory, Self::Voice];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: i32,
    pub contact_damage: i32,
    pub souls: u32,
}

impl EnemyStats {
    pub const fn new(health: i32, contact_damage: i32, souls: u32) -> Self {
        Self {
            health,
            contact_damage,
            souls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemiesConfig {
    pub basic: EnemyStats,
    pub verge: EnemyStats,
    pub memory: EnemyStats,
    pub voice: EnemyStats,
    pub size: Vec2,
    /// Pixels per reference frame, before chapter speed scaling
    pub patrol_speed: f32,
    /// Horizontal distance under which an enemy starts an attack
    pub trigger_distance: f32,
    /// Seconds between attack decisions
    pub attack_cooldown: f32,
    /// Seconds an enemy waits between contact hits; 0 leaves it to the
    /// player's invincibility
    pub contact_cooldown: f32,
    /// Chance per reference frame that a patrolling enemy turns around
    pub patrol_turn_chance: f64,
    /// Turn back this many pixels before the edge of the platform being
    /// walked on; `None` walks off ledges
    pub patrol_edge_margin: Option<f32>,
    /// Push applied when the player's swing lands, away from the player
    pub hit_knockback: Vec2,
    /// Starting roster
    pub spawns: Vec<(EnemyKind, Vec2)>,
}

impl Default for EnemiesConfig {
    fn default() -> Self {
        Self {
            basic: EnemyStats::new(20, 5, 10),
            verge: EnemyStats::new(30, 10, 15),
            memory: EnemyStats::new(10, 5, 20),
            voice: EnemyStats::new(40, 10, 25),
            size: Vec2::new(40.0, 40.0),
            patrol_speed: 1.0,
            trigger_distance: 120.0,
            attack_cooldown: 2.0,
            contact_cooldown: 0.0,
            patrol_turn_chance: 0.0,
            patrol_edge_margin: None,
            hit_knockback: Vec2::new(5.0, -3.0),
            spawns: vec![
                (EnemyKind::Basic, Vec2::new(300.0, 320.0)),
                (EnemyKind::Basic, Vec2::new(600.0, 270.0)),
            ],
        }
    }
}

impl EnemiesConfig {
    pub fn stats(&self, kind: EnemyKind) -> EnemyStats {
        match kind {
            EnemyKind::Basic => self.basic,
            EnemyKind::Verge => self.verge,
            EnemyKind::Memory => self.memory,
            EnemyKind::Voice => self.voice,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub body: Body,
    pub facing: Facing,
    pub health: i32,
    pub max_health: i32,
    pub contact_damage: i32,
    pub souls: u32,
    pub patrol_speed: f32,
    /// Seconds left of stagger; no movement or decisions while positive
    pub stagger: f32,
    pub attack: Option<Attack>,
    pub combo: Option<ComboSequence>,
    /// Seconds since the last attack decision; `None` before the first
    pub since_attack: Option<f32>,
    pub contact_cooldown: f32,
    pub pool: Vec<AttackKind>,
    pub boss: Option<BossState>,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, position: Vec2, config: &EnemiesConfig, chapter: Chapter) -> Self {
        let stats = config.stats(kind);
        let mut body = Body::new(position, config.size);
        body.velocity.x = config.patrol_speed;
        Self {
            id,
            kind,
            body,
            facing: Facing::Right,
            health: stats.health,
            max_health: stats.health,
            contact_damage: stats.contact_damage,
            souls: stats.souls,
            patrol_speed: config.patrol_speed,
            stagger: 0.0,
            attack: None,
            combo: None,
            since_attack: None,
            contact_cooldown: 0.0,
            pool: attack_pool(chapter).to_vec(),
            boss: None,
        }
    }

    /// Stop in place for `duration` seconds. A longer running stagger is
    /// kept.
    pub fn stagger(&mut self, duration: f32, events: &mut Outbox) {
        if !(duration > 0.0) {
            return;
        }
        self.stagger = self.stagger.max(duration);
        self.body.velocity.x = 0.0;
        events.effect(EffectKind::Damage, self.body.center(), 8);
        tracing::debug!(target: "thorne_core::monster", enemy = %self.id, duration, "staggered");
    }

    /// Subtract health. Returns true when this hit killed the enemy.
    pub fn take_damage(&mut self, amount: i32, events: &mut Outbox) -> bool {
        if amount <= 0 || self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        events.effect(EffectKind::Damage, self.body.center(), 8);
        self.is_dead()
    }

    /// Velocity of the patrol walk in the current facing
    pub fn patrol_velocity(&self, speed_multiplier: f32) -> f32 {
        self.facing.sign() * self.patrol_speed * speed_multiplier
    }

    /// Replace the attack pool with the one unlocked in `chapter`. Bosses
    /// keep their own pools.
    pub fn refresh_pool(&mut self, chapter: Chapter) {
        if self.boss.is_none() {
            self.pool = attack_pool(chapter).to_vec();
        }
    }

    pub fn is_staggered(&self) -> bool {
        self.stagger > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn in_combo(&self) -> bool {
        self.combo.is_some()
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0 {
            self.health as f32 / self.max_health as f32
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> Enemy {
        Enemy::new(
            EnemyId(1),
            EnemyKind::Basic,
            Vec2::new(300.0, 320.0),
            &EnemiesConfig::default(),
            Chapter::FIRST,
        )
    }

    #[test]
    fn test_kind_stats() {
        let config = EnemiesConfig::default();
        assert_eq!(config.stats(EnemyKind::Basic), EnemyStats::new(20, 5, 10));
        assert_eq!(config.stats(EnemyKind::Voice).souls, 25);
        assert!(EnemyKind::ALL
            .iter()
            .all(|k| config.stats(*k).health > 0));
    }

    #[test]
    fn test_two_swings_kill_basic() {
        let mut enemy = basic();
        let mut events = Outbox::new();
        assert!(!enemy.take_damage(10, &mut events));
        assert!(enemy.take_damage(10, &mut events));
        assert_eq!(enemy.health, 0);
        assert!(!enemy.take_damage(10, &mut events), "already dead");
    }

    #[test]
    fn test_stagger_keeps_longest() {
        let mut enemy = basic();
        let mut events = Outbox::new();
        enemy.stagger(1.5, &mut events);
        enemy.stagger(1.0, &mut events);
        assert_eq!(enemy.stagger, 1.5);
        assert_eq!(enemy.body.velocity.x, 0.0);
        assert!(enemy.is_staggered());
    }

    #[test]
    fn test_pool_follows_chapter() {
        let mut enemy = basic();
        assert_eq!(enemy.pool, vec![AttackKind::Slash]);
        enemy.refresh_pool(Chapter::LAST);
        assert_eq!(enemy.pool.len(), 6);
    }

    #[test]
    fn test_patrol_velocity_scales() {
        let mut enemy = basic();
        assert_eq!(enemy.patrol_velocity(1.5), 1.5);
        enemy.facing = Facing::Left;
        assert_eq!(enemy.patrol_velocity(1.0), -1.0);
    }
}
