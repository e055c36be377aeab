//! Player character.
//!
//! The player owns its body, stamina, parry system and timed effects. Input
//! arrives as a [`PlayerInput`] snapshot per tick; the world integrates the
//! body and resolves collisions afterwards.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::parry::{ParryOutcome, Riposte};
use crate::combat::{Afflictions, DamageBoost, ParryConfig, ParryState, ParrySystem};
use crate::events::{DamageSource, EffectKind, GameEvent, Outbox, SoundKind};
use crate::monster::EnemyId;
use crate::physics::{Aabb, Body, Facing};
use crate::tutorial::TutorialTag;

pub mod stamina;

pub use stamina::{Stamina, StaminaConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: Vec2,
    pub spawn: Vec2,
    /// Pixels per reference frame
    pub move_speed: f32,
    /// Speed fraction while too tired to run
    pub walk_factor: f32,
    pub jump_impulse: f32,
    pub max_health: i32,
    /// Seconds of immunity after a hit
    pub invincibility: f32,
    pub fall_damage: i32,
    pub attack_duration: f32,
    /// Width of the swing box in front of the player
    pub attack_range: f32,
    /// Vertical inset of the swing box from the player's top and bottom
    pub attack_inset: f32,
    pub base_damage: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(30.0, 50.0),
            spawn: Vec2::new(100.0, 300.0),
            move_speed: 5.0,
            walk_factor: 0.5,
            jump_impulse: 12.0,
            max_health: 100,
            invincibility: 1.0,
            fall_damage: 10,
            attack_duration: 1.0 / 3.0,
            attack_range: 50.0,
            attack_inset: 10.0,
            base_damage: 10,
        }
    }
}

/// Input snapshot for one tick. `attack` and `parry` are edges (pressed
/// this tick), the rest are held states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub parry: bool,
}

/// A swing in progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Swing {
    pub timer: f32,
    /// Enemies this swing already damaged
    pub hits: Vec<EnemyId>,
    /// Taken from the parry system on the first landing
    pub riposte: Option<Riposte>,
}

/// Damage one swing deals to one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingHit {
    pub damage: i32,
    pub riposte: Option<Riposte>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub health: i32,
    pub max_health: i32,
    pub stamina: Stamina,
    pub parry: ParrySystem,
    pub boost: DamageBoost,
    pub invincibility: f32,
    /// Left by a failed parry; invincibility is ignored while it runs
    pub vulnerability: f32,
    pub swing: Option<Swing>,
    pub afflictions: Afflictions,
    config: PlayerConfig,
    stamina_config: StaminaConfig,
}

impl Player {
    pub fn new(config: &PlayerConfig, stamina: &StaminaConfig, parry: ParryConfig) -> Self {
        Self {
            body: Body::new(config.spawn, config.size),
            facing: Facing::Right,
            health: config.max_health,
            max_health: config.max_health,
            stamina: Stamina::new(stamina),
            parry: ParrySystem::new(parry),
            boost: DamageBoost::default(),
            invincibility: 0.0,
            vulnerability: 0.0,
            swing: None,
            afflictions: Afflictions::default(),
            config: config.clone(),
            stamina_config: stamina.clone(),
        }
    }

    /// Count down invincibility, vulnerability, the damage boost, the
    /// current swing and stamina regen.
    pub fn tick_timers(&mut self, dt: f32, events: &mut Outbox) {
        if !(dt > 0.0) {
            return;
        }
        self.invincibility = (self.invincibility - dt).max(0.0);
        self.vulnerability = (self.vulnerability - dt).max(0.0);
        self.boost.tick(dt);
        if let Some(swing) = &mut self.swing {
            swing.timer -= dt;
            if swing.timer <= 0.0 {
                self.swing = None;
            }
        }
        if self.stamina.update(dt) {
            events.tutorial(TutorialTag::Stamina);
        }
    }

    /// Turn this tick's input into velocity, a jump, a swing or a parry
    /// attempt, paying stamina for each.
    pub fn apply_input(&mut self, input: &PlayerInput, dt: f32, events: &mut Outbox) {
        let direction = match (input.left, input.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.body.velocity.x = 0.0;
        if direction != 0.0 {
            let cost = self.stamina_config.run_cost * dt.max(0.0);
            let running = if cost > 0.0 {
                self.stamina.use_stamina(cost)
            } else {
                self.stamina.can_use(0.0)
            };
            let speed = if running {
                self.config.move_speed
            } else {
                self.config.move_speed * self.config.walk_factor
            };
            self.body.velocity.x = speed * direction;
            self.facing = Facing::from_velocity(direction, self.facing);
        }

        if input.jump && self.body.grounded && self.stamina.use_stamina(self.stamina_config.jump_cost) {
            self.body.velocity.y = -self.config.jump_impulse;
            self.body.grounded = false;
        }

        if input.attack && self.swing.is_none() && self.stamina.use_stamina(self.stamina_config.attack_cost) {
            self.swing = Some(Swing {
                timer: self.config.attack_duration,
                ..Default::default()
            });
            events.sound(SoundKind::Slash);
            let reach = self.facing.sign() * (self.config.attack_range / 2.0 + self.body.size.x / 2.0);
            events.effect(EffectKind::PlayerSwing, self.body.center() + Vec2::new(reach, 0.0), 5);
        }

        if input.parry
            && self.parry.state() == ParryState::Ready
            && self.stamina.can_use(self.stamina_config.parry_cost)
            && self.parry.attempt_parry(events)
        {
            self.stamina.use_stamina(self.stamina_config.parry_cost);
        }

        if self.stamina.is_exhausted() {
            events.tutorial(TutorialTag::Stamina);
        }
    }

    /// Swing box in front of the player, while a swing is in progress
    pub fn attack_box(&self) -> Option<Aabb> {
        self.swing.as_ref()?;
        let range = self.config.attack_range;
        let x = match self.facing {
            Facing::Right => self.body.position.x + self.body.size.x,
            Facing::Left => self.body.position.x - range,
        };
        Some(Aabb::new(
            x,
            self.body.position.y + self.config.attack_inset,
            range,
            self.body.size.y - 2.0 * self.config.attack_inset,
        ))
    }

    /// `floor(base × boost × riposte)`
    pub fn swing_damage(&self, riposte: Option<&Riposte>) -> i32 {
        let riposte = riposte.map_or(1.0, |r| r.damage_multiplier);
        (self.config.base_damage as f32 * self.boost.current() * riposte).floor() as i32
    }

    /// Land the current swing on `enemy`. Each swing damages an enemy at
    /// most once; the first landing consumes the riposte window and the
    /// bonus carries to every enemy that swing reaches.
    pub fn land_swing(&mut self, enemy: EnemyId) -> Option<SwingHit> {
        let swing = self.swing.as_mut()?;
        if swing.hits.contains(&enemy) {
            return None;
        }
        if swing.hits.is_empty() {
            swing.riposte = self.parry.consume_riposte();
        }
        swing.hits.push(enemy);
        let riposte = swing.riposte;
        Some(SwingHit {
            damage: self.swing_damage(riposte.as_ref()),
            riposte,
        })
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0 && self.vulnerability <= 0.0
    }

    /// Apply a hit. Ignored while invincible; otherwise grants fresh
    /// invincibility. Returns whether damage was taken.
    pub fn take_damage(&mut self, amount: i32, source: DamageSource, events: &mut Outbox) -> bool {
        if amount <= 0 || self.is_invincible() || self.is_dead() {
            return false;
        }
        self.invincibility = self.config.invincibility;
        self.lose_health(amount, source, events);
        true
    }

    /// Damage over time: ignores invincibility and grants none.
    pub fn take_affliction_damage(&mut self, amount: i32, events: &mut Outbox) {
        if amount <= 0 || self.is_dead() {
            return;
        }
        events.effect(EffectKind::Affliction, self.body.center(), 4);
        self.lose_health(amount, DamageSource::Affliction, events);
    }

    fn lose_health(&mut self, amount: i32, source: DamageSource, events: &mut Outbox) {
        self.health = (self.health - amount).max(0);
        events.effect(EffectKind::Damage, self.body.center(), 8);
        events.push(GameEvent::PlayerDamaged { amount, source });
        tracing::debug!(target: "thorne_core::player", amount, ?source, health = self.health, "player damaged");
    }

    /// Reward or penalty of a resolved parry. Souls are the session's.
    pub fn apply_parry_outcome(&mut self, outcome: &ParryOutcome) {
        if let Some((multiplier, duration)) = outcome.damage_boost {
            self.boost = DamageBoost::new(multiplier, duration);
        }
        self.stamina.drain(outcome.stamina_penalty);
        if outcome.vulnerability > 0.0 {
            self.vulnerability = self.vulnerability.max(outcome.vulnerability);
        }
    }

    /// Push from an attack: adds to horizontal speed and lifts at least as
    /// hard as `push.y`.
    pub fn apply_knockback(&mut self, push: Vec2) {
        self.body.velocity.x += push.x;
        self.body.velocity.y = self.body.velocity.y.min(push.y);
        self.body.grounded = false;
    }

    /// Back to the spawn point with a fresh parry state.
    pub fn respawn(&mut self) {
        self.body.position = self.config.spawn;
        self.body.velocity = Vec2::ZERO;
        self.body.grounded = false;
        self.swing = None;
        self.parry.reset();
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(
            &PlayerConfig::default(),
            &StaminaConfig::default(),
            ParryConfig::default(),
        )
    }
}
