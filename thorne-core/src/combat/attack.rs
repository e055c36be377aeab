//! Phase-based enemy attack lifecycle.
//!
//! TELEGRAPH -> WINDUP -> EXECUTE -> RECOVERY -> IDLE. Only the telegraph is
//! chapter-scaled; the scaling row is copied in at construction and never
//! re-read. Variant-specific work (hitbox placement, telegraph growth,
//! charge movement, shockwave expansion) is looked up in the
//! [`variants`](super::variants) behavior table.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;
use super::variants::{self, VariantState};
use super::{AttackKind, AttackPhase};
use crate::balance::ChapterScaling;
use crate::events::{EffectKind, Outbox, SoundKind};
use crate::monster::EnemyId;
use crate::physics::{Aabb, Body, Facing};

/// Phase durations in seconds, before chapter scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackTimings {
    pub telegraph: f32,
    pub windup: f32,
    pub execute: f32,
    pub recovery: f32,
}

impl AttackTimings {
    pub const fn new(telegraph: f32, windup: f32, execute: f32, recovery: f32) -> Self {
        Self {
            telegraph,
            windup,
            execute,
            recovery,
        }
    }

    pub fn all_positive(&self) -> bool {
        [self.telegraph, self.windup, self.execute, self.recovery]
            .iter()
            .all(|t| t.is_finite() && *t > 0.0)
    }
}

/// Tuning shared by every attack of one variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub base_damage: i32,
    /// Reach in pixels (radius for the circle)
    pub range: f32,
    pub timings: AttackTimings,
}

impl AttackSpec {
    pub const fn new(base_damage: i32, range: f32, timings: AttackTimings) -> Self {
        Self {
            base_damage,
            range,
            timings,
        }
    }
}

/// What an attack may touch while it updates: its owner's body (a charge
/// moves it) and the cue outbox.
pub struct AttackContext<'a> {
    pub owner: &'a mut Body,
    pub facing: Facing,
    pub events: &'a mut Outbox,
}

/// One enemy attack in flight. Owned by exactly one enemy; `owner` is only
/// a handle back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    pub(crate) kind: AttackKind,
    pub(crate) owner: EnemyId,
    pub(crate) spec: AttackSpec,
    pub(crate) scaling: ChapterScaling,
    pub(crate) phase: AttackPhase,
    pub(crate) state_timer: f32,
    pub(crate) hitboxes: Vec<Hitbox>,
    pub(crate) variant: VariantState,
    /// Intercepted by a parry; harmless for the rest of EXECUTE
    pub(crate) deflected: bool,
    /// Already landed on the player
    pub(crate) landed: bool,
    pub(crate) finished: bool,
}

impl Attack {
    pub fn new(
        kind: AttackKind,
        owner: EnemyId,
        spec: AttackSpec,
        scaling: ChapterScaling,
        variant: VariantState,
    ) -> Self {
        Self {
            kind,
            owner,
            spec,
            scaling,
            phase: AttackPhase::Idle,
            state_timer: 0.0,
            hitboxes: Vec::new(),
            variant,
            deflected: false,
            landed: false,
            finished: false,
        }
    }

    /// IDLE -> TELEGRAPH. Returns false, changing nothing, if the attack is
    /// already running.
    pub fn start(&mut self, ctx: &mut AttackContext<'_>) -> bool {
        if self.phase != AttackPhase::Idle {
            return false;
        }
        self.phase = AttackPhase::Telegraph;
        self.state_timer = 0.0;
        self.finished = false;
        self.deflected = false;
        self.landed = false;
        let behavior = variants::behavior(self.kind);
        ctx.events.effect(
            EffectKind::Telegraph(self.kind),
            ctx.owner.center(),
            behavior.telegraph_particles,
        );
        (behavior.on_start)(self, ctx);
        tracing::debug!(target: "thorne_core::combat", owner = self.owner.0, kind = %self.kind, "attack telegraph");
        true
    }

    /// Advance by `dt` seconds. At most one phase transition happens per
    /// call; the phase entered is returned. Non-positive or NaN `dt` is a
    /// no-op.
    pub fn update(&mut self, dt: f32, ctx: &mut AttackContext<'_>) -> Option<AttackPhase> {
        if !(dt > 0.0) || self.phase == AttackPhase::Idle {
            return None;
        }
        self.state_timer += dt;
        let behavior = variants::behavior(self.kind);

        let done = match self.phase {
            AttackPhase::Telegraph => {
                (behavior.on_telegraph)(self, ctx);
                self.state_timer >= self.telegraph_duration()
            }
            AttackPhase::Windup => self.state_timer >= self.spec.timings.windup,
            AttackPhase::Execute => {
                (behavior.on_execute_tick)(self, ctx);
                self.state_timer >= self.spec.timings.execute
            }
            AttackPhase::Recovery => self.state_timer >= self.spec.timings.recovery,
            AttackPhase::Idle => false,
        };
        if !done {
            return None;
        }

        let next = self.phase.next();
        self.phase = next;
        self.state_timer = 0.0;
        match next {
            AttackPhase::Execute => {
                self.hitboxes.clear();
                (behavior.on_execute_enter)(self, ctx);
                ctx.events.sound(SoundKind::for_attack(self.kind));
                ctx.events.effect(
                    EffectKind::AttackTrail(self.kind),
                    ctx.owner.center(),
                    behavior.execute_particles,
                );
            }
            AttackPhase::Idle => self.cleanup(),
            _ => {}
        }
        tracing::debug!(target: "thorne_core::combat", owner = self.owner.0, kind = %self.kind, phase = ?next, "attack phase");
        Some(next)
    }

    fn cleanup(&mut self) {
        self.hitboxes.clear();
        self.variant.reset();
        self.finished = true;
    }

    /// Geometric hit test against the player's box. Always false outside
    /// EXECUTE, after a parry deflected the attack, and after it landed.
    pub fn check_player_hit(&self, target: &Aabb) -> bool {
        if self.phase != AttackPhase::Execute || self.deflected || self.landed {
            return false;
        }
        self.hitboxes.iter().any(|hb| hb.hits(target))
    }

    /// Record that damage was applied; the attack cannot land again.
    pub fn register_hit(&mut self) {
        self.landed = true;
    }

    pub fn deflect(&mut self) {
        self.deflected = true;
    }

    /// `floor(base × damage multiplier)` using the construction-time row
    pub fn scaled_damage(&self) -> i32 {
        (self.spec.base_damage as f32 * self.scaling.damage).floor() as i32
    }

    pub fn telegraph_duration(&self) -> f32 {
        self.spec.timings.telegraph * self.scaling.telegraph_time
    }

    /// 0..1 through the telegraph; 1 once past it, 0 when idle.
    pub fn telegraph_progress(&self) -> f32 {
        match self.phase {
            AttackPhase::Idle => 0.0,
            AttackPhase::Telegraph => {
                let total = self.telegraph_duration();
                if total > 0.0 {
                    (self.state_timer / total).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }

    /// Push applied to a victim centered at `target` when this attack lands.
    pub fn knockback(&self, owner_center: Vec2, target: Vec2) -> Option<Vec2> {
        (variants::behavior(self.kind).knockback)(self, owner_center, target)
    }

    pub fn is_parryable(&self) -> bool {
        self.kind.is_parryable()
    }

    pub fn kind(&self) -> AttackKind {
        self.kind
    }

    pub fn owner(&self) -> EnemyId {
        self.owner
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    pub fn variant(&self) -> &VariantState {
        &self.variant
    }

    pub fn scaling(&self) -> ChapterScaling {
        self.scaling
    }

    pub fn spec(&self) -> &AttackSpec {
        &self.spec
    }

    pub fn is_deflected(&self) -> bool {
        self.deflected
    }

    pub fn has_landed(&self) -> bool {
        self.landed
    }

    /// Ran through RECOVERY back to IDLE; the owner should drop it.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::variants::{AttacksConfig, SlashDirection};

    const DT: f32 = 1.0 / 60.0;

    fn enemy_body() -> Body {
        Body::new(Vec2::new(200.0, 300.0), Vec2::new(40.0, 40.0))
    }

    fn slash(scaling: ChapterScaling) -> Attack {
        let config = AttacksConfig::default();
        Attack::new(
            AttackKind::Slash,
            EnemyId(1),
            config.slash,
            scaling,
            VariantState::Slash {
                direction: SlashDirection::Horizontal,
                thickness: config.slash_thickness,
            },
        )
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let mut attack = slash(ChapterScaling::IDENTITY);
        assert!(attack.start(&mut ctx));
        assert_eq!(attack.phase(), AttackPhase::Telegraph);
        assert!(!attack.start(&mut ctx));
        assert_eq!(attack.phase(), AttackPhase::Telegraph);
    }

    #[test]
    fn test_chapter_one_slash_timeline() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let mut attack = slash(ChapterScaling::new(1.5, 1.0, 1.0));
        attack.start(&mut ctx);
        assert!((attack.telegraph_duration() - 1.5).abs() < 1e-6);

        assert_eq!(attack.update(1.0, &mut ctx), None);
        assert_eq!(attack.update(0.5, &mut ctx), Some(AttackPhase::Windup));
        assert_eq!(attack.update(0.3, &mut ctx), Some(AttackPhase::Execute));
        assert_eq!(attack.hitboxes().len(), 1);
        assert_eq!(attack.update(0.2, &mut ctx), Some(AttackPhase::Recovery));
        assert_eq!(attack.update(0.5, &mut ctx), Some(AttackPhase::Idle));
        assert!(attack.is_finished());
        assert!(attack.hitboxes().is_empty(), "cleanup on idle");
    }

    #[test]
    fn test_one_transition_per_update() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let mut attack = slash(ChapterScaling::IDENTITY);
        attack.start(&mut ctx);
        // A huge step still only leaves the telegraph.
        assert_eq!(attack.update(10.0, &mut ctx), Some(AttackPhase::Windup));
        assert_eq!(attack.state_timer(), 0.0);
    }

    #[test]
    fn test_update_zero_is_noop() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let mut attack = slash(ChapterScaling::IDENTITY);
        attack.start(&mut ctx);
        attack.update(0.5, &mut ctx);
        let before = (attack.phase(), attack.state_timer());
        assert_eq!(attack.update(0.0, &mut ctx), None);
        assert_eq!(attack.update(f32::NAN, &mut ctx), None);
        assert_eq!(attack.update(-1.0, &mut ctx), None);
        assert_eq!((attack.phase(), attack.state_timer()), before);
    }

    #[test]
    fn test_no_hit_outside_execute() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        // Player standing right in front of the enemy
        let player = Aabb::new(250.0, 295.0, 30.0, 50.0);
        let mut attack = slash(ChapterScaling::IDENTITY);
        assert!(!attack.check_player_hit(&player));
        attack.start(&mut ctx);
        assert!(!attack.check_player_hit(&player));
        attack.update(1.0, &mut ctx);
        assert!(!attack.check_player_hit(&player), "windup");
        attack.update(0.3, &mut ctx);
        assert!(attack.check_player_hit(&player), "execute");
        attack.update(0.2, &mut ctx);
        assert!(!attack.check_player_hit(&player), "recovery");
    }

    #[test]
    fn test_deflected_and_landed_stop_hits() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let player = Aabb::new(250.0, 295.0, 30.0, 50.0);
        let mut attack = slash(ChapterScaling::IDENTITY);
        attack.start(&mut ctx);
        attack.update(1.0, &mut ctx);
        attack.update(0.3, &mut ctx);
        let mut deflected = attack.clone();
        deflected.deflect();
        assert!(!deflected.check_player_hit(&player));
        attack.register_hit();
        assert!(!attack.check_player_hit(&player));
    }

    #[test]
    fn test_scaled_damage_floors() {
        let attack = slash(ChapterScaling::new(1.0, 1.1, 1.0));
        assert_eq!(attack.scaled_damage(), 22);
        let attack = slash(ChapterScaling::new(1.0, 1.75, 1.0));
        assert_eq!(attack.scaled_damage(), 35);
        let attack = slash(ChapterScaling::new(1.0, 1.25, 1.0));
        assert_eq!(attack.scaled_damage(), 25);
    }

    #[test]
    fn test_execute_entry_emits_sound() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut attack = slash(ChapterScaling::IDENTITY);
        {
            let mut ctx = AttackContext {
                owner: &mut body,
                facing: Facing::Left,
                events: &mut events,
            };
            attack.start(&mut ctx);
            attack.update(1.0, &mut ctx);
            attack.update(0.3, &mut ctx);
        }
        let sounds: Vec<_> = events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, crate::events::GameEvent::Sound(_)))
            .collect();
        assert_eq!(sounds, vec![crate::events::GameEvent::Sound(SoundKind::Slash)]);
    }

    #[test]
    fn test_telegraph_progress() {
        let mut body = enemy_body();
        let mut events = Outbox::new();
        let mut ctx = AttackContext {
            owner: &mut body,
            facing: Facing::Right,
            events: &mut events,
        };
        let mut attack = slash(ChapterScaling::new(1.5, 1.0, 1.0));
        assert_eq!(attack.telegraph_progress(), 0.0);
        attack.start(&mut ctx);
        for _ in 0..45 {
            attack.update(DT, &mut ctx);
        }
        assert!((attack.telegraph_progress() - 0.5).abs() < 1e-3);
    }
}
