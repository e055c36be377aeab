//! Attack variants: data plus a table of behavior hooks.
//!
//! Every [`AttackKind`] maps to one static [`VariantBehavior`]. The phase
//! machine in [`attack`](super::attack) calls the hooks; a variant only
//! fills in the ones it cares about and leaves the rest as `no_op`.

use std::f32::consts::PI;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::attack::{Attack, AttackContext, AttackSpec, AttackTimings};
use super::hitbox::Hitbox;
use super::AttackKind;
use crate::balance::ChapterScaling;
use crate::events::EffectKind;
use crate::monster::EnemyId;
use crate::physics::{Aabb, Body, Facing};
use crate::tutorial::TutorialTag;

/// Slash orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlashDirection {
    #[default]
    Horizontal,
    Vertical,
    Diagonal,
}

/// Per-variant state carried by an [`Attack`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariantState {
    Slash {
        direction: SlashDirection,
        /// Short side of the slash box
        thickness: f32,
    },
    Thrust {
        thickness: f32,
    },
    AoeCircle {
        radius: f32,
        /// Warning circle, grows through the telegraph
        telegraph_radius: f32,
    },
    AoeCone {
        /// Full opening angle, radians
        angle: f32,
        telegraph_angle: f32,
    },
    Charge {
        /// -1.0 or 1.0, fixed when the attack is built
        direction: f32,
        speed: f32,
        distance: f32,
        stop_distance: f32,
        /// Owner x when EXECUTE began
        origin_x: f32,
        moves: u32,
    },
    GroundSlam {
        speed: f32,
        max_radius: f32,
        radius: f32,
        knockback: f32,
        lift: f32,
    },
}

impl VariantState {
    /// Clear everything that accumulates while the attack runs.
    pub fn reset(&mut self) {
        match self {
            Self::AoeCircle {
                telegraph_radius, ..
            } => *telegraph_radius = 0.0,
            Self::AoeCone {
                telegraph_angle, ..
            } => *telegraph_angle = 0.0,
            Self::Charge { moves, .. } => *moves = 0,
            Self::GroundSlam { radius, .. } => *radius = 0.0,
            Self::Slash { .. } | Self::Thrust { .. } => {}
        }
    }

    /// Size of the telegraph warning shape: radius for the circle, angle for
    /// the cone.
    pub fn telegraph_extent(&self) -> Option<f32> {
        match *self {
            Self::AoeCircle {
                telegraph_radius, ..
            } => Some(telegraph_radius),
            Self::AoeCone {
                telegraph_angle, ..
            } => Some(telegraph_angle),
            _ => None,
        }
    }
}

pub type Hook = fn(&mut Attack, &mut AttackContext<'_>);
pub type KnockbackFn = fn(&Attack, Vec2, Vec2) -> Option<Vec2>;

/// Hooks a variant overrides. Everything defaults to `no_op`.
pub struct VariantBehavior {
    /// Right after IDLE -> TELEGRAPH
    pub on_start: Hook,
    /// Every TELEGRAPH tick
    pub on_telegraph: Hook,
    /// Once, on entering EXECUTE; builds the hitboxes
    pub on_execute_enter: Hook,
    /// Every EXECUTE tick after entry
    pub on_execute_tick: Hook,
    pub knockback: KnockbackFn,
    pub telegraph_particles: u32,
    pub execute_particles: u32,
}

fn no_op(_: &mut Attack, _: &mut AttackContext<'_>) {}

fn no_knockback(_: &Attack, _: Vec2, _: Vec2) -> Option<Vec2> {
    None
}

static SLASH: VariantBehavior = VariantBehavior {
    on_start: no_op,
    on_telegraph: no_op,
    on_execute_enter: slash_execute,
    on_execute_tick: no_op,
    knockback: no_knockback,
    telegraph_particles: 0,
    execute_particles: 8,
};

static THRUST: VariantBehavior = VariantBehavior {
    on_start: no_op,
    on_telegraph: no_op,
    on_execute_enter: thrust_execute,
    on_execute_tick: no_op,
    knockback: no_knockback,
    telegraph_particles: 0,
    execute_particles: 6,
};

static AOE_CIRCLE: VariantBehavior = VariantBehavior {
    on_start: no_op,
    on_telegraph: grow_warning,
    on_execute_enter: circle_execute,
    on_execute_tick: no_op,
    knockback: no_knockback,
    telegraph_particles: 0,
    execute_particles: 20,
};

static AOE_CONE: VariantBehavior = VariantBehavior {
    on_start: no_op,
    on_telegraph: grow_warning,
    on_execute_enter: cone_execute,
    on_execute_tick: no_op,
    knockback: no_knockback,
    telegraph_particles: 0,
    execute_particles: 15,
};

static CHARGE: VariantBehavior = VariantBehavior {
    on_start: charge_start,
    on_telegraph: no_op,
    on_execute_enter: charge_execute,
    on_execute_tick: charge_tick,
    knockback: no_knockback,
    telegraph_particles: 15,
    execute_particles: 10,
};

static GROUND_SLAM: VariantBehavior = VariantBehavior {
    on_start: slam_start,
    on_telegraph: no_op,
    on_execute_enter: slam_execute,
    on_execute_tick: slam_tick,
    knockback: slam_knockback,
    telegraph_particles: 12,
    execute_particles: 20,
};

pub fn behavior(kind: AttackKind) -> &'static VariantBehavior {
    match kind {
        AttackKind::Slash => &SLASH,
        AttackKind::Thrust => &THRUST,
        AttackKind::AoeCircle => &AOE_CIRCLE,
        AttackKind::AoeCone => &AOE_CONE,
        AttackKind::Charge => &CHARGE,
        AttackKind::GroundSlam => &GROUND_SLAM,
    }
}

/// Box of `width × height` beside the owner on its facing side, vertically
/// centered on it.
fn beside(owner: &Body, facing: Facing, width: f32, height: f32) -> Aabb {
    let x = match facing {
        Facing::Left => owner.position.x - width,
        Facing::Right => owner.position.x + owner.size.x,
    };
    let y = owner.position.y + owner.size.y / 2.0 - height / 2.0;
    Aabb::new(x, y, width, height)
}

fn slash_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::Slash {
        direction,
        thickness,
    } = attack.variant
    else {
        return;
    };
    let range = attack.spec.range;
    let (width, height) = match direction {
        SlashDirection::Horizontal => (range, thickness),
        SlashDirection::Vertical => (thickness, range),
        SlashDirection::Diagonal => (range, range),
    };
    attack.hitboxes = vec![Hitbox::Rect(beside(ctx.owner, ctx.facing, width, height))];
}

fn thrust_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::Thrust { thickness } = attack.variant else {
        return;
    };
    let rect = beside(ctx.owner, ctx.facing, attack.spec.range, thickness);
    attack.hitboxes = vec![Hitbox::Rect(rect)];
}

fn grow_warning(attack: &mut Attack, _: &mut AttackContext<'_>) {
    let progress = attack.telegraph_progress();
    match &mut attack.variant {
        VariantState::AoeCircle {
            radius,
            telegraph_radius,
        } => *telegraph_radius = *radius * progress,
        VariantState::AoeCone {
            angle,
            telegraph_angle,
        } => *telegraph_angle = *angle * progress,
        _ => {}
    }
}

fn circle_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::AoeCircle { radius, .. } = attack.variant else {
        return;
    };
    attack.hitboxes = vec![Hitbox::Circle {
        center: ctx.owner.center(),
        radius,
    }];
    ctx.events.tutorial(TutorialTag::Aoe);
}

fn cone_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::AoeCone { angle, .. } = attack.variant else {
        return;
    };
    attack.hitboxes = vec![Hitbox::Cone {
        origin: ctx.owner.center(),
        heading: ctx.facing.angle(),
        angle,
        range: attack.spec.range,
    }];
}

fn charge_start(_: &mut Attack, ctx: &mut AttackContext<'_>) {
    ctx.events.tutorial(TutorialTag::Charge);
}

fn charge_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    if let VariantState::Charge { origin_x, .. } = &mut attack.variant {
        *origin_x = ctx.owner.position.x;
    }
    let feet = Vec2::new(ctx.owner.center().x, ctx.owner.aabb().bottom());
    ctx.events.effect(EffectKind::ChargeDust, feet, 10);
}

/// Moves the owner one step toward the charge target; the hitbox is the
/// owner's own box and exists only while it is still moving.
fn charge_tick(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::Charge {
        direction,
        speed,
        distance,
        stop_distance,
        origin_x,
        moves,
    } = &mut attack.variant
    else {
        return;
    };
    let target_x = *origin_x + *distance * *direction;
    if (target_x - ctx.owner.position.x).abs() > *stop_distance {
        ctx.owner.position.x += *speed * *direction;
        *moves += 1;
        attack.hitboxes = vec![Hitbox::Rect(ctx.owner.aabb())];
    } else {
        attack.hitboxes.clear();
    }
}

fn slam_start(_: &mut Attack, ctx: &mut AttackContext<'_>) {
    ctx.events.tutorial(TutorialTag::GroundSlam);
}

fn slam_execute(_: &mut Attack, ctx: &mut AttackContext<'_>) {
    let feet = Vec2::new(ctx.owner.center().x, ctx.owner.aabb().bottom());
    ctx.events.effect(EffectKind::Shockwave, feet, 20);
}

/// Grows the shockwave one step. The live hit region is the ring swept this
/// tick, `[radius - speed, radius]`; once the max radius is reached the
/// wave is spent.
fn slam_tick(attack: &mut Attack, ctx: &mut AttackContext<'_>) {
    let VariantState::GroundSlam {
        speed,
        max_radius,
        radius,
        ..
    } = &mut attack.variant
    else {
        return;
    };
    if *radius >= *max_radius {
        attack.hitboxes.clear();
        return;
    }
    *radius = (*radius + *speed).min(*max_radius);
    attack.hitboxes = vec![Hitbox::Ring {
        center: ctx.owner.center(),
        inner: *radius - *speed,
        outer: *radius,
    }];
}

fn slam_knockback(attack: &Attack, origin: Vec2, target: Vec2) -> Option<Vec2> {
    let VariantState::GroundSlam { knockback, lift, .. } = attack.variant else {
        return None;
    };
    let offset = target - origin;
    let angle = offset.y.atan2(offset.x);
    Some(Vec2::new(angle.cos() * knockback, -lift))
}

/// Per-variant tuning table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttacksConfig {
    pub slash: AttackSpec,
    pub thrust: AttackSpec,
    pub aoe_circle: AttackSpec,
    pub aoe_cone: AttackSpec,
    pub charge: AttackSpec,
    pub ground_slam: AttackSpec,
    pub slash_thickness: f32,
    pub thrust_thickness: f32,
    pub cone_angle: f32,
    /// Smaller area shapes used inside combos
    pub combo_circle_radius: f32,
    pub combo_cone_angle: f32,
    pub combo_cone_range: f32,
    pub charge_speed: f32,
    pub charge_distance: f32,
    pub charge_stop_distance: f32,
    pub shockwave_speed: f32,
    pub shockwave_max_radius: f32,
    pub slam_knockback: f32,
    pub slam_lift: f32,
}

impl Default for AttacksConfig {
    fn default() -> Self {
        Self {
            slash: AttackSpec::new(20, 80.0, AttackTimings::new(1.0, 0.3, 0.2, 0.5)),
            thrust: AttackSpec::new(25, 120.0, AttackTimings::new(0.8, 0.2, 0.15, 0.4)),
            aoe_circle: AttackSpec::new(30, 100.0, AttackTimings::new(1.2, 0.4, 0.3, 0.6)),
            aoe_cone: AttackSpec::new(35, 120.0, AttackTimings::new(1.0, 0.3, 0.25, 0.5)),
            charge: AttackSpec::new(25, 150.0, AttackTimings::new(1.0, 0.3, 0.5, 0.4)),
            ground_slam: AttackSpec::new(30, 120.0, AttackTimings::new(1.2, 0.4, 0.3, 0.5)),
            slash_thickness: 40.0,
            thrust_thickness: 30.0,
            cone_angle: PI / 3.0,
            combo_circle_radius: 60.0,
            combo_cone_angle: PI / 4.0,
            combo_cone_range: 100.0,
            charge_speed: 8.0,
            charge_distance: 200.0,
            charge_stop_distance: 5.0,
            shockwave_speed: 8.0,
            shockwave_max_radius: 150.0,
            slam_knockback: 8.0,
            slam_lift: 6.0,
        }
    }
}

impl AttacksConfig {
    pub fn spec(&self, kind: AttackKind) -> &AttackSpec {
        match kind {
            AttackKind::Slash => &self.slash,
            AttackKind::Thrust => &self.thrust,
            AttackKind::AoeCircle => &self.aoe_circle,
            AttackKind::AoeCone => &self.aoe_cone,
            AttackKind::Charge => &self.charge,
            AttackKind::GroundSlam => &self.ground_slam,
        }
    }

    pub fn specs(&self) -> impl Iterator<Item = (AttackKind, &AttackSpec)> {
        AttackKind::ALL.into_iter().map(|k| (k, self.spec(k)))
    }

    /// Build an idle attack of `kind` for enemy `owner`.
    pub fn build(
        &self,
        kind: AttackKind,
        owner: EnemyId,
        scaling: ChapterScaling,
        setup: AttackSetup,
    ) -> Attack {
        let mut spec = *self.spec(kind);
        let variant = match kind {
            AttackKind::Slash => VariantState::Slash {
                direction: setup.slash,
                thickness: self.slash_thickness,
            },
            AttackKind::Thrust => VariantState::Thrust {
                thickness: self.thrust_thickness,
            },
            AttackKind::AoeCircle => {
                if setup.in_combo {
                    spec.range = self.combo_circle_radius;
                }
                VariantState::AoeCircle {
                    radius: spec.range,
                    telegraph_radius: 0.0,
                }
            }
            AttackKind::AoeCone => {
                let angle = if setup.in_combo {
                    spec.range = self.combo_cone_range;
                    self.combo_cone_angle
                } else {
                    self.cone_angle
                };
                VariantState::AoeCone {
                    angle,
                    telegraph_angle: 0.0,
                }
            }
            AttackKind::Charge => VariantState::Charge {
                direction: if setup.owner_x < setup.target_x {
                    1.0
                } else {
                    -1.0
                },
                speed: self.charge_speed,
                distance: self.charge_distance,
                stop_distance: self.charge_stop_distance,
                origin_x: setup.owner_x,
                moves: 0,
            },
            AttackKind::GroundSlam => VariantState::GroundSlam {
                speed: self.shockwave_speed,
                max_radius: self.shockwave_max_radius,
                radius: 0.0,
                knockback: self.slam_knockback,
                lift: self.slam_lift,
            },
        };
        Attack::new(kind, owner, spec, scaling, variant)
    }
}

/// Situation an attack is built in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttackSetup {
    /// Owner and target x (top-left), for the charge direction
    pub owner_x: f32,
    pub target_x: f32,
    pub in_combo: bool,
    pub slash: SlashDirection,
}
