//! End-to-end combat scenarios through the public API: attack timelines,
//! parry judging and the world's resolution order.

use bevy::math::Vec2;

use thorne_core::balance::{Chapter, ChapterScaling};
use thorne_core::combat::{
    Attack, AttackContext, AttackKind, AttackPhase, AttackSetup, AttacksConfig, Hitbox,
    ParryConfig, ParryResult, ParrySystem, VariantState,
};
use thorne_core::events::{GameEvent, Outbox};
use thorne_core::monster::{EnemyId, EnemyKind};
use thorne_core::physics::{Aabb, Body, Facing};
use thorne_core::player::PlayerInput;
use thorne_core::{CombatConfig, CombatWorld};

const DT: f32 = 1.0 / 60.0;

fn owner_body() -> Body {
    Body::new(Vec2::new(200.0, 300.0), Vec2::new(40.0, 40.0))
}

fn build(kind: AttackKind, scaling: ChapterScaling, setup: AttackSetup) -> Attack {
    AttacksConfig::default().build(kind, EnemyId(3), scaling, setup)
}

fn drive_to_execute(attack: &mut Attack, ctx: &mut AttackContext<'_>, step: f32) {
    attack.start(ctx);
    while attack.phase() != AttackPhase::Execute {
        attack.update(step, ctx);
    }
}

// ============================================================
// Attack timelines
// ============================================================

#[test]
fn test_chapter_one_slash_perfect_parry_at_execute_entry() {
    let scaling = CombatConfig::default().scaling.for_chapter(Chapter::FIRST);
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    let mut attack = build(AttackKind::Slash, scaling, AttackSetup::default());
    attack.start(&mut ctx);

    // 1.5 s scaled telegraph, then 0.3 s windup: EXECUTE begins at 1.8 s
    assert_eq!(attack.update(1.5, &mut ctx), Some(AttackPhase::Windup));
    assert_eq!(attack.update(0.3, &mut ctx), Some(AttackPhase::Execute));

    let player = Aabb::new(250.0, 295.0, 30.0, 50.0);
    let mut parry = ParrySystem::default();
    let mut outbox = Outbox::new();
    assert!(parry.attempt_parry(&mut outbox));
    let outcome = parry
        .check_parry_against_attack(&attack, &player, &mut outbox)
        .expect("slash in reach is intercepted");

    assert_eq!(outcome.result, ParryResult::Perfect);
    assert_eq!(outcome.frames, 0);
    assert_eq!(outcome.souls, 15);
    assert_eq!(outcome.damage_boost, Some((1.5, 3.0)));
    assert_eq!(parry.riposte_window(), 1.0);
    assert!(outbox
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::ParryResolved { result: ParryResult::Perfect, souls: 15 })));
}

#[test]
fn test_charge_moves_twenty_five_steps_and_hits_along_the_way() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let setup = AttackSetup {
        owner_x: 200.0,
        target_x: 500.0,
        ..Default::default()
    };
    let mut attack = build(AttackKind::Charge, ChapterScaling::IDENTITY, setup);
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    drive_to_execute(&mut attack, &mut ctx, 0.1);

    // A player standing 100 px down the charge lane
    let player = Aabb::new(300.0, 295.0, 30.0, 50.0);
    let mut hit_ticks = 0;
    while attack.phase() == AttackPhase::Execute {
        attack.update(DT, &mut ctx);
        if let [Hitbox::Rect(rect)] = attack.hitboxes() {
            assert_eq!(*rect, ctx.owner.aabb(), "hitbox rides on the owner");
        }
        if attack.check_player_hit(&player) {
            hit_ticks += 1;
        }
    }

    assert!(matches!(attack.variant(), VariantState::Charge { moves: 25, .. }));
    assert!((ctx.owner.position.x - 400.0).abs() < 1e-3);
    assert!(hit_ticks > 1, "contact persists while the owner passes through");
}

#[test]
fn test_charge_direction_ignores_later_player_movement() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let setup = AttackSetup {
        owner_x: 200.0,
        target_x: 50.0,
        ..Default::default()
    };
    let mut attack = build(AttackKind::Charge, ChapterScaling::IDENTITY, setup);
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    drive_to_execute(&mut attack, &mut ctx, 0.1);
    attack.update(DT, &mut ctx);
    assert!(ctx.owner.position.x < 200.0);
}

#[test]
fn test_ground_slam_ring_hits_only_when_it_sweeps_the_player() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut attack = build(AttackKind::GroundSlam, ChapterScaling::IDENTITY, AttackSetup::default());
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    drive_to_execute(&mut attack, &mut ctx, 0.1);

    // Owner center is (220, 320); player center is exactly 100 px away
    let player = Aabb::new(305.0, 295.0, 30.0, 50.0);
    let mut hits = Vec::new();
    for tick in 1..=16 {
        attack.update(DT, &mut ctx);
        if attack.check_player_hit(&player) {
            hits.push(tick);
        }
    }
    assert_eq!(hits, vec![13], "ring [96, 104] is the only one containing 100");
}

#[test]
fn test_ground_slam_radius_clips_at_max() {
    let mut config = AttacksConfig::default();
    config.ground_slam.timings.execute = 1.0;
    let mut attack = config.build(
        AttackKind::GroundSlam,
        EnemyId(3),
        ChapterScaling::IDENTITY,
        AttackSetup::default(),
    );
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    drive_to_execute(&mut attack, &mut ctx, 0.1);
    for _ in 0..19 {
        attack.update(DT, &mut ctx);
    }
    assert!(matches!(attack.variant(), VariantState::GroundSlam { radius, .. } if *radius == 150.0));
    assert_eq!(
        attack.hitboxes(),
        &[Hitbox::Ring {
            center: Vec2::new(220.0, 320.0),
            inner: 142.0,
            outer: 150.0,
        }]
    );

    attack.update(DT, &mut ctx);
    assert!(attack.hitboxes().is_empty(), "spent wave has no hit region");
}

#[test]
fn test_zero_delta_changes_nothing() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    let mut attack = build(AttackKind::AoeCircle, ChapterScaling::IDENTITY, AttackSetup::default());
    attack.start(&mut ctx);
    attack.update(0.4, &mut ctx);
    let before = (attack.phase(), attack.state_timer(), attack.variant().clone());
    assert_eq!(attack.update(0.0, &mut ctx), None);
    assert_eq!(attack.update(-1.0, &mut ctx), None);
    assert_eq!((attack.phase(), attack.state_timer(), attack.variant().clone()), before);

    let mut parry = ParrySystem::default();
    let mut outbox = Outbox::new();
    parry.attempt_parry(&mut outbox);
    parry.update(0.05, &mut outbox);
    let frame = parry.current_frame();
    parry.update(0.0, &mut outbox);
    assert_eq!(parry.current_frame(), frame);
}

// ============================================================
// Parry rules
// ============================================================

#[test]
fn test_window_tables_consistent_and_staggers_ordered() {
    let config = ParryConfig::default();
    for chapter in Chapter::all() {
        let window = config.window(chapter);
        assert!(window.perfect <= window.good && window.good <= window.total, "{chapter}");
    }
    assert!(config.perfect.stagger > config.good.stagger);
}

#[test]
fn test_failed_parry_blocks_but_leaves_player_exposed() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    let mut attack = build(AttackKind::Slash, ChapterScaling::IDENTITY, AttackSetup::default());
    drive_to_execute(&mut attack, &mut ctx, 0.1);

    let player = Aabb::new(250.0, 295.0, 30.0, 50.0);
    let mut parry = ParrySystem::default();
    let mut outbox = Outbox::new();
    parry.attempt_parry(&mut outbox);
    // 14 frames in, past the chapter 1 good window of 12
    for _ in 0..14 {
        parry.update(DT, &mut outbox);
    }
    let outcome = parry
        .check_parry_against_attack(&attack, &player, &mut outbox)
        .expect("late parry still intercepts");
    assert_eq!(outcome.result, ParryResult::Failed);
    assert_eq!(outcome.vulnerability, 0.5);
    assert_eq!(outcome.souls, 0);
    assert!(!parry.can_riposte());
    assert_eq!(parry.streak(), 0);
}

#[test]
fn test_riposte_bonus_is_taken_once() {
    let mut body = owner_body();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Right,
        events: &mut events,
    };
    let mut attack = build(AttackKind::Thrust, ChapterScaling::IDENTITY, AttackSetup::default());
    drive_to_execute(&mut attack, &mut ctx, 0.1);

    let player = Aabb::new(250.0, 295.0, 30.0, 50.0);
    let mut parry = ParrySystem::default();
    let mut outbox = Outbox::new();
    parry.attempt_parry(&mut outbox);
    parry.check_parry_against_attack(&attack, &player, &mut outbox);
    assert!(parry.consume_riposte().is_some());
    assert!(parry.consume_riposte().is_none());
}

// ============================================================
// World resolution
// ============================================================

/// World with the player standing on the ground at x = 100 and the
/// starting roster moved out of reach.
fn settled_world() -> CombatWorld {
    let mut world = CombatWorld::default();
    for _ in 0..60 {
        world.tick(DT, &PlayerInput::default());
    }
    for enemy in world.enemies_mut() {
        enemy.body.position.x = 700.0;
    }
    world.drain_events();
    world
}

/// Put an enemy right of the player, facing it, with `kind` already in
/// EXECUTE.
fn adjacent_attacker(world: &mut CombatWorld, kind: AttackKind) -> EnemyId {
    let player = world.player().body.aabb();
    let id = world.spawn_enemy(EnemyKind::Basic, Vec2::new(player.right() + 10.0, 380.0));
    let scaling = world.config().scaling.for_chapter(world.chapter());
    let enemy = world.enemy_mut(id).expect("just spawned");
    enemy.facing = Facing::Left;

    let mut body = enemy.body.clone();
    let mut events = Outbox::new();
    let mut ctx = AttackContext {
        owner: &mut body,
        facing: Facing::Left,
        events: &mut events,
    };
    let mut attack = AttacksConfig::default().build(kind, id, scaling, AttackSetup::default());
    drive_to_execute(&mut attack, &mut ctx, 0.1);
    enemy.attack = Some(attack);
    id
}

#[test]
fn test_world_parry_then_riposte_kills() {
    let mut world = settled_world();
    let id = adjacent_attacker(&mut world, AttackKind::Slash);

    world.tick(
        DT,
        &PlayerInput {
            parry: true,
            ..Default::default()
        },
    );
    assert_eq!(world.player().health, 100, "intercepted before damage");
    assert_eq!(world.session().souls, 15);
    let enemy = world.enemy(id).expect("still alive");
    assert!(enemy.is_staggered());
    assert!(enemy.attack.as_ref().is_some_and(|a| a.is_deflected()));
    assert!(world.player().parry.can_riposte());

    world.player_mut().facing = Facing::Right;
    world.tick(
        DT,
        &PlayerInput {
            attack: true,
            ..Default::default()
        },
    );
    // 10 base × 1.5 boost × 2 riposte
    let events = world.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::EnemyDamaged { enemy, amount: 30, riposte: true } if *enemy == id
    )));
    assert!(world.enemy(id).is_none());
    assert_eq!(world.session().souls, 25);
    assert!(!world.player().parry.can_riposte());
}

#[test]
fn test_world_unparryable_attack_lands_through_parry() {
    let mut world = settled_world();
    adjacent_attacker(&mut world, AttackKind::AoeCircle);

    world.tick(
        DT,
        &PlayerInput {
            parry: true,
            ..Default::default()
        },
    );
    assert_eq!(world.player().health, 70);
    assert!(world.player().parry.is_active(), "nothing intercepted");
    assert_eq!(world.session().souls, 0);
}

#[test]
fn test_world_attack_lands_once() {
    let mut world = settled_world();
    let id = adjacent_attacker(&mut world, AttackKind::Slash);
    world.player_mut().invincibility = 0.0;

    world.tick(DT, &PlayerInput::default());
    assert_eq!(world.player().health, 80);
    assert!(world
        .enemy(id)
        .and_then(|e| e.attack.as_ref())
        .is_some_and(|a| a.has_landed()));

    world.player_mut().invincibility = 0.0;
    world.tick(DT, &PlayerInput::default());
    assert_eq!(world.player().health, 80);
}
