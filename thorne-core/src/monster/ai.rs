//! Enemy decision making.
//!
//! Each tick an enemy advances its attack, steps its combo, patrols and
//! decides whether to start a new attack. Randomness is injected so combo
//! rolls and attack picks are reproducible under a seeded generator.

use rand::Rng;

use super::Enemy;
use crate::balance::{Chapter, ChapterScaling};
use crate::combat::{
    AttackContext, AttackKind, AttackSetup, AttacksConfig, ComboConfig, ComboSequence,
    SlashDirection,
};
use crate::constants::REFERENCE_FPS;
use crate::events::Outbox;
use crate::monster::EnemiesConfig;
use crate::physics::{Facing, Platform};
use crate::tutorial::TutorialTag;

/// Read-only inputs shared by every enemy for one tick
pub struct AiParams<'a> {
    pub chapter: Chapter,
    pub scaling: ChapterScaling,
    pub attacks: &'a AttacksConfig,
    pub combo: &'a ComboConfig,
    pub enemies: &'a EnemiesConfig,
    pub platforms: &'a [Platform],
    pub canvas_width: f32,
}

/// What an enemy chose to do this tick
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Wait,
    Single(AttackKind),
    Combo(ComboSequence),
}

/// Advance timers and the in-flight attack of `enemy`, then patrol and
/// decide. `player_x` is the player's left edge.
pub fn update_enemy<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    dt: f32,
    player_x: f32,
    params: &AiParams<'_>,
    events: &mut Outbox,
    rng: &mut R,
) {
    let dt = dt.max(0.0);
    tick_timers(enemy, dt);
    // The combo gap starts counting on the tick after an attack ends and
    // holds while staggered
    if !advance_attack(enemy, dt, events) && !enemy.is_staggered() {
        step_combo(enemy, dt, player_x, params, events);
    }

    if enemy.is_staggered() {
        enemy.body.velocity.x = 0.0;
        return;
    }
    patrol(enemy, dt, params, rng);

    match decide(enemy, player_x, params, rng) {
        Decision::Wait => {}
        Decision::Single(kind) => {
            begin_attack(enemy, kind, false, player_x, params, events);
        }
        Decision::Combo(mut combo) => {
            events.tutorial(TutorialTag::Combo);
            tracing::debug!(target: "thorne_core::monster", enemy = %enemy.id, attacks = ?combo.attacks(), "combo start");
            if let Some(kind) = combo.next_attack() {
                enemy.combo = Some(combo);
                begin_attack(enemy, kind, true, player_x, params, events);
            }
        }
    }
}

fn tick_timers(enemy: &mut Enemy, dt: f32) {
    if enemy.stagger > 0.0 {
        enemy.stagger = (enemy.stagger - dt).max(0.0);
    }
    if let Some(since) = &mut enemy.since_attack {
        *since += dt;
    }
    enemy.contact_cooldown = (enemy.contact_cooldown - dt).max(0.0);
}

/// Returns true when the attack finished on this tick.
fn advance_attack(enemy: &mut Enemy, dt: f32, events: &mut Outbox) -> bool {
    let Some(attack) = enemy.attack.as_mut() else {
        return false;
    };
    let mut ctx = AttackContext {
        owner: &mut enemy.body,
        facing: enemy.facing,
        events,
    };
    attack.update(dt, &mut ctx);
    if attack.is_finished() {
        enemy.attack = None;
        return true;
    }
    false
}

/// Start the next combo attack once the previous one is done and the gap
/// has passed; drop the combo after its last gap.
fn step_combo(enemy: &mut Enemy, dt: f32, player_x: f32, params: &AiParams<'_>, events: &mut Outbox) {
    if enemy.attack.is_some() {
        return;
    }
    let Some(combo) = enemy.combo.as_mut() else {
        return;
    };
    if !combo.tick_gap(dt, params.combo.gap) {
        return;
    }
    match combo.next_attack() {
        Some(kind) => begin_attack(enemy, kind, true, player_x, params, events),
        None => enemy.combo = None,
    }
}

/// Walk in the facing direction, turning at the canvas edges and, when
/// configured, at random or at ledges. Rooted while an attack is in flight.
fn patrol<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, params: &AiParams<'_>, rng: &mut R) {
    if enemy.attack.is_some() {
        enemy.body.velocity.x = 0.0;
        return;
    }
    let chance = params.enemies.patrol_turn_chance;
    if chance > 0.0 && dt > 0.0 {
        let frames = f64::from(dt * REFERENCE_FPS);
        if rng.gen::<f64>() < (chance * frames).min(1.0) {
            enemy.facing = turned(enemy.facing);
        }
    }
    if let Some(margin) = params.enemies.patrol_edge_margin {
        turn_at_ledge(enemy, margin, params.platforms);
    }
    let aabb = enemy.body.aabb();
    if aabb.x <= 0.0 {
        enemy.facing = Facing::Right;
    } else if aabb.right() >= params.canvas_width {
        enemy.facing = Facing::Left;
    }
    enemy.body.velocity.x = enemy.patrol_velocity(params.scaling.speed);
}

fn turn_at_ledge(enemy: &mut Enemy, margin: f32, platforms: &[Platform]) {
    let aabb = enemy.body.aabb();
    let ground = platforms.iter().map(|p| &p.bounds).find(|b| {
        aabb.right() > b.x && aabb.x < b.right() && (aabb.bottom() - b.y).abs() < 0.5
    });
    let Some(ground) = ground else {
        return;
    };
    match enemy.facing {
        Facing::Right if aabb.right() + margin > ground.right() => enemy.facing = Facing::Left,
        Facing::Left if aabb.x - margin < ground.x => enemy.facing = Facing::Right,
        _ => {}
    }
}

fn turned(facing: Facing) -> Facing {
    match facing {
        Facing::Left => Facing::Right,
        Facing::Right => Facing::Left,
    }
}

/// Attack decision: close enough, nothing in flight, no combo running and
/// the cooldown has passed.
pub fn decide<R: Rng + ?Sized>(
    enemy: &Enemy,
    player_x: f32,
    params: &AiParams<'_>,
    rng: &mut R,
) -> Decision {
    let distance = (enemy.body.position.x - player_x).abs();
    let cooldown = attack_cooldown(enemy, params.enemies);
    let ready = enemy.since_attack.map_or(true, |since| since >= cooldown);
    if distance >= params.enemies.trigger_distance
        || enemy.attack.is_some()
        || enemy.in_combo()
        || !ready
        || enemy.pool.is_empty()
    {
        return Decision::Wait;
    }

    let combo = match &enemy.boss {
        Some(boss) if boss.always_combo() => true,
        _ => params.combo.roll(params.chapter, rng),
    };
    if combo {
        let sequence = ComboSequence::random(&enemy.pool, params.combo, rng);
        if !sequence.is_empty() {
            return Decision::Combo(sequence);
        }
    }
    Decision::Single(enemy.pool[rng.gen_range(0..enemy.pool.len())])
}

fn attack_cooldown(enemy: &Enemy, config: &EnemiesConfig) -> f32 {
    enemy
        .boss
        .as_ref()
        .map_or(config.attack_cooldown, |boss| boss.attack_cooldown())
}

/// Build and start an attack of `kind` owned by `enemy`.
fn begin_attack(
    enemy: &mut Enemy,
    kind: AttackKind,
    in_combo: bool,
    player_x: f32,
    params: &AiParams<'_>,
    events: &mut Outbox,
) {
    if enemy.since_attack.is_none() {
        events.tutorial(TutorialTag::Parry);
    }
    enemy.since_attack = Some(0.0);

    let slash = enemy
        .boss
        .as_ref()
        .map_or(SlashDirection::Horizontal, |boss| boss.slash_direction());
    let setup = AttackSetup {
        owner_x: enemy.body.position.x,
        target_x: player_x,
        in_combo,
        slash,
    };
    let mut attack = params.attacks.build(kind, enemy.id, params.scaling, setup);
    enemy.facing = if player_x < enemy.body.position.x {
        Facing::Left
    } else {
        Facing::Right
    };
    enemy.body.velocity.x = 0.0;
    let mut ctx = AttackContext {
        owner: &mut enemy.body,
        facing: enemy.facing,
        events,
    };
    if attack.start(&mut ctx) {
        enemy.attack = Some(attack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::AttackPhase;
    use crate::monster::{EnemyId, EnemyKind};
    use crate::physics::{Aabb, PlatformId};
    use bevy::math::Vec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        attacks: AttacksConfig,
        combo: ComboConfig,
        enemies: EnemiesConfig,
        platforms: Vec<Platform>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                attacks: AttacksConfig::default(),
                combo: ComboConfig::default(),
                enemies: EnemiesConfig::default(),
                platforms: Vec::new(),
            }
        }

        fn params(&self, chapter: Chapter) -> AiParams<'_> {
            AiParams {
                chapter,
                scaling: ChapterScaling::IDENTITY,
                attacks: &self.attacks,
                combo: &self.combo,
                enemies: &self.enemies,
                platforms: &self.platforms,
                canvas_width: 800.0,
            }
        }
    }

    fn enemy_at(x: f32, chapter: Chapter) -> Enemy {
        Enemy::new(
            EnemyId(3),
            EnemyKind::Basic,
            Vec2::new(x, 320.0),
            &EnemiesConfig::default(),
            chapter,
        )
    }

    #[test]
    fn test_triggers_when_close() {
        let fixture = Fixture::new();
        let params = fixture.params(Chapter::FIRST);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut events = Outbox::new();

        let mut far = enemy_at(300.0, Chapter::FIRST);
        update_enemy(&mut far, DT, 100.0, &params, &mut events, &mut rng);
        assert!(far.attack.is_none());

        let mut near = enemy_at(200.0, Chapter::FIRST);
        update_enemy(&mut near, DT, 100.0, &params, &mut events, &mut rng);
        let attack = near.attack.as_ref().unwrap();
        assert_eq!(attack.kind(), AttackKind::Slash);
        assert_eq!(attack.phase(), AttackPhase::Telegraph);
        assert_eq!(attack.owner(), EnemyId(3));
        assert_eq!(near.facing, Facing::Left, "turns to face the player");
        assert!(events.tutorials().has_shown(TutorialTag::Parry));
    }

    #[test]
    fn test_cooldown_between_attacks() {
        let mut fixture = Fixture::new();
        fixture.enemies.attack_cooldown = 3.0;
        let params = fixture.params(Chapter::FIRST);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(150.0, Chapter::FIRST);

        update_enemy(&mut enemy, DT, 100.0, &params, &mut events, &mut rng);
        assert!(enemy.attack.is_some());
        // Slash at identity scaling runs 2.0 s in total
        for _ in 0..5 {
            update_enemy(&mut enemy, 0.5, 100.0, &params, &mut events, &mut rng);
        }
        assert!(enemy.attack.is_none());
        assert_eq!(enemy.since_attack, Some(2.5));
        update_enemy(&mut enemy, 0.5, 100.0, &params, &mut events, &mut rng);
        assert!(enemy.attack.is_some());
    }

    #[test]
    fn test_rooted_while_attacking() {
        let fixture = Fixture::new();
        let params = fixture.params(Chapter::FIRST);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(150.0, Chapter::FIRST);
        update_enemy(&mut enemy, DT, 100.0, &params, &mut events, &mut rng);
        update_enemy(&mut enemy, DT, 100.0, &params, &mut events, &mut rng);
        assert_eq!(enemy.body.velocity.x, 0.0);
    }

    #[test]
    fn test_stagger_blocks_then_restores_patrol() {
        let fixture = Fixture::new();
        let params = fixture.params(Chapter::FIRST);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(500.0, Chapter::FIRST);
        enemy.stagger(1.0, &mut events);
        update_enemy(&mut enemy, 0.5, 480.0, &params, &mut events, &mut rng);
        assert_eq!(enemy.body.velocity.x, 0.0);
        assert!(enemy.attack.is_none(), "no decisions while staggered");
        update_enemy(&mut enemy, 0.5, 100.0, &params, &mut events, &mut rng);
        assert!(!enemy.is_staggered());
        assert_eq!(enemy.body.velocity.x, 1.0);
    }

    #[test]
    fn test_turns_at_canvas_edge() {
        let fixture = Fixture::new();
        let params = fixture.params(Chapter::FIRST);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(760.0, Chapter::FIRST);
        update_enemy(&mut enemy, DT, 0.0, &params, &mut events, &mut rng);
        assert_eq!(enemy.facing, Facing::Left);
        assert_eq!(enemy.body.velocity.x, -1.0);
    }

    #[test]
    fn test_turns_before_platform_edge() {
        let mut fixture = Fixture::new();
        fixture.platforms = vec![Platform::new(PlatformId(0), Aabb::new(200.0, 300.0, 200.0, 20.0))];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut events = Outbox::new();

        // Right edge of the body 4 px short of the platform's right end
        let mut enemy = enemy_at(356.0, Chapter::FIRST);
        enemy.body.position.y = 260.0;
        enemy.facing = Facing::Right;
        update_enemy(&mut enemy, DT, 0.0, &fixture.params(Chapter::FIRST), &mut events, &mut rng);
        assert_eq!(enemy.facing, Facing::Right, "walks off ledges by default");

        fixture.enemies.patrol_edge_margin = Some(5.0);
        update_enemy(&mut enemy, DT, 0.0, &fixture.params(Chapter::FIRST), &mut events, &mut rng);
        assert_eq!(enemy.facing, Facing::Left);
        assert_eq!(enemy.body.velocity.x, -1.0);

        // Mid-platform keeps walking
        let mut middle = enemy_at(280.0, Chapter::FIRST);
        middle.body.position.y = 260.0;
        middle.facing = Facing::Right;
        update_enemy(&mut middle, DT, 0.0, &fixture.params(Chapter::FIRST), &mut events, &mut rng);
        assert_eq!(middle.facing, Facing::Right);
    }

    #[test]
    fn test_no_combo_before_chapter_four() {
        let mut fixture = Fixture::new();
        fixture.combo.chance = 1.0;
        let params = fixture.params(Chapter::or_first(3));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        let enemy = enemy_at(150.0, Chapter::or_first(3));
        for _ in 0..50 {
            assert!(matches!(
                decide(&enemy, 100.0, &params, &mut rng),
                Decision::Single(_)
            ));
        }
    }

    #[test]
    fn test_combo_runs_with_gaps() {
        let mut fixture = Fixture::new();
        fixture.combo.chance = 1.0;
        fixture.combo.min_length = 2;
        fixture.combo.max_length = 2;
        fixture.enemies.attack_cooldown = 10.0;
        let params = fixture.params(Chapter::or_first(4));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(150.0, Chapter::or_first(4));
        enemy.pool = vec![AttackKind::Slash];

        update_enemy(&mut enemy, DT, 100.0, &params, &mut events, &mut rng);
        assert!(enemy.in_combo());
        assert!(events.tutorials().has_shown(TutorialTag::Combo));
        assert_eq!(enemy.combo.as_ref().map(ComboSequence::index), Some(1));

        // First slash: 1.0 + 0.3 + 0.2 + 0.5 with one transition per update
        for step in [1.0, 0.3, 0.2, 0.5] {
            update_enemy(&mut enemy, step, 100.0, &params, &mut events, &mut rng);
        }
        assert!(enemy.attack.is_none(), "waiting out the gap");
        assert!(enemy.in_combo());
        update_enemy(&mut enemy, 0.3, 100.0, &params, &mut events, &mut rng);
        assert!(enemy.attack.is_some(), "second attack after the gap");
        assert_eq!(enemy.combo.as_ref().map(ComboSequence::index), Some(2));

        for step in [1.0, 0.3, 0.2, 0.5] {
            update_enemy(&mut enemy, step, 100.0, &params, &mut events, &mut rng);
        }
        update_enemy(&mut enemy, 0.3, 100.0, &params, &mut events, &mut rng);
        assert!(!enemy.in_combo(), "dropped after the last gap");
    }

    #[test]
    fn test_stagger_holds_combo_gap() {
        let mut fixture = Fixture::new();
        fixture.combo.chance = 1.0;
        fixture.combo.min_length = 2;
        fixture.combo.max_length = 2;
        fixture.enemies.attack_cooldown = 10.0;
        let params = fixture.params(Chapter::or_first(4));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        let mut events = Outbox::new();
        let mut enemy = enemy_at(150.0, Chapter::or_first(4));
        enemy.pool = vec![AttackKind::Slash];

        update_enemy(&mut enemy, DT, 100.0, &params, &mut events, &mut rng);
        for step in [1.0, 0.3] {
            update_enemy(&mut enemy, step, 100.0, &params, &mut events, &mut rng);
        }
        assert_eq!(enemy.attack.as_ref().map(|a| a.phase()), Some(AttackPhase::Execute));

        // Perfect-parry stagger lands mid-swing
        enemy.stagger(1.5, &mut events);
        for step in [0.2, 0.5, 0.3] {
            update_enemy(&mut enemy, step, 100.0, &params, &mut events, &mut rng);
        }
        assert!(enemy.is_staggered());
        assert!(enemy.attack.is_none(), "no combo attack while staggered");
        assert_eq!(enemy.combo.as_ref().map(ComboSequence::index), Some(1));

        update_enemy(&mut enemy, 0.5, 100.0, &params, &mut events, &mut rng);
        assert!(!enemy.is_staggered());
        assert!(enemy.attack.is_some(), "combo resumes once the stagger ends");
        assert_eq!(enemy.combo.as_ref().map(ComboSequence::index), Some(2));
    }
}
