//! Explicit world state and the fixed per-tick update order.
//!
//! Every subsystem receives the parts of [`CombatWorld`] it needs by
//! reference; nothing is ambient. One tick runs, in order:
//!
//! 1. parry timers, player timers and input
//! 2. entity physics (player, enemies)
//! 3. enemy AI and attack state machines
//! 4. parry intercepts, then unblocked attack hits
//! 5. collisions: player swing, contact damage
//! 6. bookkeeping: deaths, boss phases, chapter progression, roster,
//!    terminal states
//!
//! An attack that reaches EXECUTE and a parry that is ACTIVE on the same
//! tick are therefore always compared before any damage lands.

use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::balance::Chapter;
use crate::combat::{ParryOutcome, ParryResult};
use crate::config::{CombatConfig, ConfigError};
use crate::constants::MAX_FRAME_DELTA;
use crate::events::{DamageSource, EffectKind, GameEvent, Outbox, SoundKind};
use crate::gameflow::{unlock_message, Session};
use crate::monster::ai::{self, AiParams};
use crate::monster::boss::{self, BossKind, BossManager, Scene};
use crate::monster::{Enemy, EnemyId, EnemyKind};
use crate::physics::{resolve_platforms, Platform, PlatformId, Resolution};
use crate::player::{Player, PlayerInput};
use crate::visualization::DebugSnapshot;

/// Clamp a host frame delta into `[0, MAX_FRAME_DELTA]`. NaN and negative
/// deltas become zero.
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_nan() || dt < 0.0 {
        tracing::warn!(target: "thorne_core::world", dt, "invalid frame delta, treated as zero");
        return 0.0;
    }
    dt.min(MAX_FRAME_DELTA)
}

pub struct CombatWorld {
    config: CombatConfig,
    player: Player,
    enemies: Vec<Enemy>,
    platforms: Vec<Platform>,
    session: Session,
    bosses: BossManager,
    events: Outbox,
    rng: Xoshiro256PlusPlus,
    next_enemy: u32,
    next_platform: u32,
    ticks: u64,
}

impl Default for CombatWorld {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatWorld {
    /// Build a world from an already validated config.
    pub fn new(config: CombatConfig) -> Self {
        let mut world = Self {
            player: new_player(&config),
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            config,
            enemies: Vec::new(),
            platforms: Vec::new(),
            session: Session::new(),
            bosses: BossManager::new(),
            events: Outbox::new(),
            next_enemy: 0,
            next_platform: 0,
            ticks: 0,
        };
        world.populate();
        world
    }

    /// Validate `config`, then build.
    pub fn try_new(config: CombatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    fn populate(&mut self) {
        let level = self.config.physics.platforms.clone();
        for bounds in level {
            let id = self.allocate_platform();
            self.platforms.push(Platform::new(id, bounds));
        }
        let spawns = self.config.enemies.spawns.clone();
        for (kind, position) in spawns {
            self.spawn_enemy(kind, position);
        }
    }

    /// Back to chapter 1 with a fresh player, roster and level. Tutorial
    /// prompts already shown stay shown.
    pub fn reset(&mut self) {
        self.events.drain();
        self.player = new_player(&self.config);
        self.enemies.clear();
        self.platforms.clear();
        self.session = Session::new();
        self.bosses = BossManager::new();
        self.rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);
        self.ticks = 0;
        self.populate();
        tracing::info!(target: "thorne_core::world", "world reset");
    }

    fn allocate_platform(&mut self) -> PlatformId {
        let id = PlatformId(self.next_platform);
        self.next_platform += 1;
        id
    }

    fn allocate_enemy(&mut self) -> EnemyId {
        let id = EnemyId(self.next_enemy);
        self.next_enemy += 1;
        id
    }

    /// Add an ordinary enemy using the current chapter's attack pool.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2) -> EnemyId {
        let id = self.allocate_enemy();
        let enemy = Enemy::new(id, kind, position, &self.config.enemies, self.session.chapter());
        self.enemies.push(enemy);
        id
    }

    /// Start a boss encounter. Any boss already present is retired first.
    pub fn spawn_boss(&mut self, kind: BossKind, position: Vec2) -> EnemyId {
        let id = self.allocate_enemy();
        let ids = [
            self.allocate_platform(),
            self.allocate_platform(),
            self.allocate_platform(),
        ];
        let walls = self.config.bosses.arena_walls(ids);
        let enemy = boss::spawn(id, kind, position, self.config.bosses.profile(kind));
        let mut scene = Scene {
            enemies: &mut self.enemies,
            platforms: &mut self.platforms,
            events: &mut self.events,
        };
        self.bosses.spawn_boss(enemy, walls, &mut scene);
        id
    }

    /// Advance the simulation by `dt` seconds of host time.
    pub fn tick(&mut self, dt: f32, input: &PlayerInput) {
        if !self.session.is_playing() {
            return;
        }
        let dt = clamp_delta(dt);
        self.ticks += 1;

        self.update_player(dt, input);
        if dt > 0.0 {
            self.step_physics(dt);
        }
        self.update_enemies(dt);
        self.resolve_attacks();
        self.resolve_swing();
        self.resolve_contact();
        self.bookkeeping();
    }

    fn update_player(&mut self, dt: f32, input: &PlayerInput) {
        if let Some(missed) = self.player.parry.update(dt, &mut self.events) {
            self.player.apply_parry_outcome(&missed);
        }
        self.player.tick_timers(dt, &mut self.events);
        self.player.apply_input(input, dt, &mut self.events);

        for (_, damage) in self.player.afflictions.tick(dt, &self.config.afflictions) {
            self.player.take_affliction_damage(damage, &mut self.events);
        }
    }

    fn step_physics(&mut self, dt: f32) {
        let physics = &self.config.physics;

        let previous = self.player.body.integrate(dt, physics.gravity);
        resolve_platforms(&mut self.player.body, previous, &self.platforms, Resolution::TopOnly);
        self.player.body.clamp_horizontal(physics.canvas_width);
        if self.player.body.position.y > physics.canvas_height {
            let damage = self.player.config().fall_damage;
            self.player.take_damage(damage, DamageSource::Fall, &mut self.events);
            self.player.respawn();
            tracing::debug!(target: "thorne_core::world", "player fell, respawned");
        }

        for enemy in &mut self.enemies {
            let previous = enemy.body.integrate(dt, physics.gravity);
            resolve_platforms(&mut enemy.body, previous, &self.platforms, Resolution::AllSides);
            enemy.body.clamp_horizontal(physics.canvas_width);
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let chapter = self.session.chapter();
        let params = AiParams {
            chapter,
            scaling: self.config.scaling.for_chapter(chapter),
            attacks: &self.config.attacks,
            combo: &self.config.combo,
            enemies: &self.config.enemies,
            platforms: &self.platforms,
            canvas_width: self.config.physics.canvas_width,
        };
        let player_x = self.player.body.position.x;
        for enemy in &mut self.enemies {
            ai::update_enemy(enemy, dt, player_x, &params, &mut self.events, &mut self.rng);
        }
    }

    /// Parry intercepts first; whatever is not intercepted may land.
    fn resolve_attacks(&mut self) {
        let player_box = self.player.body.aabb();
        let player_center = self.player.body.center();

        for enemy in &mut self.enemies {
            let owner_center = enemy.body.center();
            let affliction = enemy.boss.as_ref().map(|state| state.affliction());
            let Some(attack) = enemy.attack.as_mut() else {
                continue;
            };

            if let Some(outcome) =
                self.player
                    .parry
                    .check_parry_against_attack(attack, &player_box, &mut self.events)
            {
                attack.deflect();
                self.player.apply_parry_outcome(&outcome);
                self.session.add_souls(outcome.souls);
                parry_effect(&outcome, player_center, &mut self.events);
                if outcome.stagger > 0.0 {
                    enemy.stagger(outcome.stagger, &mut self.events);
                }
                continue;
            }

            if !attack.check_player_hit(&player_box) {
                continue;
            }
            let kind = attack.kind();
            let damage = attack.scaled_damage();
            let push = attack.knockback(owner_center, player_center);
            if self
                .player
                .take_damage(damage, DamageSource::Attack(kind), &mut self.events)
            {
                attack.register_hit();
                if let Some(push) = push {
                    self.player.apply_knockback(push);
                }
                if let Some((affliction, stacks)) = affliction {
                    self.player
                        .afflictions
                        .apply(affliction, stacks, &self.config.afflictions);
                }
            }
        }
    }

    /// The player's swing against every enemy it overlaps, once each.
    fn resolve_swing(&mut self) {
        let Some(swing_box) = self.player.attack_box() else {
            return;
        };
        let player_center = self.player.body.center();
        let knockback = self.config.enemies.hit_knockback;

        for enemy in &mut self.enemies {
            if enemy.is_dead() || !enemy.body.aabb().overlaps(&swing_box) {
                continue;
            }
            let Some(hit) = self.player.land_swing(enemy.id) else {
                continue;
            };
            enemy.take_damage(hit.damage, &mut self.events);
            self.events.push(GameEvent::EnemyDamaged {
                enemy: enemy.id,
                amount: hit.damage,
                riposte: hit.riposte.is_some(),
            });
            if let Some(riposte) = hit.riposte {
                enemy.stagger(riposte.stagger, &mut self.events);
                self.events.sound(SoundKind::Riposte);
                self.events.effect(EffectKind::Riposte, enemy.body.center(), 15);
            }
            let away = if enemy.body.center().x < player_center.x {
                -1.0
            } else {
                1.0
            };
            enemy.body.velocity.x += away * knockback.x;
            enemy.body.velocity.y = enemy.body.velocity.y.min(knockback.y);
        }
    }

    fn resolve_contact(&mut self) {
        let player_box = self.player.body.aabb();
        let cooldown = self.config.enemies.contact_cooldown;
        for enemy in &mut self.enemies {
            if enemy.is_dead()
                || enemy.contact_damage <= 0
                || enemy.contact_cooldown > 0.0
                || !enemy.body.aabb().overlaps(&player_box)
            {
                continue;
            }
            if self
                .player
                .take_damage(enemy.contact_damage, DamageSource::Contact, &mut self.events)
            {
                enemy.contact_cooldown = cooldown;
            }
        }
    }

    fn bookkeeping(&mut self) {
        self.collect_defeated();

        let mut scene = Scene {
            enemies: &mut self.enemies,
            platforms: &mut self.platforms,
            events: &mut self.events,
        };
        self.bosses.update(&mut scene);

        let rate = self.player.parry.success_rate();
        if let Some(chapter) = self
            .session
            .try_advance(rate, &self.config.progression, &mut self.events)
        {
            self.enter_chapter(chapter);
        }

        if self.enemies.is_empty() {
            if self.session.chapter() == Chapter::LAST {
                self.session.victory(&mut self.events);
            } else {
                self.top_up_roster();
            }
        }

        if self.player.is_dead() {
            self.session.game_over(&mut self.events);
        }
    }

    /// Remove dead enemies, paying out their souls. A removed enemy's
    /// attack goes with it.
    fn collect_defeated(&mut self) {
        let mut index = 0;
        while index < self.enemies.len() {
            if !self.enemies[index].is_dead() {
                index += 1;
                continue;
            }
            let enemy = self.enemies.swap_remove(index);
            self.session.record_defeat(enemy.souls);
            self.events
                .effect(EffectKind::EnemyDeath, enemy.body.center(), 20);
            self.events.push(GameEvent::EnemyDefeated {
                enemy: enemy.id,
                souls: enemy.souls,
            });
            tracing::debug!(target: "thorne_core::world", enemy = %enemy.id, souls = enemy.souls, "enemy defeated");
        }
    }

    fn enter_chapter(&mut self, chapter: Chapter) {
        self.player.parry.set_chapter(chapter);
        for enemy in &mut self.enemies {
            enemy.refresh_pool(chapter);
        }
        self.top_up_roster();
        if let Some(message) = unlock_message(chapter) {
            tracing::info!(target: "thorne_core::world", %chapter, message);
        }
    }

    /// Fill the roster up to the chapter's size with basic enemies.
    fn top_up_roster(&mut self) {
        let chapter = self.session.chapter();
        let target = self.config.progression.roster_size(chapter);
        let size = self.config.enemies.size;
        let max_x = (self.config.physics.canvas_width - size.x).max(0.0);
        while self.enemies.len() < target {
            let x = 200.0 + self.enemies.len() as f32 * 150.0 + self.rng.gen::<f32>() * 100.0;
            let y = 300.0 + self.rng.gen::<f32>() * 50.0;
            self.spawn_enemy(EnemyKind::Basic, Vec2::new(x.min(max_x), y));
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn chapter(&self) -> Chapter {
        self.session.chapter()
    }

    pub fn active_boss(&self) -> Option<BossKind> {
        self.bosses.active()
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Cues queued since the last drain
    pub fn events(&self) -> &Outbox {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot::capture(self)
    }
}

fn new_player(config: &CombatConfig) -> Player {
    Player::new(&config.player, &config.stamina, config.parry.clone())
}

fn parry_effect(outcome: &ParryOutcome, at: Vec2, events: &mut Outbox) {
    match outcome.result {
        ParryResult::Perfect => events.effect(EffectKind::ParrySpark { perfect: true }, at, 12),
        ParryResult::Good => events.effect(EffectKind::ParrySpark { perfect: false }, at, 8),
        ParryResult::Failed => events.effect(EffectKind::ParryFail, at, 6),
        ParryResult::Missed => {}
    }
}
