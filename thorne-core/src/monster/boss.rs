//! Boss encounters.
//!
//! At most one boss is active. Spawning one retires any existing boss,
//! walls off an arena and switches the music; the arena comes down again
//! when the boss dies or disappears.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{Enemy, EnemyId, EnemyKind};
use crate::combat::{AfflictionKind, AttackKind, SlashDirection};
use crate::events::{GameEvent, Outbox, Track};
use crate::physics::{Aabb, Body, Facing, Platform, PlatformId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Malenia,
    Gael,
}

impl BossKind {
    pub const ALL: [BossKind; 2] = [Self::Malenia, Self::Gael];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Malenia => "malenia",
            Self::Gael => "gael",
        }
    }
}

impl std::fmt::Display for BossKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BossKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown boss '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossPhase {
    #[default]
    One,
    Two,
}

/// Stats and attack patterns of one boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    pub health: i32,
    pub contact_damage: i32,
    pub souls: u32,
    pub size: Vec2,
    pub patrol_speed: f32,
    /// Inflicted on the player whenever one of the boss's attacks lands
    pub affliction: AfflictionKind,
    pub affliction_stacks: u32,
    pub pool: Vec<AttackKind>,
    /// Added to the pool on entering phase two
    pub phase_two_pool: Vec<AttackKind>,
    /// Health fraction at or below which phase two begins
    pub phase_two_threshold: f32,
    pub attack_cooldown: f32,
    pub phase_two_cooldown: f32,
    pub slash: SlashDirection,
}

impl BossProfile {
    pub fn malenia() -> Self {
        Self {
            health: 200,
            contact_damage: 10,
            souls: 200,
            size: Vec2::new(50.0, 60.0),
            patrol_speed: 1.5,
            affliction: AfflictionKind::ScarletRot,
            affliction_stacks: 2,
            pool: vec![AttackKind::Slash, AttackKind::Thrust, AttackKind::AoeCone],
            phase_two_pool: vec![AttackKind::Charge, AttackKind::AoeCircle],
            phase_two_threshold: 0.5,
            attack_cooldown: 1.5,
            phase_two_cooldown: 1.0,
            slash: SlashDirection::Diagonal,
        }
    }

    pub fn gael() -> Self {
        Self {
            health: 240,
            contact_damage: 15,
            souls: 250,
            size: Vec2::new(60.0, 60.0),
            patrol_speed: 1.0,
            affliction: AfflictionKind::Bleed,
            affliction_stacks: 2,
            pool: vec![AttackKind::Slash, AttackKind::Thrust, AttackKind::GroundSlam],
            phase_two_pool: vec![AttackKind::Charge, AttackKind::AoeCircle, AttackKind::AoeCone],
            phase_two_threshold: 0.5,
            attack_cooldown: 1.8,
            phase_two_cooldown: 1.2,
            slash: SlashDirection::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossesConfig {
    pub malenia: BossProfile,
    pub gael: BossProfile,
    /// Interior of the arena; walls go on its left, right and top
    pub arena: Aabb,
    pub wall_thickness: f32,
}

impl Default for BossesConfig {
    fn default() -> Self {
        Self {
            malenia: BossProfile::malenia(),
            gael: BossProfile::gael(),
            arena: Aabb::new(50.0, 50.0, 700.0, 350.0),
            wall_thickness: 20.0,
        }
    }
}

impl BossesConfig {
    pub fn profile(&self, kind: BossKind) -> &BossProfile {
        match kind {
            BossKind::Malenia => &self.malenia,
            BossKind::Gael => &self.gael,
        }
    }

    /// Left wall, right wall and ceiling around the arena
    pub fn arena_walls(&self, ids: [PlatformId; 3]) -> [Platform; 3] {
        let arena = self.arena;
        let t = self.wall_thickness;
        [
            Platform::solid(ids[0], Aabb::new(arena.x - t, arena.y, t, arena.height)),
            Platform::solid(ids[1], Aabb::new(arena.right(), arena.y, t, arena.height)),
            Platform::solid(ids[2], Aabb::new(arena.x, arena.y - t, arena.width, t)),
        ]
    }
}

/// Boss-only part of an enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub kind: BossKind,
    pub phase: BossPhase,
    pub profile: BossProfile,
}

impl BossState {
    pub fn always_combo(&self) -> bool {
        self.phase == BossPhase::Two
    }

    pub fn attack_cooldown(&self) -> f32 {
        match self.phase {
            BossPhase::One => self.profile.attack_cooldown,
            BossPhase::Two => self.profile.phase_two_cooldown,
        }
    }

    pub fn slash_direction(&self) -> SlashDirection {
        self.profile.slash
    }

    pub fn affliction(&self) -> (AfflictionKind, u32) {
        (self.profile.affliction, self.profile.affliction_stacks)
    }
}

/// Build the boss enemy for `kind`.
pub fn spawn(id: EnemyId, kind: BossKind, position: Vec2, profile: &BossProfile) -> Enemy {
    let mut body = Body::new(position, profile.size);
    body.velocity.x = profile.patrol_speed;
    Enemy {
        id,
        kind: EnemyKind::Basic,
        body,
        facing: Facing::Right,
        health: profile.health,
        max_health: profile.health,
        contact_damage: profile.contact_damage,
        souls: profile.souls,
        patrol_speed: profile.patrol_speed,
        stagger: 0.0,
        attack: None,
        combo: None,
        since_attack: None,
        contact_cooldown: 0.0,
        pool: profile.pool.clone(),
        boss: Some(BossState {
            kind,
            phase: BossPhase::One,
            profile: profile.clone(),
        }),
    }
}

/// The mutable parts of the world a boss encounter touches
pub struct Scene<'a> {
    pub enemies: &'a mut Vec<Enemy>,
    pub platforms: &'a mut Vec<Platform>,
    pub events: &'a mut Outbox,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BossManager {
    active: Option<(EnemyId, BossKind)>,
    arena: Vec<PlatformId>,
}

impl BossManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire any boss, add `boss` with its arena walls and switch to the
    /// boss track.
    pub fn spawn_boss(&mut self, boss: Enemy, walls: [Platform; 3], scene: &mut Scene<'_>) {
        let Some(kind) = boss.boss.as_ref().map(|state| state.kind) else {
            tracing::warn!(target: "thorne_core::monster", enemy = %boss.id, "spawn_boss called with a non-boss enemy");
            return;
        };
        scene.enemies.retain(|enemy| !enemy.is_boss());
        self.teardown_arena(scene.platforms);

        self.active = Some((boss.id, kind));
        self.arena = walls.iter().map(|wall| wall.id).collect();
        scene.platforms.extend(walls);
        scene.enemies.push(boss);
        scene.events.push(GameEvent::SwitchTrack(Track::Boss));
        scene.events.push(GameEvent::BossSpawned(kind));
        tracing::info!(target: "thorne_core::monster", boss = %kind, "boss spawned");
    }

    /// Per-tick check: phase changes, and defeat once the boss is dead or
    /// gone. Returns the boss defeated this tick.
    pub fn update(&mut self, scene: &mut Scene<'_>) -> Option<BossKind> {
        let (id, kind) = self.active?;
        let alive = match scene.enemies.iter_mut().find(|enemy| enemy.id == id) {
            Some(boss) if !boss.is_dead() => {
                enter_phase_two(boss);
                true
            }
            _ => false,
        };
        if alive {
            return None;
        }
        self.defeat_boss(scene);
        Some(kind)
    }

    fn defeat_boss(&mut self, scene: &mut Scene<'_>) {
        let Some((_, kind)) = self.active.take() else {
            return;
        };
        self.teardown_arena(scene.platforms);
        scene.events.push(GameEvent::SwitchTrack(Track::Normal));
        scene.events.push(GameEvent::BossDefeated(kind));
        tracing::info!(target: "thorne_core::monster", boss = %kind, "boss defeated");
    }

    fn teardown_arena(&mut self, platforms: &mut Vec<Platform>) {
        if self.arena.is_empty() {
            return;
        }
        platforms.retain(|platform| !self.arena.contains(&platform.id));
        self.arena.clear();
    }

    pub fn active(&self) -> Option<BossKind> {
        self.active.map(|(_, kind)| kind)
    }

    pub fn active_id(&self) -> Option<EnemyId> {
        self.active.map(|(id, _)| id)
    }

    pub fn arena_platforms(&self) -> &[PlatformId] {
        &self.arena
    }
}

fn enter_phase_two(boss: &mut Enemy) {
    let fraction = boss.health_fraction();
    let Some(state) = boss.boss.as_mut() else {
        return;
    };
    if state.phase == BossPhase::Two || fraction > state.profile.phase_two_threshold {
        return;
    }
    state.phase = BossPhase::Two;
    for kind in &state.profile.phase_two_pool {
        if !boss.pool.contains(kind) {
            boss.pool.push(*kind);
        }
    }
    tracing::info!(target: "thorne_core::monster", boss = %state.kind, "boss phase two");
}
