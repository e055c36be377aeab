//! Read-only debug overlay data.
//!
//! A [`DebugSnapshot`] copies out what an overlay draws: live hitboxes,
//! attack phases, telegraph progress and the parry frame counter. Nothing
//! here feeds back into the simulation.

use serde::{Deserialize, Serialize};

use crate::combat::{AttackKind, AttackPhase, Hitbox, ParryState, ParryWindow};
use crate::gameflow::SessionState;
use crate::monster::EnemyId;
use crate::physics::Aabb;
use crate::world::CombatWorld;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDebug {
    pub kind: AttackKind,
    pub phase: AttackPhase,
    pub state_timer: f32,
    pub telegraph_progress: f32,
    /// Radius or angle of the growing warning shape, for area attacks
    pub telegraph_extent: Option<f32>,
    pub hitboxes: Vec<Hitbox>,
    pub parryable: bool,
    pub deflected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDebug {
    pub id: EnemyId,
    pub bounds: Aabb,
    pub health: i32,
    pub max_health: i32,
    pub staggered: bool,
    pub boss: bool,
    /// `(index, len)` of a running combo
    pub combo: Option<(usize, usize)>,
    pub attack: Option<AttackDebug>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParryDebug {
    pub state: ParryState,
    pub current_frame: u32,
    pub window: ParryWindow,
    pub streak: u32,
    pub success_rate: f32,
    pub riposte_window: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub tick: u64,
    pub chapter: u8,
    pub state: SessionState,
    pub souls: u32,
    pub player_bounds: Aabb,
    pub player_health: i32,
    pub stamina: f32,
    pub exhausted: bool,
    pub attack_box: Option<Aabb>,
    pub parry: ParryDebug,
    pub enemies: Vec<EnemyDebug>,
    pub platforms: Vec<Aabb>,
}

impl DebugSnapshot {
    pub fn capture(world: &CombatWorld) -> Self {
        let player = world.player();
        let parry = &player.parry;
        let session = world.session();

        let enemies = world
            .enemies()
            .iter()
            .map(|enemy| EnemyDebug {
                id: enemy.id,
                bounds: enemy.body.aabb(),
                health: enemy.health,
                max_health: enemy.max_health,
                staggered: enemy.is_staggered(),
                boss: enemy.is_boss(),
                combo: enemy.combo.as_ref().map(|c| (c.index(), c.len())),
                attack: enemy.attack.as_ref().map(|attack| AttackDebug {
                    kind: attack.kind(),
                    phase: attack.phase(),
                    state_timer: attack.state_timer(),
                    telegraph_progress: attack.telegraph_progress(),
                    telegraph_extent: attack.variant().telegraph_extent(),
                    hitboxes: attack.hitboxes().to_vec(),
                    parryable: attack.is_parryable(),
                    deflected: attack.is_deflected(),
                }),
            })
            .collect();

        Self {
            tick: world.tick_count(),
            chapter: session.chapter().number(),
            state: session.state(),
            souls: session.souls,
            player_bounds: player.body.aabb(),
            player_health: player.health,
            stamina: player.stamina.current(),
            exhausted: player.stamina.is_exhausted(),
            attack_box: player.attack_box(),
            parry: ParryDebug {
                state: parry.state(),
                current_frame: parry.current_frame(),
                window: parry.window(),
                streak: parry.streak(),
                success_rate: parry.success_rate(),
                riposte_window: parry.riposte_window(),
            },
            enemies,
            platforms: world.platforms().iter().map(|p| p.bounds).collect(),
        }
    }

    /// Hitboxes currently able to hurt the player
    pub fn live_hitboxes(&self) -> impl Iterator<Item = &Hitbox> {
        self.enemies
            .iter()
            .filter_map(|e| e.attack.as_ref())
            .filter(|a| a.phase == AttackPhase::Execute && !a.deflected)
            .flat_map(|a| a.hitboxes.iter())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
