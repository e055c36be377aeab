//! Headless demo: runs the combat core inside a minimal bevy app with a
//! scripted player and logs what happens.
//!
//! Usage: `thorne-core [preset|path.ron] [seconds]`

use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use thorne_core::engine::{CombatCorePlugin, CombatCue, CombatResource, PendingInput};
use thorne_core::events::GameEvent;
use thorne_core::gameflow::SessionState;
use thorne_core::logging::{init_tracing, LogLevel, TracingConfig};
use thorne_core::player::PlayerInput;
use thorne_core::{CombatConfig, Preset};

/// Frames the demo has left to run
#[derive(Resource)]
struct Budget(u32);

fn main() -> Result<()> {
    init_tracing(&TracingConfig::verbose(LogLevel::Debug));

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(arg) if arg.ends_with(".ron") => {
            CombatConfig::load(&arg).with_context(|| format!("loading config {arg}"))?
        }
        Some(arg) => arg
            .parse::<Preset>()
            .and_then(Preset::config)
            .with_context(|| format!("building preset {arg}"))?,
        None => CombatConfig::default(),
    };
    let seconds: u32 = match args.next() {
        Some(arg) => arg.parse().with_context(|| format!("bad duration {arg}"))?,
        None => 30,
    };

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(CombatCorePlugin { config })
        .insert_resource(Budget(seconds * 60))
        .add_systems(Update, (scripted_player, report_cues, stop_when_done))
        .add_systems(OnEnter(SessionState::GameOver), |mut exit: EventWriter<AppExit>| {
            info!("game over");
            exit.send(AppExit::Success);
        })
        .add_systems(OnEnter(SessionState::Victory), |mut exit: EventWriter<AppExit>| {
            info!("victory");
            exit.send(AppExit::Success);
        })
        .run();

    Ok(())
}

/// Walk toward the nearest enemy, parry anything in its telegraph and
/// swing when close.
fn scripted_player(world: Res<CombatResource>, mut pending: ResMut<PendingInput>) {
    let world = &world.0;
    let player = world.player();
    let x = player.body.position.x;
    let Some(target) = world.enemies().iter().min_by(|a, b| {
        let da = (a.body.position.x - x).abs();
        let db = (b.body.position.x - x).abs();
        da.total_cmp(&db)
    }) else {
        pending.0 = PlayerInput::default();
        return;
    };

    let dx = target.body.position.x - x;
    let executing_soon = target
        .attack
        .as_ref()
        .is_some_and(|attack| attack.is_parryable() && attack.telegraph_progress() >= 1.0);
    pending.0 = PlayerInput {
        left: dx < -60.0,
        right: dx > 60.0,
        jump: false,
        attack: dx.abs() < 70.0 && target.attack.is_none(),
        parry: executing_soon,
    };
}

fn report_cues(mut cues: EventReader<CombatCue>) {
    for CombatCue(event) in cues.read() {
        match event {
            GameEvent::Sound(_) | GameEvent::Effect(_) => {}
            other => info!("{other:?}"),
        }
    }
}

fn stop_when_done(mut budget: ResMut<Budget>, mut exit: EventWriter<AppExit>) {
    budget.0 = budget.0.saturating_sub(1);
    if budget.0 == 0 {
        exit.send(AppExit::Success);
    }
}
