use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::config::CombatConfig;
use crate::events::GameEvent;
use crate::gameflow::SessionState;
use crate::world::CombatWorld;

use super::input::{read_keyboard_input, PendingInput};

/// Hosts a [`CombatWorld`] inside a bevy app. The world ticks once per
/// `Update` with the frame's delta; its cues come out as [`CombatCue`]
/// events and the session state mirrors into [`SessionState`].
#[derive(Default)]
pub struct CombatCorePlugin {
    pub config: CombatConfig,
}

impl Plugin for CombatCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }
        app.insert_resource(CombatResource(CombatWorld::new(self.config.clone())))
            .init_resource::<PendingInput>()
            .init_state::<SessionState>()
            .add_event::<CombatCue>()
            .add_systems(
                Update,
                (read_keyboard_input, combat_tick_system, sync_session_state).chain(),
            );
    }
}

#[derive(Resource)]
pub struct CombatResource(pub CombatWorld);

/// One outbound cue from the combat core
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CombatCue(pub GameEvent);

fn combat_tick_system(
    time: Res<Time>,
    mut world: ResMut<CombatResource>,
    mut pending: ResMut<PendingInput>,
    mut cues: EventWriter<CombatCue>,
) {
    let input = pending.take();
    world.0.tick(time.delta_secs(), &input);
    for event in world.0.drain_events() {
        cues.send(CombatCue(event));
    }
}

fn sync_session_state(
    world: Res<CombatResource>,
    state: Res<State<SessionState>>,
    mut next: ResMut<NextState<SessionState>>,
) {
    let current = world.0.session().state();
    if *state.get() != current {
        info!("session state {:?} -> {:?}", state.get(), current);
        next.set(current);
    }
}
