use bevy::prelude::*;

use crate::player::PlayerInput;

/// Input for the next combat tick. Hosts without a keyboard write it
/// directly; edge flags are cleared after every tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PendingInput(pub PlayerInput);

impl PendingInput {
    pub fn take(&mut self) -> PlayerInput {
        let input = self.0;
        self.0.attack = false;
        self.0.parry = false;
        input
    }
}

/// A/D or arrows move, W/Up/Space jump, Z/J attack, Q parry.
pub fn keyboard_input(keys: &ButtonInput<KeyCode>) -> PlayerInput {
    let any = |codes: &[KeyCode]| codes.iter().any(|code| keys.pressed(*code));
    let any_edge = |codes: &[KeyCode]| codes.iter().any(|code| keys.just_pressed(*code));
    PlayerInput {
        left: any(&[KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: any(&[KeyCode::KeyD, KeyCode::ArrowRight]),
        jump: any(&[KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space]),
        attack: any_edge(&[KeyCode::KeyZ, KeyCode::KeyJ]),
        parry: any_edge(&[KeyCode::KeyQ]),
    }
}

pub(crate) fn read_keyboard_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut pending: ResMut<PendingInput>,
) {
    let Some(keys) = keys else {
        return;
    };
    let input = keyboard_input(&keys);
    pending.0 = PlayerInput {
        attack: pending.0.attack || input.attack,
        parry: pending.0.parry || input.parry,
        ..input
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::ArrowLeft);
        keys.press(KeyCode::KeyQ);
        let input = keyboard_input(&keys);
        assert!(input.left && input.parry);
        assert!(!input.right && !input.attack);
    }

    #[test]
    fn test_held_parry_is_not_an_edge() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyQ);
        keys.clear();
        assert!(!keyboard_input(&keys).parry);
    }

    #[test]
    fn test_take_clears_edges() {
        let mut pending = PendingInput(PlayerInput {
            right: true,
            attack: true,
            parry: true,
            ..Default::default()
        });
        let first = pending.take();
        assert!(first.attack && first.parry);
        let second = pending.take();
        assert!(second.right);
        assert!(!second.attack && !second.parry);
    }
}
