use serde::{Deserialize, Serialize};

pub mod attack;
pub mod combo;
pub mod hitbox;
pub mod parry;
pub mod status;
pub mod variants;

pub use attack::{Attack, AttackContext, AttackSpec, AttackTimings};
pub use combo::{ComboConfig, ComboSequence};
pub use hitbox::Hitbox;
pub use parry::{ParryConfig, ParryOutcome, ParryResult, ParryState, ParrySystem, ParryWindow};
pub use status::{AfflictionKind, Afflictions, DamageBoost};
pub use variants::{AttackSetup, AttacksConfig, SlashDirection, VariantState};

/// Attack lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackPhase {
    #[default]
    Idle,
    Telegraph, // visible warning, cannot hurt
    Windup,
    Execute, // hitboxes live
    Recovery,
}

impl AttackPhase {
    /// Phase that follows this one; `Idle` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Telegraph => Self::Windup,
            Self::Windup => Self::Execute,
            Self::Execute => Self::Recovery,
            Self::Recovery => Self::Idle,
        }
    }
}

/// Enemy attack variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Slash,
    Thrust,
    AoeCircle,
    AoeCone,
    Charge,
    GroundSlam,
}

impl AttackKind {
    pub const ALL: [AttackKind; 6] = [
        Self::Slash,
        Self::Thrust,
        Self::AoeCircle,
        Self::AoeCone,
        Self::Charge,
        Self::GroundSlam,
    ];

    /// Only directional weapon strikes can be parried; area and body
    /// attacks must be evaded.
    pub fn is_parryable(self) -> bool {
        matches!(self, Self::Slash | Self::Thrust)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slash => "slash",
            Self::Thrust => "thrust",
            Self::AoeCircle => "aoe_circle",
            Self::AoeCone => "aoe_cone",
            Self::Charge => "charge",
            Self::GroundSlam => "ground_slam",
        }
    }
}

impl std::fmt::Display for AttackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
