//! Entity physics: velocity integration, gravity, and platform resolution.
//!
//! Velocities are in pixels per reference frame (1/60 s) so the tuning
//! numbers stay readable; integration scales by `dt * REFERENCE_FPS`.
//! Coordinates are screen space: origin top-left, +y pointing down.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::REFERENCE_FPS;

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Strict overlap test. Touching edges do not count; any non-finite
    /// coordinate yields `false`.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        if !self.is_finite() || !other.is_finite() {
            return false;
        }
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Horizontal facing of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Heading angle in radians (0 = right, PI = left)
    pub fn angle(self) -> f32 {
        match self {
            Self::Left => std::f32::consts::PI,
            Self::Right => 0.0,
        }
    }

    pub fn from_velocity(vx: f32, current: Facing) -> Self {
        if vx < 0.0 {
            Self::Left
        } else if vx > 0.0 {
            Self::Right
        } else {
            current
        }
    }
}

/// Stable handle for a platform so arena walls can be removed by identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Static level geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub bounds: Aabb,
    /// Solid platforms block from every side, for every body.
    pub solid: bool,
}

impl Platform {
    pub fn new(id: PlatformId, bounds: Aabb) -> Self {
        Self {
            id,
            bounds,
            solid: false,
        }
    }

    pub fn solid(id: PlatformId, bounds: Aabb) -> Self {
        Self {
            id,
            bounds,
            solid: true,
        }
    }
}

/// Which sides of a non-solid platform a body collides with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Land on top only; pass through from below and the sides.
    TopOnly,
    /// Resolve against all four sides.
    AllSides,
}

/// Result of resolving a body against the level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub grounded: bool,
    pub hit_ceiling: bool,
    pub blocked_horizontally: bool,
}

/// Physical state shared by the player and every enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub position: Vec2,
    /// Pixels per reference frame
    pub velocity: Vec2,
    pub size: Vec2,
    pub grounded: bool,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            grounded: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    /// Apply gravity and move by the current velocity. Returns the position
    /// before the move, which platform resolution needs.
    pub fn integrate(&mut self, dt: f32, gravity: f32) -> Vec2 {
        let previous = self.position;
        let frames = dt * REFERENCE_FPS;
        if frames <= 0.0 {
            return previous;
        }
        self.velocity.y += gravity * frames;
        self.position += self.velocity * frames;
        previous
    }

    /// Keep the body horizontally inside `[0, width]`.
    pub fn clamp_horizontal(&mut self, width: f32) {
        if self.position.x < 0.0 {
            self.position.x = 0.0;
        }
        if self.position.x + self.size.x > width {
            self.position.x = width - self.size.x;
        }
    }
}

/// Push `body` out of every overlapping platform, using `previous` to decide
/// which side it came from.
pub fn resolve_platforms(
    body: &mut Body,
    previous: Vec2,
    platforms: &[Platform],
    resolution: Resolution,
) -> Contacts {
    let mut contacts = Contacts::default();
    let size = body.size;

    for platform in platforms {
        let bounds = platform.bounds;
        if !body.aabb().overlaps(&bounds) {
            continue;
        }
        let all_sides = platform.solid || resolution == Resolution::AllSides;
        let velocity = body.velocity;

        if velocity.y > 0.0 && previous.y + size.y <= bounds.y {
            body.position.y = bounds.y - size.y;
            body.velocity.y = 0.0;
            contacts.grounded = true;
        } else if !all_sides {
            continue;
        } else if velocity.y < 0.0 && previous.y >= bounds.bottom() {
            body.position.y = bounds.bottom();
            body.velocity.y = 0.0;
            contacts.hit_ceiling = true;
        } else if velocity.x > 0.0 && previous.x + size.x <= bounds.x {
            body.position.x = bounds.x - size.x;
            contacts.blocked_horizontally = true;
        } else if velocity.x < 0.0 && previous.x >= bounds.right() {
            body.position.x = bounds.right();
            contacts.blocked_horizontally = true;
        }
    }

    body.grounded = contacts.grounded;
    contacts
}
