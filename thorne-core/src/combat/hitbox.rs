//! Hitbox geometry for enemy attacks.
//!
//! Shapes are tested against the victim's bounding box. Rectangles use full
//! box overlap; every radial shape (circle, cone, ring) measures from the
//! victim's center. Non-finite input never counts as a hit.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::Aabb;

/// Hit region produced by an attack in its EXECUTE phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hitbox {
    Rect(Aabb),
    Circle {
        center: Vec2,
        radius: f32,
    },
    Cone {
        origin: Vec2,
        /// Radians, 0 = +x
        heading: f32,
        /// Full opening angle in radians
        angle: f32,
        range: f32,
    },
    /// Annulus between two radii; used by expanding shockwaves
    Ring {
        center: Vec2,
        inner: f32,
        outer: f32,
    },
}

impl Hitbox {
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Rect(rect) => rect.is_finite(),
            Self::Circle { center, radius } => center.is_finite() && radius.is_finite(),
            Self::Cone {
                origin,
                heading,
                angle,
                range,
            } => origin.is_finite() && heading.is_finite() && angle.is_finite() && range.is_finite(),
            Self::Ring {
                center,
                inner,
                outer,
            } => center.is_finite() && inner.is_finite() && outer.is_finite(),
        }
    }

    /// Does this region touch `target`?
    pub fn hits(&self, target: &Aabb) -> bool {
        if !self.is_finite() || !target.is_finite() {
            return false;
        }
        let point = target.center();
        match *self {
            Self::Rect(rect) => rect.overlaps(target),
            Self::Circle { center, radius } => point.distance(center) <= radius,
            Self::Cone {
                origin,
                heading,
                angle,
                range,
            } => {
                let offset = point - origin;
                if offset.length() > range {
                    return false;
                }
                let bearing = offset.y.atan2(offset.x);
                angle_between(bearing, heading).abs() <= angle / 2.0
            }
            Self::Ring {
                center,
                inner,
                outer,
            } => {
                let distance = point.distance(center);
                distance >= inner && distance <= outer
            }
        }
    }

    /// Triangle approximation of a cone (origin + two far corners), for
    /// debug drawing. `None` for other shapes.
    pub fn cone_vertices(&self) -> Option<[Vec2; 3]> {
        match *self {
            Self::Cone {
                origin,
                heading,
                angle,
                range,
            } => {
                let half = angle / 2.0;
                let edge = |a: f32| origin + Vec2::new(a.cos(), a.sin()) * range;
                Some([origin, edge(heading - half), edge(heading + half)])
            }
            _ => None,
        }
    }
}

/// Minimal signed difference `a - b`, wrapped into `[-PI, PI)`.
pub fn angle_between(a: f32, b: f32) -> f32 {
    (a - b + PI).rem_euclid(TAU) - PI
}
