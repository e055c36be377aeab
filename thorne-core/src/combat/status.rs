//! Timed effects on combatants: the parry damage boost and boss
//! afflictions (damage over time with decaying stacks).

use serde::{Deserialize, Serialize};

/// Outgoing damage multiplier granted by a successful parry
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageBoost {
    pub multiplier: f32,
    pub remaining: f32, // seconds
}

impl DamageBoost {
    pub fn new(multiplier: f32, duration: f32) -> Self {
        Self {
            multiplier,
            remaining: duration,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if dt > 0.0 && self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// 1.0 once expired
    pub fn current(&self) -> f32 {
        if self.is_active() {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// Damage-over-time effects inflicted by bosses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AfflictionKind {
    ScarletRot,
    Bleed,
}

/// Tick interval and per-stack damage of one affliction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AfflictionRule {
    pub interval: f32,
    pub damage_per_stack: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfflictionConfig {
    pub scarlet_rot: AfflictionRule,
    pub bleed: AfflictionRule,
    pub max_stacks: u32,
}

impl Default for AfflictionConfig {
    fn default() -> Self {
        Self {
            scarlet_rot: AfflictionRule {
                interval: 1.0,
                damage_per_stack: 3,
            },
            bleed: AfflictionRule {
                interval: 2.0,
                damage_per_stack: 8,
            },
            max_stacks: 5,
        }
    }
}

impl AfflictionConfig {
    pub fn rule(&self, kind: AfflictionKind) -> AfflictionRule {
        match kind {
            AfflictionKind::ScarletRot => self.scarlet_rot,
            AfflictionKind::Bleed => self.bleed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affliction {
    pub kind: AfflictionKind,
    pub stacks: u32,
    pub timer: f32,
}

/// All afflictions on one victim
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Afflictions {
    active: Vec<Affliction>,
}

impl Afflictions {
    /// Add `stacks`, capped at the configured maximum. Reapplying does not
    /// restart the tick timer.
    pub fn apply(&mut self, kind: AfflictionKind, stacks: u32, config: &AfflictionConfig) {
        if stacks == 0 {
            return;
        }
        if let Some(existing) = self.active.iter_mut().find(|a| a.kind == kind) {
            existing.stacks = (existing.stacks + stacks).min(config.max_stacks);
        } else {
            self.active.push(Affliction {
                kind,
                stacks: stacks.min(config.max_stacks),
                timer: 0.0,
            });
        }
    }

    /// Advance every affliction. Each one that reaches its interval deals
    /// `stacks × damage_per_stack` and loses a stack. Returns the damage
    /// dealt per kind this tick.
    pub fn tick(&mut self, dt: f32, config: &AfflictionConfig) -> Vec<(AfflictionKind, i32)> {
        let mut dealt = Vec::new();
        if !(dt > 0.0) {
            return dealt;
        }
        for affliction in &mut self.active {
            let rule = config.rule(affliction.kind);
            affliction.timer += dt;
            if affliction.timer >= rule.interval {
                affliction.timer -= rule.interval;
                dealt.push((affliction.kind, affliction.stacks as i32 * rule.damage_per_stack));
                affliction.stacks = affliction.stacks.saturating_sub(1);
            }
        }
        self.active.retain(|a| a.stacks > 0);
        dealt
    }

    pub fn stacks(&self, kind: AfflictionKind) -> u32 {
        self.active
            .iter()
            .find(|a| a.kind == kind)
            .map_or(0, |a| a.stacks)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Affliction> {
        self.active.iter()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_expires() {
        let mut boost = DamageBoost::new(1.5, 3.0);
        assert_eq!(boost.current(), 1.5);
        boost.tick(2.0);
        assert!(boost.is_active());
        boost.tick(1.5);
        assert_eq!(boost.current(), 1.0);
        assert_eq!(boost.remaining, 0.0);
        assert_eq!(DamageBoost::default().current(), 1.0);
    }

    #[test]
    fn test_scarlet_rot_decays() {
        let config = AfflictionConfig::default();
        let mut afflictions = Afflictions::default();
        afflictions.apply(AfflictionKind::ScarletRot, 3, &config);
        assert!(afflictions.tick(0.5, &config).is_empty());
        let dealt = afflictions.tick(0.5, &config);
        assert_eq!(dealt, vec![(AfflictionKind::ScarletRot, 9)]);
        assert_eq!(afflictions.stacks(AfflictionKind::ScarletRot), 2);
        assert_eq!(afflictions.tick(1.0, &config), vec![(AfflictionKind::ScarletRot, 6)]);
        assert_eq!(afflictions.tick(1.0, &config), vec![(AfflictionKind::ScarletRot, 3)]);
        assert!(afflictions.is_empty());
    }

    #[test]
    fn test_bleed_interval_and_cap() {
        let config = AfflictionConfig::default();
        let mut afflictions = Afflictions::default();
        afflictions.apply(AfflictionKind::Bleed, 4, &config);
        afflictions.apply(AfflictionKind::Bleed, 4, &config);
        assert_eq!(afflictions.stacks(AfflictionKind::Bleed), 5);
        assert!(afflictions.tick(1.0, &config).is_empty());
        assert_eq!(afflictions.tick(1.0, &config), vec![(AfflictionKind::Bleed, 40)]);
    }

    #[test]
    fn test_zero_dt_deals_nothing() {
        let config = AfflictionConfig::default();
        let mut afflictions = Afflictions::default();
        afflictions.apply(AfflictionKind::Bleed, 1, &config);
        assert!(afflictions.tick(0.0, &config).is_empty());
        assert!(afflictions.tick(f32::NAN, &config).is_empty());
        assert_eq!(afflictions.stacks(AfflictionKind::Bleed), 1);
    }
}
