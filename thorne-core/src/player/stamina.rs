//! Stamina: the resource gate on player actions.
//!
//! Spending stamina restarts a regen delay. Hitting zero exhausts the
//! player, and exhaustion only lifts once regen carries stamina back above
//! a small threshold.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    pub max: f32,
    /// Points per second
    pub regen_rate: f32,
    /// Seconds after the last spend before regen resumes
    pub regen_delay: f32,
    /// Exhaustion clears once stamina rises above this
    pub recovery_threshold: f32,
    pub attack_cost: f32,
    pub parry_cost: f32,
    pub jump_cost: f32,
    /// Points per second while running
    pub run_cost: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_rate: 25.0,
            regen_delay: 1.0,
            recovery_threshold: 10.0,
            attack_cost: 15.0,
            parry_cost: 10.0,
            jump_cost: 20.0,
            run_cost: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stamina {
    current: f32,
    max: f32,
    regen_rate: f32,
    regen_delay: f32,
    recovery_threshold: f32,
    exhausted: bool,
    since_use: f32,
}

impl Stamina {
    pub fn new(config: &StaminaConfig) -> Self {
        Self {
            current: config.max,
            max: config.max,
            regen_rate: config.regen_rate,
            regen_delay: config.regen_delay,
            recovery_threshold: config.recovery_threshold,
            exhausted: false,
            // Full stamina at spawn regenerates right away
            since_use: config.regen_delay,
        }
    }

    pub fn can_use(&self, amount: f32) -> bool {
        !self.exhausted && self.current >= amount
    }

    /// Spend `amount` if affordable. Returns whether it was spent.
    pub fn use_stamina(&mut self, amount: f32) -> bool {
        if !self.can_use(amount) {
            return false;
        }
        self.spend(amount);
        true
    }

    /// Unconditional drain, saturating at zero. Used for penalties.
    pub fn drain(&mut self, amount: f32) {
        if amount > 0.0 {
            self.spend(amount.min(self.current));
        }
    }

    fn spend(&mut self, amount: f32) {
        self.current -= amount;
        self.since_use = 0.0;
        if self.current <= 0.0 {
            self.current = 0.0;
            self.exhausted = true;
        }
    }

    /// Regenerate. Returns true when the player is exhausted after the
    /// update.
    pub fn update(&mut self, dt: f32) -> bool {
        if dt > 0.0 {
            self.since_use += dt;
            // Only the part of this step that lies past the delay regenerates
            let regen_time = (self.since_use - self.regen_delay).min(dt);
            if regen_time > 0.0 && self.current < self.max {
                self.current = (self.current + self.regen_rate * regen_time).min(self.max);
                if self.current > self.recovery_threshold {
                    self.exhausted = false;
                }
            }
        }
        if self.current <= 0.0 {
            self.current = 0.0;
            self.exhausted = true;
        }
        self.exhausted
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(&StaminaConfig::default())
    }
}
