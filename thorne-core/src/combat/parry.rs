//! Frame-windowed parry with quality tiers, rewards and a riposte window.
//!
//! READY -> ACTIVE -> RECOVERY -> COOLDOWN -> READY. Quality is judged on
//! the 60 fps frame count since the attempt opened, `floor(t / (1/60))`,
//! whatever rate the host actually runs at.

use serde::{Deserialize, Serialize};

use super::attack::Attack;
use super::AttackPhase;
use crate::balance::Chapter;
use crate::constants::FRAME_TIME;
use crate::events::{GameEvent, Outbox, SoundKind};
use crate::physics::Aabb;
use crate::tutorial::TutorialTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParryState {
    #[default]
    Ready,
    Active,
    Recovery,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParryResult {
    Perfect,
    Good,
    /// Late, but still blocks the hit
    Failed,
    /// Window closed with nothing to intercept
    Missed,
}

impl ParryResult {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Perfect | Self::Good)
    }
}

/// Frame thresholds for one chapter, at the 60 fps reference rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParryWindow {
    pub perfect: u32,
    pub good: u32,
    pub total: u32,
}

impl ParryWindow {
    pub const fn new(perfect: u32, good: u32, total: u32) -> Self {
        Self {
            perfect,
            good,
            total,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.good >= self.perfect && self.total >= self.good
    }

    pub fn classify(&self, frames: u32) -> ParryResult {
        if frames <= self.perfect {
            ParryResult::Perfect
        } else if frames <= self.good {
            ParryResult::Good
        } else {
            ParryResult::Failed
        }
    }
}

/// What one success tier grants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardTier {
    pub base_souls: u32,
    pub souls_per_streak: u32,
    pub boost_multiplier: f32,
    pub boost_duration: f32,
    pub stagger: f32,
    /// Fraction of the full riposte window opened
    pub riposte_fraction: f32,
}

impl RewardTier {
    pub fn souls(&self, streak: u32) -> u32 {
        self.base_souls + streak * self.souls_per_streak
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParryConfig {
    pub active_time: f32,
    pub recovery_time: f32,
    pub cooldown_time: f32,
    /// Chapters 1..=5 in order
    pub windows: Vec<ParryWindow>,
    pub perfect: RewardTier,
    pub good: RewardTier,
    pub riposte_window: f32,
    pub riposte_damage_multiplier: f32,
    pub riposte_stagger: f32,
    pub failed_vulnerability: f32,
    pub failed_stamina_penalty: f32,
    pub missed_stamina_penalty: f32,
}

impl Default for ParryConfig {
    fn default() -> Self {
        Self {
            active_time: 0.25,
            recovery_time: 0.2,
            cooldown_time: 0.1,
            windows: vec![
                ParryWindow::new(3, 12, 15),
                ParryWindow::new(3, 10, 13),
                ParryWindow::new(2, 8, 10),
                ParryWindow::new(2, 8, 10),
                ParryWindow::new(2, 6, 8),
            ],
            perfect: RewardTier {
                base_souls: 15,
                souls_per_streak: 2,
                boost_multiplier: 1.5,
                boost_duration: 3.0,
                stagger: 1.5,
                riposte_fraction: 1.0,
            },
            good: RewardTier {
                base_souls: 10,
                souls_per_streak: 1,
                boost_multiplier: 1.25,
                boost_duration: 2.0,
                stagger: 1.0,
                riposte_fraction: 0.7,
            },
            riposte_window: 1.0,
            riposte_damage_multiplier: 2.0,
            riposte_stagger: 1.0,
            failed_vulnerability: 0.5,
            failed_stamina_penalty: 20.0,
            missed_stamina_penalty: 5.0,
        }
    }
}

impl ParryConfig {
    /// Window for `chapter`; a short table falls back to its first row.
    pub fn window(&self, chapter: Chapter) -> ParryWindow {
        self.windows
            .get(chapter.index())
            .or_else(|| self.windows.first())
            .copied()
            .unwrap_or(ParryWindow::new(0, 0, 0))
    }
}

/// Consequences of a resolved parry, applied by the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParryOutcome {
    pub result: ParryResult,
    pub frames: u32,
    pub souls: u32,
    /// (multiplier, seconds)
    pub damage_boost: Option<(f32, f32)>,
    /// Applied to the attacking enemy
    pub stagger: f32,
    pub stamina_penalty: f32,
    pub vulnerability: f32,
}

/// Bonus granted by consuming the riposte window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Riposte {
    pub damage_multiplier: f32,
    pub stagger: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParrySystem {
    config: ParryConfig,
    chapter: Chapter,
    state: ParryState,
    state_timer: f32,
    /// Set once this attempt intercepted something
    last_result: Option<ParryResult>,
    streak: u32,
    total_parries: u32,
    successful_parries: u32,
    riposte_window: f32,
    can_riposte: bool,
}

impl ParrySystem {
    pub fn new(config: ParryConfig) -> Self {
        Self {
            config,
            chapter: Chapter::FIRST,
            state: ParryState::Ready,
            state_timer: 0.0,
            last_result: None,
            streak: 0,
            total_parries: 0,
            successful_parries: 0,
            riposte_window: 0.0,
            can_riposte: false,
        }
    }

    pub fn set_chapter(&mut self, chapter: Chapter) {
        self.chapter = chapter;
    }

    /// READY -> ACTIVE. The caller pays the stamina cost.
    pub fn attempt_parry(&mut self, events: &mut Outbox) -> bool {
        if self.state != ParryState::Ready {
            return false;
        }
        self.state = ParryState::Active;
        self.state_timer = 0.0;
        self.last_result = None;
        events.sound(SoundKind::ParryAttempt);
        true
    }

    /// Advance timers. Returns the MISSED outcome when an ACTIVE window
    /// closes without an intercept.
    pub fn update(&mut self, dt: f32, events: &mut Outbox) -> Option<ParryOutcome> {
        if !(dt > 0.0) {
            return None;
        }
        self.state_timer += dt;

        if self.riposte_window > 0.0 {
            self.riposte_window -= dt;
            if self.riposte_window <= 0.0 {
                self.riposte_window = 0.0;
                self.can_riposte = false;
            }
        }

        let mut missed = None;
        match self.state {
            ParryState::Active if self.state_timer >= self.config.active_time => {
                self.enter(ParryState::Recovery);
                if self.last_result.is_none() {
                    missed = Some(self.resolve(ParryResult::Missed, 0, events));
                }
            }
            ParryState::Recovery if self.state_timer >= self.config.recovery_time => {
                self.enter(ParryState::Cooldown);
            }
            ParryState::Cooldown if self.state_timer >= self.config.cooldown_time => {
                self.enter(ParryState::Ready);
                self.last_result = None;
            }
            _ => {}
        }
        missed
    }

    fn enter(&mut self, state: ParryState) {
        self.state = state;
        self.state_timer = 0.0;
    }

    /// Try to intercept `attack` against the player's box. Any `Some`,
    /// FAILED included, means the hit is blocked. An intercept ends the
    /// ACTIVE window.
    pub fn check_parry_against_attack(
        &mut self,
        attack: &Attack,
        player: &Aabb,
        events: &mut Outbox,
    ) -> Option<ParryOutcome> {
        if self.state != ParryState::Active
            || !attack.is_parryable()
            || attack.phase() != AttackPhase::Execute
            || !attack.check_player_hit(player)
        {
            return None;
        }
        let frames = self.current_frame();
        let result = self.window().classify(frames);
        let outcome = self.resolve(result, frames, events);
        self.enter(ParryState::Recovery);
        Some(outcome)
    }

    fn resolve(&mut self, result: ParryResult, frames: u32, events: &mut Outbox) -> ParryOutcome {
        self.last_result = Some(result);
        self.total_parries += 1;

        let mut outcome = ParryOutcome {
            result,
            frames,
            souls: 0,
            damage_boost: None,
            stagger: 0.0,
            stamina_penalty: 0.0,
            vulnerability: 0.0,
        };

        let tier = match result {
            ParryResult::Perfect => Some(self.config.perfect),
            ParryResult::Good => Some(self.config.good),
            ParryResult::Failed => {
                self.streak = 0;
                outcome.stamina_penalty = self.config.failed_stamina_penalty;
                outcome.vulnerability = self.config.failed_vulnerability;
                events.sound(SoundKind::ParryFail);
                None
            }
            ParryResult::Missed => {
                self.streak = 0;
                outcome.stamina_penalty = self.config.missed_stamina_penalty;
                None
            }
        };

        if let Some(tier) = tier {
            outcome.souls = tier.souls(self.streak);
            outcome.damage_boost = Some((tier.boost_multiplier, tier.boost_duration));
            outcome.stagger = tier.stagger;
            self.streak += 1;
            self.successful_parries += 1;
            self.riposte_window = self.config.riposte_window * tier.riposte_fraction;
            self.can_riposte = true;
            if result == ParryResult::Perfect {
                events.sound(SoundKind::ParryPerfect);
                events.tutorial(TutorialTag::PerfectParry);
                events.tutorial(TutorialTag::Riposte);
            } else {
                events.sound(SoundKind::ParryGood);
            }
        }

        tracing::debug!(
            target: "thorne_core::combat",
            result = ?result,
            frames,
            streak = self.streak,
            souls = outcome.souls,
            "parry resolved"
        );
        events.push(GameEvent::ParryResolved {
            result,
            souls: outcome.souls,
        });
        outcome
    }

    /// Take the riposte bonus if the window is open. Single use.
    pub fn consume_riposte(&mut self) -> Option<Riposte> {
        if !self.can_riposte {
            return None;
        }
        self.can_riposte = false;
        self.riposte_window = 0.0;
        Some(Riposte {
            damage_multiplier: self.config.riposte_damage_multiplier,
            stagger: self.config.riposte_stagger,
        })
    }

    /// Back to READY with no riposte and no streak. Lifetime counters are
    /// kept so progression survives a respawn.
    pub fn reset(&mut self) {
        self.state = ParryState::Ready;
        self.state_timer = 0.0;
        self.last_result = None;
        self.streak = 0;
        self.riposte_window = 0.0;
        self.can_riposte = false;
    }

    /// Frames since the attempt opened, at 60 fps
    pub fn current_frame(&self) -> u32 {
        (self.state_timer / FRAME_TIME).floor() as u32
    }

    /// Success percentage over every resolved attempt; 0 with none.
    pub fn success_rate(&self) -> f32 {
        if self.total_parries == 0 {
            return 0.0;
        }
        self.successful_parries as f32 / self.total_parries as f32 * 100.0
    }

    pub fn window(&self) -> ParryWindow {
        self.config.window(self.chapter)
    }

    pub fn config(&self) -> &ParryConfig {
        &self.config
    }

    pub fn state(&self) -> ParryState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn is_active(&self) -> bool {
        self.state == ParryState::Active
    }

    pub fn last_result(&self) -> Option<ParryResult> {
        self.last_result
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn total_parries(&self) -> u32 {
        self.total_parries
    }

    pub fn successful_parries(&self) -> u32 {
        self.successful_parries
    }

    pub fn can_riposte(&self) -> bool {
        self.can_riposte
    }

    pub fn riposte_window(&self) -> f32 {
        self.riposte_window
    }
}

impl Default for ParrySystem {
    fn default() -> Self {
        Self::new(ParryConfig::default())
    }
}
