//! Session flow: souls, defeat count, chapter progression and the terminal
//! states.
//!
//! Playing -> GameOver when the player's health reaches zero, Playing ->
//! Victory when the last chapter's roster is cleared. Chapters advance once
//! the cumulative defeat count and the parry success rate both meet the
//! next chapter's requirement.

use std::collections::BTreeMap;

use bevy::prelude::States;
use serde::{Deserialize, Serialize};

use crate::balance::Chapter;
use crate::constants::MAX_ROSTER;
use crate::events::{GameEvent, Outbox};

/// Terminal and non-terminal session states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Playing,
    GameOver,
    Victory,
}

/// What it takes to enter a chapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChapterRequirement {
    /// Cumulative over the whole session
    pub enemies_defeated: u32,
    /// Percent, 0..=100
    pub parry_success_rate: f32,
}

impl ChapterRequirement {
    pub const fn new(enemies_defeated: u32, parry_success_rate: f32) -> Self {
        Self {
            enemies_defeated,
            parry_success_rate,
        }
    }

    pub fn is_met(&self, enemies_defeated: u32, parry_success_rate: f32) -> bool {
        enemies_defeated >= self.enemies_defeated && parry_success_rate >= self.parry_success_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Keyed by the chapter being entered
    pub requirements: BTreeMap<u8, ChapterRequirement>,
    /// Enemies in chapter one; each later chapter adds one
    pub roster_base: usize,
    pub roster_max: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            requirements: BTreeMap::from([
                (2, ChapterRequirement::new(3, 40.0)),
                (3, ChapterRequirement::new(4, 50.0)),
                (4, ChapterRequirement::new(5, 60.0)),
                (5, ChapterRequirement::new(6, 70.0)),
            ]),
            roster_base: 2,
            roster_max: MAX_ROSTER,
        }
    }
}

impl ProgressionConfig {
    pub fn requirement(&self, chapter: Chapter) -> Option<&ChapterRequirement> {
        self.requirements.get(&chapter.number())
    }

    /// `min(base + chapter - 1, max)`
    pub fn roster_size(&self, chapter: Chapter) -> usize {
        (self.roster_base + chapter.index()).min(self.roster_max)
    }
}

/// Snapshot taken when a chapter is left
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub completed: bool,
    pub parry_success_rate: f32,
    pub enemies_defeated: u32,
}

/// Banner text for entering a chapter
pub fn unlock_message(chapter: Chapter) -> Option<&'static str> {
    match chapter.number() {
        2 => Some("Chapter 2 Unlocked: Rhythm and Timing - enemies now use thrust attacks"),
        3 => Some("Chapter 3 Unlocked: Spatial Awareness - beware of area attacks"),
        4 => Some("Chapter 4 Unlocked: Combat Flow - enemies chain attacks together"),
        5 => Some("Chapter 5 Unlocked: Master of Arms - face the ultimate challenge"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub souls: u32,
    pub enemies_defeated: u32,
    chapter: Chapter,
    state: SessionState,
    progress: [ChapterProgress; 5],
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            souls: 0,
            enemies_defeated: 0,
            chapter: Chapter::FIRST,
            state: SessionState::Playing,
            progress: [ChapterProgress::default(); 5],
        }
    }

    pub fn add_souls(&mut self, souls: u32) {
        self.souls = self.souls.saturating_add(souls);
    }

    pub fn record_defeat(&mut self, souls: u32) {
        self.enemies_defeated += 1;
        self.add_souls(souls);
    }

    /// Move to the next chapter if its requirement is met. Returns the
    /// chapter entered.
    pub fn try_advance(
        &mut self,
        parry_success_rate: f32,
        config: &ProgressionConfig,
        events: &mut Outbox,
    ) -> Option<Chapter> {
        if self.state != SessionState::Playing {
            return None;
        }
        let next = self.chapter.next()?;
        let requirement = config.requirement(next)?;
        if !requirement.is_met(self.enemies_defeated, parry_success_rate) {
            return None;
        }

        let from = self.chapter;
        self.progress[from.index()] = ChapterProgress {
            completed: true,
            parry_success_rate,
            enemies_defeated: self.enemies_defeated,
        };
        self.chapter = next;
        events.push(GameEvent::ChapterAdvanced { from, to: next });
        tracing::info!(
            target: "thorne_core::gameflow",
            from = from.number(),
            to = next.number(),
            defeated = self.enemies_defeated,
            parry_rate = parry_success_rate,
            "chapter advanced"
        );
        Some(next)
    }

    pub fn game_over(&mut self, events: &mut Outbox) {
        if self.state == SessionState::Playing {
            self.state = SessionState::GameOver;
            events.push(GameEvent::PlayerDied);
            tracing::info!(target: "thorne_core::gameflow", souls = self.souls, chapter = self.chapter.number(), "game over");
        }
    }

    pub fn victory(&mut self, events: &mut Outbox) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Victory;
            events.push(GameEvent::Victory);
            tracing::info!(target: "thorne_core::gameflow", souls = self.souls, "victory");
        }
    }

    pub fn chapter(&self) -> Chapter {
        self.chapter
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn progress(&self, chapter: Chapter) -> ChapterProgress {
        self.progress[chapter.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_grows_to_cap() {
        let config = ProgressionConfig::default();
        let sizes: Vec<usize> = Chapter::all().map(|c| config.roster_size(c)).collect();
        assert_eq!(sizes, vec![2, 3, 4, 5, 5]);
    }

    #[test]
    fn test_advance_needs_both_requirements() {
        let config = ProgressionConfig::default();
        let mut session = Session::new();
        let mut events = Outbox::new();
        session.record_defeat(10);
        session.record_defeat(10);
        session.record_defeat(10);
        assert_eq!(session.try_advance(39.9, &config, &mut events), None);
        assert_eq!(session.try_advance(40.0, &config, &mut events), Chapter::new(2));
        assert_eq!(session.souls, 30);

        let left = session.progress(Chapter::FIRST);
        assert!(left.completed);
        assert_eq!(left.enemies_defeated, 3);
        assert!(events.events().contains(&GameEvent::ChapterAdvanced {
            from: Chapter::FIRST,
            to: Chapter::or_first(2),
        }));
    }

    #[test]
    fn test_one_chapter_per_call() {
        let config = ProgressionConfig::default();
        let mut session = Session::new();
        let mut events = Outbox::new();
        session.enemies_defeated = 10;
        session.try_advance(100.0, &config, &mut events);
        assert_eq!(session.chapter().number(), 2);
        for _ in 0..10 {
            session.try_advance(100.0, &config, &mut events);
        }
        assert_eq!(session.chapter(), Chapter::LAST);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let config = ProgressionConfig::default();
        let mut session = Session::new();
        let mut events = Outbox::new();
        session.game_over(&mut events);
        session.victory(&mut events);
        assert_eq!(session.state(), SessionState::GameOver);
        session.enemies_defeated = 10;
        assert_eq!(session.try_advance(100.0, &config, &mut events), None);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unlock_messages() {
        assert!(unlock_message(Chapter::FIRST).is_none());
        assert!(Chapter::all().skip(1).all(|c| unlock_message(c).is_some()));
    }
}
