//! # Previously, on Questmatch...
//!
//! 🎬 The network was down. The profile was private. Steam was having a
//! Tuesday. And yet the tests still needed pages — real-looking,
//! parser-ready, line-per-node pages — without a single packet leaving
//! the building. Someone had to pretend to be an entire community website
//! from inside a HashMap.
//!
//! That someone was this module.
//!
//! `in_mem` provides a fixture-backed [`AchievementSource`]: seed it with
//! pre-normalized page text (or a deliberate `None`) per game id, and it
//! will serve those fixtures back with the unwavering reliability that
//! actual websites can only dream about.
//!
//! 🦆
//!
//! ⚠️ This is NOT for production. This is for tests. If you're deploying
//! this to prod, please also deploy a therapist.
//!
//! ✅ No network calls. No disk I/O. No rate limiter. No browser costume.
//! Just vibes and heap memory.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::common::GameId;
use crate::sources::AchievementSource;

/// 📦 The world's most agreeable achievement source.
///
/// A `HashMap<GameId, Option<String>>` wearing a trait implementation.
/// Three possible answers per fetch:
///
/// | Seeded as | `fetch` returns | Meaning |
/// |---|---|---|
/// | `Some(text)` | `Ok(Some(text))` | "here's your page, champ" |
/// | `None` | `Ok(None)` | a rehearsed unavailability (private profile cosplay) |
/// | not seeded | `Ok(None)` | also unavailable — the map shrugs |
///
/// The `player_id` is accepted and ignored, because a HashMap has never
/// once cared who was asking.
#[derive(Debug, Default)]
pub(crate) struct InMemorySource {
    /// 🔒 The entire community website, pre-flattened. `None` values are
    /// deliberate unavailability fixtures, not accidents.
    pages: HashMap<GameId, Option<String>>,
}

impl InMemorySource {
    /// 🏗️ Seed one game's fixture. `Some(text)` = a parser-ready page,
    /// `None` = this game will be "unavailable" on demand, every demand.
    ///
    /// Text should already be in the one-unit-per-line shape the parser
    /// eats — this source does NOT normalize. It's a warehouse, not a spa.
    pub(crate) fn seed(&mut self, game_id: GameId, text: Option<&str>) {
        self.pages.insert(game_id, text.map(str::to_string));
    }
}

#[async_trait]
impl AchievementSource for InMemorySource {
    /// 🎯 Look up the fixture, clone it, hand it over. O(1) and proud of it.
    ///
    /// It's async because we respect the trait contract, not because we
    /// need it. Ancient proverb: "He who makes everything async learns
    /// nothing, but ships faster."
    async fn fetch(&self, _player_id: &str, game_id: GameId) -> Result<Option<String>> {
        // ✅ Unknown id and seeded-None collapse to the same answer, which
        // is exactly how the real source behaves about games you don't own.
        Ok(self.pages.get(&game_id).cloned().flatten())
    }
}
