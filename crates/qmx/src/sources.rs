//! 🚰 Achievement sources — where the raw text comes from before anyone
//! has to understand it.
//!
//! 🧠 Knowledge graph:
//! - Pattern: trait → concrete impls ([`SteamSource`], [`InMemorySource`]) →
//!   [`SourceBackend`] enum → `from_config` resolver. Same shape every
//!   backend family in this workspace wears.
//! - A source fetches ONE game's page text per call. It strips markup and
//!   collapses the page to one semantic unit per line, but it does NOT
//!   parse achievements. It's a faucet, not a chef. The parser downstream
//!   handles meaning.
//! - `Ok(None)` = "nothing usable for this game" — private profile, game
//!   not owned, transient network sadness. NOT an error. The pipeline
//!   records the absence and keeps walking.

use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::SourceConfig;
use crate::common::GameId;

pub(crate) mod in_mem;
// 📡 `steam` is pub because [`SteamSourceConfig`] rides inside the public
// config enum — everything else in there stays crate-private.
pub mod steam;

pub(crate) use in_mem::InMemorySource;
pub(crate) use steam::SteamSource;

/// 🚰 A source that produces one game's achievement page text per call —
/// maximally ignorant of content meaning.
///
/// Implement this trait and you too can be the origin of someone else's
/// parsing problems. Guaranteed to dispense only the finest organic,
/// free-range, post-normalized lines.
///
/// # Contract 📜
/// - `fetch` returns `Ok(Some(text))` — markup stripped, whitespace
///   collapsed so each visual line is newline-separated, parser-ready.
/// - `Ok(None)` = unavailable. Private profile, unowned game, network
///   refusing to network. Routine. Non-fatal. The golden retriever goes
///   home without the ball and is still a good dog. 🐕
/// - `Err(...)` is reserved for "this source is broken", not "this game
///   had nothing" — per-game sadness is `None`, structural sadness is `Err`.
/// - `&self`, not `&mut self`: sources are stateless between fetches, so
///   the pipeline can issue several in flight at once.
#[async_trait]
pub(crate) trait AchievementSource: std::fmt::Debug {
    /// 📄 Fetch one game's achievements page for one player, normalized to text.
    async fn fetch(&self, player_id: &str, game_id: GameId) -> Result<Option<String>>;
}

/// 🎭 The many faces of a Source — a polymorphic casting call for text origins.
///
/// Each variant wraps a concrete source. The enum dispatches via
/// `impl AchievementSource for SourceBackend`, so the pipeline never needs
/// to know (or care) whether the text came from steamcommunity.com or a
/// test fixture's HashMap.
///
/// Ancient proverb: "He who hardcodes the backend, mocks nothing, tests nothing."
#[derive(Debug)]
pub(crate) enum SourceBackend {
    Steam(SteamSource),
    InMemory(InMemorySource),
}

impl SourceBackend {
    /// 🔧 Resolve the backend from config.
    ///
    /// | SourceConfig | Backend | Notes |
    /// |---|---|---|
    /// | Steam | SteamSource | real HTTP, real pacing, real consequences |
    /// | InMemory | InMemorySource | starts empty; tests seed it directly |
    pub(crate) fn from_config(config: &SourceConfig) -> Result<Self> {
        match config {
            SourceConfig::Steam(steam_config) => {
                Ok(Self::Steam(SteamSource::new(steam_config.clone())?))
            }
            SourceConfig::InMemory => Ok(Self::InMemory(InMemorySource::default())),
        }
    }
}

#[async_trait]
impl AchievementSource for SourceBackend {
    async fn fetch(&self, player_id: &str, game_id: GameId) -> Result<Option<String>> {
        match self {
            SourceBackend::Steam(s) => s.fetch(player_id, game_id).await,
            SourceBackend::InMemory(m) => m.fetch(player_id, game_id).await,
        }
    }
}
