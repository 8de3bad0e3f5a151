//! 📦 Common data structures — the building blocks of questmatch
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. HOME OFFICE — 3:47 AM
//!
//! 🌩️  The lights flicker. A lone cursor blinks. Somewhere in the distance,
//! a GPU fan spins at a frequency that should concern everyone but concerns
//! no one. The scrape has been running for six minutes. Sixty-eight games.
//! Sixty-eight pages of text with no markup, no delimiters, no mercy.
//!
//! ✅ And then — an [`Achievement`] arrives. Quietly. Carrying its `name`
//! and its `unlocked` flag like a responsible adult carrying groceries in
//! one trip (ALL of them, no second trips, this is a point of honor).
//! It doesn't know which cluster it belongs to. It doesn't need to. Yet.
//!
//! 🦆
//!
//! This module defines the humble yet load-bearing structs that ferry
//! achievement data from the scraper to the ranker. They don't ask
//! questions. They carry the data. They are the postal workers of this
//! codebase. Please tip your postal workers.
//!
//! ---
//!
//! 🧠 Knowledge graph:
//! - `SourceBackend` fetches → [`GameAchievementBlob`] (text or "nope")
//! - parser chews blobs → [`Achievement`]s → [`ParsedGameAchievements`]
//! - vectorizer folds those → one `Vec<f32>` → ranker emits [`RankedGame`]s

use serde::Serialize;

/// 🔢 A Steam app id. Alias'd because typing `u64` everywhere tells the
/// reader nothing, and "is this a cluster index or a game id?" is exactly
/// the kind of 3am question we'd rather answer at compile-read time.
pub type GameId = u64;

/// 🎯 A singular `Achievement` — one name, one boolean, zero guarantees.
///
/// This is the atomic unit of preference signal. Produced ONLY by the
/// parser, immutable once created. Two achievements with the same `name`
/// are still two distinct entities — nobody deduplicates them upstream,
/// downstream, or sideways. If you earned "Die 100 Times" in two games,
/// congratulations, it counts twice. We don't judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    /// 🏷️ The display name as scraped, whitespace-trimmed. This is the
    /// exact key used against the cluster map — byte-for-byte, no fuzzy
    /// matching, no NER, no "close enough". Exact or nothing.
    pub name: String,
    /// ✅ `true` = the player earned it. `false` = the player has gazed
    /// upon it longingly from afar. Locked achievements still carry
    /// signal — negative signal, but signal.
    pub unlocked: bool,
}

impl Achievement {
    /// 🏗️ Constructs an achievement from a scraped name line.
    /// Trims it, because scraped text arrives with the hygiene of a
    /// toddler at a spaghetti dinner.
    pub fn new(name: &str, unlocked: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            unlocked,
        }
    }
}

/// 📦 One game's raw fetch result — text, or the absence of text.
///
/// `text: None` is NOT an error. It means the remote fetch yielded nothing
/// usable: private profile, game not owned, transient network sadness.
/// The parser treats it as "nothing to parse" and the pipeline moves on
/// with its life. Resilience through indifference.
#[derive(Debug, Clone)]
pub struct GameAchievementBlob {
    pub game_id: GameId,
    /// 📄 Post-normalized page text (one semantic unit per line), or None
    /// when the source couldn't produce anything worth reading.
    pub text: Option<String>,
}

/// 📦 A game that actually parsed — id plus its ordered achievement list.
///
/// Only games whose parse SUCCEEDED appear in the set the vectorizer
/// consumes. An empty `achievements` list is a legitimate success (a valid
/// page with nothing on it), which is exactly why the parser returns a
/// typed rejection instead of null-as-sentinel. Empty ≠ unparseable.
/// Write that on the whiteboard. Underline it twice.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedGameAchievements {
    pub game_id: GameId,
    pub achievements: Vec<Achievement>,
}

/// 🏆 One ranked catalog entry — the output currency of the whole pipeline.
///
/// Ordering is by descending `score`, ties broken by catalog iteration
/// order (the sort is stable). No other tie-break exists. Callers must not
/// read tea leaves into the ordering of exact-score ties beyond stability.
#[derive(Debug, Clone, Serialize)]
pub struct RankedGame {
    pub game_id: GameId,
    /// 📊 Raw dot product of the user vector against this game's catalog
    /// vector. Not cosine — catalog vectors are pre-normalized upstream.
    pub score: f32,
}
