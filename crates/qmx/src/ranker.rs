//! 🏆 The catalog similarity ranker — every game gets a number, eight get glory.
//!
//! 🎬 *[a leaderboard materializes. seventy games stare at it. the dot product
//! does not make eye contact. the dot product just multiplies and adds.]*
//!
//! 📦 This module loads the precomputed game-vector catalog and scores every
//! entry against the user's preference vector. Raw dot product, deliberately
//! NOT cosine similarity: the catalog vectors are pre-normalized upstream and
//! the user vector comes out of the vectorizer already unit-length, so extra
//! normalization here would be math theater.
//!
//! 🧠 Knowledge graph:
//! - Catalog file: JSON array of `{game_id | new_game_id, vector}` — ids may
//!   arrive as JSON integers OR strings, because upstream exporters disagree
//!   about what a number is
//! - Scoring: `dot(user, entry)` — a length mismatch scores `0.0` for that
//!   entry (defensive default), and a mismatch on EVERY entry trips a loud
//!   `error!` because that's a loaded-data defect, not input variance
//! - Ordering: stable descending sort, ties keep catalog iteration order
//! - `top_k` clamps to catalog length via truncation — no indexing past the
//!   end, ever, no matter how small the catalog runs
//!
//! 📜 Ancient proverb: "He who takes the first 8 of 7 entries, pages the on-call."

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, warn};

use crate::common::{GameId, RankedGame};

/// 📦 One precomputed catalog row — a candidate game and its vector in the
/// same cluster space the user vector lives in. Read-only for this core.
#[derive(Debug, Clone, Deserialize)]
pub struct GameVectorEntry {
    /// 🔢 Accepts the exporter's legacy `new_game_id` field name too, and
    /// tolerates ids serialized as strings. Bytes don't care about origin
    /// stories; neither do we.
    #[serde(alias = "new_game_id", deserialize_with = "game_id_from_int_or_string")]
    pub game_id: GameId,
    /// 📊 Expected length: `num_clusters`. Rows that disagree score 0.0 at
    /// rank time rather than poisoning the whole ranking.
    pub vector: Vec<f32>,
}

/// 🔧 Deserialize a game id from either a JSON integer or a numeric string.
/// Upstream exporters have produced both. We stopped asking why.
fn game_id_from_int_or_string<'de, D>(deserializer: D) -> std::result::Result<GameId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Str(String),
    }
    match RawId::deserialize(deserializer)? {
        RawId::Int(n) => Ok(n),
        RawId::Str(s) => s.trim().parse::<u64>().map_err(|_| {
            serde::de::Error::custom(format!("game id '{s}' is not a non-negative integer"))
        }),
    }
}

/// 📂 Load the game-vector catalog from a JSON array file. Once, at startup,
/// immutable thereafter — an explicit value passed into [`rank`], never a global.
pub fn load_catalog(path: &Path) -> Result<Vec<GameVectorEntry>> {
    let raw = std::fs::read_to_string(path).context(format!(
        "💀 Couldn't read game-vector catalog '{}'. \
         Check the [data] section of your config — the file exists in our hearts, \
         but apparently not on disk.",
        path.display()
    ))?;
    let catalog: Vec<GameVectorEntry> = serde_json::from_str(&raw).context(format!(
        "💀 Game-vector catalog '{}' is not a JSON array of \
         {{game_id, vector}} objects. The ranker cannot rank vibes alone.",
        path.display()
    ))?;
    debug!(entries = catalog.len(), "📂 loaded game-vector catalog");
    Ok(catalog)
}

/// 🏆 Score every catalog entry against the user vector, return the top `top_k`.
///
/// # Contract 📜
/// - Pure function: same inputs, same ordered output, every time.
/// - Stable descending sort by score; exact-score ties keep input order and
///   promise nothing more than that.
/// - `top_k` larger than the catalog → you get the whole catalog. No panic,
///   no index past the end.
/// - Never errors, never panics — degenerate inputs degrade to zero scores,
///   which is an answer, not an exception (the "no signal" answer).
pub fn rank(user_vector: &[f32], catalog: &[GameVectorEntry], top_k: usize) -> Vec<RankedGame> {
    let mut mismatched = 0usize;
    let mut ranking: Vec<RankedGame> = catalog
        .iter()
        .map(|entry| {
            if entry.vector.len() != user_vector.len() {
                mismatched += 1;
            }
            RankedGame {
                game_id: entry.game_id,
                score: dot(user_vector, &entry.vector),
            }
        })
        .collect();

    // ⚠️ Per-entry mismatches are tolerated (scored 0). ALL entries mismatching
    // is a different story: the loaded catalog and the configured cluster count
    // disagree wholesale. That's a configuration defect and it gets the loud log.
    if !catalog.is_empty() && mismatched == catalog.len() {
        error!(
            expected_len = user_vector.len(),
            entries = catalog.len(),
            "💀 EVERY catalog vector mismatches the user vector length. \
             num_clusters and the catalog file disagree about dimensionality — \
             all scores are 0 and the ranking below is meaningless."
        );
    } else if mismatched > 0 {
        warn!(
            mismatched,
            entries = catalog.len(),
            "⚠️ some catalog vectors have the wrong length and were scored 0.0"
        );
    }

    // 🔄 Stable sort, descending. total_cmp so a stray NaN can't panic the
    // comparator (it can't occur from finite inputs, but comparators don't
    // get to assume their inputs read the docs).
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranking.truncate(top_k);
    ranking
}

/// 📊 Plain dot product. Length mismatch → `0.0`, the defensive default —
/// one bad catalog row must not take the whole ranking down with it.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
