//! 🎬 *[camera pans across a dimly lit home office]*
//! 🎬 *[dramatic orchestral music swells]*
//! 🎬 "In a world where sixty-eight pages must be fetched..."
//! 🎬 "One orchestrator dared to run them all. In order. Mostly."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The pipeline module — the shift supervisor of questmatch. It doesn't
//! parse, it doesn't fold, it doesn't rank. It makes the modules that DO
//! those things show up in the right order and hands each one exactly what
//! the previous one produced.
//!
//! 🧠 Knowledge graph:
//! - Stages: FETCH (source, paced or parallel) → PARSE (typed rejections
//!   filtered out, empty successes kept IN) → VECTORIZE (one fold) →
//!   RANK (one sort) → done
//! - Per-game failure never fails the run. Zero usable pages fails NOTHING:
//!   it short-circuits to the documented fallback — an empty ranking.
//! - Partial coverage is the NORMAL case and produces full-quality output
//!   from whatever survived. One game missing ≠ degraded run.
//!
//! 📜 Ancient proverb: "He who aborts the run over one private profile,
//! recommends nothing to anyone, forever."

use anyhow::Result;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::app_config::{RecommenderConfig, RuntimeConfig};
use crate::clusters::ClusterMap;
use crate::common::{GameAchievementBlob, ParsedGameAchievements, RankedGame};
use crate::parser::parse_achievements_page;
use crate::progress::FetchProgress;
use crate::ranker::{GameVectorEntry, rank};
use crate::sources::{AchievementSource, SourceBackend};
use crate::vectorizer::build_preference_vector;

/// 📦 The Recommender: owns the loaded data, the resolved source, and the
/// knobs — everything one run needs, nothing ambient, nothing global.
///
/// 🏗️ Construct it once with [`Recommender::new`], then call
/// [`Recommender::run`] per player. The data files were loaded by the
/// caller (once, at startup) and live here as plain immutable values.
pub(crate) struct Recommender {
    recommender_config: RecommenderConfig,
    runtime_config: RuntimeConfig,
    clusters: ClusterMap,
    catalog: Vec<GameVectorEntry>,
    source: SourceBackend,
}

impl Recommender {
    /// 🚀 Birth of a Recommender. All dependencies explicit, all of them
    /// owned. The constructor that dependency-injection frameworks dream
    /// about while they sleep in their XML beds.
    pub(crate) fn new(
        recommender_config: RecommenderConfig,
        runtime_config: RuntimeConfig,
        clusters: ClusterMap,
        catalog: Vec<GameVectorEntry>,
        source: SourceBackend,
    ) -> Self {
        Self {
            recommender_config,
            runtime_config,
            clusters,
            catalog,
            source,
        }
    }

    /// 🎬 The whole show: fetch, parse, fold, rank, return.
    ///
    /// # Contract 📜
    /// - `Err` means structural failure only (a broken source). Everything
    ///   game-shaped that goes wrong degrades, logs, and continues.
    /// - Zero usable pages, a zero preference vector, or an empty catalog
    ///   → `Ok(vec![])`, the fallback. An empty ranking IS the documented
    ///   "no signal" answer, not a failure in a trench coat.
    pub(crate) async fn run(&self, player_id: &str) -> Result<Vec<RankedGame>> {
        info!(
            player_id,
            monitored = self.recommender_config.monitored_games.len(),
            "🎬 starting recommendation run"
        );

        // 🚰 STAGE 1: FETCH — one blob per monitored game, absences included.
        let blobs = self.fetch_all(player_id).await?;
        let usable = blobs.iter().filter(|b| b.text.is_some()).count();
        info!(
            fetched = blobs.len(),
            usable,
            unavailable = blobs.len() - usable,
            "🚰 fetch stage complete"
        );

        if usable == 0 {
            // 💀 Every page came back empty-handed. Private profile, most
            // likely. The fallback is an empty ranking, served warm.
            warn!(player_id, "💀 zero usable pages — returning the fallback ranking");
            return Ok(Vec::new());
        }

        // 🔪 STAGE 2: PARSE — typed rejections are dropped with a warning;
        // empty-but-valid pages stay in. Empty ≠ unparseable.
        let parsed = parse_stage(&blobs);
        info!(parsed = parsed.len(), "🔪 parse stage complete");

        // 🧮 STAGE 3: VECTORIZE — one fold, one unit vector (or one honest zero vector).
        let user_vector = build_preference_vector(
            &parsed,
            &self.clusters,
            self.recommender_config.num_clusters,
        );

        // 🏆 STAGE 4: RANK — the catalog meets the vector. Eight get glory.
        if self.catalog.is_empty() {
            warn!("💀 the game-vector catalog is empty — nothing to rank against");
            return Ok(Vec::new());
        }
        let ranking = rank(&user_vector, &self.catalog, self.recommender_config.top_k);
        info!(ranked = ranking.len(), "🏆 ranking complete");
        Ok(ranking)
    }

    /// 🚰 Fetch every monitored game's page, sequentially paced or with
    /// bounded parallelism, progress bar included either way.
    ///
    /// Sequential is the default and the polite one: a configurable pause
    /// before every request keeps the rate limiter asleep. Parallel mode
    /// exists because the fold downstream is order-independent, so the only
    /// thing bounded concurrency risks is the rate limiter's patience.
    async fn fetch_all(&self, player_id: &str) -> Result<Vec<GameAchievementBlob>> {
        let games = &self.recommender_config.monitored_games;
        let mut progress = FetchProgress::new(player_id.to_string(), games.len() as u64);
        let delay = std::time::Duration::from_millis(self.runtime_config.fetch_delay_ms);
        let mut blobs = Vec::with_capacity(games.len());

        if self.runtime_config.fetch_parallelism <= 1 {
            // 🐢 Sequential: pause, fetch, record, repeat. Sixty-eight times.
            for &game_id in games {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let text = self.source.fetch(player_id, game_id).await?;
                progress.record(text.is_some());
                debug!(game_id, usable = text.is_some(), "🚰 fetched");
                blobs.push(GameAchievementBlob { game_id, text });
            }
        } else {
            // 🧵 Bounded parallelism: N in flight, completion order is
            // whatever the network felt like. The fold downstream shrugs.
            let mut stream = futures::stream::iter(games.iter().copied())
                .map(|game_id| {
                    let source = &self.source;
                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let text = source.fetch(player_id, game_id).await?;
                        Ok::<_, anyhow::Error>(GameAchievementBlob { game_id, text })
                    }
                })
                .buffer_unordered(self.runtime_config.fetch_parallelism);

            while let Some(blob) = stream.next().await {
                let blob = blob?;
                progress.record(blob.text.is_some());
                debug!(game_id = blob.game_id, usable = blob.text.is_some(), "🚰 fetched");
                blobs.push(blob);
            }
        }

        progress.finish();
        Ok(blobs)
    }
}

/// 🔪 Run the parser over every blob that has text. Rejections get a warn!
/// and a shrug — a rejected page contributes exactly as much as a missing
/// one, which is to say: nothing, peacefully.
fn parse_stage(blobs: &[GameAchievementBlob]) -> Vec<ParsedGameAchievements> {
    let mut parsed = Vec::with_capacity(blobs.len());
    for blob in blobs {
        let Some(text) = &blob.text else {
            continue; // 🔒 unavailable — already counted, nothing to parse
        };
        match parse_achievements_page(text) {
            Ok(achievements) => {
                // ✅ Empty lists ride along. A valid page with zero
                // achievements is a success story with a quiet ending.
                parsed.push(ParsedGameAchievements {
                    game_id: blob.game_id,
                    achievements,
                });
            }
            Err(rejection) => {
                warn!(game_id = blob.game_id, %rejection, "🔪 page rejected, skipping game");
            }
        }
    }
    parsed
}
