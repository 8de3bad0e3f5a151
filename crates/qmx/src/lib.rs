pub mod app_config;
pub mod clusters;
pub mod common;
pub mod parser;
mod pipeline;
mod progress;
pub mod ranker;
pub mod sources;
pub mod vectorizer;

use anyhow::{Context, Result};

pub use crate::app_config::{AppConfig, load_config};
pub use crate::common::{Achievement, GameId, ParsedGameAchievements, RankedGame};

use crate::clusters::ClusterMap;
use crate::pipeline::Recommender;
use crate::ranker::load_catalog;
use crate::sources::SourceBackend;

/// 🚀 Load the data files, resolve the source, run one recommendation pass.
///
/// Data loads happen HERE, once, before any network traffic — a bad path
/// should fail in the first hundred milliseconds, not after sixty-eight
/// polite fetches.
pub async fn run(config: AppConfig, player_id: &str) -> Result<Vec<RankedGame>> {
    let clusters = ClusterMap::load(
        &config.data.cluster_map,
        config.recommender.num_clusters,
    )
    .context("💀 Failed to load the achievement cluster map")?;
    let catalog = load_catalog(&config.data.game_vectors)
        .context("💀 Failed to load the game-vector catalog")?;
    let source = SourceBackend::from_config(&config.source)
        .context("💀 Failed to resolve the achievement source")?;

    let recommender = Recommender::new(
        config.recommender,
        config.runtime,
        clusters,
        catalog,
        source,
    );
    recommender.run(player_id).await
}
