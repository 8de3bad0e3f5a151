//! 🔧 App Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! 🧠 Knowledge graph:
//! - `QMX_*` env vars merged with an optional TOML file; TOML wins on conflicts
//! - `num_clusters`, `top_k`, and the monitored-game-id list are DATA here,
//!   never literals in code — the whole core is testable with a 3-dimension
//!   synthetic catalog without recompiling anything
//! - `SteamSourceConfig` lives in `sources::steam` because configs belong
//!   near the thing they configure. Socks near feet. Wild concept.

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
// 🚀 tracing::info — because println! in production is a cry for help.
use tracing::info;

use crate::common::GameId;
use crate::sources::steam::SteamSourceConfig;

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📡 Where achievement pages come from. Configurable, unlike my children.
    pub source: SourceConfig,
    /// 🧮 The knobs of the core pipeline: dimensions, top-K, monitored games.
    pub recommender: RecommenderConfig,
    /// 📂 Paths to the cluster map and game-vector catalog files.
    pub data: DataConfig,
    /// ⏱️ Fetch-stage runtime knobs: pacing and parallelism.
    #[serde(default, alias = "fetch")]
    pub runtime: RuntimeConfig,
}

/// 🎭 The many faces of an achievement source, config edition.
///
/// `[source.Steam]` with a table for the real thing, or `source = "InMemory"`
/// for the fixture backend that tests (and only tests, please) live on.
#[derive(Debug, Deserialize, Clone)]
pub enum SourceConfig {
    /// 📡 Scrape steamcommunity.com like it's 2019 and the API key never came.
    Steam(SteamSourceConfig),
    /// 🧪 Fixture-backed. If you're deploying this to prod, please also deploy
    /// a therapist.
    InMemory,
}

/// 🧮 Core pipeline knobs — the numbers the old scraper scripts hardcoded
/// and we, pointedly, did not.
#[derive(Debug, Deserialize, Clone)]
pub struct RecommenderConfig {
    /// 📏 Dimensionality of the cluster space (78 in our deployment).
    /// The cluster map and catalog are validated/scored against this number.
    pub num_clusters: usize,
    /// 🏆 How many ranked games come out the far end. Clamped to catalog size.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// 🎮 The fixed catalog of monitored game ids — one fetch per entry,
    /// every run. Typically 60–70 ids. Order is irrelevant (the fold doesn't care).
    pub monitored_games: Vec<GameId>,
}

/// 📂 Where the immutable data files live. Loaded once at startup, passed
/// around as explicit values forever after. No ambient globals. We checked.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// 🗺️ JSON object: achievement name → cluster index.
    pub cluster_map: PathBuf,
    /// 📊 JSON array: `{game_id, vector}` catalog entries.
    pub game_vectors: PathBuf,
}

/// ⏱️ Fetch-stage pacing. Defaults are the polite ones: one request at a
/// time with a 50 ms breather, which is how you scrape for an hour without
/// meeting the rate limiter personally.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// 🧵 How many fetches in flight at once. 1 = sequential (default).
    /// The fold downstream is order-independent, so crank it if you dare.
    #[serde(default = "default_fetch_parallelism", alias = "parallelism")]
    pub fetch_parallelism: usize,
    /// 💤 Pause before each fetch, in milliseconds. Defensive pacing against
    /// upstream rate limiting. 0 = no pause = you were warned.
    #[serde(default = "default_fetch_delay_ms", alias = "delay_ms")]
    pub fetch_delay_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fetch_parallelism: default_fetch_parallelism(),
            fetch_delay_ms: default_fetch_delay_ms(),
        }
    }
}

fn default_top_k() -> usize {
    8
}

fn default_fetch_parallelism() -> usize {
    1
}

fn default_fetch_delay_ms() -> u64 {
    50
}

/// 🚀 Load the config — from a file, from env vars, or from the sheer power of hoping.
///
/// 🔧 Merges environment variables (QMX_*) with an optional TOML file.
/// ALL QMX_ vars are fair game. We don't gatekeep env vars here. This is a
/// safe space. 🦆
///
/// 📐 DESIGN NOTE (no cap, this is tribal knowledge):
///   - If `config_file_name` is None  → env vars only. No file. No assumptions.
///   - If `config_file_name` is Some  → env vars + TOML file, merged. TOML wins on conflicts.
///
/// 💀 Returns an error if config is unparseable. Which it will be. Check the
/// error message though — it's contextual, informative, and written with love.
/// Or despair. Hard to tell at 3am.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    // 🏗️ Start with env vars as the base layer — like a good sourdough starter.
    let config = Figment::new().merge(Env::prefixed("QMX_"));

    // 🎯 Conditionally layer in TOML only if a file was actually provided.
    // Ancient proverb: "He who defaults to config.toml uninvited, deploys to production alone."
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (QMX_*). \
             The file exists in our hearts, but apparently not on disk.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (QMX_*). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    };

    // ✅ or 💀, there is no try — actually there is, it's called `?`
    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        // 🧪 We write a real file here because Figment wants TOML from disk,
        // like it's method acting.
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create test config. The filesystem said 'new phone who dis'.");
        file.write_all(contents.as_bytes())
            .expect("💀 Failed to write test config contents.");
        file
    }

    #[test]
    fn the_one_where_a_full_steam_config_parses() {
        let config_file = write_test_config(
            r#"
            [source.Steam]
            base_url = "http://localhost:9999"

            [recommender]
            num_clusters = 78
            top_k = 5
            monitored_games = [620, 413150, 1245620]

            [data]
            cluster_map = "achievement_cluster_map.json"
            game_vectors = "new_game_vector.json"

            [runtime]
            fetch_parallelism = 4
            fetch_delay_ms = 0
            "#,
        );

        let app_config = load_config(Some(config_file.path()))
            .expect("💀 A fully specified config should parse. The schema drift goblin loses.");

        assert_eq!(app_config.recommender.num_clusters, 78);
        assert_eq!(app_config.recommender.top_k, 5);
        assert_eq!(app_config.recommender.monitored_games, vec![620, 413150, 1245620]);
        assert_eq!(app_config.runtime.fetch_parallelism, 4);
        assert_eq!(app_config.runtime.fetch_delay_ms, 0);
        match app_config.source {
            SourceConfig::Steam(steam) => {
                assert_eq!(steam.base_url, "http://localhost:9999");
            }
            honestly_who_knows => panic!(
                "💀 Expected the Steam source config, but serde took us to {:?}. Plot twist energy.",
                honestly_who_knows
            ),
        }
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let config_file = write_test_config(
            r#"
            source = "InMemory"

            [recommender]
            num_clusters = 3
            monitored_games = [10, 20]

            [data]
            cluster_map = "map.json"
            game_vectors = "vectors.json"
            "#,
        );

        let app_config = load_config(Some(config_file.path()))
            .expect("💀 Defaults should fill the gaps. Serde left us on read otherwise.");

        assert_eq!(app_config.recommender.top_k, 8, "top_k defaults to 8");
        assert_eq!(app_config.runtime.fetch_parallelism, 1, "sequential by default");
        assert_eq!(app_config.runtime.fetch_delay_ms, 50, "polite by default");
        assert!(matches!(app_config.source, SourceConfig::InMemory));
    }

    #[test]
    fn the_one_where_runtime_accepts_its_former_stage_names() {
        // 🧪 `[fetch]` with `parallelism`/`delay_ms` was the section's old
        // spelling — the aliases keep those configs out of witness protection.
        let config_file = write_test_config(
            r#"
            source = "InMemory"

            [recommender]
            num_clusters = 3
            monitored_games = [10]

            [data]
            cluster_map = "map.json"
            game_vectors = "vectors.json"

            [fetch]
            parallelism = 6
            delay_ms = 10
            "#,
        );

        let app_config = load_config(Some(config_file.path()))
            .expect("💀 Runtime aliases should parse. The witness protection paperwork was valid.");

        assert_eq!(app_config.runtime.fetch_parallelism, 6);
        assert_eq!(app_config.runtime.fetch_delay_ms, 10);
    }

    #[test]
    fn the_one_where_direct_toml_parsing_agrees_with_figment() {
        // 🧪 Sanity cross-check: the same TOML through the bare toml crate
        // matches what load_config would build (minus env var shenanigans).
        // If these two ever disagree, figment has opinions we need to hear about.
        let contents = r#"
            source = "InMemory"

            [recommender]
            num_clusters = 2
            monitored_games = [1]

            [data]
            cluster_map = "m.json"
            game_vectors = "v.json"
        "#;
        let direct: AppConfig =
            toml::from_str(contents).expect("💀 Bare toml parsing should work too.");
        let config_file = write_test_config(contents);
        let via_figment = load_config(Some(config_file.path()))
            .expect("💀 The figment path should agree with the direct one.");
        assert_eq!(direct.recommender.num_clusters, 2);
        assert_eq!(
            direct.recommender.num_clusters,
            via_figment.recommender.num_clusters
        );
        assert_eq!(direct.recommender.top_k, via_figment.recommender.top_k);
    }
}
