//! 🗺️ The cluster map — achievement names in, cluster indices out.
//!
//! 🎬 *[a filing cabinet the size of a vending machine. every drawer is labeled.
//! one label reads "First Blood → 14". nobody remembers who labeled them.]*
//!
//! 📦 A [`ClusterMap`] is a static lookup from achievement display name to a
//! semantic cluster index in `[0, num_clusters)`. It arrives as a JSON object
//! file, gets loaded exactly once at startup, and is immutable ever after —
//! an explicit value passed into the vectorizer, never an ambient global
//! lurking in service state.
//!
//! 🧠 Knowledge graph:
//! - Loaded by: `app_config` data paths → [`ClusterMap::load`]
//! - Consumed by: `vectorizer` via [`ClusterMap::lookup`] → `Option<usize>`
//! - Invariant: every stored index is `< num_clusters` — validated at load,
//!   so the vectorizer can index without bounds anxiety
//! - Missing names are routine, not errors. Not every achievement is clustered.
//!
//! 📜 Ancient proverb: "He who validates at load time, indexes without fear."

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// 🗺️ Immutable name → cluster-index lookup.
///
/// Keys are whitespace-trimmed on the way in, and probes are trimmed on the
/// way through [`lookup`](ClusterMap::lookup) — so the "byte-for-byte after
/// whitespace normalization" matching contract holds no matter how sloppy
/// the JSON file or the scraped name was about its edges.
#[derive(Debug, Clone, Default)]
pub struct ClusterMap {
    map: HashMap<String, usize>,
}

impl ClusterMap {
    /// 📂 Load the map from a JSON object file (`{"Achievement Name": 14, ...}`).
    ///
    /// Validates the one invariant the whole vector space depends on: every
    /// index must fit in `[0, num_clusters)`. A single out-of-range value is a
    /// configuration defect, and configuration defects fail LOUD at startup,
    /// not quietly at fold time with an index panic three stages downstream.
    pub fn load(path: &Path, num_clusters: usize) -> Result<Self> {
        let raw = std::fs::read_to_string(path).context(format!(
            "💀 Couldn't read cluster map file '{}'. We looked everywhere. \
             Under the couch. Behind the fridge. Check the [data] section of your config.",
            path.display()
        ))?;
        let parsed: HashMap<String, usize> = serde_json::from_str(&raw).context(format!(
            "💀 Cluster map '{}' is not a JSON object of name → index. \
             Expected {{\"Achievement Name\": 14, ...}}.",
            path.display()
        ))?;
        Self::from_entries(parsed, num_clusters)
    }

    /// 🏗️ Build from already-parsed entries, enforcing the index invariant.
    /// Split out from [`load`](ClusterMap::load) so tests can skip the filesystem.
    pub fn from_entries(
        entries: HashMap<String, usize>,
        num_clusters: usize,
    ) -> Result<Self> {
        let mut map = HashMap::with_capacity(entries.len());
        for (name, index) in entries {
            if index >= num_clusters {
                // 💀 One bad index poisons every vector built from this map. Refuse.
                anyhow::bail!(
                    "💀 Cluster map entry '{}' points at cluster {} but num_clusters is {}. \
                     Either the map file and the config disagree about dimensionality, \
                     or someone edited the JSON by hand. (It was the hand-edit. It always is.)",
                    name,
                    index,
                    num_clusters
                );
            }
            map.insert(name.trim().to_string(), index);
        }
        Ok(Self { map })
    }

    /// 🔍 Exact lookup of a trimmed achievement name.
    ///
    /// `None` means "not clustered" — an expected, routine, perfectly fine
    /// answer that the vectorizer skips over without comment. This is the
    /// explicit-Option replacement for the ambient `name in map` checks of
    /// lesser type systems.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.map.get(name.trim()).copied()
    }

    /// 🔢 How many achievement names are clustered.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// 💤 An empty map is legal. Every lookup misses. Every vector is zero.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entries(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn the_one_where_lookups_hit_and_miss_politely() {
        let map = ClusterMap::from_entries(entries(&[("First Blood", 2), ("Night Owl", 0)]), 3)
            .expect("valid entries must build");
        assert_eq!(map.lookup("First Blood"), Some(2));
        assert_eq!(map.lookup("Night Owl"), Some(0));
        // 🧪 A miss is Option::None, not a drama.
        assert_eq!(map.lookup("Unclustered Obscurity"), None);
    }

    #[test]
    fn the_one_where_whitespace_cannot_break_the_match() {
        // 🧪 Trimmed keys, trimmed probes — edges are normalized on both sides.
        let map = ClusterMap::from_entries(entries(&[("  Padded Name  ", 1)]), 4)
            .expect("valid entries must build");
        assert_eq!(map.lookup("Padded Name"), Some(1));
        assert_eq!(map.lookup("  Padded Name"), Some(1));
    }

    #[test]
    fn the_one_where_an_out_of_range_index_fails_at_the_door() {
        // 🧪 index 5 with num_clusters 5 is out of range — [0, 5) means 4 is the max.
        let result = ClusterMap::from_entries(entries(&[("Overachiever", 5)]), 5);
        assert!(result.is_err(), "out-of-range cluster index must be rejected at load");
    }

    #[test]
    fn the_one_where_the_json_file_loads_for_real() {
        // 🧪 Full file round trip — serde_json does the parsing, we do the judging.
        let mut file = tempfile::NamedTempFile::new().expect("💀 temp file creation failed");
        write!(file, r#"{{"First Blood": 0, "Completionist": 77}}"#)
            .expect("💀 temp file write failed");
        let map = ClusterMap::load(file.path(), 78).expect("well-formed file must load");
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("Completionist"), Some(77));
    }

    #[test]
    fn the_one_where_a_missing_file_is_a_contextual_error() {
        let result = ClusterMap::load(Path::new("/definitely/not/here.json"), 78);
        let err = format!("{:#}", result.expect_err("missing file must error"));
        assert!(err.contains("cluster map"), "error should say WHAT failed, not just that it did");
    }
}
