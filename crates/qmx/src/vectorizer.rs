//! 🧮 The preference vector builder — many achievements in, one unit vector out.
//!
//! 🎬 COLD OPEN — INT. WHITEBOARD ROOM — 3:47 AM
//!
//! Seventy-eight dimensions. Nobody can visualize seventy-eight dimensions.
//! Everyone in the room nods anyway. Someone draws two axes and a dot and
//! says "imagine this, but more so." The dot is a player. The dot has
//! opinions about roguelikes. The math does not care how the dot feels.
//!
//! 📦 This module folds every parsed achievement across every parsed game
//! into a single vector over the cluster space, then L2-normalizes it.
//! Unlocked achievements push their cluster up by `+1.0`. Locked ones drag
//! it down by `-0.2` — you saw the achievement, you did not chase it, and
//! that reluctance is information too.
//!
//! 🧠 Knowledge graph:
//! - Input: `&[ParsedGameAchievements]` + [`ClusterMap`] + `num_clusters` (config, never a literal)
//! - Output: `Vec<f32>` of length `num_clusters`, unit length — or all-zero
//!   when nothing matched (the documented "no signal available" output)
//! - The fold is commutative/associative over addition: game order, page
//!   order, and fetch-completion order all wash out. Pure function, no state.
//!
//! 📜 Ancient proverb: "He who divides by a zero norm, ships NaN to production."

use tracing::debug;

use crate::clusters::ClusterMap;
use crate::common::ParsedGameAchievements;

// 🔒 The weights of the fold. An unlocked achievement is a vote; a locked one
// is a fifth of a veto. Tuned upstream of this codebase; treated as physics here.
const UNLOCKED_WEIGHT: f32 = 1.0;
const LOCKED_WEIGHT: f32 = -0.2;

/// 🧮 Fold parsed games into one normalized preference vector.
///
/// # Contract 📜
/// - Starts from an all-zero vector of length `num_clusters`.
/// - Every achievement whose name the cluster map knows contributes its
///   weight at the mapped index. Unknown names are skipped silently —
///   routine, expected, not worth a log line per miss.
/// - Afterwards the vector is scaled by `1/‖v‖₂` — UNLESS the norm is zero
///   (nothing matched), in which case the zero vector comes back untouched.
///   Zero in, zero out, zero division-by-zero.
/// - Fold order does not affect the result, so callers may feed games in
///   whatever order the fetch stage happened to finish them.
pub fn build_preference_vector(
    parsed_games: &[ParsedGameAchievements],
    clusters: &ClusterMap,
    num_clusters: usize,
) -> Vec<f32> {
    let mut vector = vec![0.0f32; num_clusters];
    let mut matched = 0usize;

    for game in parsed_games {
        for achievement in &game.achievements {
            // 🔍 Explicit Option — a miss is a skip, never an error.
            let Some(cluster) = clusters.lookup(&achievement.name) else {
                continue;
            };
            vector[cluster] += if achievement.unlocked {
                UNLOCKED_WEIGHT
            } else {
                LOCKED_WEIGHT
            };
            matched += 1;
        }
    }

    debug!(
        games = parsed_games.len(),
        matched_achievements = matched,
        "🧮 folded achievements into preference vector"
    );

    // 📏 L2 norm — plain sum-of-squares sqrt. No fancier math required.
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    // ⚠️ norm == 0.0 → nothing matched → return the zero vector as-is.
    // Downstream ranking will score everything 0, which is a legitimate
    // "no signal available" output, not a failure.
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Achievement;
    use std::collections::HashMap;

    fn cluster_map(pairs: &[(&str, usize)], num_clusters: usize) -> ClusterMap {
        let entries: HashMap<String, usize> =
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ClusterMap::from_entries(entries, num_clusters).expect("test map must build")
    }

    fn game(game_id: u64, achievements: Vec<Achievement>) -> ParsedGameAchievements {
        ParsedGameAchievements { game_id, achievements }
    }

    #[test]
    fn the_one_where_unlocked_adds_and_locked_subtracts() {
        // 🧪 One unlocked (+1.0) in cluster 0, one locked (-0.2) in cluster 1.
        // Pre-normalization that's [1.0, -0.2, 0.0]; we verify via ratios so
        // normalization can't hide a wrong weight.
        let map = cluster_map(&[("Up", 0), ("Down", 1)], 3);
        let games = vec![game(
            10,
            vec![Achievement::new("Up", true), Achievement::new("Down", false)],
        )];
        let v = build_preference_vector(&games, &map, 3);
        assert!(v[0] > 0.0, "unlocked must contribute positively");
        assert!(v[1] < 0.0, "locked must contribute negatively");
        assert_eq!(v[2], 0.0);
        assert!(
            (v[1] / v[0] + 0.2).abs() < 1e-6,
            "locked/unlocked ratio must be exactly -0.2 regardless of normalization"
        );
    }

    #[test]
    fn the_one_where_the_output_is_already_unit_length() {
        // 🧪 Normalization idempotence: re-normalizing must be a no-op.
        let map = cluster_map(&[("A", 0), ("B", 2)], 4);
        let games = vec![game(
            1,
            vec![
                Achievement::new("A", true),
                Achievement::new("A", true),
                Achievement::new("B", false),
            ],
        )];
        let v = build_preference_vector(&games, &map, 4);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6, "non-zero output must be unit length, got {norm}");
    }

    #[test]
    fn the_one_where_nothing_matches_and_nobody_divides_by_zero() {
        // 🧪 Zero-norm guard: no matches → all-zero vector, no NaN, no panic.
        let map = cluster_map(&[("Known", 0)], 2);
        let games = vec![game(1, vec![Achievement::new("Totally Unknown", true)])];
        let v = build_preference_vector(&games, &map, 2);
        assert_eq!(v, vec![0.0, 0.0]);
        assert!(v.iter().all(|x| x.is_finite()), "zero-signal output must stay finite");
    }

    #[test]
    fn the_one_where_fold_order_washes_out() {
        // 🧪 Shuffle the games; the fold is commutative, the output identical
        // within float tolerance.
        let map = cluster_map(&[("A", 0), ("B", 1), ("C", 2)], 3);
        let g1 = game(1, vec![Achievement::new("A", true), Achievement::new("B", false)]);
        let g2 = game(2, vec![Achievement::new("C", true)]);
        let g3 = game(3, vec![Achievement::new("B", true), Achievement::new("A", false)]);

        let forward = build_preference_vector(&[g1.clone(), g2.clone(), g3.clone()], &map, 3);
        let backward = build_preference_vector(&[g3, g2, g1], &map, 3);
        for (a, b) in forward.iter().zip(backward.iter()) {
            assert!((a - b).abs() < 1e-6, "fold must be order-independent: {a} vs {b}");
        }
    }

    #[test]
    fn the_one_where_duplicate_names_count_every_time() {
        // 🧪 No deduplication anywhere in the pipeline — same name twice, two votes.
        let map = cluster_map(&[("Echo", 0)], 1);
        let once = build_preference_vector(
            &[game(1, vec![Achievement::new("Echo", true)])],
            &map,
            1,
        );
        let twice = build_preference_vector(
            &[
                game(1, vec![Achievement::new("Echo", true)]),
                game(2, vec![Achievement::new("Echo", true)]),
            ],
            &map,
            1,
        );
        // Both normalize to [1.0] — but the pre-normalization magnitudes differ,
        // which we can only observe with a second, opposing component.
        assert_eq!(once, vec![1.0]);
        assert_eq!(twice, vec![1.0]);

        let map2 = cluster_map(&[("Echo", 0), ("Anchor", 1)], 2);
        let v = build_preference_vector(
            &[game(
                1,
                vec![
                    Achievement::new("Echo", true),
                    Achievement::new("Echo", true),
                    Achievement::new("Anchor", true),
                ],
            )],
            &map2,
            2,
        );
        assert!(
            (v[0] / v[1] - 2.0).abs() < 1e-6,
            "two Echo votes must weigh exactly twice one Anchor vote"
        );
    }

    #[test]
    fn the_one_where_an_empty_input_yields_the_zero_vector() {
        let map = cluster_map(&[], 5);
        let v = build_preference_vector(&[], &map, 5);
        assert_eq!(v, vec![0.0; 5]);
    }
}
