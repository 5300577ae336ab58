//! Rank clusters and pick seed colors.
//!
//! Every cluster gets four scores in `[0, 1]`:
//!
//! - `vibrancy`: HSL saturation times normalized Lab chroma (square root, so
//!   moderately colorful clusters are not crushed).
//! - `uniqueness`: ΔE2000 to the nearest other cluster, normalized by
//!   [`UNIQUENESS_SCALE`].
//! - `frequency`: weight relative to the heaviest cluster.
//! - `balance`: mean of "not a near-duplicate of a chosen seed" and "not a
//!   lightness outlier".
//!
//! `combined` is the weighted sum using [`ScoreWeights`] (equal weights by
//! default). Seeds are picked greedily; after each pick the remaining
//! clusters are re-scored against the chosen set and candidates closer than
//! `min_seed_distance` are penalized proportionally. Ties go to the higher
//! frequency, then the lower cluster index.

use std::cmp::Ordering;

use crate::cluster::{Cluster, ClusterScore};
use crate::color::{delta_e2000, lab_chroma, Color};
use crate::config::{ScoreWeights, SelectionConfig};
use crate::error::{Result, SchemeError};

/// Lab chroma treated as fully chromatic.
pub const MAX_LAB_CHROMA: f32 = 100.0;
/// ΔE2000 at which a cluster counts as completely distinct.
pub const UNIQUENESS_SCALE: f32 = 50.0;

fn vibrancy(cluster: &Cluster) -> f32 {
    let saturation = cluster.centroid.to_hsl().saturation;
    let chroma = (lab_chroma(cluster.lab) / MAX_LAB_CHROMA).min(1.0);
    (saturation * chroma).clamp(0.0, 1.0).sqrt()
}

fn min_distance<'a>(cluster: &Cluster, others: impl Iterator<Item = &'a Cluster>) -> Option<f32> {
    others
        .map(|other| delta_e2000(cluster.lab, other.lab))
        .min_by(|a, b| a.total_cmp(b))
}

fn balance(cluster: &Cluster, chosen: &[&Cluster], min_seed_distance: f32) -> f32 {
    let distinct = match min_distance(cluster, chosen.iter().copied()) {
        Some(d) if min_seed_distance > 0.0 => (d / min_seed_distance).min(1.0),
        _ => 1.0,
    };
    // Mid lightness (L* 50) is ideal; pure black or white would score 0.
    let centered = 1.0 - ((cluster.lab.l - 50.0).abs() / 50.0).min(1.0);
    (distinct + centered) * 0.5
}

fn combine(score: &ClusterScore, weights: &ScoreWeights) -> f32 {
    let total = weights.vibrancy + weights.uniqueness + weights.frequency + weights.balance;
    if total <= 0.0 {
        return 0.0;
    }
    (score.vibrancy * weights.vibrancy
        + score.uniqueness * weights.uniqueness
        + score.frequency * weights.frequency
        + score.balance * weights.balance)
        / total
}

fn score_against(clusters: &[Cluster], index: usize, chosen: &[&Cluster], config: &SelectionConfig) -> ClusterScore {
    let cluster = &clusters[index];
    let max_weight = clusters.iter().map(|c| c.weight).max().unwrap_or(1).max(1);

    let others = clusters.iter().enumerate().filter(|&(i, _)| i != index).map(|(_, c)| c);
    let uniqueness = min_distance(cluster, others).map_or(1.0, |d| (d / UNIQUENESS_SCALE).min(1.0));

    let mut score = ClusterScore {
        vibrancy: vibrancy(cluster),
        uniqueness,
        frequency: cluster.weight as f32 / max_weight as f32,
        balance: balance(cluster, chosen, config.min_seed_distance),
        combined: 0.0,
    };
    score.combined = combine(&score, &config.weights);

    if let Some(d) = min_distance(cluster, chosen.iter().copied()) {
        if config.min_seed_distance > 0.0 && d < config.min_seed_distance {
            score.combined *= d / config.min_seed_distance;
        }
    }
    score
}

/// Fill in `score` for every cluster, with no seeds chosen yet.
pub fn score_clusters(clusters: &[Cluster], config: &SelectionConfig) -> Vec<Cluster> {
    (0..clusters.len())
        .map(|i| Cluster {
            score: score_against(clusters, i, &[], config),
            ..clusters[i].clone()
        })
        .collect()
}

/// Higher combined wins, then higher frequency, then lower index.
fn ranks_above(a: (usize, &ClusterScore), b: (usize, &ClusterScore)) -> bool {
    match a.1.combined.total_cmp(&b.1.combined) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match a.1.frequency.total_cmp(&b.1.frequency) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => a.0 < b.0,
        },
    }
}

/// Pick up to `count` seed colors (1 to 3) from `clusters`, best first.
///
/// Returns fewer than `count` colors only when there are fewer clusters.
///
/// # Errors
///
/// [`SchemeError::InvalidSeedCount`] for a count outside `1..=3`, and
/// [`SchemeError::InsufficientColorData`] when `clusters` is empty.
pub fn select_seeds(clusters: &[Cluster], count: usize, config: &SelectionConfig) -> Result<Vec<Color>> {
    if !(1..=3).contains(&count) {
        return Err(SchemeError::InvalidSeedCount(count));
    }
    if clusters.is_empty() {
        return Err(SchemeError::InsufficientColorData { visited: 0 });
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(count);
    while chosen.len() < count.min(clusters.len()) {
        let picked: Vec<&Cluster> = chosen.iter().map(|&i| &clusters[i]).collect();
        let mut best: Option<(usize, ClusterScore)> = None;
        for index in (0..clusters.len()).filter(|i| !chosen.contains(i)) {
            let score = score_against(clusters, index, &picked, config);
            let better = match &best {
                None => true,
                Some((best_index, best_score)) => ranks_above((index, &score), (*best_index, best_score)),
            };
            if better {
                best = Some((index, score));
            }
        }
        let Some((index, score)) = best else {
            break;
        };
        log::debug!(
            "seed {} -> {} (combined {:.3})",
            chosen.len(),
            clusters[index].centroid,
            score.combined
        );
        chosen.push(index);
    }

    Ok(chosen.into_iter().map(|i| clusters[i].centroid).collect())
}
