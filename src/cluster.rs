//! Weighted k-means over color samples, in CIE Lab.
//!
//! The heavy lifting is `kmeans_colors::get_kmeans` (k-means++ initialization,
//! seeded RNG). Sample weights are honored by expanding each sample into
//! `weight` identical Lab points, which is exactly the pixel population the
//! sampler visited.

use kmeans_colors::get_kmeans;
use palette::Lab;

use crate::color::Color;
use crate::config::ClusterConfig;
use crate::sampler::Sample;

/// Per-cluster perceptual scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterScore {
    pub vibrancy: f32,
    pub uniqueness: f32,
    pub frequency: f32,
    pub balance: f32,
    pub combined: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: Color,
    /// Centroid before quantization to sRGB8.
    pub lab: Lab,
    pub weight: u64,
    pub score: ClusterScore,
}

impl Cluster {
    fn new(lab: Lab, weight: u64) -> Self {
        Self {
            centroid: Color::from_lab(lab),
            lab,
            weight,
            score: ClusterScore::default(),
        }
    }
}

/// Cluster `samples` into at most `config.k` weighted centroids.
///
/// Clusters that end up empty are dropped, so fewer than `k` may come back.
/// With `k` or fewer distinct samples there is nothing to cluster and each
/// sample becomes its own cluster. The result is sorted by weight, heaviest
/// first; equal weights keep their centroid order.
pub fn cluster(samples: &[Sample], config: &ClusterConfig) -> Vec<Cluster> {
    let k = config.k.max(1);
    if samples.len() <= k {
        let mut clusters: Vec<Cluster> = samples
            .iter()
            .filter(|s| s.weight > 0)
            .map(|s| Cluster::new(s.color.to_lab(), u64::from(s.weight)))
            .collect();
        clusters.sort_by(|a, b| b.weight.cmp(&a.weight));
        return clusters;
    }

    let mut lab_pixels: Vec<Lab> = Vec::with_capacity(samples.iter().map(|s| s.weight as usize).sum());
    for sample in samples {
        let lab = sample.color.to_lab();
        lab_pixels.extend(std::iter::repeat_n(lab, sample.weight as usize));
    }

    // Keep the tightest of several seeded runs; ties go to the earlier run.
    let mut best = get_kmeans(k, config.max_iterations, config.convergence, false, &lab_pixels, config.seed);
    for run in 1..config.runs.max(1) {
        let candidate = get_kmeans(
            k,
            config.max_iterations,
            config.convergence,
            false,
            &lab_pixels,
            config.seed.wrapping_add(run),
        );
        if candidate.score < best.score {
            best = candidate;
        }
    }
    log::debug!("k-means over {} points: score {:.3}", lab_pixels.len(), best.score);

    let mut weights = vec![0u64; best.centroids.len()];
    for &index in &best.indices {
        weights[usize::from(index)] += 1;
    }

    let mut clusters: Vec<Cluster> = best
        .centroids
        .iter()
        .zip(weights)
        .filter(|&(_, weight)| weight > 0)
        .map(|(&lab, weight)| Cluster::new(lab, weight))
        .collect();
    clusters.sort_by(|a, b| b.weight.cmp(&a.weight));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::delta_e2000;

    fn sample(hex: &str, weight: u32) -> Sample {
        Sample {
            color: Color::from_hex(hex).unwrap(),
            weight,
        }
    }

    /// Two tight families of colors: blues and oranges.
    fn two_families() -> Vec<Sample> {
        vec![
            sample("#2050D0", 40),
            sample("#2458D8", 35),
            sample("#1C48C8", 30),
            sample("#2A5CE0", 25),
            sample("#E07020", 20),
            sample("#E87828", 18),
            sample("#D86818", 15),
            sample("#F08030", 12),
        ]
    }

    #[test]
    fn degenerates_to_one_cluster_per_sample() {
        let samples = vec![sample("#2050D0", 3), sample("#E07020", 7)];
        let clusters = cluster(&samples, &ClusterConfig::default());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].centroid, Color::from_hex("#E07020").unwrap());
        assert_eq!(clusters[0].weight, 7);
    }

    #[test]
    fn weights_are_preserved() {
        let samples = two_families();
        let config = ClusterConfig {
            k: 2,
            ..ClusterConfig::default()
        };
        let clusters = cluster(&samples, &config);
        let total: u64 = clusters.iter().map(|c| c.weight).sum();
        assert_eq!(total, samples.iter().map(|s| u64::from(s.weight)).sum::<u64>());
    }

    #[test]
    fn separates_distinct_families() {
        let config = ClusterConfig {
            k: 2,
            ..ClusterConfig::default()
        };
        let clusters = cluster(&two_families(), &config);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].weight, 130, "blue family should be heaviest");
        assert_eq!(clusters[1].weight, 65);
        let gap = delta_e2000(clusters[0].lab, clusters[1].lab);
        assert!(gap > 30.0, "centroids too close: {gap}");
    }

    #[test]
    fn no_empty_clusters() {
        let config = ClusterConfig {
            k: 7,
            ..ClusterConfig::default()
        };
        let clusters = cluster(&two_families(), &config);
        assert!(!clusters.is_empty() && clusters.len() <= 7);
        assert!(clusters.iter().all(|c| c.weight > 0));
    }

    #[test]
    fn deterministic_for_same_seed() {
        let config = ClusterConfig {
            k: 3,
            ..ClusterConfig::default()
        };
        let a = cluster(&two_families(), &config);
        let b = cluster(&two_families(), &config);
        assert_eq!(a, b);
    }
}
