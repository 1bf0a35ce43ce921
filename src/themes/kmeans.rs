// K-means partitioning over dense TF-IDF rows.
//
// Lloyd's algorithm with k-means++ seeding. The whole fit is repeated
// `n_init` times from one seeded RNG and the run with the lowest inertia
// (sum of squared distances to the assigned centroid) wins, so identical
// input always yields identical labels.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// K-means parameters.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence threshold on total squared centroid movement
    pub tol: f64,
    pub seed: u64,
}

/// Result of the best k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster index per input point
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed,
        }
    }

    pub fn with_restarts(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Partition `points` into `k` clusters.
    pub fn fit(&self, points: &[Vec<f64>]) -> Result<KMeansFit> {
        let n = points.len();
        if self.k == 0 {
            anyhow::bail!("k-means needs at least one cluster");
        }
        if n < self.k {
            anyhow::bail!("k-means needs at least k={} points, got {}", self.k, n);
        }
        let dim = points[0].len();
        if points.iter().any(|p| p.len() != dim) {
            anyhow::bail!("k-means points have inconsistent dimensions");
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for run in 0..self.n_init.max(1) {
            let fit = self.single_run(points, &mut rng);
            if !fit.inertia.is_finite() {
                anyhow::bail!("k-means produced a non-finite inertia");
            }
            debug!(run, inertia = fit.inertia, "k-means run finished");
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| anyhow::anyhow!("k-means ran zero initializations"))
    }

    fn single_run(&self, points: &[Vec<f64>], rng: &mut StdRng) -> KMeansFit {
        let mut centroids = init_plus_plus(points, self.k, rng);
        let mut labels = vec![0usize; points.len()];

        for _ in 0..self.max_iter {
            for (i, p) in points.iter().enumerate() {
                labels[i] = nearest(p, &centroids).0;
            }

            let mut next = recompute_centroids(points, &labels, self.k);
            relocate_empty_clusters(points, &mut labels, &mut next);

            let shift: f64 = centroids
                .iter()
                .zip(&next)
                .map(|(a, b)| squared_distance(a, b))
                .sum();
            centroids = next;
            if shift <= self.tol {
                break;
            }
        }

        for (i, p) in points.iter().enumerate() {
            labels[i] = nearest(p, &centroids).0;
        }
        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();

        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of and squared distance to the closest centroid.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen centroid.
fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..n)].clone());

    while centroids.len() < k {
        let dists: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = dists.iter().sum();

        let next = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = n - 1;
            for (i, d) in dists.iter().enumerate() {
                acc += d;
                if acc >= target && *d > 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // Every point sits on a centroid already.
            rng.random_range(0..n)
        };
        centroids.push(points[next].clone());
    }

    centroids
}

fn recompute_centroids(points: &[Vec<f64>], labels: &[usize], k: usize) -> Vec<Vec<f64>> {
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];
    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, v) in sums[l].iter_mut().zip(p) {
            *s += v;
        }
    }
    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            for s in sum.iter_mut() {
                *s /= count as f64;
            }
        }
    }
    sums
}

/// Give every empty cluster the point farthest from its current centroid.
fn relocate_empty_clusters(points: &[Vec<f64>], labels: &mut [usize], centroids: &mut [Vec<f64>]) {
    let k = centroids.len();
    for cluster in 0..k {
        if labels.contains(&cluster) {
            continue;
        }
        let mut counts = vec![0usize; k];
        for &l in labels.iter() {
            counts[l] += 1;
        }
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| counts[labels[*i]] > 1)
            .map(|(i, p)| (i, squared_distance(p, &centroids[labels[i]])))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((i, _)) = farthest {
            labels[i] = cluster;
            centroids[cluster] = points[i].clone();
        }
    }
}
