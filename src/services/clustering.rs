//! K-means clustering over standardized numeric columns.
//!
//! Columns are z-scored with the sample standard deviation before fitting.
//! The RNG is seeded so identical input always produces identical labels.

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, Axis};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::errors::AppError;
use crate::services::tabular;

pub const KMEANS_SEED: u64 = 42;
pub const MAX_CLUSTERS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    pub n_clusters: usize,
    pub cluster_centers: Vec<Vec<f64>>,
    pub cluster_labels: Vec<usize>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

/// Stack equal-length columns into a rows x columns matrix.
pub fn to_matrix(columns: &[Vec<f64>]) -> Result<Array2<f64>, AppError> {
    let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
    if columns.iter().any(|c| c.len() != n_rows) {
        return Err(AppError::Analysis("Columns have different lengths".to_string()));
    }

    Ok(Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| columns[c][r]))
}

/// Z-score every column. Fails on missing values or constant columns.
pub fn standardize(columns: &[(String, Vec<f64>)]) -> Result<Array2<f64>, AppError> {
    let mut scaled = Vec::with_capacity(columns.len());

    for (name, values) in columns {
        if values.iter().any(|v| v.is_nan()) {
            return Err(AppError::Analysis(format!(
                "Column '{}' has missing values; clustering needs complete rows",
                name
            )));
        }
        let mean = tabular::mean(values);
        let std = tabular::sample_std(values);
        if std.is_nan() || std == 0.0 {
            return Err(AppError::Analysis(format!(
                "Column '{}' has no variance; cannot normalize for clustering",
                name
            )));
        }
        scaled.push(values.iter().map(|v| (v - mean) / std).collect::<Vec<f64>>());
    }

    to_matrix(&scaled)
}

/// Fit k-means with k = min(3, rows).
pub fn kmeans(data: &Array2<f64>) -> Result<ClusteringResult, AppError> {
    let k = MAX_CLUSTERS.min(data.nrows());
    if k == 0 {
        return Err(AppError::Analysis("No rows to cluster".to_string()));
    }

    let dataset = DatasetBase::from(data.clone());
    let rng = Xoshiro256Plus::seed_from_u64(KMEANS_SEED);

    let model = KMeans::params_with_rng(k, rng)
        .max_n_iterations(300)
        .tolerance(1e-4)
        .fit(&dataset)
        .map_err(|e| AppError::Analysis(format!("K-means failed: {}", e)))?;

    let labels: Array1<usize> = model.predict(data);
    let centroids = model.centroids();

    let inertia = data
        .outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| {
            row.iter()
                .zip(centroids.row(label).iter())
                .map(|(x, c)| (x - c).powi(2))
                .sum::<f64>()
        })
        .sum();

    Ok(ClusteringResult {
        n_clusters: k,
        cluster_centers: centroids.outer_iter().map(|row| row.to_vec()).collect(),
        cluster_labels: labels.to_vec(),
        inertia,
    })
}

/// Project rows onto the first `n_components` principal axes.
///
/// Eigenvectors of the covariance matrix come from power iteration with
/// deflation; each axis is sign-normalized so its largest loading is positive.
pub fn principal_components(data: &Array2<f64>, n_components: usize) -> Array2<f64> {
    let n_rows = data.nrows();
    let n_cols = data.ncols();
    let mut projected = Array2::<f64>::zeros((n_rows, n_components));
    if n_rows < 2 || n_cols == 0 {
        return projected;
    }

    let means = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_cols));
    let centered = data - &means;
    let mut cov = centered.t().dot(&centered) / (n_rows - 1) as f64;

    for component in 0..n_components.min(n_cols) {
        let axis = dominant_eigenvector(&cov);
        let eigenvalue = axis.dot(&cov.dot(&axis));

        projected
            .column_mut(component)
            .assign(&centered.dot(&axis));

        // Deflate so the next pass finds the next axis.
        let outer = axis
            .view()
            .insert_axis(Axis(1))
            .dot(&axis.view().insert_axis(Axis(0)));
        cov = cov - outer * eigenvalue;
    }

    projected
}

fn dominant_eigenvector(matrix: &Array2<f64>) -> Array1<f64> {
    let n = matrix.nrows();
    let mut v = Array1::from_shape_fn(n, |i| 1.0 + i as f64);
    let norm = v.dot(&v).sqrt();
    v /= norm;

    for _ in 0..500 {
        let next = matrix.dot(&v);
        let norm = next.dot(&next).sqrt();
        if norm < 1e-12 {
            return Array1::zeros(n);
        }
        let next = next / norm;
        let delta = (&next - &v).mapv(f64::abs).sum();
        v = next;
        if delta < 1e-10 {
            break;
        }
    }

    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn named(cols: Vec<Vec<f64>>) -> Vec<(String, Vec<f64>)> {
        cols.into_iter()
            .enumerate()
            .map(|(i, c)| (format!("c{}", i), c))
            .collect()
    }

    #[test]
    fn test_to_matrix_is_row_major() {
        let m = to_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m, array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);
    }

    #[test]
    fn test_standardize() {
        let m = standardize(&named(vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]])).unwrap();
        assert!((m[[0, 0]] + 1.0).abs() < 1e-12);
        assert!((m[[1, 0]]).abs() < 1e-12);
        assert!((m[[2, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_rejects_missing_and_constant() {
        let missing = named(vec![vec![1.0, f64::NAN], vec![1.0, 2.0]]);
        assert!(matches!(standardize(&missing), Err(AppError::Analysis(_))));

        let constant = named(vec![vec![5.0, 5.0, 5.0], vec![1.0, 2.0, 3.0]]);
        assert!(matches!(standardize(&constant), Err(AppError::Analysis(_))));
    }

    #[test]
    fn test_kmeans_separates_groups() {
        let data = standardize(&named(vec![
            vec![1.0, 1.1, 0.9, 10.0, 10.2, 9.8, 20.0, 20.1, 19.9],
            vec![1.0, 0.9, 1.1, 10.0, 9.9, 10.1, 20.0, 19.8, 20.2],
        ]))
        .unwrap();

        let result = kmeans(&data).unwrap();
        assert_eq!(result.n_clusters, 3);
        assert_eq!(result.cluster_labels.len(), 9);
        assert_eq!(result.cluster_centers.len(), 3);
        assert_eq!(result.cluster_centers[0].len(), 2);

        let labels = &result.cluster_labels;
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[6], labels[8]);
        assert_ne!(labels[0], labels[3]);
        assert_ne!(labels[3], labels[6]);
        assert!(result.inertia >= 0.0 && result.inertia < 1.0);
    }

    #[test]
    fn test_kmeans_is_deterministic() {
        let data = standardize(&named(vec![
            vec![1.0, 4.0, 2.0, 8.0, 5.0],
            vec![3.0, 1.0, 7.0, 2.0, 6.0],
        ]))
        .unwrap();
        assert_eq!(kmeans(&data).unwrap(), kmeans(&data).unwrap());
    }

    #[test]
    fn test_kmeans_caps_clusters_at_row_count() {
        let data = standardize(&named(vec![vec![1.0, 2.0], vec![4.0, 3.0]])).unwrap();
        let result = kmeans(&data).unwrap();
        assert_eq!(result.n_clusters, 2);
        assert!(result.inertia.abs() < 1e-9);
    }

    #[test]
    fn test_principal_components_follow_main_axis() {
        // Points on the line y = 2x, z = 0: all variance on one axis.
        let data = array![[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [3.0, 6.0, 0.0], [4.0, 8.0, 0.0]];
        let pcs = principal_components(&data, 2);
        assert_eq!(pcs.dim(), (4, 2));
        assert!(pcs[[0, 0]] < pcs[[3, 0]]);
        for r in 0..4 {
            assert!(pcs[[r, 1]].abs() < 1e-6);
        }
    }
}
