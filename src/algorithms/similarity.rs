use super::pivot::PivotMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Square cosine-similarity matrix over one axis of a pivot.
///
/// `ids` is sorted ascending and indexes both rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<i64>,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    pub fn empty() -> Self {
        Self {
            ids: Vec::new(),
            values: Array2::zeros((0, 0)),
        }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, a: i64, b: i64) -> Option<f64> {
        Some(self.values[[self.position(a)?, self.position(b)?]])
    }

    /// Every other id ranked by similarity to `id`, highest first.
    ///
    /// Equal scores keep axis order, so ties resolve to the lower id. `id`
    /// itself is never part of the result. Unknown ids yield nothing.
    pub fn ranked_neighbors(&self, id: i64) -> Vec<(i64, f64)> {
        let Some(row) = self.position(id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<(i64, f64)> = self
            .values
            .row(row)
            .iter()
            .zip(self.ids.iter())
            .filter(|&(_, &other)| other != id)
            .map(|(&score, &other)| (other, score))
            .collect();

        // sort_by is stable
        neighbors.sort_by(|a, b| b.1.total_cmp(&a.1));
        neighbors
    }
}

impl Default for SimilarityMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

/// User-user similarity over pivot rows.
pub fn user_similarity(pivot: &PivotMatrix) -> SimilarityMatrix {
    let filled = pivot.filled();
    SimilarityMatrix {
        ids: pivot.user_ids().to_vec(),
        values: cosine_similarity_matrix(filled.view()),
    }
}

/// Item-item similarity over pivot columns.
pub fn item_similarity(pivot: &PivotMatrix) -> SimilarityMatrix {
    let filled = pivot.filled();
    SimilarityMatrix {
        ids: pivot.item_ids().to_vec(),
        values: cosine_similarity_matrix(filled.t()),
    }
}

/// Pairwise cosine similarity between the rows of `vectors`.
///
/// Rows with zero norm score 0 against everything, themselves included.
/// Only the upper triangle is computed; the lower one is mirrored from it.
pub fn cosine_similarity_matrix(vectors: ArrayView2<f64>) -> Array2<f64> {
    let n = vectors.nrows();
    let units: Vec<Option<Array1<f64>>> = vectors.axis_iter(Axis(0)).map(unit_vector).collect();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i..n)
                .map(|j| match (&units[i], &units[j]) {
                    (Some(_), Some(_)) if i == j => 1.0,
                    (Some(a), Some(b)) => a.dot(b),
                    _ => 0.0,
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let mut similarity = Array2::zeros((n, n));
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, score) in row.into_iter().enumerate() {
            let j = i + offset;
            similarity[[i, j]] = score;
            similarity[[j, i]] = score;
        }
    }
    similarity
}

/// Cosine similarity of two vectors; 0 when either has zero norm.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    match (unit_vector(a), unit_vector(b)) {
        (Some(a), Some(b)) => a.dot(&b),
        _ => 0.0,
    }
}

/// `v` scaled to unit length, or `None` for a zero vector.
///
/// Dividing by the largest magnitude first keeps the squared norm from
/// overflowing for large ratings.
fn unit_vector(v: ArrayView1<f64>) -> Option<Array1<f64>> {
    let scale = v.iter().fold(0.0_f64, |max, x| max.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    let scaled = v.mapv(|x| x / scale);
    let norm = scaled.dot(&scaled).sqrt();
    Some(scaled / norm)
}
