//! Similarity metrics over interest vectors, and the heat-weight mapping
//! that turns similarity into render intensity.

use crate::vector::InterestVector;
use tracing::error;

/// Cosine similarity between two interest vectors.
///
/// Returns 0.0 (not an error) when either vector is entirely zero.
///
/// A length mismatch also returns 0.0, but is additionally logged at error
/// level: lengths only differ when the vocabulary changed between versions
/// and a stale vector is being compared, which is a configuration bug worth
/// surfacing - distinct from an honest zero-similarity result.
pub fn cosine_similarity(a: &InterestVector, b: &InterestVector) -> f64 {
    if a.len() != b.len() {
        error!(
            len_a = a.len(),
            len_b = b.len(),
            "interest vector length mismatch; vocabulary version skew"
        );
        return 0.0;
    }

    let norm_a = a.values().norm();
    let norm_b = b.values().norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.values().dot(b.values()) / (norm_a * norm_b)
}

/// Diversity of a vector in [0, 1]: normalized Shannon entropy over the
/// non-zero, non-negative-clamped component magnitudes.
///
/// 0.0 when fewer than 2 components are non-zero (a single dominant
/// interest has no diversity to measure).
pub fn diversity(v: &InterestVector) -> f64 {
    let magnitudes: Vec<f64> = v
        .values()
        .iter()
        .map(|c| c.max(0.0))
        .filter(|c| *c > 0.0)
        .collect();

    if magnitudes.len() < 2 {
        return 0.0;
    }

    let total: f64 = magnitudes.iter().sum();
    let entropy: f64 = magnitudes
        .iter()
        .map(|m| {
            let p = m / total;
            -p * p.ln()
        })
        .sum();

    entropy / (magnitudes.len() as f64).ln()
}

/// Parameters for the similarity -> heat-weight mapping.
#[derive(Debug, Clone, Copy)]
pub struct HeatWeightParams {
    /// Linear gain applied to similarity
    pub gain: f64,

    /// Bias added after gain
    pub bias: f64,

    /// Minimum weight. Dissimilar viewers still see *faint* presence; a
    /// hard zero would leak information by absence.
    pub floor: f64,
}

impl Default for HeatWeightParams {
    fn default() -> Self {
        Self {
            gain: 0.7,
            bias: 0.25,
            floor: 0.15,
        }
    }
}

/// Maps a similarity score to a render heat weight in [floor, 1].
pub fn heat_weight(similarity: f64, params: &HeatWeightParams) -> f64 {
    (params.gain * similarity + params.bias).clamp(params.floor, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interests::Vocabulary;
    use crate::vector::encode;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn vec_of(pairs: &[(&str, f64)]) -> InterestVector {
        let weights: HashMap<String, f64> =
            pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect();
        encode(&weights, &Vocabulary::builtin())
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = vec_of(&[("cafe", 4.0), ("park", 2.0), ("music", 1.0)]);
        assert_relative_eq!(cosine_similarity(&v, &v), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        let v = vec_of(&[("cafe", 4.0)]);
        let zero = InterestVector::zeros(v.len());
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_length_mismatch_returns_zero() {
        let v = vec_of(&[("cafe", 4.0)]);
        let skewed = InterestVector::zeros(v.len() + 3);
        assert_eq!(cosine_similarity(&v, &skewed), 0.0);
    }

    #[test]
    fn test_disjoint_interests_orthogonal() {
        let a = vec_of(&[("cafe", 5.0)]);
        let b = vec_of(&[("sports", 5.0)]);
        assert_relative_eq!(cosine_similarity(&a, &b), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diversity_single_component_is_zero() {
        let v = vec_of(&[("cafe", 5.0)]);
        assert_eq!(diversity(&v), 0.0);

        let zero = InterestVector::zeros(24);
        assert_eq!(diversity(&zero), 0.0);
    }

    #[test]
    fn test_diversity_uniform_is_one() {
        // Equal weights spread across terms -> maximum entropy
        let v = vec_of(&[("cafe", 2.0), ("bar", 2.0), ("park", 2.0), ("art", 2.0)]);
        assert_relative_eq!(diversity(&v), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diversity_skew_reduces_entropy() {
        let uniform = vec_of(&[("cafe", 2.0), ("bar", 2.0), ("park", 2.0)]);
        let skewed = vec_of(&[("cafe", 8.0), ("bar", 1.0), ("park", 1.0)]);
        assert!(diversity(&skewed) < diversity(&uniform));
    }

    #[test]
    fn test_heat_weight_floor_and_ceiling() {
        let params = HeatWeightParams::default();

        // Totally dissimilar (or negative) viewers still see faint presence
        assert_eq!(heat_weight(0.0, &params), 0.25);
        assert_eq!(heat_weight(-1.0, &params), params.floor);

        // High similarity saturates at 1.0
        assert_eq!(heat_weight(2.0, &params), 1.0);
    }

    #[test]
    fn test_heat_weight_monotonic() {
        let params = HeatWeightParams::default();
        let mut prev = heat_weight(-1.0, &params);
        for i in 0..=20 {
            let s = -1.0 + i as f64 * 0.1;
            let w = heat_weight(s, &params);
            assert!(w >= prev);
            prev = w;
        }
    }
}
