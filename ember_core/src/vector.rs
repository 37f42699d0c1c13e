//! Interest vector encoding - fixed-length numeric profile over the
//! vocabulary.
//!
//! The weighting is an *approximation* of TF-IDF that uses the accumulated
//! weight itself as a document-frequency proxy (`ln(|V| / max(1, w))`), not
//! a true corpus statistic. This is an explicit simplification: the client
//! has no corpus, only its own aggregated tags.

use crate::interests::Vocabulary;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed-length real-valued profile over a closed vocabulary.
///
/// Always unit-L2-normalized after construction; the all-zero vector occurs
/// only when no tags matched. Recomputed wholesale on any source change -
/// the previous value is replaced, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestVector {
    values: DVector<f64>,
}

impl InterestVector {
    /// The all-zero vector for a vocabulary size.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: DVector::zeros(len),
        }
    }

    /// Vector length (equals vocabulary size).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for the zero-length vector.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// True if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// L2 magnitude (1.0 or 0.0 by the construction invariant).
    pub fn magnitude(&self) -> f64 {
        self.values.norm()
    }

    /// Component at a vocabulary index.
    pub fn component(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Borrow the underlying nalgebra vector.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub(crate) fn from_values(values: DVector<f64>) -> Self {
        Self { values }
    }
}

/// Encodes accumulated tag weights into a unit interest vector.
///
/// For each vocabulary term in fixed order:
/// `tf = w / total`, `idf_proxy = ln(|V| / max(1, w))`, component =
/// `tf * idf_proxy`; absent terms are 0. `total` is the sum of *absolute*
/// weights, so negative accumulated weights (content-safety
/// deprioritization) produce negative components instead of being clamped
/// away. The filled vector is L2-normalized; a zero vector is returned
/// unchanged rather than divided by zero.
pub fn encode(tag_weights: &HashMap<String, f64>, vocab: &Vocabulary) -> InterestVector {
    let total: f64 = tag_weights.values().map(|w| w.abs()).sum();
    if total == 0.0 {
        return InterestVector::zeros(vocab.len());
    }

    let vocab_len = vocab.len() as f64;
    let mut values = DVector::zeros(vocab.len());
    for (i, term) in vocab.iter().enumerate() {
        if let Some(&weight) = tag_weights.get(term) {
            let tf = weight / total;
            let idf_proxy = (vocab_len / weight.max(1.0)).ln();
            values[i] = tf * idf_proxy;
        }
    }

    let norm = values.norm();
    if norm > 0.0 {
        values /= norm;
    }
    InterestVector::from_values(values)
}

/// Ordinal data-quality category for an encoded vector.
///
/// Purely descriptive; thresholds are monotonic, nothing downstream branches
/// on it beyond display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VectorQuality {
    /// Under 25% combined coverage
    Sparse,
    /// 25-50%
    Partial,
    /// 50-75%
    Good,
    /// 75% and above
    Rich,
}

impl VectorQuality {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            VectorQuality::Sparse => "sparse",
            VectorQuality::Partial => "partial",
            VectorQuality::Good => "good",
            VectorQuality::Rich => "rich",
        }
    }
}

/// Scores coverage: the mean of the active-source ratio and the
/// tag-coverage ratio, bucketed at 25/50/75%.
pub fn assess_quality(
    tag_weights: &HashMap<String, f64>,
    active_sources: usize,
    total_sources: usize,
    vocab: &Vocabulary,
) -> VectorQuality {
    let source_ratio = if total_sources > 0 {
        active_sources.min(total_sources) as f64 / total_sources as f64
    } else {
        0.0
    };
    let matched = tag_weights.keys().filter(|t| vocab.contains(t)).count();
    let coverage_ratio = matched as f64 / vocab.len() as f64;

    let score = (source_ratio + coverage_ratio) / 2.0;
    if score < 0.25 {
        VectorQuality::Sparse
    } else if score < 0.50 {
        VectorQuality::Partial
    } else if score < 0.75 {
        VectorQuality::Good
    } else {
        VectorQuality::Rich
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_cafe_park_bar_scenario() {
        let vocab = Vocabulary::new(["cafe", "park", "bar"]).unwrap();
        let v = encode(&weights(&[("cafe", 4.0), ("park", 2.0)]), &vocab);

        let cafe = v.component(0).unwrap();
        let park = v.component(1).unwrap();
        let bar = v.component(2).unwrap();

        assert_eq!(bar, 0.0);
        assert!(cafe != 0.0 && park != 0.0);
        // Higher count keeps "cafe" at or above "park" in magnitude.
        // Signs can differ with a tiny vocabulary (the idf proxy is
        // ln(|V|/w), negative once w > |V|); only magnitude is contractual.
        assert!(cafe.abs() >= park.abs());
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_length_or_exactly_zero() {
        let vocab = Vocabulary::builtin();

        let encoded = encode(&weights(&[("cafe", 3.0), ("music", 5.0)]), &vocab);
        assert_relative_eq!(encoded.magnitude(), 1.0, epsilon = 1e-9);

        let nothing = encode(&weights(&[]), &vocab);
        assert!(nothing.is_zero());
        assert_eq!(nothing.len(), vocab.len());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let vocab = Vocabulary::builtin();
        let w = weights(&[("cafe", 4.0), ("park", 2.0), ("film", 1.0)]);
        assert_eq!(encode(&w, &vocab), encode(&w, &vocab));
    }

    #[test]
    fn test_negative_weight_survives_as_negative_component() {
        let vocab = Vocabulary::builtin();
        let v = encode(&weights(&[("cafe", 3.0), ("nightlife", -2.0)]), &vocab);

        let cafe = v.component(vocab.index_of("cafe").unwrap()).unwrap();
        let nightlife = v.component(vocab.index_of("nightlife").unwrap()).unwrap();

        assert!(cafe > 0.0);
        assert!(
            nightlife < 0.0,
            "deprioritized term must stay negative, not be clamped"
        );
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quality_buckets() {
        let vocab = Vocabulary::new(["a", "b", "c", "d"]).unwrap();

        // 0 sources, 0 tags
        assert_eq!(assess_quality(&weights(&[]), 0, 4, &vocab), VectorQuality::Sparse);

        // 2/4 sources, 1/4 coverage -> 0.375
        assert_eq!(
            assess_quality(&weights(&[("a", 1.0)]), 2, 4, &vocab),
            VectorQuality::Partial
        );

        // 3/4 sources, 2/4 coverage -> 0.625
        assert_eq!(
            assess_quality(&weights(&[("a", 1.0), ("b", 1.0)]), 3, 4, &vocab),
            VectorQuality::Good
        );

        // full sources, full coverage
        assert_eq!(
            assess_quality(
                &weights(&[("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 1.0)]),
                4,
                4,
                &vocab
            ),
            VectorQuality::Rich
        );
    }

    #[test]
    fn test_quality_with_no_sources_configured() {
        let vocab = Vocabulary::new(["a"]).unwrap();
        // total_sources = 0 must not divide by zero
        assert_eq!(assess_quality(&weights(&[]), 0, 0, &vocab), VectorQuality::Sparse);
    }
}
