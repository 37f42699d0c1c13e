//! Interest aggregation - merging weighted tags from pluggable sources.
//!
//! Every integration (ratings, check-ins, photo clustering, music history,
//! content filtering) is modeled as one capability: it can produce a map of
//! weighted tags. The aggregator treats all sources identically, so adding
//! an integration never changes this module.
//!
//! Per-source reliability scales and the synonym map are configuration
//! data, not logic: they live in literal tables here and can be replaced
//! wholesale by the embedding application.

use crate::error::CoreError;
use std::collections::HashMap;

/// Capability trait for an interest data source.
///
/// Implementations are external collaborators (OAuth integrations, on-device
/// scanners); the aggregator only ever pulls their current tag counts.
pub trait InterestSource: Send + Sync {
    /// Stable source name, used to look up its reliability scale.
    fn name(&self) -> &str;

    /// Current weighted tags. Raw, un-normalized; counts are fine.
    fn interest_tags(&self) -> HashMap<String, f64>;
}

/// Per-source reliability scales.
///
/// Explicit signals (user ratings) weigh more than inferred signals (photo
/// clustering). The content-safety category carries a *negative* scale: its
/// tags deprioritize vocabulary terms rather than boost them, which is a
/// deliberate mechanism, not an error state.
#[derive(Debug, Clone)]
pub struct SourceWeights {
    scales: HashMap<String, f64>,
}

impl SourceWeights {
    /// Creates an empty table; unknown sources default to a scale of 1.0.
    pub fn empty() -> Self {
        Self {
            scales: HashMap::new(),
        }
    }

    /// Sets the scale for a source.
    pub fn with_scale(mut self, source: &str, scale: f64) -> Self {
        self.scales.insert(source.to_string(), scale);
        self
    }

    /// Returns the scale for a source (1.0 if unknown).
    pub fn scale_for(&self, source: &str) -> f64 {
        self.scales.get(source).copied().unwrap_or(1.0)
    }
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::empty()
            .with_scale("ratings", 1.5)
            .with_scale("checkins", 1.2)
            .with_scale("music", 1.0)
            .with_scale("photos", 0.8)
            .with_scale("content_filter", -1.0)
    }
}

/// Static synonym table applied before vocabulary membership is checked.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    map: HashMap<&'static str, &'static str>,
}

impl SynonymTable {
    /// Creates an empty table (normalization is lowercasing only).
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// The built-in synonym map for the default vocabulary.
    pub fn builtin() -> Self {
        let map = HashMap::from([
            ("coffee", "cafe"),
            ("coffeeshop", "cafe"),
            ("coffee shop", "cafe"),
            ("espresso", "cafe"),
            ("pub", "bar"),
            ("tavern", "bar"),
            ("brewery", "bar"),
            ("gardens", "park"),
            ("green space", "park"),
            ("playground", "park"),
            ("gym", "fitness"),
            ("workout", "fitness"),
            ("yoga", "fitness"),
            ("concerts", "music"),
            ("gigs", "music"),
            ("vinyl", "music"),
            ("galleries", "art"),
            ("painting", "art"),
            ("bookstore", "books"),
            ("reading", "books"),
            ("restaurants", "food"),
            ("dining", "food"),
            ("brunch", "food"),
            ("clubbing", "nightlife"),
            ("hiking", "outdoors"),
            ("camping", "outdoors"),
            ("cinema", "film"),
            ("movies", "film"),
        ]);
        Self { map }
    }

    /// Normalizes a raw tag: lowercase, trim, then synonym-map.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        match self.map.get(lowered.as_str()) {
            Some(canonical) => (*canonical).to_string(),
            None => lowered,
        }
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Closed, ordered tag vocabulary.
///
/// The term order is the interest-vector index order, so it must be stable
/// across encodings for vectors to be comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Creates a vocabulary from an ordered term list.
    pub fn new<I, S>(terms: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(CoreError::EmptyVocabulary);
        }

        let mut index = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                return Err(CoreError::DuplicateVocabularyTerm(term.clone()));
            }
        }
        Ok(Self { terms, index })
    }

    /// The built-in product vocabulary.
    pub fn builtin() -> Self {
        Self::new([
            "cafe",
            "bar",
            "park",
            "fitness",
            "music",
            "art",
            "books",
            "food",
            "nightlife",
            "outdoors",
            "sports",
            "tech",
            "film",
            "theater",
            "shopping",
            "travel",
            "games",
            "wellness",
            "pets",
            "photography",
            "dance",
            "history",
            "nature",
            "community",
        ])
        .expect("builtin vocabulary is non-empty and unique")
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the vocabulary has no terms (unreachable after construction).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Membership check for a normalized tag.
    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Index of a normalized tag, if present.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Term at an index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Iterates terms in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Merges weighted tags from all sources into one accumulated map.
///
/// Each raw tag is normalized first; tags outside the vocabulary are
/// silently dropped. Per-source counts are multiplied by that source's
/// reliability scale before summation, so the result may hold negative
/// totals (deprioritization). The key set is always a subset of the
/// vocabulary.
pub fn aggregate(
    sources: &[&dyn InterestSource],
    weights: &SourceWeights,
    synonyms: &SynonymTable,
    vocab: &Vocabulary,
) -> HashMap<String, f64> {
    let mut accumulated: HashMap<String, f64> = HashMap::new();

    for source in sources {
        let scale = weights.scale_for(source.name());
        for (raw_tag, count) in source.interest_tags() {
            let tag = synonyms.normalize(&raw_tag);
            if !vocab.contains(&tag) {
                continue;
            }
            *accumulated.entry(tag).or_insert(0.0) += count * scale;
        }
    }

    accumulated
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource {
        name: &'static str,
        tags: Vec<(&'static str, f64)>,
    }

    impl InterestSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }
        fn interest_tags(&self) -> HashMap<String, f64> {
            self.tags
                .iter()
                .map(|(t, c)| (t.to_string(), *c))
                .collect()
        }
    }

    #[test]
    fn test_synonyms_and_case_folded_before_membership() {
        let src = FakeSource {
            name: "checkins",
            tags: vec![("Coffee", 3.0), ("ESPRESSO", 1.0), ("cafe", 2.0)],
        };
        let out = aggregate(
            &[&src],
            &SourceWeights::empty(),
            &SynonymTable::builtin(),
            &Vocabulary::builtin(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out["cafe"], 6.0);
    }

    #[test]
    fn test_out_of_vocabulary_dropped_silently() {
        let src = FakeSource {
            name: "photos",
            tags: vec![("quantum chromodynamics", 9.0), ("park", 1.0)],
        };
        let out = aggregate(
            &[&src],
            &SourceWeights::empty(),
            &SynonymTable::builtin(),
            &Vocabulary::builtin(),
        );

        assert_eq!(out.len(), 1);
        assert!(out.contains_key("park"));
    }

    #[test]
    fn test_per_source_scaling() {
        let ratings = FakeSource {
            name: "ratings",
            tags: vec![("bar", 2.0)],
        };
        let photos = FakeSource {
            name: "photos",
            tags: vec![("bar", 2.0)],
        };
        let out = aggregate(
            &[&ratings, &photos],
            &SourceWeights::default(),
            &SynonymTable::builtin(),
            &Vocabulary::builtin(),
        );

        // 2.0 * 1.5 + 2.0 * 0.8
        assert!((out["bar"] - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_negative_scale_can_collapse_totals() {
        let music = FakeSource {
            name: "music",
            tags: vec![("nightlife", 1.0)],
        };
        let filter = FakeSource {
            name: "content_filter",
            tags: vec![("nightlife", 4.0)],
        };
        let out = aggregate(
            &[&music, &filter],
            &SourceWeights::default(),
            &SynonymTable::builtin(),
            &Vocabulary::builtin(),
        );

        // 1.0 - 4.0: negative totals must survive aggregation
        assert!((out["nightlife"] + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_source_defaults_to_unit_scale() {
        assert_eq!(SourceWeights::default().scale_for("carrier_pigeon"), 1.0);
    }

    #[test]
    fn test_vocabulary_rejects_duplicates_and_empty() {
        assert_eq!(
            Vocabulary::new(Vec::<String>::new()),
            Err(CoreError::EmptyVocabulary)
        );
        assert_eq!(
            Vocabulary::new(["cafe", "cafe"]),
            Err(CoreError::DuplicateVocabularyTerm("cafe".to_string()))
        );
    }

    #[test]
    fn test_vocabulary_order_is_index_order() {
        let vocab = Vocabulary::new(["a", "b", "c"]).unwrap();
        assert_eq!(vocab.index_of("b"), Some(1));
        assert_eq!(vocab.term(2), Some("c"));
    }
}
