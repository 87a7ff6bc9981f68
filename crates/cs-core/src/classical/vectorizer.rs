//! TF-IDF vectorizer over word n-grams

use crate::error::{Result, SentimentError};
use ndarray::Array1;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Sparse feature vector: `(feature index, weight)` sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// Lowercase and split into tokens of two or more word characters
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Word n-grams of every length in `ngram_range`, joined by single spaces
pub fn ngrams(tokens: &[String], ngram_range: (usize, usize)) -> Vec<String> {
    let (min_n, max_n) = ngram_range;
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    out
}

/// Maps text to a fixed-width, L2-normalized TF-IDF vector.
///
/// The vocabulary is learned by [`fit`](Self::fit) and never changes
/// afterwards; terms unseen at fit time are ignored by
/// [`transform`](Self::transform).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    max_features: Option<usize>,
    /// term -> feature index, indices assigned in alphabetical order
    vocabulary: BTreeMap<String, usize>,
    /// Smoothed inverse document frequency per feature index
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    pub fn new(ngram_range: (usize, usize), max_features: Option<usize>) -> Self {
        Self {
            ngram_range,
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Array1::zeros(0),
        }
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        ngrams(&tokenize(text), self.ngram_range)
    }

    /// Learn vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(SentimentError::Training(
                "cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        // term -> (document frequency, corpus frequency)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for doc in documents {
            let terms = self.analyze(doc.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                let entry = counts.entry(term.clone()).or_insert((0, 0));
                entry.1 += 1;
                if seen.insert(term) {
                    entry.0 += 1;
                }
            }
        }

        if counts.is_empty() {
            return Err(SentimentError::Training(
                "empty vocabulary; documents contain no tokens".to_string(),
            ));
        }

        let mut terms: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        if let Some(limit) = self.max_features {
            if terms.len() > limit {
                terms.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(&b.0)));
                terms.truncate(limit);
            }
        }
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = documents.len() as f64;
        let doc_freq: Array1<f64> = terms.iter().map(|(_, (df, _))| *df as f64).collect();
        self.idf = doc_freq.mapv(|df| ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        tracing::debug!(
            "Fitted vectorizer on {} documents, {} features",
            documents.len(),
            self.idf.len()
        );
        Ok(())
    }

    /// Vectorize one document
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }

    /// Vectorize many documents
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    /// Number of features (vocabulary size)
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Content hash identifying this exact fitted state
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.ngram_range.0 as u64).to_le_bytes());
        hasher.update(&(self.ngram_range.1 as u64).to_le_bytes());
        for (term, idx) in &self.vocabulary {
            hasher.update(term.as_bytes());
            hasher.update(&[0]);
            hasher.update(&(*idx as u64).to_le_bytes());
        }
        for idf in self.idf.iter() {
            hasher.update(&idf.to_bits().to_le_bytes());
        }
        hasher.finalize().to_hex()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(tokenize("I love it, a LOT!"), strings(&["love", "it", "lot"]));
        assert!(tokenize("a b c !!").is_empty());
    }

    #[test]
    fn test_ngrams() {
        let tokens = strings(&["not", "very", "good"]);
        assert_eq!(
            ngrams(&tokens, (1, 2)),
            strings(&["not", "very", "good", "not very", "very good"])
        );
        assert_eq!(ngrams(&tokens, (2, 2)), strings(&["not very", "very good"]));
        assert_eq!(ngrams(&tokens, (4, 5)), Vec::<String>::new());
    }

    #[test]
    fn test_fit_assigns_alphabetical_indices() {
        let mut vec = TfidfVectorizer::new((1, 1), None);
        vec.fit(&["zebra apple", "mango apple"]).unwrap();
        let vocab = vec.vocabulary();
        assert_eq!(vocab["apple"], 0);
        assert_eq!(vocab["mango"], 1);
        assert_eq!(vocab["zebra"], 2);
        assert_eq!(vec.n_features(), 3);
    }

    #[test]
    fn test_idf_is_lower_for_common_terms() {
        let mut vec = TfidfVectorizer::new((1, 1), None);
        vec.fit(&["good movie", "good song", "bad movie"]).unwrap();
        let idf = |t: &str| vec.idf[vec.vocabulary()[t]];
        assert!(idf("good") < idf("song"));
        // smooth idf: ln((1 + 3) / (1 + 2)) + 1
        assert!((idf("good") - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vec = TfidfVectorizer::new((1, 1), Some(2));
        vec.fit(&["spam spam spam eggs", "spam eggs ham", "toast"])
            .unwrap();
        let vocab = vec.vocabulary();
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains_key("spam"));
        assert!(vocab.contains_key("eggs"));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let mut vec = TfidfVectorizer::new((1, 2), None);
        vec.fit(&["great video loved it", "terrible video"]).unwrap();
        let v = vec.transform("great great video");
        let norm: f64 = v.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(v.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_transform_unknown_terms_is_empty() {
        let mut vec = TfidfVectorizer::new((1, 2), None);
        vec.fit(&["hello world"]).unwrap();
        assert!(vec.transform("completely different").is_empty());
        assert!(vec.transform("").is_empty());
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        let mut vec = TfidfVectorizer::new((1, 1), None);
        let empty: [&str; 0] = [];
        assert!(vec.fit(&empty).is_err());
        assert!(vec.fit(&["!", "a"]).is_err());
    }

    #[test]
    fn test_fingerprint_tracks_fitted_state() {
        let mut a = TfidfVectorizer::new((1, 2), None);
        a.fit(&["one two", "three"]).unwrap();
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.fit(&["one two", "four"]).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_serde_round_trip_preserves_transform() {
        let mut vec = TfidfVectorizer::new((1, 2), Some(100));
        vec.fit(&["the best thing ever", "the worst thing", "meh"]).unwrap();
        let json = serde_json::to_string(&vec).unwrap();
        let loaded: TfidfVectorizer = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, vec);
        assert_eq!(loaded.fingerprint(), vec.fingerprint());
        assert_eq!(
            loaded.transform("the best worst thing"),
            vec.transform("the best worst thing")
        );
    }
}
