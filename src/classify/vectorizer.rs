//! TF-IDF vectorization over tokenized review text.
//!
//! The vocabulary is capped at the most frequent terms across the training
//! corpus (ties broken alphabetically for determinism), IDF is smoothed,
//! and output vectors are L2-normalized.

use ndarray::{Array1, Array2};
use std::collections::HashMap;
use tracing::debug;

/// Default vocabulary cap, matching the aggregator contract
pub const DEFAULT_MAX_FEATURES: usize = 200;

/// TF-IDF vectorizer with a fixed-size vocabulary.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Term -> column index
    vocabulary: HashMap<String, usize>,
    /// Column index -> term
    terms: Vec<String>,
    /// Smoothed inverse document frequency per column
    idf: Vec<f64>,
    /// Vocabulary size cap
    max_features: usize,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            max_features: DEFAULT_MAX_FEATURES,
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    /// Build the vocabulary and IDF table from a tokenized corpus.
    pub fn fit(&mut self, documents: &[Vec<String>]) {
        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for doc in documents {
            let mut seen: Vec<&str> = Vec::new();
            for term in doc {
                *term_counts.entry(term).or_insert(0) += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term);
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        // Keep the top max_features terms by corpus frequency
        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        // Alphabetical column order for a stable feature space
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        self.vocabulary.clear();
        self.terms.clear();
        for (idx, (term, _)) in ranked.iter().enumerate() {
            self.vocabulary.insert(term.to_string(), idx);
            self.terms.push(term.to_string());
        }

        let n_docs = documents.len() as f64;
        self.idf = self
            .terms
            .iter()
            .map(|term| {
                let df = *doc_freq.get(term.as_str()).unwrap_or(&0) as f64;
                ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0
            })
            .collect();

        debug!(
            "Fitted vocabulary of {} terms over {} documents",
            self.terms.len(),
            documents.len()
        );
    }

    /// Transform one tokenized document into an L2-normalized TF-IDF vector.
    pub fn transform(&self, document: &[String]) -> Array1<f64> {
        let mut vector = Array1::<f64>::zeros(self.terms.len());
        for term in document {
            if let Some(&idx) = self.vocabulary.get(term) {
                vector[idx] += 1.0;
            }
        }
        for (idx, value) in vector.iter_mut().enumerate() {
            *value *= self.idf[idx];
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.mapv_inplace(|x| x / norm);
        }
        vector
    }

    /// Transform a corpus into a dense document-term matrix.
    pub fn transform_matrix(&self, documents: &[Vec<String>]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((documents.len(), self.terms.len()));
        for (row, doc) in documents.iter().enumerate() {
            matrix.row_mut(row).assign(&self.transform(doc));
        }
        matrix
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
