use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Lower-cased word tokens of two or more characters
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// TF-IDF bag-of-terms vectorizer with a capped vocabulary.
///
/// Terms are weighted by raw count times smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`; every row is L2-normalised.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    #[must_use]
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Array1::zeros(0),
        }
    }

    /// Learn vocabulary and idf weights, then return the document-term matrix.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Array2<f64> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let mut term_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                *term_counts.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        // most frequent first; BTreeMap order keeps ties alphabetical
        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_docs = documents.len() as f64;
        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| ((*term).to_string(), idx))
            .collect();
        self.idf = kept
            .iter()
            .map(|term| {
                let df = *doc_freq.get(term).unwrap_or(&0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut matrix: Array2<f64> = Array2::zeros((tokenized.len(), self.vocabulary.len()));
        for (row, tokens) in tokenized.iter().enumerate() {
            matrix.row_mut(row).assign(&self.weigh(tokens));
        }
        matrix
    }

    /// Vectorize a single document against the fitted vocabulary.
    #[must_use]
    pub fn transform(&self, text: &str) -> Array1<f64> {
        self.weigh(&tokenize(text))
    }

    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn weigh(&self, tokens: &[String]) -> Array1<f64> {
        let mut row: Array1<f64> = Array1::zeros(self.vocabulary.len());
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                row[idx] += self.idf[idx];
            }
        }
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
        row
    }
}
