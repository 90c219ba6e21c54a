use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use itertools::Itertools;

use crate::api::{FoodSuggestion, TrainingItem};
use crate::reference_data::{self, ReferenceDataError};

pub const DEFAULT_MIN_RANKED_RESULTS: usize = 10;
pub const DEFAULT_MAX_RANKED_RESULTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    pub min_results: usize,
    pub max_results: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            min_results: DEFAULT_MIN_RANKED_RESULTS,
            max_results: DEFAULT_MAX_RANKED_RESULTS,
        }
    }
}

impl RankingPolicy {
    /// Number of candidates to return out of `available`:
    /// `min(max(min_results, available), max_results)`, never more than available
    pub fn result_count(&self, available: usize) -> usize {
        available
            .max(self.min_results)
            .min(self.max_results)
            .min(available)
    }
}

pub type SparseVector = BTreeMap<usize, f64>;

/// TF-IDF vectorizer with smoothed idf and L2 normalized rows
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = vec![];

        for document in documents {
            for term in tokenize(document.as_ref()).into_iter().unique() {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(term).or_insert(next_index);
                if index == document_frequency.len() {
                    document_frequency.push(0);
                }
                document_frequency[index] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    /// Projects a document into the fitted feature space, terms unseen during fit are dropped
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *vector.entry(index).or_default() += 1.0;
            }
        }
        for (index, weight) in vector.iter_mut() {
            *weight *= self.idf[*index];
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.values_mut().for_each(|w| *w /= norm);
        }
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Lower-cased tokens of at least two word characters
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(String::from)
        .collect()
}

fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    smaller
        .iter()
        .filter_map(|(index, weight)| larger.get(index).map(|other| weight * other))
        .sum()
}

fn similarity_text(name: &str, description: &str) -> String {
    format!("{} {}", name, description)
}

/// Vectorizer and feature matrix trained on the preference dataset
pub struct PreferenceModel {
    vectorizer: TfidfVectorizer,
    feature_matrix: Vec<SparseVector>,
}

impl PreferenceModel {
    pub fn train(training_items: &[TrainingItem]) -> Self {
        let texts = training_items
            .iter()
            .map(|item| similarity_text(&item.name, &item.description))
            .collect_vec();
        let vectorizer = TfidfVectorizer::fit(&texts);
        let feature_matrix = texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect();
        Self {
            vectorizer,
            feature_matrix,
        }
    }

    /// Highest cosine similarity of the suggestion against any training item, 0 when nothing overlaps
    pub fn score(&self, suggestion: &FoodSuggestion) -> f64 {
        let query = self
            .vectorizer
            .transform(&similarity_text(&suggestion.name, &suggestion.description));
        self.feature_matrix
            .iter()
            .map(|row| cosine_similarity(&query, row))
            .fold(0.0, f64::max)
    }

    /// Sorts candidates by descending score (equal scores keep their order) and keeps
    /// as many as the policy allows
    pub fn rank(
        &self,
        candidates: Vec<FoodSuggestion>,
        policy: &RankingPolicy,
    ) -> Vec<FoodSuggestion> {
        let result_count = policy.result_count(candidates.len());
        candidates
            .into_iter()
            .map(|candidate| {
                let score = self.score(&candidate);
                (candidate, score)
            })
            .sorted_by(|(_, a), (_, b)| b.total_cmp(a))
            .take(result_count)
            .map(|(candidate, _)| candidate)
            .collect()
    }
}

/// Re-ranks generated suggestions against the preference dataset.
/// The dataset is read and the model trained on every call, nothing is kept between requests.
pub struct PreferenceRanker {
    training_data_file: PathBuf,
    policy: RankingPolicy,
}

impl PreferenceRanker {
    pub fn new(training_data_file: PathBuf, policy: RankingPolicy) -> Self {
        Self {
            training_data_file,
            policy,
        }
    }

    pub async fn load_training_items(&self) -> Result<Vec<TrainingItem>, ReferenceDataError> {
        reference_data::load_training_items(&self.training_data_file).await
    }

    pub fn rank(
        &self,
        candidates: Vec<FoodSuggestion>,
        training_items: &[TrainingItem],
    ) -> Vec<FoodSuggestion> {
        let model = PreferenceModel::train(training_items);
        tracing::info!(
            "Ranking {} suggestions against {} training items ({} terms)",
            candidates.len(),
            training_items.len(),
            model.vectorizer.vocabulary_size()
        );
        model.rank(candidates, &self.policy)
    }
}
