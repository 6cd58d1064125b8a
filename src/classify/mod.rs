//! Review-text classification: tokenizer, TF-IDF vectorizer, and the
//! softmax classifier, combined into [`ClusterModel`].
//!
//! The model is fitted on the small human-labeled subset only and then
//! applied to every surviving review. Reviews are scored independently of
//! one another.

pub mod model;
pub mod tokenizer;
pub mod vectorizer;

use crate::error::{ReviewFlowError, Result};
use crate::types::LabeledReview;
use model::SoftmaxClassifier;
use tracing::info;
use vectorizer::TfIdfVectorizer;

pub use tokenizer::tokenize;

/// Fitted vectorizer + classifier pair with its cluster label set.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    vectorizer: TfIdfVectorizer,
    classifier: SoftmaxClassifier,
    labels: Vec<String>,
}

impl ClusterModel {
    /// Fit on the labeled subset. The cluster label set is established here
    /// and stays fixed for the model's lifetime.
    pub fn fit(labeled: &[LabeledReview]) -> Result<Self> {
        if labeled.is_empty() {
            return Err(ReviewFlowError::Training(
                "labeled set is empty".to_string(),
            ));
        }

        let documents: Vec<Vec<String>> =
            labeled.iter().map(|l| tokenize(&l.text)).collect();

        // Label order: first appearance in the labeled set
        let mut labels: Vec<String> = Vec::new();
        let classes: Vec<usize> = labeled
            .iter()
            .map(|l| match labels.iter().position(|known| known == &l.cluster) {
                Some(idx) => idx,
                None => {
                    labels.push(l.cluster.clone());
                    labels.len() - 1
                }
            })
            .collect();

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents);
        if vectorizer.n_terms() == 0 {
            return Err(ReviewFlowError::Training(
                "labeled set yields an empty vocabulary".to_string(),
            ));
        }

        let x = vectorizer.transform_matrix(&documents);
        let mut classifier = SoftmaxClassifier::new(labels.len());
        classifier.fit(&x, &classes);

        info!(
            "Trained cluster model: {} examples, {} terms, {} clusters",
            labeled.len(),
            vectorizer.n_terms(),
            labels.len()
        );

        Ok(Self {
            vectorizer,
            classifier,
            labels,
        })
    }

    /// Cluster label set, in training order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Predict the cluster for one review text.
    pub fn predict(&self, text: &str) -> &str {
        let tokens = tokenize(text);
        let x = self.vectorizer.transform_matrix(&[tokens]);
        let class = self.classifier.predict(&x)[0];
        &self.labels[class]
    }

    /// Predict clusters for a batch of review texts.
    pub fn predict_batch(&self, texts: &[&str]) -> Vec<String> {
        let documents: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();
        let x = self.vectorizer.transform_matrix(&documents);
        self.classifier
            .predict(&x)
            .into_iter()
            .map(|class| self.labels[class].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(text: &str, cluster: &str) -> LabeledReview {
        LabeledReview {
            text: text.to_string(),
            cluster: cluster.to_string(),
        }
    }

    fn training_set() -> Vec<LabeledReview> {
        vec![
            labeled("app crashes constantly after update", "Bugs"),
            labeled("crash on startup every single time", "Bugs"),
            labeled("keeps crashing when I open settings", "Bugs"),
            labeled("love the new design, beautiful interface", "Praise"),
            labeled("great app, love using it every day", "Praise"),
            labeled("beautiful and simple, love it", "Praise"),
            labeled("please add folders and tags support", "Requests"),
            labeled("would be nice to add widgets", "Requests"),
            labeled("add dark scheduling please", "Requests"),
        ]
    }

    #[test]
    fn test_fit_establishes_label_set_in_order() {
        let model = ClusterModel::fit(&training_set()).unwrap();
        assert_eq!(model.labels(), &["Bugs", "Praise", "Requests"]);
    }

    #[test]
    fn test_predict_recovers_training_clusters() {
        let model = ClusterModel::fit(&training_set()).unwrap();
        assert_eq!(model.predict("the app crashes on startup"), "Bugs");
        assert_eq!(model.predict("love the beautiful design"), "Praise");
        assert_eq!(model.predict("please add tags support"), "Requests");
    }

    #[test]
    fn test_predict_batch_matches_single() {
        let model = ClusterModel::fit(&training_set()).unwrap();
        let texts = ["crashing again", "love this app"];
        let batch = model.predict_batch(&texts);
        assert_eq!(batch[0], model.predict(texts[0]));
        assert_eq!(batch[1], model.predict(texts[1]));
    }

    #[test]
    fn test_empty_labeled_set_is_training_error() {
        let err = ClusterModel::fit(&[]).unwrap_err();
        assert!(matches!(err, ReviewFlowError::Training(_)));
    }

    #[test]
    fn test_stopword_only_labeled_set_is_training_error() {
        let set = vec![labeled("the and of", "Noise"), labeled("a an is", "Noise")];
        let err = ClusterModel::fit(&set).unwrap_err();
        assert!(matches!(err, ReviewFlowError::Training(_)));
    }
}
