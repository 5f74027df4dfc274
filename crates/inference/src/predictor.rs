//! Single-phrase prediction.
//!
//! Prediction walks [`PREDICTION_CHAIN`] and returns the first strategy that
//! produces a result. The statistical strategy only answers once models
//! have been fitted; the keyword rules always answer.

use crate::classifier::ShapeClassifier;
use crate::config::InferenceConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::palette::resolve_color;
use crate::regressor::RidgeRegressor;
use crate::rules::predict_by_rules;
use crate::types::{Position, ShapeExample, ShapeParameters};
use crate::vectorizer::TfidfVectorizer;

/// Ways of turning one phrase into one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStrategy {
    /// TF-IDF features fed to the fitted classifier and regressors
    Statistical,
    /// Keyword rules
    Rules,
}

pub const PREDICTION_CHAIN: [PredictionStrategy; 2] =
    [PredictionStrategy::Statistical, PredictionStrategy::Rules];

#[derive(Debug, Clone)]
struct TrainedModels {
    vectorizer: TfidfVectorizer,
    classifier: ShapeClassifier,
    size: RidgeRegressor,
    radius: RidgeRegressor,
    height: RidgeRegressor,
}

impl TrainedModels {
    fn fit(corpus: &Corpus, config: &InferenceConfig) -> Result<Self> {
        let examples = corpus.examples();
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();

        let mut vectorizer = TfidfVectorizer::new(config.max_features);
        let features = vectorizer.fit_transform(&texts);

        let labels: Vec<_> = examples.iter().map(|e| e.shape).collect();
        let classifier = ShapeClassifier::fit(
            &features,
            &labels,
            config.epochs,
            config.learning_rate,
            config.l2,
        )?;

        let column = |pick: fn(&ShapeExample) -> f64| -> Vec<f64> {
            examples.iter().map(pick).collect()
        };
        let size = RidgeRegressor::fit(&features, &column(|e| e.size), config.ridge_alpha)?;
        let radius = RidgeRegressor::fit(&features, &column(|e| e.radius), config.ridge_alpha)?;
        let height = RidgeRegressor::fit(&features, &column(|e| e.height), config.ridge_alpha)?;

        Ok(Self {
            vectorizer,
            classifier,
            size,
            radius,
            height,
        })
    }

    fn predict(&self, text: &str) -> ShapeParameters {
        let features = self.vectorizer.transform(text);
        let (shape, confidence) = self.classifier.predict(&features);

        ShapeParameters {
            shape,
            size: self.size.predict(&features),
            radius: self.radius.predict(&features),
            height: self.height.predict(&features),
            color: resolve_color(text),
            position: Position::ORIGIN,
            confidence,
        }
    }
}

/// Maps one phrase to one [`ShapeParameters`].
///
/// Model state is a pure function of the corpus passed to the last
/// [`ShapePredictor::train`] call.
#[derive(Debug, Clone)]
pub struct ShapePredictor {
    config: InferenceConfig,
    models: Option<TrainedModels>,
}

impl ShapePredictor {
    /// A predictor that answers from the keyword rules only
    #[must_use]
    pub fn untrained(config: InferenceConfig) -> Self {
        Self {
            config,
            models: None,
        }
    }

    /// Refit every model from scratch.
    ///
    /// Corpora smaller than `min_training_examples` leave the predictor
    /// untrained. A fitting failure also leaves it untrained and is returned
    /// to the caller.
    pub fn train(&mut self, corpus: &Corpus) -> Result<bool> {
        self.models = None;
        if corpus.len() < self.config.min_training_examples {
            log::info!(
                "Not enough training data ({} < {}); using keyword rules",
                corpus.len(),
                self.config.min_training_examples
            );
            return Ok(false);
        }

        let models = TrainedModels::fit(corpus, &self.config)?;
        log::info!(
            "Models trained on {} examples ({} terms, {} classes)",
            corpus.len(),
            models.vectorizer.vocabulary_len(),
            models.classifier.classes().len()
        );
        self.models = Some(models);
        Ok(true)
    }

    #[must_use]
    pub const fn is_trained(&self) -> bool {
        self.models.is_some()
    }

    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Predict one object at the origin. Never fails.
    #[must_use]
    pub fn predict(&self, text: &str) -> ShapeParameters {
        PREDICTION_CHAIN
            .iter()
            .find_map(|strategy| self.attempt(*strategy, text))
            .unwrap_or_else(|| predict_by_rules(text, self.config.rule_confidence))
            .clamped(self.config.min_dimension)
    }

    /// Run a single strategy; `None` when it cannot answer.
    #[must_use]
    pub fn attempt(&self, strategy: PredictionStrategy, text: &str) -> Option<ShapeParameters> {
        match strategy {
            PredictionStrategy::Statistical => {
                self.models.as_ref().map(|models| models.predict(text))
            }
            PredictionStrategy::Rules => Some(predict_by_rules(text, self.config.rule_confidence)),
        }
    }
}
