use crate::config::InferenceConfig;
use crate::corpus::{Corpus, CorpusStore};
use crate::error::{InferenceError, Result};
use crate::extractor::SceneExtractor;
use crate::predictor::ShapePredictor;
use crate::types::{ShapeExample, ShapeParameters};
use std::sync::Arc;

/// Result of parsing one phrase
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub objects: Vec<ShapeParameters>,
    /// Whether the statistical models answered (as opposed to keyword rules)
    pub ml_powered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHealth {
    pub models_trained: bool,
    pub training_examples: usize,
}

/// Corpus, trained predictor and persistence backend behind one API.
///
/// Callers that share a service across tasks wrap it in a single
/// `RwLock`: [`ShapeService::parse`] only needs `&self`, while
/// [`ShapeService::retrain`] takes `&mut self` for the whole
/// append-train-persist sequence.
pub struct ShapeService {
    store: Arc<dyn CorpusStore>,
    corpus: Corpus,
    predictor: ShapePredictor,
}

impl std::fmt::Debug for ShapeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeService")
            .field("store", &self.store.describe())
            .field("training_examples", &self.corpus.len())
            .field("trained", &self.predictor.is_trained())
            .finish()
    }
}

impl ShapeService {
    /// Load the stored corpus (or the built-in seed) and train on it.
    ///
    /// A missing, unreadable or undersized store is not an error: the seed
    /// corpus is used instead and written back on the next retrain. If the
    /// models cannot be fitted the service starts on the keyword rules.
    pub async fn open(store: Arc<dyn CorpusStore>, config: InferenceConfig) -> Result<Self> {
        config.validate().map_err(InferenceError::invalid_config)?;

        let corpus = match store.load().await {
            Ok(Some(corpus)) if corpus.len() >= config.min_training_examples => {
                log::info!(
                    "Loaded {} training examples from {}",
                    corpus.len(),
                    store.describe()
                );
                corpus
            }
            Ok(Some(corpus)) => {
                log::info!(
                    "{} holds only {} examples; starting from the seed corpus",
                    store.describe(),
                    corpus.len()
                );
                Corpus::seed()
            }
            Ok(None) => {
                log::info!(
                    "No corpus at {}; starting from the seed corpus",
                    store.describe()
                );
                Corpus::seed()
            }
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable corpus at {}: {err}",
                    store.describe()
                );
                Corpus::seed()
            }
        };

        let mut predictor = ShapePredictor::untrained(config);
        if let Err(err) = predictor.train(&corpus) {
            log::warn!("Training failed, answering with keyword rules: {err}");
        }

        Ok(Self {
            store,
            corpus,
            predictor,
        })
    }

    /// Parse a phrase into an ordered scene. Never fails.
    #[must_use]
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let objects = SceneExtractor::new(&self.predictor).extract(text);
        log::debug!("Parsed {text:?} into {} object(s)", objects.len());
        ParseOutcome {
            objects,
            ml_powered: self.predictor.is_trained(),
        }
    }

    /// Append an optional example, retrain from scratch and persist.
    ///
    /// Returns the corpus size afterwards. On any failure the service keeps
    /// its previous corpus and models.
    pub async fn retrain(&mut self, example: Option<ShapeExample>) -> Result<usize> {
        let mut corpus = self.corpus.clone();
        if let Some(example) = example {
            example.validate()?;
            corpus.push(example);
        }

        let mut predictor = ShapePredictor::untrained(self.predictor.config().clone());
        predictor.train(&corpus)?;
        self.store.save(&corpus).await?;

        log::info!(
            "Retrained on {} examples, saved to {}",
            corpus.len(),
            self.store.describe()
        );
        self.corpus = corpus;
        self.predictor = predictor;
        Ok(self.corpus.len())
    }

    #[must_use]
    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            models_trained: self.predictor.is_trained(),
            training_examples: self.corpus.len(),
        }
    }

    #[must_use]
    pub const fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub const fn predictor(&self) -> &ShapePredictor {
        &self.predictor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemoryStore;
    use crate::types::ShapeKind;

    #[tokio::test]
    async fn empty_store_starts_from_seed() {
        let service = ShapeService::open(Arc::new(MemoryStore::new()), InferenceConfig::default())
            .await
            .unwrap();
        assert_eq!(
            service.health(),
            ServiceHealth {
                models_trained: true,
                training_examples: 18
            }
        );
    }

    #[tokio::test]
    async fn undersized_store_is_replaced_by_seed() {
        let small = Corpus::new(Corpus::seed().examples()[..3].to_vec());
        let service = ShapeService::open(
            Arc::new(MemoryStore::with_corpus(small)),
            InferenceConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(service.health().training_examples, 18);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = InferenceConfig {
            max_objects: 0,
            ..InferenceConfig::default()
        };
        let err = ShapeService::open(Arc::new(MemoryStore::new()), config)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn zero_ridge_penalty_is_rejected() {
        let config = InferenceConfig {
            ridge_alpha: 0.0,
            ..InferenceConfig::default()
        };
        let err = ShapeService::open(Arc::new(MemoryStore::new()), config)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn failed_training_starts_on_rules() {
        // the classifier weights blow up under this penalty
        let config = InferenceConfig {
            l2: 1e300,
            ..InferenceConfig::default()
        };
        let service = ShapeService::open(Arc::new(MemoryStore::new()), config)
            .await
            .unwrap();
        assert_eq!(
            service.health(),
            ServiceHealth {
                models_trained: false,
                training_examples: 18
            }
        );
        let outcome = service.parse("red sphere");
        assert!(!outcome.ml_powered);
        assert_eq!(outcome.objects[0].shape, ShapeKind::Sphere);
        assert_eq!(outcome.objects[0].confidence, 0.7);
    }

    #[tokio::test]
    async fn seed_too_small_for_threshold_keeps_rules() {
        let config = InferenceConfig {
            min_training_examples: 50,
            ..InferenceConfig::default()
        };
        let service = ShapeService::open(Arc::new(MemoryStore::new()), config)
            .await
            .unwrap();
        let outcome = service.parse("red sphere");
        assert!(!outcome.ml_powered);
        assert_eq!(outcome.objects[0].confidence, 0.7);
    }

    #[tokio::test]
    async fn retrain_appends_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut service = ShapeService::open(store.clone(), InferenceConfig::default())
            .await
            .unwrap();

        let example = ShapeExample::new("golden tower", ShapeKind::Cylinder, 1.0, 0.6, 6.0, 0xffd700);
        assert_eq!(service.retrain(Some(example.clone())).await.unwrap(), 19);

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.len(), 19);
        assert_eq!(stored.examples().last(), Some(&example));
    }

    #[tokio::test]
    async fn retrain_without_example_still_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut service = ShapeService::open(store.clone(), InferenceConfig::default())
            .await
            .unwrap();
        assert_eq!(service.retrain(None).await.unwrap(), 18);
        assert_eq!(store.load().await.unwrap().unwrap().len(), 18);
    }

    #[tokio::test]
    async fn invalid_example_leaves_service_untouched() {
        let store = Arc::new(MemoryStore::new());
        let mut service = ShapeService::open(store.clone(), InferenceConfig::default())
            .await
            .unwrap();

        let bad = ShapeExample::new("", ShapeKind::Cube, 1.0, 1.0, 1.0, 0);
        let err = service.retrain(Some(bad)).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(service.health().training_examples, 18);
        assert!(store.load().await.unwrap().is_none());
    }
}
