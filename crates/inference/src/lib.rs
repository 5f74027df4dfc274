//! # TextCAD Inference
//!
//! Turns short natural-language phrases ("red sphere", "3 cubes", "house")
//! into ordered lists of parametric 3D primitives.
//!
//! ## Architecture
//!
//! ```text
//! Phrase
//!     │
//!     ├──> Multi-object detection
//!     │    ├─> Conjunction  ("cube and sphere")
//!     │    ├─> Quantity     ("3 cubes")
//!     │    ├─> Composite    ("house", "table", "snowman")
//!     │    └─> Stack        ("stack 3 cubes")
//!     │
//!     ├──> Per-object prediction
//!     │    ├─> Statistical: TF-IDF → classifier + ridge regressors
//!     │    └─> Rules: keyword tables
//!     │
//!     └──> ShapeParameters[] (shape, size, radius, height, color, position)
//! ```
//!
//! The statistical strategy is only available once the corpus holds enough
//! examples; until then every phrase is answered by the keyword rules.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use textcad_inference::{InferenceConfig, JsonFileStore, ShapeService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(JsonFileStore::new("training_data.json"));
//!     let service = ShapeService::open(store, InferenceConfig::default()).await?;
//!
//!     let outcome = service.parse("cube and sphere");
//!     for object in &outcome.objects {
//!         println!("{} at {:?}", object.shape, object.position);
//!     }
//!     Ok(())
//! }
//! ```

mod classifier;
mod config;
mod corpus;
mod error;
mod extractor;
mod palette;
mod predictor;
mod regressor;
mod rules;
mod service;
mod types;
mod vectorizer;

pub use classifier::ShapeClassifier;
pub use config::InferenceConfig;
pub use corpus::{Corpus, CorpusStore, JsonFileStore, MemoryStore};
pub use error::{InferenceError, Result};
pub use extractor::{
    interpretation, is_multi_object, CompositePart, ExtractionRule, SceneExtractor, COMPOSITES,
    EXTRACTION_RULES,
};
pub use palette::{resolve_color, COLOR_VOCABULARY, DEFAULT_COLOR};
pub use predictor::{PredictionStrategy, ShapePredictor, PREDICTION_CHAIN};
pub use regressor::RidgeRegressor;
pub use rules::predict_by_rules;
pub use service::{ParseOutcome, ServiceHealth, ShapeService};
pub use types::{Position, ShapeExample, ShapeKind, ShapeParameters, MAX_COLOR};
pub use vectorizer::TfidfVectorizer;
