use crate::error::Result;
use crate::palette::DEFAULT_COLOR;
use crate::types::{ShapeExample, ShapeKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Ordered training examples informing the predictor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    examples: Vec<ShapeExample>,
}

impl Corpus {
    #[must_use]
    pub fn new(examples: Vec<ShapeExample>) -> Self {
        Self { examples }
    }

    /// Built-in starter set covering every shape kind
    #[must_use]
    pub fn seed() -> Self {
        use ShapeKind::{Cone, Cube, Cylinder, Sphere, Torus};

        let rows: [(&str, ShapeKind, f64, f64, f64, u32); 18] = [
            ("red sphere", Sphere, 1.0, 1.0, 2.0, 0xff4444),
            ("large ball", Sphere, 2.0, 2.0, 2.0, DEFAULT_COLOR),
            ("small orb", Sphere, 0.5, 0.5, 2.0, DEFAULT_COLOR),
            ("blue globe", Sphere, 1.5, 1.5, 2.0, 0x4444ff),
            ("cube", Cube, 1.0, 1.0, 2.0, DEFAULT_COLOR),
            ("big box", Cube, 2.0, 1.0, 2.0, DEFAULT_COLOR),
            ("small block", Cube, 0.5, 1.0, 2.0, DEFAULT_COLOR),
            ("green square", Cube, 1.0, 1.0, 2.0, 0x44ff44),
            ("cylinder", Cylinder, 1.0, 1.0, 3.0, DEFAULT_COLOR),
            ("tall tube", Cylinder, 1.0, 0.8, 4.0, DEFAULT_COLOR),
            ("pipe", Cylinder, 1.0, 0.5, 3.0, DEFAULT_COLOR),
            ("column", Cylinder, 1.5, 1.0, 5.0, DEFAULT_COLOR),
            ("cone", Cone, 1.0, 1.0, 2.5, DEFAULT_COLOR),
            ("triangle", Cone, 1.0, 1.0, 2.0, DEFAULT_COLOR),
            ("pyramid", Cone, 1.5, 1.5, 3.0, DEFAULT_COLOR),
            ("torus", Torus, 1.0, 1.0, 2.0, DEFAULT_COLOR),
            ("donut", Torus, 1.2, 1.2, 2.0, DEFAULT_COLOR),
            ("ring", Torus, 0.8, 0.8, 2.0, DEFAULT_COLOR),
        ];

        Self::new(
            rows.into_iter()
                .map(|(text, shape, size, radius, height, color)| {
                    ShapeExample::new(text, shape, size, radius, height, color)
                })
                .collect(),
        )
    }

    pub fn push(&mut self, example: ShapeExample) {
        self.examples.push(example);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    #[must_use]
    pub fn examples(&self) -> &[ShapeExample] {
        &self.examples
    }
}

/// Persistence backend for the corpus. Saves replace the stored corpus wholesale.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet
    async fn load(&self) -> Result<Option<Corpus>>;

    async fn save(&self, corpus: &Corpus) -> Result<()>;

    /// Human-readable location for logs
    fn describe(&self) -> String;
}

/// Corpus stored as a pretty-printed JSON array of examples
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Corpus>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let examples: Vec<ShapeExample> = serde_json::from_slice(&bytes)?;
        Ok(Some(Corpus::new(examples)))
    }

    async fn save(&self, corpus: &Corpus) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(corpus.examples())?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Mutex<Option<Corpus>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_corpus(corpus: Corpus) -> Self {
        Self {
            stored: Mutex::new(Some(corpus)),
        }
    }
}

#[async_trait]
impl CorpusStore for MemoryStore {
    async fn load(&self) -> Result<Option<Corpus>> {
        Ok(self
            .stored
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, corpus: &Corpus) -> Result<()> {
        *self
            .stored
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(corpus.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
