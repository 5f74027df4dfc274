use serde::{Deserialize, Serialize};

/// Tuning knobs for the text-to-shape pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Corpus size below which the statistical models are not fitted
    pub min_training_examples: usize,

    /// Vocabulary cap for the TF-IDF vectorizer
    pub max_features: usize,

    /// Upper bound on objects produced by quantity and stack phrases
    pub max_objects: usize,

    /// Floor applied to size, radius and height
    pub min_dimension: f64,

    /// Confidence reported by the keyword rules
    pub rule_confidence: f64,

    /// Full-batch gradient descent passes for the shape classifier
    pub epochs: usize,

    /// Step size for the shape classifier
    pub learning_rate: f64,

    /// L2 penalty for the shape classifier
    pub l2: f64,

    /// Penalty the size/radius/height regressors fall back to when the
    /// training rows are linearly dependent
    pub ridge_alpha: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_training_examples: 5,
            max_features: 100,
            max_objects: 10,
            min_dimension: 0.1,
            rule_confidence: 0.7,
            epochs: 400,
            learning_rate: 1.0,
            l2: 1e-4,
            ridge_alpha: 0.01,
        }
    }
}

impl InferenceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_training_examples == 0 {
            return Err("min_training_examples must be > 0".to_string());
        }

        if self.max_features == 0 {
            return Err("max_features must be > 0".to_string());
        }

        if self.max_objects == 0 {
            return Err("max_objects must be > 0".to_string());
        }

        if !(self.min_dimension.is_finite() && self.min_dimension > 0.0) {
            return Err(format!(
                "min_dimension must be a positive number, got {}",
                self.min_dimension
            ));
        }

        if !(0.0..=1.0).contains(&self.rule_confidence) {
            return Err(format!(
                "rule_confidence must be within [0, 1], got {}",
                self.rule_confidence
            ));
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            ));
        }

        if self.l2 < 0.0 {
            return Err("regularization penalties cannot be negative".to_string());
        }

        // a zero penalty leaves duplicated phrases unsolvable
        if !(self.ridge_alpha.is_finite() && self.ridge_alpha > 0.0) {
            return Err(format!(
                "ridge_alpha must be a positive number, got {}",
                self.ridge_alpha
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(InferenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = InferenceConfig::default();
        config.max_features = 0;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.min_dimension = 0.0;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.rule_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.ridge_alpha = -1.0;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.ridge_alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InferenceConfig = serde_json::from_str(r#"{"max_objects": 4}"#).unwrap();
        assert_eq!(config.max_objects, 4);
        assert_eq!(config.max_features, 100);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<InferenceConfig>(r#"{"max_object": 4}"#).is_err());
    }
}
