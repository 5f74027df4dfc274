use anyhow::Result;
use serde::{Deserialize, Serialize};
use textcad_inference::{interpretation, ShapeExample, ShapeParameters};

pub const NO_TEXT_PROVIDED: &str = "No text provided";
pub const HEALTHY: &str = "healthy";
pub const RETRAINED: &str = "retrained";

/// Body of `POST /parse-text`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ParseTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl ParseTextRequest {
    /// The phrase to parse; `None` when missing, null or blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParseTextResponse {
    pub objects: Vec<ShapeParameters>,
    pub count: usize,
    pub interpretation: String,
    pub ml_powered: bool,
}

impl ParseTextResponse {
    #[must_use]
    pub fn new(objects: Vec<ShapeParameters>, ml_powered: bool) -> Self {
        let count = objects.len();
        Self {
            objects,
            count,
            interpretation: interpretation(count),
            ml_powered,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub models_trained: bool,
    pub training_examples: usize,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy(models_trained: bool, training_examples: usize) -> Self {
        Self {
            status: HEALTHY.to_string(),
            models_trained,
            training_examples,
        }
    }
}

/// Body of `POST /retrain`; an empty body is the same as no example
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RetrainRequest {
    #[serde(default)]
    pub example: Option<ShapeExample>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RetrainResponse {
    pub status: String,
    pub total_examples: usize,
}

impl RetrainResponse {
    #[must_use]
    pub fn retrained(total_examples: usize) -> Self {
        Self {
            status: RETRAINED.to_string(),
            total_examples,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn invalid_json(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("Invalid JSON request: {detail}"))
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use textcad_inference::{Position, ShapeKind};

    #[test]
    fn blank_text_counts_as_missing() {
        for body in [r"{}", r#"{"text": null}"#, r#"{"text": ""}"#, r#"{"text": "  \n"}"#] {
            let request: ParseTextRequest = serde_json::from_str(body).unwrap();
            assert_eq!(request.text(), None, "{body}");
        }
        let request: ParseTextRequest = serde_json::from_str(r#"{"text": "cube"}"#).unwrap();
        assert_eq!(request.text(), Some("cube"));
    }

    #[test]
    fn parse_response_layout() {
        let object = ShapeParameters {
            shape: ShapeKind::Cube,
            size: 1.0,
            radius: 1.0,
            height: 2.0,
            color: 0x667eea,
            position: Position::new(2.0, 0.0, 0.0),
            confidence: 0.7,
        };
        let response = ParseTextResponse::new(vec![object], false);
        let value: serde_json::Value = serde_json::from_str(&serialize_json(&response).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "objects": [{
                    "shape": "cube",
                    "size": 1.0,
                    "radius": 1.0,
                    "height": 2.0,
                    "color": 0x667eea,
                    "position": {"x": 2.0, "y": 0.0, "z": 0.0},
                    "confidence": 0.7
                }],
                "count": 1,
                "interpretation": "Generated 1 object(s)",
                "ml_powered": false
            })
        );
    }

    #[test]
    fn retrain_request_example_is_optional() {
        let empty: RetrainRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.example.is_none());

        let request: RetrainRequest = serde_json::from_str(
            r#"{"example": {"text": "pipe", "shape": "cylinder", "size": 1, "radius": 0.5, "height": 3, "color": 6717162}}"#,
        )
        .unwrap();
        let example = request.example.unwrap();
        assert_eq!(example.shape, ShapeKind::Cylinder);
        assert_eq!(example.position, [0.0; 3]);
    }

    #[test]
    fn status_bodies() {
        assert_eq!(
            serde_json::to_value(HealthResponse::healthy(true, 18)).unwrap(),
            json!({"status": "healthy", "models_trained": true, "training_examples": 18})
        );
        assert_eq!(
            serde_json::to_value(RetrainResponse::retrained(19)).unwrap(),
            json!({"status": "retrained", "total_examples": 19})
        );
        assert_eq!(
            ErrorResponse::invalid_json("EOF").error,
            "Invalid JSON request: EOF"
        );
    }
}
