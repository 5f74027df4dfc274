use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest value a 24-bit RGB color can take
pub const MAX_COLOR: u32 = 0x00ff_ffff;

/// Primitive solid kinds understood by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Sphere,
    Cube,
    Cylinder,
    Cone,
    Torus,
}

impl ShapeKind {
    /// All kinds in canonical class order
    pub const ALL: [Self; 5] = [
        Self::Sphere,
        Self::Cube,
        Self::Cylinder,
        Self::Cone,
        Self::Torus,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Cube => "cube",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
        }
    }

    /// Kinds whose default height is taller than the rest
    #[must_use]
    pub const fn is_tall(self) -> bool {
        matches!(self, Self::Cylinder | Self::Cone)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| InferenceError::invalid_example(format!("unknown shape '{s}'")))
    }
}

/// Point in scene space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// A labelled training example
///
/// `position` is stored as a `[x, y, z]` array, which is the layout of the
/// persisted corpus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeExample {
    pub text: String,
    pub shape: ShapeKind,
    pub size: f64,
    pub radius: f64,
    pub height: f64,
    /// 24-bit RGB
    pub color: u32,
    #[serde(default)]
    pub position: [f64; 3],
}

impl ShapeExample {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        shape: ShapeKind,
        size: f64,
        radius: f64,
        height: f64,
        color: u32,
    ) -> Self {
        Self {
            text: text.into(),
            shape,
            size,
            radius,
            height,
            color,
            position: [0.0; 3],
        }
    }

    /// Reject examples that would poison the corpus
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(InferenceError::invalid_example("text must not be empty"));
        }

        for (name, value) in [
            ("size", self.size),
            ("radius", self.radius),
            ("height", self.height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(InferenceError::invalid_example(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if self.color > MAX_COLOR {
            return Err(InferenceError::invalid_example(format!(
                "color {:#x} exceeds 24-bit RGB",
                self.color
            )));
        }

        if !Position::from(self.position).is_finite() {
            return Err(InferenceError::invalid_example(
                "position components must be finite",
            ));
        }

        Ok(())
    }
}

/// Inferred parameters for one object in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    pub shape: ShapeKind,
    pub size: f64,
    pub radius: f64,
    pub height: f64,
    /// 24-bit RGB
    pub color: u32,
    pub position: Position,
    /// Within `[0, 1]`
    pub confidence: f64,
}

impl ShapeParameters {
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Scale footprint (size and radius); height is left untouched
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.size *= factor;
        self.radius *= factor;
        self
    }

    /// Raise size, radius and height to at least `floor`
    #[must_use]
    pub fn clamped(mut self, floor: f64) -> Self {
        self.size = clamp_dimension(self.size, floor);
        self.radius = clamp_dimension(self.radius, floor);
        self.height = clamp_dimension(self.height, floor);
        self
    }
}

fn clamp_dimension(value: f64, floor: f64) -> f64 {
    if value.is_nan() {
        floor
    } else {
        value.max(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_kind_roundtrips_through_lowercase_names() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.as_str().parse::<ShapeKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
        assert!("pyramid".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn example_accepts_integer_dimensions_and_missing_position() {
        let example: ShapeExample = serde_json::from_str(
            r#"{"text": "cube", "shape": "cube", "size": 1, "radius": 1, "height": 2, "color": 6717162}"#,
        )
        .unwrap();
        assert_eq!(example.size, 1.0);
        assert_eq!(example.position, [0.0; 3]);
        assert!(example.validate().is_ok());
    }

    #[test]
    fn example_validation_rejects_degenerate_values() {
        let base = ShapeExample::new("ball", ShapeKind::Sphere, 1.0, 1.0, 2.0, 0xff4444);

        let mut blank = base.clone();
        blank.text = "   ".to_string();
        assert!(blank.validate().is_err());

        let mut negative = base.clone();
        negative.radius = -1.0;
        assert!(negative.validate().is_err());

        let mut bright = base.clone();
        bright.color = 0x0100_0000;
        assert!(bright.validate().is_err());

        let mut far = base;
        far.position = [f64::INFINITY, 0.0, 0.0];
        assert!(far.validate().is_err());
    }

    #[test]
    fn parameters_serialize_position_as_object() {
        let params = ShapeParameters {
            shape: ShapeKind::Cone,
            size: 1.0,
            radius: 1.0,
            height: 2.5,
            color: 0x667eea,
            position: Position::new(2.0, 0.0, 0.0),
            confidence: 0.7,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["position"]["x"], 2.0);
        assert_eq!(value["shape"], "cone");
    }

    #[test]
    fn clamping_and_scaling() {
        let params = ShapeParameters {
            shape: ShapeKind::Cube,
            size: -3.0,
            radius: f64::NAN,
            height: 0.05,
            color: 0,
            position: Position::ORIGIN,
            confidence: 1.0,
        }
        .clamped(0.1);
        assert_eq!((params.size, params.radius, params.height), (0.1, 0.1, 0.1));

        let scaled = params.scaled(3.0);
        assert!((scaled.size - 0.3).abs() < 1e-12);
        assert!((scaled.radius - 0.3).abs() < 1e-12);
        assert_eq!(scaled.height, 0.1);
    }
}
