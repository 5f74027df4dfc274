//! Deterministic keyword rules used while no model is trained.

use crate::palette::resolve_color;
use crate::types::{Position, ShapeKind, ShapeParameters};

/// Shape synonyms; the first group with a hit decides the kind
pub const SHAPE_KEYWORDS: [(ShapeKind, &[&str]); 5] = [
    (ShapeKind::Sphere, &["sphere", "ball", "orb", "globe"]),
    (ShapeKind::Cube, &["cube", "box", "block", "square"]),
    (ShapeKind::Cylinder, &["cylinder", "tube", "pipe", "column"]),
    (ShapeKind::Cone, &["cone", "pyramid", "triangle"]),
    (ShapeKind::Torus, &["torus", "donut", "ring"]),
];

/// Size adjectives and the size they imply
pub const SIZE_KEYWORDS: [(f64, &[&str]); 2] = [
    (2.0, &["large", "big", "huge"]),
    (0.5, &["small", "tiny", "little"]),
];

pub const DEFAULT_SHAPE: ShapeKind = ShapeKind::Sphere;
pub const DEFAULT_SIZE: f64 = 1.0;
pub const TALL_HEIGHT: f64 = 2.5;
pub const DEFAULT_HEIGHT: f64 = 2.0;

#[must_use]
pub fn classify_shape(lowered: &str) -> ShapeKind {
    SHAPE_KEYWORDS
        .iter()
        .find(|(_, words)| contains_any(lowered, words))
        .map_or(DEFAULT_SHAPE, |(kind, _)| *kind)
}

#[must_use]
pub fn classify_size(lowered: &str) -> f64 {
    SIZE_KEYWORDS
        .iter()
        .find(|(_, words)| contains_any(lowered, words))
        .map_or(DEFAULT_SIZE, |(size, _)| *size)
}

#[must_use]
pub const fn default_height(kind: ShapeKind) -> f64 {
    if kind.is_tall() {
        TALL_HEIGHT
    } else {
        DEFAULT_HEIGHT
    }
}

/// Resolve one object from keywords alone.
#[must_use]
pub fn predict_by_rules(text: &str, confidence: f64) -> ShapeParameters {
    let lowered = text.to_lowercase();
    let shape = classify_shape(&lowered);
    let size = classify_size(&lowered);

    ShapeParameters {
        shape,
        size,
        radius: size,
        height: default_height(shape),
        color: resolve_color(&lowered),
        position: Position::ORIGIN,
        confidence,
    }
}

// Substring semantics: "boxes" hits "box", "ring" also hits inside "string".
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_sphere() {
        let params = predict_by_rules("red sphere", 0.7);
        assert_eq!(params.shape, ShapeKind::Sphere);
        assert_eq!(params.color, 0xff4444);
        assert_eq!(params.size, 1.0);
        assert_eq!(params.radius, 1.0);
        assert_eq!(params.height, 2.0);
        assert_eq!(params.confidence, 0.7);
        assert_eq!(params.position, Position::ORIGIN);
    }

    #[test]
    fn large_ball_doubles_size_and_radius() {
        let params = predict_by_rules("Large BALL", 0.7);
        assert_eq!(params.shape, ShapeKind::Sphere);
        assert_eq!(params.size, 2.0);
        assert_eq!(params.radius, 2.0);
    }

    #[test]
    fn tall_kinds_get_taller_default_height() {
        assert_eq!(predict_by_rules("pipe", 0.7).height, 2.5);
        assert_eq!(predict_by_rules("pyramid", 0.7).height, 2.5);
        assert_eq!(predict_by_rules("donut", 0.7).height, 2.0);
    }

    #[test]
    fn group_priority_wins_over_word_order() {
        // cube group is checked before the cone group
        assert_eq!(classify_shape("triangle on a box"), ShapeKind::Cube);
        // sphere group is checked before the cube group
        assert_eq!(classify_shape("cube with a ball"), ShapeKind::Sphere);
        assert_eq!(classify_size("tiny but huge"), 2.0);
    }

    #[test]
    fn empty_or_unknown_text_uses_defaults() {
        for text in ["", "   ", "something else"] {
            let params = predict_by_rules(text, 0.7);
            assert_eq!(params.shape, ShapeKind::Sphere);
            assert_eq!(params.size, 1.0);
            assert_eq!(params.color, crate::palette::DEFAULT_COLOR);
        }
    }

    #[test]
    fn small_cone_halves_size() {
        let params = predict_by_rules("small green cone", 0.7);
        assert_eq!(params.shape, ShapeKind::Cone);
        assert_eq!(params.size, 0.5);
        assert_eq!(params.radius, 0.5);
        assert_eq!(params.color, 0x44ff44);
    }
}
