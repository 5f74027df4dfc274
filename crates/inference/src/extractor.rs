//! Multi-object phrase handling.
//!
//! Detection decides whether a phrase names several objects at all; if it
//! does, [`EXTRACTION_RULES`] are tried in order and the first rule that
//! matches produces the whole scene. Later rules never run once an earlier
//! one has matched.

use crate::predictor::ShapePredictor;
use crate::types::{Position, ShapeParameters};
use once_cell::sync::Lazy;
use regex::Regex;

static MULTI_OBJECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d+\s+(?:spheres|cubes|cylinders|cones|toruses|tori|balls|boxes|tubes)\b",
        r"\w\s+and\s+\w",
        r"with\s+(?:a|an|\d+)\b",
        r"stack",
        r"multiple",
        r"several",
        r"above",
        r"below",
        r"next to",
        r"on top",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid multi-object pattern"))
    .collect()
});

// The optional leading word lets "stack <n> <noun>" fall through to the stack rule.
static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+\s+)?(\d+)\s+(sphere|cube|cylinder|cone|torus|ball|box|tube)s?")
        .expect("valid quantity pattern")
});

static STACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"stack\s+(\d+)\s+(\w+)").expect("valid stack pattern"));

const CONJUNCTION: &str = " and ";
const STACK_KEYWORD: &str = "stack";
const ROW_SPACING: f64 = 2.0;

/// One primitive of a named assembly
#[derive(Debug, Clone, Copy)]
pub struct CompositePart {
    pub phrase: &'static str,
    pub position: Position,
    /// Applied to size and radius, not height
    pub scale: f64,
}

const fn part(phrase: &'static str, x: f64, y: f64, z: f64, scale: f64) -> CompositePart {
    CompositePart {
        phrase,
        position: Position::new(x, y, z),
        scale,
    }
}

/// Named assemblies, matched by substring in this order
pub const COMPOSITES: [(&str, &[CompositePart]); 3] = [
    (
        "house",
        &[
            part("cube walls", 0.0, 0.0, 0.0, 3.0),
            part("cone roof", 0.0, 2.0, 0.0, 1.5),
        ],
    ),
    (
        "table",
        &[
            part("cube top", 0.0, 2.0, 0.0, 1.0),
            part("cylinder leg", -1.5, 0.0, -1.5, 0.3),
            part("cylinder leg", 1.5, 0.0, -1.5, 0.3),
            part("cylinder leg", -1.5, 0.0, 1.5, 0.3),
            part("cylinder leg", 1.5, 0.0, 1.5, 0.3),
        ],
    ),
    (
        "snowman",
        &[
            part("large sphere", 0.0, 0.0, 0.0, 2.0),
            part("sphere", 0.0, 2.5, 0.0, 1.5),
            part("small sphere", 0.0, 4.2, 0.0, 1.0),
        ],
    ),
];

/// Multi-object extraction rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// "cube and sphere": one object per segment along X
    Conjunction,
    /// "3 cubes": a row of identical objects centred on the origin
    Quantity,
    /// "house": a fixed assembly from [`COMPOSITES`]
    Composite,
    /// "stack 3 cubes": objects piled along Y
    Stack,
}

pub const EXTRACTION_RULES: [ExtractionRule; 4] = [
    ExtractionRule::Conjunction,
    ExtractionRule::Quantity,
    ExtractionRule::Composite,
    ExtractionRule::Stack,
];

/// Whether the phrase describes more than one object.
///
/// Composite names count as multi-object descriptions on their own.
#[must_use]
pub fn is_multi_object(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MULTI_OBJECT_PATTERNS.iter().any(|re| re.is_match(&lowered))
        || COMPOSITES.iter().any(|(name, _)| lowered.contains(name))
}

/// Turns a phrase into an ordered scene using a [`ShapePredictor`] per object
#[derive(Debug, Clone, Copy)]
pub struct SceneExtractor<'a> {
    predictor: &'a ShapePredictor,
    max_objects: usize,
}

impl<'a> SceneExtractor<'a> {
    #[must_use]
    pub fn new(predictor: &'a ShapePredictor) -> Self {
        Self {
            predictor,
            max_objects: predictor.config().max_objects,
        }
    }

    /// Predict every object the phrase describes.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<ShapeParameters> {
        if !is_multi_object(text) {
            return vec![self.predictor.predict(text)];
        }

        let lowered = text.to_lowercase();
        EXTRACTION_RULES
            .iter()
            .find_map(|rule| self.apply(*rule, &lowered))
            .unwrap_or_else(|| vec![self.predictor.predict(&lowered)])
    }

    /// Run one rule against lower-cased text; `None` when it does not match.
    #[must_use]
    pub fn apply(&self, rule: ExtractionRule, lowered: &str) -> Option<Vec<ShapeParameters>> {
        match rule {
            ExtractionRule::Conjunction => self.conjunction(lowered),
            ExtractionRule::Quantity => self.quantity(lowered),
            ExtractionRule::Composite => self.composite(lowered),
            ExtractionRule::Stack => self.stack(lowered),
        }
    }

    fn conjunction(&self, text: &str) -> Option<Vec<ShapeParameters>> {
        if !text.contains(CONJUNCTION) {
            return None;
        }
        Some(
            text.split(CONJUNCTION)
                .enumerate()
                .map(|(idx, segment)| {
                    self.predictor
                        .predict(segment.trim())
                        .with_position(Position::new(idx as f64 * ROW_SPACING, 0.0, 0.0))
                })
                .collect(),
        )
    }

    fn quantity(&self, text: &str) -> Option<Vec<ShapeParameters>> {
        let caps = QUANTITY_RE.captures_iter(text).find(|caps| {
            caps.get(1)
                .map_or(true, |lead| lead.as_str().trim() != STACK_KEYWORD)
        })?;
        let count = parse_count(&caps[2]);
        let noun = &caps[3];

        // the row is centred on the requested count, even when it gets capped
        let offset = count as f64;
        Some(
            (0..count.min(self.max_objects))
                .map(|idx| {
                    self.predictor.predict(noun).with_position(Position::new(
                        idx as f64 * ROW_SPACING - offset,
                        0.0,
                        0.0,
                    ))
                })
                .collect(),
        )
    }

    fn composite(&self, text: &str) -> Option<Vec<ShapeParameters>> {
        let (_, parts) = COMPOSITES.iter().find(|(name, _)| text.contains(name))?;
        let floor = self.predictor.config().min_dimension;
        Some(
            parts
                .iter()
                .map(|part| {
                    // scaling can undercut the predictor's floor
                    self.predictor
                        .predict(part.phrase)
                        .with_position(part.position)
                        .scaled(part.scale)
                        .clamped(floor)
                })
                .collect(),
        )
    }

    fn stack(&self, text: &str) -> Option<Vec<ShapeParameters>> {
        let caps = STACK_RE.captures(text)?;
        let count = parse_count(&caps[1]).min(self.max_objects);
        let noun = &caps[2];

        let mut y = 0.0;
        let mut objects = Vec::with_capacity(count);
        for _ in 0..count {
            let object = self
                .predictor
                .predict(noun)
                .with_position(Position::new(0.0, y, 0.0));
            y += object.size * 2.0;
            objects.push(object);
        }
        Some(objects)
    }
}

// Digits only, so the count is never negative; overflow saturates and is capped later.
fn parse_count(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

/// Human summary of an extraction result
#[must_use]
pub fn interpretation(count: usize) -> String {
    format!("Generated {count} object(s)")
}
