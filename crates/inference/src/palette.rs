//! Keyword color lookup.
//!
//! Color never comes from the statistical models: both prediction paths
//! resolve it here so an explicit color word always wins.

/// Used when the text names no known color
pub const DEFAULT_COLOR: u32 = 0x0066_7eea;

/// Color words in match priority order
pub const COLOR_VOCABULARY: [(&str, u32); 13] = [
    ("red", 0x00ff_4444),
    ("blue", 0x0044_44ff),
    ("green", 0x0044_ff44),
    ("yellow", 0x00ff_ff44),
    ("purple", 0x00ff_44ff),
    ("orange", 0x00ff_8844),
    ("cyan", 0x0044_ffff),
    ("white", 0x00ff_ffff),
    ("black", 0x0022_2222),
    ("pink", 0x00ff_88cc),
    ("brown", 0x008b_4513),
    ("gray", 0x0088_8888),
    ("grey", 0x0088_8888),
];

/// First vocabulary entry contained in the lower-cased text, else [`DEFAULT_COLOR`].
#[must_use]
pub fn resolve_color(text: &str) -> u32 {
    let lowered = text.to_lowercase();
    COLOR_VOCABULARY
        .iter()
        .find(|(name, _)| lowered.contains(name))
        .map_or(DEFAULT_COLOR, |(_, rgb)| *rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_color_word_resolves_to_its_value() {
        for (name, rgb) in COLOR_VOCABULARY {
            assert_eq!(resolve_color(&format!("a {name} thing")), rgb, "{name}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(resolve_color("BLUE Globe"), 0x4444ff);
    }

    #[test]
    fn declaration_order_breaks_ties() {
        // both "red" and "blue" occur; "red" is declared first
        assert_eq!(resolve_color("blue and red"), 0xff4444);
    }

    #[test]
    fn unknown_color_falls_back_to_default() {
        assert_eq!(resolve_color("a shiny cube"), DEFAULT_COLOR);
        assert_eq!(resolve_color(""), DEFAULT_COLOR);
    }
}
