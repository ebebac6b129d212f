// Timeline Builder
// Maps label sets to display tokens and compacts repeated emotions

use crate::models::{LabelScore, LabelSet, TokenMode};
use std::collections::HashMap;

/// Separator between labels inside one display token
const LABEL_SEPARATOR: &str = ", ";
/// Separator between entries in the rendered timeline string
const TIMELINE_SEPARATOR: &str = " → ";
/// Glyph for labels missing from the mapping
const DEFAULT_GLYPH: &str = "❓";

/// Known emotion vocabulary plus a carrier for anything the model adds later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Emotion {
    Anger,
    Joy,
    Sadness,
    Fear,
    Love,
    Surprise,
    Neutral,
    Disgust,
    Other(String),
}

impl Emotion {
    pub fn from_label(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "anger" => Self::Anger,
            "joy" => Self::Joy,
            "sadness" => Self::Sadness,
            "fear" => Self::Fear,
            "love" => Self::Love,
            "surprise" => Self::Surprise,
            "neutral" => Self::Neutral,
            "disgust" => Self::Disgust,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Anger => "anger",
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Fear => "fear",
            Self::Love => "love",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
            Self::Disgust => "disgust",
            Self::Other(s) => s.as_str(),
        }
    }
}

/// Label-to-glyph configuration table with a placeholder for unmapped labels.
#[derive(Debug, Clone)]
pub struct GlyphMap {
    glyphs: HashMap<String, String>,
    default_glyph: String,
}

impl Default for GlyphMap {
    fn default() -> Self {
        let mut glyphs = HashMap::new();
        for (label, glyph) in [
            ("anger", "😡"),
            ("joy", "😄"),
            ("sadness", "😢"),
            ("fear", "😱"),
            ("love", "❤️"),
            ("surprise", "😲"),
            ("neutral", "😐"),
            ("disgust", "🤢"),
        ] {
            glyphs.insert(label.to_string(), glyph.to_string());
        }
        Self {
            glyphs,
            default_glyph: DEFAULT_GLYPH.to_string(),
        }
    }
}

impl GlyphMap {
    /// Built-in table merged with caller overrides (configuration data).
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut map = Self::default();
        for (label, glyph) in overrides {
            map.glyphs
                .insert(label.trim().to_lowercase(), glyph.clone());
        }
        map
    }

    pub fn glyph_for(&self, emotion: &Emotion) -> &str {
        self.glyphs
            .get(emotion.as_str())
            .map(|s| s.as_str())
            .unwrap_or(self.default_glyph.as_str())
    }
}

/// Deterministic, order-preserving rendering of a label set.
/// Two label sets with identical label sequences produce identical tokens;
/// token equality is the basis for compaction.
pub fn to_token(labels: &LabelSet, glyphs: &GlyphMap, mode: TokenMode) -> String {
    let selected: &[LabelScore] = match mode {
        TokenMode::TopLabelOnly => &labels.labels[..labels.labels.len().min(1)],
        TokenMode::FullLabelSet => &labels.labels[..],
    };

    selected
        .iter()
        .map(|l| {
            let emotion = Emotion::from_label(&l.label);
            format!("{} {}", emotion.as_str(), glyphs.glyph_for(&emotion))
        })
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

/// Single forward pass keeping a token only when it differs from the
/// previously kept one. First token is always kept.
pub fn compact(tokens: &[String]) -> Vec<String> {
    let mut compacted: Vec<String> = Vec::new();
    for token in tokens {
        if compacted.last().map(|last| last != token).unwrap_or(true) {
            compacted.push(token.clone());
        }
    }
    compacted
}

/// Arrow-joined display string for the compacted timeline.
pub fn render_timeline(tokens: &[String]) -> String {
    tokens.join(TIMELINE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_set(labels: &[(&str, f64)]) -> LabelSet {
        LabelSet {
            labels: labels
                .iter()
                .map(|(l, s)| LabelScore::new(*l, *s))
                .collect(),
            is_fallback: false,
        }
    }

    #[test]
    fn test_token_single_label() {
        let set = label_set(&[("joy", 0.9)]);
        let token = to_token(&set, &GlyphMap::default(), TokenMode::FullLabelSet);
        assert_eq!(token, "joy 😄");
    }

    #[test]
    fn test_token_multi_label_preserves_order() {
        let set = label_set(&[("sadness", 0.4), ("fear", 0.8)]);
        let token = to_token(&set, &GlyphMap::default(), TokenMode::FullLabelSet);
        assert_eq!(token, "sadness 😢, fear 😱");
    }

    #[test]
    fn test_token_top_label_only() {
        let set = label_set(&[("sadness", 0.4), ("fear", 0.8)]);
        let token = to_token(&set, &GlyphMap::default(), TokenMode::TopLabelOnly);
        assert_eq!(token, "sadness 😢");
    }

    #[test]
    fn test_unknown_label_gets_placeholder_glyph() {
        let set = label_set(&[("nostalgia", 0.7)]);
        let token = to_token(&set, &GlyphMap::default(), TokenMode::FullLabelSet);
        assert_eq!(token, "nostalgia ❓");
    }

    #[test]
    fn test_glyph_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("joy".to_string(), ":)".to_string());
        let glyphs = GlyphMap::with_overrides(&overrides);
        let token = to_token(&label_set(&[("joy", 0.9)]), &glyphs, TokenMode::FullLabelSet);
        assert_eq!(token, "joy :)");
    }

    #[test]
    fn test_token_normalizes_label_case() {
        let a = to_token(&label_set(&[("Joy", 0.9)]), &GlyphMap::default(), TokenMode::FullLabelSet);
        let b = to_token(&label_set(&[("joy", 0.2)]), &GlyphMap::default(), TokenMode::FullLabelSet);
        assert_eq!(a, b);
    }

    fn tokens(vals: &[&str]) -> Vec<String> {
        vals.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compact_removes_adjacent_duplicates() {
        let compacted = compact(&tokens(&["a", "a", "b", "b", "a"]));
        assert_eq!(compacted, tokens(&["a", "b", "a"]));
    }

    #[test]
    fn test_compact_empty_and_uniform() {
        assert!(compact(&[]).is_empty());
        assert_eq!(compact(&tokens(&["a", "a", "a"])).len(), 1);
    }

    #[test]
    fn test_compact_is_idempotent() {
        let input = tokens(&["x", "x", "y", "z", "z", "z", "y"]);
        let once = compact(&input);
        let twice = compact(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_compact_never_lengthens() {
        let input = tokens(&["a", "b", "b", "c"]);
        let compacted = compact(&input);
        assert!(compacted.len() <= input.len());

        // No adjacent duplicates: length preserved
        let distinct = tokens(&["a", "b", "c"]);
        assert_eq!(compact(&distinct).len(), distinct.len());

        // No two consecutive entries are equal afterwards
        for pair in compacted.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_render_timeline() {
        assert_eq!(render_timeline(&tokens(&["joy 😄", "anger 😡"])), "joy 😄 → anger 😡");
        assert_eq!(render_timeline(&[]), "");
    }
}
