// Emodrift Data Models
// Serde schemas shared by the analysis pipeline and the caller surface

use serde::{Deserialize, Serialize};

// Re-export the segmenter output type so callers only need `models`
pub use crate::services::text_processor::SentenceOffset;

// ============ Classifier Output Contract ============

/// One (label, confidence) pair as returned by the external classifier.
/// The classifier reports the full label vocabulary for a span of text,
/// not just the top prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

// ============ Label Sets ============

/// Thresholded, ordered emotion labels for one sentence.
/// Invariant: never empty — when nothing clears the threshold the set holds
/// the single configured fallback label and `is_fallback` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSet {
    pub labels: Vec<LabelScore>,
    #[serde(default)]
    pub is_fallback: bool,
}

impl LabelSet {
    /// Label names in retained (classifier) order.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.label.as_str()).collect()
    }
}

// ============ Analyzer Options ============

/// How a label set is flattened into a display token for drift comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TokenMode {
    /// Render every retained label, joined in classifier order.
    #[default]
    FullLabelSet,
    /// Render only the first retained label.
    TopLabelOnly,
}

impl TokenMode {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "top" | "top-label" | "top-label-only" => Self::TopLabelOnly,
            _ => Self::FullLabelSet,
        }
    }
}

/// Which token sequence the drift ratio is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DriftFormulation {
    /// Ratio over the compacted timeline; 1.0 whenever more than one
    /// distinct state exists. Matches the observed source behavior.
    #[default]
    Compacted,
    /// Ratio over the raw per-sentence token sequence.
    RawSequence,
}

impl DriftFormulation {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "raw" | "raw-sequence" => Self::RawSequence,
            _ => Self::Compacted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerOptions {
    /// Minimum classifier confidence for a label to be retained.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Label substituted when nothing clears the threshold.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
    #[serde(default)]
    pub token_mode: TokenMode,
    #[serde(default)]
    pub formulation: DriftFormulation,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fallback_label: default_fallback_label(),
            token_mode: TokenMode::default(),
            formulation: DriftFormulation::default(),
        }
    }
}

impl AnalyzerOptions {
    /// Rejects malformed options at configuration time, not per call.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            ));
        }
        if self.fallback_label.trim().is_empty() {
            return Err("fallback label must not be empty".to_string());
        }
        Ok(())
    }
}

// ============ Analysis Response ============

/// The four output artifacts of one analysis, plus request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftAnalysis {
    /// Ordered sentences with UTF-8 byte offsets into the analyzed text.
    pub sentences: Vec<SentenceOffset>,
    /// Per-sentence thresholded label sets, same order as `sentences`.
    pub sentence_labels: Vec<LabelSet>,
    /// Compacted timeline of display tokens (adjacent duplicates removed).
    pub timeline: Vec<String>,
    /// Arrow-joined rendering of `timeline`.
    pub timeline_display: String,
    pub drift_score: f64,
    pub severity: String,
    pub sentence_count: i32,
    pub version: String,
    pub request_id: String,
}

// ============ Default Value Functions ============

fn default_threshold() -> f64 { 0.1 }
fn default_fallback_label() -> String { "neutral".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = AnalyzerOptions::default();
        assert_eq!(opts.threshold, 0.1);
        assert_eq!(opts.fallback_label, "neutral");
        assert_eq!(opts.token_mode, TokenMode::FullLabelSet);
        assert_eq!(opts.formulation, DriftFormulation::Compacted);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_reject_out_of_range_threshold() {
        let mut opts = AnalyzerOptions::default();
        opts.threshold = 1.5;
        assert!(opts.validate().is_err());

        opts.threshold = -0.1;
        assert!(opts.validate().is_err());

        opts.threshold = f64::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_options_reject_blank_fallback() {
        let mut opts = AnalyzerOptions::default();
        opts.fallback_label = "  ".to_string();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_options_serde_defaults() {
        let opts: AnalyzerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.threshold, 0.1);
        assert_eq!(opts.fallback_label, "neutral");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(TokenMode::from_str("top-label-only"), TokenMode::TopLabelOnly);
        assert_eq!(TokenMode::from_str("full"), TokenMode::FullLabelSet);
        assert_eq!(
            DriftFormulation::from_str("raw"),
            DriftFormulation::RawSequence
        );
        assert_eq!(
            DriftFormulation::from_str("compacted"),
            DriftFormulation::Compacted
        );
    }
}
