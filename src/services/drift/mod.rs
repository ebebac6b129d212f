// Drift Module
// Emotion drift core organized into specialized submodules:
// - labeler: thresholds classifier output into per-sentence label sets
// - timeline: display tokens, glyph mapping, run-length compaction
// - scorer: drift score and severity banding
// - pipeline: end-to-end orchestration

pub mod labeler;
pub mod pipeline;
pub mod scorer;
pub mod timeline;

// Re-export commonly used functions
pub use labeler::{label_sentence, threshold_labels};
pub use pipeline::{analyze_drift, analyze_drift_concurrent, AnalysisError};
pub use scorer::{score_compacted, score_for, score_raw, DriftSeverity};
pub use timeline::{compact, render_timeline, to_token, Emotion, GlyphMap};
