// Emodrift Core Services

pub mod classifier;
pub mod config_store;
pub mod drift;
pub mod text_processor;

pub use classifier::*;
pub use config_store::*;
pub use text_processor::*;

// Re-export drift module functions
pub use drift::{
    analyze_drift,
    analyze_drift_concurrent,
    compact,
    label_sentence,
    render_timeline,
    score_compacted,
    score_for,
    score_raw,
    threshold_labels,
    to_token,
    AnalysisError,
    DriftSeverity,
    Emotion,
    GlyphMap,
};
