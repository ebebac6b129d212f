// Drift Pipeline
// End-to-end orchestration: segment → label each sentence in order →
// build timeline → score → classify severity

use crate::models::{AnalyzerOptions, DriftAnalysis, LabelSet, SentenceOffset};
use crate::services::classifier::{
    classify_sentences, ClassifierClient, ClassifierError, EmotionClassifier,
    CLASSIFY_MAX_CONCURRENCY,
};
use crate::services::text_processor::split_sentences_advanced;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::labeler::threshold_labels;
use super::scorer::{score_for, DriftSeverity};
use super::timeline::{compact, render_timeline, to_token, GlyphMap};

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The external classifier failed; no partial timeline is returned.
    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(#[from] ClassifierError),
    #[error("invalid analyzer options: {0}")]
    InvalidOptions(String),
}

/// Run the full drift analysis with serial, in-order classifier calls.
///
/// Empty or whitespace-only input is expected to be rejected by the caller
/// before invoking the pipeline; zero sentences still produce a degenerate
/// result (empty timeline, score 0) rather than an error.
pub async fn analyze_drift<C: EmotionClassifier>(
    classifier: &C,
    text: &str,
    options: &AnalyzerOptions,
    glyphs: &GlyphMap,
) -> Result<DriftAnalysis, AnalysisError> {
    options.validate().map_err(AnalysisError::InvalidOptions)?;

    let sentences = split_sentences_advanced(text);
    info!("[DRIFT] segmented {} sentences", sentences.len());

    let mut sentence_labels: Vec<LabelSet> = Vec::with_capacity(sentences.len());
    for sentence in &sentences {
        let raw = classifier.classify(&sentence.text).await?;
        sentence_labels.push(threshold_labels(
            &raw,
            options.threshold,
            &options.fallback_label,
        ));
    }

    Ok(finish_analysis(sentences, sentence_labels, options, glyphs))
}

/// Throughput variant: concurrency-limited classifier calls with per-sentence
/// output order restored before the timeline is built. Identical output to
/// `analyze_drift`.
pub async fn analyze_drift_concurrent(
    client: &Arc<ClassifierClient>,
    text: &str,
    options: &AnalyzerOptions,
    glyphs: &GlyphMap,
) -> Result<DriftAnalysis, AnalysisError> {
    options.validate().map_err(AnalysisError::InvalidOptions)?;

    let sentences = split_sentences_advanced(text);
    info!("[DRIFT] segmented {} sentences", sentences.len());

    let texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
    let raw_sets = classify_sentences(client, &texts, CLASSIFY_MAX_CONCURRENCY).await?;

    let sentence_labels: Vec<LabelSet> = raw_sets
        .iter()
        .map(|raw| threshold_labels(raw, options.threshold, &options.fallback_label))
        .collect();

    Ok(finish_analysis(sentences, sentence_labels, options, glyphs))
}

fn finish_analysis(
    sentences: Vec<SentenceOffset>,
    sentence_labels: Vec<LabelSet>,
    options: &AnalyzerOptions,
    glyphs: &GlyphMap,
) -> DriftAnalysis {
    let raw_tokens: Vec<String> = sentence_labels
        .iter()
        .map(|set| to_token(set, glyphs, options.token_mode))
        .collect();
    let timeline = compact(&raw_tokens);

    let drift_score = score_for(options.formulation, &raw_tokens, &timeline);
    let severity = DriftSeverity::from_score(drift_score);

    info!(
        "[DRIFT] timeline entries: {} of {}, score: {:.2}, severity: {}",
        timeline.len(),
        raw_tokens.len(),
        drift_score,
        severity
    );

    DriftAnalysis {
        sentence_count: sentences.len() as i32,
        sentences,
        sentence_labels,
        timeline_display: render_timeline(&timeline),
        timeline,
        drift_score,
        severity: severity.as_str().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        request_id: Uuid::new_v4().to_string(),
    }
}
