// Emotion Labeler
// Thresholds raw classifier output into per-sentence label sets

use crate::models::{AnalyzerOptions, LabelScore, LabelSet};
use crate::services::classifier::{ClassifierError, EmotionClassifier};

/// Retain every label at or above the threshold, preserving classifier
/// output order (not sorted by score). An all-below-threshold result
/// collapses to the single configured fallback label, so the returned set
/// is never empty.
pub fn threshold_labels(raw: &[LabelScore], threshold: f64, fallback_label: &str) -> LabelSet {
    let labels: Vec<LabelScore> = raw
        .iter()
        .filter(|l| l.score >= threshold)
        .cloned()
        .collect();

    if labels.is_empty() {
        LabelSet {
            labels: vec![LabelScore::new(fallback_label, 0.0)],
            is_fallback: true,
        }
    } else {
        LabelSet {
            labels,
            is_fallback: false,
        }
    }
}

/// One classifier call for one sentence. A classifier failure is terminal
/// for the whole analysis; no retries happen at this layer.
pub async fn label_sentence<C: EmotionClassifier>(
    classifier: &C,
    sentence: &str,
    options: &AnalyzerOptions,
) -> Result<LabelSet, ClassifierError> {
    let raw = classifier.classify(sentence).await?;
    Ok(threshold_labels(&raw, options.threshold, &options.fallback_label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_keeps_classifier_order() {
        // Classifier order is not score order; both survivors keep it.
        let raw = vec![
            LabelScore::new("sadness", 0.2),
            LabelScore::new("fear", 0.8),
            LabelScore::new("joy", 0.05),
        ];
        let set = threshold_labels(&raw, 0.1, "neutral");
        assert_eq!(set.label_names(), vec!["sadness", "fear"]);
        assert!(!set.is_fallback);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let raw = vec![LabelScore::new("joy", 0.1)];
        let set = threshold_labels(&raw, 0.1, "neutral");
        assert_eq!(set.label_names(), vec!["joy"]);
    }

    #[test]
    fn test_fallback_when_all_below_threshold() {
        let raw = vec![
            LabelScore::new("joy", 0.02),
            LabelScore::new("anger", 0.01),
        ];
        let set = threshold_labels(&raw, 0.1, "neutral");
        assert!(set.is_fallback);
        assert_eq!(set.label_names(), vec!["neutral"]);
        assert_eq!(set.labels[0].score, 0.0);
    }

    #[test]
    fn test_fallback_when_classifier_returns_nothing() {
        let set = threshold_labels(&[], 0.1, "unknown");
        assert!(set.is_fallback);
        assert_eq!(set.label_names(), vec!["unknown"]);
    }

    #[tokio::test]
    async fn test_label_sentence_with_stub() {
        struct Stub;
        impl EmotionClassifier for Stub {
            async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
                Ok(vec![
                    LabelScore::new("joy", 0.9),
                    LabelScore::new("neutral", 0.03),
                ])
            }
        }

        let options = AnalyzerOptions::default();
        let set = label_sentence(&Stub, "I am happy.", &options).await.unwrap();
        assert_eq!(set.label_names(), vec!["joy"]);
    }
}
