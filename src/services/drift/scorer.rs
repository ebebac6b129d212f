// Drift Scorer
// Normalized volatility score over the emotion timeline plus severity banding

use crate::models::DriftFormulation;

/// Fraction of adjacent pairs that differ. Zero or one entry means no drift
/// is possible and scores 0.
fn change_ratio(tokens: &[String]) -> f64 {
    if tokens.len() <= 1 {
        return 0.0;
    }
    let changes = tokens.windows(2).filter(|w| w[0] != w[1]).count();
    changes as f64 / (tokens.len() - 1) as f64
}

/// Score over the compacted timeline. Compaction already removed adjacent
/// duplicates, so any timeline longer than one entry scores 1.0.
pub fn score_compacted(compacted: &[String]) -> f64 {
    change_ratio(compacted)
}

/// Score over the raw per-sentence token sequence, where adjacent sentences
/// may or may not differ.
pub fn score_raw(raw_tokens: &[String]) -> f64 {
    change_ratio(raw_tokens)
}

/// Pick the score for the configured formulation.
pub fn score_for(
    formulation: DriftFormulation,
    raw_tokens: &[String],
    compacted: &[String],
) -> f64 {
    match formulation {
        DriftFormulation::Compacted => score_compacted(compacted),
        DriftFormulation::RawSequence => score_raw(raw_tokens),
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriftSeverity {
    Stable,
    Low,
    Moderate,
    High,
}

impl DriftSeverity {
    /// Banding evaluated in order, upper bounds inclusive. Non-finite or
    /// negative input is treated as 0 rather than panicking.
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() || score <= 0.0 {
            Self::Stable
        } else if score <= 0.3 {
            Self::Low
        } else if score <= 0.6 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable (No Drift)",
            Self::Low => "Low Drift",
            Self::Moderate => "Moderate Drift",
            Self::High => "High Emotional Volatility",
        }
    }
}

impl std::fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
