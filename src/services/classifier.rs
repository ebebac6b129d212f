// Emotion Classifier Service Client
// Wraps the external classification capability (local inference sidecar)
// behind an injectable trait

use crate::models::LabelScore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Classifier sidecar URL
const DEFAULT_CLASSIFIER_URL: &str = "http://127.0.0.1:8799";

const CLASSIFY_MAX_ATTEMPTS: usize = 3; // initial + retries
const CLASSIFY_TIMEOUT_SECS: u64 = 30;
pub const CLASSIFY_MAX_CONCURRENCY: usize = 4;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("classifier service returned error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("invalid score {score} for label '{label}'")]
    InvalidScore { label: String, score: f64 },
    #[error("classifier task failed: {0}")]
    TaskFailed(String),
    #[error("classifier retries exhausted")]
    RetriesExhausted,
}

/// External classification capability: given a span of text, returns the full
/// label vocabulary with confidence scores, in model output order.
///
/// Injected into the pipeline at construction time; the caller owns the
/// instance lifecycle and may share one across requests.
#[allow(async_fn_in_trait)]
pub trait EmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// 分类请求
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest {
    text: String,
}

/// 分类响应
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    labels: Vec<LabelScore>,
}

/// 健康检查响应
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP 客户端单例
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn get_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(CLASSIFY_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client")
    })
}

/// Scores outside [0, 1] mean the service contract is broken.
fn validate_labels(labels: &[LabelScore]) -> Result<(), ClassifierError> {
    for item in labels {
        if !item.score.is_finite() || !(0.0..=1.0).contains(&item.score) {
            return Err(ClassifierError::InvalidScore {
                label: item.label.clone(),
                score: item.score,
            });
        }
    }
    Ok(())
}

/// 分类服务客户端
pub struct ClassifierClient {
    base_url: String,
}

impl Default for ClassifierClient {
    fn default() -> Self {
        let url = std::env::var("EMODRIFT_CLASSIFIER_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string());
        Self::new(&url)
    }
}

impl ClassifierClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 检查服务是否可用
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match get_client().get(&url).send().await {
            Ok(resp) => {
                if let Ok(health) = resp.json::<HealthResponse>().await {
                    health.status == "ok"
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    async fn classify_once(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let url = format!("{}/classify", self.base_url);
        let request = ClassifyRequest {
            text: text.to_string(),
        };

        let response = get_client().post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let result: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::JsonError(e.to_string()))?;

        validate_labels(&result.labels)?;
        Ok(result.labels)
    }

    /// One classification call with bounded retries and linear backoff.
    /// Exhausting the attempts is terminal for the current analysis.
    pub async fn classify_with_retry(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let mut last_err: Option<ClassifierError> = None;

        for attempt in 1..=CLASSIFY_MAX_ATTEMPTS {
            match self.classify_once(text).await {
                Ok(labels) => {
                    if attempt > 1 {
                        info!("[classifier] recovered on attempt {}", attempt);
                    }
                    return Ok(labels);
                }
                Err(e) => {
                    warn!("[classifier] attempt {} failed: {}", attempt, e);
                    last_err = Some(e);
                }
            }

            if attempt < CLASSIFY_MAX_ATTEMPTS {
                // Simple backoff to reduce transient failures.
                let backoff_ms = 400u64 * attempt as u64;
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_err.unwrap_or(ClassifierError::RetriesExhausted))
    }
}

impl EmotionClassifier for ClassifierClient {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        self.classify_with_retry(text).await
    }
}

/// Classify sentences with bounded concurrency, restoring input order.
/// Any failed sentence aborts the whole batch (no partial results).
pub async fn classify_sentences(
    client: &Arc<ClassifierClient>,
    sentences: &[String],
    max_concurrency: usize,
) -> Result<Vec<Vec<LabelScore>>, ClassifierError> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set: JoinSet<(usize, Result<Vec<LabelScore>, ClassifierError>)> = JoinSet::new();

    for (idx, sentence) in sentences.iter().enumerate() {
        let client = client.clone();
        let semaphore = semaphore.clone();
        let sentence = sentence.clone();

        join_set.spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(p) => p,
                Err(_) => {
                    return (
                        idx,
                        Err(ClassifierError::TaskFailed("semaphore closed".to_string())),
                    )
                }
            };
            (idx, client.classify_with_retry(&sentence).await)
        });
    }

    let mut results: Vec<Option<Vec<LabelScore>>> = vec![None; sentences.len()];
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((idx, Ok(labels))) => results[idx] = Some(labels),
            Ok((idx, Err(e))) => {
                warn!("[classifier] sentence {} failed, aborting batch: {}", idx, e);
                return Err(e);
            }
            Err(e) => return Err(ClassifierError::TaskFailed(e.to_string())),
        }
    }

    results
        .into_iter()
        .map(|r| r.ok_or(ClassifierError::RetriesExhausted))
        .collect()
}
