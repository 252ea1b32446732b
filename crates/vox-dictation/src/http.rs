//! HTTP client for the upstream transcription service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::processor::WorkProcessor;
use crate::types::{ProcessError, WorkOutput};

/// Maximum decoded audio size accepted into a payload (5 MB).
const MAX_AUDIO_BYTES: usize = 5 * 1024 * 1024;

/// [`WorkProcessor`] backed by the upstream dictation HTTP service.
///
/// The payload is forwarded verbatim as the JSON body of
/// `POST {base_url}/api/dictation/transcribe`; the response contract is
/// `{success, text?, refinedText?, error?}`.
pub struct HttpDictationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDictationClient {
    /// Build a client against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProcessError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessError::Request(e.to_string()))?;
        let base_url = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Pre-flight check on the payload's `audio` field, if present.
    ///
    /// Estimating from the base64 length avoids decoding megabytes just to
    /// reject them. Payloads without a string `audio` field pass through
    /// untouched; the payload is otherwise opaque here.
    fn check_payload(payload: &Value) -> Result<(), ProcessError> {
        if let Some(audio) = payload.get("audio").and_then(Value::as_str) {
            let estimated = base64::decoded_len_estimate(audio.len());
            if estimated > MAX_AUDIO_BYTES {
                return Err(ProcessError::Rejected(format!(
                    "audio payload too large: ~{estimated} bytes (max {MAX_AUDIO_BYTES})"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WorkProcessor for HttpDictationClient {
    async fn process(&self, payload: Value) -> Result<WorkOutput, ProcessError> {
        Self::check_payload(&payload)?;

        let url = format!("{}/api/dictation/transcribe", self.base_url);
        debug!(%url, "forwarding work payload upstream");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProcessError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProcessError::Request(e.to_string()))?;

        let json: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(ProcessError::InvalidResponse(format!(
                    "non-JSON body from upstream: {e}"
                )));
            }
            Err(_) => {
                // Failed status with an unparseable body: report the status.
                return Err(ProcessError::Upstream(format!(
                    "processing service returned {status}"
                )));
            }
        };

        let succeeded = json.get("success").and_then(Value::as_bool) == Some(true);
        if status.is_success() && succeeded {
            let text = json
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ProcessError::InvalidResponse("success response missing text field".into())
                })?
                .to_string();
            let refined_text = json
                .get("refinedText")
                .and_then(Value::as_str)
                .map(String::from);
            Ok(WorkOutput { text, refined_text })
        } else {
            let message = json
                .get("error")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("processing service returned {status}"));
            warn!(%status, error = %message, "upstream reported failure");
            Err(ProcessError::Upstream(message))
        }
    }
}
