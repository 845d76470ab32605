use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Thin HTTP wrapper over the task service.
///
/// One method per verb, each returning the parsed JSON body on success.
/// Error bodies are parsed too: the service reports failures as
/// `{error, message, timestamp, path}` and `message` is preferred over
/// `error` for display. No retries happen here; that policy belongs to the
/// query cache.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        self.dispatch("GET", self.http.get(&url), &url).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        self.dispatch("POST", self.http.post(&url).json(body), &url)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        self.dispatch("PUT", self.http.put(&url).json(body), &url)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        self.dispatch("DELETE", self.http.delete(&url), &url).await
    }

    async fn dispatch(
        &self,
        method: &str,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, ApiError> {
        tracing::debug!(
            target: "tablero.http",
            stage = "request.in",
            method = method,
            url = %url
        );
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{method} {url}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("{method} {url}: {e}")))?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            tracing::debug!(
                target: "tablero.http",
                stage = "request.err",
                method = method,
                status = status.as_u16(),
                message = %message
            );
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(
            target: "tablero.http",
            stage = "request.out",
            method = method,
            status = status.as_u16()
        );

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "failed to decode response body: {} | body={}",
                e,
                preview_body(&body)
            ))
        })
    }
}

/// Best message available for a non-2xx response: body `message`, then body
/// `error`, then a synthesized status line.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(s) = v.get(key).and_then(Value::as_str) {
                if !s.trim().is_empty() {
                    return s.to_string();
                }
            }
        }
    }
    format!("HTTP error: status {status}")
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}
