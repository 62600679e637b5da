//! Content-description advisory: a one-line blurb about a file name.
//!
//! Failures never surface as errors; callers always get a sentence back.

use crate::config::DescribeConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Returned when the advisory service fails
pub const UNAVAILABLE: &str = "Could not fetch details.";
/// Returned when no API key is configured
pub const MISSING_KEY: &str = "API Key missing. Cannot analyze.";
/// Returned when the service answers with nothing
pub const NO_INFO: &str = "No info available.";

/// Advisory description source
#[async_trait]
pub trait Describer: Send + Sync {
    async fn describe(&self, file_name: &str) -> String;
}

pub fn prompt_for(file_name: &str) -> String {
    format!(
        "Provide a very short, 1-sentence fun fact or summary about the movie or show implied by this filename: \"{}\". If it's a generic name, describe what it might contain.",
        file_name
    )
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
    }
}

/// Generative-language HTTP describer
pub struct GeminiDescriber {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiDescriber {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(config: &DescribeConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            std::env::var(&config.api_key_env).ok(),
        )
    }

    async fn request(&self, api_key: &str, file_name: &str) -> Result<String, String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt_for(file_name) }] }] });
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("Parse error: {}", e))?;
        Ok(parsed.first_text().unwrap_or_else(|| NO_INFO.to_string()))
    }
}

#[async_trait]
impl Describer for GeminiDescriber {
    async fn describe(&self, file_name: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return MISSING_KEY.to_string();
        };
        match self.request(api_key, file_name).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = file_name, error = %e, "Description request failed");
                UNAVAILABLE.to_string()
            }
        }
    }
}
