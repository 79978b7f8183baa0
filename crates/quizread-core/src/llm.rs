//! Quiz generation model client.

use serde::Deserialize;
use serde_json::json;

/// Text-in, text-out model used by CheckpointQuiz. Errors are plain strings
/// so the concept can fold them into its domain error message.
pub trait QuizModel: Send + Sync {
    fn generate(&self, prompt: &str) -> std::result::Result<String, String>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }
}

impl QuizModel for GeminiClient {
    fn generate(&self, prompt: &str) -> std::result::Result<String, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| format!("model request failed: {e}"))?;
        if !response.status().is_success() {
            return Err(format!("model returned status {}", response.status()));
        }
        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| format!("model response was not valid JSON: {e}"))?;
        let text = parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        text.ok_or_else(|| "model response contained no candidates".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_extracts_first_candidate_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "k".into()))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "{\"question\":\"Q\"}" }] }
                    }]
                })
                .to_string(),
            )
            .create();

        let client = GeminiClient::with_base_url("k".to_string(), server.url());
        let text = client.generate("make a quiz").unwrap();
        assert_eq!(text, "{\"question\":\"Q\"}");
        mock.assert();
    }

    #[test]
    fn generate_surfaces_http_errors() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .create();

        let client = GeminiClient::with_base_url("bad".to_string(), server.url());
        let err = client.generate("make a quiz").unwrap_err();
        assert!(err.contains("403"), "unexpected error: {err}");
    }

    #[test]
    fn generate_rejects_empty_candidates() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({ "candidates": [] }).to_string())
            .create();

        let client = GeminiClient::with_base_url("k".to_string(), server.url());
        let err = client.generate("make a quiz").unwrap_err();
        assert!(err.contains("no candidates"), "unexpected error: {err}");
    }
}
