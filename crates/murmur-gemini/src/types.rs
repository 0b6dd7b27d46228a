// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Gemini `generateContent` endpoint.

use murmur_core::types::{ProviderRequest, TurnRole};
use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

/// One turn of content. `role` is absent on the system instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

impl GenerateContentRequest {
    /// Build the wire request from the provider-neutral form. Turn roles
    /// carry Gemini's `user` / `model` labels; the instruction rides in
    /// `system_instruction` when non-empty.
    pub fn from_provider_request(req: &ProviderRequest) -> Self {
        let system_instruction = if req.instruction.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part {
                    text: req.instruction.clone(),
                }],
            })
        };

        let contents = req
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        Self {
            system_instruction,
            contents,
            generation_config: GenerationConfig {
                temperature: req.temperature,
                max_output_tokens: req.max_output_tokens,
            },
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, if the response carried one.
    pub fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.clone())
    }
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Canonical status string, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl ApiError {
    /// Whether any detail entry carries the given `reason` code. The
    /// invalid-API-key case reports `INVALID_ARGUMENT` at the top level and
    /// `API_KEY_INVALID` only here.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::ContextTurn;

    fn sample_request() -> ProviderRequest {
        ProviderRequest {
            instruction: "Be brief.".to_string(),
            turns: vec![
                ContextTurn {
                    role: TurnRole::User,
                    content: "hi".to_string(),
                },
                ContextTurn {
                    role: TurnRole::Model,
                    content: "hello!".to_string(),
                },
            ],
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    #[test]
    fn request_body_shape() {
        let wire = GenerateContentRequest::from_provider_request(&sample_request());
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(
            json["system_instruction"]["parts"][0]["text"],
            "Be brief."
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        // No role key on the system instruction.
        assert!(json["system_instruction"].get("role").is_none());
    }

    #[test]
    fn empty_instruction_omits_system_block() {
        let mut req = sample_request();
        req.instruction.clear();
        let wire = GenerateContentRequest::from_provider_request(&req);
        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("system_instruction").is_none());
    }

    #[test]
    fn first_text_reads_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "reply"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("reply"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.first_text().is_none());
    }

    #[test]
    fn error_reason_scan() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid.",
                "status": "INVALID_ARGUMENT",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.ErrorInfo",
                     "reason": "API_KEY_INVALID"}
                ]
            }
        }"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.error.has_reason("API_KEY_INVALID"));
        assert!(!parsed.error.has_reason("RESOURCE_EXHAUSTED"));
    }
}
