// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generation with a no-failure contract.
//!
//! The responder always produces a user-facing string. Provider failures
//! are mapped to fixed apologies by their classified kind; the free-text
//! error message is logged but never shown to the user.

use std::sync::Arc;

use murmur_core::types::{ContextTurn, ProviderErrorKind, ProviderRequest};
use murmur_core::{MurmurError, ProviderAdapter};
use tracing::{debug, warn};

/// Greeting used when there is no conversation context to respond to.
pub const EMPTY_CONTEXT_GREETING: &str = "Hello! How can I help you today?";

/// Shown when the provider rejects the relay's credentials or configuration.
pub const CONFIGURATION_APOLOGY: &str =
    "The assistant is not configured correctly. Please contact the administrator.";

/// Shown when the provider reports quota exhaustion.
pub const RATE_LIMIT_APOLOGY: &str =
    "I'm receiving too many requests right now. Please try again in a minute.";

/// Shown for any other generation failure.
pub const GENERIC_APOLOGY: &str =
    "Something went wrong while generating a reply. Please try again.";

/// Default persona instruction when none is configured.
const DEFAULT_INSTRUCTION: &str = "You are a helpful assistant. Reply concisely.";

/// Turns an assembled context into reply text, infallibly.
pub struct Responder {
    provider: Arc<dyn ProviderAdapter>,
    instruction: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl Responder {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        instruction: Option<String>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            provider,
            instruction: instruction.unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
            temperature,
            max_output_tokens,
        }
    }

    /// Generate reply text for the given turns.
    ///
    /// Empty turns short-circuit to a greeting without touching the
    /// provider. Failures come back as the fixed apology for their kind.
    pub async fn respond(&self, turns: Vec<ContextTurn>) -> String {
        if turns.is_empty() {
            debug!("empty context, returning greeting");
            return EMPTY_CONTEXT_GREETING.to_string();
        }

        let request = ProviderRequest {
            instruction: self.instruction.clone(),
            turns,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        match self.provider.complete(request).await {
            Ok(response) => response.text,
            Err(e) => {
                warn!(error = %e, "generation failed, sending apology");
                apology_for(&e).to_string()
            }
        }
    }
}

/// The fixed user-facing string for a failed generation.
fn apology_for(error: &MurmurError) -> &'static str {
    match error.provider_kind() {
        Some(ProviderErrorKind::Configuration) => CONFIGURATION_APOLOGY,
        Some(ProviderErrorKind::RateLimited) => RATE_LIMIT_APOLOGY,
        Some(ProviderErrorKind::Transient) | None => GENERIC_APOLOGY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::TurnRole;
    use murmur_test_utils::MockProvider;

    fn make_turn(content: &str) -> ContextTurn {
        ContextTurn {
            role: TurnRole::User,
            content: content.to_string(),
        }
    }

    fn make_responder(provider: Arc<MockProvider>) -> Responder {
        Responder::new(provider, Some("Be brief.".to_string()), 0.7, 1024)
    }

    #[tokio::test]
    async fn empty_turns_greet_without_provider_call() {
        let provider = Arc::new(MockProvider::new());
        let responder = make_responder(provider.clone());

        let reply = responder.respond(Vec::new()).await;
        assert_eq!(reply, EMPTY_CONTEXT_GREETING);
        assert!(provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn successful_generation_passes_through() {
        let provider = Arc::new(MockProvider::with_responses(vec!["hi there".to_string()]));
        let responder = make_responder(provider.clone());

        let reply = responder.respond(vec![make_turn("hello")]).await;
        assert_eq!(reply, "hi there");

        let seen = provider.requests().await;
        assert_eq!(seen[0].instruction, "Be brief.");
        assert_eq!(seen[0].turns[0].content, "hello");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_fixed_apology() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(ProviderErrorKind::RateLimited).await;
        let responder = make_responder(provider);

        let reply = responder.respond(vec![make_turn("hello")]).await;
        assert_eq!(reply, RATE_LIMIT_APOLOGY);
    }

    #[tokio::test]
    async fn configuration_failure_maps_to_admin_apology() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(ProviderErrorKind::Configuration).await;
        let responder = make_responder(provider);

        let reply = responder.respond(vec![make_turn("hello")]).await;
        assert_eq!(reply, CONFIGURATION_APOLOGY);
    }

    #[tokio::test]
    async fn transient_failure_maps_to_generic_apology() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(ProviderErrorKind::Transient).await;
        let responder = make_responder(provider);

        let reply = responder.respond(vec![make_turn("hello")]).await;
        assert_eq!(reply, GENERIC_APOLOGY);
    }

    #[tokio::test]
    async fn default_instruction_applies_when_unset() {
        let provider = Arc::new(MockProvider::new());
        let responder = Responder::new(provider.clone(), None, 0.7, 1024);

        responder.respond(vec![make_turn("hello")]).await;
        let seen = provider.requests().await;
        assert!(!seen[0].instruction.is_empty());
    }
}
