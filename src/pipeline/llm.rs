//! Translation client: one chat-completion call per translation.
//!
//! This module turns a [`TranslationRequest`] into exactly one provider call
//! and returns the trimmed text. It is intentionally thin: prompt wording
//! lives in [`crate::prompts`], HTTP and status mapping in
//! [`crate::provider`].
//!
//! There is no retry and no backoff. Every fault from the provider is returned
//! to the caller unchanged, and a blank answer is turned into
//! [`PdfTranslateError::EmptyTranslation`] so that a successful
//! [`TranslationResult`] is never empty.

use crate::config::{missing_credential_hint, TranslatorConfig, DEFAULT_TEMPERATURE};
use crate::error::PdfTranslateError;
use crate::model::{TranslationRequest, TranslationResult};
use crate::provider::{ChatCompletionRequest, ChatProvider, OpenAiCompatibleProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sends translation requests to a [`ChatProvider`] with a fixed model and temperature.
#[derive(Clone)]
pub struct TranslationClient {
    provider: Arc<dyn ChatProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl TranslationClient {
    /// Client over an existing provider with the default temperature (0.3).
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    /// Build the client described by `config`.
    ///
    /// A pre-built `config.provider` is used as-is; otherwise an
    /// [`OpenAiCompatibleProvider`] is created for `config.endpoint` with the
    /// configured API key.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self, PdfTranslateError> {
        let provider: Arc<dyn ChatProvider> = match config.provider {
            Some(ref provider) => Arc::clone(provider),
            None => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    PdfTranslateError::MissingCredential {
                        hint: missing_credential_hint(),
                    }
                })?;
                Arc::new(OpenAiCompatibleProvider::new(
                    config.endpoint.clone(),
                    api_key,
                    config.api_timeout_secs.map(Duration::from_secs),
                )?)
            }
        };

        Ok(Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The exact body sent to the provider for `request`.
    pub fn completion_request(&self, request: &TranslationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Issue one completion call and return the trimmed first choice.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, PdfTranslateError> {
        let start = Instant::now();
        let body = self.completion_request(request);
        let input_chars: usize = body.messages.iter().map(|m| m.content.chars().count()).sum();
        info!(
            "Translating {} chars with {} ({})",
            input_chars,
            self.model,
            self.provider.name()
        );

        let completion = self.provider.complete(&body).await.map_err(|e| {
            warn!("Translation failed after {:?}: {}", start.elapsed(), e);
            e
        })?;

        let text = completion.content.trim();
        if text.is_empty() {
            warn!("{} returned an empty translation", self.provider.name());
            return Err(PdfTranslateError::EmptyTranslation);
        }

        match completion.usage {
            Some(usage) => debug!(
                "{} input tokens, {} output tokens, {:?}",
                usage.prompt_tokens,
                usage.completion_tokens,
                start.elapsed()
            ),
            None => debug!("Translation took {:?}", start.elapsed()),
        }

        Ok(TranslationResult::new(text).with_usage(completion.usage))
    }
}

impl std::fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, DEFAULT_MODEL};
    use crate::model::ExtractedText;
    use crate::prompts::build_translation_request;
    use crate::provider::{ChatCompletion, TokenUsage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, fn() -> PdfTranslateError>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl Canned {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<ChatCompletion, PdfTranslateError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(ChatCompletion {
                    content: text.clone(),
                    usage: Some(TokenUsage {
                        prompt_tokens: 10,
                        completion_tokens: 2,
                    }),
                }),
                Err(make) => Err(make()),
            }
        }
    }

    fn request() -> TranslationRequest {
        build_translation_request(&ExtractedText::from_pages(vec!["Bonjour".into()]))
    }

    #[tokio::test]
    async fn trims_and_keeps_usage() {
        let provider = Canned::ok("\n  Hello  \n");
        let client = TranslationClient::new(provider.clone(), DEFAULT_MODEL);

        let result = client.translate(&request()).await.unwrap();
        assert_eq!(result.as_str(), "Hello");
        assert_eq!(result.usage().unwrap().prompt_tokens, 10);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "exactly one call");
        assert_eq!(seen[0].model, DEFAULT_MODEL);
        assert!((seen[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn whitespace_only_is_empty_translation() {
        let client = TranslationClient::new(Canned::ok(" \n\t "), DEFAULT_MODEL);
        let err = client.translate(&request()).await.unwrap_err();
        assert!(matches!(err, PdfTranslateError::EmptyTranslation));
    }

    #[tokio::test]
    async fn provider_faults_pass_through_unchanged() {
        let provider = Arc::new(Canned {
            reply: Err(|| PdfTranslateError::Auth {
                provider: "canned".into(),
                status: 401,
                detail: "bad key".into(),
            }),
            seen: Mutex::new(Vec::new()),
        });
        let client = TranslationClient::new(provider.clone(), DEFAULT_MODEL);

        let err = client.translate(&request()).await.unwrap_err();
        assert!(matches!(err, PdfTranslateError::Auth { status: 401, .. }));
        assert_eq!(provider.seen.lock().unwrap().len(), 1, "no retry");
    }

    #[test]
    fn from_config_prefers_injected_provider() {
        let config = TranslatorConfig::builder()
            .provider(Canned::ok("x"))
            .model("llama-3.1-8b-instant")
            .max_tokens(512)
            .build()
            .unwrap();
        let client = TranslationClient::from_config(&config).unwrap();
        assert_eq!(client.provider_name(), "canned");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
        assert_eq!(client.completion_request(&request()).max_tokens, Some(512));
    }

    #[tokio::test]
    async fn overrides_reach_the_request_body() {
        let provider = Canned::ok("Hello");
        let client = TranslationClient::new(provider.clone(), DEFAULT_MODEL)
            .with_temperature(0.0)
            .with_max_tokens(256);

        assert_eq!(client.temperature(), 0.0);
        client.translate(&request()).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, 0.0);
        assert_eq!(seen[0].max_tokens, Some(256));
    }

    #[test]
    fn from_config_builds_http_provider() {
        let config = TranslatorConfig::builder()
            .api_key(ApiKey::new("gsk_test"))
            .build()
            .unwrap();
        let client = TranslationClient::from_config(&config).unwrap();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.temperature(), 0.3);
    }
}
