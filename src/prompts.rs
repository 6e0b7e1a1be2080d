//! Prompt construction for the translation request.
//!
//! Both prompt strings are fixed. The user message carries the whole extracted
//! text without truncation; if it exceeds the model's context window the
//! endpoint rejects the request and the client surfaces
//! [`crate::error::PdfTranslateError::RequestRejected`].

use crate::model::{ExtractedText, TranslationRequest};
use crate::provider::ChatMessage;

/// System message declaring the assistant's role.
pub const SYSTEM_PROMPT: &str = "You are a professional legal and document translator.";

/// Instruction placed before the extracted text in the user message.
pub const TRANSLATION_INSTRUCTION: &str =
    "Translate this Arabic (or other-language) text into professional English:";

/// Build the user message body for `text`.
pub fn translation_prompt(text: &str) -> String {
    format!("{TRANSLATION_INSTRUCTION}\n\n{text}")
}

/// Build the two-message request: fixed system role, then instruction + text.
pub fn build_translation_request(extracted: &ExtractedText) -> TranslationRequest {
    TranslationRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(translation_prompt(&extracted.as_text())),
        ],
    }
}
