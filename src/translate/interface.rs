/// Translation provider interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HandlerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, source_lang: &str, target_lang: &str) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single piece of text
    async fn translate(&self, request: TranslateRequest) -> HandlerResult<TranslateResponse>;
}
