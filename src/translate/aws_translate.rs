use async_trait::async_trait;
use aws_sdk_translate::error::DisplayErrorContext;
use aws_sdk_translate::Client;
use tracing::debug;

use super::interface::{TranslateRequest, TranslateResponse, Translator};
use crate::error::{HandlerError, HandlerResult};

/// Translator backed by AWS Translate `TranslateText`
#[derive(Debug, Clone)]
pub struct AwsTranslator {
    client: Client,
}

impl AwsTranslator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for AwsTranslator {
    async fn translate(&self, request: TranslateRequest) -> HandlerResult<TranslateResponse> {
        debug!(
            "Translating {} chars {} -> {}",
            request.text.len(),
            request.source_lang,
            request.target_lang
        );

        let output = self
            .client
            .translate_text()
            .source_language_code(request.source_lang)
            .target_language_code(request.target_lang)
            .text(request.text)
            .send()
            .await
            .map_err(|e| {
                HandlerError::Translation(format!(
                    "translation failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(TranslateResponse {
            translated_text: output.translated_text,
        })
    }
}
