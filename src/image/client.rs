use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use tracing::debug;

use super::interface::ImageFetcher;
use crate::config::PayloadEncoding;
use crate::error::{HandlerError, HandlerResult};

/// Image fetcher backed by a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    encoding: PayloadEncoding,
}

impl HttpImageFetcher {
    pub fn new(encoding: PayloadEncoding) -> Self {
        Self {
            client: Client::new(),
            encoding,
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, image_url: &str) -> HandlerResult<Vec<u8>> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| HandlerError::Fetch(format!("failed to download {}: {}", image_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Fetch(format!(
                "image request to {} returned {}",
                image_url, status
            )));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| HandlerError::Fetch(format!("failed to read image body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", payload.len(), image_url);
        decode_payload(&payload, self.encoding)
    }
}

/// Turn a downloaded payload into image bytes.
///
/// Base64 payloads may be wrapped across lines, so ASCII whitespace is
/// ignored before decoding.
pub fn decode_payload(payload: &[u8], encoding: PayloadEncoding) -> HandlerResult<Vec<u8>> {
    match encoding {
        PayloadEncoding::Raw => Ok(payload.to_vec()),
        PayloadEncoding::Base64 => {
            let compact: Vec<u8> = payload
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(compact)
                .map_err(|e| HandlerError::Fetch(format!("image payload is not valid base64: {}", e)))
        }
    }
}
