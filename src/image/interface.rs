use async_trait::async_trait;

use crate::error::HandlerResult;

/// Downloads an image and hands back its raw bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image at `image_url`
    ///
    /// # Returns
    /// Decoded image bytes, or `HandlerError::Fetch` on network, status or
    /// decode failure
    async fn fetch(&self, image_url: &str) -> HandlerResult<Vec<u8>>;
}
