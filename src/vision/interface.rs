use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HandlerResult;

/// A label reported by the vision provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    pub name: String,
    /// Provider certainty, 0-100
    pub confidence: f32,
}

impl LabelItem {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Vision provider capable of labelling image content
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detect labels in `image`, in the order the provider reports them.
    /// No confidence filtering happens here.
    async fn detect_labels(&self, image: &[u8]) -> HandlerResult<Vec<LabelItem>>;
}
