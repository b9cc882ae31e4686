use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Image, Label};
use aws_sdk_rekognition::Client;
use tracing::debug;

use super::interface::{LabelDetector, LabelItem};
use crate::error::{HandlerError, HandlerResult};

/// Label detection through AWS Rekognition `DetectLabels`
#[derive(Debug, Clone)]
pub struct RekognitionLabelDetector {
    client: Client,
}

impl RekognitionLabelDetector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LabelDetector for RekognitionLabelDetector {
    async fn detect_labels(&self, image: &[u8]) -> HandlerResult<Vec<LabelItem>> {
        let output = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .send()
            .await
            .map_err(|e| {
                HandlerError::Detection(format!(
                    "label detection failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        labels_to_items(output.labels)
    }
}

/// Convert Rekognition labels, keeping provider order.
/// Entries without a name or confidence are skipped.
fn labels_to_items(labels: Option<Vec<Label>>) -> HandlerResult<Vec<LabelItem>> {
    let labels = labels.ok_or_else(|| {
        HandlerError::Detection("label detection returned no labels".to_string())
    })?;

    let items = labels
        .into_iter()
        .filter_map(|label| match (label.name, label.confidence) {
            (Some(name), Some(confidence)) => Some(LabelItem { name, confidence }),
            (name, _) => {
                debug!("Skipping incomplete label: {:?}", name);
                None
            }
        })
        .collect();

    Ok(items)
}
