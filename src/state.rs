use std::sync::Arc;

use aws_config::Region;
use tracing::info;

use crate::config::Config;
use crate::image::HttpImageFetcher;
use crate::orchestrator::RequestOrchestrator;
use crate::translate::AwsTranslator;
use crate::vision::RekognitionLabelDetector;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl AppState {
    /// Build the AWS-backed providers and wire them into the orchestrator
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mut loader = aws_config::from_env();
        if let Some(region) = &config.aws_config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        info!(
            "AWS clients configured for region {:?}",
            sdk_config.region().map(|r| r.as_ref())
        );

        let fetcher = HttpImageFetcher::new(config.image_config.payload_encoding);
        let detector = RekognitionLabelDetector::new(aws_sdk_rekognition::Client::new(&sdk_config));
        let translator = AwsTranslator::new(aws_sdk_translate::Client::new(&sdk_config));

        let orchestrator = RequestOrchestrator::new(
            Arc::new(fetcher),
            Arc::new(detector),
            Arc::new(translator),
            config.vision_config.clone(),
            config.translation_config.clone(),
        );

        Ok(Self::with_orchestrator(config, orchestrator))
    }

    pub fn with_orchestrator(config: Config, orchestrator: RequestOrchestrator) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
