use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::config::{TranslationConfig, VisionConfig};
use crate::error::{HandlerError, HandlerResult};
use crate::image::ImageFetcher;
use crate::translate::{TranslateRequest, Translator};
use crate::vision::{LabelDetector, LabelItem};

const BODY_PREFIX: &str = "A imagem tem \n ";
const ERROR_PREFIX: &str = "A error has occurred: ";

/// Inbound parameters, as carried by the query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub image_url: Option<String>,
    pub lang: Option<String>,
}

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn failure(err: &HandlerError) -> Self {
        Self {
            status_code: 500,
            body: format!("{}{}", ERROR_PREFIX, err),
        }
    }
}

/// Labels that passed the confidence filter, plus their names joined for translation
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    pub items: Vec<LabelItem>,
    pub names: String,
}

/// Runs fetch -> detect -> translate -> format for a single request
pub struct RequestOrchestrator {
    fetcher: Arc<dyn ImageFetcher>,
    detector: Arc<dyn LabelDetector>,
    translator: Arc<dyn Translator>,
    vision_config: VisionConfig,
    translation_config: TranslationConfig,
}

impl RequestOrchestrator {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        detector: Arc<dyn LabelDetector>,
        translator: Arc<dyn Translator>,
        vision_config: VisionConfig,
        translation_config: TranslationConfig,
    ) -> Self {
        Self {
            fetcher,
            detector,
            translator,
            vision_config,
            translation_config,
        }
    }

    /// Handle one request. Never fails: errors become a 500 response.
    pub async fn handle(&self, request: LabelRequest) -> InvocationResponse {
        let span = tracing::info_span!("invocation", request_id = %Uuid::new_v4());

        async move {
            match self.run(request).await {
                Ok(body) => InvocationResponse::ok(body),
                Err(e) => {
                    error!(kind = e.kind(), "Request failed: {}", e);
                    InvocationResponse::failure(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: LabelRequest) -> HandlerResult<String> {
        let lang = request
            .lang
            .filter(|l| !l.is_empty())
            .ok_or_else(|| HandlerError::Validation("lang parameter is missing".to_string()))?;

        let image_url = request
            .image_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| HandlerError::Fetch("imageUrl parameter is missing".to_string()))?;

        info!("Downloading the image...");
        let buffer = self.fetcher.fetch(&image_url).await?;

        info!("Detecting labels...");
        let labels = self.detect_labels(&buffer).await?;

        info!("Translating language...");
        let names = self.translate_names(&labels.names, &lang).await?;

        info!("Handling the final object...");
        let lines = format_results(&names, &labels.items);

        info!("Finishing...");
        Ok(compose_body(&lines))
    }

    async fn detect_labels(&self, buffer: &[u8]) -> HandlerResult<LabelSet> {
        let detected = self.detector.detect_labels(buffer).await?;
        let labels = filter_labels(
            detected,
            self.vision_config.min_confidence,
            &self.translation_config.delimiter,
        );

        if labels.items.is_empty() {
            return Err(HandlerError::Detection(format!(
                "no label above {}% confidence",
                self.vision_config.min_confidence
            )));
        }

        Ok(labels)
    }

    async fn translate_names(&self, joined: &str, lang: &str) -> HandlerResult<Vec<String>> {
        let source = &self.translation_config.source_language;

        let translated = self
            .translator
            .translate(TranslateRequest::new(joined, source, lang))
            .await?;

        let delimiter = self
            .translator
            .translate(TranslateRequest::new(
                self.translation_config.delimiter.as_str(),
                source,
                lang,
            ))
            .await?;

        Ok(split_translated(
            &translated.translated_text,
            &delimiter.translated_text,
        ))
    }
}

/// Keep labels strictly above `min_confidence` and join their names with the delimiter word
pub fn filter_labels(detected: Vec<LabelItem>, min_confidence: f32, delimiter: &str) -> LabelSet {
    let items: Vec<LabelItem> = detected
        .into_iter()
        .filter(|item| item.confidence > min_confidence)
        .collect();

    let separator = format!(" {} ", delimiter);
    let names = items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(separator.as_str());

    LabelSet { items, names }
}

/// Split translated text back into names on the translated delimiter
pub fn split_translated(translated: &str, translated_delimiter: &str) -> Vec<String> {
    translated
        .split(&format!(" {} ", translated_delimiter))
        .map(str::to_string)
        .collect()
}

/// Pair names with confidences by position, one line per label.
///
/// Names and items are not checked against each other. Translation can reflow
/// the joined text or hit the delimiter word inside a name, so the counts may
/// differ; labels past the end of `names` render with an empty name.
pub fn format_results(names: &[String], items: &[LabelItem]) -> Vec<String> {
    if names.len() != items.len() {
        warn!(
            "Translated {} names for {} labels, confidences may be misaligned",
            names.len(),
            items.len()
        );
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let name = names.get(i).map(String::as_str).unwrap_or("");
            format!("{:.2}% de chances de ser {}\n", item.confidence, name)
        })
        .collect()
}

pub fn compose_body(lines: &[String]) -> String {
    format!("{}{}", BODY_PREFIX, lines.join(","))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::translate::interface::TranslateResponse;

    pub struct StubFetcher {
        pub result: Result<Vec<u8>, String>,
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, _image_url: &str) -> HandlerResult<Vec<u8>> {
            self.result.clone().map_err(HandlerError::Fetch)
        }
    }

    pub struct StubDetector {
        pub result: Result<Vec<LabelItem>, String>,
    }

    #[async_trait]
    impl LabelDetector for StubDetector {
        async fn detect_labels(&self, _image: &[u8]) -> HandlerResult<Vec<LabelItem>> {
            self.result.clone().map_err(HandlerError::Detection)
        }
    }

    /// Looks up translations in a fixed table and records every request
    pub struct StubTranslator {
        pub table: Vec<(&'static str, &'static str)>,
        pub fail: Option<&'static str>,
        pub calls: Mutex<Vec<TranslateRequest>>,
    }

    impl StubTranslator {
        pub fn new(table: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                table,
                fail: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, request: TranslateRequest) -> HandlerResult<TranslateResponse> {
            self.calls.lock().unwrap().push(request.clone());
            if let Some(msg) = self.fail {
                return Err(HandlerError::Translation(msg.to_string()));
            }
            let translated_text = self
                .table
                .iter()
                .find(|(from, _)| *from == request.text)
                .map(|(_, to)| to.to_string())
                .unwrap_or(request.text);
            Ok(TranslateResponse { translated_text })
        }
    }

    pub fn french_translator() -> StubTranslator {
        StubTranslator::new(vec![("Cat and Dog", "Chat et Chien"), ("Cat", "Chat"), ("and", "et")])
    }

    pub fn orchestrator(
        fetcher: StubFetcher,
        detector: StubDetector,
        translator: Arc<StubTranslator>,
    ) -> RequestOrchestrator {
        RequestOrchestrator::new(
            Arc::new(fetcher),
            Arc::new(detector),
            translator,
            VisionConfig::default(),
            TranslationConfig::default(),
        )
    }

    fn request(lang: Option<&str>) -> LabelRequest {
        LabelRequest {
            image_url: Some("https://x/img.png".to_string()),
            lang: lang.map(str::to_string),
        }
    }

    fn image_ok() -> StubFetcher {
        StubFetcher { result: Ok(vec![1, 2, 3]) }
    }

    #[test]
    fn filter_keeps_only_labels_above_threshold() {
        let set = filter_labels(
            vec![LabelItem::new("Cat", 95.2), LabelItem::new("Dog", 60.0)],
            80.0,
            "and",
        );
        assert_eq!(set.items, vec![LabelItem::new("Cat", 95.2)]);
        assert_eq!(set.names, "Cat");
    }

    #[test]
    fn threshold_is_strict() {
        let set = filter_labels(
            vec![LabelItem::new("Edge", 80.0), LabelItem::new("Cat", 81.0), LabelItem::new("Pet", 99.0)],
            80.0,
            "and",
        );
        assert_eq!(set.names, "Cat and Pet");
    }

    #[test]
    fn splits_on_translated_delimiter() {
        assert_eq!(split_translated("Chat et Chien", "et"), vec!["Chat", "Chien"]);
        assert_eq!(split_translated("Chat", "et"), vec!["Chat"]);
    }

    #[test]
    fn delimiter_inside_a_name_splits_it() {
        // known fragility of the joined translation
        assert_eq!(
            split_translated("Pain et beurre et Chien", "et"),
            vec!["Pain", "beurre", "Chien"]
        );
    }

    #[test]
    fn formats_two_decimals() {
        let lines = format_results(&["Cat".to_string()], &[LabelItem::new("Cat", 95.2)]);
        assert_eq!(lines, vec!["95.20% de chances de ser Cat\n"]);
    }

    #[test]
    fn missing_names_render_empty() {
        let lines = format_results(
            &["Chat".to_string()],
            &[LabelItem::new("Cat", 95.0), LabelItem::new("Dog", 90.5)],
        );
        assert_eq!(
            lines,
            vec!["95.00% de chances de ser Chat\n", "90.50% de chances de ser \n"]
        );
    }

    #[test]
    fn body_joins_lines_with_commas() {
        let body = compose_body(&["a\n".to_string(), "b\n".to_string()]);
        assert_eq!(body, "A imagem tem \n a\n,b\n");
    }

    #[tokio::test]
    async fn missing_lang_is_rejected() {
        let translator = Arc::new(french_translator());
        let orch = orchestrator(
            image_ok(),
            StubDetector { result: Ok(vec![]) },
            translator,
        );

        for lang in [None, Some("")] {
            let response = orch.handle(request(lang)).await;
            assert_eq!(response.status_code, 500);
            assert_eq!(response.body, "A error has occurred: lang parameter is missing");
        }
    }

    #[tokio::test]
    async fn missing_image_url_is_rejected() {
        let orch = orchestrator(
            image_ok(),
            StubDetector { result: Ok(vec![]) },
            Arc::new(french_translator()),
        );
        let response = orch
            .handle(LabelRequest { image_url: None, lang: Some("fr".to_string()) })
            .await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("imageUrl parameter is missing"));
    }

    #[tokio::test]
    async fn end_to_end_single_label() {
        let translator = Arc::new(french_translator());
        let orch = orchestrator(
            image_ok(),
            StubDetector {
                result: Ok(vec![LabelItem::new("Cat", 95.2), LabelItem::new("Dog", 60.0)]),
            },
            translator.clone(),
        );

        let response = orch.handle(request(Some("fr"))).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.starts_with("A imagem tem"));
        assert_eq!(response.body, "A imagem tem \n 95.20% de chances de ser Chat\n");

        let calls = translator.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].text, "Cat");
        assert_eq!(calls[1].text, "and");
        assert!(calls.iter().all(|c| c.source_lang == "en" && c.target_lang == "fr"));
    }

    #[tokio::test]
    async fn end_to_end_two_labels() {
        let orch = orchestrator(
            image_ok(),
            StubDetector {
                result: Ok(vec![LabelItem::new("Cat", 95.2), LabelItem::new("Dog", 88.0)]),
            },
            Arc::new(french_translator()),
        );

        let response = orch.handle(request(Some("fr"))).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body,
            "A imagem tem \n 95.20% de chances de ser Chat\n,88.00% de chances de ser Chien\n"
        );
    }

    #[tokio::test]
    async fn no_confident_labels_is_a_detection_error() {
        let translator = Arc::new(french_translator());
        let orch = orchestrator(
            image_ok(),
            StubDetector { result: Ok(vec![LabelItem::new("Dog", 60.0)]) },
            translator.clone(),
        );

        let response = orch.handle(request(Some("fr"))).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "A error has occurred: no label above 80% confidence");
        assert!(translator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_errors_become_500() {
        let fetch_fail = orchestrator(
            StubFetcher { result: Err("connection refused".to_string()) },
            StubDetector { result: Ok(vec![]) },
            Arc::new(french_translator()),
        );
        let response = fetch_fail.handle(request(Some("fr"))).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "A error has occurred: connection refused");

        let detect_fail = orchestrator(
            image_ok(),
            StubDetector { result: Err("InvalidImageFormatException".to_string()) },
            Arc::new(french_translator()),
        );
        let response = detect_fail.handle(request(Some("fr"))).await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("InvalidImageFormatException"));

        let mut translator = french_translator();
        translator.fail = Some("UnsupportedLanguagePairException");
        let translate_fail = orchestrator(
            image_ok(),
            StubDetector { result: Ok(vec![LabelItem::new("Cat", 95.2)]) },
            Arc::new(translator),
        );
        let response = translate_fail.handle(request(Some("xx"))).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "A error has occurred: UnsupportedLanguagePairException");
    }
}
