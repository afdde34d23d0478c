// Censor service - core business logic for image moderation.
//
// The service:
// - fetches the image bytes through the `ImageFetcher` port
// - submits them (base64) to the safety checker through `SafetyClassifier`
// - compares the returned score vector against configured thresholds
// - fails OPEN on any upstream error: an unreachable backend must degrade
//   moderation to a pass-through, never block legitimate content
//
// NO Discord dependencies here - just pure domain logic.

use super::censor_models::{
    BlockedMarker, CensorConfig, CensorError, Element, ImageRef, Verdict, CONCEPT_COUNT,
};
use super::render_pipeline::RenderHook;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

// ============================================================================
// PORTS
// ============================================================================

/// Fetches the raw bytes of an image by URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CensorError>;
}

/// Scores a base64-encoded image against the moderation categories.
///
/// Implementations must return exactly one score per concept category;
/// the service treats any other length as a malformed response.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    async fn concept_scores(&self, image_base64: &str) -> Result<Vec<f64>, CensorError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Image moderation service. Stateless per call: each evaluation is a pure
/// function of the image and the read-only configuration.
pub struct CensorService<F: ImageFetcher, C: SafetyClassifier> {
    fetcher: F,
    classifier: C,
    config: CensorConfig,
}

impl<F: ImageFetcher, C: SafetyClassifier> CensorService<F, C> {
    /// Create a new censor service. The configuration must already be
    /// validated - see `CensorConfig::validate`.
    pub fn new(fetcher: F, classifier: C, config: CensorConfig) -> Self {
        Self {
            fetcher,
            classifier,
            config,
        }
    }

    /// Moderate a single image.
    ///
    /// One fetch and one classification call per invocation, no retries, no
    /// caching. Every failure path logs exactly one error and passes the
    /// original image through unchanged.
    pub async fn evaluate(&self, image: ImageRef) -> Verdict {
        let bytes = match self.fetcher.fetch_bytes(&image.source).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to fetch image for moderation: {}", e);
                return Verdict::Pass(image);
            }
        };

        let encoded = BASE64.encode(&bytes);

        let scores = match self.classifier.concept_scores(&encoded).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::error!("Image classification failed: {}", e);
                return Verdict::Pass(image);
            }
        };

        if scores.len() != CONCEPT_COUNT {
            tracing::error!(
                expected = CONCEPT_COUNT,
                actual = scores.len(),
                "Classifier returned a score vector of unexpected length"
            );
            return Verdict::Pass(image);
        }

        if self.config.debug {
            tracing::info!(scores = ?scores, source = %image.source, "Image concept scores");
        }

        if self.is_unsafe(&scores) {
            Verdict::Blocked(BlockedMarker::unsafe_image())
        } else {
            Verdict::Pass(image)
        }
    }

    /// Unsafe iff any offset-adjusted score exceeds its category threshold.
    /// Equality never triggers a block.
    fn is_unsafe(&self, scores: &[f64]) -> bool {
        scores
            .iter()
            .zip(self.config.threshold.iter())
            .any(|(score, threshold)| score + self.config.offset > *threshold)
    }
}

/// Render-time interception: any component asking the host to render an
/// image element gets routed through moderation.
#[async_trait]
impl<F: ImageFetcher, C: SafetyClassifier> RenderHook for CensorService<F, C> {
    async fn render(&self, element: Element) -> Element {
        match element {
            Element::Image(image) => self.evaluate(image).await.into_element(),
            other => other,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::censor::censor_models::UNSAFE_IMAGE_KEY;

    /// Fetcher that hands back canned bytes, or fails like a dead CDN.
    struct MockFetcher {
        bytes: Option<Vec<u8>>,
    }

    impl MockFetcher {
        fn ok() -> Self {
            Self {
                bytes: Some(vec![0xFF, 0xD8, 0xFF]),
            }
        }

        fn failing() -> Self {
            Self { bytes: None }
        }
    }

    #[async_trait]
    impl ImageFetcher for MockFetcher {
        async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>, CensorError> {
            self.bytes
                .clone()
                .ok_or_else(|| CensorError::Fetch("connection refused".to_string()))
        }
    }

    /// Classifier that returns a canned score vector, times out, or answers
    /// without the concept_scores field.
    enum MockClassifier {
        Scores(Vec<f64>),
        Failing,
        MissingScores,
    }

    #[async_trait]
    impl SafetyClassifier for MockClassifier {
        async fn concept_scores(&self, _image_base64: &str) -> Result<Vec<f64>, CensorError> {
            match self {
                MockClassifier::Scores(scores) => Ok(scores.clone()),
                MockClassifier::Failing => {
                    Err(CensorError::Classify("request timed out".to_string()))
                }
                MockClassifier::MissingScores => Err(CensorError::MissingScores),
            }
        }
    }

    fn config() -> CensorConfig {
        CensorConfig {
            endpoint: "http://localhost:4210/check_safety".to_string(),
            ..Default::default()
        }
    }

    fn image() -> ImageRef {
        ImageRef::new("https://cdn.example.com/picture.png")
    }

    fn service(
        fetcher: MockFetcher,
        classifier: MockClassifier,
        config: CensorConfig,
    ) -> CensorService<MockFetcher, MockClassifier> {
        CensorService::new(fetcher, classifier, config)
    }

    #[tokio::test]
    async fn test_all_zero_scores_with_default_offset_pass() {
        // 0 + (-0.016) > 0 is false for every category.
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(vec![0.0; CONCEPT_COUNT]),
            config(),
        );

        let verdict = svc.evaluate(image()).await;

        assert_eq!(verdict, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_single_high_score_blocks() {
        let mut scores = vec![0.0; CONCEPT_COUNT];
        scores[0] = 0.9;
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(scores),
            CensorConfig {
                offset: 0.0,
                ..config()
            },
        );

        let verdict = svc.evaluate(image()).await;

        assert!(matches!(verdict, Verdict::Blocked(ref marker) if marker.message_key == UNSAFE_IMAGE_KEY));
    }

    #[tokio::test]
    async fn test_equality_never_blocks() {
        // score + offset == threshold must be safe in every category.
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(vec![0.5; CONCEPT_COUNT]),
            CensorConfig {
                offset: 0.0,
                threshold: vec![0.5; CONCEPT_COUNT],
                ..config()
            },
        );

        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_offset_pushes_scores_over_threshold() {
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(vec![0.5; CONCEPT_COUNT]),
            CensorConfig {
                offset: 0.01,
                threshold: vec![0.5; CONCEPT_COUNT],
                ..config()
            },
        );

        assert!(matches!(svc.evaluate(image()).await, Verdict::Blocked(_)));
    }

    #[tokio::test]
    async fn test_decision_is_monotone_in_scores() {
        // Raising one score can only move the decision towards "blocked".
        let threshold = vec![0.3; CONCEPT_COUNT];
        let base = vec![0.1; CONCEPT_COUNT];

        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(base.clone()),
            CensorConfig {
                offset: 0.0,
                threshold: threshold.clone(),
                ..config()
            },
        );
        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));

        for i in 0..CONCEPT_COUNT {
            let mut raised = base.clone();
            raised[i] = 0.9;
            let svc = service(
                MockFetcher::ok(),
                MockClassifier::Scores(raised),
                CensorConfig {
                    offset: 0.0,
                    threshold: threshold.clone(),
                    ..config()
                },
            );
            assert!(
                matches!(svc.evaluate(image()).await, Verdict::Blocked(_)),
                "raising score {} should block",
                i
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_open() {
        let svc = service(
            MockFetcher::failing(),
            MockClassifier::Scores(vec![1.0; CONCEPT_COUNT]),
            config(),
        );

        // Even with scores that would block, an unfetchable image passes.
        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_classifier_failure_fails_open() {
        let svc = service(MockFetcher::ok(), MockClassifier::Failing, config());

        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_missing_scores_fails_open() {
        let svc = service(MockFetcher::ok(), MockClassifier::MissingScores, config());

        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_wrong_score_length_fails_open() {
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(vec![1.0; 3]),
            config(),
        );

        assert_eq!(svc.evaluate(image()).await, Verdict::Pass(image()));
    }

    #[tokio::test]
    async fn test_pass_preserves_rendering_attributes() {
        let original = ImageRef::with_summary("https://cdn.example.com/cat.png", "cat.png");
        let svc = service(
            MockFetcher::ok(),
            MockClassifier::Scores(vec![0.0; CONCEPT_COUNT]),
            config(),
        );

        assert_eq!(svc.evaluate(original.clone()).await, Verdict::Pass(original));
    }

    #[tokio::test]
    async fn test_render_hook_rewrites_only_images() {
        let svc = service(MockFetcher::ok(), MockClassifier::Failing, config());

        let text = Element::Text("hello".to_string());
        assert_eq!(svc.render(text.clone()).await, text);

        let img = Element::Image(image());
        // Classifier is down, so the image passes through unchanged.
        assert_eq!(svc.render(img.clone()).await, img);
    }
}
