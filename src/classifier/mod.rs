mod google_vision;

pub use google_vision::GoogleVisionClassifier;

use async_trait::async_trait;
use log::debug;

use crate::images::{self, ImageSource, PixelBuffer, DEFAULT_INPUT_SIZE};
use crate::PipelineError;

/// Number of ranked labels kept from a classification
pub const MAX_INGREDIENTS: usize = 5;

/// One model output class with its score
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    /// Probability between 0.0 and 1.0
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A pretrained image-classification model used as a black box
#[async_trait]
pub trait IngredientClassifier: Send + Sync {
    /// Get the classifier name (e.g., "google_vision")
    fn classifier_name(&self) -> &str;

    /// Side length of the square pixel buffer the model expects
    fn input_size(&self) -> u32 {
        DEFAULT_INPUT_SIZE
    }

    /// Run one inference call. Results may come back in any order.
    async fn classify(&self, pixels: &PixelBuffer) -> Result<Vec<Classification>, PipelineError>;
}

/// Order classifications by descending confidence and keep the top labels
///
/// Labels are normalised first: ImageNet-style class names list synonyms
/// separated by commas ("bell pepper, capsicum"), so only the first name is
/// kept, trimmed. Entries that end up blank or score NaN are dropped. Ties
/// keep the model's order. The result can be passed to
/// [`RecipeClient::find_by_ingredients`](crate::RecipeClient::find_by_ingredients)
/// as is.
pub fn rank_labels(classifications: Vec<Classification>) -> Vec<String> {
    let mut ranked: Vec<Classification> = classifications
        .into_iter()
        .filter(|c| !c.confidence.is_nan())
        .filter_map(|c| {
            let label = normalize_label(&c.label)?;
            Some(Classification::new(label, c.confidence))
        })
        .collect();

    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
        .into_iter()
        .take(MAX_INGREDIENTS)
        .map(|c| c.label)
        .collect()
}

fn normalize_label(label: &str) -> Option<&str> {
    let name = label.split(',').next()?.trim();
    (!name.is_empty()).then_some(name)
}

/// Convert an image, classify it and return the top ingredient labels
pub async fn recognize_ingredients(
    classifier: &dyn IngredientClassifier,
    source: &ImageSource,
) -> Result<Vec<String>, PipelineError> {
    let pixels = images::load_pixels(source, classifier.input_size()).await?;
    let classifications = classifier.classify(&pixels).await?;
    debug!(
        "{} returned {} classifications",
        classifier.classifier_name(),
        classifications.len()
    );

    Ok(rank_labels(classifications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::sample_png;

    /// Returns the same classifications for every image
    struct FixedClassifier(Vec<Classification>);

    #[async_trait]
    impl IngredientClassifier for FixedClassifier {
        fn classifier_name(&self) -> &str {
            "fixed"
        }

        fn input_size(&self) -> u32 {
            8
        }

        async fn classify(
            &self,
            pixels: &PixelBuffer,
        ) -> Result<Vec<Classification>, PipelineError> {
            assert_eq!((pixels.width, pixels.height), (8, 8));
            Ok(self.0.clone())
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl IngredientClassifier for BrokenModel {
        fn classifier_name(&self) -> &str {
            "broken"
        }

        async fn classify(&self, _: &PixelBuffer) -> Result<Vec<Classification>, PipelineError> {
            Err(PipelineError::Inference("model crashed".to_string()))
        }
    }

    fn eight_labels() -> Vec<Classification> {
        vec![
            Classification::new("onion", 0.30),
            Classification::new("tomato", 0.95),
            Classification::new("garlic", 0.10),
            Classification::new("basil", 0.70),
            Classification::new("carrot", 0.05),
            Classification::new("pepper", 0.50),
            Classification::new("lemon", 0.20),
            Classification::new("egg", 0.60),
        ]
    }

    #[test]
    fn test_rank_keeps_top_five() {
        let labels = rank_labels(eight_labels());
        assert_eq!(labels, vec!["tomato", "basil", "egg", "pepper", "onion"]);
    }

    #[test]
    fn test_rank_ties_keep_model_order() {
        let labels = rank_labels(vec![
            Classification::new("first", 0.5),
            Classification::new("second", 0.5),
            Classification::new("top", 0.9),
        ]);
        assert_eq!(labels, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_rank_drops_nan_and_blank() {
        let labels = rank_labels(vec![
            Classification::new("flour", f32::NAN),
            Classification::new("  ", 0.9),
            Classification::new("sugar", 0.4),
        ]);
        assert_eq!(labels, vec!["sugar"]);
    }

    #[test]
    fn test_rank_normalizes_labels() {
        let labels = rank_labels(vec![
            Classification::new("  olive oil ", 0.8),
            Classification::new("bell pepper, capsicum", 0.7),
            Classification::new(", orphan synonym", 0.6),
        ]);
        assert_eq!(labels, vec!["olive oil", "bell pepper"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_labels(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_recognize_ingredients() {
        let classifier = FixedClassifier(eight_labels());
        let source = ImageSource::Bytes(sample_png(20, 10));

        let labels = recognize_ingredients(&classifier, &source).await.unwrap();
        assert_eq!(labels.len(), MAX_INGREDIENTS);
        assert_eq!(labels[0], "tomato");
    }

    #[tokio::test]
    async fn test_recognize_is_repeatable() {
        let classifier = FixedClassifier(eight_labels());
        let source = ImageSource::Bytes(sample_png(20, 10));

        let first = recognize_ingredients(&classifier, &source).await.unwrap();
        let second = recognize_ingredients(&classifier, &source).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_recognize_conversion_failure() {
        let classifier = FixedClassifier(eight_labels());
        let source = ImageSource::Bytes(b"not an image".to_vec());

        let result = recognize_ingredients(&classifier, &source).await;
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[tokio::test]
    async fn test_recognize_inference_failure() {
        let source = ImageSource::Bytes(sample_png(4, 4));
        let result = recognize_ingredients(&BrokenModel, &source).await;
        assert!(matches!(result, Err(PipelineError::Inference(_))));
    }
}
