use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::classifier::{Classification, IngredientClassifier};
use crate::config::{request_timeout, ClassifierConfig};
use crate::images::PixelBuffer;
use crate::PipelineError;

/// Classifier backed by the Google Cloud Vision label detection model
pub struct GoogleVisionClassifier {
    client: Client,
    api_key: String,
    base_url: String,
    input_size: u32,
    max_results: u32,
}

impl GoogleVisionClassifier {
    /// Create a new Vision classifier from configuration
    pub fn new(config: &ClassifierConfig) -> Result<Self, PipelineError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                PipelineError::ModelLoad(
                    "GOOGLE_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(request_timeout("classifier", config.timeout)?)
            .build()?;

        Ok(GoogleVisionClassifier {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            input_size: config.input_size,
            max_results: config.max_results,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GoogleVisionClassifier {
            client: Client::new(),
            api_key,
            base_url,
            input_size: ClassifierConfig::default().input_size,
            max_results: ClassifierConfig::default().max_results,
        }
    }
}

#[async_trait]
impl IngredientClassifier for GoogleVisionClassifier {
    fn classifier_name(&self) -> &str {
        "google_vision"
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    async fn classify(&self, pixels: &PixelBuffer) -> Result<Vec<Classification>, PipelineError> {
        let base64_image = STANDARD.encode(pixels.encode_png().await?);

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": base64_image
                },
                "features": [{
                    "type": "LABEL_DETECTION",
                    "maxResults": self.max_results
                }]
            }]
        });

        debug!("Sending label detection request to Google Vision API");

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", &self.api_key)])
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| PipelineError::Inference(format!("Vision request failed: {}", e)))?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Inference(format!(
                "Google Vision API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("Google Vision API response: {:?}", response_body);

        parse_label_annotations(&response_body)
    }
}

/// Pull `(description, score)` pairs out of an `images:annotate` response
fn parse_label_annotations(body: &Value) -> Result<Vec<Classification>, PipelineError> {
    let first = &body["responses"][0];
    if first.is_null() {
        return Err(PipelineError::Inference(
            "Vision response contained no results".to_string(),
        ));
    }

    if let Some(message) = first["error"]["message"].as_str() {
        return Err(PipelineError::Inference(message.to_string()));
    }

    // An image with nothing recognisable has no labelAnnotations key at all
    let Some(annotations) = first["labelAnnotations"].as_array() else {
        return Ok(Vec::new());
    };

    Ok(annotations
        .iter()
        .filter_map(|annotation| {
            let label = annotation["description"].as_str()?;
            let score = annotation["score"].as_f64().unwrap_or(0.0);
            Some(Classification::new(label, score as f32))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::{sample_png, to_pixel_buffer};
    use mockito::{Matcher, Server};

    fn pixels() -> PixelBuffer {
        to_pixel_buffer(&sample_png(12, 12), 8).unwrap()
    }

    #[tokio::test]
    async fn test_classify() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/images:annotate")
            .match_query(Matcher::UrlEncoded("key".into(), "fake_api_key".into()))
            .match_body(Matcher::Regex("LABEL_DETECTION".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "responses": [{
                        "labelAnnotations": [
                            {"description": "Tomato", "score": 0.97},
                            {"description": "Vegetable", "score": 0.91},
                            {"score": 0.5}
                        ]
                    }]
                }"#,
            )
            .create_async()
            .await;

        let classifier =
            GoogleVisionClassifier::with_base_url("fake_api_key".to_string(), server.url());

        let result = classifier.classify(&pixels()).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].label, "Tomato");
        assert!((result[0].confidence - 0.97).abs() < 1e-6);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_classify_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/images:annotate")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "API key not valid"}}"#)
            .create_async()
            .await;

        let classifier =
            GoogleVisionClassifier::with_base_url("bad_key".to_string(), server.url());

        let result = classifier.classify(&pixels()).await;
        assert!(matches!(result, Err(PipelineError::Inference(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_classify_unreachable_is_inference_error() {
        // Nothing listens on the discard port
        let classifier = GoogleVisionClassifier::with_base_url(
            "fake_api_key".to_string(),
            "http://127.0.0.1:9".to_string(),
        );

        let result = classifier.classify(&pixels()).await;
        match result {
            Err(PipelineError::Inference(message)) => {
                assert!(message.contains("Vision request failed"))
            }
            other => panic!("Expected inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_per_image_error() {
        let body = json!({"responses": [{"error": {"code": 3, "message": "Bad image data."}}]});
        let result = parse_label_annotations(&body);
        match result {
            Err(PipelineError::Inference(message)) => assert_eq!(message, "Bad image data."),
            other => panic!("Expected inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_no_labels() {
        let body = json!({"responses": [{}]});
        assert!(parse_label_annotations(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_responses() {
        let body = json!({"responses": []});
        assert!(parse_label_annotations(&body).is_err());
    }

    #[test]
    fn test_new_requires_api_key() {
        let original_key = std::env::var("GOOGLE_API_KEY").ok();
        std::env::remove_var("GOOGLE_API_KEY");

        let result = GoogleVisionClassifier::new(&ClassifierConfig::default());
        assert!(matches!(result, Err(PipelineError::ModelLoad(_))));

        // Restore original key if it existed
        if let Some(key) = original_key {
            std::env::set_var("GOOGLE_API_KEY", key);
        }
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let config = ClassifierConfig {
            api_key: Some("fake_api_key".to_string()),
            timeout: 0,
            ..Default::default()
        };
        let result = GoogleVisionClassifier::new(&config);
        assert!(matches!(result, Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_classifier_name() {
        let classifier = GoogleVisionClassifier::with_base_url(
            "fake_api_key".to_string(),
            "http://localhost".to_string(),
        );
        assert_eq!(classifier.classifier_name(), "google_vision");
        assert_eq!(classifier.input_size(), 224);
    }
}
