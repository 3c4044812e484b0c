use std::sync::Arc;
use std::time::Duration;

use crate::classifier::{GoogleVisionClassifier, IngredientClassifier};
use crate::config::AppConfig;
use crate::recipes::RecipeClient;
use crate::session::RecipeSession;
use crate::PipelineError;

/// Builder for configuring a [`RecipeSession`]
///
/// Anything not set explicitly comes from [`AppConfig::load`].
#[derive(Default)]
pub struct RecipeSessionBuilder {
    classifier: Option<Arc<dyn IngredientClassifier>>,
    config: Option<AppConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl RecipeSessionBuilder {
    /// Use a custom classifier instead of the configured Vision one
    ///
    /// # Example
    /// ```no_run
    /// use snap_recipes::{GoogleVisionClassifier, RecipeSession};
    /// use std::sync::Arc;
    ///
    /// let vision = GoogleVisionClassifier::with_base_url(
    ///     "vision-key".to_string(),
    ///     "https://vision.googleapis.com".to_string(),
    /// );
    /// let builder = RecipeSession::builder().classifier(Arc::new(vision));
    /// ```
    pub fn classifier(mut self, classifier: Arc<dyn IngredientClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Use this configuration instead of loading one from file/environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the recipe search API key
    ///
    /// # Example
    /// ```
    /// use snap_recipes::RecipeSession;
    ///
    /// let builder = RecipeSession::builder().api_key("your-api-key");
    /// ```
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point the recipe client at a different server
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a timeout for recipe search requests
    ///
    /// # Example
    /// ```
    /// use snap_recipes::RecipeSession;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeSession::builder().timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Build the session
    ///
    /// # Errors
    /// Returns `PipelineError` if:
    /// - Configuration cannot be loaded
    /// - No recipe API key is available
    /// - No classifier was given and the Vision classifier has no API key
    /// - The timeout is zero
    pub fn build(self) -> Result<RecipeSession, PipelineError> {
        let mut config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };

        if let Some(api_key) = self.api_key {
            config.recipes.api_key = Some(api_key);
        }
        if let Some(base_url) = self.base_url {
            config.recipes.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(PipelineError::BuilderError(
                    "Timeout must be greater than zero".to_string(),
                ));
            }
            config.recipes.timeout = timeout.as_secs().max(1);
        }

        let classifier: Arc<dyn IngredientClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => Arc::new(GoogleVisionClassifier::new(&config.classifier)?),
        };

        let recipe_client = RecipeClient::new(&config.recipes)?;
        Ok(RecipeSession::new(classifier, recipe_client))
    }
}

impl RecipeSession {
    /// Creates a new builder for a recipe session
    pub fn builder() -> RecipeSessionBuilder {
        RecipeSessionBuilder::default()
    }
}
