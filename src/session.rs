use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use crate::classifier::{self, IngredientClassifier};
use crate::images::ImageSource;
use crate::recipes::{Recipe, RecipeClient};
use crate::state::{Outcome, PublishedSlot, Snapshot};
use crate::PipelineError;

/// Supplies the photo to classify, e.g. a camera or gallery picker
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Returns `None` when the user backs out without choosing an image
    async fn pick(&self) -> Result<Option<ImageSource>, PipelineError>;
}

/// Picks a fixed file from disk
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: String,
}

impl PathPicker {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImagePicker for PathPicker {
    async fn pick(&self) -> Result<Option<ImageSource>, PipelineError> {
        Ok(Some(ImageSource::Path(self.path.clone())))
    }
}

/// Owns the pipeline stages and the state they publish
///
/// Every trigger can be invoked again at any time, including while an
/// earlier call of the same kind is still running. Results of a call that
/// was overtaken by a newer one come back as [`Outcome::Stale`] and leave
/// the published state alone. Failures never touch published state either.
pub struct RecipeSession {
    classifier: Arc<dyn IngredientClassifier>,
    recipe_client: RecipeClient,
    ingredients: PublishedSlot<String>,
    recipes: PublishedSlot<Recipe>,
}

impl RecipeSession {
    pub fn new(classifier: Arc<dyn IngredientClassifier>, recipe_client: RecipeClient) -> Self {
        Self {
            classifier,
            recipe_client,
            ingredients: PublishedSlot::new(),
            recipes: PublishedSlot::new(),
        }
    }

    /// Ask the picker for an image and classify it
    ///
    /// Returns `Ok(None)` if the picker was cancelled.
    pub async fn pick_and_classify(
        &self,
        picker: &dyn ImagePicker,
    ) -> Result<Option<Outcome<Vec<String>>>, PipelineError> {
        match picker.pick().await? {
            Some(source) => self.classify(&source).await.map(Some),
            None => {
                debug!("Image picker cancelled");
                Ok(None)
            }
        }
    }

    /// Recognize the ingredients in an image and publish them
    pub async fn classify(
        &self,
        source: &ImageSource,
    ) -> Result<Outcome<Vec<String>>, PipelineError> {
        let ticket = self.ingredients.begin();

        let labels = classifier::recognize_ingredients(self.classifier.as_ref(), source)
            .await
            .inspect_err(|e| warn!("Classification failed: {}", e))?;

        let outcome = self.ingredients.publish(ticket, labels);
        match &outcome {
            Outcome::Published(labels) => info!("Recognized ingredients: {:?}", labels),
            Outcome::Stale(_) => debug!(
                "Discarding stale classification (request {})",
                ticket.generation()
            ),
        }

        Ok(outcome)
    }

    /// Look up recipes for the currently published ingredients
    pub async fn fetch_recipes(&self) -> Result<Outcome<Vec<Recipe>>, PipelineError> {
        let ingredients = self.ingredients.snapshot();
        self.fetch_recipes_for(&ingredients).await
    }

    /// Look up recipes for an explicit ingredient list and publish them
    pub async fn fetch_recipes_for(
        &self,
        ingredients: &[String],
    ) -> Result<Outcome<Vec<Recipe>>, PipelineError> {
        let ticket = self.recipes.begin();

        let recipes = self
            .recipe_client
            .find_by_ingredients(ingredients)
            .await
            .inspect_err(|e| warn!("Recipe lookup failed: {}", e))?;

        let outcome = self.recipes.publish(ticket, recipes);
        if !outcome.is_published() {
            debug!(
                "Discarding stale recipe lookup (request {})",
                ticket.generation()
            );
        }

        Ok(outcome)
    }

    /// Currently published ingredient labels
    pub fn ingredients(&self) -> Snapshot<String> {
        self.ingredients.snapshot()
    }

    /// Currently published recipes
    pub fn recipes(&self) -> Snapshot<Recipe> {
        self.recipes.snapshot()
    }

    pub fn subscribe_ingredients(&self) -> watch::Receiver<Snapshot<String>> {
        self.ingredients.subscribe()
    }

    pub fn subscribe_recipes(&self) -> watch::Receiver<Snapshot<Recipe>> {
        self.recipes.subscribe()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.classifier_name()
    }
}
