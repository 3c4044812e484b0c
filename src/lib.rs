//! Recognize food ingredients in a photo and find recipes that use them.
//!
//! The pipeline has two stages: an [`IngredientClassifier`] turns one image
//! into up to five ranked ingredient labels, and a [`RecipeClient`] turns
//! those labels into recipe titles via the Spoonacular search API.
//! [`RecipeSession`] ties them together and publishes the latest results.
//!
//! ```no_run
//! # use snap_recipes::{ImageSource, RecipeSession};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = RecipeSession::builder().build()?;
//! session
//!     .classify(&ImageSource::Path("fridge.jpg".to_string()))
//!     .await?;
//! session.fetch_recipes().await?;
//! for recipe in session.recipes().iter() {
//!     println!("{}", recipe.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod classifier;
pub mod config;
pub mod error;
pub mod images;
pub mod recipes;
pub mod session;
pub mod state;

// UniFFI bindings module (always compiled, but only exports when feature enabled)
pub mod uniffi_bindings;

pub use builder::RecipeSessionBuilder;
pub use classifier::{
    rank_labels, Classification, GoogleVisionClassifier, IngredientClassifier, MAX_INGREDIENTS,
};
pub use config::AppConfig;
pub use error::PipelineError;
pub use images::{ImageSource, PixelBuffer};
pub use recipes::{Recipe, RecipeClient};
pub use session::{ImagePicker, PathPicker, RecipeSession};
pub use state::{Outcome, Snapshot};

/// Recognize the ingredients in an image file using the configured classifier
///
/// # Arguments
/// * `image_path` - Path to the image file
///
/// # Returns
/// Up to five ingredient labels, most confident first
pub async fn recognize_ingredients(image_path: &str) -> Result<Vec<String>, PipelineError> {
    let config = AppConfig::load()?;
    let vision = GoogleVisionClassifier::new(&config.classifier)?;
    classifier::recognize_ingredients(&vision, &ImageSource::Path(image_path.to_string())).await
}

/// Find recipes for a list of ingredients using the configured recipe API
///
/// # Arguments
/// * `ingredients` - Ingredient names, e.g. the output of [`recognize_ingredients`]
pub async fn find_recipes(ingredients: &[String]) -> Result<Vec<Recipe>, PipelineError> {
    let config = AppConfig::load()?;
    let client = RecipeClient::new(&config.recipes)?;
    client.find_by_ingredients(ingredients).await
}
