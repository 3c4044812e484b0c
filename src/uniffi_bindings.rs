//! UniFFI bindings for snap-recipes
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;

use crate::classifier::{self, GoogleVisionClassifier};
use crate::config::AppConfig;
use crate::{ImageSource, PipelineError, Recipe, RecipeClient};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub title: String,
}

impl From<Recipe> for FfiRecipe {
    fn from(recipe: Recipe) -> Self {
        FfiRecipe {
            title: recipe.title,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiPipelineError {
    /// The image could not be read, decoded or converted
    ImageError { message: String },
    /// The classification model could not be loaded or failed
    ClassifierError { message: String },
    /// The recipe request failed or returned an error status
    FetchError { message: String },
    /// The recipe response could not be parsed
    ParseError { message: String },
    /// Invalid input provided
    InvalidInput { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiPipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiPipelineError::ImageError { message } => write!(f, "Image error: {}", message),
            FfiPipelineError::ClassifierError { message } => {
                write!(f, "Classifier error: {}", message)
            }
            FfiPipelineError::FetchError { message } => write!(f, "Fetch error: {}", message),
            FfiPipelineError::ParseError { message } => write!(f, "Parse error: {}", message),
            FfiPipelineError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FfiPipelineError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiPipelineError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiPipelineError {}

impl From<PipelineError> for FfiPipelineError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::ImageRead(_)
            | PipelineError::ImageDecode(_)
            | PipelineError::ImageConversion(_) => FfiPipelineError::ImageError { message },
            PipelineError::ModelLoad(_) | PipelineError::Inference(_) => {
                FfiPipelineError::ClassifierError { message }
            }
            PipelineError::Fetch(_)
            | PipelineError::HttpStatus { .. }
            | PipelineError::InvalidEndpoint(_) => FfiPipelineError::FetchError { message },
            PipelineError::Parse(_) | PipelineError::InvalidResponse(_) => {
                FfiPipelineError::ParseError { message }
            }
            PipelineError::NoIngredients
            | PipelineError::InvalidIngredient(_)
            | PipelineError::BuilderError(_) => FfiPipelineError::InvalidInput { message },
            PipelineError::MissingApiKey(_) | PipelineError::ConfigError(_) => {
                FfiPipelineError::ConfigError { message }
            }
        }
    }
}

/// Settings that override the loaded configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiSessionConfig {
    /// Recipe search API key (uses config/environment if not specified)
    pub recipe_api_key: Option<String>,
    /// Vision API key (uses config/environment if not specified)
    pub vision_api_key: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
}

impl FfiSessionConfig {
    fn apply(self) -> Result<AppConfig, FfiPipelineError> {
        let mut config = AppConfig::load().map_err(PipelineError::from)?;

        if let Some(key) = self.recipe_api_key {
            config.recipes.api_key = Some(key);
        }
        if let Some(key) = self.vision_api_key {
            config.classifier.api_key = Some(key);
        }
        if let Some(timeout) = self.timeout_seconds {
            config.recipes.timeout = timeout;
            config.classifier.timeout = timeout;
        }

        Ok(config)
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiPipelineError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiPipelineError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Recognize the ingredients in a photo
///
/// # Arguments
/// * `image_path` - Path to the image file
/// * `config` - Optional configuration overrides
///
/// # Returns
/// Up to five ingredient labels, most confident first
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn recognize_ingredients(
    image_path: String,
    config: Option<FfiSessionConfig>,
) -> Result<Vec<String>, FfiPipelineError> {
    let config = config.unwrap_or_default().apply()?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let vision = GoogleVisionClassifier::new(&config.classifier)?;
        let labels =
            classifier::recognize_ingredients(&vision, &ImageSource::Path(image_path)).await?;
        Ok(labels)
    })
}

/// Find recipes that use the given ingredients
///
/// # Arguments
/// * `ingredients` - Ingredient names
/// * `config` - Optional configuration overrides
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn find_recipes(
    ingredients: Vec<String>,
    config: Option<FfiSessionConfig>,
) -> Result<Vec<FfiRecipe>, FfiPipelineError> {
    let config = config.unwrap_or_default().apply()?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let client = RecipeClient::new(&config.recipes)?;
        let recipes = client.find_by_ingredients(&ingredients).await?;
        Ok(recipes.into_iter().map(FfiRecipe::from).collect())
    })
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
