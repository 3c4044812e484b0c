use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Recipe search API settings
    #[serde(default)]
    pub recipes: RecipeApiConfig,
    /// Ingredient classifier settings
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Configuration for the recipe search API
#[derive(Debug, Deserialize, Clone)]
pub struct RecipeApiConfig {
    /// Base URL of the recipe search service
    #[serde(default = "default_recipes_base_url")]
    pub base_url: String,
    /// API key (can also be set via SPOONACULAR_API_KEY)
    pub api_key: Option<String>,
    /// Number of recipes to request
    #[serde(default = "default_number")]
    pub number: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for RecipeApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_recipes_base_url(),
            api_key: None,
            number: default_number(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for the image classifier
#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Base URL of the vision service
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    /// API key (can also be set via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Side length in pixels of the square model input
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    /// Number of labels requested from the model before ranking
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_vision_base_url(),
            api_key: None,
            input_size: default_input_size(),
            max_results: default_max_results(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_recipes_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_vision_base_url() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_number() -> u32 {
    5
}

fn default_input_size() -> u32 {
    224
}

fn default_max_results() -> u32 {
    10
}

fn default_timeout() -> u64 {
    30
}

/// Turn a configured timeout into a request timeout. Zero is rejected.
pub(crate) fn request_timeout(section: &str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::Message(format!(
            "{}.timeout must be at least 1 second",
            section
        )));
    }
    Ok(Duration::from_secs(seconds))
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SNAP_RECIPES__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SNAP_RECIPES__RECIPES__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the lookup order.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: SNAP_RECIPES__RECIPES__API_KEY
        .add_source(
            Environment::with_prefix("SNAP_RECIPES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_values() {
        assert_eq!(default_number(), 5);
        assert_eq!(default_input_size(), 224);
        assert_eq!(default_max_results(), 10);
        assert_eq!(default_timeout(), 30);
    }

    #[test]
    fn test_request_timeout_rejects_zero() {
        assert_eq!(
            request_timeout("recipes", 12).unwrap(),
            Duration::from_secs(12)
        );
        let err = request_timeout("classifier", 0).unwrap_err();
        assert!(err.to_string().contains("classifier.timeout"));
    }

    #[test]
    fn test_recipe_config_default() {
        let recipes = RecipeApiConfig::default();
        assert_eq!(recipes.base_url, "https://api.spoonacular.com");
        assert!(recipes.api_key.is_none());
        assert_eq!(recipes.number, 5);
    }

    #[test]
    fn test_classifier_config_default() {
        let classifier = ClassifierConfig::default();
        assert_eq!(classifier.base_url, "https://vision.googleapis.com");
        assert_eq!(classifier.input_size, 224);
    }

    #[test]
    fn test_load_config_without_file() {
        // Clear any environment variables that might interfere
        let keys_to_clear: Vec<String> = env::vars()
            .filter(|(k, _)| k.starts_with("SNAP_RECIPES__"))
            .map(|(k, _)| k)
            .collect();

        for key in keys_to_clear {
            env::remove_var(&key);
        }

        // Every field has a default, so an empty environment still loads
        let config = load_config().unwrap();
        assert_eq!(config.recipes.number, 5);
        assert_eq!(config.classifier.max_results, 10);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[recipes]\napi_key = \"abc\"\nnumber = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.recipes.api_key.as_deref(), Some("abc"));
        assert_eq!(config.recipes.number, 3);
        assert_eq!(config.recipes.timeout, 30);
        assert_eq!(config.classifier.input_size, 224);
    }
}
