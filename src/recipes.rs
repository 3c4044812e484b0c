use log::{debug, info};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{request_timeout, RecipeApiConfig};
use crate::PipelineError;

const SEARCH_PATH: &str = "/recipes/findByIngredients";

/// A recipe suggestion. Only the title survives from the API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
}

/// Client for the Spoonacular find-by-ingredients search
pub struct RecipeClient {
    client: Client,
    api_key: String,
    base_url: String,
    number: u32,
}

impl RecipeClient {
    /// Create a new recipe client from configuration
    pub fn new(config: &RecipeApiConfig) -> Result<Self, PipelineError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .ok_or(PipelineError::MissingApiKey("SPOONACULAR_API_KEY"))?;

        let client = Client::builder()
            .timeout(request_timeout("recipes", config.timeout)?)
            .build()?;

        Ok(RecipeClient {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            number: config.number,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        RecipeClient {
            client: Client::new(),
            api_key,
            base_url,
            number: RecipeApiConfig::default().number,
        }
    }

    /// Build the search URL for a list of ingredient labels
    ///
    /// Each label is percent-encoded exactly as given and the results are
    /// joined with a literal `,`. The server decodes the whole parameter
    /// before splitting on commas, so a label containing `,` would come back
    /// as two ingredients. Such labels, and blank ones, are rejected with
    /// [`PipelineError::InvalidIngredient`].
    pub fn search_url(&self, ingredients: &[String]) -> Result<Url, PipelineError> {
        if let Some(bad) = ingredients
            .iter()
            .find(|label| label.trim().is_empty() || label.contains(','))
        {
            return Err(PipelineError::InvalidIngredient(bad.clone()));
        }

        let url = format!(
            "{}{}?ingredients={}&number={}&apiKey={}",
            self.base_url,
            SEARCH_PATH,
            encode_ingredients(ingredients),
            self.number,
            urlencoding::encode(&self.api_key)
        );

        Url::parse(&url).map_err(|e| PipelineError::InvalidEndpoint(e.to_string()))
    }

    /// Look up recipes that use the given ingredients
    ///
    /// # Errors
    /// Returns an error if:
    /// - The list is empty
    /// - A label is blank or contains `,`
    /// - The request fails or the server answers with a non-2xx status
    /// - The body is not a JSON array
    pub async fn find_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, PipelineError> {
        if ingredients.is_empty() {
            return Err(PipelineError::NoIngredients);
        }

        let url = self.search_url(ingredients)?;
        debug!("Searching recipes for {} ingredients", ingredients.len());

        let response = self.client.get(url).send().await?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let recipes = parse_recipes(&body)?;
        info!("Found {} recipes", recipes.len());

        Ok(recipes)
    }
}

/// Percent-encode each label unchanged and join them with `,`
pub fn encode_ingredients(ingredients: &[String]) -> String {
    ingredients
        .iter()
        .map(|label| urlencoding::encode(label).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a search response into recipes
///
/// Entries without a string `title` are skipped; the rest keep their order.
pub fn parse_recipes(body: &str) -> Result<Vec<Recipe>, PipelineError> {
    let value: Value = serde_json::from_str(body)?;

    let entries = value.as_array().ok_or_else(|| {
        PipelineError::InvalidResponse(format!(
            "expected a JSON array of recipes, got {}",
            json_kind(&value)
        ))
    })?;

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("title")?.as_str())
        .map(|title| Recipe {
            title: title.to_string(),
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
