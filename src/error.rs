use thiserror::Error;

/// Errors that can occur anywhere in the photo-to-recipes pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Failed to read the image file
    #[error("Failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),

    /// Image bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Image could not be converted to the classifier's pixel format
    #[error("Image conversion failed: {0}")]
    ImageConversion(String),

    /// The classification model could not be loaded
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// The classification model failed to produce labels
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Failed to send the request or read the response
    #[error("Failed to fetch: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body was not valid JSON
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response was JSON but not in the expected shape
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// The request URL could not be built
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An ingredient label cannot be sent in a comma-separated query
    #[error("Invalid ingredient {0:?}: labels must be non-blank and contain no ','")]
    InvalidIngredient(String),

    /// A recipe lookup was requested without any ingredients
    #[error("No ingredients to search for")]
    NoIngredients,

    /// No API key was configured for the named service
    #[error("Missing API key: set {0} or add it to config.toml")]
    MissingApiKey(&'static str),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
