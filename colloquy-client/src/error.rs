//! Error types for the service client.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("GraphQL error: {message}")]
    GraphQL { message: String },
    #[error("Response carried no data")]
    MissingData,
    #[error("Attachment {file_name} rejected: {reason}")]
    Attachment { file_name: String, reason: String },
    #[error("Config error: {0}")]
    Config(String),
}
