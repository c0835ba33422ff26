//! Colloquy client library exports.

pub mod api_client;
pub mod config;
pub mod error;
pub mod events;
pub mod gql;
pub mod poll;
pub mod types;

pub use api_client::ApiClient;
pub use config::{AuthConfig, ClientConfig, PollSettings};
pub use error::ClientError;
pub use events::ClientEvent;
pub use poll::{spawn_poll_manager, ConversationFetcher, PollConfig, PollHandle, PollPhase};
