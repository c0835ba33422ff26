//! HTTP client for the orchestration service.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gql;
use crate::types::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart,
    ConversationData, ConversationsData, CreateConversationRequest, CreateConversationResponse,
    GqlEnvelope, GqlRequest, NewConversation, RenameConversationRequest,
};
use colloquy_core::{Conversation, ConversationEdge, ConversationId};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    agent: String,
    auth_header: HeaderMap,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let auth_header = build_auth_headers(config)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            agent: config.agent.clone(),
            auth_header,
        })
    }

    /// Agent (model) name sent with completions.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub async fn get_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Conversation, ClientError> {
        let request = GqlRequest {
            query: gql::conversation_query(),
            variables: serde_json::json!({ "conversationId": conversation_id }),
        };
        let data: ConversationData = self.graphql(&request).await?;
        Ok(data.conversation)
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationEdge>, ClientError> {
        let request = GqlRequest {
            query: gql::conversations_query(),
            variables: serde_json::json!({}),
        };
        let data: ConversationsData = self.graphql(&request).await?;
        Ok(data.conversations.edges)
    }

    /// Send a user turn through the OpenAI-style completions endpoint.
    /// Attachments are `{file_name: data URL}` pairs.
    pub async fn send_chat(
        &self,
        conversation_id: ConversationId,
        text: &str,
        attachments: &BTreeMap<String, String>,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let mut content = vec![ContentPart::text(text)];
        for (file_name, data_url) in attachments {
            content.push(ContentPart::from_data_url(file_name, data_url)?);
        }
        let body = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            model: self.agent.clone(),
            user: conversation_id.to_string(),
        };
        tracing::debug!(%conversation_id, "sending chat completion");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(&body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    pub async fn create_conversation(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ConversationId, ClientError> {
        let body = CreateConversationRequest {
            conversation: NewConversation {
                name: name.to_string(),
                description: description.map(str::to_string),
            },
        };
        let url = format!("{}/v1/conversation", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(&body)
            .send()
            .await?;
        let created: CreateConversationResponse = self.parse_response(response).await?;
        Ok(created.conversation.id)
    }

    pub async fn rename_conversation(
        &self,
        conversation_id: ConversationId,
        new_name: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/v1/conversation/{}", self.base_url, conversation_id);
        let response = self
            .client
            .put(url)
            .headers(self.auth_header.clone())
            .json(&RenameConversationRequest {
                name: new_name.to_string(),
            })
            .send()
            .await?;
        self.expect_success(response).await
    }

    pub async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(), ClientError> {
        let url = format!("{}/v1/conversation/{}", self.base_url, conversation_id);
        let response = self
            .client
            .delete(url)
            .headers(self.auth_header.clone())
            .send()
            .await?;
        self.expect_success(response).await
    }

    async fn graphql<T: serde::de::DeserializeOwned>(
        &self,
        request: &GqlRequest,
    ) -> Result<T, ClientError> {
        let url = format!("{}/graphql", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(request)
            .send()
            .await?;
        let envelope: GqlEnvelope<T> = self.parse_response(response).await?;
        if let Some(error) = envelope.errors.first() {
            tracing::warn!(message = %error.message, "GraphQL query returned errors");
            return Err(ClientError::GraphQL {
                message: error.message.clone(),
            });
        }
        envelope.data.ok_or(ClientError::MissingData)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await?;
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => body.message,
                Err(_) => text,
            };
            tracing::warn!(status = status.as_u16(), %message, "request failed");
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn expect_success(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("agent", &self.agent)
            .field("auth", &"[REDACTED]")
            .finish()
    }
}

fn build_auth_headers(config: &ClientConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &config.auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ClientError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &config.auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
