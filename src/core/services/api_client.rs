use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::core::errors::{Result, VerseError};
use crate::core::models::agent::{AgentListRequest, AgentRunRequest};
use crate::core::models::conversation::{ConversationCreateRequest, ConversationListRequest};
use crate::core::models::message::MessageListRequest;
use crate::core::models::poetry::PoetrySearchRequest;
use crate::core::models::request::{HttpResponse, OutboundRequest};
use crate::core::models::user::{UserLoginRequest, UserRegisterRequest, UserUpdateRequest};
use crate::core::services::logger::{Logger, meta};
use crate::core::services::request_pipeline::RequestPipeline;
use crate::core::traits::transport::Transport;

/// One method per backend operation.
///
/// Each call is a direct pass-through to the request pipeline with a fixed
/// method and path; payloads are serialized as-is and responses returned
/// untouched for the caller to decode.
pub struct BackendApi<T: Transport> {
    pipeline: RequestPipeline<T>,
    logger: Arc<Logger>,
}

impl<T: Transport> BackendApi<T> {
    pub fn new(pipeline: RequestPipeline<T>, logger: Arc<Logger>) -> Self {
        Self { pipeline, logger }
    }

    pub fn pipeline(&self) -> &RequestPipeline<T> {
        &self.pipeline
    }

    async fn send(&self, request: OutboundRequest) -> Result<HttpResponse> {
        let request = request.with_header("Accept", "application/json");
        let method = request.method;
        let path = request.path.clone();
        self.logger.debug(
            format!("{method} {path}"),
            meta(json!({ "authenticated": self.pipeline.has_session() })),
        );

        match self.pipeline.send(request).await {
            Ok(response) => {
                self.logger.debug(
                    format!("{method} {path} -> {}", response.status),
                    meta(json!({ "bytes": response.body.len() })),
                );
                Ok(response)
            }
            Err(e) => {
                let message = if e.is_session_expired() {
                    "Session expired"
                } else {
                    "Request failed"
                };
                let status = match &e {
                    VerseError::SessionExpired { .. } => Some(401),
                    VerseError::HttpStatus { status, .. } => Some(*status),
                    _ => None,
                };
                self.logger.warn(
                    format!("{message}: {method} {path}"),
                    meta(json!({ "status": status, "error": e.to_string() })),
                );
                Err(e)
            }
        }
    }

    async fn post<B: Serialize>(&self, path: String, body: &B) -> Result<HttpResponse> {
        let body = serde_json::to_value(body).map_err(|e| VerseError::InvalidResponse {
            detail: format!("Failed to encode request body for {path}: {e}"),
        })?;
        self.send(OutboundRequest::post(path).with_body(body)).await
    }

    // ── Agents ──────────────────────────────────────────────────────

    pub async fn list_agents(&self, req: &AgentListRequest) -> Result<HttpResponse> {
        self.post("/agent/list".into(), req).await
    }

    pub async fn get_agent(&self, agent_id: i64) -> Result<HttpResponse> {
        self.send(OutboundRequest::get(format!("/agent/{agent_id}"))).await
    }

    pub async fn run_agent(&self, agent_id: i64, req: &AgentRunRequest) -> Result<HttpResponse> {
        self.post(format!("/agent/{agent_id}/run"), req).await
    }

    // ── Conversations ───────────────────────────────────────────────

    pub async fn create_conversation(&self, req: &ConversationCreateRequest) -> Result<HttpResponse> {
        self.post("/conversation/create".into(), req).await
    }

    pub async fn delete_conversation(&self, conversation_id: i64) -> Result<HttpResponse> {
        self.send(OutboundRequest::delete(format!("/conversation/{conversation_id}")))
            .await
    }

    pub async fn list_messages(
        &self,
        conversation_id: i64,
        req: &MessageListRequest,
    ) -> Result<HttpResponse> {
        self.post(format!("/conversation/{conversation_id}/messages"), req)
            .await
    }

    pub async fn list_conversations(&self, req: &ConversationListRequest) -> Result<HttpResponse> {
        self.post("/conversation/list".into(), req).await
    }

    // ── Messages & search ───────────────────────────────────────────

    pub async fn get_message(&self, message_id: i64) -> Result<HttpResponse> {
        self.send(OutboundRequest::get(format!("/message/{message_id}"))).await
    }

    pub async fn search_poetry(&self, req: &PoetrySearchRequest) -> Result<HttpResponse> {
        self.post("/poetry/search".into(), req).await
    }

    // ── Auth ────────────────────────────────────────────────────────

    pub async fn register(&self, req: &UserRegisterRequest) -> Result<HttpResponse> {
        self.post("/auth/register".into(), req).await
    }

    pub async fn login(&self, req: &UserLoginRequest) -> Result<HttpResponse> {
        self.post("/auth/login".into(), req).await
    }

    pub async fn get_me(&self) -> Result<HttpResponse> {
        self.send(OutboundRequest::get("/auth/me")).await
    }

    pub async fn update_profile(&self, req: &UserUpdateRequest) -> Result<HttpResponse> {
        self.post("/auth/update".into(), req).await
    }
}
