use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ConversationCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub agent_id: i64,
}

/// The new conversation id, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConversationCreateResponse {
    Id(i64),
    Wrapped { conversation_id: i64 },
}

impl ConversationCreateResponse {
    pub fn id(&self) -> i64 {
        match self {
            ConversationCreateResponse::Id(id)
            | ConversationCreateResponse::Wrapped {
                conversation_id: id,
            } => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationListRequest {
    pub agent_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationItem {
    pub id: i64,
    #[serde(default)]
    pub agent_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Conversation page, either `{conversations, total}` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConversationListResponse {
    Page {
        conversations: Vec<ConversationItem>,
        total: u64,
    },
    List(Vec<ConversationItem>),
}

impl ConversationListResponse {
    /// Total on the server; a bare list counts only itself.
    pub fn total(&self) -> u64 {
        match self {
            ConversationListResponse::Page { total, .. } => *total,
            ConversationListResponse::List(items) => items.len() as u64,
        }
    }

    pub fn into_items(self) -> Vec<ConversationItem> {
        match self {
            ConversationListResponse::Page { conversations, .. } => conversations,
            ConversationListResponse::List(items) => items,
        }
    }
}
