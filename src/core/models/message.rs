use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageItem {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageListRequest {
    pub conversation_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Message page, either the full wrapper or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageListResponse {
    Page {
        total: u64,
        messages: Vec<MessageItem>,
    },
    List(Vec<MessageItem>),
}

impl MessageListResponse {
    /// Total on the server; a bare list counts only itself.
    pub fn total(&self) -> u64 {
        match self {
            MessageListResponse::Page { total, .. } => *total,
            MessageListResponse::List(messages) => messages.len() as u64,
        }
    }

    pub fn into_messages(self) -> Vec<MessageItem> {
        match self {
            MessageListResponse::Page { messages, .. } => messages,
            MessageListResponse::List(messages) => messages,
        }
    }
}
