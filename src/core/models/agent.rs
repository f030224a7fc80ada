use serde::{Deserialize, Serialize};

/// An agent as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "workflow")]
    pub workflow_key: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub llm_config: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentListResponse {
    pub total: u64,
    pub agents: Vec<AgentItem>,
}

/// Workflow an agent run is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    PoetryGame,
    RagChat,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRunRequest {
    pub user_input: String,
    pub conversation_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<u32>,
}

/// Reply of an agent run: either the bare text or `{ "message": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgentRunResponse {
    Text(String),
    Wrapped { message: String },
}

impl AgentRunResponse {
    pub fn into_message(self) -> String {
        match self {
            AgentRunResponse::Text(message) | AgentRunResponse::Wrapped { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_request_omits_unset_options() {
        let req = AgentRunRequest {
            user_input: "床前明月光".into(),
            conversation_id: 3,
            workflow: None,
            history_limit: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"user_input": "床前明月光", "conversation_id": 3}));
    }

    #[test]
    fn workflow_serializes_snake_case() {
        assert_eq!(serde_json::to_value(Workflow::PoetryGame).unwrap(), "poetry_game");
    }

    #[test]
    fn run_response_accepts_both_shapes() {
        let bare: AgentRunResponse = serde_json::from_value(json!("疑是地上霜")).unwrap();
        let wrapped: AgentRunResponse =
            serde_json::from_value(json!({"message": "疑是地上霜"})).unwrap();
        assert_eq!(bare.into_message(), "疑是地上霜");
        assert_eq!(wrapped.into_message(), "疑是地上霜");
    }

    #[test]
    fn agent_item_accepts_backend_workflow_field() {
        let item: AgentItem = serde_json::from_value(json!({
            "id": 1,
            "name": "飞花令",
            "workflow": "poetry_game",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(item.workflow_key, "poetry_game");
        assert!(item.parameters.is_none());
    }
}
