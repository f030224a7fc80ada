use serde::{Deserialize, Serialize};

/// Retrieval strategy for poetry search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Keyword,
    Vector,
    Hybrid,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoetrySearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoetrySearchItem {
    pub id: i64,
    pub title: String,
    pub dynasty: String,
    pub writer: String,
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoetrySearchResponse {
    pub total: u64,
    pub items: Vec<PoetrySearchItem>,
}
