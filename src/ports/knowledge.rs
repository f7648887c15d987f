//! Knowledge Retrieval Port - black-box similarity search.
//!
//! Backs the knowledge tools with ranked snippets about products,
//! policies, shipping and returns. Ranking quality is the retriever's
//! concern, not the core's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from the knowledge retriever.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge base unavailable: {0}")]
    Unavailable(String),
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Snippet text.
    pub content: String,
    /// Source document identifier.
    pub source: String,
    /// Relevance score, higher is better.
    pub score: f32,
}

/// Port for knowledge-base retrieval.
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    /// Returns the top-k snippets for a query.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Snippet>, KnowledgeError>;

    /// Returns a formatted context blob for a query, bounded by length.
    async fn get_context(&self, query: &str, max_length: usize)
        -> Result<String, KnowledgeError>;
}
