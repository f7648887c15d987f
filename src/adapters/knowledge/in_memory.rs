//! In-memory knowledge base.
//!
//! Term-overlap ranking over a fixed document set. Stands in for the
//! retrieval-similarity service; ranking quality is not the core's
//! concern, only the search/get_context contract.

use async_trait::async_trait;

use crate::ports::{KnowledgeError, KnowledgeRetriever, Snippet};

/// One stored document.
#[derive(Debug, Clone)]
struct Document {
    source: String,
    content: String,
}

/// In-memory implementation of [`KnowledgeRetriever`].
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    documents: Vec<Document>,
}

impl InMemoryKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document.
    pub fn with_document(mut self, source: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents.push(Document {
            source: source.into(),
            content: content.into(),
        });
        self
    }

    /// The default store policy documents.
    pub fn with_store_policies(self) -> Self {
        self.with_document(
            "shipping-policy",
            "Standard shipping takes 3-5 business days. Orders are delivered by courier \
             with a tracking number in the TH- format. Shipping is free for orders above $100.",
        )
        .with_document(
            "returns-policy",
            "Products can be returned within 14 days of delivery in their original \
             packaging. Refunds are processed to the original payment method within 7 days.",
        )
        .with_document(
            "payment-methods",
            "We currently accept cash on delivery. Card payments are coming soon.",
        )
        .with_document(
            "warranty",
            "All PC components carry a 1-year manufacturer warranty. Extended warranty \
             is available for CPUs and GPUs at checkout.",
        )
    }

    fn score(query: &str, content: &str) -> f32 {
        let content_lower = content.to_lowercase();
        let terms: Vec<&str> = query
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .collect();
        if terms.is_empty() {
            return 0.0;
        }
        let hits = terms
            .iter()
            .filter(|t| content_lower.contains(&t.to_lowercase()))
            .count();
        hits as f32 / terms.len() as f32
    }
}

#[async_trait]
impl KnowledgeRetriever for InMemoryKnowledgeBase {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Snippet>, KnowledgeError> {
        let mut scored: Vec<Snippet> = self
            .documents
            .iter()
            .map(|doc| Snippet {
                content: doc.content.clone(),
                source: doc.source.clone(),
                score: Self::score(query, &doc.content),
            })
            .filter(|s| s.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn get_context(
        &self,
        query: &str,
        max_length: usize,
    ) -> Result<String, KnowledgeError> {
        let snippets = self.search(query, 3).await?;
        if snippets.is_empty() {
            return Ok(String::new());
        }

        let mut context = String::new();
        for snippet in snippets {
            if context.len() + snippet.content.len() + 2 > max_length {
                break;
            }
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str(&snippet.content);
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_ranks_matching_documents_first() {
        let kb = InMemoryKnowledgeBase::new().with_store_policies();
        let results = kb.search("shipping delivery time", 3).await.unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].source, "shipping-policy");
    }

    #[tokio::test]
    async fn search_returns_empty_for_unrelated_queries() {
        let kb = InMemoryKnowledgeBase::new().with_store_policies();
        let results = kb.search("quantum entanglement", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn get_context_respects_max_length() {
        let kb = InMemoryKnowledgeBase::new().with_store_policies();
        let context = kb.get_context("shipping returns warranty", 120).await.unwrap();
        assert!(context.len() <= 120);
    }

    #[tokio::test]
    async fn get_context_is_empty_when_nothing_matches() {
        let kb = InMemoryKnowledgeBase::new().with_store_policies();
        let context = kb.get_context("xyzzy", 500).await.unwrap();
        assert!(context.is_empty());
    }
}
