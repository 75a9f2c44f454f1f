use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use super::prompt::render;
use crate::domain::{
    ports::{LlmService, VectorStore},
    Answer, AnswerOutcome, DomainError, Embedding,
};
use crate::infrastructure::config::RagPrompts;

/// Retrieval plus grounded generation. Always produces some answer text:
/// upstream failures degrade to a fixed message or to the raw context.
pub struct AnswerGenerator {
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    prompts: RagPrompts,
    default_top_k: usize,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        prompts: RagPrompts,
        default_top_k: usize,
    ) -> Self {
        Self {
            vector_store,
            llm,
            prompts,
            default_top_k,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn answer(&self, query_vector: &Embedding, question: &str) -> Answer {
        self.answer_top_k(query_vector, question, self.default_top_k)
            .await
    }

    #[instrument(skip(self, query_vector), fields(outcome))]
    pub async fn answer_top_k(
        &self,
        query_vector: &Embedding,
        question: &str,
        top_k: usize,
    ) -> Answer {
        let answer = self.run(query_vector, question, top_k).await;
        tracing::Span::current().record("outcome", answer.outcome.as_str());
        answer
    }

    async fn run(&self, query_vector: &Embedding, question: &str, top_k: usize) -> Answer {
        let records = match self.vector_store.query(query_vector, top_k).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "vector store query failed");
                return Answer::new(
                    render(&self.prompts.retrieval_failed, &[("question", question)]),
                    AnswerOutcome::RetrievalFailed,
                );
            }
        };

        if records.is_empty() {
            return Answer::new(
                render(&self.prompts.no_results, &[("question", question)]),
                AnswerOutcome::NoContext,
            );
        }

        let context = records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let vars = [("question", question), ("context", context.as_str())];
        let prompt = render(&self.prompts.grounding, &vars);

        tracing::debug!(
            chunks = records.len(),
            context_chars = context.len(),
            "generating answer"
        );

        match self.generate(&prompt).await {
            Ok(text) => Answer::new(text.trim(), AnswerOutcome::Generated),
            Err(e) => {
                tracing::error!(error = %e, "generation failed, returning retrieved context");
                Answer::new(render(&self.prompts.fallback, &vars), AnswerOutcome::Fallback)
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        tokio::time::timeout(self.timeout, self.llm.complete(prompt))
            .await
            .map_err(|_| DomainError::timeout("Generation timed out"))?
    }
}
