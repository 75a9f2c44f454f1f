mod ingestion;
mod prompt;
mod query;
mod rag;

pub use ingestion::{IngestionReport, IngestionService, IngestionStage};
pub use prompt::render;
pub use query::QueryService;
pub use rag::AnswerGenerator;
