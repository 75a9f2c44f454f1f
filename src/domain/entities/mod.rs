mod answer;
mod chunk;
mod document;
mod embedding;
mod record;

pub use answer::{Answer, AnswerOutcome};
pub use chunk::{chunk_id, Chunk, WordChunker, WordWindows};
pub use document::{DocumentSource, FileKind, QueryInput};
pub use embedding::Embedding;
pub use record::{ScoredRecord, VectorRecord};
