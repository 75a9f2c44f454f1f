mod text;

pub use text::{check_dimension, TextEmbedding};
