use std::fmt;
use std::path::Path;

/// Raw input to the ingestion pipeline. Dropped once its chunks are stored.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    File {
        filename: Option<String>,
        bytes: Vec<u8>,
    },
    Url(String),
}

impl DocumentSource {
    pub fn file(filename: Option<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::File {
            filename,
            bytes: bytes.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Url(_) => "url",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { filename, bytes } => write!(
                f,
                "file {} ({} bytes)",
                filename.as_deref().unwrap_or("<unnamed>"),
                bytes.len()
            ),
            Self::Url(url) => write!(f, "url {url}"),
        }
    }
}

/// File formats with a dedicated extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    Unknown,
}

impl FileKind {
    pub fn from_filename(filename: Option<&str>) -> Self {
        let extension = filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str());

        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Self::Text,
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            Some(ext) if ext.eq_ignore_ascii_case("docx") => Self::Docx,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryInput {
    Audio(Vec<u8>),
    Text(String),
}
