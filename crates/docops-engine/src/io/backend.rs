use crate::editing::Document;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Converts between a package format and the block model
pub trait DocumentBackend {
    /// File extension handled by this backend, without the dot
    fn extension(&self) -> &'static str;

    fn load(&self, bytes: &[u8]) -> Result<Document, BackendError>;

    fn save(&self, doc: &Document) -> Result<Vec<u8>, BackendError>;
}

/// Lossless JSON serialisation of the block model
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBackend;

impl DocumentBackend for JsonBackend {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, BackendError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn save(&self, doc: &Document) -> Result<Vec<u8>, BackendError> {
        Ok(serde_json::to_vec_pretty(doc)?)
    }
}

/// Pick a backend from a file extension (`json`, `md`, `markdown`)
pub fn backend_for_extension(extension: &str) -> Option<Box<dyn DocumentBackend>> {
    match extension.to_ascii_lowercase().as_str() {
        "json" => Some(Box::new(JsonBackend)),
        "md" | "markdown" => Some(Box::new(super::MarkdownBackend)),
        _ => None,
    }
}
