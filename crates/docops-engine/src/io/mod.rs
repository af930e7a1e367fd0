//! Reading and writing documents: format backends and the versioned store.

pub mod backend;
pub mod markdown;
pub mod store;

pub use backend::{BackendError, DocumentBackend, JsonBackend, backend_for_extension};
pub use markdown::{MarkdownBackend, parse_markdown, to_markdown};
pub use store::{DocumentStore, StoreError};
