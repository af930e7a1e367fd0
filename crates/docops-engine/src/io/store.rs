use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::editing::{Document, OutlineEntry};
use crate::io::{BackendError, DocumentBackend, JsonBackend};

const VERSIONS_DIR: &str = "versions";
const COMPARE_PREFIX: &str = "compare-";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Invalid storage directory: {0}")]
    InvalidStorageDir(String),
    #[error("Invalid document id: {0}")]
    InvalidId(String),
}

/// Directory-backed document identities with immutable version snapshots.
///
/// ```text
/// <root>/<id>.json                 current revision
/// <root>/<id>.outline.json         outline of the current revision
/// <root>/versions/<id>/v<N>.json   one snapshot per save
/// ```
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open a store, creating the directory when it does not exist yet
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(StoreError::InvalidStorageDir(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        fs::create_dir_all(root.join(VERSIONS_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a new document under a fresh id and return the id
    pub fn create(&self, doc: &Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.save(&id, doc)?;
        Ok(id)
    }

    /// Store a redline result under a `compare-` id
    pub fn save_compare(&self, doc: &Document) -> Result<String, StoreError> {
        let id = format!("{COMPARE_PREFIX}{}", Uuid::new_v4());
        self.save(&id, doc)?;
        Ok(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.document_path(id).is_file()
    }

    pub fn load(&self, id: &str) -> Result<Document, StoreError> {
        validate_id(id)?;
        read_document(&self.document_path(id), id)
    }

    /// Write the current revision, append a version snapshot and refresh the
    /// stored outline. Returns the new version name.
    pub fn save(&self, id: &str, doc: &Document) -> Result<String, StoreError> {
        validate_id(id)?;
        let bytes = JsonBackend.save(doc)?;

        fs::write(self.document_path(id), &bytes)?;

        let versions_dir = self.versions_dir(id);
        fs::create_dir_all(&versions_dir)?;
        let next = self.version_numbers(id)?.last().copied().unwrap_or(0) + 1;
        let version = format!("v{next}");
        fs::write(versions_dir.join(format!("{version}.json")), &bytes)?;

        let outline = serde_json::to_vec_pretty(&doc.outline()).map_err(BackendError::Json)?;
        fs::write(self.outline_path(id), outline)?;

        log::info!("saved document {id} as {version} ({} blocks)", doc.len());
        Ok(version)
    }

    /// Version names of a document, oldest first
    pub fn list_versions(&self, id: &str) -> Result<Vec<String>, StoreError> {
        validate_id(id)?;
        if !self.document_path(id).is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self
            .version_numbers(id)?
            .into_iter()
            .map(|n| format!("v{n}"))
            .collect())
    }

    /// Load a snapshot by name; `v3` and `3` name the same version
    pub fn load_version(&self, id: &str, version: &str) -> Result<Document, StoreError> {
        validate_id(id)?;
        let number = parse_version(version)
            .ok_or_else(|| StoreError::NotFound(format!("{id}@{version}")))?;
        let path = self.versions_dir(id).join(format!("v{number}.json"));
        read_document(&path, &format!("{id}@{version}"))
    }

    /// Outline persisted by the last save
    pub fn load_outline(&self, id: &str) -> Result<Vec<OutlineEntry>, StoreError> {
        validate_id(id)?;
        let path = self.outline_path(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes).map_err(BackendError::Json)?)
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn outline_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.outline.json"))
    }

    fn versions_dir(&self, id: &str) -> PathBuf {
        self.root.join(VERSIONS_DIR).join(id)
    }

    fn version_numbers(&self, id: &str) -> Result<Vec<u64>, StoreError> {
        let dir = self.versions_dir(id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut numbers = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(number) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(parse_version)
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }
}

fn read_document(path: &Path, label: &str) -> Result<Document, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(label.to_string()));
    }
    let bytes = fs::read(path)?;
    Ok(JsonBackend.load(&bytes)?)
}

fn parse_version(name: &str) -> Option<u64> {
    name.strip_prefix('v').unwrap_or(name).parse().ok()
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains("..");
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}
