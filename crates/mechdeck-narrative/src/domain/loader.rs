//! Story sources.
//!
//! Stories are read fresh for every request, so a source only needs to map
//! an id to a document and parse it.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mechdeck_core::error::DomainError;
use tracing::{debug, warn};

use super::story::{DocumentFormat, Story, StorySummary, parse_story};

/// Where stories come from.
pub trait StorySource: Send + Sync {
    /// Loads and parses one story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when no document matches `story_id`,
    /// `DomainError::Parse` when the document is invalid.
    fn load(&self, story_id: &str) -> Result<Story, DomainError>;

    /// Lists every loadable story, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the source itself cannot
    /// be enumerated.
    fn list(&self) -> Result<Vec<StorySummary>, DomainError>;
}

fn is_valid_story_id(story_id: &str) -> bool {
    !story_id.is_empty()
        && story_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reads `<root>/<id>.json`, `<root>/<id>.yaml` or `<root>/<id>.yml`.
#[derive(Debug, Clone)]
pub struct DirectoryStorySource {
    root: PathBuf,
}

impl DirectoryStorySource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_document(&self, story_id: &str) -> Result<Option<(String, DocumentFormat)>, DomainError> {
        for (extension, format) in DocumentFormat::EXTENSIONS {
            let path = self.root.join(format!("{story_id}.{extension}"));
            match fs::read_to_string(&path) {
                Ok(raw) => {
                    debug!(path = %path.display(), "reading story document");
                    return Ok(Some((raw, format)));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DomainError::Infrastructure(format!(
                        "failed to read {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(None)
    }
}

impl StorySource for DirectoryStorySource {
    fn load(&self, story_id: &str) -> Result<Story, DomainError> {
        if !is_valid_story_id(story_id) {
            return Err(DomainError::not_found("story", story_id));
        }
        let Some((raw, format)) = self.read_document(story_id)? else {
            return Err(DomainError::not_found("story", story_id));
        };
        parse_story(story_id, &raw, format)
    }

    fn list(&self) -> Result<Vec<StorySummary>, DomainError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            DomainError::Infrastructure(format!(
                "failed to list {}: {e}",
                self.root.display()
            ))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(DocumentFormat::from_extension)
                    .is_some()
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
            .filter(|id| is_valid_story_id(id))
            .collect();
        ids.sort();
        ids.dedup();

        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(&id) {
                Ok(story) => summaries.push(story.summary()),
                Err(e) => warn!(story_id = %id, error = %e, "skipping unloadable story"),
            }
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

/// Stories registered from strings. Used for embedded content and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorySource {
    documents: BTreeMap<String, (String, DocumentFormat)>,
}

impl InMemoryStorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a JSON document under `story_id`.
    #[must_use]
    pub fn with_json(mut self, story_id: &str, raw: &str) -> Self {
        self.documents
            .insert(story_id.to_owned(), (raw.to_owned(), DocumentFormat::Json));
        self
    }

    /// Registers a YAML document under `story_id`.
    #[must_use]
    pub fn with_yaml(mut self, story_id: &str, raw: &str) -> Self {
        self.documents
            .insert(story_id.to_owned(), (raw.to_owned(), DocumentFormat::Yaml));
        self
    }
}

impl StorySource for InMemoryStorySource {
    fn load(&self, story_id: &str) -> Result<Story, DomainError> {
        let (raw, format) = self
            .documents
            .get(story_id)
            .ok_or_else(|| DomainError::not_found("story", story_id))?;
        parse_story(story_id, raw, *format)
    }

    fn list(&self) -> Result<Vec<StorySummary>, DomainError> {
        let mut summaries = Vec::new();
        for id in self.documents.keys() {
            match self.load(id) {
                Ok(story) => summaries.push(story.summary()),
                Err(e) => warn!(story_id = %id, error = %e, "skipping unloadable story"),
            }
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}
