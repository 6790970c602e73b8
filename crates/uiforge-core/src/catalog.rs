//! Catalog reader — per-component documentation files on disk.
//!
//! The catalog is a flat directory holding one documentation file per
//! component (`button.md`, `text-input.md`, …). Each file may open with a
//! front-matter block:
//!
//! ```text
//! ---
//! title: Button
//! description: A pressable control
//! ---
//! ```
//!
//! Nothing is cached: every call re-reads the filesystem. No read ever fails
//! the caller. The `try_*` methods return a [`CatalogRead`] that tags
//! placeholder values with the reason they were produced; the plain methods
//! collapse that into the placeholder itself.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use uiforge_config::CatalogConfig;

/// Marker line that opens and closes a front-matter block.
pub const FRONT_MATTER_DELIMITER: &str = "---";

const NOT_FOUND_DESCRIPTION: &str = "Component not found";
const NO_DESCRIPTION: &str = "No description available";
const METADATA_ERROR_DESCRIPTION: &str = "Error reading metadata";

/// Lightweight description of a component, taken from its front-matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub title: String,
    pub description: String,
}

impl ComponentMetadata {
    fn placeholder(name: &str, description: &str) -> Self {
        Self {
            title: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Why a catalog read produced a placeholder instead of file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No documentation file exists for the component.
    NotFound,
    /// The file exists but does not open with a front-matter block.
    NoFrontMatter,
    /// The file exists but is empty.
    Empty,
    /// The name does not denote a file inside the catalog directory.
    InvalidName,
    /// The file could not be read.
    Io(String),
}

/// Outcome of a catalog read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRead<T> {
    /// The value came from the documentation file.
    Found(T),
    /// The value is a placeholder.
    Degraded { fallback: T, reason: Degradation },
}

impl<T> CatalogRead<T> {
    /// The value, whether read or substituted.
    pub fn into_inner(self) -> T {
        match self {
            Self::Found(value) => value,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            Self::Found(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Read-only view over a component documentation directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
    extension: String,
}

impl Catalog {
    /// Create a catalog over `dir` whose documentation files end in `.<extension>`.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.dir, &config.extension)
    }

    /// The documentation directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a component's documentation file, if `name` stays inside the
    /// catalog directory.
    fn doc_path(&self, name: &str) -> Option<PathBuf> {
        if name.contains(['/', '\\']) {
            return None;
        }
        let file_name = format!("{}.{}", name.to_lowercase(), self.extension);
        let mut components = Path::new(&file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.dir.join(&file_name)),
            _ => None,
        }
    }

    /// Raw file content, decoded lossily.
    async fn read_doc(&self, name: &str) -> Result<String, ReadError> {
        let Some(path) = self.doc_path(name) else {
            warn!(component = %name, "Rejected component name outside the catalog");
            return Err(ReadError::InvalidName);
        };
        let bytes = tokio::fs::read(path).await.map_err(ReadError::Io)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// List component names in directory order, extension stripped.
    ///
    /// An unreadable directory yields an empty list.
    pub async fn list_components(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to read components directory");
                return Vec::new();
            }
        };

        let suffix = format!(".{}", self.extension);
        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let file_name = entry.file_name();
                    if let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(&suffix)) {
                        names.push(name.to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %self.dir.display(), error = %e, "Failed while listing components");
                    break;
                }
            }
        }
        names
    }

    /// Read a component's front-matter metadata, tagging placeholders.
    pub async fn try_read_metadata(&self, name: &str) -> CatalogRead<ComponentMetadata> {
        match self.read_doc(name).await {
            Ok(content) => parse_front_matter(name, &content),
            Err(ReadError::InvalidName) => CatalogRead::Degraded {
                fallback: ComponentMetadata::placeholder(name, NOT_FOUND_DESCRIPTION),
                reason: Degradation::InvalidName,
            },
            Err(ReadError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(component = %name, "No documentation file");
                CatalogRead::Degraded {
                    fallback: ComponentMetadata::placeholder(name, NOT_FOUND_DESCRIPTION),
                    reason: Degradation::NotFound,
                }
            }
            Err(ReadError::Io(e)) => {
                warn!(component = %name, error = %e, "Error reading metadata");
                CatalogRead::Degraded {
                    fallback: ComponentMetadata::placeholder(name, METADATA_ERROR_DESCRIPTION),
                    reason: Degradation::Io(e.to_string()),
                }
            }
        }
    }

    /// Read a component's front-matter metadata.
    pub async fn read_metadata(&self, name: &str) -> ComponentMetadata {
        self.try_read_metadata(name).await.into_inner()
    }

    /// Metadata for every listed component, read concurrently.
    pub async fn all_metadata(&self) -> BTreeMap<String, ComponentMetadata> {
        let names = self.list_components().await;
        join_all(names.into_iter().map(|name| async move {
            let meta = self.read_metadata(&name).await;
            (name, meta)
        }))
        .await
        .into_iter()
        .collect()
    }

    /// Read a component's full documentation, tagging placeholders.
    pub async fn try_read_full_docs(&self, name: &str) -> CatalogRead<String> {
        match self.read_doc(name).await {
            Ok(content) if content.is_empty() => CatalogRead::Degraded {
                fallback: format!("Empty documentation file for component: {name}"),
                reason: Degradation::Empty,
            },
            Ok(content) => CatalogRead::Found(content),
            Err(ReadError::InvalidName) => CatalogRead::Degraded {
                fallback: format!("Documentation not found for component: {name}"),
                reason: Degradation::InvalidName,
            },
            Err(ReadError::Io(e)) if e.kind() == ErrorKind::NotFound => CatalogRead::Degraded {
                fallback: format!("Documentation not found for component: {name}"),
                reason: Degradation::NotFound,
            },
            Err(ReadError::Io(e)) => {
                warn!(component = %name, error = %e, "Error retrieving documentation");
                CatalogRead::Degraded {
                    fallback: format!("Error retrieving documentation for {name}: {e}"),
                    reason: Degradation::Io(e.to_string()),
                }
            }
        }
    }

    /// Read a component's full documentation, or a placeholder sentence.
    pub async fn read_full_docs(&self, name: &str) -> String {
        self.try_read_full_docs(name).await.into_inner()
    }

    /// Read documentation for several components concurrently.
    ///
    /// Each name maps to its own content or placeholder.
    pub async fn read_docs_batch(&self, names: &[String]) -> BTreeMap<String, String> {
        info!(components = %names.join(", "), "Getting documentation for components");
        join_all(names.iter().map(|name| async move {
            let docs = self.read_full_docs(name).await;
            (name.clone(), docs)
        }))
        .await
        .into_iter()
        .collect()
    }
}

enum ReadError {
    InvalidName,
    Io(std::io::Error),
}

/// Extract `title` and `description` from a leading front-matter block.
///
/// Fields absent from the block keep their defaults (the component name and
/// "No description available").
pub fn parse_front_matter(name: &str, content: &str) -> CatalogRead<ComponentMetadata> {
    let mut lines = content.split('\n');

    if lines.next().map(str::trim) != Some(FRONT_MATTER_DELIMITER) {
        return CatalogRead::Degraded {
            fallback: ComponentMetadata::placeholder(name, NO_DESCRIPTION),
            reason: Degradation::NoFrontMatter,
        };
    }

    let mut metadata = ComponentMetadata::placeholder(name, NO_DESCRIPTION);
    for line in lines.map(str::trim) {
        if line == FRONT_MATTER_DELIMITER {
            break;
        }
        if line.starts_with("title:") {
            metadata.title = field_value(line);
        } else if line.starts_with("description:") {
            metadata.description = field_value(line);
        }
    }
    CatalogRead::Found(metadata)
}

fn field_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}
