//! Throwaway component catalogs on disk.

use std::path::Path;

use tempfile::TempDir;
use uiforge_core::Catalog;

/// A temp directory of component documentation files.
///
/// The directory is deleted when the fixture is dropped.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// The three-component catalog used across the workspace tests.
    pub fn design_system() -> Self {
        Self::new()
            .with_component(
                "button",
                "Button",
                "A pressable control",
                "# Button\n\n`<Button onPress={fn}>Label</Button>`\n",
            )
            .with_component(
                "vstack",
                "VStack",
                "Vertical stack layout",
                "# VStack\n\nStacks children vertically.\n",
            )
            .with_component(
                "input",
                "Input",
                "Single-line text field",
                "# Input\n\n`<Input placeholder=\"Email\" />`\n",
            )
    }

    /// Add `<name>.md` with a front-matter block followed by `body`.
    pub fn with_component(self, name: &str, title: &str, description: &str, body: &str) -> Self {
        let content = format!("---\ntitle: {title}\ndescription: {description}\n---\n{body}");
        self.with_file(&format!("{name}.md"), &content)
    }

    /// Add a file with raw content.
    pub fn with_file(self, file_name: &str, content: &str) -> Self {
        std::fs::write(self.dir.path().join(file_name), content)
            .expect("failed to write catalog file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A `.md` catalog over this directory.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.dir.path(), "md")
    }

    /// Raw content of a fixture file.
    pub fn read(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(file_name))
            .expect("failed to read catalog file")
    }
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}
