use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::domain::{entities::common::Permissions, error::DomainError};

/// A rendered project, ready for materialization.
///
/// `root` is the project directory's name (relative to the output
/// directory); entry paths are relative to `root`. Contains no logic beyond
/// checking its own paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: Vec<u8>, perms: Permissions) {
        self.entries.push(FsEntry::File(FileToWrite {
            path: path.into(),
            content,
            permissions: perms,
        }));
    }

    pub fn add_directory(&mut self, path: impl Into<PathBuf>) {
        self.entries
            .push(FsEntry::Directory(DirectoryToCreate { path: path.into() }));
    }

    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
        perms: Permissions,
    ) -> Self {
        self.add_file(path, content.into(), perms);
        self
    }

    pub fn with_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_directory(path);
        self
    }

    /// Root must be a single plain segment; entries unique, relative and
    /// free of `..`.
    pub fn validate(&self) -> Result<(), DomainError> {
        let root = self.root.display().to_string();
        if root.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Project directory name rendered empty".into(),
            ));
        }
        let mut root_parts = self.root.components();
        match (root_parts.next(), root_parts.next()) {
            (Some(Component::Normal(_)), None) => {}
            (Some(Component::RootDir | Component::Prefix(_)), _) => {
                return Err(DomainError::AbsolutePathNotAllowed { path: root });
            }
            _ => return Err(DomainError::PathTraversal { path: root }),
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let path = entry.path();
            let path_str = path.display().to_string();

            if path.is_absolute() || path.has_root() {
                return Err(DomainError::AbsolutePathNotAllowed { path: path_str });
            }
            if path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return Err(DomainError::PathTraversal { path: path_str });
            }
            if !seen.insert(path_str.clone()) {
                return Err(DomainError::DuplicatePath { path: path_str });
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryToCreate> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::Directory(d) => Some(d),
            _ => None,
        })
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&FileToWrite> {
        let path = path.as_ref();
        self.files().find(|f| f.path == path)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileToWrite {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub permissions: Permissions,
}

impl FileToWrite {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Content as text, if it is UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryToCreate {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_structure() {
        let s = ProjectStructure::new("esta-python")
            .with_directory("src")
            .with_file("src/main.py", "print()\n", Permissions::read_write());
        assert!(s.validate().is_ok());
        assert_eq!(s.entry_count(), 2);
        assert_eq!(s.file("src/main.py").and_then(|f| f.text()), Some("print()\n"));
    }

    #[test]
    fn nested_root_is_rejected() {
        let s = ProjectStructure::new("a/b");
        assert!(matches!(s.validate(), Err(DomainError::PathTraversal { .. })));
        let s = ProjectStructure::new("..");
        assert!(matches!(s.validate(), Err(DomainError::PathTraversal { .. })));
    }

    #[test]
    fn empty_root_is_rejected() {
        let s = ProjectStructure::new("  ");
        assert!(matches!(s.validate(), Err(DomainError::InvalidTemplate(_))));
    }

    #[test]
    fn escaping_entries_are_rejected() {
        let s = ProjectStructure::new("p").with_file("../x", "", Permissions::read_write());
        assert!(matches!(s.validate(), Err(DomainError::PathTraversal { .. })));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let s = ProjectStructure::new("p")
            .with_file("a", "1", Permissions::read_write())
            .with_file("a", "2", Permissions::read_write());
        assert!(matches!(s.validate(), Err(DomainError::DuplicatePath { .. })));
    }
}
