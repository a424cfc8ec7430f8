//! Directory and file handles.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::io::source::FileSource;
use crate::io::unique_token;
use std::fs;
use std::path::{Path, PathBuf};

/// A directory that is created on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    path: PathBuf,
}

impl Folder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn create(&self) -> Result<(), NetError> {
        fs::create_dir_all(&self.path).file_context(&self.path)
    }

    pub fn child(&self, name: &str) -> Folder {
        Folder::new(self.path.join(name))
    }

    pub fn file(&self, name: &str) -> FileRef {
        FileRef::new(self.path.join(name))
    }

    /// Reserve a fresh, uniquely named file in this folder.
    ///
    /// The folder is created if needed; the file itself is not.
    pub fn new_file(&self, extension: Option<&str>) -> Result<FileRef, NetError> {
        self.create()?;
        let name = match extension {
            Some(ext) => format!("{}.{}", unique_token(), ext),
            None => unique_token(),
        };
        Ok(self.file(&name))
    }

    /// Files directly inside this folder whose name ends with `.{extension}`.
    pub fn files_with_extension(&self, extension: &str) -> Result<Vec<FileRef>, NetError> {
        let Some(entries) = fs::read_dir(&self.path).optional_file(&self.path)? else {
            return Ok(Vec::new());
        };
        let suffix = format!(".{}", extension);
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.file_context(&self.path)?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix));
            if matches && path.is_file() {
                files.push(FileRef::new(path));
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    pub fn item_count(&self) -> usize {
        fs::read_dir(&self.path).map(|d| d.count()).unwrap_or(0)
    }

    /// Delete the folder and everything in it. A missing folder is fine.
    pub fn delete(&self) -> Result<(), NetError> {
        fs::remove_dir_all(&self.path)
            .optional_file(&self.path)
            .map(|_| ())
    }
}

/// A file path with convenience accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    path: PathBuf,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn len(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    pub fn source(&self) -> FileSource {
        FileSource::new(&self.path)
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, NetError> {
        fs::read(&self.path).file_context(&self.path)
    }

    pub fn read_string(&self) -> Result<String, NetError> {
        String::from_utf8(self.read_bytes()?).map_err(|_| NetError::InvalidUtf8)
    }

    /// Read the file, `None` when it does not exist.
    pub fn read_string_if_exists(&self) -> Result<Option<String>, NetError> {
        match fs::read(&self.path).optional_file(&self.path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| NetError::InvalidUtf8),
            None => Ok(None),
        }
    }

    pub fn write(&self, contents: impl AsRef<[u8]>) -> Result<(), NetError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).file_context(parent)?;
        }
        fs::write(&self.path, contents).file_context(&self.path)
    }

    /// Delete the file. A missing file is fine.
    pub fn delete(&self) -> Result<(), NetError> {
        fs::remove_file(&self.path)
            .optional_file(&self.path)
            .map(|_| ())
    }
}
