use crate::error::Result;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `data` in one rename, creating parent directories.
/// Readers see either the old file or the new one, never a mix.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// File contents, or `None` when the file does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".kodini/nested/config.yaml");
        atomic_write(&path, b"version: 1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1");
    }

    #[test]
    fn atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn read_optional_distinguishes_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        assert_eq!(read_optional(&path).unwrap(), None);

        std::fs::write(&path, "version: 1").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("version: 1"));
    }
}
