use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> Result<()> {
    let p = p.as_ref();
    if !p.exists() {
        fs::create_dir_all(p)
            .with_context(|| format!("Failed to create directory {}", p.display()))?;
    }
    Ok(())
}

/// Creates the directory that will hold `path`, if it has one.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("icon.png");

        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_bare_filename() {
        assert!(ensure_parent_dir("icon.png").is_ok());
    }

    #[test]
    fn test_require_file_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.png");

        let err = require_file(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_require_file_rejects_directory() {
        let dir = tempdir().unwrap();
        assert!(require_file(dir.path()).is_err());
    }
}
