//! Local DSL folder: one YAML file per app, named after the app

use crate::bulk::coordinator::BulkTarget;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Extension of exported DSL files
pub const DSL_EXTENSION: &str = "yml";

/// Default folder used by export and import
pub const DEFAULT_DSL_DIR: &str = "./dsl";

/// Replace path separators so an app name is a single path segment
pub fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

/// A DSL file found in the folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslFile {
    pub path: PathBuf,
    /// Target app name, taken from the file stem
    pub app_name: String,
}

impl BulkTarget for DslFile {
    fn label(&self) -> String {
        self.app_name.clone()
    }
}

#[derive(Debug, Clone)]
pub struct DslStore {
    dir: PathBuf,
}

impl DslStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the folder if needed and delete the `.yml` files of a previous
    /// export. Anything else in the folder is left alone.
    pub fn reset(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let stale = self.list()?;
        for file in &stale {
            debug!("Removing stale DSL file {:?}", file.path);
            fs::remove_file(&file.path)?;
        }
        info!("Prepared DSL folder {:?} ({} stale file(s) removed)", self.dir, stale.len());
        Ok(())
    }

    pub fn path_for(&self, app_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_name(app_name), DSL_EXTENSION))
    }

    /// Write one app's DSL and return the file path.
    ///
    /// Fails with `AlreadyExists` when another app already claimed the file
    /// name, e.g. `team/bot` and `team-bot`.
    pub async fn write(&self, app_name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.path_for(app_name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(path)
    }

    /// Every `.yml` file directly inside the folder, sorted by path
    pub fn list(&self) -> io::Result<Vec<DslFile>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(DSL_EXTENSION) {
                continue;
            }
            let Some(app_name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            files.push(DslFile { path, app_name });
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    pub async fn read(&self, file: &DslFile) -> io::Result<String> {
        tokio::fs::read_to_string(&file.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_name("team/support\\bot"), "team-support-bot");
        assert_eq!(sanitize_name("【same】X-b2"), "【same】X-b2");
    }

    #[test]
    fn test_reset_removes_previous_export() {
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path().join("dsl"));
        store.reset().unwrap();
        fs::write(store.path_for("stale"), "old").unwrap();

        store.reset().unwrap();

        assert!(store.dir().exists());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_reset_keeps_unrelated_entries() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("important.txt"), "keep me").unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src").join("old.yml"), "nested").unwrap();
        fs::write(tmp.path().join("previous.yml"), "old").unwrap();

        let store = DslStore::new(tmp.path());
        store.reset().unwrap();

        assert!(tmp.path().join("important.txt").exists());
        assert!(tmp.path().join("src").join("old.yml").exists());
        assert!(!tmp.path().join("previous.yml").exists());
    }

    #[tokio::test]
    async fn test_write_refuses_to_overwrite() {
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path());

        store.write("team/bot", "first").await.unwrap();
        let err = store.write("team-bot", "second").await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(store.path_for("team-bot")).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_write_then_list_and_read() {
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path());

        let path = store.write("ops/bot", "app: {}\n").await.unwrap();
        assert_eq!(path, tmp.path().join("ops-bot.yml"));
        store.write("alpha", "a").await.unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(tmp.path().join("nested.yml")).unwrap();

        let files = store.list().unwrap();
        let names: Vec<_> = files.iter().map(|f| f.app_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "ops-bot"]);
        assert_eq!(files[1].label(), "ops-bot");
        assert_eq!(store.read(&files[1]).await.unwrap(), "app: {}\n");
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path().join("absent"));
        assert!(store.list().is_err());
    }
}
