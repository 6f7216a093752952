use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use app_logger::{debug, trace};
use tempfile::NamedTempFile;

mod descriptor;
pub mod scan;

pub use descriptor::{JobDescriptor, Skip};

/// The on-disk list of videos still waiting to be split.
///
/// Every change goes straight back to disk, so a run that gets killed half way
/// leaves behind a manifest that only lists the files that weren't finished.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    /// Bytes as they were read from disk, used for the backup
    original: Option<Vec<u8>>,
    descriptors: Vec<JobDescriptor>,
}

impl Manifest {
    /// A manifest that doesn't exist on disk yet.
    #[must_use]
    pub fn empty<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            original: None,
            descriptors: Vec::new(),
        }
    }

    pub fn load<P: Into<PathBuf>>(path: P) -> anyhow::Result<Self> {
        let path = path.into();

        if !path.is_file() {
            bail!("Manifest file {path:?} does not exist or is not a file");
        }

        let raw = fs::read(&path).with_context(|| format!("Failed to read manifest {path:?}"))?;
        let descriptors: Vec<JobDescriptor> = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse manifest {path:?}"))?;

        debug!(
            "Loaded {count} descriptor(s) from {path:?}",
            count = descriptors.len()
        );

        Ok(Self {
            path,
            original: Some(raw),
            descriptors,
        })
    }

    #[must_use]
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map_or_else(OsString::new, ToOwned::to_owned);
        name.push(".bak");

        path.with_file_name(name)
    }

    /// Copies the manifest, as it was loaded, next to itself with a `.bak` suffix.
    ///
    /// Does nothing for a manifest that was never on disk.
    pub fn backup(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(original) = &self.original else {
            trace!("Manifest {:?} was never saved, nothing to back up", self.path);
            return Ok(None);
        };

        let backup_path = Self::backup_path(&self.path);
        fs::write(&backup_path, original)
            .with_context(|| format!("Failed to write manifest backup {backup_path:?}"))?;

        debug!("Created backup: {backup_path:?}");

        Ok(Some(backup_path))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn descriptors(&self) -> &[JobDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.descriptors.iter().any(|d| d.filename == filename)
    }

    pub fn push(&mut self, descriptor: JobDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Drops every descriptor for `filename` and saves the manifest.
    ///
    /// Returns whether anything was removed. Nothing is written if not.
    pub fn remove(&mut self, filename: &str) -> anyhow::Result<bool> {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.filename != filename);

        if self.descriptors.len() == before {
            trace!("No descriptor for {filename:?} in manifest");
            return Ok(false);
        }

        self.save()?;

        Ok(true)
    }

    /// Rewrites the whole manifest through a temporary file in the same directory.
    ///
    /// A symlinked manifest is written through to its target, and an existing
    /// file keeps its permissions.
    pub fn save(&self) -> anyhow::Result<()> {
        let target = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary manifest in {dir:?}"))?;

        serde_json::to_writer_pretty(&mut tmp, &self.descriptors)
            .context("Failed to serialize manifest")?;
        tmp.write_all(b"\n")?;

        if let Ok(metadata) = fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .with_context(|| format!("Failed to copy permissions of {target:?}"))?;
        }

        tmp.as_file().sync_all()?;

        tmp.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write manifest {:?}", self.path))?;

        trace!(
            "Saved {count} descriptor(s) to {path:?}",
            count = self.descriptors.len(),
            path = self.path
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TWO_FILES: &str = r#"[
  {"filename": "a.mp4", "base_name": "first"},
  {"filename": "b.mp4", "base_name": "second", "directory_name": "family", "skip": "00:01:00"}
]"#;

    fn write_manifest(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("video_titles.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            Manifest::backup_path(Path::new("/data/video_titles.json")),
            PathBuf::from("/data/video_titles.json.bak")
        );
        assert_eq!(
            Manifest::backup_path(Path::new("titles")),
            PathBuf::from("titles.bak")
        );
    }

    #[test]
    fn loads_descriptors_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), TWO_FILES);

        let manifest = Manifest::load(&path).unwrap();
        let names: Vec<_> = manifest
            .descriptors()
            .iter()
            .map(|d| d.filename.as_str())
            .collect();

        assert_eq!(names, vec!["a.mp4", "b.mp4"]);
        assert_eq!(manifest.descriptors()[1].skip_seconds(), Ok(Some(60)));
    }

    #[test]
    fn malformed_manifest_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), "[{\"filename\": ");

        assert!(Manifest::load(&path).is_err());
    }

    #[test]
    fn missing_manifest_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();

        assert!(Manifest::load(tmp.path().join("nope.json")).is_err());
    }

    #[test]
    fn backup_holds_original_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), TWO_FILES);

        let mut manifest = Manifest::load(&path).unwrap();
        let backup = manifest.backup().unwrap().unwrap();
        manifest.remove("a.mp4").unwrap();

        assert_eq!(fs::read_to_string(backup).unwrap(), TWO_FILES);
    }

    #[test]
    fn remove_persists_remaining_descriptors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), TWO_FILES);

        let mut manifest = Manifest::load(&path).unwrap();
        assert!(manifest.remove("a.mp4").unwrap());
        assert!(!manifest.remove("a.mp4").unwrap());

        let reloaded = Manifest::load(&path).unwrap();
        assert_eq!(reloaded.descriptors(), manifest.descriptors());
        assert_eq!(reloaded.descriptors().len(), 1);
        assert_eq!(reloaded.descriptors()[0].folder_name(), "family");
    }

    #[test]
    fn remove_drops_duplicate_filenames() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(
            tmp.path(),
            r#"[{"filename": "a.mp4", "base_name": "one"}, {"filename": "a.mp4", "base_name": "two"}]"#,
        );

        let mut manifest = Manifest::load(&path).unwrap();
        manifest.remove("a.mp4").unwrap();

        assert!(Manifest::load(&path).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), TWO_FILES);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut manifest = Manifest::load(&path).unwrap();
        manifest.remove("a.mp4").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn save_writes_through_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let real = write_manifest(tmp.path(), TWO_FILES);
        let link = tmp.path().join("linked.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut manifest = Manifest::load(&link).unwrap();
        manifest.remove("a.mp4").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(Manifest::load(&real).unwrap().descriptors().len(), 1);
    }

    #[test]
    fn empty_manifest_has_nothing_to_back_up() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = Manifest::empty(tmp.path().join("new.json"));

        assert_eq!(manifest.backup().unwrap(), None);
    }
}
