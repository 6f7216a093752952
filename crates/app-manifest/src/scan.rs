use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use app_logger::{debug, info, trace};
use infer::MatcherType;

use crate::{JobDescriptor, Manifest};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub manifest_path: PathBuf,
    /// Video files present in the input directory
    pub found: usize,
    /// Of those, the ones that weren't in the manifest yet
    pub added: usize,
}

/// Video files directly inside `input_dir`, sorted by path.
pub fn find_video_files(input_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read input directory {input_dir:?}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();

        if path.is_file() && is_video_file(&path) {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

fn is_video_file(path: &Path) -> bool {
    let has_video_extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

    if has_video_extension {
        return true;
    }

    match infer::get_from_path(path) {
        Ok(Some(kind)) if kind.matcher_type() == MatcherType::Video => {
            trace!("{path:?} sniffed as video ({mime})", mime = kind.mime_type());
            true
        }
        _ => false,
    }
}

/// Lists every video in `input_dir` in the manifest at `manifest_path`.
///
/// An existing manifest is backed up and extended: descriptors already in it are left
/// alone and new files are appended with an empty `base_name` for the user to fill in.
pub fn generate_manifest(input_dir: &Path, manifest_path: &Path) -> anyhow::Result<ScanReport> {
    let files = find_video_files(input_dir)?;
    debug!("Found {count} video file(s) in {input_dir:?}", count = files.len());

    let mut report = ScanReport {
        manifest_path: manifest_path.to_path_buf(),
        found: files.len(),
        added: 0,
    };

    if files.is_empty() {
        info!("No video files found in {input_dir:?}");
        return Ok(report);
    }

    let exists = manifest_path.exists();
    let mut manifest = if exists {
        let manifest = Manifest::load(manifest_path)?;
        manifest.backup()?;
        manifest
    } else {
        Manifest::empty(manifest_path)
    };

    for file in &files {
        let Some(filename) = file.file_name().and_then(std::ffi::OsStr::to_str) else {
            debug!("Skipping {file:?}, its name isn't valid UTF-8");
            continue;
        };

        if manifest.contains(filename) {
            trace!("{filename:?} already listed");
            continue;
        }

        manifest.push(JobDescriptor::pending(filename));
        report.added += 1;
    }

    if report.added > 0 || !exists {
        manifest.save()?;
    }

    Ok(report)
}
