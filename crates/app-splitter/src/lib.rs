use std::{
    fmt,
    path::{Path, PathBuf},
};

use app_helpers::{dirs::ensure_dir, fs::move_file};
use app_logger::{debug, error, info, trace, warn};
use app_manifest::{JobDescriptor, Manifest};

pub mod ffmpeg;

pub use ffmpeg::{Compression, FfmpegSegmenter, SegmentJob};

/// Whatever actually cuts a video into segments.
pub trait Segmenter {
    fn segment(&self, job: &SegmentJob) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    pub manifest_path: PathBuf,
    pub input_dir: PathBuf,
    pub split_dir: PathBuf,
    pub completed_dir: PathBuf,
    pub segment_minutes: u32,
    pub folder_per_split: bool,
    pub compression: Option<Compression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    SourceMissing(PathBuf),
    InvalidSkip(String),
    OutputDirectory(String),
    Segment(String),
    Move(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing(path) => write!(f, "video not found: {path:?}"),
            Self::InvalidSkip(e) => write!(f, "invalid skip: {e}"),
            Self::OutputDirectory(e) => write!(f, "could not prepare output directory: {e}"),
            Self::Segment(e) => write!(f, "splitting failed: {e}"),
            Self::Move(e) => write!(f, "split but could not move to completed directory: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Processed { output_dir: PathBuf },
    /// No `base_name` yet, left for the user to fill in
    Skipped,
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub filename: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Processed { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, f: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| f(&r.outcome)).count()
    }
}

/// Where the segments of `descriptor` go.
#[must_use]
pub fn output_directory(descriptor: &JobDescriptor, options: &SplitOptions) -> PathBuf {
    if options.folder_per_split {
        options.split_dir.join(descriptor.folder_name())
    } else {
        options.split_dir.clone()
    }
}

/// Splits and relocates a single video. Never touches the manifest.
pub fn process_descriptor<S>(
    descriptor: &JobDescriptor,
    options: &SplitOptions,
    segmenter: &S,
) -> Outcome
where
    S: Segmenter + ?Sized,
{
    if !descriptor.is_ready() {
        return Outcome::Skipped;
    }

    match split_and_relocate(descriptor, options, segmenter) {
        Ok(output_dir) => Outcome::Processed { output_dir },
        Err(failure) => Outcome::Failed(failure),
    }
}

fn split_and_relocate<S>(
    descriptor: &JobDescriptor,
    options: &SplitOptions,
    segmenter: &S,
) -> Result<PathBuf, Failure>
where
    S: Segmenter + ?Sized,
{
    let video_path = options.input_dir.join(&descriptor.filename);
    if !video_path.is_file() {
        return Err(Failure::SourceMissing(video_path));
    }

    let skip_seconds = descriptor.skip_seconds().map_err(Failure::InvalidSkip)?;

    let output_dir = output_directory(descriptor, options);
    ensure_dir(&output_dir).map_err(|e| Failure::OutputDirectory(format!("{e:#}")))?;

    let job = SegmentJob {
        input: video_path.clone(),
        output_dir: output_dir.clone(),
        base_name: descriptor.base_name.trim().to_string(),
        segment_minutes: options.segment_minutes,
        skip_seconds,
        compression: options.compression,
    };

    info!("Splitting: {}", descriptor.filename);
    debug!(
        "Output: {output_dir:?}, segment length: {minutes} minute(s), skip: {skip_seconds:?}",
        minutes = options.segment_minutes
    );

    segmenter.segment(&job).map_err(Failure::Segment)?;

    let completed_path = completed_path(&video_path, &options.completed_dir);
    move_file(&video_path, &completed_path).map_err(|e| Failure::Move(format!("{e:#}")))?;
    debug!("Moved to: {completed_path:?}");

    Ok(output_dir)
}

fn completed_path(video_path: &Path, completed_dir: &Path) -> PathBuf {
    video_path
        .file_name()
        .map_or_else(|| completed_dir.to_path_buf(), |name| completed_dir.join(name))
}

/// Works through every descriptor in the manifest, one at a time.
///
/// The manifest is backed up first. A descriptor is dropped from it (and the manifest
/// saved) as soon as its video has been split and moved. Anything that fails stays in
/// the manifest so the next run retries it. Only problems with the manifest itself or
/// the output directories make this return an error.
pub fn process_manifest<S>(options: &SplitOptions, segmenter: &S) -> anyhow::Result<RunSummary>
where
    S: Segmenter + ?Sized,
{
    let mut manifest = Manifest::load(&options.manifest_path)?;
    let mut summary = RunSummary::default();

    if manifest.is_empty() {
        info!("No videos found in manifest {:?}", manifest.path());
        return Ok(summary);
    }

    manifest.backup()?;

    ensure_dir(&options.split_dir)?;
    ensure_dir(&options.completed_dir)?;

    let descriptors = manifest.descriptors().to_vec();
    for descriptor in &descriptors {
        if !manifest.contains(&descriptor.filename) {
            trace!("{:?} was already handled in this run", descriptor.filename);
            continue;
        }

        let outcome = process_descriptor(descriptor, options, segmenter);

        match &outcome {
            Outcome::Processed { output_dir } => {
                manifest.remove(&descriptor.filename)?;
                info!(
                    "Split {filename} into {output_dir:?}",
                    filename = descriptor.filename
                );
            }
            Outcome::Skipped => {
                warn!(
                    "Skipping {filename}: 'base_name' is empty, fill it in {manifest:?}",
                    filename = descriptor.filename,
                    manifest = manifest.path()
                );
            }
            Outcome::Failed(failure) => {
                error!(
                    "Failed {filename}: {failure}",
                    filename = descriptor.filename
                );
            }
        }

        summary.reports.push(FileReport {
            filename: descriptor.filename.clone(),
            outcome,
        });
    }

    manifest.save()?;

    info!(
        "Processing complete! Processed: {processed}, failed: {failed}, skipped: {skipped}",
        processed = summary.processed(),
        failed = summary.failed(),
        skipped = summary.skipped(),
    );

    Ok(summary)
}
