use std::path::PathBuf;

use clap::{Args, ValueEnum, ValueHint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 through libx264
    #[default]
    H264,
    /// H.265/HEVC through libx265
    H265,
}

impl VideoCodec {
    #[must_use]
    pub const fn encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct PathsConfig {
    #[arg(short = 'i', long = "input-dir", default_value = None, env = "VIDEO_SEGMENTER_INPUT_DIR", value_hint = ValueHint::DirPath)]
    /// Directory containing the video files.
    ///
    /// Defaults to the current directory
    pub input_directory: Option<PathBuf>,

    #[arg(short = 's', long = "split-dir", default_value = None, env = "VIDEO_SEGMENTER_SPLIT_DIR", value_hint = ValueHint::DirPath)]
    /// Directory the segments are written to.
    ///
    /// Defaults to `./split'
    pub split_directory: Option<PathBuf>,

    #[arg(short = 'c', long = "completed-dir", default_value = None, env = "VIDEO_SEGMENTER_COMPLETED_DIR", value_hint = ValueHint::DirPath)]
    /// Directory videos are moved to once they have been split.
    ///
    /// Defaults to `./completed'
    pub completed_directory: Option<PathBuf>,

    #[arg(short = 't', long = "manifest", visible_alias = "titles-file", default_value = None, env = "VIDEO_SEGMENTER_MANIFEST", value_hint = ValueHint::FilePath)]
    /// The JSON manifest listing the videos to split.
    ///
    /// Defaults to `./video_titles.json'
    pub manifest_path: Option<PathBuf>,
}
impl PathsConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(input_directory) = config.input_directory.as_ref() {
            self.input_directory = Some(input_directory.clone());
        }

        if let Some(split_directory) = config.split_directory.as_ref() {
            self.split_directory = Some(split_directory.clone());
        }

        if let Some(completed_directory) = config.completed_directory.as_ref() {
            self.completed_directory = Some(completed_directory.clone());
        }

        if let Some(manifest_path) = config.manifest_path.as_ref() {
            self.manifest_path = Some(manifest_path.clone());
        }

        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct SegmentingConfig {
    #[arg(short = 'l', long, default_value = None, value_name = "MINUTES", env = "VIDEO_SEGMENTER_SEGMENT_LENGTH", value_parser = clap::value_parser!(u32).range(1..))]
    /// Length of each segment in minutes.
    ///
    /// Defaults to 15
    pub segment_length: Option<u32>,

    #[arg(short = 'f', long, default_value = None, num_args = 0..=1, require_equals = true, default_missing_value = "true", env = "VIDEO_SEGMENTER_FOLDER_PER_SPLIT")]
    /// Put the segments of each video in their own folder.
    ///
    /// The folder is named after `directory_name', or `base_name' if that is empty
    pub folder_per_split: Option<bool>,

    #[arg(long, default_value = None, num_args = 0..=1, require_equals = true, default_missing_value = "true", env = "VIDEO_SEGMENTER_COMPRESS")]
    /// Re-encode the video while splitting instead of copying the streams.
    pub compress: Option<bool>,

    #[arg(long, default_value = None, ignore_case = true, env = "VIDEO_SEGMENTER_CODEC")]
    /// Video codec to use when compressing.
    pub codec: Option<VideoCodec>,

    #[arg(long, default_value = None, value_name = "QUALITY", env = "VIDEO_SEGMENTER_CRF", value_parser = clap::value_parser!(u8).range(0..=51))]
    /// Constant rate factor used when compressing. Lower is better quality.
    ///
    /// Defaults to 23
    pub crf: Option<u8>,
}
impl SegmentingConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(segment_length) = config.segment_length {
            self.segment_length = Some(segment_length);
        }

        if let Some(folder_per_split) = config.folder_per_split {
            self.folder_per_split = Some(folder_per_split);
        }

        if let Some(compress) = config.compress {
            self.compress = Some(compress);
        }

        if let Some(codec) = config.codec {
            self.codec = Some(codec);
        }

        if let Some(crf) = config.crf {
            self.crf = Some(crf);
        }

        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct ProgramPathConfig {
    #[arg(long, default_value = None, env = "VIDEO_SEGMENTER_FFMPEG", value_hint = ValueHint::FilePath)]
    /// Path to the ffmpeg executable.
    ///
    /// If not provided, ffmpeg will be searched for in $PATH
    pub ffmpeg_path: Option<PathBuf>,
}
impl ProgramPathConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(ffmpeg_path) = config.ffmpeg_path.as_ref() {
            self.ffmpeg_path = Some(ffmpeg_path.clone());
        }

        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct LoggingConfig {
    #[arg(long = "log-dir", default_value = None, env = "VIDEO_SEGMENTER_LOG_DIR", value_hint = ValueHint::DirPath)]
    /// Directory the run log is written to.
    ///
    /// Defaults to the system temp directory
    pub log_directory: Option<PathBuf>,
}
impl LoggingConfig {
    pub(crate) fn merge(&mut self, config: &Self) -> &Self {
        if let Some(log_directory) = config.log_directory.as_ref() {
            self.log_directory = Some(log_directory.clone());
        }

        self
    }
}
