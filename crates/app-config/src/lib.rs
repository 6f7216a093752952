use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use cli::CliArgs;
use directories::ProjectDirs;
use file::FileConfiguration;
use lazy_static::lazy_static;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use which::which;

use crate::cli::DumpType;

mod cli;
mod common;
mod file;

pub use common::VideoCodec;

pub static APPLICATION_NAME: &str = "video-segmenter";
pub static ORGANIZATION_NAME: &str = "allypost";
pub static ORGANIZATION_QUALIFIER: &str = "net";

pub const DEFAULT_SEGMENT_LENGTH: u32 = 15;
pub const DEFAULT_CRF: u8 = 23;
pub const MAX_CRF: u8 = 51;

lazy_static! {
    pub static ref CONFIG: Config = Config::new();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,

    pub split: SplitConfig,

    #[serde(skip)]
    pub run: RunConfig,

    pub dependencies: common::ProgramPathConfig,

    pub logging: common::LoggingConfig,
}

impl Config {
    #[must_use]
    pub fn get_config_dir() -> Option<PathBuf> {
        Self::get_project_dir().map(|x| x.config_dir().into())
    }

    #[must_use]
    pub fn config_dir(&self) -> Option<PathBuf> {
        Self::get_config_dir()
    }

    /// The ffmpeg binary from the config, or the one found in `$PATH`.
    pub fn ffmpeg_path(&self) -> anyhow::Result<&Path> {
        self.dependencies.ffmpeg_path.as_deref().ok_or_else(|| {
            anyhow!(
                "ffmpeg is not installed or not found in PATH. \
                 Install it or point --ffmpeg-path at it"
            )
        })
    }

    fn get_project_dir() -> Option<ProjectDirs> {
        ProjectDirs::from(ORGANIZATION_QUALIFIER, ORGANIZATION_NAME, APPLICATION_NAME)
    }

    fn new() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e:#}");
                std::process::exit(1);
            }
        }
    }

    fn load() -> anyhow::Result<Self> {
        let args = CliArgs::parse();
        let (file_config, config_path) = FileConfiguration::new(args.app.config_path.as_deref())?;

        let mut config = Self::from_sources(&args, &file_config)?;
        config.app.config_path = config_path;

        if let Some(dump_type) = &args.app.dump_config {
            match dump_type.as_ref().unwrap_or(&DumpType::Toml) {
                DumpType::Toml => {
                    println!("{}", toml::to_string_pretty(&config)?);
                }

                DumpType::Json => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
            std::process::exit(0);
        }

        Ok(config)
    }

    /// Defaults, then the config file, then the command line (and environment).
    fn from_sources(args: &CliArgs, file_config: &FileConfiguration) -> anyhow::Result<Self> {
        let mut config = Self::default();

        file_config
            .clone()
            .merge(&args.as_layer())
            .merge_into_config(&mut config);

        config.run.generate_manifest = args.app.generate;

        config.app.resolve()?;
        config.split.validate()?;

        if config.dependencies.ffmpeg_path.is_none() {
            config.dependencies.ffmpeg_path = which("ffmpeg").ok();
        }

        if let Some(log_directory) = config.logging.log_directory.take() {
            config.logging.log_directory = Some(resolve(&log_directory)?);
        }

        Ok(config)
    }
}

fn resolve(path: &Path) -> anyhow::Result<PathBuf> {
    path.try_resolve()
        .map(PathBuf::from)
        .with_context(|| format!("Failed to resolve path {path:?}"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub input_directory: PathBuf,
    pub split_directory: PathBuf,
    pub completed_directory: PathBuf,
    pub manifest_path: PathBuf,
    pub config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_directory: PathBuf::from("."),
            split_directory: PathBuf::from("split"),
            completed_directory: PathBuf::from("completed"),
            manifest_path: PathBuf::from("video_titles.json"),
            config_path: PathBuf::new(),
        }
    }
}

impl AppConfig {
    pub(crate) fn apply(&mut self, paths: &common::PathsConfig) -> &Self {
        if let Some(input_directory) = &paths.input_directory {
            self.input_directory = input_directory.into();
        }

        if let Some(split_directory) = &paths.split_directory {
            self.split_directory = split_directory.into();
        }

        if let Some(completed_directory) = &paths.completed_directory {
            self.completed_directory = completed_directory.into();
        }

        if let Some(manifest_path) = &paths.manifest_path {
            self.manifest_path = manifest_path.into();
        }

        self
    }

    fn resolve(&mut self) -> anyhow::Result<&Self> {
        self.input_directory = resolve(&self.input_directory)?;
        self.split_directory = resolve(&self.split_directory)?;
        self.completed_directory = resolve(&self.completed_directory)?;
        self.manifest_path = resolve(&self.manifest_path)?;

        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub segment_length: u32,
    pub folder_per_split: bool,
    pub compress: bool,
    pub codec: VideoCodec,
    pub crf: u8,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
            folder_per_split: false,
            compress: false,
            codec: VideoCodec::default(),
            crf: DEFAULT_CRF,
        }
    }
}

impl SplitConfig {
    pub(crate) fn apply(&mut self, split: &common::SegmentingConfig) -> &Self {
        if let Some(segment_length) = split.segment_length {
            self.segment_length = segment_length;
        }

        if let Some(folder_per_split) = split.folder_per_split {
            self.folder_per_split = folder_per_split;
        }

        if let Some(compress) = split.compress {
            self.compress = compress;
        }

        if let Some(codec) = split.codec {
            self.codec = codec;
        }

        if let Some(crf) = split.crf {
            self.crf = crf;
        }

        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.segment_length == 0 {
            bail!("Segment length must be at least 1 minute");
        }

        if self.crf > MAX_CRF {
            bail!("CRF must be between 0 and {MAX_CRF}, got {}", self.crf);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub generate_manifest: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("video-segmenter").chain(args.iter().copied()))
            .unwrap()
    }

    fn file(content: &str) -> FileConfiguration {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn defaults_apply_without_file_or_args() {
        let config = Config::from_sources(&args(&[]), &FileConfiguration::default()).unwrap();

        assert!(config.app.input_directory.is_absolute());
        assert!(config.app.split_directory.is_absolute());
        assert!(config.app.split_directory.ends_with("split"));
        assert!(config.app.completed_directory.ends_with("completed"));
        assert!(config.app.manifest_path.ends_with("video_titles.json"));
        assert_eq!(config.split.segment_length, DEFAULT_SEGMENT_LENGTH);
        assert_eq!(config.split.crf, DEFAULT_CRF);
        assert_eq!(config.split.codec, VideoCodec::H264);
        assert!(!config.split.folder_per_split);
        assert!(!config.split.compress);
        assert!(!config.run.generate_manifest);
    }

    #[test]
    fn args_override_file() {
        let file = file(
            r#"
[app]
split_directory = "/videos/split"
completed_directory = "/videos/done"

[split]
segment_length = 10
folder_per_split = true
crf = 30
"#,
        );

        let config = Config::from_sources(&args(&["-s", "/tmp/out", "--crf", "18", "-g"]), &file)
            .unwrap();

        assert_eq!(config.app.split_directory, PathBuf::from("/tmp/out"));
        assert_eq!(config.app.completed_directory, PathBuf::from("/videos/done"));
        assert_eq!(config.split.segment_length, 10);
        assert!(config.split.folder_per_split);
        assert_eq!(config.split.crf, 18);
        assert!(config.run.generate_manifest);
    }

    #[test]
    fn explicit_false_overrides_file() {
        let file = file("[split]\nfolder_per_split = true\ncompress = true\n");

        let config =
            Config::from_sources(&args(&["--folder-per-split=false"]), &file).unwrap();

        assert!(!config.split.folder_per_split);
        assert!(config.split.compress);
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let zero_length = file("[split]\nsegment_length = 0\n");
        let bad_crf = file("[split]\ncrf = 60\n");

        assert!(Config::from_sources(&args(&[]), &zero_length).is_err());
        assert!(Config::from_sources(&args(&[]), &bad_crf).is_err());
    }

    #[test]
    fn configured_ffmpeg_is_kept() {
        let file = file("[dependencies]\nffmpeg_path = \"/opt/ffmpeg\"\n");

        let config = Config::from_sources(&args(&[]), &file).unwrap();

        assert_eq!(config.ffmpeg_path().unwrap(), Path::new("/opt/ffmpeg"));
    }

    #[test]
    fn config_dumps_as_toml() {
        let config = Config::from_sources(&args(&[]), &FileConfiguration::default()).unwrap();

        let dumped = toml::to_string_pretty(&config).unwrap();

        assert!(dumped.contains("[split]"));
        assert!(dumped.contains("codec = \"h264\""));
    }
}
