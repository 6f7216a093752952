use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum, ValueHint};
use serde::{Deserialize, Serialize};

use crate::{
    common::{LoggingConfig, PathsConfig, ProgramPathConfig, SegmentingConfig},
    file::FileConfiguration,
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(
    name = "video-segmenter",
    version,
    about = "Split videos into segments with ffmpeg, driven by a JSON manifest"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub app: AppArgs,

    #[command(flatten, next_help_heading = Some("Directories"))]
    pub paths: PathsConfig,

    #[command(flatten, next_help_heading = Some("Splitting"))]
    pub split: SegmentingConfig,

    #[command(flatten, next_help_heading = Some("Program paths"))]
    pub dependencies: ProgramPathConfig,

    #[command(flatten, next_help_heading = Some("Logging"))]
    pub logging: LoggingConfig,
}

impl CliArgs {
    /// The arguments as a config layer, to be put on top of the config file.
    pub(crate) fn as_layer(&self) -> FileConfiguration {
        FileConfiguration {
            app: Some(self.paths.clone()),
            split: Some(self.split.clone()),
            dependencies: Some(self.dependencies.clone()),
            logging: Some(self.logging.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpType {
    Toml,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct AppArgs {
    #[arg(short, long)]
    /// Scan the input directory and add new videos to the manifest, then exit.
    ///
    /// Fill in `base_name' (and optionally `directory_name' and `skip') for each
    /// entry before splitting
    pub generate: bool,

    #[arg(short = 'C', long, default_value = None, env = "VIDEO_SEGMENTER_CONFIG", value_hint = ValueHint::FilePath)]
    /// Location of the configuration file.
    ///
    /// By default should be in the os-appropriate config directory
    /// under the name `video-segmenter/config.toml`
    pub config_path: Option<PathBuf>,

    #[arg(long, ignore_case = true, value_name = "FORMAT")]
    /// Dump the configuration to stdout and exit.
    ///
    /// Useful for debugging.
    /// When dumped with the `toml` format, can be used as a config file.
    #[allow(clippy::option_option)]
    pub dump_config: Option<Option<DumpType>>,
}
