use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::{
    common::{LoggingConfig, PathsConfig, ProgramPathConfig, SegmentingConfig},
    Config,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfiguration {
    pub app: Option<PathsConfig>,

    pub split: Option<SegmentingConfig>,

    pub dependencies: Option<ProgramPathConfig>,

    pub logging: Option<LoggingConfig>,
}

impl FileConfiguration {
    /// Loads the config file, creating the default one first if no path was given.
    ///
    /// Returns the configuration along with the path it was read from.
    pub(crate) fn new(config_path: Option<&Path>) -> anyhow::Result<(Self, PathBuf)> {
        let config_path = match config_path {
            Some(config_path) if !config_path.as_os_str().is_empty() => config_path.to_path_buf(),
            _ => Self::create_default_config_file()?,
        };

        let config = Self::load_from_file(&config_path)?;

        Ok((config, config_path))
    }

    pub(crate) fn load_from_file<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();

        if !p.is_file() {
            anyhow::bail!("Config file {:?} does not exist or is not a file", &p);
        }

        let config_file =
            fs::read_to_string(p).with_context(|| format!("Failed to read config file {p:?}"))?;

        toml::from_str::<Self>(&config_file)
            .map_err(|e| anyhow!("Error parsing config file {p:?}: {e}"))
    }

    /// Layers `other` on top of `self`, values set in `other` win.
    #[must_use]
    pub(crate) fn merge(self, other: &Self) -> Self {
        fn layer<T: Clone>(
            base: Option<T>,
            top: Option<&T>,
            merge: for<'a> fn(&'a mut T, &T) -> &'a T,
        ) -> Option<T> {
            match (base, top) {
                (Some(mut base), Some(top)) => {
                    merge(&mut base, top);
                    Some(base)
                }
                (base, top) => base.or_else(|| top.cloned()),
            }
        }

        Self {
            app: layer(self.app, other.app.as_ref(), PathsConfig::merge),
            split: layer(self.split, other.split.as_ref(), SegmentingConfig::merge),
            dependencies: layer(
                self.dependencies,
                other.dependencies.as_ref(),
                ProgramPathConfig::merge,
            ),
            logging: layer(self.logging, other.logging.as_ref(), LoggingConfig::merge),
        }
    }

    pub(crate) fn merge_into_config(&self, config: &mut Config) {
        if let Some(app) = &self.app {
            config.app.apply(app);
        }

        if let Some(split) = &self.split {
            config.split.apply(split);
        }

        if let Some(dependencies) = &self.dependencies {
            config.dependencies.merge(dependencies);
        }

        if let Some(logging) = &self.logging {
            config.logging.merge(logging);
        }
    }

    fn create_default_config_file() -> anyhow::Result<PathBuf> {
        let file = Self::default_config_path().ok_or_else(|| {
            anyhow!(
                "Failed to get config directory. Please pass a config file with --config-path \
                 or the VIDEO_SEGMENTER_CONFIG environment variable"
            )
        })?;

        let config_dir: PathBuf = file
            .parent()
            .ok_or_else(|| {
                anyhow!(
                    "Failed to get parent directory of config file. Is the config file in root?"
                )
            })?
            .into();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory {config_dir:?}"))?;
        }

        if !file.exists() {
            eprintln!("Config file not found. Creating one at {file:?}");
            fs::write(&file, include_bytes!("./config.toml"))
                .with_context(|| format!("Failed to create config file {file:?}"))?;
        }

        Ok(file)
    }

    fn default_config_path() -> Option<PathBuf> {
        Config::get_config_dir().map(|x| x.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::VideoCodec;

    #[test]
    fn default_template_parses() {
        let config: FileConfiguration = toml::from_str(include_str!("./config.toml")).unwrap();

        assert!(config.app.is_none());
        assert!(config.split.is_none());
    }

    #[test]
    fn loads_sections_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[app]
split_directory = "/videos/split"

[split]
segment_length = 10
compress = true
codec = "h265"

[dependencies]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
"#,
        )
        .unwrap();

        let config = FileConfiguration::load_from_file(&path).unwrap();

        let app = config.app.unwrap();
        assert_eq!(app.split_directory, Some(PathBuf::from("/videos/split")));
        assert_eq!(app.input_directory, None);

        let split = config.split.unwrap();
        assert_eq!(split.segment_length, Some(10));
        assert_eq!(split.compress, Some(true));
        assert_eq!(split.codec, Some(VideoCodec::H265));
        assert_eq!(split.crf, None);

        assert_eq!(
            config.dependencies.unwrap().ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
    }

    #[test]
    fn invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[split]\nsegment_length = \"long\"\n").unwrap();

        assert!(FileConfiguration::load_from_file(&path).is_err());
        assert!(FileConfiguration::load_from_file(tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn merge_prefers_values_from_top_layer() {
        let base: FileConfiguration = toml::from_str(
            "[split]\nsegment_length = 10\ncrf = 30\n[logging]\nlog_directory = \"/logs\"\n",
        )
        .unwrap();
        let top: FileConfiguration =
            toml::from_str("[split]\ncrf = 18\n[app]\nmanifest_path = \"jobs.json\"\n").unwrap();

        let merged = base.merge(&top);

        let split = merged.split.unwrap();
        assert_eq!(split.segment_length, Some(10));
        assert_eq!(split.crf, Some(18));
        assert_eq!(
            merged.app.unwrap().manifest_path,
            Some(PathBuf::from("jobs.json"))
        );
        assert_eq!(
            merged.logging.unwrap().log_directory,
            Some(PathBuf::from("/logs"))
        );
    }
}
