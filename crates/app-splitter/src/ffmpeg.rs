use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process,
};

use app_config::VideoCodec;
use app_helpers::time::{format_hms, minutes_to_hms};
use app_logger::{debug, trace};

use crate::Segmenter;

/// Re-encode settings. Without them the streams are copied as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub codec: VideoCodec,
    pub crf: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub base_name: String,
    pub segment_minutes: u32,
    pub skip_seconds: Option<u64>,
    pub compression: Option<Compression>,
}

impl SegmentJob {
    #[must_use]
    pub fn output_pattern(&self) -> PathBuf {
        // `%` is a directive in ffmpeg's segment pattern
        let base_name = self.base_name.replace('%', "%%");
        self.output_dir.join(format!("{base_name}_%03d.mp4"))
    }

    #[must_use]
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args = os_args(&["-hide_banner", "-loglevel", "error", "-y"]);

        // Before `-i` so ffmpeg seeks instead of decoding up to the offset
        if let Some(skip) = self.skip_seconds {
            args.push("-ss".into());
            args.push(format_hms(skip).into());
        }

        args.push("-i".into());
        args.push(self.input.as_os_str().to_owned());
        args.extend(os_args(&["-map", "0"]));

        match self.compression {
            None => {
                args.extend(os_args(&["-c", "copy"]));
            }
            Some(Compression { codec, crf }) => {
                let segment_seconds = u64::from(self.segment_minutes) * 60;

                args.extend(os_args(&["-c:v", codec.encoder()]));
                args.push("-crf".into());
                args.push(crf.to_string().into());
                args.extend(os_args(&["-preset", "medium", "-c:a", "aac"]));
                // Keyframes on the segment boundaries, so the cuts land where asked
                args.push("-force_key_frames".into());
                args.push(format!("expr:gte(t,n_forced*{segment_seconds})").into());
            }
        }

        args.extend(os_args(&["-f", "segment", "-segment_time"]));
        args.push(minutes_to_hms(self.segment_minutes).into());
        args.extend(os_args(&["-reset_timestamps", "1"]));
        args.push(self.output_pattern().into_os_string());

        args
    }
}

fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

#[derive(Debug, Clone)]
pub struct FfmpegSegmenter {
    ffmpeg_path: PathBuf,
}

impl FfmpegSegmenter {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(ffmpeg_path: P) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

impl Segmenter for FfmpegSegmenter {
    fn segment(&self, job: &SegmentJob) -> Result<(), String> {
        trace!("`ffmpeg' binary: {:?}", self.ffmpeg_path);
        let mut cmd = process::Command::new(&self.ffmpeg_path);
        let cmd = cmd.args(job.ffmpeg_args());
        debug!("Running `ffmpeg' command: {cmd:?}");

        match cmd.output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                trace!("`ffmpeg' command output: {output:?}");
                Err(format!(
                    "ffmpeg exited with {status}: {stderr}",
                    status = output.status,
                    stderr = stderr.trim()
                ))
            }
            Err(e) => Err(format!(
                "Failed to run {path:?}: {e}",
                path = self.ffmpeg_path
            )),
        }
    }
}
