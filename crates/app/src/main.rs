use std::process::exit;

use app_config::{APPLICATION_NAME, CONFIG};
use app_logger::{error, info, trace, LoggerConfig};
use app_splitter::{Compression, FfmpegSegmenter, RunSummary, SplitOptions};

#[cfg(feature = "desktop-notifications")]
mod notif;

fn main() {
    let mode = if CONFIG.run.generate_manifest {
        "generate"
    } else {
        "split"
    };

    let logger = {
        let logger = LoggerConfig::builder()
            .program_name(APPLICATION_NAME)
            .name_suffix(mode);

        match CONFIG.logging.log_directory.as_deref() {
            Some(log_directory) => logger.log_directory(log_directory),
            None => logger,
        }
    };

    let log_file = match app_logger::init(logger) {
        Ok((_handle, log_file)) => log_file,
        Err(e) => {
            eprintln!("Failed to initialize logger: {e:#}");
            exit(1);
        }
    };

    trace!("Config: {:?}", *CONFIG);

    if CONFIG.run.generate_manifest {
        if let Err(e) = generate_manifest() {
            error!("Failed to generate manifest: {e:#}");
            exit(1);
        }

        return;
    }

    let summary = match split_videos() {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e:#}");
            exit(1);
        }
    };

    #[cfg(feature = "desktop-notifications")]
    {
        if let Err(e) = notif::send_notification(&(&summary).into()) {
            error!("Error sending notification: {}", e);
        }
    }

    if summary.has_failures() {
        info!("Failed videos are still in the manifest and will be retried on the next run");
        info!("Full log: {log_file:?}");
        exit(1);
    }
}

fn generate_manifest() -> anyhow::Result<()> {
    let app = &CONFIG.app;

    let report = app_manifest::scan::generate_manifest(&app.input_directory, &app.manifest_path)?;

    if report.found == 0 {
        return Ok(());
    }

    info!("Titles file: {:?}", report.manifest_path);
    info!(
        "Found {found} video file(s), {added} new",
        found = report.found,
        added = report.added
    );
    info!(
        "Please edit {:?} to fill in the 'base_name' and 'directory_name' fields.",
        report.manifest_path
    );

    Ok(())
}

fn split_videos() -> anyhow::Result<RunSummary> {
    let app = &CONFIG.app;
    let split = &CONFIG.split;

    if !app.input_directory.is_dir() {
        anyhow::bail!(
            "Input directory does not exist: {:?}",
            app.input_directory
        );
    }

    let segmenter = FfmpegSegmenter::new(CONFIG.ffmpeg_path()?);

    let options = SplitOptions {
        manifest_path: app.manifest_path.clone(),
        input_dir: app.input_directory.clone(),
        split_dir: app.split_directory.clone(),
        completed_dir: app.completed_directory.clone(),
        segment_minutes: split.segment_length,
        folder_per_split: split.folder_per_split,
        compression: split.compress.then_some(Compression {
            codec: split.codec,
            crf: split.crf,
        }),
    };

    info!("Input directory: {:?}", options.input_dir);
    info!("Split directory: {:?}", options.split_dir);
    info!("Completed directory: {:?}", options.completed_dir);
    info!("Segment length: {} minutes", options.segment_minutes);
    info!("Folder per split: {}", options.folder_per_split);
    if let Some(compression) = &options.compression {
        info!(
            "Compressing with {encoder} (crf {crf})",
            encoder = compression.codec.encoder(),
            crf = compression.crf
        );
    }

    app_splitter::process_manifest(&options, &segmenter)
}
