use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context};
use app_logger::{debug, trace};
use filetime::FileTime;
use fs_extra::file::CopyOptions;

/// Moves `from` to `to`, never overwriting an existing `to`.
///
/// Tries a plain rename first. If that fails (eg. the destination is on another
/// filesystem) the file is copied over and the source removed, keeping its timestamps.
pub fn move_file<P, Q>(from: P, to: Q) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let from = from.as_ref();
    let to = to.as_ref();

    if !from.is_file() {
        bail!("Source file {from:?} does not exist");
    }

    if to.exists() {
        bail!("Destination {to:?} already exists");
    }

    trace!("Renaming {from:?} to {to:?}");
    let rename_err = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    debug!("Rename of {from:?} failed ({rename_err}), falling back to copy");

    let metadata =
        fs::metadata(from).with_context(|| format!("Failed to read metadata of {from:?}"))?;
    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);

    fs_extra::file::move_file(from, to, &CopyOptions::new())
        .map_err(|e| anyhow!("Failed to move {from:?} to {to:?}: {e}"))?;

    if let Err(e) = filetime::set_file_times(to, accessed, modified) {
        debug!("Failed to transfer file times to {to:?}: {e:?}");
    }

    Ok(())
}
