use std::{fs, path::Path};

use anyhow::Context;
use app_logger::{debug, trace};

pub fn ensure_dir<P>(path: P) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if path.is_dir() {
        trace!("Directory {path:?} already exists");
        return Ok(());
    }

    debug!("Creating directory {path:?}");
    fs::create_dir_all(path).with_context(|| format!("Failed to create directory {path:?}"))
}
