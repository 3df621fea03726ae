use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::{fs, path::Path};
use tracing::info;

/// Make sure the geometry file exists at `dest`, downloading it from `url`
/// if it does not. Returns `true` when a download happened.
///
/// The body lands in `<dest>.tmp` first and is renamed into place, so an
/// interrupted download never leaves a truncated file at `dest`.
pub fn ensure_geometry(dest: impl AsRef<Path>, url: &str) -> Result<bool> {
    let dest = dest.as_ref();
    if dest.exists() {
        return Ok(false);
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    info!(url, dest = %dest.display(), "downloading country geometry");
    let client = Client::new();
    let bytes = client
        .get(url)
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .bytes()
        .with_context(|| format!("reading body from {}", url))?;

    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &bytes).with_context(|| format!("writing {:?}", tmp))?;
    fs::rename(&tmp, dest).with_context(|| format!("renaming {:?} into place", tmp))?;

    info!(bytes = bytes.len(), "geometry saved");
    Ok(true)
}
