// ============================================================
// Layer 6 — Dataset Download
// ============================================================
// Fetches the raw diamonds CSV over HTTP and stores it at the
// configured raw-data path. The body is streamed to a temporary
// file next to the target and renamed into place once complete,
// so an interrupted download never leaves a truncated dataset.
//
// Reference: ureq crate documentation

use anyhow::{Context, Result};
use std::{fs, io, path::Path};

/// Download `url` to `dest`, returning the number of bytes written
pub fn download_to(url: &str, dest: &Path) -> Result<u64> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Cannot create '{}'", dir.display()))?;

    tracing::info!("Downloading dataset from {}", url);
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("Request to '{url}' failed"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    let bytes   = io::copy(&mut response.into_reader(), &mut tmp)
        .with_context(|| format!("Cannot read response body from '{url}'"))?;

    anyhow::ensure!(bytes > 0, "'{url}' returned an empty body");

    tmp.persist(dest)
        .with_context(|| format!("Cannot write '{}'", dest.display()))?;

    tracing::info!("Data saved to '{}' ({} bytes)", dest.display(), bytes);
    Ok(bytes)
}
