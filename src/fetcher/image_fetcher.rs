use anyhow::{Context, Result, anyhow};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::info;

use super::ImageSource;

/// Decode `bytes`, scale to `width` keeping the aspect ratio, and save to
/// `path` (format chosen from the extension). Returns the new size.
pub fn save_resized(bytes: &[u8], path: &Path, width: u32) -> Result<(u32, u32)> {
    let img = image::load_from_memory(bytes).context("Failed to decode image")?;

    if img.width() == 0 || img.height() == 0 {
        return Err(anyhow!("Image has no pixels"));
    }

    let ratio = width as f64 / img.width() as f64;
    let height = ((img.height() as f64 * ratio) as u32).max(1);

    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    resized
        .save(path)
        .with_context(|| format!("Failed to save image: {}", path.display()))?;

    Ok((width, height))
}

/// Download an image and store a resized copy at `path`.
pub async fn download_and_resize(
    source: &dyn ImageSource,
    url: &str,
    path: PathBuf,
    width: u32,
) -> Result<PathBuf> {
    let bytes = source.fetch_image(url).await?;

    let target = path.clone();
    let (w, h) = tokio::task::spawn_blocking(move || save_resized(&bytes, &target, width))
        .await
        .context("Image resize task failed")??;

    info!("🖼️ Resized image saved: {} ({}x{})", path.display(), w, h);
    Ok(path)
}
