use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::ImageReader;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::ImageItem;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Intrinsic size of the image at `path`.
///
/// Only the header is read; the format comes from the file's magic bytes,
/// not its extension. GIFs report their logical screen size.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32)> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {:?}", path))?
        .with_guessed_format()
        .with_context(|| format!("Failed to sniff image format: {:?}", path))?;
    if reader.format().is_none() {
        return Err(anyhow!("Unrecognised image format: {:?}", path));
    }
    reader
        .into_dimensions()
        .with_context(|| format!("Failed to read image header: {:?}", path))
}

/// Builds an [`ImageItem`] for every image under `dir`, in path order.
///
/// Items are identified by their path relative to `dir`. Files that cannot
/// be read are skipped with a warning.
pub fn scan_directory(dir: &Path, recursive: bool) -> Result<Vec<ImageItem>> {
    if !dir.is_dir() {
        return Err(anyhow!("Not a directory: {:?}", dir));
    }

    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut items = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() || !is_image_path(entry.path()) {
            continue;
        }

        let path = entry.path();
        let id = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        match read_dimensions(path) {
            Ok((width, height)) => items.push(ImageItem::new(id, width as f32, height as f32)),
            Err(e) => warn!("Skipping {:?}: {:#}", path, e),
        }
    }

    debug!(dir = ?dir, count = items.len(), "Scanned image directory");
    Ok(items)
}
