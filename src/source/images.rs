use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::debug;

use crate::canvas::plane::Plane;
use crate::classify::frame::ClassifiedFrame;
use crate::foundation::core::PanelSize;
use crate::foundation::error::{GhostError, GhostResult};

/// File extensions picked up by [`list_images`], compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Return `true` when `path` has one of [`IMAGE_EXTENSIONS`].
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Image files directly inside `dir`, sorted by file name.
///
/// A missing directory is treated like an empty one so the caller can keep polling until it
/// appears.
pub fn list_images(dir: &Path) -> GhostResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "image directory missing");
        return Ok(Vec::new());
    }
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read image dir '{}'", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Rotate portrait images 90 degrees clockwise, then resize to exactly the panel size.
pub fn fit_to_panel(img: image::DynamicImage, panel: PanelSize) -> image::RgbaImage {
    let img = if img.height() > img.width() {
        img.rotate90()
    } else {
        img
    };
    let rgba = img.to_rgba8();
    if rgba.dimensions() == (panel.width, panel.height) {
        return rgba;
    }
    image::imageops::resize(
        &rgba,
        panel.width,
        panel.height,
        image::imageops::FilterType::CatmullRom,
    )
}

/// Decode encoded image bytes into a panel-sized classified frame.
pub fn decode_frame(bytes: &[u8], panel: PanelSize) -> GhostResult<ClassifiedFrame> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| GhostError::image_decode(format!("decode image from memory: {e}")))?;
    Ok(ClassifiedFrame::from_rgba(&fit_to_panel(img, panel)))
}

/// Load, normalize and classify the image at `path`.
///
/// Unreadable files are reported as [`GhostError::ImageDecode`] as well: files may disappear
/// between listing and loading, and the loop skips them either way.
pub fn load_frame(path: &Path, panel: PanelSize) -> GhostResult<ClassifiedFrame> {
    let bytes = std::fs::read(path)
        .map_err(|e| GhostError::image_decode(format!("read '{}': {e}", path.display())))?;
    decode_frame(&bytes, panel)
        .map_err(|e| GhostError::image_decode(format!("'{}': {e}", path.display())))
}

/// Render a plane as a grayscale inspection image: ink is 0, background 255.
pub fn plane_to_luma(plane: &Plane) -> image::GrayImage {
    image::GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        image::Luma([if plane.get(x, y) { 0 } else { 255 }])
    })
}

/// Write `<stem>_black.png` and `<stem>_red.png` for `frame` into `out_dir`.
///
/// Returns the two paths in that order.
pub fn write_layers(
    frame: &ClassifiedFrame,
    out_dir: &Path,
    stem: &str,
) -> GhostResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let black = out_dir.join(format!("{stem}_black.png"));
    let red = out_dir.join(format!("{stem}_red.png"));
    for (plane, path) in [(frame.black(), &black), (frame.red(), &red)] {
        plane_to_luma(plane)
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
    }
    Ok((black, red))
}

#[cfg(test)]
#[path = "../../tests/unit/source/images.rs"]
mod tests;
