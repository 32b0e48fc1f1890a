use anyhow::{Context, Result};
use std::path::Path;
use tiny_skia::Pixmap;

/// Straight-alpha RGBA8 bytes, row-major with no padding, the layout both
/// the PNG writer and ffmpeg's `rgba` input expect.
pub fn readback(pixmap: &Pixmap) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    pixels
}

pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), readback(pixmap))
        .context("Frame buffer does not match its size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write frame: {}", path.display()))?;
    log::info!("Wrote {}x{} frame to {}", pixmap.width(), pixmap.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    #[test]
    fn readback_demultiplies() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.fill(Color::from_rgba8(200, 100, 50, 128));
        let px = readback(&pixmap);
        assert_eq!(px.len(), 8);
        assert_eq!(px[3], 128);
        assert!(px[0].abs_diff(200) <= 2);
        assert!(px[1].abs_diff(100) <= 2);
        assert!(px[2].abs_diff(50) <= 2);
    }

    #[test]
    fn png_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));
        save_png(&pixmap, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }
}
