use std::path::Path;

use crate::error::AnnotatorError;

/// A still image at its natural size, straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn load_image(path: &Path) -> Result<Bitmap, AnnotatorError> {
    if path.as_os_str().is_empty() {
        return Err(AnnotatorError::NoFileSelected);
    }

    let bytes = std::fs::read(path)
        .map_err(|e| AnnotatorError::Load(format!("cannot read {}: {}", path.display(), e)))?;
    let bitmap = load_image_bytes(&bytes)?;

    log::info!(
        "Loaded image: {}x{} from {}",
        bitmap.width,
        bitmap.height,
        path.display()
    );
    Ok(bitmap)
}

pub fn load_image_bytes(bytes: &[u8]) -> Result<Bitmap, AnnotatorError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AnnotatorError::Load(e.to_string()))?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AnnotatorError::Load("image has no pixels".into()));
    }

    Ok(Bitmap {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_natural_size() {
        let bitmap = load_image_bytes(&png_bytes(7, 3)).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (7, 3));
        assert_eq!(bitmap.rgba.len(), 7 * 3 * 4);
        assert_eq!(&bitmap.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn unreadable_bytes_are_load_error() {
        let err = load_image_bytes(b"GIF89a but not really").unwrap_err();
        assert!(matches!(err, AnnotatorError::Load(_)));
    }

    #[test]
    fn empty_path_is_no_file_selected() {
        let err = load_image(Path::new("")).unwrap_err();
        assert!(matches!(err, AnnotatorError::NoFileSelected));
    }
}
