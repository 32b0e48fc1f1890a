use anyhow::{Context, Result};
use tiny_skia::{ColorU8, IntSize, Pixmap};

use super::paint::{self, rgba};
use crate::picture::load::Bitmap;
use crate::session::{Annotation, AnnotationKind};

const WHITE: [u8; 3] = [255, 255, 255];

/// Draws an image at its natural size with pulsing pins over it.
pub struct ImageRenderer {
    backdrop: Pixmap,
}

impl ImageRenderer {
    pub fn new(bitmap: &Bitmap) -> Result<Self> {
        let size = IntSize::from_wh(bitmap.width, bitmap.height)
            .with_context(|| format!("Invalid image size {}x{}", bitmap.width, bitmap.height))?;

        // tiny-skia stores premultiplied pixels
        let data: Vec<u8> = bitmap
            .rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let p = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                [p.red(), p.green(), p.blue(), p.alpha()]
            })
            .collect();

        let backdrop = Pixmap::from_vec(data, size).context("Image buffer does not match its size")?;
        Ok(Self { backdrop })
    }

    pub fn render(&self, annotations: &[Annotation], clock: u64) -> Pixmap {
        let mut pixmap = self.backdrop.clone();
        let t = clock as f32;
        let pulse = 8.0 + (t * 0.02).sin() * 3.0;

        for annotation in annotations
            .iter()
            .filter(|a| a.kind() == AnnotationKind::Image)
        {
            let x = annotation.x() as f32;
            let y = annotation.y().unwrap_or_default() as f32;
            let rgb = annotation.color.rgb();

            paint::glow_circle(&mut pixmap, x, y, pulse + 10.0, 20.0, rgb);
            paint::fill_circle(&mut pixmap, x, y, pulse + 10.0, rgba(rgb, 0x40 as f32 / 255.0));
            paint::fill_circle(&mut pixmap, x, y, pulse, rgba(rgb, 1.0));
            paint::fill_circle(&mut pixmap, x - 2.0, y - 2.0, pulse * 0.3, rgba(WHITE, 0.9));
        }

        pixmap
    }
}
