use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point, Rect,
    SpreadMode, Stroke, Transform,
};

/// Layers used to fake a canvas shadow blur.
const GLOW_LAYERS: u32 = 4;
const GLOW_LAYER_ALPHA: f32 = 0.07;

pub fn rgba(rgb: [u8; 3], alpha: f32) -> Color {
    Color::from_rgba(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    )
    .unwrap_or(Color::TRANSPARENT)
}

/// CSS-style `hsla()`: hue in degrees, saturation/lightness in percent.
pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Color {
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let h = hue.rem_euclid(360.0) / 60.0;

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;

    Color::from_rgba(
        (r + m).clamp(0.0, 1.0),
        (g + m).clamp(0.0, 1.0),
        (b + m).clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    )
    .unwrap_or(Color::TRANSPARENT)
}

pub fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// Vertical three-stop gradient (top, middle, bottom) spanning `y0..y1`.
/// Degenerate spans fall back to the top color.
pub fn vertical_gradient(y0: f32, y1: f32, stops: [Color; 3]) -> Paint<'static> {
    let shader = LinearGradient::new(
        Point::from_xy(0.0, y0),
        Point::from_xy(0.0, y1),
        vec![
            GradientStop::new(0.0, stops[0]),
            GradientStop::new(0.5, stops[1]),
            GradientStop::new(1.0, stops[2]),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    match shader {
        Some(shader) => Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        },
        None => solid(stops[0]),
    }
}

pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

pub fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

pub fn fill_path(pixmap: &mut Pixmap, path: &Path, paint: &Paint) {
    pixmap.fill_path(path, paint, FillRule::Winding, Transform::identity(), None);
}

pub fn fill_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
        fill_path(pixmap, &path, &solid(color));
    }
}

fn segment(x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y1);
    pb.finish()
}

pub fn stroke_line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
    if let Some(path) = segment(from.0, from.1, to.0, to.1) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }
}

/// Soft halo around a disc, standing in for a canvas shadow of `blur` pixels.
pub fn glow_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, blur: f32, rgb: [u8; 3]) {
    for layer in (1..=GLOW_LAYERS).rev() {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        fill_circle(pixmap, cx, cy, radius + spread, rgba(rgb, GLOW_LAYER_ALPHA));
    }
}

/// Halo around a vertical line.
pub fn glow_vline(pixmap: &mut Pixmap, x: f32, height: f32, width: f32, blur: f32, rgb: [u8; 3]) {
    for layer in (1..=GLOW_LAYERS).rev() {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        fill_rect(
            pixmap,
            x - (width / 2.0 + spread),
            0.0,
            width + 2.0 * spread,
            height,
            &solid(rgba(rgb, GLOW_LAYER_ALPHA)),
        );
    }
}

/// Halo around a rounded bar.
pub fn glow_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, blur: f32, rgb: [u8; 3]) {
    for layer in (1..=GLOW_LAYERS).rev() {
        let spread = blur * layer as f32 / GLOW_LAYERS as f32;
        if let Some(path) = rounded_rect(x - spread, y - spread, w + 2.0 * spread, h + 2.0 * spread, spread) {
            fill_path(pixmap, &path, &solid(rgba(rgb, GLOW_LAYER_ALPHA)));
        }
    }
}
