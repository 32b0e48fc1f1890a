use anyhow::{Context, Result};
use tiny_skia::{Color, Pixmap};

use super::paint::{self, hsla, rgba};
use crate::session::{Annotation, AnnotationKind, FrameInputs, Surface};

const INDIGO: [u8; 3] = [99, 102, 241];
const VIOLET: [u8; 3] = [139, 92, 246];
const RED: [u8; 3] = [0xef, 0x44, 0x44];
const RED_TINT: [u8; 3] = [0xfe, 0xf2, 0xf2];
const WHITE: [u8; 3] = [255, 255, 255];

const GRID_LINES: u32 = 10;
const HEIGHT_SCALE: f32 = 0.8;
const HOVER_SCALE: f32 = 1.3;
const SPARKLES: u32 = 5;

/// Draws the annotated waveform. Every effect is a closed-form function of
/// the frame's inputs, so the same inputs always give the same pixels.
pub struct WaveformRenderer {
    width: u32,
    height: u32,
}

impl WaveformRenderer {
    pub fn new(surface: Surface) -> Self {
        Self {
            width: surface.width,
            height: surface.height,
        }
    }

    pub fn render(&self, frame: &FrameInputs) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)
            .with_context(|| format!("Invalid surface size {}x{}", self.width, self.height))?;
        self.draw(&mut pixmap, frame);
        Ok(pixmap)
    }

    pub fn draw(&self, pixmap: &mut Pixmap, frame: &FrameInputs) {
        let t = frame.clock as f32;
        let w = self.width as f32;
        let h = self.height as f32;

        pixmap.fill(Color::TRANSPARENT);
        self.draw_background(pixmap, t, w, h);
        self.draw_grid(pixmap, w, h);
        self.draw_bars(pixmap, frame, t, w, h);
        self.draw_playhead(pixmap, frame, t, w, h);
        for annotation in frame
            .annotations
            .iter()
            .filter(|a| a.kind() == AnnotationKind::Audio)
        {
            self.draw_marker(pixmap, annotation, t, h);
        }
        if frame.playback.is_playing {
            self.draw_sparkles(pixmap, t, w, h);
        }
    }

    fn draw_background(&self, pixmap: &mut Pixmap, t: f32, w: f32, h: f32) {
        let alpha = 0.05 + (t * 0.005).sin() * 0.03;
        let paint = paint::vertical_gradient(
            0.0,
            h,
            [rgba(INDIGO, alpha), rgba(VIOLET, alpha * 0.5), rgba(INDIGO, alpha)],
        );
        paint::fill_rect(pixmap, 0.0, 0.0, w, h, &paint);
    }

    fn draw_grid(&self, pixmap: &mut Pixmap, w: f32, h: f32) {
        let color = rgba(INDIGO, 0.1);
        for i in 0..GRID_LINES {
            let y = h / GRID_LINES as f32 * i as f32;
            paint::stroke_line(pixmap, (0.0, y), (w, y), 1.0, color);
        }
    }

    fn draw_bars(&self, pixmap: &mut Pixmap, frame: &FrameInputs, t: f32, w: f32, h: f32) {
        let bars = frame.magnitudes.len();
        if bars == 0 {
            return;
        }

        let bar_width = w / bars as f32;
        let inset = (bar_width / 4.0).min(1.0);
        let radius = (bar_width / 3.0).min(3.0);
        let center_y = h / 2.0;
        let playing = frame.playback.is_playing;
        let progress = frame.playback.progress() as f32;

        for (i, &magnitude) in frame.magnitudes.iter().enumerate() {
            let fi = i as f32;
            let x = fi * bar_width;

            let mut bar_height = magnitude * h * HEIGHT_SCALE;
            if playing {
                let wave = 1.0 + (t * 0.008 + fi * 0.05).sin() * 0.15;
                let ripple = 1.0 + (t * 0.012 + fi * 0.03).sin() * 0.08;
                bar_height *= wave * ripple;
            }

            let hovered = frame.hovered_bar == Some(i);
            if hovered {
                bar_height *= HOVER_SCALE;
            }

            let top = center_y - bar_height / 2.0;
            let bottom = center_y + bar_height / 2.0;
            let bar_x = x + inset;
            let bar_w = bar_width - 2.0 * inset;

            if hovered {
                let glow = 15.0 + (t * 0.02).sin() * 5.0;
                paint::glow_rect(pixmap, bar_x, top, bar_w, bar_height, glow, INDIGO);
            }

            let played = playing && fi / bars as f32 <= progress;
            let fill = if played {
                let k = 1.0 + (t * 0.01 + fi * 0.1).sin() * 0.3;
                let edge = hsla(245.0 + k * 10.0, 100.0, 60.0 + k * 10.0, 1.0);
                let mid = hsla(260.0 + k * 10.0, 100.0, 70.0 + k * 10.0, 1.0);
                paint::vertical_gradient(top, bottom, [edge, mid, edge])
            } else {
                let s = 0.4 + magnitude * 0.3;
                paint::vertical_gradient(
                    top,
                    bottom,
                    [rgba(INDIGO, s), rgba(VIOLET, s + 0.1), rgba(INDIGO, s)],
                )
            };

            if let Some(path) = paint::rounded_rect(bar_x, top, bar_w, bar_height, radius) {
                paint::fill_path(pixmap, &path, &fill);
            }
        }
    }

    fn draw_playhead(&self, pixmap: &mut Pixmap, frame: &FrameInputs, t: f32, w: f32, h: f32) {
        let playback = frame.playback;
        if playback.duration <= 0.0 || playback.current_time < 0.0 {
            return;
        }

        let x = playback.progress() as f32 * w;
        paint::glow_vline(pixmap, x, h, 4.0, 20.0, RED);
        paint::stroke_line(pixmap, (x, 0.0), (x, h), 4.0, rgba(RED, 1.0));

        if playback.is_playing {
            let pulse = 12.0 + (t * 0.03).sin() * 6.0;
            let glow = 25.0 + (t * 0.02).sin() * 10.0;
            let cy = h / 2.0;
            paint::glow_circle(pixmap, x, cy, pulse, glow, RED);
            paint::fill_circle(pixmap, x, cy, pulse, rgba(RED, 1.0));
            paint::fill_circle(pixmap, x, cy, pulse * 0.3, rgba(RED_TINT, 1.0));
        }
    }

    fn draw_marker(&self, pixmap: &mut Pixmap, annotation: &Annotation, t: f32, h: f32) {
        let x = annotation.x() as f32;
        let rgb = annotation.color.rgb();

        paint::glow_vline(pixmap, x, h, 4.0, 15.0, rgb);
        paint::stroke_line(pixmap, (x, 0.0), (x, h), 4.0, rgba(rgb, 1.0));

        let pulse = 10.0 + (t * 0.02).sin() * 4.0;
        paint::glow_circle(pixmap, x, 20.0, pulse + 8.0, 20.0, rgb);
        paint::fill_circle(pixmap, x, 20.0, pulse + 8.0, rgba(rgb, 0x40 as f32 / 255.0));
        paint::fill_circle(pixmap, x, 20.0, pulse, rgba(rgb, 1.0));
        paint::fill_circle(pixmap, x - 2.0, 18.0, pulse * 0.3, rgba(WHITE, 0.8));
    }

    fn draw_sparkles(&self, pixmap: &mut Pixmap, t: f32, w: f32, h: f32) {
        for i in 0..SPARKLES {
            let fi = i as f32;
            let x = ((t * 0.005 + fi).sin() + 1.0) * w / 2.0;
            let y = ((t * 0.007 + fi * 2.0).cos() + 1.0) * h / 2.0;
            let size = 2.0 + (t * 0.01 + fi).sin();
            let alpha = 0.3 + (t * 0.015 + fi).sin() * 0.3;
            paint::fill_circle(pixmap, x, y, size, hsla(60.0 + fi * 72.0, 70.0, 80.0, alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::annotation::Anchor;
    use crate::session::{AnnotationColor, PlaybackState};

    const SURFACE: Surface = Surface { width: 800, height: 300 };

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    fn marker(id: &str, x: f64, color: AnnotationColor) -> Annotation {
        Annotation {
            id: id.into(),
            anchor: Anchor::Audio { time: x / 800.0 * 120.0, x },
            title: String::new(),
            note: String::new(),
            color,
        }
    }

    fn frame<'a>(
        magnitudes: &'a [f32],
        annotations: &'a [Annotation],
        playback: PlaybackState,
        clock: u64,
    ) -> FrameInputs<'a> {
        FrameInputs {
            magnitudes,
            playback,
            annotations,
            hovered_bar: Some(3),
            clock,
        }
    }

    fn playing_at(current_time: f64) -> PlaybackState {
        PlaybackState {
            is_playing: true,
            current_time,
            duration: 120.0,
        }
    }

    #[test]
    fn identical_inputs_give_identical_pixels() {
        let mags: Vec<f32> = (0..200).map(|i| (i % 17) as f32 / 16.0).collect();
        let anns = vec![marker("1", 120.0, AnnotationColor::Pink)];
        let renderer = WaveformRenderer::new(SURFACE);

        let a = renderer.render(&frame(&mags, &anns, playing_at(33.0), 977)).unwrap();
        let b = renderer.render(&frame(&mags, &anns, playing_at(33.0), 977)).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn clock_drives_animation_while_playing() {
        let mags = vec![0.6; 100];
        let renderer = WaveformRenderer::new(SURFACE);
        let a = renderer.render(&frame(&mags, &[], playing_at(10.0), 10)).unwrap();
        let b = renderer.render(&frame(&mags, &[], playing_at(10.0), 400)).unwrap();
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn playhead_sits_at_progress() {
        let mags = vec![0.1; 100];
        let paused = PlaybackState {
            is_playing: false,
            current_time: 60.0,
            duration: 120.0,
        };
        let pixmap = WaveformRenderer::new(SURFACE)
            .render(&frame(&mags, &[], paused, 0))
            .unwrap();
        let [r, g, b, a] = pixel(&pixmap, 400, 2);
        assert_eq!(a, 255);
        assert!(r > 200 && g < 100 && b < 100, "got {:?}", (r, g, b));
    }

    #[test]
    fn no_playhead_without_duration() {
        let pixmap = WaveformRenderer::new(SURFACE)
            .render(&frame(&[], &[], PlaybackState::default(), 0))
            .unwrap();
        let [r, _, _, a] = pixel(&pixmap, 0, 150);
        assert!(a < 64);
        assert!(r < 200);
    }

    #[test]
    fn annotation_line_uses_its_color() {
        let mags = vec![0.5; 100];
        let anns = vec![marker("1", 200.0, AnnotationColor::Green)];
        let pixmap = WaveformRenderer::new(SURFACE)
            .render(&frame(&mags, &anns, PlaybackState::default(), 0))
            .unwrap();
        let [r, g, b, a] = pixel(&pixmap, 200, 150);
        assert_eq!(a, 255);
        let [er, eg, eb] = AnnotationColor::Green.rgb();
        assert!(r.abs_diff(er) <= 2 && g.abs_diff(eg) <= 2 && b.abs_diff(eb) <= 2);
    }

    #[test]
    fn image_annotations_are_not_drawn_on_waveform() {
        let mags = vec![0.5; 100];
        let image_mark = vec![Annotation {
            id: "9".into(),
            anchor: Anchor::Image { x: 200.0, y: 150.0 },
            title: String::new(),
            note: String::new(),
            color: AnnotationColor::Green,
        }];
        let renderer = WaveformRenderer::new(SURFACE);
        let with = renderer
            .render(&frame(&mags, &image_mark, PlaybackState::default(), 0))
            .unwrap();
        let without = renderer
            .render(&frame(&mags, &[], PlaybackState::default(), 0))
            .unwrap();
        assert_eq!(with.data(), without.data());
    }

    #[test]
    fn bars_behind_the_playhead_take_the_played_fill() {
        let mags = vec![0.5; 100];
        let renderer = WaveformRenderer::new(SURFACE);
        let inputs = FrameInputs {
            hovered_bar: None,
            ..frame(&mags, &[], playing_at(60.0), 0)
        };
        let pixmap = renderer.render(&inputs).unwrap();

        // Bar 30 sits before progress 0.5, bar 70 after it
        let [r, g, b, a] = pixel(&pixmap, 244, 140);
        assert_eq!(a, 255);
        assert!(r > 180 && g > 130 && b > 240, "played {:?}", (r, g, b));

        let [r, _, b, a] = pixel(&pixmap, 564, 140);
        assert!(a < 240, "unplayed alpha {}", a);
        assert!(r < 160 && b > 200, "unplayed {:?}", (r, b));

        // Paused at the same position: nothing counts as played
        let paused = PlaybackState {
            is_playing: false,
            ..playing_at(60.0)
        };
        let pixmap = renderer
            .render(&FrameInputs { playback: paused, ..inputs })
            .unwrap();
        assert!(pixel(&pixmap, 244, 140)[3] < 240);
    }

    fn top_edge(pixmap: &Pixmap, x: u32) -> u32 {
        (0..pixmap.height())
            .find(|&y| pixel(pixmap, x, y)[3] > 120)
            .unwrap_or(pixmap.height())
    }

    #[test]
    fn hovered_bar_grows_and_glows() {
        let mags = vec![0.5; 100];
        let renderer = WaveformRenderer::new(SURFACE);
        let plain = FrameInputs {
            hovered_bar: None,
            ..frame(&mags, &[], PlaybackState::default(), 0)
        };
        let hovered = FrameInputs {
            hovered_bar: Some(50),
            ..plain
        };
        let with = renderer.render(&hovered).unwrap();
        let without = renderer.render(&plain).unwrap();

        // 0.5 * 300 * 0.8 = 120 px tall, 156 px once hovered
        let hovered_top = top_edge(&with, 404);
        let neighbour_top = top_edge(&with, 436);
        assert!((88..=92).contains(&neighbour_top), "neighbour top {}", neighbour_top);
        assert!((70..=74).contains(&hovered_top), "hovered top {}", hovered_top);
        assert_eq!(top_edge(&without, 404), neighbour_top);

        // Halo just above the grown bar
        assert!(pixel(&with, 404, 64)[3] > pixel(&without, 404, 64)[3] + 20);
    }

    #[test]
    fn sparkles_only_while_playing() {
        let renderer = WaveformRenderer::new(SURFACE);
        let playing = frame(&[], &[], playing_at(0.0), 0);
        let paused = FrameInputs {
            playback: PlaybackState {
                is_playing: false,
                ..playing_at(0.0)
            },
            ..playing
        };

        // Second sparkle at clock 0: ((sin 1 + 1) * w/2, (cos 2 + 1) * h/2)
        let lit = pixel(&renderer.render(&playing).unwrap(), 737, 88);
        let dark = pixel(&renderer.render(&paused).unwrap(), 737, 88);
        assert!(lit[3] > dark[3] + 60, "lit {:?} dark {:?}", lit, dark);
    }

    #[test]
    fn zero_sized_surface_is_an_error() {
        let renderer = WaveformRenderer::new(Surface { width: 0, height: 10 });
        assert!(renderer.render(&frame(&[], &[], PlaybackState::default(), 0)).is_err());
    }
}
