use crate::audio::decode::DecodedAudio;
use crate::audio::reduce::reduce;
use crate::error::AnnotatorError;
use crate::picture::load::Bitmap;

use super::annotation::{Anchor, Annotation, AnnotationColor, AnnotationKind, AnnotationPatch};
use super::playback::PlaybackState;

/// Pixel size of the waveform drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

pub struct AudioDocument {
    pub source: String,
    /// Seconds, fixed when the audio is loaded.
    pub duration: f64,
    pub magnitudes: Vec<f32>,
}

pub struct ImageDocument {
    pub source: String,
    pub bitmap: Bitmap,
    /// Bumped on every load, so reloading the same source still counts as new.
    pub generation: u64,
}

/// Everything one waveform frame is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    pub magnitudes: &'a [f32],
    pub playback: PlaybackState,
    pub annotations: &'a [Annotation],
    pub hovered_bar: Option<usize>,
    pub clock: u64,
}

/// The single owner of all editing state.
///
/// Every transition either applies completely or returns an error and leaves
/// the session exactly as it was.
pub struct Session {
    surface: Surface,
    bar_count: usize,
    audio: Option<AudioDocument>,
    image: Option<ImageDocument>,
    annotations: Vec<Annotation>,
    playback: PlaybackState,
    hovered_bar: Option<usize>,
    clock: u64,
    next_id: u64,
    image_loads: u64,
}

impl Session {
    pub fn new(surface: Surface, bar_count: usize) -> Self {
        Self {
            surface,
            bar_count,
            audio: None,
            image: None,
            annotations: Vec::new(),
            playback: PlaybackState::default(),
            hovered_bar: None,
            clock: 0,
            next_id: 0,
            image_loads: 0,
        }
    }

    pub fn load_audio(&mut self, source: String, decoded: DecodedAudio) -> Result<(), AnnotatorError> {
        if decoded.samples.is_empty() {
            return Err(AnnotatorError::DegenerateInput);
        }

        let magnitudes = reduce(&decoded.samples, self.bar_count);
        if magnitudes.iter().all(|m| *m == 0.0) {
            log::warn!("Audio from {} is silent; waveform will be flat", source);
        }

        let doc = AudioDocument {
            source,
            duration: decoded.duration(),
            magnitudes,
        };
        let duration = doc.duration;

        log::info!(
            "Loaded audio {}: {} bars, {:.1}s",
            doc.source,
            doc.magnitudes.len(),
            duration
        );
        if let Some(previous) = self.audio.replace(doc) {
            log::debug!("Released previous audio source {}", previous.source);
        }
        self.playback = PlaybackState::paused_at_start(duration);
        self.hovered_bar = None;
        Ok(())
    }

    pub fn load_image(&mut self, source: String, bitmap: Bitmap) {
        log::info!("Loaded image {} ({}x{})", source, bitmap.width, bitmap.height);
        self.image_loads += 1;
        let doc = ImageDocument {
            source,
            bitmap,
            generation: self.image_loads,
        };
        if let Some(previous) = self.image.replace(doc) {
            log::debug!("Released previous image source {}", previous.source);
        }
    }

    /// Place an audio annotation at surface x; time is proportional to x.
    pub fn click_audio(&mut self, x: f64) -> Result<&Annotation, AnnotatorError> {
        let duration = self.playback.duration;
        if self.audio.is_none() || duration <= 0.0 {
            return Err(AnnotatorError::NothingToAnnotate("no audio loaded"));
        }
        let width = self.surface.width as f64;
        if !(0.0..=width).contains(&x) {
            return Err(AnnotatorError::NothingToAnnotate("click is outside the waveform"));
        }

        let time = x / width * duration;
        let ordinal = self.count_of(AnnotationKind::Audio) + 1;
        Ok(self.add_annotation(Anchor::Audio { time, x }, format!("Audio Note {}", ordinal)))
    }

    /// Place an image annotation at raw bitmap pixel coordinates.
    pub fn click_image(&mut self, x: f64, y: f64) -> Result<&Annotation, AnnotatorError> {
        if self.image.is_none() {
            return Err(AnnotatorError::NothingToAnnotate("no image loaded"));
        }

        let ordinal = self.count_of(AnnotationKind::Image) + 1;
        Ok(self.add_annotation(Anchor::Image { x, y }, format!("Image Note {}", ordinal)))
    }

    fn add_annotation(&mut self, anchor: Anchor, title: String) -> &Annotation {
        self.next_id += 1;
        // Colors follow the combined count, so audio and image marks share one cycle.
        let color = AnnotationColor::for_index(self.annotations.len());
        self.annotations.push(Annotation {
            id: self.next_id.to_string(),
            anchor,
            title,
            note: String::new(),
            color,
        });
        let added = &self.annotations[self.annotations.len() - 1];
        log::debug!("Added annotation {} ({:?}) in {}", added.id, added.anchor, added.color.hex());
        added
    }

    fn count_of(&self, kind: AnnotationKind) -> usize {
        self.annotations.iter().filter(|a| a.kind() == kind).count()
    }

    pub fn update_annotation(&mut self, id: &str, patch: &AnnotationPatch) -> Result<(), AnnotatorError> {
        let annotation = self
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AnnotatorError::UnknownAnnotation(id.to_string()))?;
        patch.apply_to(annotation);
        Ok(())
    }

    pub fn delete_annotation(&mut self, id: &str) -> Result<(), AnnotatorError> {
        let idx = self
            .annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AnnotatorError::UnknownAnnotation(id.to_string()))?;
        self.annotations.remove(idx);
        Ok(())
    }

    pub fn set_playback(&mut self, playback: PlaybackState) {
        self.playback = playback;
    }

    pub fn tick_animation(&mut self) {
        self.clock += 1;
    }

    /// Pointer moved to surface x.
    pub fn hover(&mut self, x: f64) {
        let bars = self.magnitudes().len();
        let width = self.surface.width as f64;
        self.hovered_bar = if bars == 0 || width <= 0.0 || !(0.0..width).contains(&x) {
            None
        } else {
            Some(((x / width * bars as f64).floor() as usize).min(bars - 1))
        };
    }

    pub fn leave(&mut self) {
        self.hovered_bar = None;
    }

    /// Track time under the hovered bar, for the tooltip.
    pub fn hover_time(&self) -> Option<f64> {
        let bars = self.magnitudes().len();
        if self.playback.duration <= 0.0 || bars == 0 {
            return None;
        }
        self.hovered_bar
            .map(|i| i as f64 / bars as f64 * self.playback.duration)
    }

    /// The frame loop keeps running while this holds.
    pub fn is_active(&self) -> bool {
        self.playback.is_playing || !self.annotations.is_empty() || self.image.is_some()
    }

    pub fn snapshot(&self) -> FrameInputs<'_> {
        FrameInputs {
            magnitudes: self.magnitudes(),
            playback: self.playback,
            annotations: &self.annotations,
            hovered_bar: self.hovered_bar,
            clock: self.clock,
        }
    }

    pub fn magnitudes(&self) -> &[f32] {
        self.audio
            .as_ref()
            .map(|a| a.magnitudes.as_slice())
            .unwrap_or(&[])
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn hovered_bar(&self) -> Option<usize> {
        self.hovered_bar
    }

    pub fn audio(&self) -> Option<&AudioDocument> {
        self.audio.as_ref()
    }

    pub fn image(&self) -> Option<&ImageDocument> {
        self.image.as_ref()
    }
}
