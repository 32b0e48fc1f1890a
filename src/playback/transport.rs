/// The audio-playing primitive the session reads time from.
pub trait PlaybackPrimitive {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Current position in seconds.
    fn position(&self) -> f64;
    fn duration(&self) -> f64;
}

/// A transport with no audio device behind it. Time moves only when the
/// frame loop calls [`OfflineTransport::advance`], so rendering is repeatable.
#[derive(Clone, Debug, Default)]
pub struct OfflineTransport {
    duration: f64,
    position: f64,
    playing: bool,
}

impl OfflineTransport {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            position: 0.0,
            playing: false,
        }
    }

    /// Replace the loaded media: paused, at the start.
    pub fn load(&mut self, duration: f64) {
        *self = Self::new(duration);
    }

    pub fn advance(&mut self, seconds: f64) {
        if !self.playing {
            return;
        }
        self.position = (self.position + seconds).min(self.duration);
        if self.position >= self.duration {
            log::debug!("Transport reached end of media at {:.3}s", self.duration);
            self.playing = false;
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
    }
}

impl PlaybackPrimitive for OfflineTransport {
    fn play(&mut self) {
        if self.duration > 0.0 && self.position < self.duration {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
