use crate::session::{PlaybackState, Session};

use super::transport::PlaybackPrimitive;

/// Copies the primitive's position into the session once per frame, while
/// playing. There is never more than one registration alive.
#[derive(Debug, Default)]
pub struct PlaybackPoller {
    registration: Option<u64>,
    issued: u64,
}

impl PlaybackPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the poller. A second start while running is a no-op.
    pub fn start(&mut self) {
        if self.registration.is_some() {
            return;
        }
        self.issued += 1;
        self.registration = Some(self.issued);
        log::trace!("Playback poller registered (#{})", self.issued);
    }

    /// Cancel immediately; nothing in flight is awaited.
    pub fn stop(&mut self) {
        if let Some(id) = self.registration.take() {
            log::trace!("Playback poller cancelled (#{})", id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.registration.is_some()
    }

    /// How many registrations have ever been made.
    pub fn registrations(&self) -> u64 {
        self.issued
    }

    /// One polling cycle. Cancels itself once the primitive stops on its own.
    pub fn poll<P: PlaybackPrimitive>(&mut self, primitive: &P, session: &mut Session) {
        if self.registration.is_none() {
            return;
        }
        session.set_playback(observe(primitive));
        if !primitive.is_playing() {
            self.stop();
        }
    }
}

fn observe<P: PlaybackPrimitive>(primitive: &P) -> PlaybackState {
    PlaybackState {
        is_playing: primitive.is_playing(),
        current_time: primitive.position(),
        duration: primitive.duration(),
    }
}

pub fn play<P: PlaybackPrimitive>(primitive: &mut P, poller: &mut PlaybackPoller, session: &mut Session) {
    primitive.play();
    if primitive.is_playing() {
        poller.start();
    }
    session.set_playback(observe(primitive));
}

pub fn pause<P: PlaybackPrimitive>(primitive: &mut P, poller: &mut PlaybackPoller, session: &mut Session) {
    primitive.pause();
    poller.stop();
    session.set_playback(observe(primitive));
}

pub fn toggle<P: PlaybackPrimitive>(primitive: &mut P, poller: &mut PlaybackPoller, session: &mut Session) {
    if session.playback().is_playing {
        pause(primitive, poller, session);
    } else {
        play(primitive, poller, session);
    }
}
