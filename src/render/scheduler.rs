use anyhow::Result;
use tiny_skia::Pixmap;

use super::picture::ImageRenderer;
use super::waveform::WaveformRenderer;
use crate::playback::{PlaybackPoller, PlaybackPrimitive};
use crate::session::Session;

/// Output of one display refresh.
pub struct Frame {
    pub clock: u64,
    pub waveform: Option<Pixmap>,
    pub image: Option<Pixmap>,
}

/// The one persistent frame callback. It holds no copy of editing state and
/// reads the session afresh on every call.
pub struct FrameScheduler {
    waveform: WaveformRenderer,
    image: Option<(u64, ImageRenderer)>,
    rendered: u64,
    idle: u64,
}

impl FrameScheduler {
    pub fn new(waveform: WaveformRenderer) -> Self {
        Self {
            waveform,
            image: None,
            rendered: 0,
            idle: 0,
        }
    }

    /// Run one refresh: poll playback time, then tick and draw if the surface
    /// is active. Returns `None` when idle.
    pub fn on_frame<P: PlaybackPrimitive>(
        &mut self,
        session: &mut Session,
        primitive: &P,
        poller: &mut PlaybackPoller,
    ) -> Result<Option<Frame>> {
        poller.poll(primitive, session);

        if !session.is_active() {
            self.idle += 1;
            return Ok(None);
        }

        session.tick_animation();
        let frame = self.draw(session)?;
        self.rendered += 1;
        log::trace!("Frame {} rendered (clock {})", self.rendered, frame.clock);
        Ok(Some(frame))
    }

    /// Draw the session as it stands, without polling or advancing the clock.
    pub fn draw(&mut self, session: &Session) -> Result<Frame> {
        let clock = session.clock();

        let waveform = if session.magnitudes().is_empty() {
            None
        } else {
            Some(self.waveform.render(&session.snapshot())?)
        };

        let image = match session.image() {
            Some(doc) => {
                let stale = self
                    .image
                    .as_ref()
                    .map_or(true, |(cached, _)| *cached != doc.generation);
                if stale {
                    log::debug!("Preparing image surface for {}", doc.source);
                    self.image = Some((doc.generation, ImageRenderer::new(&doc.bitmap)?));
                }
                self.image
                    .as_ref()
                    .map(|(_, renderer)| renderer.render(session.annotations(), clock))
            }
            None => None,
        };

        Ok(Frame {
            clock,
            waveform,
            image,
        })
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    pub fn frames_idle(&self) -> u64 {
        self.idle
    }
}
