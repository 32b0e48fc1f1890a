use anyhow::Result;
use std::path::{Path, PathBuf};
use tiny_skia::Pixmap;

use crate::audio::decode::decode_audio;
use crate::error::{notify, AnnotatorError};
use crate::picture::load::load_image;
use crate::playback::{poller, OfflineTransport, PlaybackPoller, PlaybackPrimitive};
use crate::render::scheduler::{Frame, FrameScheduler};
use crate::render::waveform::WaveformRenderer;
use crate::script::ScriptEvent;
use crate::session::{format_time, PlaybackState, Session, Surface};

/// A session wired to its playback transport and frame loop.
pub struct Studio {
    session: Session,
    transport: OfflineTransport,
    poller: PlaybackPoller,
    scheduler: FrameScheduler,
    frame_seconds: f64,
}

/// `file://` URI for a local path, absolute when the path resolves.
pub fn source_uri(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", resolved.display())
}

impl Studio {
    pub fn new(surface: Surface, bars: usize, fps: u32) -> Self {
        Self {
            session: Session::new(surface, bars),
            transport: OfflineTransport::default(),
            poller: PlaybackPoller::new(),
            scheduler: FrameScheduler::new(WaveformRenderer::new(surface)),
            frame_seconds: 1.0 / fps.max(1) as f64,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn open_audio(&mut self, path: &Path) -> Result<(), AnnotatorError> {
        let decoded = decode_audio(path)?;
        let duration = decoded.duration();
        self.session.load_audio(source_uri(path), decoded)?;

        self.poller.stop();
        self.transport.load(duration);
        Ok(())
    }

    pub fn open_image(&mut self, path: &Path) -> Result<(), AnnotatorError> {
        let bitmap = load_image(path)?;
        self.session.load_image(source_uri(path), bitmap);
        Ok(())
    }

    pub fn play(&mut self) {
        poller::play(&mut self.transport, &mut self.poller, &mut self.session);
        log::debug!(
            "Play from {} (poller registrations: {})",
            format_time(self.session.playback().current_time),
            self.poller.registrations()
        );
    }

    pub fn pause(&mut self) {
        poller::pause(&mut self.transport, &mut self.poller, &mut self.session);
        log::info!("Paused at {}", self.readout());
    }

    pub fn toggle(&mut self) {
        poller::toggle(&mut self.transport, &mut self.poller, &mut self.session);
        if !self.session.playback().is_playing {
            log::info!("Paused at {}", self.readout());
        }
    }

    pub fn seek(&mut self, time: f64) {
        self.transport.seek(time);
        self.session.set_playback(PlaybackState {
            is_playing: self.transport.is_playing(),
            current_time: self.transport.position(),
            duration: self.transport.duration(),
        });
    }

    /// `m:ss / m:ss` for the current position.
    pub fn readout(&self) -> String {
        let playback = self.session.playback();
        format!(
            "{} / {}",
            format_time(playback.current_time),
            format_time(playback.duration)
        )
    }

    /// One display refresh: the transport moves by one frame interval, then
    /// the scheduler runs.
    pub fn step(&mut self) -> Result<Option<Frame>> {
        self.transport.advance(self.frame_seconds);
        self.scheduler
            .on_frame(&mut self.session, &self.transport, &mut self.poller)
    }

    /// Run `count` refreshes and return the last frame drawn, if any.
    pub fn run_frames(&mut self, count: u64) -> Result<Option<Frame>> {
        let mut last = None;
        for _ in 0..count {
            if let Some(frame) = self.step()? {
                last = Some(frame);
            }
        }
        Ok(last)
    }

    /// Draw the current state without moving time.
    pub fn draw(&mut self) -> Result<Frame> {
        self.scheduler.draw(&self.session)
    }

    /// Number of refreshes needed to play the loaded audio from the start.
    pub fn playback_frames(&self) -> u64 {
        (self.transport.duration() / self.frame_seconds).ceil() as u64
    }

    /// Play the loaded audio from the start until the transport stops,
    /// handing every waveform frame to `sink`. Returns the frames written.
    pub fn record<F>(&mut self, mut sink: F) -> Result<u64>
    where
        F: FnMut(&Pixmap) -> Result<()>,
    {
        if self.session.audio().is_none() {
            return Ok(0);
        }
        self.seek(0.0);
        self.play();

        // Accumulated frame intervals can land just short of the end
        let budget = self.playback_frames() + 1;
        let mut written = 0;
        while written < budget {
            let frame = match self.step()? {
                Some(frame) => frame,
                None => self.draw()?,
            };
            if let Some(waveform) = frame.waveform.as_ref() {
                sink(waveform)?;
                written += 1;
            }
            if !self.poller.is_running() {
                break;
            }
        }
        log::info!(
            "Playback finished at {} ({} frames drawn, {} idle)",
            self.readout(),
            self.scheduler.frames_rendered(),
            self.scheduler.frames_idle()
        );
        Ok(written)
    }

    /// Apply one scripted interaction. Action failures come back as
    /// [`AnnotatorError`] inside the `anyhow` error.
    pub fn apply(&mut self, event: &ScriptEvent) -> Result<()> {
        match event {
            ScriptEvent::LoadAudio { path } => self.open_audio(path)?,
            ScriptEvent::LoadImage { path } => self.open_image(path)?,
            ScriptEvent::ClickAudio { x } => {
                let ann = self.session.click_audio(*x)?;
                log::info!("Added {} (id {})", ann.title, ann.id);
            }
            ScriptEvent::ClickImage { x, y } => {
                let ann = self.session.click_image(*x, *y)?;
                log::info!("Added {} (id {})", ann.title, ann.id);
            }
            ScriptEvent::Update { id, .. } => {
                let patch = event.patch().unwrap_or_default();
                self.session.update_annotation(id, &patch)?;
            }
            ScriptEvent::Delete { id } => self.session.delete_annotation(id)?,
            ScriptEvent::Play => self.play(),
            ScriptEvent::Pause => self.pause(),
            ScriptEvent::Toggle => self.toggle(),
            ScriptEvent::Seek { time } => self.seek(*time),
            ScriptEvent::Hover { x } => {
                self.session.hover(*x);
                if let (Some(bar), Some(time)) = (self.session.hovered_bar(), self.session.hover_time()) {
                    log::debug!("Hover over bar {} at {}", bar, format_time(time));
                }
            }
            ScriptEvent::Leave => self.session.leave(),
            ScriptEvent::Frames { count } => {
                self.run_frames(*count)?;
            }
        }
        Ok(())
    }

    /// Replay a script in order. A failing action is notified and skipped;
    /// anything else (a rendering failure) stops the replay.
    pub fn replay(&mut self, events: &[ScriptEvent]) -> Result<()> {
        for event in events {
            if let Err(err) = self.apply(event) {
                match err.downcast_ref::<AnnotatorError>() {
                    Some(action) => notify(event.name(), action),
                    None => return Err(err),
                }
            }
        }
        Ok(())
    }
}
